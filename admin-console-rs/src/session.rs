// admin-console-rs/src/session.rs
//
// Admin session state machine
// - Unauthenticated -> Resolving -> Resolved { is_admin }
// - Resolutions carry a generation; a superseded one is discarded on settle
// - Snapshots are published through a watch channel
//
// Only this module writes `is_admin`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::identity::{AuthUser, IdentityProvider};
use crate::resolver::check_is_admin;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Unauthenticated,
    Resolving,
    Resolved { is_admin: bool },
}

/// What the admin screens read.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminSnapshot {
    pub principal: Option<AuthUser>,
    pub is_admin: bool,
    pub is_loading: bool,
    pub status: SessionStatus,
    /// A role change touched this principal and the token may lag behind.
    pub stale_claim: bool,
}

impl AdminSnapshot {
    fn initial() -> Self {
        Self {
            principal: None,
            is_admin: false,
            is_loading: true,
            status: SessionStatus::Resolving,
            stale_claim: false,
        }
    }

    fn unauthenticated() -> Self {
        Self {
            principal: None,
            is_admin: false,
            is_loading: false,
            status: SessionStatus::Unauthenticated,
            stale_claim: false,
        }
    }

    fn resolving(principal: AuthUser, stale_claim: bool) -> Self {
        Self {
            principal: Some(principal),
            is_admin: false,
            is_loading: true,
            status: SessionStatus::Resolving,
            stale_claim,
        }
    }
}

struct SessionInner {
    provider: Arc<dyn IdentityProvider>,
    generation: AtomicU64,
    state: watch::Sender<AdminSnapshot>,
}

/// Owned admin session; clones share the same state.
#[derive(Clone)]
pub struct AdminSession {
    inner: Arc<SessionInner>,
}

/// A pending admin-status check for one auth-state transition.
pub struct Resolution {
    session: AdminSession,
    generation: u64,
    principal: AuthUser,
}

impl Resolution {
    pub fn principal(&self) -> &AuthUser {
        &self.principal
    }

    /// Run the resolver and apply its result unless superseded.
    ///
    /// Returns the applied value, or `None` when the result was discarded.
    pub async fn run(self) -> Option<bool> {
        let is_admin = check_is_admin(self.session.inner.provider.as_ref(), Some(&self.principal)).await;
        self.session.apply(self.generation, &self.principal, is_admin)
    }
}

impl AdminSession {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let (state, _) = watch::channel(AdminSnapshot::initial());
        Self {
            inner: Arc::new(SessionInner {
                provider,
                generation: AtomicU64::new(0),
                state,
            }),
        }
    }

    pub fn provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.inner.provider
    }

    pub fn snapshot(&self) -> AdminSnapshot {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AdminSnapshot> {
        self.inner.state.subscribe()
    }

    pub fn is_admin(&self) -> bool {
        self.inner.state.borrow().is_admin
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading
    }

    pub fn principal(&self) -> Option<AuthUser> {
        self.inner.state.borrow().principal.clone()
    }

    /// Record one auth-state transition.
    pub fn observe(&self, user: Option<AuthUser>) -> Option<Resolution> {
        let mut generation = 0;
        self.inner.state.send_modify(|snapshot| {
            generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *snapshot = match &user {
                Some(user) => AdminSnapshot::resolving(user.clone(), false),
                None => AdminSnapshot::unauthenticated(),
            };
        });

        match user {
            Some(principal) => {
                debug!(uid = %principal.uid, generation, "Resolving admin status");
                Some(Resolution {
                    session: self.clone(),
                    generation,
                    principal,
                })
            }
            None => {
                info!(generation, "Signed out; admin status cleared");
                None
            }
        }
    }

    /// Observe a transition and resolve it in place.
    pub async fn handle_auth_state_change(&self, user: Option<AuthUser>) -> AdminSnapshot {
        if let Some(resolution) = self.observe(user) {
            resolution.run().await;
        }
        self.snapshot()
    }

    /// Consume transitions in order; resolutions run concurrently.
    pub fn spawn_listener(&self, mut events: mpsc::Receiver<Option<AuthUser>>) -> JoinHandle<()> {
        let session = self.clone();
        tokio::spawn(async move {
            while let Some(user) = events.recv().await {
                if let Some(resolution) = session.observe(user) {
                    tokio::spawn(resolution.run());
                }
            }
            debug!("Auth state stream closed");
        })
    }

    /// Re-check the current principal without a new sign-in.
    ///
    /// Returns the admin flag the session holds afterwards; a result
    /// superseded mid-flight is dropped in favour of the newer state.
    pub async fn refresh_admin_status(&self) -> bool {
        let mut generation = 0;
        let mut principal = None;
        self.inner.state.send_modify(|snapshot| {
            generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
            match snapshot.principal.clone() {
                Some(user) => {
                    *snapshot = AdminSnapshot::resolving(user.clone(), snapshot.stale_claim);
                    principal = Some(user);
                }
                None => snapshot.is_admin = false,
            }
        });

        let principal = match principal {
            Some(principal) => principal,
            None => return false,
        };

        let is_admin = check_is_admin(self.inner.provider.as_ref(), Some(&principal)).await;
        self.apply(generation, &principal, is_admin)
            .unwrap_or_else(|| self.is_admin())
    }

    /// Flag that the principal's token may not reflect a recent role change.
    pub fn mark_claims_stale(&self) {
        self.inner.state.send_if_modified(|snapshot| {
            if snapshot.principal.is_none() || snapshot.stale_claim {
                return false;
            }
            snapshot.stale_claim = true;
            true
        });
    }

    /// Tear down to signed-out defaults.
    pub fn reset(&self) {
        self.observe(None);
    }

    fn apply(&self, generation: u64, principal: &AuthUser, is_admin: bool) -> Option<bool> {
        let mut applied = false;
        self.inner.state.send_if_modified(|snapshot| {
            let current = self.inner.generation.load(Ordering::SeqCst) == generation;
            let same_principal = snapshot.principal.as_ref() == Some(principal);
            if !current || !same_principal {
                return false;
            }
            snapshot.is_admin = is_admin;
            snapshot.is_loading = false;
            snapshot.status = SessionStatus::Resolved { is_admin };
            snapshot.stale_claim = false;
            applied = true;
            true
        });

        if applied {
            info!(uid = %principal.uid, is_admin, "Admin status resolved");
            Some(is_admin)
        } else {
            debug!(uid = %principal.uid, generation, "Discarded superseded admin resolution");
            None
        }
    }
}
