// admin-functions-rs/src/lib.rs
//
// Privileged callable functions for the PhotoNotes admin console
//
// Primary features:
// - Admin claim grant/revoke (the only writers of the claim)
// - Principal listing, lookup and enable/disable
// - Caller authorization from verified identity tokens
// - First-admin bootstrap policy
// - Audit logging

pub mod audit;
pub mod dispatch;
pub mod emulator;
pub mod functions;
pub mod http;
pub mod jwt;
pub mod storage;

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use shared_types::PhotoNotesConfig;

pub use audit::AuditLog;
pub use dispatch::CallableDispatcher;
pub use emulator::{IdentityEmulator, IssuedToken};
pub use functions::{AdminFunctions, BootstrapPolicy, CallerContext};
pub use jwt::{IdentityClaims, IdentityTokenIssuer, TokenError};
pub use storage::{InMemoryPrincipalStore, NewPrincipal, PrincipalStore, StoreError};

/// Fully wired functions service
pub struct FunctionsService {
    pub dispatcher: Arc<CallableDispatcher>,
    pub emulator: Arc<IdentityEmulator>,
}

impl FunctionsService {
    /// Wire the service from configuration over the given store.
    pub fn new(config: &PhotoNotesConfig, store: Arc<dyn PrincipalStore>) -> Self {
        let secret = match config.auth.jwt_secret.as_deref() {
            Some(secret) if !secret.is_empty() => secret.to_string(),
            _ => {
                warn!("PHOTONOTES_JWT_SECRET not set, using random value (insecure for production)");
                uuid::Uuid::new_v4().to_string()
            }
        };

        let issuer = Arc::new(IdentityTokenIssuer::new(
            &secret,
            &config.project.project_id,
            Duration::from_secs(config.auth.token_ttl_secs),
        ));
        let bootstrap = BootstrapPolicy::from_enabled(config.bootstrap.enabled);
        info!(
            project = %config.project.project_id,
            bootstrap = bootstrap.as_str(),
            "Initializing admin functions"
        );

        let functions = Arc::new(AdminFunctions::new(
            store.clone(),
            Arc::new(AuditLog::default()),
            bootstrap,
        ));

        Self {
            dispatcher: Arc::new(CallableDispatcher::new(functions, issuer.clone())),
            emulator: Arc::new(IdentityEmulator::new(store, issuer)),
        }
    }

    pub fn router(&self) -> axum::Router {
        http::router(self.dispatcher.clone())
    }
}
