// admin-functions-rs/src/storage.rs
//
// Principal store abstraction for the admin functions
// Provides:
// - Lookup by uid and email
// - Cursor pagination ordered by uid
// - Custom claim and disabled-flag updates
// - An in-memory backend for development and tests
//
// Each operation is atomic on its own; nothing coordinates across calls.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use shared_types::{claims_grant_admin, CustomClaims, Principal, PrincipalMetadata};

/// Largest page the provider will return.
pub const MAX_PAGE_SIZE: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("There is no user record corresponding to the provided identifier ({0}).")]
    NotFound(String),

    #[error("The email address is already in use by another account ({0}).")]
    EmailExists(String),

    #[error("The uid is already in use by another account ({0}).")]
    UidExists(String),

    #[error("Page size must be a positive number less than or equal to {MAX_PAGE_SIZE} (got {0}).")]
    InvalidPageSize(String),

    #[error("The page token is invalid.")]
    InvalidPageToken,

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Fields supplied when provisioning a principal.
#[derive(Debug, Clone, Default)]
pub struct NewPrincipal {
    /// Generated when absent.
    pub uid: Option<String>,
    pub email: Option<String>,
    pub email_verified: bool,
    pub disabled: bool,
    pub custom_claims: CustomClaims,
}

impl NewPrincipal {
    pub fn with_email(email: &str) -> Self {
        Self {
            email: Some(email.to_string()),
            ..Default::default()
        }
    }
}

/// One page of a uid-ordered listing.
#[derive(Debug, Clone)]
pub struct PrincipalPage {
    pub principals: Vec<Principal>,
    /// Present only when more principals exist past this page.
    pub next_page_token: Option<String>,
}

#[async_trait]
pub trait PrincipalStore: Send + Sync {
    /// Check if the backend is reachable
    async fn is_healthy(&self) -> bool;

    /// Provision a new principal
    async fn create(&self, new: NewPrincipal) -> Result<Principal, StoreError>;

    async fn get_by_uid(&self, uid: &str) -> Result<Principal, StoreError>;

    async fn get_by_email(&self, email: &str) -> Result<Principal, StoreError>;

    /// List principals ordered by uid, starting after the cursor
    async fn list(
        &self,
        max_results: usize,
        page_token: Option<&str>,
    ) -> Result<PrincipalPage, StoreError>;

    /// Merge a single custom claim into the principal's claim map
    async fn set_custom_claim(
        &self,
        uid: &str,
        key: &str,
        value: Value,
    ) -> Result<Principal, StoreError>;

    async fn set_disabled(&self, uid: &str, disabled: bool) -> Result<Principal, StoreError>;

    /// Stamp the last sign-in time
    async fn record_sign_in(&self, uid: &str) -> Result<Principal, StoreError>;

    /// Whether any principal currently holds the admin claim
    async fn any_admin(&self) -> Result<bool, StoreError>;
}

pub fn encode_page_token(last_uid: &str) -> String {
    URL_SAFE_NO_PAD.encode(last_uid.as_bytes())
}

pub fn decode_page_token(token: &str) -> Result<String, StoreError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|_| StoreError::InvalidPageToken)?;
    String::from_utf8(bytes).map_err(|_| StoreError::InvalidPageToken)
}

/// In-memory principal store
pub struct InMemoryPrincipalStore {
    principals: Arc<RwLock<BTreeMap<String, Principal>>>,
}

impl InMemoryPrincipalStore {
    pub fn new() -> Self {
        Self {
            principals: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.principals.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.principals.read().await.is_empty()
    }

    async fn update<F>(&self, uid: &str, apply: F) -> Result<Principal, StoreError>
    where
        F: FnOnce(&mut Principal) + Send,
    {
        let mut principals = self.principals.write().await;
        let principal = principals
            .get_mut(uid)
            .ok_or_else(|| StoreError::NotFound(uid.to_string()))?;
        apply(principal);
        Ok(principal.clone())
    }
}

impl Default for InMemoryPrincipalStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PrincipalStore for InMemoryPrincipalStore {
    async fn is_healthy(&self) -> bool {
        true
    }

    async fn create(&self, new: NewPrincipal) -> Result<Principal, StoreError> {
        let mut principals = self.principals.write().await;

        let uid = new.uid.unwrap_or_else(|| Uuid::new_v4().simple().to_string());
        if principals.contains_key(&uid) {
            return Err(StoreError::UidExists(uid));
        }
        if let Some(email) = new.email.as_deref() {
            if principals.values().any(|p| p.has_email(email)) {
                return Err(StoreError::EmailExists(email.to_string()));
            }
        }

        let principal = Principal {
            uid: uid.clone(),
            email: new.email,
            email_verified: new.email_verified,
            disabled: new.disabled,
            custom_claims: new.custom_claims,
            metadata: PrincipalMetadata {
                creation_time: Utc::now(),
                last_sign_in_time: None,
            },
        };
        principals.insert(uid.clone(), principal.clone());

        info!(uid = %uid, "Provisioned principal");
        Ok(principal)
    }

    async fn get_by_uid(&self, uid: &str) -> Result<Principal, StoreError> {
        self.principals
            .read()
            .await
            .get(uid)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(uid.to_string()))
    }

    async fn get_by_email(&self, email: &str) -> Result<Principal, StoreError> {
        self.principals
            .read()
            .await
            .values()
            .find(|p| p.has_email(email))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(email.to_string()))
    }

    async fn list(
        &self,
        max_results: usize,
        page_token: Option<&str>,
    ) -> Result<PrincipalPage, StoreError> {
        if max_results == 0 || max_results > MAX_PAGE_SIZE {
            return Err(StoreError::InvalidPageSize(max_results.to_string()));
        }

        let lower = match page_token {
            Some(token) => Bound::Excluded(decode_page_token(token)?),
            None => Bound::Unbounded,
        };

        let principals = self.principals.read().await;
        let mut remaining = principals.range::<String, _>((lower, Bound::Unbounded));
        let page: Vec<Principal> = remaining
            .by_ref()
            .take(max_results)
            .map(|(_, p)| p.clone())
            .collect();

        let next_page_token = match (remaining.next(), page.last()) {
            (Some(_), Some(last)) => Some(encode_page_token(&last.uid)),
            _ => None,
        };

        debug!(count = page.len(), more = next_page_token.is_some(), "Listed principals");
        Ok(PrincipalPage {
            principals: page,
            next_page_token,
        })
    }

    async fn set_custom_claim(
        &self,
        uid: &str,
        key: &str,
        value: Value,
    ) -> Result<Principal, StoreError> {
        let key = key.to_string();
        self.update(uid, move |p| {
            p.custom_claims.insert(key, value);
        })
        .await
    }

    async fn set_disabled(&self, uid: &str, disabled: bool) -> Result<Principal, StoreError> {
        self.update(uid, move |p| p.disabled = disabled).await
    }

    async fn record_sign_in(&self, uid: &str) -> Result<Principal, StoreError> {
        self.update(uid, |p| p.metadata.last_sign_in_time = Some(Utc::now()))
            .await
    }

    async fn any_admin(&self) -> Result<bool, StoreError> {
        Ok(self
            .principals
            .read()
            .await
            .values()
            .any(|p| claims_grant_admin(&p.custom_claims)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn seeded(count: usize) -> InMemoryPrincipalStore {
        let store = InMemoryPrincipalStore::new();
        for i in 0..count {
            store
                .create(NewPrincipal {
                    uid: Some(format!("uid-{:04}", i)),
                    email: Some(format!("user{}@example.com", i)),
                    ..Default::default()
                })
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_email_is_unique() {
        let store = InMemoryPrincipalStore::new();
        store.create(NewPrincipal::with_email("a@example.com")).await.unwrap();
        let err = store
            .create(NewPrincipal::with_email("A@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::EmailExists("A@example.com".to_string()));
    }

    #[tokio::test]
    async fn test_pagination_walks_every_principal_once() {
        let store = seeded(5).await;

        let first = store.list(2, None).await.unwrap();
        assert_eq!(first.principals.len(), 2);
        let token = first.next_page_token.clone().unwrap();

        let second = store.list(2, Some(&token)).await.unwrap();
        assert_eq!(second.principals[0].uid, "uid-0002");
        let token = second.next_page_token.clone().unwrap();

        let last = store.list(2, Some(&token)).await.unwrap();
        assert_eq!(last.principals.len(), 1);
        assert!(last.next_page_token.is_none());
    }

    #[tokio::test]
    async fn test_exact_page_has_no_token() {
        let store = seeded(3).await;
        let page = store.list(3, None).await.unwrap();
        assert_eq!(page.principals.len(), 3);
        assert!(page.next_page_token.is_none());
    }

    #[tokio::test]
    async fn test_page_size_bounds() {
        let store = seeded(1).await;
        assert!(matches!(store.list(0, None).await, Err(StoreError::InvalidPageSize(_))));
        assert!(matches!(
            store.list(MAX_PAGE_SIZE + 1, None).await,
            Err(StoreError::InvalidPageSize(_))
        ));
        assert!(matches!(
            store.list(10, Some("%%%")).await,
            Err(StoreError::InvalidPageToken)
        ));
    }

    #[tokio::test]
    async fn test_claim_merge_preserves_other_claims() {
        let store = InMemoryPrincipalStore::new();
        let mut claims = CustomClaims::new();
        claims.insert("org".to_string(), json!("north"));
        let p = store
            .create(NewPrincipal {
                email: Some("m@example.com".to_string()),
                custom_claims: claims,
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(!store.any_admin().await.unwrap());
        let updated = store.set_custom_claim(&p.uid, "admin", json!(true)).await.unwrap();
        assert!(updated.is_admin());
        assert_eq!(updated.custom_claims["org"], json!("north"));
        assert!(store.any_admin().await.unwrap());
    }

    #[tokio::test]
    async fn test_updates_on_missing_uid_fail() {
        let store = InMemoryPrincipalStore::new();
        assert!(matches!(
            store.set_disabled("ghost", true).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.record_sign_in("ghost").await,
            Err(StoreError::NotFound(_))
        ));
    }
}
