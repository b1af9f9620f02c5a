// admin-console-rs/src/identity.rs
//
// Client-side contract of the identity provider

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use serde_json::Value;

use shared_types::{CustomClaims, ADMIN_CLAIM};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Session revoked: {0}")]
    SessionRevoked(String),

    #[error("No signed-in user")]
    NotSignedIn,
}

/// The signed-in principal as the client sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
}

impl AuthUser {
    pub fn new(uid: impl Into<String>, email: Option<&str>) -> Self {
        Self {
            uid: uid.into(),
            email: email.map(str::to_string),
        }
    }

    pub fn has_email(&self, email: &str) -> bool {
        self.email
            .as_deref()
            .map(|own| own.eq_ignore_ascii_case(email.trim()))
            .unwrap_or(false)
    }
}

/// An identity token together with its decoded claims.
#[derive(Debug, Clone, PartialEq)]
pub struct IdTokenResult {
    pub token: String,
    pub claims: CustomClaims,
}

impl IdTokenResult {
    pub fn is_admin(&self) -> bool {
        admin_claim_present(&self.claims)
    }
}

/// Client-side reading of the `admin` claim: any truthy value counts.
///
/// Only gates what the console shows; the functions re-check strictly.
pub fn admin_claim_present(claims: &CustomClaims) -> bool {
    match claims.get(ADMIN_CLAIM) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(n)) => n.as_f64().map(|n| n != 0.0 && !n.is_nan()).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Currently signed-in user, if any
    fn current_user(&self) -> Option<AuthUser>;

    /// Token for `user`; `force_refresh` bypasses the local token cache
    async fn get_id_token_result(
        &self,
        user: &AuthUser,
        force_refresh: bool,
    ) -> Result<IdTokenResult, IdentityError>;
}
