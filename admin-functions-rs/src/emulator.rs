// admin-functions-rs/src/emulator.rs
//
// Local stand-in for the external identity provider: provisions principals,
// signs them in and re-issues their tokens on refresh.

use std::sync::Arc;

use tracing::info;

use shared_types::Principal;

use crate::jwt::{IdentityClaims, IdentityTokenIssuer, TokenError};
use crate::storage::{NewPrincipal, PrincipalStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum EmulatorError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

/// A token as handed to a signed-in client.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: IdentityClaims,
}

pub struct IdentityEmulator {
    store: Arc<dyn PrincipalStore>,
    issuer: Arc<IdentityTokenIssuer>,
}

impl IdentityEmulator {
    pub fn new(store: Arc<dyn PrincipalStore>, issuer: Arc<IdentityTokenIssuer>) -> Self {
        Self { store, issuer }
    }

    pub fn issuer(&self) -> &Arc<IdentityTokenIssuer> {
        &self.issuer
    }

    pub async fn provision(&self, new: NewPrincipal) -> Result<Principal, EmulatorError> {
        Ok(self.store.create(new).await?)
    }

    /// Sign in by email; the sign-in time is stamped only once a token is issued.
    pub async fn sign_in(&self, email: &str) -> Result<(Principal, IssuedToken), EmulatorError> {
        let principal = self.store.get_by_email(email).await?;
        let (token, claims) = self.issuer.issue(&principal)?;
        let principal = self.store.record_sign_in(&principal.uid).await?;
        info!(uid = %principal.uid, "Principal signed in");
        Ok((principal, IssuedToken { token, claims }))
    }

    /// Issue a fresh token reflecting the principal's current claims.
    pub async fn refresh(&self, uid: &str) -> Result<IssuedToken, EmulatorError> {
        let principal = self.store.get_by_uid(uid).await?;
        let (token, claims) = self.issuer.issue(&principal)?;
        Ok(IssuedToken { token, claims })
    }
}
