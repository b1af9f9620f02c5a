// admin-console-rs/src/resolver.rs
//
// Admin status resolution: always pulls a fresh token, fails closed.

use tracing::{debug, error};

use shared_types::CustomClaims;

use crate::identity::{admin_claim_present, AuthUser, IdentityError, IdentityProvider};

/// Whether `principal` currently holds the admin claim.
///
/// Forces a token refresh so claim changes made server-side since the last
/// sign-in are observed. Any refresh failure yields `false`.
pub async fn check_is_admin(provider: &dyn IdentityProvider, principal: Option<&AuthUser>) -> bool {
    let user = match principal {
        Some(user) => user,
        None => return false,
    };

    match provider.get_id_token_result(user, true).await {
        Ok(result) => {
            let is_admin = result.is_admin();
            debug!(uid = %user.uid, is_admin, "Resolved admin status");
            is_admin
        }
        Err(e) => {
            error!(uid = %user.uid, "Error checking admin status: {}", e);
            false
        }
    }
}

/// Cached and refreshed claims side by side.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimInspection {
    pub cached: CustomClaims,
    pub refreshed: CustomClaims,
}

impl ClaimInspection {
    pub fn cached_admin(&self) -> bool {
        admin_claim_present(&self.cached)
    }

    pub fn refreshed_admin(&self) -> bool {
        admin_claim_present(&self.refreshed)
    }

    /// The cached token disagrees with the provider about admin.
    pub fn is_stale(&self) -> bool {
        self.cached_admin() != self.refreshed_admin()
    }
}

pub async fn inspect_claims(
    provider: &dyn IdentityProvider,
    principal: &AuthUser,
) -> Result<ClaimInspection, IdentityError> {
    let cached = provider.get_id_token_result(principal, false).await?;
    let refreshed = provider.get_id_token_result(principal, true).await?;
    Ok(ClaimInspection {
        cached: cached.claims,
        refreshed: refreshed.claims,
    })
}
