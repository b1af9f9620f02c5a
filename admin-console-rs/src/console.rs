// admin-console-rs/src/console.rs
//
// Admin screen workflows over the privileged operations and the session

use std::sync::Arc;

use tracing::{info, warn};

use shared_types::{CallableError, ListUsersResult, PhotoNotesConfig, Principal};

use crate::callable::HttpCallableChannel;
use crate::facade::{CallableChannel, PrivilegedOperations};
use crate::identity::IdentityProvider;
use crate::session::AdminSession;

pub const PROPAGATION_NOTICE: &str = "Changes to admin roles may take a few minutes to propagate. \
Affected users may need to sign out and sign back in for the change to take effect.";

const EMAIL_REQUIRED: &str = "Email is required and must be a string.";

/// Result of a grant or revoke as shown to the operator.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleChangeOutcome {
    pub message: String,
    pub uid: String,
    /// The operator changed their own role.
    pub self_affecting: bool,
    pub notice: &'static str,
}

pub struct AdminConsole {
    operations: PrivilegedOperations,
    session: AdminSession,
}

impl AdminConsole {
    pub fn new(operations: PrivilegedOperations, session: AdminSession) -> Self {
        Self { operations, session }
    }

    /// Console over the configured functions URL.
    ///
    /// Without a URL every privileged call fails as uninitialized.
    pub fn from_config(
        config: &PhotoNotesConfig,
        provider: Arc<dyn IdentityProvider>,
    ) -> Result<Self, CallableError> {
        let channel = HttpCallableChannel::from_config(config, provider.clone())?
            .map(|channel| Arc::new(channel) as Arc<dyn CallableChannel>);
        Ok(Self::new(
            PrivilegedOperations::new(channel),
            AdminSession::new(provider),
        ))
    }

    pub fn session(&self) -> &AdminSession {
        &self.session
    }

    pub fn operations(&self) -> &PrivilegedOperations {
        &self.operations
    }

    pub async fn grant_admin(&self, email: &str) -> Result<RoleChangeOutcome, CallableError> {
        let email = required_email(email)?;
        let result = self.operations.add_admin_role(email).await?;
        Ok(self.after_role_change(email, result.message, result.uid).await)
    }

    pub async fn revoke_admin(&self, email: &str) -> Result<RoleChangeOutcome, CallableError> {
        let email = required_email(email)?;
        let result = self.operations.remove_admin_role(email).await?;
        Ok(self.after_role_change(email, result.message, result.uid).await)
    }

    /// First page of principals.
    pub async fn load_users(
        &self,
        page_size: Option<usize>,
        page_token: Option<&str>,
    ) -> Result<ListUsersResult, CallableError> {
        self.operations.list_all_users(page_size, page_token).await
    }

    pub async fn find_user(&self, email: &str) -> Result<Principal, CallableError> {
        let email = required_email(email)?;
        self.operations.get_user_by_email(email).await
    }

    /// Flip the disabled flag and return the principal as it now stands.
    pub async fn toggle_user_disabled(&self, principal: &Principal) -> Result<Principal, CallableError> {
        let disabled = !principal.disabled;
        let result = self.operations.set_user_disabled(&principal.uid, disabled).await?;
        info!(uid = %principal.uid, disabled, "{}", result.message);

        let mut updated = principal.clone();
        updated.disabled = disabled;
        Ok(updated)
    }

    /// Grant the first admin from the setup screen.
    pub async fn setup_first_admin(&self, email: &str) -> Result<String, CallableError> {
        let email = required_email(email)?;
        self.operations.add_admin_role(email).await?;
        self.session.refresh_admin_status().await;
        Ok(format!(
            "Success! {} has been made an admin. You can now sign in and access the admin dashboard.",
            email
        ))
    }

    async fn after_role_change(&self, email: &str, message: String, uid: String) -> RoleChangeOutcome {
        let self_affecting = self
            .session
            .principal()
            .map(|user| user.uid == uid || user.has_email(email))
            .unwrap_or(false);

        if self_affecting {
            warn!(uid = %uid, "Operator changed their own admin role");
            self.session.mark_claims_stale();
        }
        self.session.refresh_admin_status().await;

        RoleChangeOutcome {
            message,
            uid,
            self_affecting,
            notice: PROPAGATION_NOTICE,
        }
    }
}

fn required_email(email: &str) -> Result<&str, CallableError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(CallableError::invalid_argument(EMAIL_REQUIRED));
    }
    Ok(email)
}
