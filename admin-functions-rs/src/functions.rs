// admin-functions-rs/src/functions.rs
//
// Privileged callable functions (the only writers of the admin claim)
// Provides:
// - addAdminRole / removeAdminRole
// - listAllUsers
// - getUserByEmail
// - setUserDisabled
//
// Every operation checks the caller's presented token claims at call time.
// Client-asserted admin status is never consulted.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{error, info, warn};

use shared_types::callable::{
    ADD_ADMIN_ROLE, GET_USER_BY_EMAIL, LIST_ALL_USERS, REMOVE_ADMIN_ROLE, SET_USER_DISABLED,
};
use shared_types::{
    AdminRoleResult, CallableError, ListUsersResult, Principal, ADMIN_CLAIM, DEFAULT_MAX_RESULTS,
};

use crate::audit::{AuditLog, EventType, Outcome};
use crate::jwt::IdentityClaims;
use crate::storage::{PrincipalStore, StoreError};

const EMAIL_REQUIRED: &str = "Email is required and must be a string.";
const UID_REQUIRED: &str = "UID is required and must be a string.";
const DISABLED_REQUIRED: &str = "Disabled status must be a boolean.";

/// Verified identity of the caller, taken from its bearer token.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub uid: String,
    pub token: IdentityClaims,
}

/// Per-call context; `auth` is absent for calls without a bearer token.
#[derive(Debug, Clone, Default)]
pub struct CallerContext {
    pub auth: Option<AuthContext>,
}

impl CallerContext {
    pub fn anonymous() -> Self {
        Self { auth: None }
    }

    pub fn authenticated(token: IdentityClaims) -> Self {
        Self {
            auth: Some(AuthContext {
                uid: token.sub.clone(),
                token,
            }),
        }
    }

    /// Strict boolean admin claim from the verified token.
    pub fn is_admin(&self) -> bool {
        self.auth
            .as_ref()
            .map(|auth| auth.token.is_admin())
            .unwrap_or(false)
    }

    pub fn actor(&self) -> &str {
        self.auth
            .as_ref()
            .map(|auth| auth.uid.as_str())
            .unwrap_or("anonymous")
    }
}

/// How the very first admin may be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BootstrapPolicy {
    /// Only admins may grant admin.
    #[default]
    Locked,
    /// `addAdminRole` skips the caller check while no admin exists anywhere.
    FirstAdmin,
}

impl BootstrapPolicy {
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            BootstrapPolicy::FirstAdmin
        } else {
            BootstrapPolicy::Locked
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BootstrapPolicy::Locked => "locked",
            BootstrapPolicy::FirstAdmin => "first-admin",
        }
    }
}

/// The five privileged operations over a principal store.
pub struct AdminFunctions {
    store: Arc<dyn PrincipalStore>,
    audit: Arc<AuditLog>,
    bootstrap: BootstrapPolicy,
    bootstrap_lock: Mutex<()>,
}

impl AdminFunctions {
    pub fn new(
        store: Arc<dyn PrincipalStore>,
        audit: Arc<AuditLog>,
        bootstrap: BootstrapPolicy,
    ) -> Self {
        if bootstrap == BootstrapPolicy::FirstAdmin {
            warn!("First-admin bootstrap is enabled; disable it once an admin exists");
        }
        Self {
            store,
            audit,
            bootstrap,
            bootstrap_lock: Mutex::new(()),
        }
    }

    pub fn bootstrap_policy(&self) -> BootstrapPolicy {
        self.bootstrap
    }

    pub fn store(&self) -> &Arc<dyn PrincipalStore> {
        &self.store
    }

    pub fn audit(&self) -> &Arc<AuditLog> {
        &self.audit
    }

    /// Grant the admin claim to the principal with `data.email`.
    pub async fn add_admin_role(
        &self,
        ctx: &CallerContext,
        data: &Value,
    ) -> Result<AdminRoleResult, CallableError> {
        // Held until the grant is written so concurrent bootstraps cannot both pass.
        let mut bootstrap_guard = None;
        if !ctx.is_admin() {
            match self.bootstrap_bypass().await {
                Some(guard) => bootstrap_guard = Some(guard),
                None => {
                    return Err(self
                        .deny(ctx, ADD_ADMIN_ROLE, "Only admins can add other admins.")
                        .await)
                }
            }
        }

        let email = self
            .require_string(ctx, ADD_ADMIN_ROLE, data, "email", EMAIL_REQUIRED)
            .await?;

        let principal = match self.write_admin_claim(email, true).await {
            Ok(principal) => principal,
            Err(e) => {
                error!(email = %email, "Error adding admin role: {}", e);
                let err = CallableError::internal(format!("Error adding admin role: {}", e));
                return Err(self.fail(ctx, ADD_ADMIN_ROLE, Some(email), err).await);
            }
        };

        let message = format!("Success! {} has been made an admin.", email);
        let event_type = if bootstrap_guard.is_some() {
            warn!(uid = %principal.uid, actor = %ctx.actor(), "Granted first admin through bootstrap");
            EventType::BootstrapAdminGranted
        } else {
            EventType::AdminRoleGranted
        };
        self.audit
            .record(
                event_type,
                ADD_ADMIN_ROLE,
                ctx.actor(),
                Some(principal.uid.as_str()),
                Outcome::Success,
                &message,
            )
            .await;
        drop(bootstrap_guard);

        Ok(AdminRoleResult {
            message,
            uid: principal.uid,
        })
    }

    /// Set the admin claim of the principal with `data.email` to false.
    pub async fn remove_admin_role(
        &self,
        ctx: &CallerContext,
        data: &Value,
    ) -> Result<AdminRoleResult, CallableError> {
        if !ctx.is_admin() {
            return Err(self
                .deny(ctx, REMOVE_ADMIN_ROLE, "Only admins can remove admin roles.")
                .await);
        }

        let email = self
            .require_string(ctx, REMOVE_ADMIN_ROLE, data, "email", EMAIL_REQUIRED)
            .await?;

        let principal = match self.write_admin_claim(email, false).await {
            Ok(principal) => principal,
            Err(e) => {
                error!(email = %email, "Error removing admin role: {}", e);
                let err = CallableError::internal(format!("Error removing admin role: {}", e));
                return Err(self.fail(ctx, REMOVE_ADMIN_ROLE, Some(email), err).await);
            }
        };

        let message = format!("Success! Admin role removed from {}.", email);
        self.audit
            .record(
                EventType::AdminRoleRevoked,
                REMOVE_ADMIN_ROLE,
                ctx.actor(),
                Some(principal.uid.as_str()),
                Outcome::Success,
                &message,
            )
            .await;

        Ok(AdminRoleResult {
            message,
            uid: principal.uid,
        })
    }

    /// One page of principals; `maxResults` defaults to 1000.
    pub async fn list_all_users(
        &self,
        ctx: &CallerContext,
        data: &Value,
    ) -> Result<ListUsersResult, CallableError> {
        if !ctx.is_admin() {
            return Err(self.deny(ctx, LIST_ALL_USERS, "Only admins can list users.").await);
        }

        let page = match Self::page_request(data) {
            Ok((max_results, page_token)) => self.store.list(max_results, page_token).await,
            Err(e) => Err(e),
        };

        match page {
            Ok(page) => {
                self.audit
                    .record(
                        EventType::UsersListed,
                        LIST_ALL_USERS,
                        ctx.actor(),
                        None,
                        Outcome::Success,
                        format!("Listed {} users", page.principals.len()),
                    )
                    .await;
                Ok(ListUsersResult {
                    users: page.principals,
                    page_token: page.next_page_token,
                })
            }
            Err(e) => {
                error!("Error listing users: {}", e);
                let err = CallableError::internal(format!("Error listing users: {}", e));
                Err(self.fail(ctx, LIST_ALL_USERS, None, err).await)
            }
        }
    }

    /// Public fields of the principal with `data.email`.
    pub async fn get_user_by_email(
        &self,
        ctx: &CallerContext,
        data: &Value,
    ) -> Result<Principal, CallableError> {
        if !ctx.is_admin() {
            return Err(self
                .deny(ctx, GET_USER_BY_EMAIL, "Only admins can get user details.")
                .await);
        }

        let email = self
            .require_string(ctx, GET_USER_BY_EMAIL, data, "email", EMAIL_REQUIRED)
            .await?;

        match self.store.get_by_email(email).await {
            Ok(principal) => {
                self.audit
                    .record(
                        EventType::UserLookedUp,
                        GET_USER_BY_EMAIL,
                        ctx.actor(),
                        Some(principal.uid.as_str()),
                        Outcome::Success,
                        format!("Looked up {}", email),
                    )
                    .await;
                Ok(principal)
            }
            Err(e) => {
                error!(email = %email, "Error getting user: {}", e);
                let err = match e {
                    StoreError::NotFound(_) => CallableError::not_found(format!("User not found: {}", e)),
                    other => CallableError::internal(format!("Error getting user: {}", other)),
                };
                Err(self.fail(ctx, GET_USER_BY_EMAIL, Some(email), err).await)
            }
        }
    }

    /// Enable or disable the principal with `data.uid`.
    pub async fn set_user_disabled(
        &self,
        ctx: &CallerContext,
        data: &Value,
    ) -> Result<AdminRoleResult, CallableError> {
        if !ctx.is_admin() {
            return Err(self
                .deny(ctx, SET_USER_DISABLED, "Only admins can disable/enable users.")
                .await);
        }

        let uid = self
            .require_string(ctx, SET_USER_DISABLED, data, "uid", UID_REQUIRED)
            .await?;
        let disabled = match data.get("disabled") {
            Some(Value::Bool(disabled)) => *disabled,
            _ => {
                let err = CallableError::invalid_argument(DISABLED_REQUIRED);
                return Err(self.fail(ctx, SET_USER_DISABLED, Some(uid), err).await);
            }
        };

        if let Err(e) = self.store.set_disabled(uid, disabled).await {
            error!(uid = %uid, "Error updating user: {}", e);
            let err = CallableError::internal(format!("Error updating user: {}", e));
            return Err(self.fail(ctx, SET_USER_DISABLED, Some(uid), err).await);
        }

        let (event_type, verb) = if disabled {
            (EventType::UserDisabled, "disabled")
        } else {
            (EventType::UserEnabled, "enabled")
        };
        let message = format!("User {} successfully.", verb);
        self.audit
            .record(event_type, SET_USER_DISABLED, ctx.actor(), Some(uid), Outcome::Success, &message)
            .await;

        Ok(AdminRoleResult {
            message,
            uid: uid.to_string(),
        })
    }

    async fn write_admin_claim(&self, email: &str, admin: bool) -> Result<Principal, StoreError> {
        let principal = self.store.get_by_email(email).await?;
        let updated = self
            .store
            .set_custom_claim(&principal.uid, ADMIN_CLAIM, Value::Bool(admin))
            .await?;
        info!(uid = %updated.uid, admin, "Admin claim updated");
        Ok(updated)
    }

    /// Returns a held bootstrap lock when the bypass applies right now.
    async fn bootstrap_bypass(&self) -> Option<MutexGuard<'_, ()>> {
        if self.bootstrap != BootstrapPolicy::FirstAdmin {
            return None;
        }

        let guard = self.bootstrap_lock.lock().await;
        match self.store.any_admin().await {
            Ok(false) => Some(guard),
            Ok(true) => None,
            Err(e) => {
                error!("Bootstrap check failed, refusing bypass: {}", e);
                None
            }
        }
    }

    fn page_request(data: &Value) -> Result<(usize, Option<&str>), StoreError> {
        let max_results = match data.get("maxResults") {
            None | Some(Value::Null) => DEFAULT_MAX_RESULTS,
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => DEFAULT_MAX_RESULTS,
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| StoreError::InvalidPageSize(n.to_string()))?,
            Some(other) => return Err(StoreError::InvalidPageSize(other.to_string())),
        };

        let page_token = match data.get("pageToken") {
            None | Some(Value::Null) => None,
            Some(Value::String(token)) if token.is_empty() => None,
            Some(Value::String(token)) => Some(token.as_str()),
            Some(_) => return Err(StoreError::InvalidPageToken),
        };

        Ok((max_results, page_token))
    }

    async fn require_string<'a>(
        &self,
        ctx: &CallerContext,
        operation: &str,
        data: &'a Value,
        field: &str,
        message: &str,
    ) -> Result<&'a str, CallableError> {
        match data.get(field).and_then(Value::as_str) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(self
                .fail(ctx, operation, None, CallableError::invalid_argument(message))
                .await),
        }
    }

    async fn deny(&self, ctx: &CallerContext, operation: &str, message: &str) -> CallableError {
        self.audit
            .record(EventType::AccessDenied, operation, ctx.actor(), None, Outcome::Denied, message)
            .await;
        CallableError::permission_denied(message)
    }

    async fn fail(
        &self,
        ctx: &CallerContext,
        operation: &str,
        target: Option<&str>,
        err: CallableError,
    ) -> CallableError {
        self.audit
            .record(
                EventType::OperationFailed,
                operation,
                ctx.actor(),
                target,
                Outcome::Failure,
                &err.message,
            )
            .await;
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::tests::create_test_issuer;
    use crate::storage::{InMemoryPrincipalStore, NewPrincipal};
    use serde_json::json;
    use shared_types::ErrorKind;

    struct Fixture {
        functions: AdminFunctions,
        store: Arc<InMemoryPrincipalStore>,
    }

    async fn fixture(bootstrap: BootstrapPolicy) -> Fixture {
        let store = Arc::new(InMemoryPrincipalStore::new());
        let functions = AdminFunctions::new(store.clone(), Arc::new(AuditLog::default()), bootstrap);
        Fixture { functions, store }
    }

    async fn caller(store: &InMemoryPrincipalStore, email: &str, admin: bool) -> CallerContext {
        let principal = store.create(NewPrincipal::with_email(email)).await.unwrap();
        let principal = if admin {
            store.set_custom_claim(&principal.uid, ADMIN_CLAIM, json!(true)).await.unwrap()
        } else {
            principal
        };
        let (_, claims) = create_test_issuer().issue(&principal).unwrap();
        CallerContext::authenticated(claims)
    }

    #[tokio::test]
    async fn test_non_admin_denied_everywhere_without_mutation() {
        let f = fixture(BootstrapPolicy::Locked).await;
        let ctx = caller(&f.store, "plain@example.com", false).await;
        let target = f.store.create(NewPrincipal::with_email("t@example.com")).await.unwrap();

        let email = json!({"email": "t@example.com"});
        let errors = vec![
            f.functions.add_admin_role(&ctx, &email).await.unwrap_err(),
            f.functions.remove_admin_role(&ctx, &email).await.unwrap_err(),
            f.functions.list_all_users(&ctx, &json!({})).await.unwrap_err(),
            f.functions.get_user_by_email(&ctx, &email).await.unwrap_err(),
            f.functions
                .set_user_disabled(&ctx, &json!({"uid": target.uid, "disabled": true}))
                .await
                .unwrap_err(),
        ];
        assert!(errors.iter().all(|e| e.kind == ErrorKind::PermissionDenied));
        assert_eq!(errors[0].message, "Only admins can add other admins.");
        assert_eq!(errors[4].message, "Only admins can disable/enable users.");

        let after = f.store.get_by_uid(&target.uid).await.unwrap();
        assert_eq!(after, target);
    }

    #[tokio::test]
    async fn test_permission_checked_before_validation() {
        let f = fixture(BootstrapPolicy::Locked).await;
        let err = f
            .functions
            .add_admin_role(&CallerContext::anonymous(), &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::PermissionDenied);
    }

    #[tokio::test]
    async fn test_invalid_arguments() {
        let f = fixture(BootstrapPolicy::Locked).await;
        let ctx = caller(&f.store, "root@example.com", true).await;

        for data in [json!({}), json!({"email": ""}), json!({"email": 7})] {
            let err = f.functions.add_admin_role(&ctx, &data).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidArgument);
            assert_eq!(err.message, EMAIL_REQUIRED);
        }

        let err = f
            .functions
            .set_user_disabled(&ctx, &json!({"disabled": true}))
            .await
            .unwrap_err();
        assert_eq!(err.message, UID_REQUIRED);

        let err = f
            .functions
            .set_user_disabled(&ctx, &json!({"uid": "u", "disabled": "yes"}))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert_eq!(err.message, DISABLED_REQUIRED);
    }

    #[tokio::test]
    async fn test_grant_then_lookup_shows_admin() {
        let f = fixture(BootstrapPolicy::Locked).await;
        let ctx = caller(&f.store, "root@example.com", true).await;
        let target = f.store.create(NewPrincipal::with_email("b@example.com")).await.unwrap();

        let result = f
            .functions
            .add_admin_role(&ctx, &json!({"email": "b@example.com"}))
            .await
            .unwrap();
        assert_eq!(result.uid, target.uid);
        assert_eq!(result.message, "Success! b@example.com has been made an admin.");

        let found = f
            .functions
            .get_user_by_email(&ctx, &json!({"email": "b@example.com"}))
            .await
            .unwrap();
        assert_eq!(found.custom_claims[ADMIN_CLAIM], json!(true));
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let f = fixture(BootstrapPolicy::Locked).await;
        let ctx = caller(&f.store, "root@example.com", true).await;
        f.store.create(NewPrincipal::with_email("b@example.com")).await.unwrap();
        let data = json!({"email": "b@example.com"});

        f.functions.add_admin_role(&ctx, &data).await.unwrap();
        for _ in 0..2 {
            let result = f.functions.remove_admin_role(&ctx, &data).await.unwrap();
            assert_eq!(result.message, "Success! Admin role removed from b@example.com.");
            let p = f.store.get_by_email("b@example.com").await.unwrap();
            assert_eq!(p.custom_claims[ADMIN_CLAIM], json!(false));
        }
    }

    #[tokio::test]
    async fn test_unknown_email_on_grant_is_internal_on_lookup_not_found() {
        let f = fixture(BootstrapPolicy::Locked).await;
        let ctx = caller(&f.store, "root@example.com", true).await;
        let data = json!({"email": "ghost@example.com"});

        let err = f.functions.add_admin_role(&ctx, &data).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);
        assert!(err.message.starts_with("Error adding admin role: "));

        let err = f.functions.get_user_by_email(&ctx, &data).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert!(err.message.starts_with("User not found: "));
    }

    #[tokio::test]
    async fn test_list_defaults_and_paging() {
        let f = fixture(BootstrapPolicy::Locked).await;
        let ctx = caller(&f.store, "root@example.com", true).await;
        for i in 0..4 {
            f.store
                .create(NewPrincipal::with_email(&format!("u{}@example.com", i)))
                .await
                .unwrap();
        }

        let all = f.functions.list_all_users(&ctx, &json!({})).await.unwrap();
        assert_eq!(all.users.len(), 5);
        assert!(all.page_token.is_none());

        let zero = f.functions.list_all_users(&ctx, &json!({"maxResults": 0})).await.unwrap();
        assert_eq!(zero.users.len(), 5);

        let first = f.functions.list_all_users(&ctx, &json!({"maxResults": 3})).await.unwrap();
        assert_eq!(first.users.len(), 3);
        let token = first.page_token.unwrap();
        let rest = f
            .functions
            .list_all_users(&ctx, &json!({"maxResults": 3, "pageToken": token}))
            .await
            .unwrap();
        assert_eq!(rest.users.len(), 2);
        assert!(rest.page_token.is_none());

        let err = f
            .functions
            .list_all_users(&ctx, &json!({"maxResults": 5000}))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);
        assert!(err.message.starts_with("Error listing users: "));
    }

    async fn seed(store: &InMemoryPrincipalStore, count: usize) {
        for i in 0..count {
            store
                .create(NewPrincipal::with_email(&format!("seed{}@example.com", i)))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_default_page_is_one_thousand() {
        let f = fixture(BootstrapPolicy::Locked).await;
        let ctx = caller(&f.store, "root@example.com", true).await;
        seed(&f.store, 1000).await;

        let first = f.functions.list_all_users(&ctx, &json!({})).await.unwrap();
        assert_eq!(first.users.len(), DEFAULT_MAX_RESULTS);
        let token = first.page_token.expect("a principal remains beyond the first page");

        let rest = f
            .functions
            .list_all_users(&ctx, &json!({"pageToken": token}))
            .await
            .unwrap();
        assert_eq!(rest.users.len(), 1);
        assert!(rest.page_token.is_none());
    }

    #[tokio::test]
    async fn test_exactly_one_thousand_has_no_page_token() {
        let f = fixture(BootstrapPolicy::Locked).await;
        let ctx = caller(&f.store, "root@example.com", true).await;
        seed(&f.store, 999).await;

        let all = f.functions.list_all_users(&ctx, &json!({})).await.unwrap();
        assert_eq!(all.users.len(), 1000);
        assert!(all.page_token.is_none());
    }

    #[tokio::test]
    async fn test_oversized_page_size_is_rejected_not_wrapped() {
        let f = fixture(BootstrapPolicy::Locked).await;
        let ctx = caller(&f.store, "root@example.com", true).await;

        for size in [json!(4_294_967_301u64), json!(u64::MAX)] {
            let err = f
                .functions
                .list_all_users(&ctx, &json!({"maxResults": size}))
                .await
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::Internal);
            assert!(err.message.starts_with("Error listing users: "));
        }
    }

    #[tokio::test]
    async fn test_set_disabled_messages() {
        let f = fixture(BootstrapPolicy::Locked).await;
        let ctx = caller(&f.store, "root@example.com", true).await;
        let target = f.store.create(NewPrincipal::with_email("t@example.com")).await.unwrap();

        let result = f
            .functions
            .set_user_disabled(&ctx, &json!({"uid": target.uid, "disabled": true}))
            .await
            .unwrap();
        assert_eq!(result.message, "User disabled successfully.");
        assert!(f.store.get_by_uid(&target.uid).await.unwrap().disabled);

        let result = f
            .functions
            .set_user_disabled(&ctx, &json!({"uid": target.uid, "disabled": false}))
            .await
            .unwrap();
        assert_eq!(result.message, "User enabled successfully.");

        let err = f
            .functions
            .set_user_disabled(&ctx, &json!({"uid": "ghost", "disabled": true}))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);
    }

    #[tokio::test]
    async fn test_bootstrap_only_while_no_admin_exists() {
        let f = fixture(BootstrapPolicy::FirstAdmin).await;
        f.store.create(NewPrincipal::with_email("first@example.com")).await.unwrap();
        f.store.create(NewPrincipal::with_email("second@example.com")).await.unwrap();

        let anonymous = CallerContext::anonymous();
        f.functions
            .add_admin_role(&anonymous, &json!({"email": "first@example.com"}))
            .await
            .unwrap();
        assert_eq!(
            f.functions.audit().events_of(EventType::BootstrapAdminGranted).await.len(),
            1
        );

        let err = f
            .functions
            .add_admin_role(&anonymous, &json!({"email": "second@example.com"}))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::PermissionDenied);
        assert!(!f.store.get_by_email("second@example.com").await.unwrap().is_admin());
    }

    #[tokio::test]
    async fn test_bootstrap_never_covers_other_operations() {
        let f = fixture(BootstrapPolicy::FirstAdmin).await;
        let err = f
            .functions
            .list_all_users(&CallerContext::anonymous(), &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::PermissionDenied);
    }

    #[tokio::test]
    async fn test_locked_policy_has_no_bypass() {
        let f = fixture(BootstrapPolicy::Locked).await;
        f.store.create(NewPrincipal::with_email("first@example.com")).await.unwrap();
        let err = f
            .functions
            .add_admin_role(&CallerContext::anonymous(), &json!({"email": "first@example.com"}))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::PermissionDenied);
    }
}
