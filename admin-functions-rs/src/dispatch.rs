// admin-functions-rs/src/dispatch.rs
//
// Routes a named callable invocation to its privileged function.
// Bearer tokens are verified here; a rejected token never reaches an operation.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use shared_types::callable::{
    ADD_ADMIN_ROLE, GET_USER_BY_EMAIL, LIST_ALL_USERS, REMOVE_ADMIN_ROLE, SET_USER_DISABLED,
};
use shared_types::CallableError;

use crate::audit::{EventType, Outcome};
use crate::functions::{AdminFunctions, CallerContext};
use crate::jwt::IdentityTokenIssuer;

pub struct CallableDispatcher {
    functions: Arc<AdminFunctions>,
    issuer: Arc<IdentityTokenIssuer>,
}

impl CallableDispatcher {
    pub fn new(functions: Arc<AdminFunctions>, issuer: Arc<IdentityTokenIssuer>) -> Self {
        Self { functions, issuer }
    }

    pub fn functions(&self) -> &Arc<AdminFunctions> {
        &self.functions
    }

    /// Build the caller context from an optional bearer token.
    pub async fn authenticate(
        &self,
        operation: &str,
        bearer: Option<&str>,
    ) -> Result<CallerContext, CallableError> {
        let token = match bearer {
            Some(token) if !token.trim().is_empty() => token.trim(),
            _ => return Ok(CallerContext::anonymous()),
        };

        match self.issuer.verify(token) {
            Ok(claims) => Ok(CallerContext::authenticated(claims)),
            Err(e) => {
                warn!(operation, "Rejected bearer token: {}", e);
                self.functions
                    .audit()
                    .record(
                        EventType::TokenRejected,
                        operation,
                        "anonymous",
                        None,
                        Outcome::Denied,
                        e.to_string(),
                    )
                    .await;
                Err(CallableError::unauthenticated(e.to_string()))
            }
        }
    }

    /// Invoke `operation` with the given bearer token and payload.
    pub async fn dispatch(
        &self,
        operation: &str,
        bearer: Option<&str>,
        data: &Value,
    ) -> Result<Value, CallableError> {
        if !is_known(operation) {
            return Err(CallableError::not_found(format!(
                "Function {} does not exist.",
                operation
            )));
        }

        let ctx = self.authenticate(operation, bearer).await?;
        debug!(operation, actor = %ctx.actor(), admin = ctx.is_admin(), "Dispatching callable");

        match operation {
            ADD_ADMIN_ROLE => to_value(self.functions.add_admin_role(&ctx, data).await?),
            REMOVE_ADMIN_ROLE => to_value(self.functions.remove_admin_role(&ctx, data).await?),
            LIST_ALL_USERS => to_value(self.functions.list_all_users(&ctx, data).await?),
            GET_USER_BY_EMAIL => to_value(self.functions.get_user_by_email(&ctx, data).await?),
            SET_USER_DISABLED => to_value(self.functions.set_user_disabled(&ctx, data).await?),
            _ => Err(CallableError::not_found(format!(
                "Function {} does not exist.",
                operation
            ))),
        }
    }
}

fn is_known(operation: &str) -> bool {
    shared_types::callable::OPERATIONS.contains(&operation)
}

fn to_value<T: Serialize>(result: T) -> Result<Value, CallableError> {
    serde_json::to_value(result)
        .map_err(|e| CallableError::internal(format!("Failed to encode result: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditLog;
    use crate::functions::BootstrapPolicy;
    use crate::jwt::tests::create_test_issuer;
    use crate::storage::{InMemoryPrincipalStore, NewPrincipal, PrincipalStore};
    use serde_json::json;
    use shared_types::{ErrorKind, ADMIN_CLAIM};
    use std::time::Duration;

    async fn dispatcher() -> (CallableDispatcher, Arc<InMemoryPrincipalStore>, Arc<IdentityTokenIssuer>) {
        let store = Arc::new(InMemoryPrincipalStore::new());
        let functions = Arc::new(AdminFunctions::new(
            store.clone(),
            Arc::new(AuditLog::default()),
            BootstrapPolicy::Locked,
        ));
        let issuer = Arc::new(create_test_issuer());
        (CallableDispatcher::new(functions, issuer.clone()), store, issuer)
    }

    #[tokio::test]
    async fn test_unknown_operation_is_not_found() {
        let (dispatcher, _, _) = dispatcher().await;
        let err = dispatcher.dispatch("deleteEverything", None, &json!({})).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_missing_token_reaches_permission_check() {
        let (dispatcher, _, _) = dispatcher().await;
        let err = dispatcher.dispatch(LIST_ALL_USERS, None, &json!({})).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::PermissionDenied);
        assert_eq!(err.message, "Only admins can list users.");
    }

    #[tokio::test]
    async fn test_invalid_and_foreign_tokens_are_unauthenticated() {
        let (dispatcher, store, _) = dispatcher().await;
        let admin = store.create(NewPrincipal::with_email("a@example.com")).await.unwrap();
        let admin = store.set_custom_claim(&admin.uid, ADMIN_CLAIM, json!(true)).await.unwrap();

        let forger = IdentityTokenIssuer::new("forged", "photonotes-test", Duration::from_secs(60));
        let (forged, _) = forger.issue(&admin).unwrap();

        for token in ["garbage", forged.as_str()] {
            let err = dispatcher
                .dispatch(LIST_ALL_USERS, Some(token), &json!({}))
                .await
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::Unauthenticated);
        }
        assert_eq!(
            dispatcher.functions().audit().events_of(EventType::TokenRejected).await.len(),
            2
        );
    }

    #[tokio::test]
    async fn test_admin_token_lists_users() {
        let (dispatcher, store, issuer) = dispatcher().await;
        let admin = store.create(NewPrincipal::with_email("a@example.com")).await.unwrap();
        let admin = store.set_custom_claim(&admin.uid, ADMIN_CLAIM, json!(true)).await.unwrap();
        let (token, _) = issuer.issue(&admin).unwrap();

        let value = dispatcher
            .dispatch(LIST_ALL_USERS, Some(&token), &json!({}))
            .await
            .unwrap();
        assert_eq!(value["users"].as_array().unwrap().len(), 1);
        assert!(value.get("pageToken").is_none());
    }
}
