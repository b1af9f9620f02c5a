// admin-console-rs/src/facade.rs
//
// Typed wrappers over the privileged callable functions.
// Failures come back exactly as the server produced them; nothing is retried.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use shared_types::callable::{
    ADD_ADMIN_ROLE, GET_USER_BY_EMAIL, LIST_ALL_USERS, REMOVE_ADMIN_ROLE, SET_USER_DISABLED,
};
use shared_types::{
    AdminRoleResult, CallableError, EmailRequest, ListUsersRequest, ListUsersResult, Principal,
    SetDisabledRequest,
};

pub const CHANNEL_NOT_INITIALIZED: &str = "Remote call channel not initialized";

/// Transport for named remote calls
#[async_trait]
pub trait CallableChannel: Send + Sync {
    async fn call(&self, name: &str, data: Value) -> Result<Value, CallableError>;
}

#[derive(Clone, Default)]
pub struct PrivilegedOperations {
    channel: Option<Arc<dyn CallableChannel>>,
}

impl PrivilegedOperations {
    pub fn new(channel: Option<Arc<dyn CallableChannel>>) -> Self {
        Self { channel }
    }

    pub fn with_channel(channel: Arc<dyn CallableChannel>) -> Self {
        Self::new(Some(channel))
    }

    pub fn is_initialized(&self) -> bool {
        self.channel.is_some()
    }

    pub async fn add_admin_role(&self, email: &str) -> Result<AdminRoleResult, CallableError> {
        self.invoke(ADD_ADMIN_ROLE, &EmailRequest { email: email.to_string() })
            .await
    }

    pub async fn remove_admin_role(&self, email: &str) -> Result<AdminRoleResult, CallableError> {
        self.invoke(REMOVE_ADMIN_ROLE, &EmailRequest { email: email.to_string() })
            .await
    }

    pub async fn list_all_users(
        &self,
        max_results: Option<usize>,
        page_token: Option<&str>,
    ) -> Result<ListUsersResult, CallableError> {
        let request = ListUsersRequest {
            max_results,
            page_token: page_token.map(str::to_string),
        };
        self.invoke(LIST_ALL_USERS, &request).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Principal, CallableError> {
        self.invoke(GET_USER_BY_EMAIL, &EmailRequest { email: email.to_string() })
            .await
    }

    pub async fn set_user_disabled(
        &self,
        uid: &str,
        disabled: bool,
    ) -> Result<AdminRoleResult, CallableError> {
        let request = SetDisabledRequest {
            uid: uid.to_string(),
            disabled,
        };
        self.invoke(SET_USER_DISABLED, &request).await
    }

    async fn invoke<Req, Res>(&self, name: &str, request: &Req) -> Result<Res, CallableError>
    where
        Req: Serialize + Sync,
        Res: DeserializeOwned,
    {
        let channel = match &self.channel {
            Some(channel) => channel,
            None => {
                error!(operation = name, "{}", CHANNEL_NOT_INITIALIZED);
                return Err(CallableError::uninitialized(CHANNEL_NOT_INITIALIZED));
            }
        };

        let data = serde_json::to_value(request).map_err(|e| {
            CallableError::internal(format!("Failed to encode request for {}: {}", name, e))
        })?;
        debug!(operation = name, "Calling privileged function");

        let value = channel.call(name, data).await.map_err(|err| {
            error!(operation = name, kind = %err.kind, "Error calling {}: {}", name, err.message);
            err
        })?;

        serde_json::from_value(value).map_err(|e| {
            error!(operation = name, "Malformed result: {}", e);
            CallableError::internal(format!("Malformed result from {}: {}", name, e))
        })
    }
}
