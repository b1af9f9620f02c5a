// admin-console-rs/src/callable.rs
//
// HTTP transport for the callable functions
// - POST {functions_url}/{name} with {"data": ...}
// - Bearer credential from the provider's cached token
// - Envelope decoding into results or structured failures

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::Value;
use tracing::{debug, warn};

use shared_types::{CallRequest, CallResponse, CallableError, PhotoNotesConfig};

use crate::facade::CallableChannel;
use crate::identity::IdentityProvider;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpCallableChannel {
    client: Client,
    base_url: String,
    provider: Arc<dyn IdentityProvider>,
}

impl HttpCallableChannel {
    pub fn new(base_url: &str, provider: Arc<dyn IdentityProvider>) -> Result<Self, CallableError> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| CallableError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            provider,
        })
    }

    /// Channel for the configured functions URL; `None` when none is set.
    pub fn from_config(
        config: &PhotoNotesConfig,
        provider: Arc<dyn IdentityProvider>,
    ) -> Result<Option<Self>, CallableError> {
        match config.functions.url.as_deref() {
            Some(url) if !url.trim().is_empty() => Self::new(url.trim(), provider).map(Some),
            _ => {
                warn!("No functions URL configured; privileged operations are unavailable");
                Ok(None)
            }
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn bearer_token(&self) -> Result<Option<String>, CallableError> {
        let user = match self.provider.current_user() {
            Some(user) => user,
            None => return Ok(None),
        };

        self.provider
            .get_id_token_result(&user, false)
            .await
            .map(|result| Some(result.token))
            .map_err(|e| CallableError::unauthenticated(e.to_string()))
    }
}

#[async_trait]
impl CallableChannel for HttpCallableChannel {
    async fn call(&self, name: &str, data: Value) -> Result<Value, CallableError> {
        let url = format!("{}/{}", self.base_url, name);
        let mut request = self.client.post(&url).json(&CallRequest { data });
        if let Some(token) = self.bearer_token().await? {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| CallableError::internal(format!("Request to {} failed: {}", name, e)))?;
        let status = response.status();
        debug!(operation = name, status = status.as_u16(), "Callable responded");

        let body = response
            .text()
            .await
            .map_err(|e| CallableError::internal(format!("Failed to read response: {}", e)))?;

        match serde_json::from_str::<CallResponse>(&body) {
            Ok(envelope) => envelope.into_outcome(),
            Err(_) => Err(CallableError::internal(format!(
                "Unexpected response from {} ({})",
                name, status
            ))),
        }
    }
}
