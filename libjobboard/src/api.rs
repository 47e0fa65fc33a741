//! Error mapping between the transport and the actions
//!
//! [`ApiClient::send`] turns every way a request can fail into an
//! [`ActionError`]: transport failures become `Network` carrying the
//! action's own user-facing message, non-2xx answers become `Http` carrying
//! the server's message.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ActionError;
use crate::transport::{ApiRequest, ApiResponse, Transport};

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Send `request` and return the response whatever its status
    ///
    /// `network_message` is what the user sees if no response arrives.
    pub async fn exchange(
        &self,
        request: ApiRequest,
        network_message: &str,
    ) -> Result<ApiResponse, ActionError> {
        let method = request.method;
        let path = request.path.clone();
        tracing::debug!("{} {} via {}", method, path, self.transport.name());

        self.transport.send(request).await.map_err(|e| {
            tracing::error!("{} {} failed: {}", method, path, e);
            ActionError::Network {
                message: network_message.to_string(),
                cause: e.to_string(),
            }
        })
    }

    /// Send `request`, requiring a 2xx answer
    pub async fn send(
        &self,
        request: ApiRequest,
        network_message: &str,
    ) -> Result<ApiResponse, ActionError> {
        let method = request.method;
        let path = request.path.clone();
        let response = self.exchange(request, network_message).await?;

        if response.is_success() {
            return Ok(response);
        }

        let err = http_error(&response);
        tracing::warn!("{} {} returned {}: {}", method, path, response.status, err);
        Err(err)
    }

    /// Send and decode the JSON body as `T`
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        network_message: &str,
    ) -> Result<T, ActionError> {
        let response = self.send(request, network_message).await?;
        decode(response.body)
    }
}

/// `Http` error for a non-2xx response
pub(crate) fn http_error(response: &ApiResponse) -> ActionError {
    ActionError::Http {
        status: response.status,
        message: response
            .server_message()
            .unwrap_or_else(|| format!("HTTP {}", response.status)),
    }
}

pub(crate) fn decode<T: DeserializeOwned>(body: Value) -> Result<T, ActionError> {
    serde_json::from_value(body).map_err(|e| ActionError::Decode(e.to_string()))
}
