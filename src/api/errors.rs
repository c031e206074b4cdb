use crate::api::types::JsonObject;
use thiserror::Error;

/// Failure of a single remote call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service could not be reached (refused, DNS, TLS, bad URL).
    #[error("network error calling {endpoint}: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-2xx status.
    #[error("API error ({status}): {body}")]
    Remote {
        status: u16,
        body: String,
        detail: Option<JsonObject>,
    },

    /// The response body was not the JSON we expected.
    #[error("could not decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    pub fn remote(status: u16, body: String) -> Self {
        let detail = serde_json::from_str::<JsonObject>(&body).ok();
        ApiError::Remote { status, body, detail }
    }

    /// HTTP status for remote failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn detail(&self) -> Option<&JsonObject> {
        match self {
            ApiError::Remote { detail, .. } => detail.as_ref(),
            _ => None,
        }
    }

    /// Human-readable message, preferring the service's `detail` field.
    pub fn detail_message(&self) -> String {
        self.detail()
            .and_then(|detail| detail.get("detail"))
            .map(|value| match value.as_str() {
                Some(text) => text.to_string(),
                None => value.to_string(),
            })
            .unwrap_or_else(|| self.to_string())
    }

    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Network { .. } => "network",
            ApiError::Remote { .. } => "remote",
            ApiError::Decode { .. } => "decode",
        }
    }
}
