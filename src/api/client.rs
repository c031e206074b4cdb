use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::errors::ApiError;
use crate::api::types::{AuditEntry, PaymentRequest, PaymentResponse, StatsSnapshot, TransactionRecord};
use crate::http::HttpTransport;

/// The five remote operations of the RiskOps service.
///
/// Implementations pass failures through untouched: no validation, no retries.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RiskOpsApi: Send + Sync {
    async fn submit_payment(&self, request: &PaymentRequest) -> Result<PaymentResponse, ApiError>;
    async fn get_transaction(&self, id: &str) -> Result<TransactionRecord, ApiError>;
    async fn get_stats(&self) -> Result<StatsSnapshot, ApiError>;
    async fn get_audit_logs(&self, transaction_id: &str) -> Result<Vec<AuditEntry>, ApiError>;
    async fn reset_demo(&self) -> Result<StatsSnapshot, ApiError>;
}

/// HTTP binding of [`RiskOpsApi`].
#[derive(Debug, Clone)]
pub struct RiskOpsClient {
    transport: HttpTransport,
}

impl RiskOpsClient {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    fn decode<T: DeserializeOwned>(&self, path: &str, value: Value) -> Result<T, ApiError> {
        serde_json::from_value(value).map_err(|source| ApiError::Decode {
            endpoint: format!("{}{}", self.transport.base_url(), path),
            source,
        })
    }
}

/// Percent-encode an identifier so it stays a single path segment.
fn path_segment(id: &str) -> String {
    url::form_urlencoded::byte_serialize(id.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[async_trait]
impl RiskOpsApi for RiskOpsClient {
    async fn submit_payment(&self, request: &PaymentRequest) -> Result<PaymentResponse, ApiError> {
        let path = "/payment";
        let value = self.transport.post(path, request).await?;
        self.decode(path, value)
    }

    async fn get_transaction(&self, id: &str) -> Result<TransactionRecord, ApiError> {
        let path = format!("/transaction/{}", path_segment(id));
        let value = self.transport.get(&path).await?;
        self.decode(&path, value)
    }

    async fn get_stats(&self) -> Result<StatsSnapshot, ApiError> {
        let path = "/stats";
        let value = self.transport.get(path).await?;
        self.decode(path, value)
    }

    async fn get_audit_logs(&self, transaction_id: &str) -> Result<Vec<AuditEntry>, ApiError> {
        let path = format!("/audit/{}", path_segment(transaction_id));
        let value = self.transport.get(&path).await?;
        self.decode(&path, value)
    }

    async fn reset_demo(&self) -> Result<StatsSnapshot, ApiError> {
        let path = "/admin/reset";
        let value = self.transport.delete(path).await?;
        self.decode(path, value)
    }
}
