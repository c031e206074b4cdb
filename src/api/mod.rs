pub mod client;
pub mod errors;
pub mod types;

pub use client::{RiskOpsApi, RiskOpsClient};
#[cfg(any(test, feature = "testing"))]
pub use client::MockRiskOpsApi;
pub use errors::ApiError;
pub use types::{
    AuditEntry, DecisionStatus, JsonObject, PaymentDecision, PaymentRequest, PaymentResponse, RiskDecision,
    StatsSnapshot, TransactionFeatures, TransactionRecord, ValidationError,
};
