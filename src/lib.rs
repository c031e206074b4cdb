// RiskOps client - orchestrates the payment risk demo workflow
// This exposes the core components for testing and integration

pub mod api;
pub mod cli;
pub mod config;
pub mod http;
pub mod observability;
pub mod telemetry;
pub mod workflows;

// Re-export key types for easy access
pub use api::{ApiError, RiskOpsApi, RiskOpsClient};
pub use config::{resolve_base_url, BaseUrlSources, RiskOpsConfig};
pub use http::HttpTransport;
pub use observability::{create_workflow_span, ApiMetrics, ApiStats};
pub use telemetry::{generate_correlation_id, init_telemetry};
pub use workflows::{ConflictPolicy, Intent, ViewModel, WorkflowController};
