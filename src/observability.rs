use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

use crate::api::ApiError;

/// Remote API usage counters for one transport.
#[derive(Debug, Default)]
pub struct ApiMetrics {
    pub total_requests: AtomicU64,
    pub network_errors: AtomicU64,
    pub remote_errors: AtomicU64,
    pub decode_errors: AtomicU64,
}

impl ApiMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self, error: &ApiError) {
        let counter = match error {
            ApiError::Network { .. } => &self.network_errors,
            ApiError::Remote { .. } => &self.remote_errors,
            ApiError::Decode { .. } => &self.decode_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> ApiStats {
        ApiStats {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            network_errors: self.network_errors.load(Ordering::Relaxed),
            remote_errors: self.remote_errors.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "RiskOps API metrics: requests={}, network_errors={}, remote_errors={}, decode_errors={}",
            stats.total_requests, stats.network_errors, stats.remote_errors, stats.decode_errors
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiStats {
    pub total_requests: u64,
    pub network_errors: u64,
    pub remote_errors: u64,
    pub decode_errors: u64,
}

impl ApiStats {
    pub fn failures(&self) -> u64 {
        self.network_errors + self.remote_errors + self.decode_errors
    }
}

/// Span wrapping one invocation of a workflow rule.
pub fn create_workflow_span(rule: &str, correlation_id: &str) -> tracing::Span {
    tracing::info_span!(
        "workflow",
        workflow.rule = rule,
        correlation.id = correlation_id,
        otel.kind = "internal"
    )
}
