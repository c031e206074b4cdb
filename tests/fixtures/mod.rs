//! Shared fixtures: canned service payloads, a wiremock-backed RiskOps
//! service, and a gated in-process API for observing in-flight state.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use riskops_client::api::{
    ApiError, AuditEntry, DecisionStatus, PaymentRequest, PaymentResponse, RiskDecision, RiskOpsApi,
    StatsSnapshot, TransactionFeatures, TransactionRecord,
};
use riskops_client::workflows::ViewModel;
use riskops_client::WorkflowController;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn decision_json(status: &str, score: f64) -> Value {
    json!({
        "status": status,
        "score": score,
        "reason": if status == "declined" { json!("high_amount") } else { Value::Null },
        "latency_ms": 4.7,
        "features": {
            "spending_velocity": 0.31,
            "device_trust_score": 0.88,
            "ip_risk_score": 0.07
        }
    })
}

pub fn payment_json(transaction_id: &str, status: &str) -> Value {
    let mut body = decision_json(status, 0.18);
    body["transaction_id"] = json!(transaction_id);
    body
}

/// Payment body as the service's create handler sends it: only id and status set.
pub fn bare_payment_json(transaction_id: &str, status: &str) -> Value {
    json!({
        "transaction_id": transaction_id,
        "status": status,
        "decision_reason": null,
        "score": null,
        "latency_ms": null,
        "features": null
    })
}

pub fn transaction_json(id: &str, amount: f64, merchant: &str, status: &str) -> Value {
    json!({
        "id": id,
        "card_last4": "7890",
        "amount": amount,
        "currency": "GBP",
        "merchant": merchant,
        "channel": "ecommerce",
        "device_id": "ios-demo-device",
        "status": status,
        "risk_flag": null,
        "created_at": "2025-03-14T09:26:53.589793"
    })
}

pub fn audit_json(transaction_id: &str, n: usize, status: &str) -> Value {
    json!({
        "id": format!("audit-{n}"),
        "transaction_id": transaction_id,
        "request_payload": {
            "card_number": "4000001234567890",
            "amount": 150.75,
            "currency": "GBP",
            "merchant": "Amazon"
        },
        "decision_payload": decision_json(status, 0.1 * n as f64),
        "latency_ms": 4.7,
        "created_at": format!("2025-03-14T09:2{n}:00.000000")
    })
}

pub fn stats_json(total: u64, approved: u64, declined: u64, avg_amount: f64) -> Value {
    let approval_rate = if total == 0 { 0.0 } else { approved as f64 / total as f64 };
    json!({
        "total": total,
        "approved": approved,
        "declined": declined,
        "approval_rate": approval_rate,
        "avg_amount": avg_amount,
        "p95_latency": if total == 0 { Value::Null } else { json!(12.5) }
    })
}

/// wiremock stand-in for the RiskOps service
pub struct RiskOpsServiceMock {
    pub server: MockServer,
}

impl RiskOpsServiceMock {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub async fn mock_payment(&self, merchant: &str, response: Value) {
        Mock::given(method("POST"))
            .and(path("/payment"))
            .and(body_partial_json(json!({"merchant": merchant})))
            .respond_with(ResponseTemplate::new(201).set_body_json(response))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_transaction(&self, id: &str, response: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/transaction/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_audits(&self, transaction_id: &str, entries: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path(format!("/audit/{transaction_id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(entries)))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_stats(&self, response: Value) {
        Mock::given(method("GET"))
            .and(path("/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_reset(&self, response: Value) {
        Mock::given(method("DELETE"))
            .and(path("/admin/reset"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_error(&self, http_method: &str, path_pattern: &str, status: u16, detail: &str) {
        Mock::given(method(http_method))
            .and(path(path_pattern))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({"detail": detail})))
            .mount(&self.server)
            .await;
    }
}

fn features() -> TransactionFeatures {
    TransactionFeatures {
        spending_velocity: 0.2,
        device_trust_score: 0.9,
        ip_risk_score: 0.05,
    }
}

fn decision() -> RiskDecision {
    RiskDecision {
        status: DecisionStatus::Approved,
        score: 0.2,
        reason: None,
        latency_ms: 2.0,
        features: features(),
    }
}

/// In-process API whose every call blocks until the test releases it.
///
/// Calls are keyed `payment:<merchant>`, `transaction:<id>`, `stats`,
/// `audits:<id>` and `reset`; [`GatedApi::release`] lets one call with that
/// key through. Keys listed in `failing` answer with a 500.
#[derive(Default)]
pub struct GatedApi {
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
    stats_served: Mutex<u64>,
}

impl GatedApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn gate(&self, key: &str) -> Arc<Semaphore> {
        self.gates
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Semaphore::new(0)))
            .clone()
    }

    pub fn release(&self, key: &str) {
        self.gate(key).add_permits(1);
    }

    pub fn fail(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn pass(&self, key: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(key.clone());
        let gate = self.gate(&key);
        gate.acquire().await.unwrap().forget();
        if self.failing.lock().unwrap().contains(&key) {
            return Err(ApiError::remote(500, r#"{"detail":"injected failure"}"#.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RiskOpsApi for GatedApi {
    async fn submit_payment(&self, request: &PaymentRequest) -> Result<PaymentResponse, ApiError> {
        self.pass(format!("payment:{}", request.merchant)).await?;
        Ok(PaymentResponse {
            transaction_id: format!("tx-{}", request.merchant.to_lowercase()),
            decision: decision().into(),
        })
    }

    async fn get_transaction(&self, id: &str) -> Result<TransactionRecord, ApiError> {
        self.pass(format!("transaction:{id}")).await?;
        Ok(TransactionRecord {
            id: id.to_string(),
            card_last4: "7890".to_string(),
            amount: 150.75,
            currency: None,
            merchant: "Amazon".to_string(),
            channel: None,
            device_id: None,
            status: DecisionStatus::Approved,
            risk_flag: None,
            created_at: Utc::now(),
        })
    }

    async fn get_stats(&self) -> Result<StatsSnapshot, ApiError> {
        self.pass("stats".to_string()).await?;
        let mut served = self.stats_served.lock().unwrap();
        *served += 1;
        Ok(StatsSnapshot {
            total: *served,
            approved: *served,
            declined: 0,
            approval_rate: 1.0,
            avg_amount: 150.75,
            p95_latency: None,
        })
    }

    async fn get_audit_logs(&self, transaction_id: &str) -> Result<Vec<AuditEntry>, ApiError> {
        self.pass(format!("audits:{transaction_id}")).await?;
        Ok(vec![AuditEntry {
            id: format!("audit-{transaction_id}"),
            transaction_id: transaction_id.to_string(),
            request_payload: Default::default(),
            decision_payload: decision(),
            latency_ms: 2.0,
            created_at: Utc::now(),
        }])
    }

    async fn reset_demo(&self) -> Result<StatsSnapshot, ApiError> {
        self.pass("reset".to_string()).await?;
        Ok(StatsSnapshot {
            total: 0,
            approved: 0,
            declined: 0,
            approval_rate: 0.0,
            avg_amount: 0.0,
            p95_latency: None,
        })
    }
}

/// Yield to spawned tasks until `condition` holds on the controller's view.
pub async fn wait_for(controller: &WorkflowController, condition: impl Fn(&ViewModel) -> bool) {
    for _ in 0..1_000 {
        if condition(&controller.snapshot()) {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition never held; last view: {:?}", controller.snapshot());
}

/// Yield until the gated API has seen a call with `key`.
pub async fn wait_for_call(api: &GatedApi, key: &str) {
    for _ in 0..1_000 {
        if api.calls().iter().any(|call| call == key) {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("call {key} never happened; calls so far: {:?}", api.calls());
}
