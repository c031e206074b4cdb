use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Opaque JSON object, used for payloads the client only ever displays.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Payment authorization request as collected by the form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub card_number: String,
    pub amount: f64,
    pub currency: String,
    pub merchant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("card_number must be 12-19 digits, got {0} characters")]
    CardNumberLength(usize),
    #[error("card_number must contain digits only")]
    CardNumberNotNumeric,
    #[error("amount must be greater than zero, got {0}")]
    NonPositiveAmount(f64),
    #[error("currency must be a 3-letter code, got {0:?}")]
    InvalidCurrency(String),
    #[error("merchant must not be empty")]
    EmptyMerchant,
}

impl PaymentRequest {
    /// Prefilled payload used by the demo UI.
    pub fn demo() -> Self {
        Self {
            card_number: "4000001234567890".to_string(),
            amount: 150.75,
            currency: "GBP".to_string(),
            merchant: "Amazon".to_string(),
            channel: Some("ecommerce".to_string()),
            device_id: Some("ios-demo-device".to_string()),
        }
    }

    /// Form-boundary checks mirroring what the service enforces.
    ///
    /// The remote facade never calls this; it is for input surfaces that want
    /// to reject obviously bad drafts before a round trip.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let len = self.card_number.len();
        if !(12..=19).contains(&len) {
            return Err(ValidationError::CardNumberLength(len));
        }
        if !self.card_number.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::CardNumberNotNumeric);
        }
        if !(self.amount > 0.0) {
            return Err(ValidationError::NonPositiveAmount(self.amount));
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidCurrency(self.currency.clone()));
        }
        if self.merchant.trim().is_empty() {
            return Err(ValidationError::EmptyMerchant);
        }
        Ok(())
    }
}

/// Authorization outcome. Matching is case-insensitive; unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DecisionStatus {
    Approved,
    Declined,
    Review,
    Other(String),
}

impl From<String> for DecisionStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "approved" => DecisionStatus::Approved,
            "declined" => DecisionStatus::Declined,
            "review" => DecisionStatus::Review,
            _ => DecisionStatus::Other(value),
        }
    }
}

impl From<DecisionStatus> for String {
    fn from(status: DecisionStatus) -> Self {
        status.as_str().to_string()
    }
}

impl DecisionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            DecisionStatus::Approved => "approved",
            DecisionStatus::Declined => "declined",
            DecisionStatus::Review => "review",
            DecisionStatus::Other(value) => value,
        }
    }
}

impl fmt::Display for DecisionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionFeatures {
    pub spending_velocity: f64,
    pub device_trust_score: f64,
    pub ip_risk_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskDecision {
    pub status: DecisionStatus,
    pub score: f64,
    #[serde(default, alias = "decision_reason")]
    pub reason: Option<String>,
    pub latency_ms: f64,
    pub features: TransactionFeatures,
}

/// Decision as returned by `POST /payment`. The service may leave everything
/// but the status null, unlike the audited [`RiskDecision`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDecision {
    pub status: DecisionStatus,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default, alias = "decision_reason")]
    pub reason: Option<String>,
    #[serde(default)]
    pub latency_ms: Option<f64>,
    #[serde(default)]
    pub features: Option<TransactionFeatures>,
}

impl From<RiskDecision> for PaymentDecision {
    fn from(decision: RiskDecision) -> Self {
        Self {
            status: decision.status,
            score: Some(decision.score),
            reason: decision.reason,
            latency_ms: Some(decision.latency_ms),
            features: Some(decision.features),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub transaction_id: String,
    #[serde(flatten)]
    pub decision: PaymentDecision,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub card_last4: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub merchant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    pub status: DecisionStatus,
    #[serde(default)]
    pub risk_flag: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    pub transaction_id: String,
    pub request_payload: JsonObject,
    pub decision_payload: RiskDecision,
    pub latency_ms: f64,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total: u64,
    pub approved: u64,
    pub declined: u64,
    pub approval_rate: f64,
    pub avg_amount: f64,
    #[serde(default)]
    pub p95_latency: Option<f64>,
}

/// The service emits naive datetimes; offsets are accepted too.
mod timestamp {
    use super::*;
    use serde::{de, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub(super) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
            return Some(with_offset.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }
}
