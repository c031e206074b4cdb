use serde::{Deserialize, Serialize};
use std::fmt;

use crate::api::{AuditEntry, PaymentRequest, PaymentResponse, StatsSnapshot, TransactionRecord};

/// Remote-backed operations that carry a busy flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Payment,
    Lookup,
    Stats,
    Audits,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Payment => "payment",
            Operation::Lookup => "lookup",
            Operation::Stats => "stats",
            Operation::Audits => "audits",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-flight markers. Plain booleans: overlapping calls share one flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyFlags {
    pub payment: bool,
    pub lookup: bool,
    pub stats: bool,
    pub audits: bool,
}

impl BusyFlags {
    pub fn get(&self, op: Operation) -> bool {
        match op {
            Operation::Payment => self.payment,
            Operation::Lookup => self.lookup,
            Operation::Stats => self.stats,
            Operation::Audits => self.audits,
        }
    }

    pub fn set(&mut self, op: Operation, busy: bool) {
        match op {
            Operation::Payment => self.payment = busy,
            Operation::Lookup => self.lookup = busy,
            Operation::Stats => self.stats = busy,
            Operation::Audits => self.audits = busy,
        }
    }

    pub fn any(&self) -> bool {
        self.payment || self.lookup || self.stats || self.audits
    }
}

/// Everything a presentation layer needs to draw the demo.
///
/// The controller owns the only live instance; callers get clones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    pub draft: PaymentRequest,
    pub payment: Option<PaymentResponse>,
    pub lookup_id: String,
    pub transaction: Option<TransactionRecord>,
    pub audits: Vec<AuditEntry>,
    pub stats: Option<StatsSnapshot>,
    pub busy: BusyFlags,
}

impl ViewModel {
    pub fn new(draft: PaymentRequest) -> Self {
        Self {
            draft,
            ..Default::default()
        }
    }

    /// Forget everything tied to a particular transaction.
    pub(crate) fn clear_transaction_state(&mut self) {
        self.payment = None;
        self.transaction = None;
        self.lookup_id.clear();
        self.audits.clear();
    }
}
