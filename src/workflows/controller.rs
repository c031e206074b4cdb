use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, info, warn, Instrument};

use crate::api::{PaymentRequest, RiskOpsApi};
use crate::observability::create_workflow_span;
use crate::telemetry::generate_correlation_id;
use crate::workflows::view_model::{Operation, ViewModel};

/// What happens when an older call of the same operation finishes after a newer one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// Every completion is applied; whichever lands last is shown.
    #[default]
    LastWriteWins,
    /// Only the most recently started call of an operation may write.
    LatestRequestWins,
}

/// A user action forwarded by a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    SubmitPayment,
    LookupTransaction,
    RefreshStats,
    FetchAuditLogs(String),
    ResetDemo,
}

impl Intent {
    fn rule_name(&self) -> &'static str {
        match self {
            Intent::SubmitPayment => "submit_payment",
            Intent::LookupTransaction => "lookup_transaction",
            Intent::RefreshStats => "refresh_stats",
            Intent::FetchAuditLogs(_) => "fetch_audit_logs",
            Intent::ResetDemo => "reset_demo",
        }
    }
}

struct Session {
    view: ViewModel,
    generations: [u64; 4],
}

#[derive(Debug, Clone, Copy)]
struct Ticket {
    op: Operation,
    generation: u64,
}

struct Inner {
    api: Arc<dyn RiskOpsApi>,
    policy: ConflictPolicy,
    session: Mutex<Session>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// Clears its operation's busy flag when dropped, including on abort.
struct BusyGuard<'a> {
    inner: &'a Inner,
    op: Operation,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.inner.session().view.busy.set(self.op, false);
    }
}

fn slot(op: Operation) -> usize {
    match op {
        Operation::Payment => 0,
        Operation::Lookup => 1,
        Operation::Stats => 2,
        Operation::Audits => 3,
    }
}

fn rule_span(rule: &str) -> tracing::Span {
    create_workflow_span(rule, &generate_correlation_id())
}

impl Inner {
    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tasks(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Raise the busy flag and take a generation ticket for `op`.
    fn begin(&self, op: Operation) -> (BusyGuard<'_>, Ticket) {
        let mut session = self.session();
        session.view.busy.set(op, true);
        let counter = &mut session.generations[slot(op)];
        *counter += 1;
        let ticket = Ticket {
            op,
            generation: *counter,
        };
        (BusyGuard { inner: self, op }, ticket)
    }

    /// Write an outcome into the view. Returns false when the result was discarded as stale.
    fn apply(&self, ticket: Ticket, update: impl FnOnce(&mut ViewModel)) -> bool {
        let mut session = self.session();
        if self.policy == ConflictPolicy::LatestRequestWins
            && session.generations[slot(ticket.op)] != ticket.generation
        {
            debug!("discarding stale {} result (generation {})", ticket.op, ticket.generation);
            return false;
        }
        update(&mut session.view);
        true
    }

    fn launch<F>(&self, rule: &str, task: F) -> AbortHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task.instrument(rule_span(rule)));
        let abort = handle.abort_handle();
        let mut tasks = self.tasks();
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
        abort
    }

    fn launch_stats_refresh(self: &Arc<Self>) {
        let inner = Arc::clone(self);
        self.launch("refresh_stats", async move { inner.refresh_stats().await });
    }

    fn launch_audit_fetch(self: &Arc<Self>, transaction_id: String) {
        let inner = Arc::clone(self);
        self.launch("fetch_audit_logs", async move {
            inner.fetch_audit_logs(&transaction_id).await
        });
    }

    async fn submit_payment(self: &Arc<Self>) {
        let draft = self.session().view.draft.clone();
        let (_busy, ticket) = self.begin(Operation::Payment);

        match self.api.submit_payment(&draft).await {
            Ok(response) => {
                let transaction_id = response.transaction_id.clone();
                info!(
                    "Payment {} decided: {} (score {:?})",
                    transaction_id, response.decision.status, response.decision.score
                );
                let applied = self.apply(ticket, |view| {
                    view.payment = Some(response);
                    view.lookup_id = transaction_id.clone();
                });
                if applied {
                    self.launch_stats_refresh();
                    self.launch_audit_fetch(transaction_id);
                }
            }
            Err(err) => {
                warn!("Payment submission failed: {}", err);
                self.apply(ticket, |view| view.payment = None);
            }
        }
    }

    async fn lookup_transaction(self: &Arc<Self>) {
        let id = self.session().view.lookup_id.trim().to_string();
        if id.is_empty() {
            debug!("Lookup skipped: no transaction id");
            return;
        }
        let (_busy, ticket) = self.begin(Operation::Lookup);

        match self.api.get_transaction(&id).await {
            Ok(record) => {
                if self.apply(ticket, |view| view.transaction = Some(record)) {
                    self.launch_audit_fetch(id);
                }
            }
            Err(err) => {
                warn!("Transaction lookup for {} failed: {}", id, err);
                self.apply(ticket, |view| view.transaction = None);
            }
        }
    }

    async fn refresh_stats(&self) {
        let (_busy, ticket) = self.begin(Operation::Stats);

        match self.api.get_stats().await {
            Ok(stats) => {
                self.apply(ticket, |view| view.stats = Some(stats));
            }
            Err(err) => {
                warn!("Stats refresh failed, keeping previous snapshot: {}", err);
            }
        }
    }

    async fn fetch_audit_logs(&self, transaction_id: &str) {
        let (_busy, ticket) = self.begin(Operation::Audits);

        match self.api.get_audit_logs(transaction_id).await {
            Ok(entries) => {
                debug!("Fetched {} audit entries for {}", entries.len(), transaction_id);
                self.apply(ticket, |view| view.audits = entries);
            }
            Err(err) => {
                warn!("Audit fetch for {} failed: {}", transaction_id, err);
                self.apply(ticket, |view| view.audits.clear());
            }
        }
    }

    async fn reset_demo(&self) {
        match self.api.reset_demo().await {
            Ok(snapshot) => {
                info!("Demo state reset ({} transactions remain)", snapshot.total);
                {
                    let mut session = self.session();
                    session.view.clear_transaction_state();
                    // In-flight results for cleared fields are now stale.
                    for op in [Operation::Payment, Operation::Lookup, Operation::Audits] {
                        session.generations[slot(op)] += 1;
                    }
                }
                self.refresh_stats().await;
            }
            Err(err) => {
                warn!("Demo reset failed, state left untouched: {}", err);
            }
        }
    }
}

/// Sequences remote calls and owns the session's [`ViewModel`].
///
/// Clones are handles to the same session. Every rule handles its own
/// failures: nothing here returns an error, the outcome is visible only
/// through [`WorkflowController::snapshot`] and the logs.
#[derive(Clone)]
pub struct WorkflowController {
    inner: Arc<Inner>,
}

impl fmt::Debug for WorkflowController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowController")
            .field("policy", &self.inner.policy)
            .field("view", &self.inner.session().view)
            .finish()
    }
}

impl WorkflowController {
    pub fn new(api: Arc<dyn RiskOpsApi>, draft: PaymentRequest) -> Self {
        Self::with_policy(api, draft, ConflictPolicy::default())
    }

    pub fn with_policy(api: Arc<dyn RiskOpsApi>, draft: PaymentRequest, policy: ConflictPolicy) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                policy,
                session: Mutex::new(Session {
                    view: ViewModel::new(draft),
                    generations: [0; 4],
                }),
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.inner.policy
    }

    /// Copy of the current view model.
    pub fn snapshot(&self) -> ViewModel {
        self.inner.session().view.clone()
    }

    pub fn update_draft(&self, edit: impl FnOnce(&mut PaymentRequest)) {
        edit(&mut self.inner.session().view.draft);
    }

    pub fn set_lookup_id(&self, id: impl Into<String>) {
        self.inner.session().view.lookup_id = id.into();
    }

    /// Submit the current draft. Stats and audits for the new transaction
    /// are refreshed in the background; see [`WorkflowController::settle`].
    pub async fn submit_payment(&self) {
        self.inner.submit_payment().instrument(rule_span("submit_payment")).await
    }

    /// Fetch the transaction named by the lookup id, then its audit trail in the background.
    pub async fn lookup_transaction(&self) {
        self.inner
            .lookup_transaction()
            .instrument(rule_span("lookup_transaction"))
            .await
    }

    pub async fn refresh_stats(&self) {
        self.inner.refresh_stats().instrument(rule_span("refresh_stats")).await
    }

    pub async fn fetch_audit_logs(&self, transaction_id: &str) {
        self.inner
            .fetch_audit_logs(transaction_id)
            .instrument(rule_span("fetch_audit_logs"))
            .await
    }

    pub async fn reset_demo(&self) {
        self.inner.reset_demo().instrument(rule_span("reset_demo")).await
    }

    /// Kick off the initial stats load for a fresh session.
    pub fn start(&self) -> AbortHandle {
        self.dispatch(Intent::RefreshStats)
    }

    /// Run a rule as a background task. Aborting it clears its busy flag;
    /// the remote call itself is simply abandoned.
    pub fn dispatch(&self, intent: Intent) -> AbortHandle {
        let inner = Arc::clone(&self.inner);
        let rule = intent.rule_name();
        match intent {
            Intent::SubmitPayment => self.inner.launch(rule, async move { inner.submit_payment().await }),
            Intent::LookupTransaction => {
                self.inner.launch(rule, async move { inner.lookup_transaction().await })
            }
            Intent::RefreshStats => self.inner.launch(rule, async move { inner.refresh_stats().await }),
            Intent::FetchAuditLogs(transaction_id) => self.inner.launch(rule, async move {
                inner.fetch_audit_logs(&transaction_id).await
            }),
            Intent::ResetDemo => self.inner.launch(rule, async move { inner.reset_demo().await }),
        }
    }

    /// Wait for every background task, including ones launched while waiting.
    pub async fn settle(&self) {
        loop {
            let pending = std::mem::take(&mut *self.inner.tasks());
            if pending.is_empty() {
                break;
            }
            for handle in pending {
                if let Err(err) = handle.await {
                    if err.is_panic() {
                        error!("Workflow task panicked: {}", err);
                    }
                }
            }
        }
    }
}
