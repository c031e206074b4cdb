use anyhow::Result;

use crate::workflows::WorkflowController;

use super::print_audits;

pub struct AuditCommand {
    pub id: String,
}

impl AuditCommand {
    pub fn new(id: String) -> Self {
        Self { id }
    }

    pub async fn execute(&self, controller: &WorkflowController) -> Result<()> {
        controller.fetch_audit_logs(self.id.trim()).await;
        print_audits(&controller.snapshot());
        Ok(())
    }
}
