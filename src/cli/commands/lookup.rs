use anyhow::{bail, Result};

use crate::workflows::WorkflowController;

use super::{print_audits, print_transaction};

pub struct LookupCommand {
    pub id: String,
}

impl LookupCommand {
    pub fn new(id: String) -> Self {
        Self { id }
    }

    pub async fn execute(&self, controller: &WorkflowController) -> Result<()> {
        controller.set_lookup_id(self.id.clone());
        controller.lookup_transaction().await;
        controller.settle().await;

        let view = controller.snapshot();
        print_transaction(&view);
        print_audits(&view);

        if view.transaction.is_none() {
            bail!("transaction {:?} could not be fetched", self.id.trim());
        }
        Ok(())
    }
}
