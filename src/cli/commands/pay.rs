use anyhow::{bail, Result};

use crate::workflows::WorkflowController;

use super::{print_audits, print_decision, print_stats};

pub struct PayCommand;

impl PayCommand {
    pub fn new() -> Self {
        Self
    }

    /// Validates the draft already loaded into the controller, then submits it.
    pub async fn execute(&self, controller: &WorkflowController) -> Result<()> {
        controller.snapshot().draft.validate()?;

        controller.submit_payment().await;
        controller.settle().await;

        let view = controller.snapshot();
        print_decision(&view);
        print_audits(&view);
        print_stats(&view);

        if view.payment.is_none() {
            bail!("payment submission failed; see the log output for details");
        }
        Ok(())
    }
}
