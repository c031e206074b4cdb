use anyhow::{bail, Result};

use crate::workflows::WorkflowController;

use super::{print_audits, print_decision, print_stats, print_transaction};

/// Submit → lookup → audit, the same walk-through the web demo offers.
pub struct DemoCommand;

impl DemoCommand {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self, controller: &WorkflowController) -> Result<()> {
        controller.start();
        controller.submit_payment().await;
        controller.settle().await;

        if controller.snapshot().payment.is_some() {
            controller.lookup_transaction().await;
            controller.settle().await;
        }

        let view = controller.snapshot();
        print_decision(&view);
        print_transaction(&view);
        print_audits(&view);
        print_stats(&view);

        if view.payment.is_none() {
            bail!("demo payment was not accepted; see the log output for details");
        }
        Ok(())
    }
}
