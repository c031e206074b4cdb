use anyhow::{bail, Result};

use crate::workflows::WorkflowController;

use super::print_stats;

pub struct ResetCommand;

impl ResetCommand {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self, controller: &WorkflowController) -> Result<()> {
        println!("🔄 Resetting demo state");
        println!();

        controller.reset_demo().await;

        let view = controller.snapshot();
        print_stats(&view);

        // A successful reset always ends with a stats refresh.
        if view.stats.is_none() {
            bail!("demo reset could not be confirmed; see the log output for details");
        }
        Ok(())
    }
}
