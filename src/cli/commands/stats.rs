use anyhow::{bail, Result};

use crate::workflows::WorkflowController;

use super::print_stats;

pub struct StatsCommand;

impl StatsCommand {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self, controller: &WorkflowController) -> Result<()> {
        controller.refresh_stats().await;

        let view = controller.snapshot();
        print_stats(&view);

        if view.stats.is_none() {
            bail!("stats could not be fetched");
        }
        Ok(())
    }
}
