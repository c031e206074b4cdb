use anyhow::Result;
use clap::Parser;
use tracing::info;

use riskops_client::cli::Cli;
use riskops_client::{init_telemetry, RiskOpsConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_file = RiskOpsConfig::load_env_file()?;
    let mut config = RiskOpsConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    init_telemetry(&config.observability)?;
    if let Some(path) = env_file {
        info!("Loaded environment variables from {}", path.display());
    }

    cli.run(config).await
}
