use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::api::{PaymentRequest, RiskOpsClient};
use crate::config::{resolve_base_url, RiskOpsConfig};
use crate::http::HttpTransport;
use crate::workflows::WorkflowController;

pub mod commands;

use commands::{AuditCommand, DemoCommand, LookupCommand, PayCommand, ResetCommand, StatsCommand};

#[derive(Parser)]
#[command(name = "riskops")]
#[command(about = "Drive the RiskOps payment risk demo from the terminal")]
#[command(long_about = "Submits simulated card payments to a RiskOps service, inspects the stored \
                       transaction and its decision audit trail, and shows platform statistics. \
                       Start with 'riskops demo' for the full flow.")]
pub struct Cli {
    /// Base address of the RiskOps service
    #[arg(long, global = true, help = "Service base URL; overrides config and RISKOPS_API_BASE")]
    pub base_url: Option<String>,

    /// Origin the client is served from
    #[arg(long, global = true, help = "Origin used to infer the service address (dev port maps to backend port)")]
    pub origin: Option<String>,

    /// Configuration file
    #[arg(long, global = true, help = "Path to a TOML config file (default: ./riskops.toml)")]
    pub config: Option<PathBuf>,

    /// Emit JSON logs
    #[arg(long, global = true, help = "Write structured JSON logs to stderr")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit a simulated payment and show the risk decision
    Pay(PaymentArgs),
    /// Fetch a stored transaction and its audit trail
    Lookup {
        /// Transaction identifier returned by 'pay'
        id: String,
    },
    /// Show the decision audit trail of a transaction
    Audit {
        /// Transaction identifier
        id: String,
    },
    /// Show aggregate platform statistics
    Stats,
    /// Wipe all demo transactions on the service
    Reset,
    /// Submit the demo payment, look it up, and show every panel
    Demo,
}

#[derive(Args, Debug, Clone)]
pub struct PaymentArgs {
    #[arg(long, default_value = "4000001234567890", help = "Card number (12-19 digits)")]
    pub card: String,
    #[arg(long, default_value_t = 150.75, help = "Amount, greater than zero")]
    pub amount: f64,
    #[arg(long, default_value = "GBP", help = "ISO 4217 currency code")]
    pub currency: String,
    #[arg(long, default_value = "Amazon")]
    pub merchant: String,
    #[arg(long, default_value = "ecommerce")]
    pub channel: Option<String>,
    #[arg(long, default_value = "ios-demo-device")]
    pub device_id: Option<String>,
}

impl From<PaymentArgs> for PaymentRequest {
    fn from(args: PaymentArgs) -> Self {
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        PaymentRequest {
            card_number: args.card.trim().to_string(),
            amount: args.amount,
            currency: args.currency.trim().to_string(),
            merchant: args.merchant.trim().to_string(),
            channel: non_empty(args.channel),
            device_id: non_empty(args.device_id),
        }
    }
}

/// A controller wired to the HTTP service, plus the transport for metrics.
pub struct Session {
    pub controller: WorkflowController,
    pub transport: HttpTransport,
}

impl Session {
    pub fn connect(config: &RiskOpsConfig, draft: PaymentRequest) -> Self {
        let base_url = resolve_base_url(&config.base_url_sources());
        info!("Using RiskOps service at {}", base_url);

        let transport = HttpTransport::new(base_url);
        let client = RiskOpsClient::new(transport.clone());
        let controller =
            WorkflowController::with_policy(Arc::new(client), draft, config.workflow.conflict_policy);
        Self { controller, transport }
    }
}

impl Cli {
    /// Fold command-line overrides into the loaded configuration.
    pub fn apply_overrides(&self, config: &mut RiskOpsConfig) {
        if let Some(base_url) = &self.base_url {
            config.api.base_url = Some(base_url.clone());
        }
        if let Some(origin) = &self.origin {
            config.api.origin = Some(origin.clone());
        }
        if self.json_logs {
            config.observability.json_logs = true;
        }
    }

    pub async fn run(self, config: RiskOpsConfig) -> Result<()> {
        let draft = match &self.command {
            Commands::Pay(args) => args.clone().into(),
            _ => PaymentRequest::demo(),
        };
        let session = Session::connect(&config, draft);

        let result = match self.command {
            Commands::Pay(_) => PayCommand::new().execute(&session.controller).await,
            Commands::Lookup { id } => LookupCommand::new(id).execute(&session.controller).await,
            Commands::Audit { id } => AuditCommand::new(id).execute(&session.controller).await,
            Commands::Stats => StatsCommand::new().execute(&session.controller).await,
            Commands::Reset => ResetCommand::new().execute(&session.controller).await,
            Commands::Demo => DemoCommand::new().execute(&session.controller).await,
        };

        session.transport.metrics().log_stats();
        result
    }
}
