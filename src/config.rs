use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::workflows::ConflictPolicy;

/// Runtime-injected base address, checked after any explicit value.
pub const INJECTED_BASE_ENV: &str = "RISKOPS_API_BASE";

/// Used when no source yields a base address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Main configuration structure for the RiskOps client
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RiskOpsConfig {
    /// Remote service addressing
    pub api: ApiConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
    /// Controller behaviour
    pub workflow: WorkflowConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Explicit base address; wins over every other source
    pub base_url: Option<String>,
    /// Origin the client is served from, used for inference
    pub origin: Option<String>,
    /// Port of the development front-end server
    pub dev_port: u16,
    /// Port the backend listens on during development
    pub backend_port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            origin: None,
            dev_port: 5173,
            backend_port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is unset
    pub log_level: String,
    /// Emit structured JSON instead of human-readable lines
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WorkflowConfig {
    pub conflict_policy: ConflictPolicy,
}

impl RiskOpsConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (`riskops.toml`, or `path` when given)
    /// 3. Environment variables (`RISKOPS_API__BASE_URL`, ...)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&RiskOpsConfig::default())?);

        match path {
            Some(path) => builder = builder.add_source(File::from(path)),
            None => {
                if Path::new("riskops.toml").exists() {
                    builder = builder.add_source(File::with_name("riskops"));
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("RISKOPS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Load .env from the working directory if it exists.
    ///
    /// Runs before telemetry is up, so it returns the loaded path for the
    /// caller to log instead of logging itself.
    pub fn load_env_file() -> Result<Option<PathBuf>> {
        Self::load_env_file_from(Path::new("."))
    }

    pub fn load_env_file_from(dir: &Path) -> Result<Option<PathBuf>> {
        let path = dir.join(".env");
        if !path.exists() {
            return Ok(None);
        }
        dotenvy::from_path(&path)?;
        Ok(Some(path))
    }

    /// Collect the base address candidates, reading the injected value from the process environment.
    pub fn base_url_sources(&self) -> BaseUrlSources {
        BaseUrlSources {
            explicit: self.api.base_url.clone(),
            injected: std::env::var(INJECTED_BASE_ENV).ok(),
            origin: self.api.origin.clone(),
            dev_port: self.api.dev_port,
            backend_port: self.api.backend_port,
        }
    }
}

/// Candidate base addresses in precedence order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseUrlSources {
    pub explicit: Option<String>,
    pub injected: Option<String>,
    pub origin: Option<String>,
    pub dev_port: u16,
    pub backend_port: u16,
}

/// Pick the base address: explicit, injected, origin mapped from the dev port
/// to the backend port, the origin itself, then [`DEFAULT_BASE_URL`].
/// Blank candidates are skipped and trailing slashes are stripped.
pub fn resolve_base_url(sources: &BaseUrlSources) -> String {
    let non_blank = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let resolved = non_blank(&sources.explicit)
        .or_else(|| non_blank(&sources.injected))
        .or_else(|| {
            non_blank(&sources.origin)
                .map(|origin| infer_from_origin(&origin, sources.dev_port, sources.backend_port))
        })
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    resolved.trim_end_matches('/').to_string()
}

fn infer_from_origin(origin: &str, dev_port: u16, backend_port: u16) -> String {
    match url::Url::parse(origin) {
        Ok(mut parsed) if parsed.port_or_known_default() == Some(dev_port) => {
            if parsed.set_port(Some(backend_port)).is_err() {
                return origin.to_string();
            }
            parsed.origin().ascii_serialization()
        }
        _ => origin.to_string(),
    }
}
