//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.slopscan.toml` files.

use crate::models::AnalysisMode;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".slopscan.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Analysis gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Analysis defaults.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Terminal UI settings.
    #[serde(default)]
    pub ui: UiConfig,
}

/// Analysis gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the analysis backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Deadline for each gateway call, in seconds.
    #[serde(default = "default_step_timeout")]
    pub step_timeout_seconds: u64,

    /// Call `/health` before starting a run.
    #[serde(default)]
    pub check_health: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            step_timeout_seconds: default_step_timeout(),
            check_health: false,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_step_timeout() -> u64 {
    120 // LLM-backed endpoints regularly take a minute
}

/// Analysis defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Mode used when `--mode` is not given.
    #[serde(default)]
    pub mode: AnalysisMode,
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Include the model's free-text reasoning in the report.
    #[serde(default = "default_true")]
    pub include_reasoning: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            include_reasoning: true,
        }
    }
}

fn default_output() -> String {
    "slopscan_report.md".to_string()
}

fn default_true() -> bool {
    true
}

/// Terminal UI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// How long a failure message stays on screen before it is cleared.
    #[serde(default = "default_dismiss_after_ms")]
    pub dismiss_after_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            dismiss_after_ms: default_dismiss_after_ms(),
        }
    }
}

fn default_dismiss_after_ms() -> u64 {
    3000
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.slopscan.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref api_url) = args.api_url {
            self.gateway.base_url = api_url.clone();
        }

        if let Some(timeout) = args.timeout {
            self.gateway.step_timeout_seconds = timeout;
        }

        if args.check_gateway {
            self.gateway.check_health = true;
        }

        if let Some(mode) = args.mode {
            self.analysis.mode = mode;
        }

        if let Some(ref output) = args.output {
            self.report.output = output.display().to_string();
        }

        if args.no_reasoning {
            self.report.include_reasoning = false;
        }
    }

    /// Check the merged configuration before a run.
    pub fn validate(&self) -> Result<()> {
        if self.gateway.step_timeout_seconds == 0 {
            bail!("gateway.step_timeout_seconds must be at least 1");
        }

        let base_url = &self.gateway.base_url;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            bail!(
                "gateway.base_url must start with 'http://' or 'https://', got '{}'",
                base_url
            );
        }

        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
