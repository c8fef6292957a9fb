//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::AnalysisMode;
use crate::source;
use clap::Parser;
use std::path::PathBuf;

/// SlopScan - score GitHub and Summer of Making projects for AI slop
///
/// Sends the project through the SlopScan analysis backend (README,
/// commit history, devlogs and/or source code) and writes a report.
///
/// Examples:
///   slopscan --url https://github.com/owner/repo
///   slopscan --url https://github.com/owner/repo --mode both --format json
///   slopscan --url https://summer.hackclub.com/projects/1234 --mode repo
///   slopscan --url https://github.com/owner/repo --fail-above 70
///   slopscan --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Project to analyze
    ///
    /// Either https://github.com/<owner>/<repo> or
    /// https://summer.hackclub.com/projects/<id>.
    #[arg(short, long, value_name = "URL", required_unless_present = "init_config")]
    pub url: Option<String>,

    /// What to analyze (default: from config, else repo)
    #[arg(short, long, value_name = "MODE")]
    pub mode: Option<AnalysisMode>,

    /// Analysis backend base URL
    #[arg(long, value_name = "URL", env = "SLOPSCAN_API_URL")]
    pub api_url: Option<String>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .slopscan.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Check the backend's /health endpoint before analyzing
    #[arg(long)]
    pub check_gateway: bool,

    /// Leave the model's reasoning out of the report
    #[arg(long)]
    pub no_reasoning: bool,

    /// Exit with code 2 when the slop score is at or above this value
    ///
    /// Useful for CI pipelines.
    #[arg(long, value_name = "SCORE")]
    pub fail_above: Option<f64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .slopscan.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The project URL, empty if not set (validate first).
    pub fn project_url(&self) -> &str {
        self.url.as_deref().unwrap_or("")
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        let url = self.project_url();
        if url.trim().is_empty() {
            return Err("A project URL is required".to_string());
        }
        if let Some(message) = source::validation_message(url) {
            return Err(message.to_string());
        }

        if let Some(ref api_url) = self.api_url {
            if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(threshold) = self.fail_above {
            if !(0.0..=100.0).contains(&threshold) {
                return Err("--fail-above must be between 0 and 100".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            url: Some("https://github.com/acme/widget".to_string()),
            mode: None,
            api_url: None,
            output: None,
            format: OutputFormat::Markdown,
            timeout: None,
            config: None,
            check_gateway: false,
            no_reasoning: false,
            fail_above: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_valid_args() {
        assert!(make_args().validate().is_ok());

        let mut args = make_args();
        args.url = Some("https://summer.hackclub.com/projects/77".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.url = Some("not a url".to_string());
        assert_eq!(
            args.validate(),
            Err(source::INVALID_URL_MESSAGE.to_string())
        );
    }

    #[test]
    fn test_validation_missing_url() {
        let mut args = make_args();
        args.url = Some("   ".to_string());
        assert!(args.validate().is_err());

        args.url = None;
        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_bad_api_url() {
        let mut args = make_args();
        args.api_url = Some("localhost:8000".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_thresholds() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.fail_above = Some(101.0);
        assert!(args.validate().is_err());

        args.fail_above = Some(70.0);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_parse_mode() {
        let args =
            Args::try_parse_from(["slopscan", "-u", "https://github.com/a/b", "--mode", "both"])
                .unwrap();
        assert_eq!(args.mode, Some(AnalysisMode::Both));
        assert_eq!(args.format, OutputFormat::Markdown);

        assert!(Args::try_parse_from(["slopscan", "--mode", "both"]).is_err());
        assert!(Args::try_parse_from(["slopscan", "--init-config"]).is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
