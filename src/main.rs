//! SlopScan - AI slop detection for GitHub and Summer of Making projects
//!
//! A CLI tool that sends a project through the SlopScan analysis backend
//! (README, commit history, devlogs and source code) and writes a report
//! with a 0-100 slop score.
//!
//! Exit codes:
//!   0 - Success (score below --fail-above, or no --fail-above set)
//!   1 - Runtime error (invalid URL, backend unreachable, step failed, etc.)
//!   2 - Slop score at or above the --fail-above threshold

mod analysis;
mod cli;
mod config;
mod error;
mod gateway;
mod models;
mod report;
mod source;
mod ui;

use analysis::aggregator::{generate_summary_text, top_factors};
use analysis::{AnalysisRequest, Orchestrator};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use gateway::{AnalysisGateway, HttpGateway};
use models::{Report, ReportMetadata};
use source::SourceUrl;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use ui::ProgressUi;

/// Connect timeout for the backend; the per-step deadline covers the rest.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("SlopScan v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_scan(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Scan failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .slopscan.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to point at your backend and pick a default mode.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run one analysis end to end. Returns exit code (0 or 2).
async fn run_scan(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    let source: SourceUrl = args.project_url().parse()?;
    let mode = config.analysis.mode;

    let gateway = Arc::new(HttpGateway::new(
        config.gateway.base_url.clone(),
        CONNECT_TIMEOUT,
    ));

    println!("🔎 Scanning: {}", source);
    match &source {
        SourceUrl::GitHub { owner, repo, .. } => println!("   Repository: {}/{}", owner, repo),
        SourceUrl::Som { project_id, .. } => {
            println!("   Summer of Making project #{}", project_id)
        }
    }
    println!("   Backend: {}", gateway.base_url());
    println!("   Mode: {}", mode);
    println!("   Step timeout: {}s", config.gateway.step_timeout_seconds);

    if config.gateway.check_health {
        check_gateway(gateway.as_ref()).await?;
    }

    // Ctrl-C cancels whichever step is in flight.
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling analysis");
            signal_token.cancel();
        }
    });

    let orchestrator = Orchestrator::new(
        gateway.clone(),
        Duration::from_secs(config.gateway.step_timeout_seconds),
    );
    let request = AnalysisRequest::new(source.clone(), mode);

    println!();
    let mut progress = ProgressUi::new(args.quiet);
    let session = match orchestrator.run(&request, &mut progress, &cancel).await {
        Ok(session) => {
            progress.finish(analysis::progress::COMPLETE_STATUS);
            session
        }
        Err(e) => {
            progress
                .fail(Duration::from_millis(config.ui.dismiss_after_ms))
                .await;
            if e.is_remote() {
                error!("Backend at {} reported: {}", gateway.base_url(), e);
            }
            return Err(e.into());
        }
    };

    let duration = start_time.elapsed().as_secs_f64();

    let report = Report {
        metadata: ReportMetadata {
            source_url: source.to_string(),
            mode: session.mode(),
            analysis_date: Utc::now(),
            gateway_url: gateway.base_url().to_string(),
            duration_seconds: duration,
        },
        session,
    };

    // Generate and save the report
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => {
            report::generate_markdown_report(&report, config.report.include_reasoning)
        }
    };

    let output_path = Path::new(&config.report.output);
    std::fs::write(output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    // Print summary
    println!("\n📊 {}", generate_summary_text(&report.session));
    let factors = top_factors(&report.session, 3);
    if !factors.is_empty() {
        println!("   Top factors:");
        for factor in &factors {
            println!("     • {}", factor);
        }
    }
    println!("   Analyzed: {}", analyzed_sections(&report.session).join(", "));
    println!("   Duration: {:.1}s", duration);
    println!(
        "\n✅ Scan complete! Report saved to: {}",
        output_path.display()
    );

    // Check --fail-above threshold
    if let Some(threshold) = args.fail_above {
        let score = report.session.slop_score().slopscore;
        if score >= threshold {
            eprintln!(
                "\n⛔ Slop score {:.0} is at or above {:.0}. Failing (exit code 2).",
                score, threshold
            );
            return Ok(2);
        }
    }

    Ok(0)
}

fn analyzed_sections(session: &analysis::AnalysisSession) -> Vec<&'static str> {
    let mut sections = Vec::new();
    if session.repo_enabled() {
        sections.push("README");
    }
    if session.commit_enabled() {
        sections.push("commits");
    }
    if session.som_enabled() {
        sections.push("devlogs");
    }
    if session.code_enabled() {
        sections.push("source code");
    }
    sections
}

/// Call `/health` and refuse to start when the backend is not healthy.
async fn check_gateway(gateway: &dyn AnalysisGateway) -> Result<()> {
    println!("🩺 Checking backend health...");
    let health = gateway
        .health()
        .await
        .context("Backend health check failed")?;

    if !health.is_healthy() {
        bail!(
            "Backend {} reported status '{}'",
            if health.service.is_empty() {
                "service"
            } else {
                health.service.as_str()
            },
            health.status
        );
    }

    info!("Backend '{}' is {}", health.service, health.status);
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
