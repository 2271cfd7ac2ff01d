//! Header Checker Agent for Zentinel
//!
//! Evaluates a captured request and prints the verdict.

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use zentinel_agent_header_checker::{
    HeaderChecker, HeaderCheckerConfig, RequestHeaderSnapshot, Verdict,
};

#[derive(Parser, Debug)]
#[command(name = "zentinel-agent-header-checker")]
#[command(author, version, about = "Browser header consistency checker for Zentinel")]
struct Args {
    /// Request snapshot to evaluate (JSON or YAML)
    #[arg(short, long)]
    request: PathBuf,

    /// Path to configuration file (JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Pretty-print the verdict
    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    verdict: &'a Verdict,
    annotations: Vec<(String, String)>,
}

fn init_logging(json: bool, level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    // Logs go to stderr so stdout carries only the report
    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load_request(path: &Path) -> Result<RequestHeaderSnapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read request file {}", path.display()))?;

    let request = if path.extension().is_some_and(|e| e == "yaml" || e == "yml") {
        serde_yaml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };
    Ok(request)
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.json_logs, &args.log_level);

    let config = match &args.config {
        Some(path) => HeaderCheckerConfig::from_file(path)?,
        None => HeaderCheckerConfig::default(),
    };

    let checker = HeaderChecker::new(config)?;
    let request = load_request(&args.request)?;

    info!(
        request = %args.request.display(),
        validators = checker.validator_names().len(),
        "Evaluating captured request"
    );

    let verdict = checker.evaluate(&request);
    let report = Report {
        annotations: checker.annotations(&verdict),
        verdict: &verdict,
    };

    let output = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{output}");

    Ok(())
}
