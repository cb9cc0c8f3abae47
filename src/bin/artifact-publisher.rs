//! Artifact Publisher CLI
//!
//! Publishes built artifacts through a publish script and records them with
//! git tags

use anyhow::{Context, Result};
use artifact_publisher::orchestration::{RunReporter, RunSummary};
use artifact_publisher::{
    BatchPublisher, ConfigLoadOptions, ConfigLoader, GitTagWriter, LogMetricsSink, MetricsSink,
    PublishConfig, ReleasedVersionSource, RunConfig, SafeCommandExecutor, ScriptPublisher,
    SfdxReleasedVersions, StatsdMetricsSink,
};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Publish artifacts to a package registry through a publish script
#[derive(Parser)]
#[command(name = "artifact-publisher")]
#[command(version = "0.1.0")]
#[command(about = "Publish built artifacts and record them with git tags", long_about = None)]
struct Cli {
    /// Directory containing the artifacts to publish
    #[arg(short = 'd', long = "artifactdir")]
    artifact_dir: Option<PathBuf>,

    /// Only publish unlocked packages that have been promoted
    #[arg(short = 'p', long = "publishpromotedonly", requires = "devhub_alias")]
    publish_promoted_only: bool,

    /// Devhub alias used to look up released package versions
    #[arg(short = 'v', long = "devhubalias")]
    devhub_alias: Option<String>,

    /// Script invoked once per artifact
    #[arg(short = 'f', long = "scriptpath")]
    script_path: Option<PathBuf>,

    /// Tag attached to emitted metrics
    #[arg(short = 't', long)]
    tag: Option<String>,

    /// Create a git tag for every published artifact
    #[arg(long = "gittag")]
    git_tag: bool,

    /// Push created git tags to the remote
    #[arg(long = "pushgittag")]
    push_git_tag: bool,

    /// Config file (defaults to ./.publish-config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,
}

impl Cli {
    /// CLI layer; unset flags leave lower layers in effect
    fn to_config(&self) -> PublishConfig {
        PublishConfig {
            artifact_dir: self.artifact_dir.clone(),
            script_path: self.script_path.clone(),
            publish_promoted_only: self.publish_promoted_only.then_some(true),
            devhub_alias: self.devhub_alias.clone(),
            tag: self.tag.clone(),
            git_tag: self.git_tag.then_some(true),
            push_git_tag: self.push_git_tag.then_some(true),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("\n❌ Error");
            eprintln!("{:#}", e);
            process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let started = Instant::now();
    let started_at = Utc::now();
    let project_path = std::env::current_dir().context("Failed to get current directory")?;

    let options = ConfigLoadOptions {
        project_path: project_path.clone(),
        config_file: cli.config.clone(),
        cli_args: Some(cli.to_config()),
        env: std::env::vars().collect(),
    };

    let config = match ConfigLoader::load(options).await {
        Ok(config) => config,
        Err(e) => {
            print_banner(cli.publish_promoted_only);
            println!("{}", e);
            for action in e.suggested_actions() {
                println!("  → {}", action);
            }

            let sink = LogMetricsSink;
            let summary = RunSummary::aborted(started_at, started.elapsed(), &e);
            RunReporter::new(&sink, cli.publish_promoted_only, cli.tag.clone()).report(&summary);
            return Ok(summary.exit_code());
        }
    };

    print_banner(config.promoted_only);

    let executor = SafeCommandExecutor::new(&project_path)?;
    let batch = build_publisher(config, executor);
    let report = batch.run().await;

    tracing::debug!(run_id = %report.run_id, exit_code = report.exit_code(), "publish finished");
    Ok(report.exit_code())
}

fn build_publisher(config: RunConfig, executor: SafeCommandExecutor) -> BatchPublisher {
    let metrics: Box<dyn MetricsSink> = match &config.statsd {
        Some(statsd) => match StatsdMetricsSink::connect(statsd) {
            Ok(sink) => Box::new(sink),
            Err(e) => {
                tracing::warn!(error = %e, "statsd unavailable, logging metrics instead");
                Box::new(LogMetricsSink)
            }
        },
        None => Box::new(LogMetricsSink),
    };

    let released_versions = config.devhub_alias.clone().map(|alias| {
        Box::new(SfdxReleasedVersions::new(alias, executor.clone()))
            as Box<dyn ReleasedVersionSource>
    });

    let publisher = ScriptPublisher::new(config.script_path.clone(), executor.clone());

    BatchPublisher::new(
        config,
        Box::new(publisher),
        released_versions,
        Box::new(GitTagWriter::new(executor)),
        metrics,
    )
}

fn print_banner(promoted_only: bool) {
    println!("-----------sfpowerscripts orchestrator ------------------");
    println!("command: publish");
    println!("Publish promoted artifacts only: {}", promoted_only);
    println!("---------------------------------------------------------");
}

/// Default filter when `RUST_LOG` is unset; this crate stays at `info` so
/// logged gauges are visible
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn,artifact_publisher=info"
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
