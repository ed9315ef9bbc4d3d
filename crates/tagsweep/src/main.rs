//! tagsweep: delete AWS resources selected by tag
//!
//! Reads `{"TagFilters": [...]}` documents from a file or stdin, deletes
//! every matching resource in dependency order and prints the deleted
//! ARNs as JSON on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use tagsweep::aws::{
    AutoScalingClient, AwsContext, AwsResourceDeleter, CallContext, Ec2DependencySource, FromAwsContext,
    Route53Client, TaggingClient,
};
use tagsweep::config::{AwsConfig, CliOverrides, FileConfig, RunConfig, RunFlags};
use tagsweep::console::Console;
use tagsweep::discover::{Discoverer, DiscoveryConfig};
use tagsweep::expand::GraphExpander;
use tagsweep::orchestrator::DeleteRun;
use tagsweep::request_log::log_file_name;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "tagsweep")]
#[command(about = "Delete AWS resources by tag, in dependency order")]
#[command(version)]
struct Args {
    /// TOML config file with `region` and `resourceTypes`
    #[arg(long, global = true, env = "TAGSWEEP_CONFIG")]
    config: Option<PathBuf>,

    /// AWS region
    #[arg(long, global = true, env = "AWS_REGION")]
    region: Option<String>,

    /// Comma-separated resource types to discover (e.g. AWS::EC2::VPC)
    #[arg(long, global = true, env = "TAGSWEEP_RESOURCE_TYPES", value_delimiter = ',')]
    resource_types: Option<Vec<String>>,

    /// Skip malformed input and keep deleting after failures
    #[arg(long, global = true)]
    ignore_errors: bool,

    /// Show what would be deleted without deleting anything
    #[arg(long, global = true)]
    dry_run: bool,

    /// Timeout in seconds for each AWS call
    #[arg(long, global = true)]
    call_timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct DeleteArgs {
    /// File of tag filter documents (default: stdin)
    #[arg(short = 'f', long)]
    delete_file: Option<PathBuf>,

    /// Do not print the deleted ARNs
    #[arg(short, long)]
    silent: bool,

    /// Also delete resources that block deleting the matched ones
    #[arg(long)]
    all_deps: bool,

    /// Print a report of failed deletions at the end
    #[arg(long)]
    report: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Delete resources matching tag filters
    Delete(DeleteArgs),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    // Print main error message
    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    // Print error chain (causes)
    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
                // Reduce noise from AWS SDK (show only warnings and errors)
                .add_directive("aws_config=warn".parse()?)
                .add_directive("aws_smithy_runtime=warn".parse()?),
        )
        .init();
    Ok(())
}

async fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing()?;

    let file = args
        .config
        .as_deref()
        .map(FileConfig::load)
        .transpose()
        .context("Failed to load configuration")?;
    let aws = AwsConfig::resolve(
        CliOverrides {
            region: args.region,
            resource_types: args.resource_types,
            call_timeout: args.call_timeout_secs.map(Duration::from_secs),
        },
        file,
    )
    .context("Invalid configuration")?;

    match args.command {
        Command::Delete(delete) => {
            let config = RunConfig {
                aws,
                flags: RunFlags {
                    ignore_errors: args.ignore_errors,
                    dry_run: args.dry_run,
                    silent: delete.silent,
                    all_deps: delete.all_deps,
                    report: delete.report,
                },
                delete_file: delete.delete_file,
            };
            handle_delete(config).await
        }
    }
}

/// Handle the delete command
async fn handle_delete(config: RunConfig) -> Result<()> {
    info!(
        region = %config.region(),
        dry_run = config.dry_run(),
        resource_types = ?config.aws.resource_types,
        "Starting deletion run"
    );

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling in-flight AWS calls");
                cancel.cancel();
            }
        });
    }
    let call = CallContext::new(cancel, config.aws.call_timeout);

    let aws = AwsContext::new(config.region()).await;
    let console = Console::stdout();

    let discoverer = Discoverer::new(
        TaggingClient::from_context(&aws),
        AutoScalingClient::from_context(&aws),
        Route53Client::from_context(&aws),
        DiscoveryConfig {
            resource_types: config.aws.resource_types.clone(),
            call: call.clone(),
            ..Default::default()
        },
        console.clone(),
    );
    let expander = GraphExpander::new(Ec2DependencySource::from_context(&aws), call.clone());
    let deleter = AwsResourceDeleter::new(&aws, call);

    let log_path = PathBuf::from(log_file_name(chrono::Local::now().date_naive()));
    let pipeline = DeleteRun::new(discoverer, expander, deleter, config.flags, Some(log_path), console);

    let input: Box<dyn Read> = match &config.delete_file {
        Some(path) => Box::new(std::io::BufReader::new(
            std::fs::File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(std::io::stdin()),
    };

    let outcome = pipeline.run(input).await?;
    info!(
        deleted = outcome.deleted_arns.len(),
        failed_types = outcome.execution.failed.len(),
        failures = outcome.log.entries().len(),
        "Deletion run finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_delete_flags() {
        let args = Args::try_parse_from([
            "tagsweep",
            "--dry-run",
            "delete",
            "-f",
            "filters.json",
            "--all-deps",
            "--report",
            "-s",
            "--ignore-errors",
            "--resource-types",
            "AWS::EC2::VPC,AWS::S3::Bucket",
        ])
        .unwrap();

        assert!(args.dry_run);
        assert!(args.ignore_errors);
        assert_eq!(
            args.resource_types.unwrap(),
            ["AWS::EC2::VPC", "AWS::S3::Bucket"]
        );
        let Command::Delete(delete) = args.command;
        assert_eq!(delete.delete_file, Some(PathBuf::from("filters.json")));
        assert!(delete.all_deps && delete.report && delete.silent);
    }

    #[test]
    fn test_cli_verifies() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
