mod config;
mod devops;
mod export;
mod input;

use clap::Parser;
use colored::Colorize;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, info_span, Instrument};
use tracing_subscriber::EnvFilter;

/// PR File Extractor — lists every file added or modified in an Azure DevOps
/// Pull Request, who touched it, and exports the result as CSV.
///
/// The access token, organization, project, repository and PR number are
/// always prompted for interactively.
#[derive(Parser, Debug)]
#[command(name = "pr-file-extractor", version, about)]
struct Cli {
    /// Where to save the CSV export (defaults to PR_<number>_files.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Settings file (defaults to .pr-file-extractor.toml in the current directory)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error("Failed to read input: {0}")]
    Input(#[from] io::Error),

    #[error(transparent)]
    Validation(#[from] input::ValidationError),

    #[error(transparent)]
    DevOps(#[from] devops::DevOpsError),

    #[error(transparent)]
    Export(#[from] export::ExportError),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("{} {}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    info!("loading configuration");
    let config = config::Config::load(cli.config.as_deref())?;
    debug!(base_url = %config.azure_devops.base_url, api_version = %config.azure_devops.api_version, "configuration loaded");

    println!("{}", "Azure DevOps PR File Extractor".bold());
    println!("Get all files added/modified in a Pull Request and export as CSV.");
    println!();

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut stdout = io::stdout();

    let raw = input::prompt_inputs(&mut reader, &mut stdout, input::read_hidden)?;
    let credentials = input::validate_inputs(&raw)?;

    let span = info_span!("pr_extract", org = %credentials.organization, project = %credentials.project, pr = credentials.pr_number);

    println!();
    println!("Fetching PR data from Azure DevOps...");
    let aggregates = devops::fetch_pr_files(&credentials, &config.azure_devops)
        .instrument(span)
        .await?;
    info!(files = aggregates.len(), "fetched PR file changes");

    let Some(rows) = export::build_table(aggregates) else {
        println!("{}", "No data found for this PR.".yellow());
        return Ok(());
    };

    println!("{}", "Data fetched successfully!".green());
    println!();
    export::print_table(&rows);
    println!();

    let csv = export::export_csv(&rows)?;
    let path = cli
        .output
        .unwrap_or_else(|| export::default_file_name(credentials.pr_number));

    if input::confirm(&mut reader, &mut stdout, &format!("Download CSV to {}?", path.display()))? {
        export::write_csv(&csv, &path)?;
        println!("{} {}", "Saved".green(), path.display());
    }
    info!(rows = rows.len(), "done");

    Ok(())
}
