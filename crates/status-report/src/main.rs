//! Status report CLI - fetch open issues, edit the draft, mail the report.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use status_report::config::{Config, DEFAULT_CONFIG_PATH};
use status_report::pipeline::{Pipeline, RunOptions, RunOutcome};
use status_report::tracker::JiraScraper;

/// Status report CLI - turn the day's draft into a mailed HTML report.
#[derive(Parser)]
#[command(name = "status-report")]
#[command(about = "Daily status report from open tracker issues")]
#[command(version)]
pub struct Cli {
    /// Number of days from today for the report date
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    days: i64,

    /// Send (or preview) to my own address instead of the work address
    #[arg(long)]
    me: bool,

    /// Use this literal date label instead of computing one from --days
    #[arg(long = "forceDate", alias = "force-date")]
    force_date: Option<String>,

    /// Open the report in a browser instead of sending it
    #[arg(long = "dryRun", alias = "dry-run")]
    dry_run: bool,

    /// Keep the draft's issue comments and skip the tracker
    #[arg(long)]
    no_fetch: bool,

    /// Configuration file
    #[arg(long, env = "STATUS_REPORT_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("status_report=debug,info")
        } else {
            EnvFilter::new("status_report=info,warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;

    let options = RunOptions {
        days: cli.days,
        to_me: cli.me,
        force_date: cli.force_date,
        dry_run: cli.dry_run,
        no_fetch: cli.no_fetch,
    };

    let scraper = JiraScraper::from_config(&config).context("Failed to set up tracker client")?;
    let pipeline = Pipeline::new(&config, options);

    match pipeline.run(&scraper).await? {
        RunOutcome::Sent { to } => {
            println!("{} Report sent to {to}", "✅".green());
        }
        RunOutcome::Previewed { path } => {
            println!("{} Preview written to {}", "👀".cyan(), path.display());
        }
    }

    Ok(())
}
