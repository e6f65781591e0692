use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use env_logger::Env;

use page_fetch::{FetchCommand, HttpFetcher, Mirror};

#[tokio::main]
async fn main() -> Result<()> {
    let args = FetchCommand::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    let config = args.mirror_config().context("Failed to load configuration")?;
    let fetcher = HttpFetcher::new(&config.user_agent, Duration::from_secs(config.timeout_secs))
        .context("Failed to set up HTTP client")?;

    let mirror = Mirror::new(fetcher, &config).show_progress(true);
    let summary = mirror.run(&args.urls).await?;

    if !summary.failed.is_empty() {
        log::warn!(
            "{} of {} pages could not be saved",
            summary.failed.len(),
            args.urls.len()
        );
    }
    if args.verbose {
        println!(
            "📊 {} saved, {} failed",
            summary.saved.len().to_string().green(),
            summary.failed.len().to_string().red()
        );
    }

    Ok(())
}
