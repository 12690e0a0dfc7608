//! The `scrape` subcommand: crawl the storefront and persist the catalog.

use std::path::PathBuf;
use std::sync::atomic::Ordering;

use anyhow::{anyhow, Result};
use clap::Args;
use jaessence_lib::config::{load_config, load_default_config};
use jaessence_lib::{CatalogBuilder, Interrupt, RunStatus, ScrapeConfig};

use crate::output::{
    output_stem, print_json, print_summary_markdown, print_summary_table, write_catalog,
    FileFormat, OutputFormat, RunReport,
};

/// Arguments for the `scrape` subcommand.
#[derive(Args)]
pub struct ScrapeArgs {
    /// Scrape config file (TOML). Uses the built-in config when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory for the catalog files
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Storefront base URL (overrides the config and JAESSENCE_BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Only crawl listing pages; records keep their listing fields
    #[arg(long)]
    pub no_details: bool,

    /// Catalog file format: json, csv or both
    #[arg(long, default_value = "both")]
    pub format: String,
}

pub async fn run(args: &ScrapeArgs, format: &OutputFormat) -> Result<()> {
    let file_format = FileFormat::parse(&args.format)?;
    let config = resolve_config(args)?;

    let builder = CatalogBuilder::from_config(&config)?;
    listen_for_ctrl_c(builder.interrupt_handle());

    eprintln!(
        "Scraping {} categories from {}",
        config.categories.len(),
        config.base_url
    );
    let run = builder.build(&config.categories).await;

    // Persist whatever was collected, whatever the status.
    let stem = output_stem(&run.status);
    let written = write_catalog(&args.out_dir, stem, file_format, &run.catalog)?;
    for path in &written {
        eprintln!("Wrote {} records to {}", run.catalog.len(), path.display());
    }

    match format {
        OutputFormat::Table => print_summary_table(&run),
        OutputFormat::Markdown => print_summary_markdown(&run),
        OutputFormat::Json => print_json(&RunReport::new(&run, &written)),
    }

    match run.status {
        RunStatus::Complete => Ok(()),
        RunStatus::Interrupted => {
            eprintln!("Interrupted: partial catalog saved");
            Ok(())
        }
        RunStatus::Failed(msg) => Err(anyhow!("scrape failed: {}", msg)),
    }
}

/// Config file or built-in default, then the base URL override from the
/// command line or the environment.
fn resolve_config(args: &ScrapeArgs) -> Result<ScrapeConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => load_default_config()?,
    };

    let base_url = args
        .base_url
        .clone()
        .or_else(|| std::env::var("JAESSENCE_BASE_URL").ok());
    if let Some(url) = base_url {
        config = config.with_base_url(&url);
        config.validate()?;
    }
    if args.no_details {
        config.fetch_details = false;
    }
    Ok(config)
}

/// Exit status after a forced stop (128 + SIGINT).
const FORCED_EXIT_CODE: i32 = 130;

/// First Ctrl-C stops the run after the current product. A second one exits
/// at once, even mid-retry.
fn listen_for_ctrl_c(interrupt: Interrupt) {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if raise_interrupt(&interrupt) {
                eprintln!("Second interrupt, exiting without saving");
                std::process::exit(FORCED_EXIT_CODE);
            }
            tracing::warn!(
                "Interrupt received, stopping after the current product (Ctrl-C again to force)"
            );
        }
    });
}

/// Sets the interrupt flag. Returns true when it was already set.
fn raise_interrupt(interrupt: &Interrupt) -> bool {
    interrupt.swap(true, Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    #[test]
    fn test_second_interrupt_forces_exit() {
        let interrupt: Interrupt = Arc::new(AtomicBool::new(false));
        assert!(!raise_interrupt(&interrupt));
        assert!(interrupt.load(Ordering::SeqCst));
        assert!(raise_interrupt(&interrupt));
    }
}
