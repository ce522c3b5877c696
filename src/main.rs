mod aggregate;
mod config;
mod directory;
mod error;
mod loader;
mod models;
mod pipeline;
mod plot;
mod ranking;
mod scraper;
mod storage;
mod utils;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::AppConfig;
use crate::directory::FundDirectory;
use crate::pipeline::Pipeline;
use crate::storage::HistoricalLog;
use crate::storage::snapshot::{SeriesMap, load_snapshot};

#[derive(Parser)]
#[command(name = "fund-tracker", about = "Fund history from saved account pages", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape every saved page in the pages directory, oldest file name first
    ScrapeAll {
        /// Directory holding the saved pages (default: paths.pages_dir)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Scrape a single saved page and append it to the log
    Scrape {
        file: PathBuf,
    },

    /// Rebuild the per-fund snapshot from the log
    Group,

    /// Rank funds by mean normalized value
    Rank {
        /// Use the saved snapshot instead of rebuilding it from the log
        #[arg(long)]
        from_snapshot: bool,
    },

    /// Chart normalized value over time for every fund
    Plot {
        /// Use the saved snapshot instead of rebuilding it from the log
        #[arg(long)]
        from_snapshot: bool,
    },

    /// List the configured funds
    Funds,

    /// Show log statistics
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "fund_tracker=info,warn",
        1 => "fund_tracker=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;
    let directory = FundDirectory::from_config(&config).context("Fund table is invalid")?;
    let mut log = HistoricalLog::new(&config.paths.log_file);

    match cli.command {
        Command::ScrapeAll { dir } => {
            let _t = utils::Timer::start("Scrape all pages");
            let dir = dir.unwrap_or_else(|| config.paths.pages_dir.clone());
            Pipeline::new(&directory).run_batch(&dir, &config.paths.page_suffix, &mut log)?;
        }

        Command::Scrape { file } => {
            let stats = Pipeline::new(&directory).process_page(&file, &mut log)?;
            info!("{} records appended for {}", stats.records, stats.date);
        }

        Command::Group => {
            let _t = utils::Timer::start("Group by fund");
            info!("Reading {:?}", log.path());
            let series = aggregate::rebuild(&log, &config.paths.snapshot_file)?;
            for s in series.values() {
                println!(
                    "  {:>5}  {:<45} {:>12} {:>7} {:>7} {:>4} obs  last {} ({})",
                    s.fund_id(),
                    directory.name_of(s.fund_id()).unwrap_or("?"),
                    utils::fmt_amount(s.invested()),
                    s.allocated(),
                    s.percent(),
                    s.len(),
                    s.values().last().map(|v| utils::fmt_amount(*v)).unwrap_or("—".into()),
                    s.nvalues().last().map(|v| v.to_string()).unwrap_or("—".into()),
                );
            }
        }

        Command::Rank { from_snapshot } => {
            let series = series_for(from_snapshot, &log, &config.paths.snapshot_file)?;
            let ranked = ranking::rank_funds(&series, &directory)?;
            println!(" Subaccounts ranked by average normalized value:");
            println!(" {:<45} {:>6} {:>8}", "account", "mean", "std dev");
            for s in &ranked {
                println!(" {:<45} {:>6.3} {:>8.3}", s.label, s.mean, s.std_dev);
            }
        }

        Command::Plot { from_snapshot } => {
            let series = series_for(from_snapshot, &log, &config.paths.snapshot_file)?;
            plot::show(&plot::ChartModel::new(&series, &directory))?;
        }

        Command::Funds => {
            println!("{} funds:", directory.len());
            for f in directory.funds() {
                println!("  {:>5}  {:<45} {:>12}  {}", f.fund_id, f.name, utils::fmt_amount(f.invested), f.allocated);
            }
            let t = directory.total();
            println!("  {:>5}  {:<45} {:>12}  {}  (total)", t.fund_id, t.name, utils::fmt_amount(t.invested), t.allocated);
        }

        Command::Stats => {
            let records = log.read_all()?;
            let series = aggregate::group_by_fund(&records);
            let first = records.iter().map(|r| r.date.as_str()).min();
            let last = records.iter().map(|r| r.date.as_str()).max();
            let span = match (first, last) {
                (Some(a), Some(b)) => days_between(a, b),
                _ => None,
            };
            println!("─────────────────────────────────");
            println!("  Fund history — Log Stats");
            println!("─────────────────────────────────");
            println!("  Records  : {}", records.len());
            println!("  Funds    : {}", series.len());
            println!("  From     : {}", first.unwrap_or("—"));
            println!("  To       : {}", last.unwrap_or("—"));
            println!("  Span     : {}", span.map(|d| format!("{} days", d)).unwrap_or("—".into()));
            println!("─────────────────────────────────");
        }
    }

    Ok(())
}

/// Rebuild from the log (the default) or reload the last saved snapshot.
fn series_for(from_snapshot: bool, log: &HistoricalLog, snapshot: &Path) -> Result<SeriesMap> {
    if from_snapshot {
        load_snapshot(snapshot)
    } else {
        aggregate::rebuild(log, snapshot)
    }
}

/// Calendar days between two canonical dates; `None` if either is not a real date.
fn days_between(a: &str, b: &str) -> Option<i64> {
    let a = NaiveDate::parse_from_str(a, "%Y-%m-%d").ok()?;
    let b = NaiveDate::parse_from_str(b, "%Y-%m-%d").ok()?;
    Some((b - a).num_days())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_between() {
        assert_eq!(days_between("2022-08-30", "2022-09-02"), Some(3));
        assert_eq!(days_between("2022-13-40", "2022-09-02"), None);
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["fund-tracker", "-v", "rank", "--from-snapshot"]).unwrap();
        assert_eq!(cli.verbose, 1);
        assert!(matches!(cli.command, Command::Rank { from_snapshot: true }));

        let cli = Cli::try_parse_from(["fund-tracker", "scrape-all", "--dir", "pages"]).unwrap();
        assert!(matches!(cli.command, Command::ScrapeAll { dir: Some(_) }));
    }
}
