//! Pipeline orchestrator: captured pages → records → historical log.
//!
//! ## Run modes
//!
//! `process_page()`: one page.
//!   1. Extract the as-of date, the balance panel and the fund grid
//!   2. Build the total-account record plus one record per recognized fund row
//!   3. Append them to the log, total first, one open/append/close per record
//!   A page with an unreadable number appends nothing.
//!
//! `run_batch()`: every page in a directory, in file-name order. The first
//!   failing page stops the batch; pages before it stay in the log.

use crate::directory::FundDirectory;
use crate::loader::discover_pages;
use crate::scraper::extract_page;
use crate::storage::RecordSink;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

pub struct Pipeline<'a> {
    directory: &'a FundDirectory,
}

impl<'a> Pipeline<'a> {
    pub fn new(directory: &'a FundDirectory) -> Self {
        Self { directory }
    }

    pub fn process_page(&self, path: &Path, sink: &mut impl RecordSink) -> Result<PageStats> {
        let html = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read page {:?}", path))?;

        let records = extract_page(&html, self.directory)
            .with_context(|| format!("Extraction failed for {:?}", path))?;

        for record in &records {
            sink.append(record)?;
        }

        // extract_page always puts the total record first
        let date = records.first().map(|r| r.date.clone()).unwrap_or_default();
        info!("{:?}: {} records for {}", path.file_name().unwrap_or_default(), records.len(), date);

        Ok(PageStats {
            date,
            records: records.len(),
        })
    }

    pub fn run_batch(&self, dir: &Path, suffix: &str, sink: &mut impl RecordSink) -> Result<PipelineStats> {
        let pages = discover_pages(dir, suffix)?;
        info!("Found {} pages in {:?}", pages.len(), dir);

        let mut stats = PipelineStats::default();
        for path in &pages {
            let page = self.process_page(path, sink)?;

            if let Some(prev) = stats.last_date.as_deref() {
                if page.date.as_str() < prev {
                    warn!(
                        "{:?} is dated {} but follows a page dated {}; check file naming",
                        path, page.date, prev
                    );
                }
            }

            if stats.first_date.is_none() {
                stats.first_date = Some(page.date.clone());
            }
            stats.last_date = Some(page.date);
            stats.pages_processed += 1;
            stats.records_written += page.records;
        }

        info!(
            "=== Done: {} pages | {} records | {:?} → {:?} ===",
            stats.pages_processed, stats.records_written, stats.first_date, stats.last_date
        );
        Ok(stats)
    }
}

#[derive(Debug)]
pub struct PageStats {
    pub date: String,
    pub records: usize,
}

#[derive(Debug, Default)]
pub struct PipelineStats {
    pub pages_processed: usize,
    pub records_written: usize,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
}
