//! Domain error types.
//!
//! Unrecognized fund names are deliberately absent here: the extractor
//! skips those rows instead of failing.

use thiserror::Error;

/// A page could not be turned into records. Always fatal for that page.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Page has no {0}")]
    MissingRegion(&'static str),

    #[error("Fund grid has {cells} cells, not a multiple of {stride}")]
    GridShape { cells: usize, stride: usize },

    #[error("Cannot read {field} from {raw:?}")]
    InvalidNumber { field: &'static str, raw: String },

    #[error("Balance block holds {found} amounts, need at least {needed}")]
    BalanceAmounts { found: usize, needed: usize },

    #[error("Invested amount must be positive, got {0}")]
    NonPositiveInvested(f64),

    #[error("Bad selector {0:?}")]
    Selector(String),
}

/// The configured fund table is inconsistent.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Fund {name:?} has invested amount {invested}, must be positive")]
    NonPositiveInvested { name: String, invested: f64 },

    #[error("Fund id {0} appears more than once")]
    DuplicateId(i64),

    #[error("Fund name {0:?} appears more than once")]
    DuplicateName(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error(
        "Fund {fund_id}: {dates} dates, {values} values, {nvalues} normalized values"
    )]
    LengthMismatch {
        fund_id: i64,
        dates: usize,
        values: usize,
        nvalues: usize,
    },
}

#[derive(Debug, Error, PartialEq)]
pub enum StatsError {
    #[error("Fund {fund_id} has {count} observation(s); standard deviation needs at least two")]
    TooFewObservations { fund_id: i64, count: usize },
}
