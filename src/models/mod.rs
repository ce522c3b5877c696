use crate::error::SeriesError;
use serde::{Deserialize, Serialize};

// ── Fund directory entry ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FundInfo {
    pub fund_id: i64,
    pub name: String,
    pub invested: f64,   // always > 0, checked when the directory is built
    pub allocated: String,
}

// ── One observation of one fund ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FundRecord {
    pub fund_id: i64,
    pub name: String,
    pub invested: f64,
    pub target_pct: String,   // "15.00%"
    pub actual_pct: String,   // "14.40%"
    pub num_units: f64,
    pub unit_value: f64,
    pub value: f64,
    pub nvalue: f64,          // value / invested, 3 decimals
    pub date: String,         // YYYY-MM-DD
}

// ── Per-fund time series ──────────────────────────────────────────────────────

/// Observations of one fund in log order. `dates[i]`, `values[i]` and
/// `nvalues[i]` always describe the same observation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", try_from = "GroupedSeriesRepr")]
pub struct GroupedSeries {
    fund_id: i64,
    invested: f64,
    allocated: String,
    percent: String,
    dates: Vec<String>,
    values: Vec<f64>,
    nvalues: Vec<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupedSeriesRepr {
    fund_id: i64,
    invested: f64,
    allocated: String,
    percent: String,
    dates: Vec<String>,
    values: Vec<f64>,
    nvalues: Vec<f64>,
}

impl TryFrom<GroupedSeriesRepr> for GroupedSeries {
    type Error = SeriesError;

    fn try_from(r: GroupedSeriesRepr) -> Result<Self, Self::Error> {
        if r.dates.len() != r.values.len() || r.dates.len() != r.nvalues.len() {
            return Err(SeriesError::LengthMismatch {
                fund_id: r.fund_id,
                dates: r.dates.len(),
                values: r.values.len(),
                nvalues: r.nvalues.len(),
            });
        }
        Ok(Self {
            fund_id: r.fund_id,
            invested: r.invested,
            allocated: r.allocated,
            percent: r.percent,
            dates: r.dates,
            values: r.values,
            nvalues: r.nvalues,
        })
    }
}

impl GroupedSeries {
    /// Empty series seeded with the fund parameters of its first record.
    pub fn new(first: &FundRecord) -> Self {
        Self {
            fund_id: first.fund_id,
            invested: first.invested,
            allocated: first.target_pct.clone(),
            percent: first.actual_pct.clone(),
            dates: Vec::new(),
            values: Vec::new(),
            nvalues: Vec::new(),
        }
    }

    /// Appends one observation to all three sequences together.
    pub fn push(&mut self, date: String, value: f64, nvalue: f64) {
        self.dates.push(date);
        self.values.push(value);
        self.nvalues.push(nvalue);
    }

    pub fn fund_id(&self) -> i64 {
        self.fund_id
    }
    pub fn invested(&self) -> f64 {
        self.invested
    }
    pub fn allocated(&self) -> &str {
        &self.allocated
    }
    pub fn percent(&self) -> &str {
        &self.percent
    }
    pub fn dates(&self) -> &[String] {
        &self.dates
    }
    pub fn values(&self) -> &[f64] {
        &self.values
    }
    pub fn nvalues(&self) -> &[f64] {
        &self.nvalues
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

// ── Ranking output ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct FundStats {
    pub fund_id: i64,
    pub label: String,
    pub mean: f64,
    pub std_dev: f64,
}
