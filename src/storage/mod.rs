pub mod snapshot;

use crate::models::FundRecord;
use crate::scraper::cleaner::{isodate, normalized, strip_whitespace};
use anyhow::{Context, Result, bail};
use csv::StringRecord;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::debug;

// ── Log format ────────────────────────────────────────────────────────────────
//
//   fundId,name,invested,futurePct,actualPct,numUnits,unitValue,value,nvalue,date
//
// No header is written. One is tolerated on read if someone added it by hand.

pub const LOG_FIELDS: usize = 10;
const HEADER_MARKER: &str = "fundId";

/// Anything records can be appended to.
pub trait RecordSink {
    fn append(&mut self, record: &FundRecord) -> Result<()>;
}

impl RecordSink for Vec<FundRecord> {
    fn append(&mut self, record: &FundRecord) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

// ── Historical log ────────────────────────────────────────────────────────────

/// Append-only CSV file holding every record ever extracted.
#[derive(Debug, Clone)]
pub struct HistoricalLog {
    path: PathBuf,
}

impl HistoricalLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every record in file order. The normalized value is recomputed from
    /// invested and value rather than read back.
    pub fn read_all(&self) -> Result<Vec<FundRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)
            .with_context(|| format!("Could not open log {:?}", self.path))?;

        let mut records = Vec::new();
        for (i, row) in reader.records().enumerate() {
            let line = i + 1;
            let row = row.with_context(|| format!("{:?} line {}", self.path, line))?;
            if line == 1 && row.get(0).map(str::trim) == Some(HEADER_MARKER) {
                continue;
            }
            let record = from_row(&row)
                .with_context(|| format!("{:?} line {}", self.path, line))?;
            records.push(record);
        }

        debug!("Read {} records from {:?}", records.len(), self.path);
        Ok(records)
    }
}

impl RecordSink for HistoricalLog {
    /// Opens, appends one line and closes, so every record is on disk
    /// before the next one is produced.
    fn append(&mut self, record: &FundRecord) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Could not create dir {:?}", parent))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Could not open log {:?}", self.path))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer
            .write_record(to_row(record))
            .with_context(|| format!("append {} {}", record.fund_id, record.date))?;
        writer.flush()?;
        Ok(())
    }
}

// ── Row conversion ────────────────────────────────────────────────────────────

fn to_row(r: &FundRecord) -> [String; LOG_FIELDS] {
    [
        r.fund_id.to_string(),
        r.name.clone(),
        r.invested.to_string(),
        r.target_pct.clone(),
        r.actual_pct.clone(),
        r.num_units.to_string(),
        r.unit_value.to_string(),
        r.value.to_string(),
        r.nvalue.to_string(),
        r.date.clone(),
    ]
    .map(|f| strip_whitespace(&f))
}

fn number(row: &StringRecord, idx: usize, field: &str) -> Result<f64> {
    let raw = row.get(idx).unwrap_or_default();
    raw.trim()
        .parse()
        .with_context(|| format!("{} is not a number: {:?}", field, raw))
}

fn text(row: &StringRecord, idx: usize) -> String {
    row.get(idx).unwrap_or_default().trim().to_string()
}

fn from_row(row: &StringRecord) -> Result<FundRecord> {
    if row.len() != LOG_FIELDS {
        bail!("expected {} fields, found {}", LOG_FIELDS, row.len());
    }

    let fund_id: i64 = text(row, 0)
        .parse()
        .with_context(|| format!("fund id is not an integer: {:?}", text(row, 0)))?;
    let invested = number(row, 2, "invested")?;
    if invested.is_nan() || invested <= 0.0 {
        bail!("fund {} has invested amount {}", fund_id, invested);
    }
    let value = number(row, 7, "value")?;

    Ok(FundRecord {
        fund_id,
        name: text(row, 1),
        invested,
        target_pct: text(row, 3),
        actual_pct: text(row, 4),
        num_units: number(row, 5, "unit count")?,
        unit_value: number(row, 6, "unit value")?,
        value,
        nvalue: normalized(value, invested),
        date: isodate(&text(row, 9)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(fund_id: i64, value: f64, date: &str) -> FundRecord {
        FundRecord {
            fund_id,
            name: "JNL/Mellon Energy Sector".into(),
            invested: 9000.0,
            target_pct: "15.00%".into(),
            actual_pct: "14.40%".into(),
            num_units: 738.3417,
            unit_value: 11.544138,
            value,
            nvalue: normalized(value, 9000.0),
            date: date.into(),
        }
    }

    #[test]
    fn test_line_has_no_whitespace() {
        let dir = TempDir::new().unwrap();
        let mut log = HistoricalLog::new(dir.path().join("log.csv"));
        log.append(&record(190, 8523.52, "2022-09-02")).unwrap();

        let text = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(
            text,
            "190,JNL/MellonEnergySector,9000,15.00%,14.40%,738.3417,11.544138,8523.52,0.947,2022-09-02\n"
        );
    }

    #[test]
    fn test_append_is_growth_only() {
        let dir = TempDir::new().unwrap();
        let mut log = HistoricalLog::new(dir.path().join("nested/log.csv"));
        log.append(&record(190, 9000.0, "2022-09-01")).unwrap();
        log.append(&record(66, 9100.0, "2022-09-01")).unwrap();
        log.append(&record(190, 9200.0, "2022-09-02")).unwrap();

        let back = log.read_all().unwrap();
        assert_eq!(back.len(), 3);
        assert_eq!(back[0].fund_id, 190);
        assert_eq!(back[1].fund_id, 66);
        assert_eq!(back[2].value, 9200.0);
    }

    #[test]
    fn test_read_recomputes_nvalue_and_date() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.csv");
        std::fs::write(
            &path,
            "fundId,name,invested,futurePct,actualPct,numUnits,unitValue,value,nvalue,date\n\
             66,Fund,9000.0,15.00%,14.40%,738.3417,11.544138,8523.52,9.999,09/02/2022\n",
        )
        .unwrap();

        let back = HistoricalLog::new(&path).read_all().unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].nvalue, 0.947);
        assert_eq!(back[0].date, "2022-09-02");
    }

    #[test]
    fn test_malformed_line_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.csv");
        std::fs::write(
            &path,
            "66,Fund,9000,15%,14%,1,1,9000,1.0,2022-09-01\n66,Fund,9000,15%\n",
        )
        .unwrap();

        let err = HistoricalLog::new(&path).read_all().unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[test]
    fn test_missing_log_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(HistoricalLog::new(dir.path().join("absent.csv")).read_all().is_err());
    }
}
