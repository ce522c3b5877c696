//! Folds the historical log into one time series per fund.

use crate::models::{FundRecord, GroupedSeries};
use crate::storage::HistoricalLog;
use crate::storage::snapshot::{SeriesMap, save_snapshot};
use anyhow::Result;
use std::path::Path;
use tracing::info;

/// Group records by fund id, keeping log order inside each fund.
pub fn group_by_fund(records: &[FundRecord]) -> SeriesMap {
    records.iter().fold(SeriesMap::new(), |mut acc, r| {
        acc.entry(r.fund_id)
            .or_insert_with(|| GroupedSeries::new(r))
            .push(r.date.clone(), r.value, r.nvalue);
        acc
    })
}

/// Rebuild the snapshot from scratch: read the whole log, group, overwrite.
pub fn rebuild(log: &HistoricalLog, snapshot: &Path) -> Result<SeriesMap> {
    let records = log.read_all()?;
    let series = group_by_fund(&records);
    info!("Grouped {} records into {} funds", records.len(), series.len());
    save_snapshot(snapshot, &series)?;
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::cleaner::normalized;
    use crate::storage::RecordSink;
    use crate::storage::snapshot::load_snapshot;
    use tempfile::TempDir;

    fn record(fund_id: i64, invested: f64, value: f64, date: &str) -> FundRecord {
        FundRecord {
            fund_id,
            name: format!("Fund{}", fund_id),
            invested,
            target_pct: "10%".into(),
            actual_pct: "10%".into(),
            num_units: 100.0,
            unit_value: value / 100.0,
            value,
            nvalue: normalized(value, invested),
            date: date.into(),
        }
    }

    #[test]
    fn test_interleaved_records_stay_parallel_and_ordered() {
        let records = vec![
            record(1, 1000.0, 1000.0, "2022-09-01"),
            record(2, 500.0, 510.0, "2022-09-01"),
            record(1, 1000.0, 1020.0, "2022-09-02"),
            record(2, 500.0, 490.0, "2022-09-02"),
            record(1, 1000.0, 990.0, "2022-09-03"),
        ];
        let map = group_by_fund(&records);

        let x = &map[&1];
        assert_eq!(x.len(), 3);
        assert_eq!(x.values().len(), 3);
        assert_eq!(x.nvalues().len(), 3);
        assert_eq!(x.dates(), ["2022-09-01", "2022-09-02", "2022-09-03"]);
        assert_eq!(x.values(), [1000.0, 1020.0, 990.0]);
        assert_eq!(x.nvalues(), [1.0, 1.02, 0.99]);

        let y = &map[&2];
        assert_eq!(y.len(), 2);
        assert_eq!(y.nvalues(), [1.02, 0.98]);
    }

    #[test]
    fn test_series_parameters_come_from_first_record() {
        let mut first = record(1, 1000.0, 1000.0, "2022-09-01");
        first.actual_pct = "9.9%".into();
        let mut later = record(1, 1000.0, 1100.0, "2022-09-02");
        later.actual_pct = "11.0%".into();

        let map = group_by_fund(&[first, later]);
        assert_eq!(map[&1].percent(), "9.9%");
        assert_eq!(map[&1].invested(), 1000.0);
    }

    #[test]
    fn test_rebuild_matches_extraction_time_nvalue() {
        let dir = TempDir::new().unwrap();
        let mut log = HistoricalLog::new(dir.path().join("log.csv"));
        let snapshot = dir.path().join("groupByFund.json");

        let original = record(66, 9000.0, 8523.52, "2022-09-02");
        log.append(&original).unwrap();

        let map = rebuild(&log, &snapshot).unwrap();
        assert_eq!(map[&66].nvalues(), [original.nvalue]);

        let reloaded = load_snapshot(&snapshot).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[&66].dates(), ["2022-09-02"]);
        assert_eq!(reloaded[&66].len(), 1);
    }

    #[test]
    fn test_rebuild_is_not_incremental() {
        let dir = TempDir::new().unwrap();
        let mut log = HistoricalLog::new(dir.path().join("log.csv"));
        let snapshot = dir.path().join("groupByFund.json");
        log.append(&record(1, 1000.0, 1000.0, "2022-09-01")).unwrap();

        rebuild(&log, &snapshot).unwrap();
        let map = rebuild(&log, &snapshot).unwrap();
        assert_eq!(map[&1].len(), 1);
    }
}
