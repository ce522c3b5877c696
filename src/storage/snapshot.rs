//! Derived per-fund snapshot: `{"<fundId>": {fundId, invested, allocated,
//! percent, dates, values, nvalues}, ...}`. Always rebuilt from the log.

use crate::models::GroupedSeries;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

pub type SeriesMap = BTreeMap<i64, GroupedSeries>;

/// Overwrites whatever snapshot was there before.
pub fn save_snapshot(path: &Path, series: &SeriesMap) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Could not create dir {:?}", parent))?;
    }
    let mut json = serde_json::to_string(series).context("Snapshot serialization failed")?;
    json.push('\n');
    std::fs::write(path, json).with_context(|| format!("Could not write snapshot {:?}", path))?;
    info!("Snapshot of {} funds saved to {:?}", series.len(), path);
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<SeriesMap> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read snapshot {:?}", path))?;
    serde_json::from_str(&text).with_context(|| format!("Snapshot {:?} is malformed", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FundRecord;
    use tempfile::TempDir;

    fn series(fund_id: i64, points: &[(&str, f64)]) -> GroupedSeries {
        let first = FundRecord {
            fund_id,
            name: "Fund".into(),
            invested: 1000.0,
            target_pct: "10%".into(),
            actual_pct: "9.5%".into(),
            num_units: 1.0,
            unit_value: 1.0,
            value: 1000.0,
            nvalue: 1.0,
            date: "2022-09-01".into(),
        };
        let mut s = GroupedSeries::new(&first);
        for (d, v) in points {
            s.push(d.to_string(), *v, v / 1000.0);
        }
        s
    }

    #[test]
    fn test_snapshot_reloads_identically() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("groupByFund.json");
        let mut map = SeriesMap::new();
        map.insert(-999, series(-999, &[("2022-09-01", 1000.0), ("2022-09-02", 1500.0)]));
        map.insert(66, series(66, &[("2022-09-01", 500.0)]));

        save_snapshot(&path, &map).unwrap();
        assert_eq!(load_snapshot(&path).unwrap(), map);

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["-999"]["fundId"], -999);
        assert_eq!(raw["66"]["nvalues"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_save_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("groupByFund.json");
        let mut map = SeriesMap::new();
        map.insert(1, series(1, &[("2022-09-01", 1000.0)]));
        save_snapshot(&path, &map).unwrap();

        map.clear();
        save_snapshot(&path, &map).unwrap();
        assert!(load_snapshot(&path).unwrap().is_empty());
    }
}
