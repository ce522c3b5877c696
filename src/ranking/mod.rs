use crate::directory::FundDirectory;
use crate::error::StatsError;
use crate::models::FundStats;
use crate::scraper::cleaner::round_to;
use crate::storage::snapshot::SeriesMap;

pub fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample standard deviation (n − 1 denominator).
pub fn sample_std_dev(fund_id: i64, xs: &[f64]) -> Result<f64, StatsError> {
    if xs.len() < 2 {
        return Err(StatsError::TooFewObservations {
            fund_id,
            count: xs.len(),
        });
    }
    let m = mean(xs);
    let ss: f64 = xs.iter().map(|x| (x - m) * (x - m)).sum();
    Ok((ss / (xs.len() - 1) as f64).sqrt())
}

/// Mean and spread of every fund's normalized values, best mean first.
/// Any fund with fewer than two observations fails the whole ranking.
pub fn rank_funds(series: &SeriesMap, directory: &FundDirectory) -> Result<Vec<FundStats>, StatsError> {
    let mut stats = series
        .values()
        .map(|s| {
            let std_dev = sample_std_dev(s.fund_id(), s.nvalues())?;
            Ok(FundStats {
                fund_id: s.fund_id(),
                label: directory
                    .name_of(s.fund_id())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("#{}", s.fund_id())),
                mean: round_to(mean(s.nvalues()), 3),
                std_dev: round_to(std_dev, 3),
            })
        })
        .collect::<Result<Vec<_>, StatsError>>()?;

    stats.sort_by(|a, b| b.mean.total_cmp(&a.mean));
    Ok(stats)
}
