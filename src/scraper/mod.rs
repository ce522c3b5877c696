pub mod cleaner;
pub mod extract;
pub mod parsers;

use crate::directory::FundDirectory;
use crate::error::ExtractError;
use crate::models::FundRecord;
use tracing::debug;

use self::cleaner::isodate;
use self::extract::{extract_fund, extract_total};
use self::parsers::{GRID_STRIDE, parse_page};

/// Turn one captured page into records: the total-account record first,
/// then every recognized fund row in page order.
///
/// Nothing is returned unless every recognized row parsed cleanly.
pub fn extract_page(html: &str, directory: &FundDirectory) -> Result<Vec<FundRecord>, ExtractError> {
    let page = parse_page(html)?;
    let date = isodate(&page.raw_date);

    let mut funds = Vec::new();
    for offset in (0..page.cells.len()).step_by(GRID_STRIDE) {
        if let Some(record) = extract_fund(&page.cells, offset, &date, directory)? {
            funds.push(record);
        }
    }

    let total = extract_total(&page.balance_text, &date, directory, &funds)?;
    debug!(
        "{}: total {:.2} / {:.2}, {} of {} rows recognized",
        date,
        total.value,
        total.invested,
        funds.len(),
        page.cells.len() / GRID_STRIDE
    );

    let mut records = Vec::with_capacity(funds.len() + 1);
    records.push(total);
    records.extend(funds);
    Ok(records)
}
