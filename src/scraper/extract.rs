//! Field extraction: grid cells and balance text → typed `FundRecord`s.

use crate::directory::FundDirectory;
use crate::error::ExtractError;
use crate::models::FundRecord;
use crate::scraper::cleaner::{normalized, parse_currency, parse_decimal, round_to};
use crate::scraper::parsers::GRID_STRIDE;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Currency amount with thousands separators, e.g. "$60,000.00".
static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$?\s*\d{1,3}(?:,\d{3})+\.\d{2}").expect("Invalid amount pattern")
});

/// Positions in the balance panel: deposited, death benefit, accumulation, cash surrender.
const BALANCE_INVESTED_IDX: usize = 0;
const BALANCE_VALUE_IDX: usize = 2;

// ── Fund rows ─────────────────────────────────────────────────────────────────

/// Build the record for the grid row starting at `offset`.
///
/// Rows whose name is not in the directory (headers, blanks, funds not held)
/// yield `Ok(None)`. A recognized row with an unreadable number is an error.
pub fn extract_fund(
    cells: &[String],
    offset: usize,
    date: &str,
    directory: &FundDirectory,
) -> Result<Option<FundRecord>, ExtractError> {
    let row = cells
        .get(offset..offset + GRID_STRIDE)
        .ok_or(ExtractError::GridShape {
            cells: cells.len(),
            stride: GRID_STRIDE,
        })?;

    let name = row[1].trim();
    let Some(info) = directory.lookup(name) else {
        debug!("Skipping unrecognized row at cell {}: {:?}", offset, name);
        return Ok(None);
    };

    let num_units = parse_decimal("unit count", &row[4])?;
    let unit_value = parse_decimal("unit value", &row[5])?;
    let value = parse_currency("value", &row[6])?;

    Ok(Some(FundRecord {
        fund_id: info.fund_id,
        name: name.to_string(),
        invested: info.invested,
        target_pct: row[3].trim().to_string(),
        actual_pct: row[2].trim().to_string(),
        num_units,
        unit_value,
        value,
        nvalue: normalized(value, info.invested),
        date: date.to_string(),
    }))
}

// ── Total account ─────────────────────────────────────────────────────────────

/// All currency amounts in the balance panel, in page order.
pub fn balance_amounts(text: &str) -> Result<Vec<f64>, ExtractError> {
    AMOUNT_RE
        .find_iter(text)
        .map(|m| parse_currency("balance amount", m.as_str()))
        .collect()
}

/// Build the whole-account record from the balance panel.
///
/// `fund_rows` are the page's resolved fund records; their unit counts are
/// summed into the total's unit count.
pub fn extract_total(
    balance_text: &str,
    date: &str,
    directory: &FundDirectory,
    fund_rows: &[FundRecord],
) -> Result<FundRecord, ExtractError> {
    let amounts = balance_amounts(balance_text)?;
    let needed = BALANCE_VALUE_IDX.max(BALANCE_INVESTED_IDX) + 1;
    if amounts.len() < needed {
        return Err(ExtractError::BalanceAmounts {
            found: amounts.len(),
            needed,
        });
    }

    let invested = amounts[BALANCE_INVESTED_IDX];
    let value = amounts[BALANCE_VALUE_IDX];
    if invested <= 0.0 {
        return Err(ExtractError::NonPositiveInvested(invested));
    }

    let num_units = round_to(fund_rows.iter().map(|r| r.num_units).sum(), 4);
    let unit_value = if num_units > 0.0 {
        round_to(value / num_units, 3)
    } else {
        0.0
    };

    let total = directory.total();
    Ok(FundRecord {
        fund_id: total.fund_id,
        name: total.name.clone(),
        invested,
        target_pct: total.allocated.clone(),
        actual_pct: format!("{}%", round_to(value / invested * 100.0, 2)),
        num_units,
        unit_value,
        value,
        nvalue: normalized(value, invested),
        date: date.to_string(),
    })
}
