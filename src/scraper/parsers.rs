use crate::error::ExtractError;
use scraper::{ElementRef, Html, Selector};

// ── Page layout ───────────────────────────────────────────────────────────────
//
// The account detail page has three regions we care about:
//   header : the "value as of" date input
//   balance: narrative panel listing deposited / death benefit /
//             accumulation / cash surrender amounts
//   grid   : per-fund data table, 7 gridcells per fund row
//
// A change in any of these is a new page version and needs a code change.

pub const DATE_INPUT: &str = r#"[id="policyDetailsForm:valueAsOfDate_input"]"#;
pub const BALANCE_PANEL: &str = r#"[id="policyDetailsForm:addlDetailsPanel"]"#;
pub const FUND_GRID: &str = r#"[id="dialogForm:assetAllocation_dataTable_data"]"#;
pub const GRID_CELL: &str = r#"[role="gridcell"]"#;

/// Cells per fund row: unused, name, actual %, target %, units, unit value, value.
pub const GRID_STRIDE: usize = 7;

/// Raw text pulled out of one page, before any typing.
#[derive(Debug, Clone, Default)]
pub struct PageSnapshot {
    pub raw_date: String,
    pub balance_text: String,
    pub cells: Vec<String>,
}

fn selector(s: &str) -> Result<Selector, ExtractError> {
    Selector::parse(s).map_err(|e| ExtractError::Selector(format!("{}: {:?}", s, e)))
}

fn find<'a>(doc: &'a Html, sel: &str, region: &'static str) -> Result<ElementRef<'a>, ExtractError> {
    let sel = selector(sel)?;
    doc.select(&sel)
        .next()
        .ok_or(ExtractError::MissingRegion(region))
}

pub fn parse_page(html: &str) -> Result<PageSnapshot, ExtractError> {
    let doc = Html::parse_document(html);

    // The date lives in the input's value attribute; fall back to its text.
    let date_el = find(&doc, DATE_INPUT, "as-of date")?;
    let raw_date = date_el
        .value()
        .attr("value")
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| date_el.text().collect::<String>().trim().to_string());
    if raw_date.is_empty() {
        return Err(ExtractError::MissingRegion("as-of date"));
    }

    // Join text nodes with a space so amounts in adjacent elements stay apart.
    let balance_text = find(&doc, BALANCE_PANEL, "balance panel")?
        .text()
        .collect::<Vec<_>>()
        .join(" ");

    let cell_sel = selector(GRID_CELL)?;
    let cells: Vec<String> = find(&doc, FUND_GRID, "fund grid")?
        .select(&cell_sel)
        .map(|td| td.text().collect::<String>())
        .collect();

    if cells.len() % GRID_STRIDE != 0 {
        return Err(ExtractError::GridShape {
            cells: cells.len(),
            stride: GRID_STRIDE,
        });
    }

    Ok(PageSnapshot {
        raw_date,
        balance_text,
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <form id="policyDetailsForm">
          <input id="policyDetailsForm:valueAsOfDate_input" type="text" value="09/01/2022"/>
          <div id="policyDetailsForm:addlDetailsPanel">
            <span>Deposits</span><span>$60,000.00</span>
            <span>Accumulation</span><span>$61,234.56</span>
          </div>
        </form>
        <table><tbody id="dialogForm:assetAllocation_dataTable_data">
          <tr>
            <td role="gridcell"></td><td role="gridcell">Fund&nbsp;A</td>
            <td role="gridcell">14.40%</td><td role="gridcell">15.00%</td>
            <td role="gridcell">738.3417</td><td role="gridcell">11.544138</td>
            <td role="gridcell">$8,523.52</td>
          </tr>
        </tbody></table>
    </body></html>"#;

    #[test]
    fn test_parse_page_regions() {
        let snap = parse_page(PAGE).unwrap();
        assert_eq!(snap.raw_date, "09/01/2022");
        assert!(snap.balance_text.contains("$60,000.00"));
        assert!(!snap.balance_text.contains("60,000.00Accumulation"));
        assert_eq!(snap.cells.len(), GRID_STRIDE);
        assert_eq!(snap.cells[1], "Fund\u{a0}A");
        assert_eq!(snap.cells[6], "$8,523.52");
    }

    #[test]
    fn test_missing_grid_is_an_error() {
        let html = PAGE.replace("dialogForm:assetAllocation_dataTable_data", "other");
        let err = parse_page(&html).unwrap_err();
        assert!(matches!(err, ExtractError::MissingRegion("fund grid")));
    }

    #[test]
    fn test_missing_date_is_an_error() {
        let html = PAGE.replace("valueAsOfDate_input", "somethingElse");
        assert!(matches!(
            parse_page(&html).unwrap_err(),
            ExtractError::MissingRegion("as-of date")
        ));
    }

    #[test]
    fn test_partial_row_is_a_layout_error() {
        let html = PAGE.replace(r#"<td role="gridcell">$8,523.52</td>"#, "");
        let err = parse_page(&html).unwrap_err();
        assert!(matches!(err, ExtractError::GridShape { cells: 6, stride: 7 }));
    }
}
