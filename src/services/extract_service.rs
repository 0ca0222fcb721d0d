//! Price extraction from the commodities listing markup.
//!
//! Everything that depends on the page layout lives here: which tables and
//! rows are scanned, how labels are cleaned and matched, and where the price
//! is read from inside a cell. A layout change on the source site should only
//! ever require edits to this module.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::models::{Commodity, PriceRecord};
use crate::utils::errors::ParseError;

lazy_static! {
    static ref TABLE: Selector = Selector::parse("table").expect("valid table selector");
    static ref ROW: Selector = Selector::parse("tr").expect("valid row selector");
    static ref CELL: Selector = Selector::parse("td, th").expect("valid cell selector");
    static ref PRICE_ID: Selector = Selector::parse("#p").expect("valid id selector");
    static ref ANY_ELEMENT: Selector = Selector::parse("*").expect("valid element selector");
    static ref NESTED_TEXT: Selector =
        Selector::parse("span, div, strong").expect("valid nested selector");
}

/// Extract prices for the tracked commodities, stamped with the current time
pub fn extract(markup: &str) -> Result<Vec<PriceRecord>, ParseError> {
    extract_at(markup, Utc::now())
}

/// Extract prices for the tracked commodities, stamped with `timestamp`
///
/// Returns at most one record per commodity. Commodities missing from the page
/// are skipped; a page with no data rows at all is a `ParseError`.
pub fn extract_at(markup: &str, timestamp: DateTime<Utc>) -> Result<Vec<PriceRecord>, ParseError> {
    let document = Html::parse_document(markup);

    let mut records: Vec<PriceRecord> = Vec::new();
    let mut found: HashSet<Commodity> = HashSet::new();
    let mut data_rows = 0usize;

    for table in document.select(&TABLE) {
        let rows: Vec<ElementRef> = table.select(&ROW).collect();
        // Header-only tables carry no prices
        if rows.len() < 2 {
            continue;
        }

        for row in rows.iter().skip(1) {
            let cells: Vec<ElementRef> = row.select(&CELL).collect();
            if cells.len() < 2 {
                continue;
            }
            data_rows += 1;

            let label = clean_label(&element_text(&cells[0]));
            let Some(commodity) = Commodity::match_label(&label) else {
                continue;
            };
            if found.contains(&commodity) {
                debug!("Ignoring duplicate row for {} ('{}')", commodity, label);
                continue;
            }

            match extract_price_from_cell(&cells[1]) {
                Some(price) => {
                    debug!("Matched '{}' as {} at {}", label, commodity, price);
                    found.insert(commodity);
                    records.push(PriceRecord {
                        commodity,
                        price,
                        timestamp,
                    });
                }
                None => {
                    warn!(
                        "Could not parse price for {} from '{}'",
                        commodity,
                        element_text(&cells[1]).trim()
                    );
                }
            }
        }
    }

    if data_rows == 0 {
        return Err(ParseError::NoRows);
    }

    let missing: Vec<&str> = Commodity::ALL
        .iter()
        .filter(|c| !found.contains(*c))
        .map(|c| c.name())
        .collect();
    if !missing.is_empty() {
        warn!("Missing commodities: {}", missing.join(", "));
    }

    info!("Extracted {} price(s) from {} table row(s)", records.len(), data_rows);
    Ok(records)
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>()
}

/// First line of the label with punctuation removed
pub fn clean_label(raw: &str) -> String {
    let first_line = raw
        .trim()
        .split(['\n', '\r'])
        .next()
        .unwrap_or_default();

    first_line
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Read a price from a table cell, trying the most specific markup first
fn extract_price_from_cell(cell: &ElementRef) -> Option<f64> {
    let by_id = cell.select(&PRICE_ID).next().map(|e| element_text(&e));

    let by_class = cell
        .select(&ANY_ELEMENT)
        .find(|e| {
            e.value()
                .attr("class")
                .map(|class| class.to_lowercase().contains("price"))
                .unwrap_or(false)
        })
        .map(|e| element_text(&e));

    let by_nested = cell
        .select(&NESTED_TEXT)
        .map(|e| element_text(&e))
        .find(|text| text.chars().any(|c| c.is_ascii_digit()));

    let whole = Some(element_text(cell));

    [by_id, by_class, by_nested, whole]
        .into_iter()
        .flatten()
        .find_map(|text| parse_price(&text))
}

/// Parse the first number in `text`, ignoring thousands separators
///
/// Returns `None` unless the value is finite and positive.
pub fn parse_price(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let token: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    let cleaned = token.trim_end_matches(['.', ',']).replace(',', "");
    let value: f64 = cleaned.parse().ok()?;

    if value.is_finite() && value > 0.0 {
        Some(value)
    } else {
        None
    }
}
