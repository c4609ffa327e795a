use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{clean_text, selector, RawRow};
use crate::error::ParseError;
use crate::models::{Locality, PriceRecord};

/// Which markup shape a page's prices were read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `.pricing` block with one
    /// `<td><span>2 pokoje</span> 350 000 - 420 000 zł</td>` per flat type.
    PricingBlock,
    /// A `<table>` whose header names a price column.
    PriceTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Unit,
    Rooms,
    Area,
    Price,
}

const UNIT_HEADERS: &[&str] = &["mieszkanie", "lokal", "nr", "numer", "unit", "apartment", "flat"];
const ROOMS_HEADERS: &[&str] = &["pokoje", "liczba pokoi", "pok.", "rooms"];
const AREA_HEADERS: &[&str] = &["metraż", "metraz", "powierzchnia", "pow.", "area"];
const PRICE_HEADERS: &[&str] = &["cena", "price"];

fn classify_header(text: &str) -> Option<Column> {
    let header = clean_text(text).to_lowercase();
    let matches = |names: &[&str]| names.iter().any(|name| header.starts_with(name));

    if matches(PRICE_HEADERS) {
        // Price per square metre is not the unit price.
        let per_area = header.contains("m²") || header.contains("m2") || header.contains("/m");
        return (!per_area).then_some(Column::Price);
    }
    if matches(AREA_HEADERS) {
        return Some(Column::Area);
    }
    if matches(ROOMS_HEADERS) {
        return Some(Column::Rooms);
    }
    if matches(UNIT_HEADERS) {
        return Some(Column::Unit);
    }
    None
}

fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// Read every candidate row from the first known layout on the page.
/// Rows are returned unfiltered; callers keep those where
/// [`RawRow::is_unit_row`] holds.
pub fn extract_rows(html: &str, url: &str) -> Result<(Layout, Vec<RawRow>), ParseError> {
    let document = Html::parse_document(html);

    if let Some(rows) = pricing_block_rows(&document)? {
        return Ok((Layout::PricingBlock, rows));
    }

    if let Some(rows) = price_table_rows(&document)? {
        return Ok((Layout::PriceTable, rows));
    }

    Err(ParseError::UnknownLayout {
        url: url.to_string(),
    })
}

fn pricing_block_rows(document: &Html) -> Result<Option<Vec<RawRow>>, ParseError> {
    let block_selector = selector(".pricing")?;
    let cell_selector = selector("td")?;
    let label_selector = selector("span")?;

    // A `.pricing` element without cells is decoration; keep looking.
    for block in document.select(&block_selector) {
        let rows = block_rows(block, &cell_selector, &label_selector);
        if !rows.is_empty() {
            return Ok(Some(rows));
        }
    }

    Ok(None)
}

fn block_rows(
    block: ElementRef<'_>,
    cell_selector: &Selector,
    label_selector: &Selector,
) -> Vec<RawRow> {
    let mut rows = Vec::new();

    for cell in block.select(cell_selector) {
        // Styled cells hold notes and banners, not flat types.
        if cell
            .value()
            .attr("class")
            .is_some_and(|class| !class.trim().is_empty())
        {
            continue;
        }

        let label = cell
            .select(label_selector)
            .next()
            .map(element_text)
            .unwrap_or_default();

        let own_text = clean_text(
            &cell
                .children()
                .filter_map(|node| node.value().as_text())
                .map(|text| &**text)
                .collect::<Vec<_>>()
                .join(" "),
        );

        // Price wrapped in its own element instead of sitting beside the label.
        let price_text = if own_text.is_empty() {
            element_text(cell).replacen(&label, "", 1)
        } else {
            own_text
        };

        rows.push(RawRow::default().with_unit(&label).with_price(&price_text));
    }

    rows
}

fn price_table_rows(document: &Html) -> Result<Option<Vec<RawRow>>, ParseError> {
    let table_selector = selector("table")?;
    let row_selector = selector("tr")?;
    let cell_selector = selector("th, td")?;
    let th_selector = selector("th")?;

    for table in document.select(&table_selector) {
        let table_rows: Vec<ElementRef<'_>> = table.select(&row_selector).collect();
        if table_rows.is_empty() {
            continue;
        }

        let header_index = table_rows
            .iter()
            .position(|row| row.select(&th_selector).next().is_some())
            .unwrap_or(0);

        let columns: Vec<Option<Column>> = table_rows[header_index]
            .select(&cell_selector)
            .map(|cell| classify_header(&element_text(cell)))
            .collect();

        if !columns.contains(&Some(Column::Price)) {
            continue;
        }

        let mut rows = Vec::new();

        for table_row in table_rows.iter().skip(header_index + 1) {
            // Row headers (`<th>A1/3</th>`) occupy a column like any other cell.
            let cells: Vec<String> = table_row.select(&cell_selector).map(element_text).collect();
            if cells.is_empty() {
                continue;
            }

            let mut row = RawRow::default();
            for (column, text) in columns.iter().zip(&cells) {
                // First matching column wins.
                row = match column {
                    Some(Column::Unit) if row.unit_label.is_none() => row.with_unit(text),
                    Some(Column::Rooms) if row.rooms_text.is_none() => row.with_rooms(text),
                    Some(Column::Area) if row.area_text.is_none() => row.with_area(text),
                    Some(Column::Price) if row.price_text.is_none() => row.with_price(text),
                    _ => row,
                };
            }
            rows.push(row);
        }

        return Ok(Some(rows));
    }

    Ok(None)
}

/// Turn a listing page into records for `locality`, all stamped
/// `observed_at`. Pure: the same input always yields the same output.
pub fn parse_listing(
    html: &str,
    url: &str,
    locality: &Locality,
    observed_at: DateTime<Utc>,
) -> Result<Vec<PriceRecord>, ParseError> {
    let (layout, rows) = extract_rows(html, url)?;
    let candidates = rows.len();

    let records: Vec<PriceRecord> = rows
        .into_iter()
        .filter(RawRow::is_unit_row)
        .filter_map(|row| row.into_record(locality, observed_at))
        .collect();

    debug!(
        "{}: {:?} layout, kept {} of {} rows",
        locality,
        layout,
        records.len(),
        candidates
    );

    Ok(records)
}
