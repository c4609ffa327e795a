use chrono::NaiveDate;
use std::fmt;

use crate::models::{Locality, PriceRecord};
use crate::parsers::format_price_pln_display;

/// Printable price table for one locality on one day.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighbourhoodSummary {
    pub locality: Locality,
    pub date: NaiveDate,
    pub rows: Vec<SummaryRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub label: String,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

/// Group records by locality and day, keeping first-seen order.
pub fn summarize(records: &[PriceRecord]) -> Vec<NeighbourhoodSummary> {
    let mut summaries: Vec<NeighbourhoodSummary> = Vec::new();

    for record in records {
        let locality = record.locality();
        let date = record.observed_at.date_naive();

        let row = SummaryRow {
            label: record
                .rooms
                .map(|r| r.to_string())
                .or_else(|| record.unit.clone())
                .unwrap_or_else(|| "-".to_string()),
            min: record.price,
            max: record.upper_price(),
            avg: record.avg_price(),
        };

        match summaries
            .iter_mut()
            .find(|s| s.locality == locality && s.date == date)
        {
            Some(summary) => summary.rows.push(row),
            None => summaries.push(NeighbourhoodSummary {
                locality,
                date,
                rows: vec![row],
            }),
        }
    }

    summaries
}

impl fmt::Display for NeighbourhoodSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match &self.locality.neighbourhood {
            Some(n) => format!("{} ({})", n, self.locality.city),
            None => self.locality.city.to_string(),
        };

        writeln!(f, "Pricing for {} at {}:", name, self.date.format("%Y-%m-%d"))?;
        writeln!(f, "----------------------------------------")?;
        write!(f, "Rooms\tMin\tMax\tAvg")?;
        for row in &self.rows {
            write!(
                f,
                "\n{}\t{}\t{}\t{}",
                row.label,
                format_price_pln_display(row.min),
                format_price_pln_display(row.max),
                format_price_pln_display(row.avg)
            )?;
        }
        Ok(())
    }
}
