use chrono::{DateTime, Utc};

use super::{clean_text, parse_area, parse_price_range, parse_rooms};
use crate::models::{Locality, PriceRecord};

/// One row as found on the page. Every field may be missing; the typed
/// accessors decide what is usable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub unit_label: Option<String>,
    pub rooms_text: Option<String>,
    pub price_text: Option<String>,
    pub area_text: Option<String>,
}

fn non_empty(text: &str) -> Option<String> {
    let cleaned = clean_text(text);
    (!cleaned.is_empty()).then_some(cleaned)
}

impl RawRow {
    pub fn with_unit(mut self, text: &str) -> Self {
        self.unit_label = non_empty(text);
        self
    }

    pub fn with_rooms(mut self, text: &str) -> Self {
        self.rooms_text = non_empty(text);
        self
    }

    pub fn with_price(mut self, text: &str) -> Self {
        self.price_text = non_empty(text);
        self
    }

    pub fn with_area(mut self, text: &str) -> Self {
        self.area_text = non_empty(text);
        self
    }

    pub fn price_range(&self) -> Option<(f64, Option<f64>)> {
        self.price_text.as_deref().and_then(parse_price_range)
    }

    /// Explicit rooms column first, then a count inside the unit label
    /// (`"2 pokoje"`).
    pub fn rooms(&self) -> Option<u32> {
        self.rooms_text
            .as_deref()
            .and_then(parse_rooms)
            .or_else(|| {
                self.unit_label
                    .as_deref()
                    .filter(|label| label.to_lowercase().contains("pok"))
                    .and_then(parse_rooms)
            })
    }

    pub fn area(&self) -> Option<f64> {
        self.area_text.as_deref().and_then(parse_area)
    }

    /// Headers, ads and placeholder rows have no parseable price.
    pub fn is_unit_row(&self) -> bool {
        self.price_range().is_some()
    }

    pub fn into_record(
        self,
        locality: &Locality,
        observed_at: DateTime<Utc>,
    ) -> Option<PriceRecord> {
        let (price, price_max) = self.price_range()?;
        let rooms = self.rooms();
        let area = self.area();

        Some(PriceRecord {
            city: locality.city,
            neighbourhood: locality.neighbourhood.clone(),
            unit: self.unit_label,
            rooms,
            price,
            price_max,
            area,
            observed_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::City;
    use chrono::TimeZone;

    #[test]
    fn header_row_is_not_a_unit_row() {
        let header = RawRow::default()
            .with_unit("Mieszkanie")
            .with_price("Cena");
        assert!(!header.is_unit_row());
        assert!(!RawRow::default().is_unit_row());
    }

    #[test]
    fn rooms_fall_back_to_unit_label() {
        let row = RawRow::default().with_unit("3 pokoje").with_price("500 000 zł");
        assert_eq!(row.rooms(), Some(3));

        let labelled = RawRow::default().with_unit("B2/14").with_price("500 000 zł");
        assert_eq!(labelled.rooms(), None);
    }

    #[test]
    fn builds_record_with_optional_fields_missing() {
        let locality = Locality::new(City::Sopot, "okrzei");
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap();

        let record = RawRow::default()
            .with_price("1 234 000,00 zł")
            .into_record(&locality, at)
            .unwrap();

        assert_eq!(record.city, City::Sopot);
        assert_eq!(record.neighbourhood.as_deref(), Some("okrzei"));
        assert_eq!(record.price, 1_234_000.0);
        assert_eq!(record.unit, None);
        assert_eq!(record.area, None);
        assert_eq!(record.observed_at, at);
    }

    #[test]
    fn row_without_price_yields_no_record() {
        let locality = Locality::city(City::Gdynia);
        let row = RawRow::default().with_unit("2 pokoje").with_area("48 m²");
        assert!(row.into_record(&locality, Utc::now()).is_none());
    }
}
