use super::{City, Locality};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(pub String);

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One flat price observation. Prices are in PLN.
///
/// Field order is the persisted column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub city: City,
    pub neighbourhood: Option<String>,
    pub unit: Option<String>,
    pub rooms: Option<u32>,
    /// Lower bound when the page lists a range.
    pub price: f64,
    pub price_max: Option<f64>,
    pub area: Option<f64>,
    pub observed_at: DateTime<Utc>,
}

impl PriceRecord {
    pub fn locality(&self) -> Locality {
        Locality {
            city: self.city,
            neighbourhood: self.neighbourhood.clone(),
        }
    }

    pub fn upper_price(&self) -> f64 {
        self.price_max.unwrap_or(self.price)
    }

    pub fn avg_price(&self) -> f64 {
        (self.price + self.upper_price()) / 2.0
    }

    /// Stable id of what was observed, independent of when.
    pub fn fingerprint(&self) -> Fingerprint {
        use md5::Context;

        let fmt_opt = |v: Option<f64>| v.map(|v| format!("{:.2}", v)).unwrap_or_default();

        let components = [
            self.city.key().to_string(),
            self.neighbourhood.clone().unwrap_or_default().to_lowercase(),
            self.unit
                .as_deref()
                .unwrap_or_default()
                .to_lowercase()
                .replace(' ', ""),
            self.rooms.map(|r| r.to_string()).unwrap_or_default(),
            format!("{:.2}", self.price),
            fmt_opt(self.price_max),
            fmt_opt(self.area),
        ];

        let mut hasher = Context::new();
        hasher.consume(components.join("|").as_bytes());
        Fingerprint(format!("{:x}", hasher.compute()))
    }
}
