use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum City {
    Gdynia,
    Gdansk,
    Sopot,
}

impl City {
    /// Slug used in the developer's URLs and in persisted records.
    pub fn key(&self) -> &'static str {
        match self {
            City::Gdynia => "gdynia",
            City::Gdansk => "gdansk",
            City::Sopot => "sopot",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            City::Gdynia => "Gdynia",
            City::Gdansk => "Gdańsk",
            City::Sopot => "Sopot",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "gdynia" => Some(City::Gdynia),
            "gdansk" | "gdańsk" => Some(City::Gdansk),
            "sopot" => Some(City::Sopot),
            _ => None,
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A city, optionally narrowed to one of the developer's neighbourhoods.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locality {
    pub city: City,
    pub neighbourhood: Option<String>,
}

impl Locality {
    pub fn city(city: City) -> Self {
        Self { city, neighbourhood: None }
    }

    pub fn new(city: City, neighbourhood: &str) -> Self {
        let neighbourhood = neighbourhood.trim();
        Self {
            city,
            neighbourhood: (!neighbourhood.is_empty()).then(|| neighbourhood.to_string()),
        }
    }

    /// Path of the listing page relative to the site root, always ending in `/`.
    pub fn path(&self) -> String {
        match &self.neighbourhood {
            Some(n) => format!("mieszkania-{}/{}/", self.city.key(), n),
            None => format!("mieszkania-{}/", self.city.key()),
        }
    }
}

impl fmt::Display for Locality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.neighbourhood {
            Some(n) => write!(f, "{}/{}", self.city.key(), n),
            None => write!(f, "{}", self.city.key()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_with_and_without_neighbourhood() {
        assert_eq!(
            Locality::new(City::Gdynia, "portova").path(),
            "mieszkania-gdynia/portova/"
        );
        assert_eq!(Locality::city(City::Sopot).path(), "mieszkania-sopot/");
    }

    #[test]
    fn blank_neighbourhood_is_city_level() {
        let locality = Locality::new(City::Gdansk, "  ");
        assert_eq!(locality.neighbourhood, None);
        assert_eq!(locality.to_string(), "gdansk");
    }

    #[test]
    fn city_keys_round_trip() {
        for city in [City::Gdynia, City::Gdansk, City::Sopot] {
            assert_eq!(City::from_key(city.key()), Some(city));
        }
        assert_eq!(City::from_key("Gdańsk"), Some(City::Gdansk));
        assert_eq!(City::from_key("warszawa"), None);
    }
}
