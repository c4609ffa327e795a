use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;
use crate::models::{City, Locality};

const DEFAULT_CONFIG_FILE: &str = "prices.toml";
const ENV_PREFIX: &str = "PRICES";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default = "default_cities")]
    pub cities: Vec<CityConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Total attempts per page, including the first.
    pub max_attempts: u32,
    pub backoff_ms: u64,
    /// Pause between two localities.
    pub request_delay_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub csv_path: String,
    pub sqlite_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityConfig {
    pub city: City,
    #[serde(default)]
    pub neighbourhoods: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.investkomfort.pl".to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36".to_string(),
            timeout_secs: 25,
            max_attempts: 3,
            backoff_ms: 500,
            request_delay_ms: 1000,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Csv,
            csv_path: "prices.csv".to_string(),
            sqlite_path: "prices.db".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            http: HttpConfig::default(),
            output: OutputConfig::default(),
            cities: default_cities(),
        }
    }
}

/// The developments tracked out of the box.
fn default_cities() -> Vec<CityConfig> {
    let city = |city, neighbourhoods: &[&str]| CityConfig {
        city,
        neighbourhoods: neighbourhoods.iter().map(|n| n.to_string()).collect(),
    };

    vec![
        city(
            City::Gdynia,
            &["portova", "silva", "nowe-orlowo", "nowe-kolibki"],
        ),
        city(City::Sopot, &["okrzei"]),
        city(City::Gdansk, &["botanica", "nadmorski-dwor", "gdanska"]),
    ]
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl Config {
    /// Defaults, then `prices.toml` (or `$PRICES_CONFIG`) if present, then
    /// `PRICES_*` environment variables with `__` between nested keys.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var("PRICES_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let settings = config::Config::builder()
            .add_source(config::File::with_name(&path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.max_attempts == 0 {
            return Err(ConfigError::InvalidRetry);
        }
        url::Url::parse(&self.site.base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: self.site.base_url.clone(),
            source,
        })?;
        if self.localities().is_empty() {
            return Err(ConfigError::NoLocalities);
        }
        Ok(())
    }

    /// Expands the city table into the ordered locality list for a run.
    /// A city with no neighbourhoods contributes its city-level page.
    pub fn localities(&self) -> Vec<Locality> {
        let mut localities = Vec::new();

        for entry in &self.cities {
            if entry.neighbourhoods.is_empty() {
                localities.push(Locality::city(entry.city));
                continue;
            }

            localities.extend(
                entry
                    .neighbourhoods
                    .iter()
                    .filter(|n| !n.trim().is_empty())
                    .map(|n| Locality::new(entry.city, n)),
            );
        }

        localities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_localities_cover_the_three_cities() {
        let localities = Config::default().localities();
        assert_eq!(localities.len(), 8);
        assert_eq!(localities[0], Locality::new(City::Gdynia, "portova"));
        assert!(localities.iter().any(|l| l.city == City::Sopot));
        assert!(localities.iter().any(|l| l.city == City::Gdansk));
    }

    #[test]
    fn blank_neighbourhoods_are_skipped() {
        let config = Config {
            cities: vec![CityConfig {
                city: City::Gdynia,
                neighbourhoods: vec!["silva".into(), "".into(), "  ".into()],
            }],
            ..Config::default()
        };
        assert_eq!(config.localities(), vec![Locality::new(City::Gdynia, "silva")]);
    }

    #[test]
    fn empty_locality_list_is_rejected() {
        let config = Config {
            cities: Vec::new(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoLocalities)));
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let mut config = Config::default();
        config.http.max_attempts = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRetry)));
    }

    #[test]
    fn malformed_base_url_is_rejected() {
        let mut config = Config::default();
        config.site.base_url = "investkomfort.pl/ceny".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));

        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn toml_overrides_merge_with_defaults() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [http]
                max_attempts = 5

                [output]
                format = "sqlite"

                [[cities]]
                city = "sopot"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();

        let config: Config = settings.try_deserialize().unwrap();
        assert_eq!(config.http.max_attempts, 5);
        assert_eq!(config.http.timeout_secs, 25);
        assert_eq!(config.output.format, OutputFormat::Sqlite);
        assert_eq!(config.output.csv_path, "prices.csv");
        assert_eq!(config.localities(), vec![Locality::city(City::Sopot)]);
    }
}
