use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use tracing::info;
use url::Url;

use crate::config::Config;
use crate::error::ExtractError;
use crate::models::{Locality, PriceRecord};
use crate::parsers::parse_listing;
use crate::scrapers::PriceExtractor;
use crate::utils::http::{fetch_with_retry, RetryPolicy};

pub struct InvestKomfortExtractor {
    base_url: String,
    retry: RetryPolicy,
}

impl InvestKomfortExtractor {
    pub fn new(base_url: &str, retry: RetryPolicy) -> Self {
        Self {
            base_url: base_url.to_string(),
            retry,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.site.base_url, RetryPolicy::from_config(&config.http))
    }

    /// `{base}/mieszkania-{city}/{neighbourhood}/`
    pub fn listing_url(&self, locality: &Locality) -> Result<Url, url::ParseError> {
        let mut base = Url::parse(&self.base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join(&locality.path())
    }
}

#[async_trait]
impl PriceExtractor for InvestKomfortExtractor {
    async fn extract(
        &self,
        client: &Client,
        locality: &Locality,
    ) -> Result<Vec<PriceRecord>, ExtractError> {
        let url = self.listing_url(locality)?;
        info!("Fetching {} ({})", locality, url);

        let html = fetch_with_retry(client, url.as_str(), self.retry).await?;
        let records = parse_listing(&html, url.as_str(), locality, Utc::now())?;

        info!("Found {} priced units for {}", records.len(), locality);
        Ok(records)
    }

    fn name(&self) -> &str {
        "Invest Komfort"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, ParseError};
    use crate::models::City;
    use crate::utils::http::build_client;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GDYNIA_PORTOVA: &str = include_str!("../../tests/fixtures/gdynia_portova.html");
    const NO_PRICING: &str = include_str!("../../tests/fixtures/no_pricing.html");

    fn extractor(base_url: &str) -> InvestKomfortExtractor {
        InvestKomfortExtractor::new(
            base_url,
            RetryPolicy {
                max_attempts: 2,
                backoff: Duration::from_millis(1),
            },
        )
    }

    fn client() -> Client {
        build_client("tricity-prices-test", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn builds_listing_urls() {
        let ex = extractor("https://www.investkomfort.pl");
        assert_eq!(
            ex.listing_url(&Locality::new(City::Gdansk, "nadmorski-dwor"))
                .unwrap()
                .as_str(),
            "https://www.investkomfort.pl/mieszkania-gdansk/nadmorski-dwor/"
        );

        let nested = extractor("http://127.0.0.1:8080/mirror");
        assert_eq!(
            nested.listing_url(&Locality::city(City::Sopot)).unwrap().as_str(),
            "http://127.0.0.1:8080/mirror/mieszkania-sopot/"
        );
    }

    #[tokio::test]
    async fn extracts_gdynia_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mieszkania-gdynia/portova/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(GDYNIA_PORTOVA))
            .expect(1)
            .mount(&server)
            .await;

        let locality = Locality::new(City::Gdynia, "portova");
        let records = extractor(&server.uri())
            .extract(&client(), &locality)
            .await
            .unwrap();

        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.locality() == locality));
        assert!(records.iter().all(|r| r.observed_at == records[0].observed_at));
    }

    #[tokio::test]
    async fn unknown_layout_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(NO_PRICING))
            .mount(&server)
            .await;

        let err = extractor(&server.uri())
            .extract(&client(), &Locality::city(City::Sopot))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Parse(ParseError::UnknownLayout { .. })));
    }

    #[tokio::test]
    async fn missing_page_is_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(2)
            .mount(&server)
            .await;

        let err = extractor(&server.uri())
            .extract(&client(), &Locality::new(City::Gdynia, "silva"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractError::Fetch(FetchError::Status { status: 404, attempts: 2, .. })
        ));
    }
}
