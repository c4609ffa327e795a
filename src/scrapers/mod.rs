use async_trait::async_trait;
use reqwest::Client;

use crate::error::ExtractError;
use crate::models::{Locality, PriceRecord};

mod investkomfort;

pub use investkomfort::InvestKomfortExtractor;

#[async_trait]
pub trait PriceExtractor: Send + Sync {
    /// Fetch and parse the listing page of one locality.
    async fn extract(
        &self,
        client: &Client,
        locality: &Locality,
    ) -> Result<Vec<PriceRecord>, ExtractError>;

    fn name(&self) -> &str;
}
