pub mod listing;
pub mod price;
pub mod row;

pub use listing::*;
pub use price::*;
pub use row::*;

use html_escape::decode_html_entities;
use scraper::Selector;

use crate::error::ParseError;

/// Clean and normalize text by removing extra whitespace and decoding HTML entities
pub fn clean_text(text: &str) -> String {
    let decoded = decode_html_entities(text);
    decoded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

pub(crate) fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|_| ParseError::Selector(css.to_string()))
}
