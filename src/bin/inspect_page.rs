//! Fetch one listing page, save it for use as a test fixture and report which
//! pricing selectors match.
//!
//! `inspect_page gdynia portova` writes `gdynia_portova.html`.

use anyhow::{bail, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use std::fs;

const BASE_URL: &str = "https://www.investkomfort.pl";

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(city) = args.next() else {
        bail!("usage: inspect_page <city> [neighbourhood]");
    };
    let neighbourhood = args.next();

    let (url, file_name) = match &neighbourhood {
        Some(n) => (
            format!("{}/mieszkania-{}/{}/", BASE_URL, city, n),
            format!("{}_{}.html", city, n),
        ),
        None => (
            format!("{}/mieszkania-{}/", BASE_URL, city),
            format!("{}.html", city),
        ),
    };

    let client = Client::builder()
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36")
        .build()?;

    println!("Fetching {}...", url);
    let response = client.get(&url).send().await?;
    println!("HTTP {}", response.status());
    let html = response.text().await?;
    fs::write(&file_name, &html)?;
    println!("Saved {} bytes to {}", html.len(), file_name);

    let document = Html::parse_document(&html);

    let selectors = vec![
        ".pricing",
        ".pricing td",
        ".pricing td span",
        "table",
        "table th",
        "table tr",
        "[class*=price]",
        "[class*=cena]",
    ];

    for selector_str in selectors {
        if let Ok(selector) = Selector::parse(selector_str) {
            let count = document.select(&selector).count();
            if count > 0 {
                println!("Selector '{}' matched {} elements", selector_str, count);
            }
        }
    }

    Ok(())
}
