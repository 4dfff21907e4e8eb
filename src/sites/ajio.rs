use std::time::Duration;

use crate::models::Listing;
use crate::utils::error::{AppError, Result};

use super::{
    attribute, clean_price, inner_text, parse_document, parse_selector, rupee_price, state_blob,
    Extraction, SiteStrategy, MAX_LISTINGS,
};

const STATE_MARKER: &str = "window.__INITIAL_STATE__ = ";
const BASE_URL: &str = "https://www.ajio.com";

/// Ajio search results. The initial-state blob is the primary source;
/// product cards in the results rail are the fallback.
pub struct Ajio {
    url_template: String,
    timeout: Duration,
}

impl Ajio {
    pub fn new(url_template: String, timeout: Duration) -> Self {
        Self {
            url_template,
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl SiteStrategy for Ajio {
    fn name(&self) -> &str {
        "Ajio"
    }

    fn url_template(&self) -> &str {
        &self.url_template
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn structured(&self, html: &str) -> Result<Extraction> {
        let Some(blob) = state_blob(html, STATE_MARKER) else {
            return Ok(Extraction::NoResult);
        };
        let data: serde_json::Value = serde_json::from_str(blob)?;

        let products = data["search"]["products"]
            .as_array()
            .ok_or_else(|| AppError::Extraction("missing search.products path".to_string()))?;

        let listings = products
            .iter()
            .take(MAX_LISTINGS)
            .map(|p| {
                let brand = p["brand"].as_str().unwrap_or("");
                let name = p["name"].as_str().unwrap_or("");
                let title = format!("{} {}", brand, name).trim().to_string();
                let title = if title.is_empty() {
                    "No title".to_string()
                } else {
                    title
                };
                let price = rupee_price(&p["price"]["mrp"]);
                let url = p["url"].as_str().map(|u| format!("{}{}", BASE_URL, u));
                Listing::new(title, price, url)
            })
            .collect::<Vec<_>>();

        if listings.is_empty() {
            Ok(Extraction::NoResult)
        } else {
            Ok(Extraction::StructuredHit(listings))
        }
    }

    fn markup(&self, html: &str) -> Result<Extraction> {
        let document = parse_document(html);
        let card = parse_selector("div.item")?;
        let brand = parse_selector(".brand")?;
        let name = parse_selector(".nameCls")?;
        let price = parse_selector(".price")?;
        let link = parse_selector("a[href]")?;

        let mut listings = Vec::new();
        for element in document.select(&card).take(MAX_LISTINGS) {
            let Some(name_text) = inner_text(element, &name) else {
                continue;
            };
            let title = match inner_text(element, &brand) {
                Some(brand_text) => format!("{} {}", brand_text, name_text),
                None => name_text,
            };
            let price_text = clean_price(inner_text(element, &price));
            let url = attribute(element, &link, "href").map(|u| {
                if u.starts_with('/') {
                    format!("{}{}", BASE_URL, u)
                } else {
                    u
                }
            });
            listings.push(Listing::new(title, price_text, url));
        }

        if listings.is_empty() {
            Ok(Extraction::NoResult)
        } else {
            Ok(Extraction::MarkupHit(listings))
        }
    }
}
