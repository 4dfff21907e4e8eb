use std::time::Duration;

use crate::models::Listing;
use crate::utils::error::{AppError, Result};

use super::{
    clean_price, inner_text, parse_document, parse_selector, rupee_price, Extraction,
    SiteStrategy, MAX_LISTINGS,
};

const BASE_URL: &str = "https://www.myntra.com";

/// Myntra search results. The `__NEXT_DATA__` script payload is the
/// primary source; visible product cards are the fallback.
pub struct Myntra {
    url_template: String,
    timeout: Duration,
}

impl Myntra {
    pub fn new(url_template: String, timeout: Duration) -> Self {
        Self {
            url_template,
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl SiteStrategy for Myntra {
    fn name(&self) -> &str {
        "Myntra"
    }

    fn url_template(&self) -> &str {
        &self.url_template
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    // Myntra search paths are slug-style: lowercase, dash-joined.
    fn encode_query(&self, term: &str) -> String {
        term.to_lowercase().replace(' ', "-")
    }

    fn structured(&self, html: &str) -> Result<Extraction> {
        let document = parse_document(html);
        let script = parse_selector(r#"script[id="__NEXT_DATA__"]"#)?;

        let Some(payload) = document
            .select(&script)
            .next()
            .map(|el| el.text().collect::<String>())
        else {
            return Ok(Extraction::NoResult);
        };

        let data: serde_json::Value = serde_json::from_str(&payload)?;
        let products = data["props"]["pageProps"]["searchResults"]["products"]
            .as_array()
            .ok_or_else(|| {
                AppError::Extraction("missing searchResults.products path".to_string())
            })?;

        let listings = products
            .iter()
            .take(MAX_LISTINGS)
            .map(|p| {
                let title = p["productName"].as_str().unwrap_or("No title").to_string();
                // Discounted price when present, MRP otherwise.
                let price_value = if p["price"]["discounted"].is_null() {
                    &p["price"]["mrp"]
                } else {
                    &p["price"]["discounted"]
                };
                let price = rupee_price(price_value);
                let url = p["landingPageUrl"]
                    .as_str()
                    .map(|u| format!("{}/{}", BASE_URL, u.trim_start_matches('/')));
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
        let card = parse_selector("li.product-base")?;
        let brand = parse_selector(".product-brand")?;
        let name = parse_selector(".product-product")?;
        let price = parse_selector(".product-price")?;

        let mut listings = Vec::new();
        for element in document.select(&card).take(MAX_LISTINGS) {
            // Brand and name are both required; a card missing either is skipped.
            let (Some(brand_text), Some(name_text)) =
                (inner_text(element, &brand), inner_text(element, &name))
            else {
                continue;
            };
            let price_text = clean_price(inner_text(element, &price));
            listings.push(Listing::new(
                format!("{} {}", brand_text, name_text),
                price_text,
                None,
            ));
        }

        if listings.is_empty() {
            Ok(Extraction::NoResult)
        } else {
            Ok(Extraction::MarkupHit(listings))
        }
    }
}
