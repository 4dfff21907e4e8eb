use std::time::Duration;

use crate::models::Listing;
use crate::utils::error::Result;

use super::{
    attribute, clean_price, inner_text, parse_document, parse_selector, Extraction, SiteStrategy,
    MAX_LISTINGS,
};

const BASE_URL: &str = "https://www.amazon.in";

/// Amazon search results. Amazon ships no preloaded state blob on its
/// search pages, so the markup tier is the primary path here.
pub struct Amazon {
    url_template: String,
    timeout: Duration,
}

impl Amazon {
    pub fn new(url_template: String, timeout: Duration) -> Self {
        Self {
            url_template,
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl SiteStrategy for Amazon {
    fn name(&self) -> &str {
        "Amazon"
    }

    fn url_template(&self) -> &str {
        &self.url_template
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn wait_selector(&self) -> Option<&str> {
        Some("div.s-main-slot")
    }

    fn structured(&self, _html: &str) -> Result<Extraction> {
        Ok(Extraction::NoResult)
    }

    fn markup(&self, html: &str) -> Result<Extraction> {
        let document = parse_document(html);
        let card = parse_selector("div.s-main-slot div[data-component-type='s-search-result']")?;
        let title = parse_selector("h2 a span")?;
        let price = parse_selector(".a-price-whole")?;
        let link = parse_selector("h2 a")?;

        let mut listings = Vec::new();
        for element in document.select(&card).take(MAX_LISTINGS) {
            let Some(title_text) = inner_text(element, &title) else {
                continue;
            };
            let price_text = clean_price(inner_text(element, &price));
            let url = attribute(element, &link, "href").map(|u| {
                if u.starts_with('/') {
                    format!("{}{}", BASE_URL, u)
                } else {
                    u
                }
            });
            listings.push(Listing::new(title_text, price_text, url));
        }

        if listings.is_empty() {
            Ok(Extraction::NoResult)
        } else {
            Ok(Extraction::MarkupHit(listings))
        }
    }
}
