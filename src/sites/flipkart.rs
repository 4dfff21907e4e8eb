use std::time::Duration;

use crate::models::Listing;
use crate::utils::error::{AppError, Result};

use super::{
    attribute, clean_price, inner_text, parse_document, parse_selector, rupee_price, state_blob,
    Extraction, SiteStrategy, MAX_LISTINGS,
};

const STATE_MARKER: &str = "window.__PRELOADED_STATE__ = ";
const BASE_URL: &str = "https://www.flipkart.com";

/// Flipkart search results. The preloaded state blob is the primary
/// source; search-result cards are the fallback.
pub struct Flipkart {
    url_template: String,
    timeout: Duration,
}

impl Flipkart {
    pub fn new(url_template: String, timeout: Duration) -> Self {
        Self {
            url_template,
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl SiteStrategy for Flipkart {
    fn name(&self) -> &str {
        "Flipkart"
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

        let products = data["product"]["products"]
            .as_array()
            .ok_or_else(|| AppError::Extraction("missing product.products path".to_string()))?;

        let listings = products
            .iter()
            .take(MAX_LISTINGS)
            .map(|p| {
                let title = p["title"].as_str().unwrap_or("No title").to_string();
                let price = rupee_price(&p["price"]["value"]);
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
        let card = parse_selector("div._1AtVbE")?;
        let title = parse_selector("div._4rR01T")?;
        let price = parse_selector("div._30jeq3")?;
        let link = parse_selector("a._1fQZEK")?;

        let mut listings = Vec::new();
        for element in document.select(&card).take(MAX_LISTINGS) {
            // Cards without a title are filters/banners, not products.
            let Some(title_text) = inner_text(element, &title) else {
                continue;
            };
            let price_text = clean_price(inner_text(element, &price));
            let url = attribute(element, &link, "href").map(|u| format!("{}{}", BASE_URL, u));
            listings.push(Listing::new(title_text, price_text, url));
        }

        if listings.is_empty() {
            Ok(Extraction::NoResult)
        } else {
            Ok(Extraction::MarkupHit(listings))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy() -> Flipkart {
        Flipkart::new(
            "https://www.flipkart.com/search?q={query}".to_string(),
            Duration::from_secs(1),
        )
    }

    fn structured_page(products: &str) -> String {
        format!(
            r#"<html><body><script>window.__PRELOADED_STATE__ = {{"product": {{"products": {products}}}}};</script></body></html>"#
        )
    }

    #[test]
    fn test_structured_hit() {
        let html = structured_page(
            r#"[
                {"title": "ASICS Novablast 4", "price": {"value": 9999}, "url": "/asics-novablast-4/p/a"},
                {"title": "ASICS Novablast 3", "price": {"value": 7499}, "url": "/asics-novablast-3/p/b"}
            ]"#,
        );
        let extraction = strategy().structured(&html).unwrap();
        let Extraction::StructuredHit(listings) = extraction else {
            panic!("expected structured hit");
        };
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].title, "ASICS Novablast 4");
        assert_eq!(listings[0].price, "₹9999");
        assert_eq!(
            listings[0].url.as_deref(),
            Some("https://www.flipkart.com/asics-novablast-4/p/a")
        );
    }

    #[test]
    fn test_structured_caps_at_ten() {
        let records: Vec<String> = (0..15)
            .map(|i| format!(r#"{{"title": "Shoe {i}", "price": {{"value": {i}}}, "url": "/p/{i}"}}"#))
            .collect();
        let html = structured_page(&format!("[{}]", records.join(",")));
        let Extraction::StructuredHit(listings) = strategy().structured(&html).unwrap() else {
            panic!("expected structured hit");
        };
        assert_eq!(listings.len(), MAX_LISTINGS);
    }

    #[test]
    fn test_structured_missing_fields_use_sentinels() {
        let html = structured_page(r#"[{"name": "wrong-key"}]"#);
        let Extraction::StructuredHit(listings) = strategy().structured(&html).unwrap() else {
            panic!("expected structured hit");
        };
        assert_eq!(listings[0].title, "No title");
        assert_eq!(listings[0].price, "Price not found");
        assert_eq!(listings[0].url, None);
    }

    #[test]
    fn test_structured_renamed_path_errors_without_unwinding() {
        let html = r#"<script>window.__PRELOADED_STATE__ = {"catalog": {}};</script>"#;
        let result = strategy().structured(html);
        assert!(matches!(result, Err(AppError::Extraction(_))));
    }

    #[test]
    fn test_structured_absent_blob_is_no_result() {
        assert_eq!(
            strategy().structured("<html></html>").unwrap(),
            Extraction::NoResult
        );
    }

    #[test]
    fn test_markup_fallback_reads_cards() {
        let html = r#"<html><body>
            <div class="_1AtVbE">
                <div class="_4rR01T">Brooks Ghost 16</div>
                <div class="_30jeq3">₹12,499</div>
                <a class="_1fQZEK" href="/brooks-ghost-16/p/c"></a>
            </div>
            <div class="_1AtVbE"><span>sponsored banner</span></div>
            <div class="_1AtVbE">
                <div class="_4rR01T">Brooks Ghost 15</div>
            </div>
        </body></html>"#;
        let Extraction::MarkupHit(listings) = strategy().markup(html).unwrap() else {
            panic!("expected markup hit");
        };
        // The banner card is skipped; the price-less card gets the sentinel.
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].title, "Brooks Ghost 16");
        assert_eq!(listings[0].price, "₹12,499");
        assert_eq!(
            listings[0].url.as_deref(),
            Some("https://www.flipkart.com/brooks-ghost-16/p/c")
        );
        assert_eq!(listings[1].price, "Price not found");
        assert_eq!(listings[1].url, None);
    }

    #[test]
    fn test_markup_empty_page_is_no_result() {
        assert_eq!(
            strategy().markup("<html></html>").unwrap(),
            Extraction::NoResult
        );
    }
}
