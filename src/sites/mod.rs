use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::debug;

use crate::config::SiteConfig;
use crate::driver::PageDriver;
use crate::models::{Listing, Query};
use crate::utils::error::{AppError, Result};

pub mod ajio;
pub mod amazon;
pub mod flipkart;
pub mod myntra;

pub use ajio::Ajio;
pub use amazon::Amazon;
pub use flipkart::Flipkart;
pub use myntra::Myntra;

/// Cap per site, bounding email size and downstream work.
pub const MAX_LISTINGS: usize = 10;

/// Outcome of a single extraction tier. The caller decides tier order;
/// tiers never unwind exceptions across each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    StructuredHit(Vec<Listing>),
    MarkupHit(Vec<Listing>),
    NoResult,
}

/// Site-specific extraction logic: structured state blob first, rendered
/// markup as fallback.
#[async_trait]
pub trait SiteStrategy: Send + Sync {
    /// Display name used as the report key.
    fn name(&self) -> &str;

    fn url_template(&self) -> &str;

    fn timeout(&self) -> Duration;

    /// Per-site query-string encoding. Most sites join terms with `+`.
    fn encode_query(&self, term: &str) -> String {
        term.replace(' ', "+")
    }

    fn search_url(&self, query: &Query) -> String {
        self.url_template()
            .replace("{query}", &self.encode_query(&query.search_term()))
    }

    /// Selector worth waiting for before reading page content, if any.
    /// A missing selector is never fatal; the tiers decide from content.
    fn wait_selector(&self) -> Option<&str> {
        None
    }

    /// Tier 1: read the embedded structured payload and walk the
    /// site-specific field path. Brittle by design; missing or renamed
    /// fields error here and never past the strategy.
    fn structured(&self, html: &str) -> Result<Extraction>;

    /// Tier 2: read visible fields from the rendered markup, capped at
    /// `MAX_LISTINGS`. A single broken element is skipped, not fatal.
    fn markup(&self, html: &str) -> Result<Extraction>;

    /// Navigate, then run the tiers in order. Navigation and driver
    /// failures propagate (the retry wrapper owns those); tier failures
    /// degrade to the fallback tier and finally to a diagnostic listing.
    async fn extract(&self, driver: &dyn PageDriver, query: &Query) -> Result<Vec<Listing>> {
        let url = self.search_url(query);
        debug!(site = self.name(), %url, "visiting search page");
        driver.navigate(&url, self.timeout()).await?;

        if let Some(selector) = self.wait_selector() {
            if let Err(e) = driver.wait_for(selector, self.timeout()).await {
                debug!(site = self.name(), %e, "wait selector never appeared");
            }
        }

        let html = driver.content().await?;

        match self.structured(&html) {
            Ok(Extraction::StructuredHit(listings)) if !listings.is_empty() => {
                return Ok(listings);
            }
            Ok(_) => debug!(site = self.name(), "structured tier empty, trying markup"),
            Err(e) => debug!(site = self.name(), %e, "structured tier failed, trying markup"),
        }

        match self.markup(&html) {
            Ok(Extraction::MarkupHit(listings)) if !listings.is_empty() => Ok(listings),
            Ok(_) => Ok(vec![Listing::diagnostic()]),
            Err(e) => {
                debug!(site = self.name(), %e, "markup tier failed");
                Ok(vec![Listing::diagnostic()])
            }
        }
    }
}

/// Build the closed set of strategies named by the configuration, in
/// configured order. Unknown keys are a configuration error, not a
/// runtime URL inspection.
pub fn build_strategies(
    sites: &[SiteConfig],
    timeout: Duration,
) -> Result<Vec<Box<dyn SiteStrategy>>> {
    let mut strategies: Vec<Box<dyn SiteStrategy>> = Vec::with_capacity(sites.len());
    for site in sites {
        let strategy: Box<dyn SiteStrategy> = match site.name.to_lowercase().as_str() {
            "flipkart" => Box::new(Flipkart::new(site.url_template.clone(), timeout)),
            "myntra" => Box::new(Myntra::new(site.url_template.clone(), timeout)),
            "ajio" => Box::new(Ajio::new(site.url_template.clone(), timeout)),
            "amazon" => Box::new(Amazon::new(site.url_template.clone(), timeout)),
            other => {
                return Err(AppError::Config(config::ConfigError::Message(format!(
                    "No extraction strategy registered for site '{}'",
                    other
                ))));
            }
        };
        strategies.push(strategy);
    }
    Ok(strategies)
}

/// Slice the embedded state blob out of the page markup: everything from
/// the marker through the closing brace of the first `};`.
pub(crate) fn state_blob<'a>(html: &'a str, marker: &str) -> Option<&'a str> {
    let start = html.find(marker)? + marker.len();
    let end = html[start..].find("};")? + start;
    Some(&html[start..=end])
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| AppError::Extraction(format!("invalid selector '{}': {:?}", selector, e)))
}

/// Joined inner text of the first match under `element`, if any.
pub(crate) fn inner_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let text = element
        .select(selector)
        .next()?
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();
    if text.is_empty() { None } else { Some(text) }
}

/// First matching attribute value under `element`.
pub(crate) fn attribute(element: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    element
        .select(selector)
        .next()?
        .value()
        .attr(attr)
        .map(|v| v.to_string())
}

/// Free-form price text, with a sentinel when nothing price-like was read.
pub(crate) fn clean_price(text: Option<String>) -> String {
    let digit = regex::Regex::new(r"\d").unwrap();
    match text {
        Some(t) if digit.is_match(&t) => t.trim().to_string(),
        _ => "Price not found".to_string(),
    }
}

/// Structured-tier price from a JSON value that may be a number or a
/// string; absent values become the sentinel instead of aborting.
pub(crate) fn rupee_price(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Number(n) => format!("₹{}", n),
        serde_json::Value::String(s) if !s.is_empty() => format!("₹{}", s),
        _ => "Price not found".to_string(),
    }
}

pub(crate) fn parse_document(html: &str) -> Html {
    Html::parse_document(html)
}
