use serde::{Deserialize, Serialize};

pub mod report;

// Re-exports for convenience
pub use report::*;

/// One catalog entry submitted to every configured site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Query {
    pub product: String,
    pub size: Option<String>,
}

impl Query {
    pub fn new(product: impl Into<String>, size: Option<String>) -> Self {
        Self {
            product: product.into(),
            size,
        }
    }

    /// The term handed to a site's search URL, e.g. "Brooks Ghost UK 8".
    pub fn search_term(&self) -> String {
        match &self.size {
            Some(size) => format!("{} {}", self.product, size),
            None => self.product.clone(),
        }
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.search_term())
    }
}

/// One normalized product record extracted from a site.
///
/// `price` is free-form text; currency and format vary by site, and
/// partial extraction failures are represented as sentinel text rather
/// than aborting the listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Listing {
    pub title: String,
    pub price: String,
    pub url: Option<String>,
}

impl Listing {
    pub fn new(title: impl Into<String>, price: impl Into<String>, url: Option<String>) -> Self {
        Self {
            title: title.into(),
            price: price.into(),
            url,
        }
    }

    /// Synthetic entry emitted when both extraction tiers come back empty,
    /// so callers never conflate "zero products" with "extraction broke".
    pub fn diagnostic() -> Self {
        Self {
            title: "no results found (possibly blocked or empty)".to_string(),
            price: "n/a".to_string(),
            url: None,
        }
    }

    pub fn is_diagnostic(&self) -> bool {
        self.title == "no results found (possibly blocked or empty)"
    }

    /// Report line: `title - price - url`, url omitted when absent.
    pub fn render_line(&self) -> String {
        match &self.url {
            Some(url) => format!("{} - {} - {}", self.title, self.price, url),
            None => format!("{} - {}", self.title, self.price),
        }
    }
}

/// Outcome of one site within one query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum SiteResult {
    Ok(Vec<Listing>),
    Failed { site: String, reason: String },
}

impl SiteResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, SiteResult::Ok(_))
    }
}
