use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use super::{Query, SiteResult};

/// Per-query outcomes, one entry per configured site.
///
/// Entries are stored in insertion order, which the orchestrator keeps
/// equal to the configured site order regardless of completion timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryReport {
    pub query: Query,
    results: Vec<(String, SiteResult)>,
}

impl QueryReport {
    pub fn new(query: Query) -> Self {
        Self {
            query,
            results: Vec::new(),
        }
    }

    /// Record the outcome for one site. Keys are unique; recording the
    /// same site twice replaces the earlier outcome.
    pub fn record(&mut self, site: impl Into<String>, result: SiteResult) {
        let site = site.into();
        if let Some(entry) = self.results.iter_mut().find(|(name, _)| *name == site) {
            entry.1 = result;
        } else {
            self.results.push((site, result));
        }
    }

    pub fn results(&self) -> &[(String, SiteResult)] {
        &self.results
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== {} ===", self.query);
        for (site, result) in &self.results {
            match result {
                SiteResult::Ok(listings) => {
                    let _ = writeln!(out, "{}:", site);
                    for listing in listings {
                        let _ = writeln!(out, "{}", listing.render_line());
                    }
                }
                SiteResult::Failed { reason, .. } => {
                    let _ = writeln!(out, "{}: FAILED - {}", site, reason);
                }
            }
        }
        out
    }
}

/// All query reports of one campaign run, in catalog iteration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampaignReport {
    reports: Vec<QueryReport>,
}

impl CampaignReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, report: QueryReport) {
        self.reports.push(report);
    }

    pub fn reports(&self) -> &[QueryReport] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Plain-text body for the notification channel. Byte-identical for
    /// identical reports, so run-to-run diffs stay meaningful.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for report in &self.reports {
            out.push_str(&report.render());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Listing;

    fn sample_report() -> CampaignReport {
        let mut query_report = QueryReport::new(Query::new(
            "Saucony Kinvara",
            Some("UK 8.5".to_string()),
        ));
        query_report.record(
            "Flipkart",
            SiteResult::Ok(vec![
                Listing::new("Saucony Kinvara 15", "₹11,999", Some("https://www.flipkart.com/p/1".to_string())),
                Listing::new("Saucony Kinvara 14", "₹8,499", None),
            ]),
        );
        query_report.record(
            "Myntra",
            SiteResult::Failed {
                site: "Myntra".to_string(),
                reason: "failed after 3 retries: navigation timed out".to_string(),
            },
        );

        let mut campaign = CampaignReport::new();
        campaign.push(query_report);
        campaign
    }

    #[test]
    fn test_render_contains_query_header_and_sites() {
        let rendered = sample_report().render();
        assert!(rendered.contains("=== Saucony Kinvara UK 8.5 ==="));
        assert!(rendered.contains("Flipkart:"));
        assert!(rendered.contains("Saucony Kinvara 15 - ₹11,999 - https://www.flipkart.com/p/1"));
        assert!(rendered.contains("Saucony Kinvara 14 - ₹8,499"));
        assert!(rendered.contains("Myntra: FAILED - failed after 3 retries"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let report = sample_report();
        assert_eq!(report.render(), report.render());
    }

    #[test]
    fn test_record_replaces_existing_site() {
        let mut report = QueryReport::new(Query::new("Hoka Arahi", None));
        report.record("Ajio", SiteResult::Ok(vec![]));
        report.record(
            "Ajio",
            SiteResult::Failed {
                site: "Ajio".to_string(),
                reason: "boom".to_string(),
            },
        );
        assert_eq!(report.results().len(), 1);
        assert!(!report.results()[0].1.is_ok());
    }

    #[test]
    fn test_site_order_is_insertion_order() {
        let mut report = QueryReport::new(Query::new("Hoka Skyflow", None));
        for site in ["Flipkart", "Myntra", "Ajio", "Amazon"] {
            report.record(site, SiteResult::Ok(vec![]));
        }
        let names: Vec<&str> = report.results().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Flipkart", "Myntra", "Ajio", "Amazon"]);
    }
}
