use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::driver::PageDriver;
use crate::models::{CampaignReport, Query, QueryReport};
use crate::notify::Notifier;
use crate::retry::{with_retry, RetryPolicy};
use crate::sites::{build_strategies, SiteStrategy};
use crate::utils::error::Result;

/// Drives one full run over the catalog: every query against every
/// configured site, folded into a single report, then one notification.
pub struct CampaignRunner {
    queries: Vec<Query>,
    strategies: Vec<Box<dyn SiteStrategy>>,
    retry: RetryPolicy,
    subject_prefix: String,
}

impl CampaignRunner {
    pub fn new(
        queries: Vec<Query>,
        strategies: Vec<Box<dyn SiteStrategy>>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            queries,
            strategies,
            retry,
            subject_prefix: "Daily Shoe Prices".to_string(),
        }
    }

    pub fn with_subject_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.subject_prefix = prefix.into();
        self
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.scraper.navigation_timeout_secs);
        let strategies = build_strategies(&config.sites, timeout)?;
        let retry = RetryPolicy::new(
            config.scraper.retry_attempts,
            Duration::from_millis(config.scraper.retry_delay_ms),
        );
        Ok(
            Self::new(config.catalog.queries(), strategies, retry)
                .with_subject_prefix(config.notifications.subject_prefix.clone()),
        )
    }

    /// Run every configured site for one query, sequentially on the shared
    /// driver. One site's failure never blocks the next; every site ends up
    /// with exactly one outcome, in configured order.
    pub async fn run_query(&self, driver: &dyn PageDriver, query: &Query) -> QueryReport {
        let mut report = QueryReport::new(query.clone());
        for strategy in &self.strategies {
            info!(site = strategy.name(), query = %query, "scraping site");
            let result = with_retry(self.retry, strategy.name(), || {
                strategy.extract(driver, query)
            })
            .await;
            report.record(strategy.name(), result);
        }
        report
    }

    /// Run the whole catalog in order. When a deadline is given, remaining
    /// queries are abandoned once it passes; already completed query
    /// reports are kept and returned.
    pub async fn run(&self, driver: &dyn PageDriver, deadline: Option<Instant>) -> CampaignReport {
        let mut campaign = CampaignReport::new();
        for query in &self.queries {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    info!(
                        completed = campaign.len(),
                        remaining = self.queries.len() - campaign.len(),
                        "deadline reached, finalizing campaign early"
                    );
                    break;
                }
            }
            campaign.push(self.run_query(driver, query).await);
        }
        campaign
    }

    /// Run the campaign and hand the rendered report to the notifier once.
    /// A dispatch failure is logged, not propagated: the scrape is complete
    /// the moment the report is built.
    pub async fn run_and_notify(
        &self,
        driver: &dyn PageDriver,
        notifier: &dyn Notifier,
        deadline: Option<Instant>,
    ) -> CampaignReport {
        let report = self.run(driver, deadline).await;

        let subject = format!(
            "{} - {}",
            self.subject_prefix,
            chrono::Utc::now().format("%Y-%m-%d")
        );
        match notifier.send(&subject, &report.render()).await {
            Ok(receipt) => info!(
                channel = notifier.name(),
                status = receipt.status_code,
                "report dispatched"
            ),
            Err(e) => error!(
                channel = notifier.name(),
                error = %e,
                "report dispatch failed; scrape results are unaffected"
            ),
        }

        report
    }
}
