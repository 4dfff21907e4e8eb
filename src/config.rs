use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use url::Url;

use crate::models::Query;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub sites: Vec<SiteConfig>,
    pub scraper: ScraperConfig,
    pub notifications: NotificationsConfig,
}

/// Ordered product names and optional sizes; queries are iterated
/// product-major, size-minor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub products: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
}

impl CatalogConfig {
    pub fn queries(&self) -> Vec<Query> {
        if self.sizes.is_empty() {
            return self
                .products
                .iter()
                .map(|p| Query::new(p.clone(), None))
                .collect();
        }
        let mut queries = Vec::with_capacity(self.products.len() * self.sizes.len());
        for product in &self.products {
            for size in &self.sizes {
                queries.push(Query::new(product.clone(), Some(size.clone())));
            }
        }
        queries
    }
}

/// One retail site: a registry key (strategy selection) and a search URL
/// template with a `{query}` placeholder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    pub url_template: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    pub navigation_timeout_secs: u64,
    pub user_agent: String,
    pub chrome_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Which channel carries the report: "sendgrid" or "smtp".
    pub channel: String,
    pub subject_prefix: String,
    pub sendgrid: SendGridConfig,
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendGridConfig {
    pub api_key: Option<String>,
    pub from_email: Option<String>,
    pub to_email: Option<String>,
    #[serde(default = "default_sendgrid_base")]
    pub api_base: String,
}

fn default_sendgrid_base() -> String {
    "https://api.sendgrid.com".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_address: Option<String>,
    pub from_name: String,
    pub to_address: Option<String>,
    pub use_tls: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Add environment-specific config
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add local config (ignored by git)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix "SOLEWATCH_"
            .add_source(Environment::with_prefix("SOLEWATCH").separator("__"))
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;

        // Secrets fall back to the plain env vars the original deployment used
        if config.notifications.sendgrid.api_key.is_none() {
            config.notifications.sendgrid.api_key = env::var("SENDGRID_API_KEY").ok();
        }
        if config.notifications.sendgrid.from_email.is_none() {
            config.notifications.sendgrid.from_email = env::var("EMAIL_FROM").ok();
        }
        if config.notifications.sendgrid.to_email.is_none() {
            config.notifications.sendgrid.to_email = env::var("EMAIL_TO").ok();
        }
        if config.scraper.chrome_path.is_none() {
            config.scraper.chrome_path = env::var("CHROME_PATH").ok();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.products.is_empty() {
            return Err(ConfigError::Message(
                "Catalog must list at least one product".into(),
            ));
        }

        if self.sites.is_empty() {
            return Err(ConfigError::Message(
                "At least one site must be configured".into(),
            ));
        }

        for site in &self.sites {
            if !site.url_template.contains("{query}") {
                return Err(ConfigError::Message(format!(
                    "Site '{}' URL template is missing the {{query}} placeholder",
                    site.name
                )));
            }
            let probe = site.url_template.replace("{query}", "probe");
            if Url::parse(&probe).is_err() {
                return Err(ConfigError::Message(format!(
                    "Site '{}' URL template is not a valid URL",
                    site.name
                )));
            }
        }

        let mut names: Vec<&str> = self.sites.iter().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        if names.len() != self.sites.len() {
            return Err(ConfigError::Message(
                "Site names must be unique".into(),
            ));
        }

        if self.scraper.retry_attempts == 0 {
            return Err(ConfigError::Message(
                "Scraper retry_attempts must be greater than 0".into(),
            ));
        }

        if self.scraper.navigation_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "Scraper navigation_timeout_secs must be greater than 0".into(),
            ));
        }

        match self.notifications.channel.as_str() {
            "sendgrid" | "smtp" => {}
            other => {
                return Err(ConfigError::Message(format!(
                    "Unknown notification channel '{}'",
                    other
                )));
            }
        }

        if self.notifications.smtp.port == 0 {
            return Err(ConfigError::Message(
                "SMTP port must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}
