use anyhow::anyhow;
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::Arc;
use std::time::Duration;

use crate::config::ScraperConfig;
use crate::utils::error::{AppError, Result};

/// The browser-automation capability the extraction layer depends on.
///
/// Implementations must tolerate being called sequentially from a single
/// campaign; no two extraction attempts may navigate the same instance
/// concurrently.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to `url` and wait for the page to settle.
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()>;

    /// Wait for a selector to appear. Errors with `ElementNotFound` when
    /// the timeout elapses.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Full rendered page markup.
    async fn content(&self) -> Result<String>;
}

/// `PageDriver` backed by a headless Chrome instance with a single tab.
///
/// The browser process is released when the driver is dropped, so the
/// campaign runner gets scoped acquisition/release for free.
pub struct ChromeDriver {
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeDriver {
    pub fn launch(config: &ScraperConfig) -> anyhow::Result<Self> {
        let mut launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false) // Often needed in containerized environments
            .args(vec![
                std::ffi::OsStr::new("--no-sandbox"),
                std::ffi::OsStr::new("--disable-dev-shm-usage"),
                std::ffi::OsStr::new("--disable-gpu"),
                std::ffi::OsStr::new("--disable-extensions"),
            ])
            .build()
            .map_err(|e| anyhow!("Failed to create launch options: {}", e))?;

        // Set Chrome path if provided
        if let Some(chrome_path) = &config.chrome_path {
            launch_options.path = Some(std::path::PathBuf::from(chrome_path));
        }

        let browser =
            Browser::new(launch_options).map_err(|e| anyhow!("Failed to launch browser: {}", e))?;

        let tab = browser
            .new_tab()
            .map_err(|e| anyhow!("Failed to create tab: {}", e))?;

        tab.set_user_agent(&config.user_agent, None, None)
            .map_err(|e| anyhow!("Failed to set user agent: {}", e))?;

        tab.set_default_timeout(Duration::from_secs(config.navigation_timeout_secs));

        Ok(Self {
            _browser: browser,
            tab,
        })
    }
}

#[async_trait]
impl PageDriver for ChromeDriver {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        self.tab.set_default_timeout(timeout);

        self.tab
            .navigate_to(url)
            .map_err(|e| AppError::Navigation(format!("navigation to {} failed: {}", url, e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| AppError::Navigation(format!("page load of {} failed: {}", url, e)))?;

        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map_err(|_| AppError::ElementNotFound {
                selector: selector.to_string(),
            })?;
        Ok(())
    }

    async fn content(&self) -> Result<String> {
        self.tab
            .get_content()
            .map_err(|e| AppError::Extraction(format!("failed to read page content: {}", e)))
    }
}
