use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Navigation error: {0}")]
    Navigation(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Site {site} exhausted: failed after {attempts} retries: {reason}")]
    SiteExhausted {
        site: String,
        attempts: u32,
        reason: String,
    },

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Element not found: {selector}")]
    ElementNotFound { selector: String },
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
