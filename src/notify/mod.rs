use async_trait::async_trait;

use crate::config::NotificationsConfig;
use crate::utils::error::{AppError, Result};

pub mod sendgrid;
pub mod smtp;

pub use sendgrid::SendGridNotifier;
pub use smtp::SmtpNotifier;

/// Delivery receipt from a notification channel.
#[derive(Debug, Clone, Default)]
pub struct NotifyReceipt {
    pub status_code: Option<u16>,
    pub message_id: Option<String>,
}

/// The notification capability the campaign runner hands the finished
/// report to. Credentials are channel-specific and opaque to the core.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    async fn send(&self, subject: &str, body: &str) -> Result<NotifyReceipt>;
}

/// Select the configured channel.
pub fn build_notifier(config: &NotificationsConfig) -> Result<Box<dyn Notifier>> {
    match config.channel.as_str() {
        "sendgrid" => Ok(Box::new(SendGridNotifier::from_config(&config.sendgrid)?)),
        "smtp" => Ok(Box::new(SmtpNotifier::from_config(&config.smtp)?)),
        other => Err(AppError::Notification(format!(
            "unknown notification channel '{}'",
            other
        ))),
    }
}
