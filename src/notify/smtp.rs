use async_trait::async_trait;
use lettre::message::header;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::info;

use crate::config::SmtpConfig;
use crate::utils::error::{AppError, Result};

use super::{Notifier, NotifyReceipt};

/// Sends the report as a plain-text email over SMTP.
pub struct SmtpNotifier {
    config: SmtpConfig,
    from_address: String,
    to_address: String,
}

impl SmtpNotifier {
    pub fn from_config(config: &SmtpConfig) -> Result<Self> {
        let from_address = config
            .from_address
            .clone()
            .ok_or_else(|| AppError::Notification("SMTP from address is not set".to_string()))?;
        let to_address = config
            .to_address
            .clone()
            .ok_or_else(|| AppError::Notification("SMTP to address is not set".to_string()))?;
        Ok(Self {
            config: config.clone(),
            from_address,
            to_address,
        })
    }

    fn build_transport(&self) -> Result<SmtpTransport> {
        let builder = if self.config.use_tls {
            SmtpTransport::relay(&self.config.host)
                .map_err(|e| AppError::Notification(format!("SMTP relay setup failed: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.host)
        };

        let builder = builder.port(self.config.port);
        let builder = match (&self.config.username, &self.config.password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(builder.build())
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    fn name(&self) -> &str {
        "smtp"
    }

    async fn send(&self, subject: &str, body: &str) -> Result<NotifyReceipt> {
        let from = format!("{} <{}>", self.config.from_name, self.from_address)
            .parse()
            .map_err(|e| AppError::Notification(format!("invalid from address: {}", e)))?;
        let to = self
            .to_address
            .parse()
            .map_err(|e| AppError::Notification(format!("invalid to address: {}", e)))?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::Notification(format!("failed to build email: {}", e)))?;

        let mailer = self.build_transport()?;
        let response = mailer
            .send(&email)
            .map_err(|e| AppError::Notification(format!("SMTP send failed: {}", e)))?;

        let code = response.code();
        info!(%code, "report email accepted by SMTP relay");
        Ok(NotifyReceipt {
            status_code: code.to_string().parse().ok(),
            message_id: None,
        })
    }
}
