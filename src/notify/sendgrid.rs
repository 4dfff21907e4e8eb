use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::config::SendGridConfig;
use crate::utils::error::{AppError, Result};

use super::{Notifier, NotifyReceipt};

/// Sends the report as a plain-text email through the SendGrid v3 API.
pub struct SendGridNotifier {
    client: reqwest::Client,
    api_key: String,
    from_email: String,
    to_email: String,
    api_base: String,
}

impl SendGridNotifier {
    pub fn new(api_key: String, from_email: String, to_email: String, api_base: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            from_email,
            to_email,
            api_base,
        }
    }

    pub fn from_config(config: &SendGridConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AppError::Notification("SendGrid API key is not set".to_string()))?;
        let from_email = config
            .from_email
            .clone()
            .ok_or_else(|| AppError::Notification("SendGrid from address is not set".to_string()))?;
        let to_email = config
            .to_email
            .clone()
            .ok_or_else(|| AppError::Notification("SendGrid to address is not set".to_string()))?;
        Ok(Self::new(api_key, from_email, to_email, config.api_base.clone()))
    }
}

#[async_trait]
impl Notifier for SendGridNotifier {
    fn name(&self) -> &str {
        "sendgrid"
    }

    async fn send(&self, subject: &str, body: &str) -> Result<NotifyReceipt> {
        let payload = json!({
            "personalizations": [{ "to": [{ "email": self.to_email }] }],
            "from": { "email": self.from_email },
            "subject": subject,
            "content": [{ "type": "text/plain", "value": body }],
        });

        let response = self
            .client
            .post(format!("{}/v3/mail/send", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::Notification(format!(
                "SendGrid returned status {}: {}",
                status.as_u16(),
                detail
            )));
        }

        let message_id = response
            .headers()
            .get("x-message-id")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        info!(status = status.as_u16(), "report email accepted by SendGrid");
        Ok(NotifyReceipt {
            status_code: Some(status.as_u16()),
            message_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{bearer_token, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(api_base: String) -> SendGridConfig {
        SendGridConfig {
            api_key: Some("SG.test-key".to_string()),
            from_email: Some("reports@example.com".to_string()),
            to_email: Some("runner@example.com".to_string()),
            api_base,
        }
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let mut config = test_config("https://api.sendgrid.com".to_string());
        config.api_key = None;
        let result = SendGridNotifier::from_config(&config);
        assert!(matches!(result, Err(AppError::Notification(_))));
    }

    #[tokio::test]
    async fn test_send_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/mail/send"))
            .and(bearer_token("SG.test-key"))
            .and(body_partial_json(serde_json::json!({
                "subject": "Daily Shoe Prices - 2024-01-01",
                "from": { "email": "reports@example.com" },
            })))
            .respond_with(ResponseTemplate::new(202).insert_header("x-message-id", "abc123"))
            .expect(1)
            .mount(&server)
            .await;

        let notifier =
            SendGridNotifier::from_config(&test_config(server.uri())).unwrap();
        let receipt = notifier
            .send("Daily Shoe Prices - 2024-01-01", "=== Brooks Ghost ===\n")
            .await
            .unwrap();

        assert_eq!(receipt.status_code, Some(202));
        assert_eq!(receipt.message_id.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_send_failure_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/mail/send"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let notifier =
            SendGridNotifier::from_config(&test_config(server.uri())).unwrap();
        let result = notifier.send("subject", "body").await;

        let Err(AppError::Notification(msg)) = result else {
            panic!("expected notification error");
        };
        assert!(msg.contains("401"));
        assert!(msg.contains("bad key"));
    }
}
