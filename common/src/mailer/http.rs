// HTTP mail provider client
//
// Posts one JSON message per send to the provider endpoint. The client
// timeout doubles as the per-send bound: a send that exceeds it fails
// with SendError::Timeout like any other delivery failure.

use crate::config::MailerConfig;
use crate::errors::SendError;
use crate::mailer::{EmailMessage, Mailer};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

/// Mailer backed by a JSON-over-HTTP delivery provider
pub struct HttpMailer {
    client: Client,
    config: MailerConfig,
}

impl HttpMailer {
    pub fn new(config: MailerConfig) -> Result<Self, SendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                SendError::Transport(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    fn from_header(&self) -> String {
        format!("{} <{}>", self.config.from_name, self.config.from_address)
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    #[tracing::instrument(skip(self, message), fields(to = %message.to, subject = %message.subject))]
    async fn send(&self, message: &EmailMessage) -> Result<(), SendError> {
        let payload = json!({
            "from": self.from_header(),
            "to": message.to,
            "subject": message.subject,
            "text": message.text_body,
            "html": message.html_body,
        });

        let mut request = self.client.post(&self.config.endpoint).json(&payload);
        if !self.config.api_token.is_empty() {
            request = request.bearer_auth(&self.config.api_token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SendError::Timeout(self.config.timeout_seconds)
            } else {
                SendError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SendError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!("Email accepted by provider");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(endpoint: String, timeout_seconds: u64) -> MailerConfig {
        MailerConfig {
            endpoint,
            api_token: String::new(),
            from_address: "no-reply@talentgrid.local".to_string(),
            from_name: "TalentGrid".to_string(),
            timeout_seconds,
            max_in_flight: 4,
        }
    }

    fn sample_message() -> EmailMessage {
        EmailMessage {
            to: "student@example.com".to_string(),
            subject: "Hello".to_string(),
            text_body: "Hi there".to_string(),
            html_body: "<p>Hi there</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_posts_message_to_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/send"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mailer = HttpMailer::new(config_for(format!("{}/api/send", server.uri()), 5)).unwrap();
        let result = mailer.send(&sample_message()).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_provider_rejection_maps_to_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let mailer = HttpMailer::new(config_for(format!("{}/api/send", server.uri()), 5)).unwrap();
        let err = mailer.send(&sample_message()).await.unwrap_err();

        match err {
            SendError::Rejected { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "upstream down");
            }
            other => panic!("Expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_slow_provider_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let mailer = HttpMailer::new(config_for(format!("{}/api/send", server.uri()), 1)).unwrap();
        let err = mailer.send(&sample_message()).await.unwrap_err();

        assert!(matches!(err, SendError::Timeout(1)));
    }

    #[tokio::test]
    async fn test_unreachable_provider_maps_to_transport() {
        // Port 1 is never listening
        let mailer = HttpMailer::new(config_for("http://127.0.0.1:1/api/send".to_string(), 2)).unwrap();
        let err = mailer.send(&sample_message()).await.unwrap_err();

        assert!(matches!(
            err,
            SendError::Transport(_) | SendError::Timeout(_)
        ));
    }
}
