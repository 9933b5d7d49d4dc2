// Outbound email delivery
//
// Sends are one-shot: callers log and count failures, nothing retries
// and nothing is queued for later.

use crate::errors::SendError;
use async_trait::async_trait;

pub mod http;

pub use http::HttpMailer;

/// A rendered email ready for delivery; the mailer supplies the sender
/// address from configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

/// Mailer delivers a single message
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), SendError>;
}
