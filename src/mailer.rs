//! SMTP delivery of composed notifications.

use async_trait::async_trait;
use lettre::message::{MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::SmtpConfig;
use crate::error::{NotifierError, Result};

/// Mail transport seam; the pipeline only sees this trait.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn send(&self, subject: &str, html: &str, text: Option<&str>) -> Result<()>;
}

/// Builds the multipart message: a plain-text alternative first when
/// supplied, then the HTML body.
pub fn build_message(
    config: &SmtpConfig,
    subject: &str,
    html: &str,
    text: Option<&str>,
) -> Result<Message> {
    let builder = Message::builder()
        .from(config.from_email.clone())
        .to(config.to_email.clone())
        .subject(subject);

    let body = match text {
        Some(text) => MultiPart::alternative_plain_html(text.to_string(), html.to_string()),
        None => MultiPart::alternative().singlepart(SinglePart::html(html.to_string())),
    };

    builder
        .multipart(body)
        .map_err(|e| NotifierError::Delivery(format!("could not build message: {e}")))
}

/// Delivers over STARTTLS with LOGIN credentials. One connection is opened,
/// used, and dropped per call; failed deliveries propagate to the caller.
pub struct SmtpDispatcher {
    config: SmtpConfig,
}

impl SmtpDispatcher {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Dispatcher for SmtpDispatcher {
    async fn send(&self, subject: &str, html: &str, text: Option<&str>) -> Result<()> {
        let message = build_message(&self.config, subject, html, text)?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.server)
            .map_err(|e| NotifierError::Delivery(e.to_string()))?
            .port(self.config.port)
            .credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            ))
            .build();

        mailer
            .send(message)
            .await
            .map_err(|e| NotifierError::Delivery(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SmtpConfig {
        SmtpConfig {
            server: "smtp.example.com".to_string(),
            port: 587,
            username: "user".to_string(),
            password: "password".to_string(),
            from_email: "notifications@example.com".parse().unwrap(),
            to_email: "general-git-commit@example.com".parse().unwrap(),
        }
    }

    #[test]
    fn message_with_plain_alternative_has_both_parts() {
        let message = build_message(
            &test_config(),
            "'Prerak Ghatode' via General Commit Notification List",
            "<html><body>hi</body></html>",
            Some("hi"),
        )
        .unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("multipart/alternative"));
        assert!(formatted.contains("text/plain"));
        assert!(formatted.contains("text/html"));
        assert!(formatted.contains("General Commit Notification List"));
        assert!(formatted.contains("From: notifications@example.com"));
        assert!(formatted.contains("To: general-git-commit@example.com"));
    }

    #[test]
    fn message_without_alternative_is_html_only() {
        let message = build_message(
            &test_config(),
            "subject",
            "<html><body>hi</body></html>",
            None,
        )
        .unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("text/html"));
        assert!(!formatted.contains("text/plain"));
    }
}
