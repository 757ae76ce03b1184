//! Notifier port and its SMTP implementation
//!
//! The core only notifies on order create/update transitions. Notifier
//! failures are logged by callers and never block the order write path.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, Message},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};
use std::str::FromStr;

use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        subject: &str,
        template: &str,
        context: &serde_json::Value,
        recipient: &str,
    ) -> AppResult<()>;
}

/// Sends notifications over SMTP
pub struct EmailNotifier {
    config: EmailConfig,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Substitute `{key}` placeholders with values from the context object.
    fn render(template: &str, context: &serde_json::Value) -> String {
        let mut body = template.to_string();
        if let Some(map) = context.as_object() {
            for (key, value) in map {
                let needle = format!("{{{}}}", key);
                let replacement = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                body = body.replace(&needle, &replacement);
            }
        }
        body
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(
        &self,
        subject: &str,
        template: &str,
        context: &serde_json::Value,
        recipient: &str,
    ) -> AppResult<()> {
        let from_name = self.config.smtp_from_name.as_deref().unwrap_or("Ordena");
        let from_mailbox =
            Mailbox::from_str(&format!("{} <{}>", from_name, self.config.smtp_from))
                .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;
        let to_mailbox = Mailbox::from_str(recipient)
            .map_err(|e| AppError::Internal(format!("Invalid to address: {}", e)))?;

        let body = Self::render(template, context);
        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        let mut builder = if self.config.smtp_use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::Internal(format!("SMTP relay error: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port);

        if let (Some(username), Some(password)) =
            (&self.config.smtp_username, &self.config.smtp_password)
        {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        builder
            .build()
            .send(&email)
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_substitutes_context() {
        let body = EmailNotifier::render(
            "Order {id} for {name} at {start}",
            &json!({"id": 12, "name": "Alice", "start": "2024-07-01T10:00:00Z"}),
        );
        assert_eq!(body, "Order 12 for Alice at 2024-07-01T10:00:00Z");
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        let body = EmailNotifier::render("Hello {name}", &json!({}));
        assert_eq!(body, "Hello {name}");
    }
}
