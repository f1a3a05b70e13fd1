//! Email notifications.
//!
//! `Notifier::send` never fails past its own boundary: delivery errors are
//! logged and reported as `false`. Without a resolved API key the notifier is
//! disabled and every send short-circuits.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::json;
use stockwatch_core::WatchError;
use tracing::{error, info, warn};

pub const SUBJECT_STOCK_UPDATE: &str = "GrowAGarden Stock Update";
pub const SUBJECT_CHECK_ERROR: &str = "Stock Check Error";
pub const SUBJECT_CURRENT_STOCK: &str = "Current GrowAGarden Stock";
pub const SUBJECT_CURRENT_ERROR: &str = "Current Stock Error";

const SENDGRID_ENDPOINT: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Email {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Transport for a fully formatted email.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn deliver(&self, email: &Email) -> Result<(), WatchError>;
}

/// Transactional email over the SendGrid v3 HTTP API.
pub struct SendGridMailer {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl SendGridMailer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            endpoint: SENDGRID_ENDPOINT.to_string(),
        }
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn deliver(&self, email: &Email) -> Result<(), WatchError> {
        let body = json!({
            "personalizations": [{ "to": [{ "email": email.to }] }],
            "from": { "email": email.from },
            "subject": email.subject,
            "content": [
                { "type": "text/plain", "value": email.text },
                { "type": "text/html", "value": email.html },
            ],
        });

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| WatchError::Delivery(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(WatchError::Delivery(format!("{status}: {detail}")));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct Notifier {
    mailer: Option<Arc<dyn Mailer>>,
    address: String,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>, address: impl Into<String>) -> Self {
        Self {
            mailer: Some(mailer),
            address: address.into(),
        }
    }

    /// A notifier whose key material failed to initialise.
    pub fn disabled(address: impl Into<String>) -> Self {
        Self {
            mailer: None,
            address: address.into(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.mailer.is_some()
    }

    /// Formats `lines` and dispatches them. Returns whether delivery succeeded.
    pub async fn send(&self, subject: &str, lines: &[String]) -> bool {
        let Some(mailer) = &self.mailer else {
            warn!(subject, "notifier disabled; email not sent");
            return false;
        };

        let email = self.compose(subject, lines);
        match mailer.deliver(&email).await {
            Ok(()) => {
                info!(subject, lines = lines.len(), "email sent");
                true
            }
            Err(e) => {
                error!(subject, kind = e.kind(), error = %e, "email failed");
                false
            }
        }
    }

    pub fn compose(&self, subject: &str, lines: &[String]) -> Email {
        Email {
            to: self.address.clone(),
            from: self.address.clone(),
            subject: subject.to_string(),
            text: format!("Stock update:\n\n{}", lines.join("\n")),
            html: format!(
                "<p>Stock update:</p><ul>{}</ul>",
                lines
                    .iter()
                    .map(|l| format!("<li>{}</li>", escape_html(l)))
                    .collect::<String>()
            ),
        }
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
