//! SendGrid mail transport.
//!
//! Sends plain-text email via the SendGrid v3 HTTP API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::{MailError, MailTransport, OutboundEmail};

/// SendGrid API endpoint
const SENDGRID_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// SendGrid-backed [`MailTransport`].
pub struct SendGridMailer {
    api_key: String,
    from_email: String,
    client: Client,
}

impl SendGridMailer {
    pub fn new(api_key: impl Into<String>, from_email: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            from_email: from_email.into(),
            client: Client::new(),
        }
    }
}

/// SendGrid API request payload
#[derive(Debug, Serialize)]
struct SendGridRequest {
    personalizations: Vec<Personalization>,
    from: EmailAddress,
    subject: String,
    content: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Personalization {
    to: Vec<EmailAddress>,
}

#[derive(Debug, Serialize)]
struct EmailAddress {
    email: String,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(rename = "type")]
    content_type: String,
    value: String,
}

#[async_trait]
impl MailTransport for SendGridMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<u16, MailError> {
        let request = SendGridRequest {
            personalizations: vec![Personalization {
                to: vec![EmailAddress {
                    email: email.to.clone(),
                }],
            }],
            from: EmailAddress {
                email: self.from_email.clone(),
            },
            subject: email.subject.clone(),
            content: vec![Content {
                content_type: "text/plain".to_string(),
                value: email.body_text.clone(),
            }],
        };

        tracing::debug!(
            to = %email.to,
            subject = %email.subject,
            "Sending email via SendGrid"
        );

        let response = self
            .client
            .post(SENDGRID_API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        Ok(response.status().as_u16())
    }
}
