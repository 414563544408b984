use crate::config::{MailCredentials, MailSettings};
use crate::error::DeliveryError;
use crate::monitor::{Delivery, Notifier};
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Client;
use serde::Serialize;

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    value: &'a str,
}

/// Body of a v3 `mail/send` request with a single plain-text part.
#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
}

impl<'a> SendRequest<'a> {
    fn plain_text(creds: &'a MailCredentials, subject: &'a str, body: &'a str) -> Self {
        Self {
            personalizations: vec![Personalization {
                to: vec![Address {
                    email: &creds.to_email,
                }],
            }],
            from: Address {
                email: &creds.from_email,
            },
            subject,
            content: vec![Content {
                kind: "text/plain",
                value: body,
            }],
        }
    }
}

pub struct SendGridClient {
    client: Client,
    send_url: String,
    settings: MailSettings,
}

impl SendGridClient {
    pub fn new(client: Client, settings: MailSettings) -> Self {
        Self {
            client,
            send_url: SENDGRID_SEND_URL.to_string(),
            settings,
        }
    }
}

#[async_trait]
impl Notifier for SendGridClient {
    async fn notify(&self, subject: &str, body: &str) -> Result<Delivery, DeliveryError> {
        let creds = match self.settings.credentials() {
            Some(creds) => creds,
            None => {
                warn!("Missing SendGrid credentials or email info in environment variables.");
                return Ok(Delivery::SkippedMissingConfig);
            }
        };

        debug!("POST {} to={}", self.send_url, creds.to_email);
        let resp = self
            .client
            .post(&self.send_url)
            .bearer_auth(&creds.api_key)
            .json(&SendRequest::plain_text(&creds, subject, body))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable response body: {}>", e));
            return Err(DeliveryError::Rejected { status, body });
        }

        info!("Email alert sent! Status Code: {}", status.as_u16());
        Ok(Delivery::Sent {
            status: status.as_u16(),
        })
    }
}
