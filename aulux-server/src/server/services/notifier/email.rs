use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{DeliveryError, EmailChannel, EmailMessage};
use crate::server::config::EmailConfiguration;

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: String,
}

struct ResendCredentials {
    api_key: SecretString,
    from_address: String,
    base_url: String,
}

/// Resend REST client. Without credentials every send fails.
pub struct ResendClient {
    http_client: Client,
    credentials: Option<ResendCredentials>,
}

impl ResendClient {
    pub fn new(config: Option<&EmailConfiguration>) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            http_client,
            credentials: config.map(|c| ResendCredentials {
                api_key: SecretString::from(c.api_key.expose_secret()),
                from_address: c.from_address.clone(),
                base_url: c.base_url.trim_end_matches('/').to_string(),
            }),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }
}

impl EmailChannel for ResendClient {
    async fn send_email(&self, message: EmailMessage) -> Result<String, DeliveryError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(DeliveryError::NotConfigured("email"))?;

        let url = format!("{}/emails", credentials.base_url);
        let resp = self
            .http_client
            .post(&url)
            .bearer_auth(credentials.api_key.expose_secret())
            .json(&SendEmailRequest {
                from: &credentials.from_address,
                to: [message.to.as_str()],
                subject: &message.subject,
                html: &message.html,
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(DeliveryError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json::<SendEmailResponse>().await?.id)
    }
}
