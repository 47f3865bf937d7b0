use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::{DeliveryError, WhatsAppChannel, WhatsAppMessage};
use crate::server::config::WhatsAppConfiguration;

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
    status: Option<String>,
}

struct TwilioCredentials {
    account_sid: String,
    auth_token: SecretString,
    from_number: String,
    base_url: String,
}

/// Twilio Messages API client for WhatsApp. Without credentials every send fails.
pub struct TwilioClient {
    http_client: Client,
    credentials: Option<TwilioCredentials>,
}

impl TwilioClient {
    pub fn new(config: Option<&WhatsAppConfiguration>) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            http_client,
            credentials: config.map(|c| TwilioCredentials {
                account_sid: c.account_sid.clone(),
                auth_token: SecretString::from(c.auth_token.expose_secret()),
                from_number: c.from_number.clone(),
                base_url: c.base_url.trim_end_matches('/').to_string(),
            }),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }
}

impl WhatsAppChannel for TwilioClient {
    async fn send_whatsapp(&self, message: WhatsAppMessage) -> Result<String, DeliveryError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(DeliveryError::NotConfigured("whatsapp"))?;

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            credentials.base_url, credentials.account_sid
        );
        let resp = self
            .http_client
            .post(&url)
            .basic_auth(
                &credentials.account_sid,
                Some(credentials.auth_token.expose_secret()),
            )
            .form(&[
                ("From", credentials.from_number.as_str()),
                ("To", message.to.as_str()),
                ("Body", message.body.as_str()),
            ])
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

        let created = resp.json::<MessageResponse>().await?;
        tracing::debug!(sid = %created.sid, status = ?created.status, "WhatsApp message queued");
        Ok(created.sid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_client_fails_without_network() {
        let client = TwilioClient::new(None);
        assert!(!client.is_configured());

        let result = client
            .send_whatsapp(WhatsAppMessage {
                to: "whatsapp:+5491100000000".to_string(),
                body: "Hola".to_string(),
            })
            .await;
        assert!(matches!(result, Err(DeliveryError::NotConfigured("whatsapp"))));
    }
}
