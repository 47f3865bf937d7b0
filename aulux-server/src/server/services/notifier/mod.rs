mod email;
mod templates;
mod whatsapp;

pub use email::ResendClient;
pub use whatsapp::TwilioClient;

use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    NewTask,
    DueSoon,
    Overdue,
    SubmissionReceived,
    TaskReturned,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    pub task_title: String,
    pub course_name: String,
    pub student_name: Option<String>,
    pub teacher_name: Option<String>,
    pub due_date: Option<String>,
    pub submission_date: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Clone)]
pub struct WhatsAppMessage {
    /// `whatsapp:<phone>`
    pub to: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("{0} channel is not configured")]
    NotConfigured(&'static str),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        DeliveryError::Transport(err.to_string())
    }
}

/// Sends one email, resolving to the provider's message id.
pub trait EmailChannel: Send + Sync {
    fn send_email(
        &self,
        message: EmailMessage,
    ) -> impl Future<Output = Result<String, DeliveryError>> + Send;
}

/// Sends one WhatsApp message, resolving to the provider's message id.
pub trait WhatsAppChannel: Send + Sync {
    fn send_whatsapp(
        &self,
        message: WhatsAppMessage,
    ) -> impl Future<Output = Result<String, DeliveryError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Whatsapp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryRecord {
    #[serde(rename = "type")]
    pub channel: Channel,
    pub recipient: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeliveryRecord {
    fn new(channel: Channel, recipient: String, outcome: Result<String, DeliveryError>) -> Self {
        match outcome {
            Ok(id) => Self {
                channel,
                recipient,
                success: true,
                id: Some(id),
                error: None,
            },
            Err(e) => {
                tracing::warn!(channel = ?channel, recipient = %recipient, error = %e, "Delivery failed");
                Self {
                    channel,
                    recipient,
                    success: false,
                    id: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
    pub results: Vec<DeliveryRecord>,
}

impl DispatchReport {
    fn push(&mut self, record: DeliveryRecord) {
        if record.success {
            self.sent += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(record);
    }

    pub fn sent_on(&self, channel: Channel) -> usize {
        self.results
            .iter()
            .filter(|r| r.channel == channel && r.success)
            .count()
    }
}

/// Fans one notification out to every recipient over email and WhatsApp.
pub struct NotificationDispatcher<E, W> {
    email: E,
    whatsapp: W,
}

impl<E: EmailChannel, W: WhatsAppChannel> NotificationDispatcher<E, W> {
    pub fn new(email: E, whatsapp: W) -> Self {
        Self { email, whatsapp }
    }

    /// Sequential delivery: one email per recipient, plus one WhatsApp
    /// message for each recipient with a phone. Failures never stop the run.
    pub async fn notify(
        &self,
        recipients: &[Recipient],
        kind: NotificationType,
        data: &NotificationData,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();
        let subject = templates::subject(kind, data);
        let html = templates::email_html(kind, data);
        let text = templates::whatsapp_text(kind, data);

        for recipient in recipients {
            let email = recipient.email.trim();
            let outcome = if email.is_empty() {
                Err(DeliveryError::InvalidRecipient("empty email address".to_string()))
            } else {
                self.email
                    .send_email(EmailMessage {
                        to: email.to_string(),
                        subject: subject.clone(),
                        html: html.clone(),
                    })
                    .await
            };
            report.push(DeliveryRecord::new(Channel::Email, email.to_string(), outcome));

            let phone = recipient.phone.as_deref().map(str::trim).unwrap_or_default();
            if !phone.is_empty() {
                let outcome = self
                    .whatsapp
                    .send_whatsapp(WhatsAppMessage {
                        to: format!("whatsapp:{}", phone),
                        body: text.clone(),
                    })
                    .await;
                report.push(DeliveryRecord::new(Channel::Whatsapp, phone.to_string(), outcome));
            }
        }

        tracing::info!(
            kind = ?kind,
            sent = report.sent,
            failed = report.failed,
            "Notification dispatch finished"
        );
        report
    }
}

/// The production dispatcher.
pub type Dispatcher = NotificationDispatcher<ResendClient, TwilioClient>;
