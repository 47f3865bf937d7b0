use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::server::services::{
    detection::{NewTaskWindow, TaskNotificationResult},
    notifier::{DeliveryRecord, NotificationData, NotificationType, Recipient},
};

// POST /api/notifications/send
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationRequest {
    pub recipients: Vec<Recipient>,
    pub notification_type: NotificationType,
    pub data: NotificationData,
}

#[derive(Debug, Serialize)]
pub struct SendNotificationResponse {
    pub success: bool,
    pub sent: usize,
    pub failed: usize,
    pub results: Vec<DeliveryRecord>,
}

// POST /api/notifications/auto
#[derive(Debug, Clone, Serialize)]
pub struct AutoNotificationResponse {
    pub success: bool,
    pub processed: usize,
    pub results: Vec<TaskNotificationResult>,
    pub message: String,
}

// GET/POST /api/notifications/detect-new
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectNewRequest {
    pub teacher_email: Option<String>,
    pub check_last: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectNewResponse {
    pub success: bool,
    pub teacher_email: String,
    pub time_window: NewTaskWindow,
    pub processed: usize,
    pub results: Vec<TaskNotificationResult>,
    pub message: String,
}

// GET/POST /api/notifications/cron
#[derive(Debug, Default, Deserialize)]
pub struct CronRequest {
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherCheck {
    pub teacher_email: String,
    pub success: bool,
    pub tasks_found: usize,
    pub details: Vec<TaskNotificationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CronResponse {
    pub success: bool,
    pub timestamp: DateTime<Utc>,
    pub professors_checked: usize,
    pub successful_checks: usize,
    pub total_new_tasks: usize,
    pub results: Vec<TeacherCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// POST /api/notifications/trigger
#[derive(Debug, Default, Deserialize)]
pub struct TriggerRequest {
    pub action: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<AutoNotificationResponse>,
}
