use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use classroom_api::endpoints::calendar::Event;

use super::Role;

// GET /auth/callback
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: String,
    pub error: Option<String>,
}

// GET /auth/session
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

// POST /auth/refresh
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

// GET /api/classroom/courses
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSizeParams {
    pub page_size: Option<u32>,
}

// GET /api/calendar/events
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarRangeParams {
    pub time_min: Option<DateTime<Utc>>,
    pub time_max: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventsResponse {
    pub events: Vec<Event>,
    pub class_events: Vec<Event>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
}

// POST /api/calendar/events
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date_time: Option<DateTime<chrono::FixedOffset>>,
    pub end_date_time: Option<DateTime<chrono::FixedOffset>>,
    #[serde(default)]
    pub attendees: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateEventResponse {
    pub success: bool,
    pub event: Event,
}

// Health check
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
