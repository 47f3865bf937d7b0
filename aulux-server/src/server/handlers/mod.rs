mod attendance;
mod auth;
mod calendar;
mod classroom;
mod metrics;
mod notifications;

pub use attendance::{delete_attendance, list_attendance, record_attendance, update_attendance};
pub use auth::{current_session, login, logout, oauth_callback, refresh_tokens};
pub use calendar::{create_event, list_events};
pub use classroom::{list_course_work, list_courses, list_students, list_submissions};
pub use metrics::{coordinator_metrics, metrics};
pub use notifications::{
    auto_notifications, cron_manual, cron_run, detect_new_get, detect_new_post,
    send_notifications, trigger_notifications,
};

use crate::server::{error::ServerError, models::HealthResponse};
use axum::{extract::rejection::JsonRejection, Json};

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Unwrap a JSON body, reporting malformed input as a 400.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ServerError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ServerError::BadRequest(rejection.body_text()))
}
