use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::Instrument;

use super::json_body;
use crate::server::{
    error::ServerError,
    extract::{self, ApiQuery, CronAuth, CurrentUser},
    models::{
        AutoNotificationResponse, CronRequest, CronResponse, DetectNewRequest, DetectNewResponse,
        SendNotificationRequest, SendNotificationResponse, TeacherCheck, TriggerRequest,
        TriggerResponse, UserSession,
    },
    services::{
        detection::{notify_new_tasks, NewTaskWindow, TaskNotificationResult},
        GoogleClassroom,
    },
    AppState,
};

const CHECK_NEW_TASKS: &str = "check_new_tasks";

/// Like [`json_body`], but a request without a JSON body yields the default.
fn optional_json_body<T: Default + DeserializeOwned>(
    body: Result<Json<T>, JsonRejection>,
) -> Result<T, ServerError> {
    match body {
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        other => json_body(other),
    }
}

fn teacher_name(session: &UserSession) -> String {
    session
        .name
        .clone()
        .unwrap_or_else(|| "Profesor".to_string())
}

/// Detect and announce new course work in every course visible to `session`.
async fn notify_as(
    state: &AppState,
    session: &UserSession,
    window: NewTaskWindow,
) -> Result<Vec<TaskNotificationResult>, ServerError> {
    let source = GoogleClassroom::new(
        extract::classroom_client(&state.settings, session),
        state.settings.classroom.page_size,
    );
    notify_new_tasks(
        &source,
        state.dispatcher.as_ref(),
        &teacher_name(session),
        window,
        Utc::now(),
    )
    .await
}

/// Run detection with the live session of another user, refreshing it first if needed.
async fn detect_for_teacher(
    state: &AppState,
    teacher_email: &str,
    window: NewTaskWindow,
) -> Result<Vec<TaskNotificationResult>, ServerError> {
    let session = state
        .session_store
        .find_by_email(teacher_email)
        .ok_or_else(|| {
            ServerError::NotFound(format!("No hay sesión activa para {}", teacher_email))
        })?;

    let session = if session.tokens.is_expired() {
        extract::refresh_session(state, &session).await?
    } else {
        session
    };

    notify_as(state, &session, window).await
}

async fn auto_for(
    state: &AppState,
    session: &UserSession,
) -> Result<AutoNotificationResponse, ServerError> {
    let span = tracing::info_span!("auto_notifications", email = %session.email);
    let results = notify_as(state, session, NewTaskWindow::OneDay)
        .instrument(span)
        .await?;

    Ok(AutoNotificationResponse {
        success: true,
        processed: results.len(),
        message: format!("Procesadas {} tareas nuevas", results.len()),
        results,
    })
}

pub async fn send_notifications(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    body: Result<Json<SendNotificationRequest>, JsonRejection>,
) -> Result<Json<SendNotificationResponse>, ServerError> {
    let request = json_body(body)?;
    if request.recipients.is_empty() {
        return Err(ServerError::BadRequest(
            "Se requiere al menos un destinatario".to_string(),
        ));
    }

    let span = tracing::info_span!(
        "send_notifications",
        email = %session.email,
        recipients = request.recipients.len()
    );
    let report = state
        .dispatcher
        .notify(&request.recipients, request.notification_type, &request.data)
        .instrument(span)
        .await;

    Ok(Json(SendNotificationResponse {
        success: true,
        sent: report.sent,
        failed: report.failed,
        results: report.results,
    }))
}

pub async fn auto_notifications(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<Json<AutoNotificationResponse>, ServerError> {
    auto_for(&state, &session).await.map(Json)
}

pub async fn trigger_notifications(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    body: Result<Json<TriggerRequest>, JsonRejection>,
) -> Result<Json<TriggerResponse>, ServerError> {
    let request = optional_json_body(body)?;
    let action = request.action.as_deref().unwrap_or(CHECK_NEW_TASKS);

    if action != CHECK_NEW_TASKS {
        return Ok(Json(TriggerResponse {
            success: false,
            message: "Acción no reconocida".to_string(),
            details: None,
        }));
    }

    let response = match auto_for(&state, &session).await {
        Ok(details) => TriggerResponse {
            success: true,
            message: format!(
                "Notificaciones enviadas: {} tareas procesadas",
                details.processed
            ),
            details: Some(details),
        },
        Err(e) => TriggerResponse {
            success: false,
            message: format!("Error: {}", e),
            details: None,
        },
    };
    Ok(Json(response))
}

async fn detect_new(
    state: &AppState,
    request: DetectNewRequest,
) -> Result<Json<DetectNewResponse>, ServerError> {
    let teacher_email = request
        .teacher_email
        .filter(|email| !email.trim().is_empty())
        .ok_or_else(|| ServerError::BadRequest("Falta teacherEmail".to_string()))?;
    let window = NewTaskWindow::parse(request.check_last.as_deref());

    let span = tracing::info_span!(
        "detect_new",
        teacher_email = %teacher_email,
        window = window.as_str()
    );
    let results = detect_for_teacher(state, &teacher_email, window)
        .instrument(span)
        .await?;

    Ok(Json(DetectNewResponse {
        success: true,
        message: format!(
            "Procesadas {} tareas nuevas para {}",
            results.len(),
            teacher_email
        ),
        teacher_email,
        time_window: window,
        processed: results.len(),
        results,
    }))
}

pub async fn detect_new_get(
    State(state): State<AppState>,
    _auth: CronAuth,
    ApiQuery(request): ApiQuery<DetectNewRequest>,
) -> Result<Json<DetectNewResponse>, ServerError> {
    detect_new(&state, request).await
}

pub async fn detect_new_post(
    State(state): State<AppState>,
    _auth: CronAuth,
    body: Result<Json<DetectNewRequest>, JsonRejection>,
) -> Result<Json<DetectNewResponse>, ServerError> {
    let request = optional_json_body(body)?;
    detect_new(&state, request).await
}

/// Check every staff member, professors first. One teacher's failure never
/// stops the run.
async fn run_cron(state: &AppState) -> CronResponse {
    let staff = state.roles.staff_emails();
    if staff.is_empty() {
        tracing::warn!("Cron run skipped: no staff emails configured");
        return CronResponse {
            success: false,
            timestamp: Utc::now(),
            professors_checked: 0,
            successful_checks: 0,
            total_new_tasks: 0,
            results: Vec::new(),
            message: Some("No hay profesores configurados".to_string()),
        };
    }

    let mut results = Vec::with_capacity(staff.len());
    for teacher_email in staff {
        let span = tracing::info_span!("cron_check", teacher_email = %teacher_email);
        let outcome = detect_for_teacher(state, &teacher_email, NewTaskWindow::OneHour)
            .instrument(span)
            .await;
        let check = match outcome {
            Ok(details) => TeacherCheck {
                teacher_email,
                success: true,
                tasks_found: details.len(),
                details,
                error: None,
            },
            Err(e) => {
                tracing::warn!(teacher_email = %teacher_email, error = %e, "Cron check failed");
                TeacherCheck {
                    teacher_email,
                    success: false,
                    tasks_found: 0,
                    details: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        };
        results.push(check);
    }

    let successful_checks = results.iter().filter(|r| r.success).count();
    let total_new_tasks = results.iter().map(|r| r.tasks_found).sum();
    tracing::info!(
        checked = results.len(),
        successful = successful_checks,
        new_tasks = total_new_tasks,
        "Cron run finished"
    );

    CronResponse {
        success: true,
        timestamp: Utc::now(),
        professors_checked: results.len(),
        successful_checks,
        total_new_tasks,
        message: Some(format!(
            "Cron completado: {}/{} profesores, {} tareas nuevas",
            successful_checks,
            results.len(),
            total_new_tasks
        )),
        results,
    }
}

pub async fn cron_run(State(state): State<AppState>, _auth: CronAuth) -> Json<CronResponse> {
    Json(run_cron(&state).await)
}

pub async fn cron_manual(
    State(state): State<AppState>,
    _auth: CronAuth,
    body: Result<Json<CronRequest>, JsonRejection>,
) -> Result<Response, ServerError> {
    let request = optional_json_body(body)?;
    if !request.force {
        return Ok(Json(json!({
            "message": "Use GET para cron automático o POST con {\"force\": true} para testing"
        }))
        .into_response());
    }

    tracing::info!("Manual cron run requested");
    Ok(Json(run_cron(&state).await).into_response())
}
