use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{Local, Utc};
use uuid::Uuid;

use super::json_body;
use crate::server::{
    error::ServerError,
    extract::{ApiQuery, CurrentUser},
    models::{
        AttendanceDeletedResponse, AttendanceFilter, AttendanceListResponse, AttendanceRecord,
        AttendanceResponse, AttendanceStats, AttendanceStatus, DeleteAttendanceParams,
        RecordAttendanceRequest, UpdateAttendanceRequest,
    },
    services::Upsert,
    AppState,
};

const MISSING_FIELDS: &str = "Faltan campos requeridos: eventId, courseId, studentId, status";
const RECORD_NOT_FOUND: &str = "Registro de asistencia no encontrado";

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_status(value: &str) -> Result<AttendanceStatus, ServerError> {
    value.parse().map_err(ServerError::BadRequest)
}

fn require_record_id(record_id: Option<String>) -> Result<String, ServerError> {
    required(record_id).ok_or_else(|| ServerError::BadRequest("Falta recordId".to_string()))
}

pub async fn list_attendance(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    ApiQuery(filter): ApiQuery<AttendanceFilter>,
) -> Json<AttendanceListResponse> {
    let span = tracing::info_span!("list_attendance", email = %session.email);
    let _enter = span.enter();

    let records = state.attendance.list(&filter);
    let stats = AttendanceStats::from_records(&records);
    tracing::debug!(count = records.len(), "Listed attendance records");

    Json(AttendanceListResponse {
        records,
        stats,
        filters: filter,
    })
}

pub async fn record_attendance(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    body: Result<Json<RecordAttendanceRequest>, JsonRejection>,
) -> Result<Json<AttendanceResponse>, ServerError> {
    let request = json_body(body)?;

    let (Some(event_id), Some(course_id), Some(student_id), Some(status)) = (
        required(request.event_id),
        required(request.course_id),
        required(request.student_id),
        required(request.status),
    ) else {
        return Err(ServerError::BadRequest(MISSING_FIELDS.to_string()));
    };
    let status = parse_status(&status)?;

    let span = tracing::info_span!(
        "record_attendance",
        email = %session.email,
        event_id = %event_id,
        student_id = %student_id
    );
    let _enter = span.enter();

    let now = Local::now();
    let record = AttendanceRecord {
        id: Uuid::new_v4().to_string(),
        event_id,
        course_id,
        course_name: request.course_name.unwrap_or_else(|| "Curso".to_string()),
        student_id,
        student_name: request
            .student_name
            .unwrap_or_else(|| "Estudiante".to_string()),
        student_email: request.student_email.unwrap_or_default(),
        status,
        date: request.date.unwrap_or_else(|| now.date_naive()),
        time: request
            .time
            .unwrap_or_else(|| now.format("%H:%M:%S").to_string()),
        location: request.location.unwrap_or_else(|| "Virtual".to_string()),
        notes: request.notes.unwrap_or_default(),
        timestamp: Utc::now(),
        recorded_by: session.email.clone(),
        updated_at: None,
        updated_by: None,
    };

    let (record, outcome) = state.attendance.upsert(record);
    let message = match outcome {
        Upsert::Created => "Asistencia registrada",
        Upsert::Updated => "Asistencia actualizada",
    };
    tracing::info!(record_id = %record.id, status = ?record.status, "{}", message);

    Ok(Json(AttendanceResponse {
        success: true,
        record,
        message: message.to_string(),
    }))
}

pub async fn update_attendance(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    body: Result<Json<UpdateAttendanceRequest>, JsonRejection>,
) -> Result<Json<AttendanceResponse>, ServerError> {
    let request = json_body(body)?;
    let record_id = require_record_id(request.record_id)?;
    let status = request.status.as_deref().map(parse_status).transpose()?;

    let span = tracing::info_span!("update_attendance", email = %session.email, record_id = %record_id);
    let _enter = span.enter();

    let record = state
        .attendance
        .update(&record_id, status, request.notes, &session.email)
        .ok_or_else(|| ServerError::NotFound(RECORD_NOT_FOUND.to_string()))?;
    tracing::info!("Attendance record updated");

    Ok(Json(AttendanceResponse {
        success: true,
        record,
        message: "Asistencia actualizada".to_string(),
    }))
}

pub async fn delete_attendance(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    ApiQuery(params): ApiQuery<DeleteAttendanceParams>,
) -> Result<Json<AttendanceDeletedResponse>, ServerError> {
    let record_id = require_record_id(params.record_id)?;

    let span = tracing::info_span!("delete_attendance", email = %session.email, record_id = %record_id);
    let _enter = span.enter();

    let deleted_record = state
        .attendance
        .delete(&record_id)
        .ok_or_else(|| ServerError::NotFound(RECORD_NOT_FOUND.to_string()))?;
    tracing::info!("Attendance record deleted");

    Ok(Json(AttendanceDeletedResponse {
        success: true,
        deleted_record,
        message: "Registro de asistencia eliminado".to_string(),
    }))
}
