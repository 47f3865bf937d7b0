use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{Duration, Utc};
use classroom_api::{
    endpoints::calendar::{Attendee, EventDateTime, ReminderMethod, ReminderOverride, Reminders},
    Request,
};
use tracing::Instrument;

use super::json_body;
use crate::server::{
    error::ServerError,
    extract::{ApiQuery, CurrentUser},
    models::{CalendarEventsResponse, CalendarRangeParams, CreateEventRequest, CreateEventResponse},
    AppState,
};

/// Words that mark an event as class related.
const CLASS_KEYWORDS: [&str; 7] = [
    "clase", "class", "curso", "course", "semillero", "digital", "aulux",
];

const DEFAULT_RANGE_DAYS: i64 = 30;

pub async fn list_events(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiQuery(params): ApiQuery<CalendarRangeParams>,
) -> Result<Json<CalendarEventsResponse>, ServerError> {
    let time_min = params.time_min.unwrap_or_else(Utc::now);
    let time_max = params
        .time_max
        .unwrap_or_else(|| time_min + Duration::days(DEFAULT_RANGE_DAYS));

    let span = tracing::info_span!("list_events", email = %user.0.email);
    let response = user
        .classroom_client(&state.settings)
        .send(Request::calendar().list(time_min, time_max))
        .instrument(span)
        .await?;

    let class_events = response
        .items
        .iter()
        .filter(|event| event.mentions_any(&CLASS_KEYWORDS))
        .cloned()
        .collect();

    Ok(Json(CalendarEventsResponse {
        events: response.items,
        class_events,
        next_page_token: response.next_page_token,
        time_min,
        time_max,
    }))
}

pub async fn create_event(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<CreateEventRequest>, JsonRejection>,
) -> Result<Json<CreateEventResponse>, ServerError> {
    let request = json_body(body)?;

    let (Some(summary), Some(start), Some(end)) = (
        request.summary.filter(|s| !s.trim().is_empty()),
        request.start_date_time,
        request.end_date_time,
    ) else {
        return Err(ServerError::BadRequest(
            "Faltan campos requeridos: summary, startDateTime, endDateTime".to_string(),
        ));
    };
    if end < start {
        return Err(ServerError::BadRequest(
            "endDateTime no puede ser anterior a startDateTime".to_string(),
        ));
    }

    let time_zone = &state.settings.classroom.calendar_time_zone;
    let mut insert = Request::calendar()
        .insert(
            summary,
            EventDateTime::at(start, time_zone.as_str()),
            EventDateTime::at(end, time_zone.as_str()),
        )
        .attendees(request.attendees.into_iter().map(Attendee::new).collect())
        .reminders(Reminders {
            use_default: false,
            overrides: vec![
                ReminderOverride {
                    method: ReminderMethod::Email,
                    minutes: 24 * 60,
                },
                ReminderOverride {
                    method: ReminderMethod::Popup,
                    minutes: 30,
                },
            ],
        });
    if let Some(description) = request.description {
        insert = insert.description(description);
    }
    if let Some(location) = request.location {
        insert = insert.location(location);
    }

    let span = tracing::info_span!("create_event", email = %user.0.email);
    let event = user
        .classroom_client(&state.settings)
        .send(insert)
        .instrument(span)
        .await?;
    tracing::info!(event_id = ?event.id, "Calendar event created");

    Ok(Json(CreateEventResponse {
        success: true,
        event,
    }))
}
