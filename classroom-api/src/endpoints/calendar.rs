use crate::{GoogleRequest, Service, macros::setter};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tower_api_client::{Method, Request, RequestData};

const PRIMARY_CALENDAR: &str = "primary";

// Common

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Option<String>,
    pub status: Option<String>,
    pub html_link: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<EventDateTime>,
    pub end: Option<EventDateTime>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

impl Event {
    /// Case-insensitive search across summary and description.
    pub fn mentions_any(&self, keywords: &[&str]) -> bool {
        let summary = self.summary.as_deref().unwrap_or_default().to_lowercase();
        let description = self
            .description
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();
        keywords
            .iter()
            .any(|k| summary.contains(k) || description.contains(k))
    }
}

/// Either a timed instant or an all-day date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<DateTime<chrono::FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventDateTime {
    pub fn at(date_time: DateTime<chrono::FixedOffset>, time_zone: impl Into<String>) -> Self {
        Self {
            date_time: Some(date_time),
            date: None,
            time_zone: Some(time_zone.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_status: Option<String>,
}

impl Attendee {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            display_name: None,
            response_status: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    pub use_default: bool,
    #[serde(default)]
    pub overrides: Vec<ReminderOverride>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderOverride {
    pub method: ReminderMethod,
    pub minutes: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderMethod {
    Email,
    Popup,
}

// Requests

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEvents {
    #[serde(skip)]
    calendar_id: String,
    time_min: DateTime<Utc>,
    time_max: DateTime<Utc>,
    single_events: bool,
    order_by: String,
    max_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_token: Option<String>,
}

impl ListEvents {
    pub fn new(time_min: DateTime<Utc>, time_max: DateTime<Utc>) -> Self {
        Self {
            calendar_id: PRIMARY_CALENDAR.to_string(),
            time_min,
            time_max,
            single_events: true,
            order_by: "startTime".to_string(),
            max_results: 100,
            page_token: None,
        }
    }

    setter!(calendar_id: String);
    setter!(max_results: u32);
    setter!(opt page_token: String);
}

impl Request for ListEvents {
    type Data = Self;
    type Response = ListEventsResponse;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/calendar/v3/calendars/{}/events", self.calendar_id).into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Query(self)
    }
}

impl GoogleRequest for ListEvents {
    const SERVICE: Service = Service::GoogleApis;
}

#[derive(Debug, Clone, Serialize)]
pub struct InsertEvent {
    #[serde(skip)]
    calendar_id: String,
    #[serde(flatten)]
    event: NewEvent,
}

impl InsertEvent {
    pub fn new(summary: impl Into<String>, start: EventDateTime, end: EventDateTime) -> Self {
        Self {
            calendar_id: PRIMARY_CALENDAR.to_string(),
            event: NewEvent {
                summary: summary.into(),
                description: None,
                location: None,
                start,
                end,
                attendees: Vec::new(),
                reminders: None,
            },
        }
    }

    setter!(calendar_id: String);
    setter!(opt event.description: String);
    setter!(opt event.location: String);
    setter!(opt event.reminders: Reminders);

    pub fn attendees(mut self, attendees: Vec<Attendee>) -> Self {
        self.event.attendees = attendees;
        self
    }
}

impl Request for InsertEvent {
    type Data = Self;
    type Response = Event;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/calendar/v3/calendars/{}/events", self.calendar_id).into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(self)
    }
}

impl GoogleRequest for InsertEvent {
    const SERVICE: Service = Service::GoogleApis;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start: EventDateTime,
    pub end: EventDateTime,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<Attendee>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminders: Option<Reminders>,
}

// Responses

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsResponse {
    #[serde(default)]
    pub items: Vec<Event>,
    pub next_page_token: Option<String>,
    pub time_zone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(summary: &str, description: Option<&str>) -> Event {
        Event {
            id: None,
            status: None,
            html_link: None,
            summary: Some(summary.to_string()),
            description: description.map(str::to_string),
            location: None,
            start: None,
            end: None,
            attendees: Vec::new(),
            created: None,
            updated: None,
        }
    }

    #[test]
    fn mentions_any_checks_summary_and_description() {
        let keywords = ["clase", "curso"];
        assert!(event("Clase de Álgebra", None).mentions_any(&keywords));
        assert!(event("Reunión", Some("Tema del CURSO")).mentions_any(&keywords));
        assert!(!event("Dentista", Some("control")).mentions_any(&keywords));
    }

    #[test]
    fn insert_event_serializes_flat_body() {
        let start = DateTime::parse_from_rfc3339("2025-03-10T10:00:00-03:00").unwrap();
        let end = DateTime::parse_from_rfc3339("2025-03-10T11:00:00-03:00").unwrap();
        let request = InsertEvent::new(
            "Clase",
            EventDateTime::at(start, "America/Argentina/Buenos_Aires"),
            EventDateTime::at(end, "America/Argentina/Buenos_Aires"),
        )
        .attendees(vec![Attendee::new("ana@example.com")])
        .reminders(Reminders {
            use_default: false,
            overrides: vec![ReminderOverride {
                method: ReminderMethod::Popup,
                minutes: 30,
            }],
        });

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["summary"], "Clase");
        assert_eq!(body["start"]["timeZone"], "America/Argentina/Buenos_Aires");
        assert_eq!(body["attendees"][0]["email"], "ana@example.com");
        assert_eq!(body["reminders"]["useDefault"], false);
        assert_eq!(body["reminders"]["overrides"][0]["method"], "popup");
        assert!(body.get("description").is_none());
        assert_eq!(request.endpoint(), "/calendar/v3/calendars/primary/events");
    }
}
