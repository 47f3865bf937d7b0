use super::{Date, PageQuery, TimeOfDay, deadline};
use crate::{GoogleRequest, Service, macros::setter};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tower_api_client::{Request, RequestData};

// Common

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseWork {
    pub id: String,
    #[serde(default)]
    pub course_id: String,
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub state: Option<CourseWorkState>,
    pub work_type: Option<String>,
    pub alternate_link: Option<String>,
    pub creation_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
    pub due_date: Option<Date>,
    pub due_time: Option<TimeOfDay>,
    pub max_points: Option<f64>,
}

impl CourseWork {
    /// The instant after which a delivery counts as late, if a due date is set.
    pub fn deadline(&self) -> Option<NaiveDateTime> {
        self.due_date
            .as_ref()
            .and_then(|date| deadline(date, self.due_time.as_ref()))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourseWorkState {
    Published,
    Draft,
    Deleted,
    #[serde(other)]
    CourseWorkStateUnspecified,
}

// Requests

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCourseWork {
    #[serde(skip)]
    course_id: String,
    #[serde(flatten)]
    page: PageQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_by: Option<String>,
}

impl ListCourseWork {
    pub fn new(course_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            page: PageQuery::default(),
            order_by: None,
        }
    }

    setter!(opt page.page_size: u32);
    setter!(opt page.page_token: String);
    setter!(opt order_by: String);
}

impl Request for ListCourseWork {
    type Data = Self;
    type Response = ListCourseWorkResponse;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/courses/{}/courseWork", self.course_id).into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Query(self)
    }
}

impl GoogleRequest for ListCourseWork {
    const SERVICE: Service = Service::Classroom;
}

// Responses

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCourseWorkResponse {
    #[serde(default)]
    pub course_work: Vec<CourseWork>,
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_google_payload() {
        let json = r#"{
            "courseWork": [{
                "id": "w1",
                "courseId": "c1",
                "title": "Ensayo",
                "state": "PUBLISHED",
                "creationTime": "2025-03-01T10:00:00.123Z",
                "dueDate": {"year": 2025, "month": 3, "day": 10},
                "dueTime": {"hours": 23, "minutes": 59}
            }]
        }"#;
        let response: ListCourseWorkResponse = serde_json::from_str(json).unwrap();
        let work = &response.course_work[0];
        assert_eq!(work.title, "Ensayo");
        assert_eq!(work.state, Some(CourseWorkState::Published));
        assert_eq!(
            work.deadline().map(|d| d.to_string()),
            Some("2025-03-10 23:59:00".to_string())
        );
    }

    #[test]
    fn no_due_date_means_no_deadline() {
        let work: CourseWork = serde_json::from_str(r#"{"id": "w1"}"#).unwrap();
        assert_eq!(work.deadline(), None);
    }

    #[test]
    fn endpoint_includes_course() {
        assert_eq!(ListCourseWork::new("42").endpoint(), "/courses/42/courseWork");
    }
}
