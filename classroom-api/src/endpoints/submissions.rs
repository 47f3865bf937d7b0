use super::PageQuery;
use crate::{GoogleRequest, Service, macros::setter};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tower_api_client::{Request, RequestData};

// Common

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSubmission {
    pub id: String,
    #[serde(default)]
    pub course_id: String,
    #[serde(default)]
    pub course_work_id: String,
    #[serde(default)]
    pub user_id: String,
    pub state: Option<SubmissionState>,
    pub creation_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
    pub late: Option<bool>,
    pub assigned_grade: Option<f64>,
    pub draft_grade: Option<f64>,
    pub alternate_link: Option<String>,
}

impl StudentSubmission {
    pub fn is_graded(&self) -> bool {
        self.assigned_grade.is_some()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionState {
    New,
    Created,
    TurnedIn,
    Returned,
    ReclaimedByStudent,
    #[serde(other)]
    SubmissionStateUnspecified,
}

impl SubmissionState {
    /// Whether the student has handed the work in (possibly already returned).
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::TurnedIn | Self::Returned)
    }
}

// Requests

#[derive(Debug, Clone, Serialize)]
pub struct ListSubmissions {
    #[serde(skip)]
    course_id: String,
    #[serde(skip)]
    course_work_id: String,
    #[serde(flatten)]
    page: PageQuery,
}

impl ListSubmissions {
    pub fn new(course_id: impl Into<String>, course_work_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            course_work_id: course_work_id.into(),
            page: PageQuery::default(),
        }
    }

    setter!(opt page.page_size: u32);
    setter!(opt page.page_token: String);
}

impl Request for ListSubmissions {
    type Data = Self;
    type Response = ListSubmissionsResponse;

    fn endpoint(&self) -> Cow<'_, str> {
        format!(
            "/courses/{}/courseWork/{}/studentSubmissions",
            self.course_id, self.course_work_id
        )
        .into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Query(self)
    }
}

impl GoogleRequest for ListSubmissions {
    const SERVICE: Service = Service::Classroom;
}

// Responses

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSubmissionsResponse {
    #[serde(default)]
    pub student_submissions: Vec<StudentSubmission>,
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_deserialize() {
        let states: Vec<SubmissionState> = serde_json::from_str(
            r#"["NEW", "CREATED", "TURNED_IN", "RETURNED", "RECLAIMED_BY_STUDENT", "BOGUS"]"#,
        )
        .unwrap();
        assert_eq!(
            states,
            vec![
                SubmissionState::New,
                SubmissionState::Created,
                SubmissionState::TurnedIn,
                SubmissionState::Returned,
                SubmissionState::ReclaimedByStudent,
                SubmissionState::SubmissionStateUnspecified,
            ]
        );
    }

    #[test]
    fn delivered_states() {
        assert!(SubmissionState::TurnedIn.is_delivered());
        assert!(SubmissionState::Returned.is_delivered());
        assert!(!SubmissionState::ReclaimedByStudent.is_delivered());
        assert!(!SubmissionState::New.is_delivered());
    }

    #[test]
    fn endpoint_nests_course_work() {
        assert_eq!(
            ListSubmissions::new("c1", "w9").endpoint(),
            "/courses/c1/courseWork/w9/studentSubmissions"
        );
    }
}
