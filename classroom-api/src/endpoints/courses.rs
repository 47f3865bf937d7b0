use super::PageQuery;
use crate::{GoogleRequest, Service, macros::setter};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tower_api_client::{Request, RequestData};

// Common

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub section: Option<String>,
    pub description_heading: Option<String>,
    pub room: Option<String>,
    pub owner_id: Option<String>,
    pub course_state: Option<CourseState>,
    pub alternate_link: Option<String>,
    pub creation_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourseState {
    Active,
    Archived,
    Provisioned,
    Declined,
    Suspended,
    #[serde(other)]
    CourseStateUnspecified,
}

// Requests

#[derive(Default, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCourses {
    #[serde(flatten)]
    page: PageQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    student_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    teacher_id: Option<String>,
}

impl ListCourses {
    pub fn new() -> Self {
        Self::default()
    }

    setter!(opt page.page_size: u32);
    setter!(opt page.page_token: String);
    setter!(opt student_id: String);
    setter!(opt teacher_id: String);
}

impl Request for ListCourses {
    type Data = Self;
    type Response = ListCoursesResponse;

    fn endpoint(&self) -> Cow<'_, str> {
        "/courses".into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Query(self)
    }
}

impl GoogleRequest for ListCourses {
    const SERVICE: Service = Service::Classroom;
}

#[derive(Debug, Clone, Serialize)]
pub struct GetCourse {
    course_id: String,
}

impl GetCourse {
    pub fn new(course_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
        }
    }
}

impl Request for GetCourse {
    type Data = ();
    type Response = Course;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/courses/{}", self.course_id).into()
    }
}

impl GoogleRequest for GetCourse {
    const SERVICE: Service = Service::Classroom;
}

// Responses

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCoursesResponse {
    #[serde(default)]
    pub courses: Vec<Course>,
    pub next_page_token: Option<String>,
}
