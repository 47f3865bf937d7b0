use super::PageQuery;
use crate::{GoogleRequest, Service, macros::setter};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tower_api_client::{Request, RequestData};

// Common

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(default)]
    pub course_id: String,
    pub user_id: String,
    pub profile: Option<UserProfile>,
}

impl Student {
    pub fn full_name(&self) -> Option<&str> {
        self.profile
            .as_ref()
            .and_then(|p| p.name.as_ref())
            .and_then(|n| n.full_name.as_deref())
    }

    pub fn email(&self) -> Option<&str> {
        self.profile
            .as_ref()
            .and_then(|p| p.email_address.as_deref())
            .filter(|e| !e.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Option<String>,
    pub name: Option<Name>,
    pub email_address: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Name {
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub full_name: Option<String>,
}

// Requests

#[derive(Debug, Clone, Serialize)]
pub struct ListStudents {
    #[serde(skip)]
    course_id: String,
    #[serde(flatten)]
    page: PageQuery,
}

impl ListStudents {
    pub fn new(course_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            page: PageQuery::default(),
        }
    }

    setter!(opt page.page_size: u32);
    setter!(opt page.page_token: String);
}

impl Request for ListStudents {
    type Data = Self;
    type Response = ListStudentsResponse;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/courses/{}/students", self.course_id).into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Query(self)
    }
}

impl GoogleRequest for ListStudents {
    const SERVICE: Service = Service::Classroom;
}

// Responses

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListStudentsResponse {
    #[serde(default)]
    pub students: Vec<Student>,
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_accessors() {
        let student: Student = serde_json::from_str(
            r#"{
                "courseId": "c1",
                "userId": "u1",
                "profile": {
                    "name": {"fullName": "Ana Gómez"},
                    "emailAddress": "ana@example.com"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(student.full_name(), Some("Ana Gómez"));
        assert_eq!(student.email(), Some("ana@example.com"));
    }

    #[test]
    fn empty_email_is_treated_as_absent() {
        let student: Student = serde_json::from_str(
            r#"{"userId": "u1", "profile": {"emailAddress": ""}}"#,
        )
        .unwrap();
        assert_eq!(student.email(), None);
        assert_eq!(student.full_name(), None);
    }
}
