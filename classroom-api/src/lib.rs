pub mod endpoints;
mod error;
mod macros;
pub mod repositories;

pub use crate::error::{ClassroomApiError, ErrorDetail};
use repositories::*;
use secrecy::{ExposeSecret, SecretString};
use tower_api_client::{Client as ApiClient, Request as ApiRequest};

const CLASSROOM_BASE_URL: &str = "https://classroom.googleapis.com/v1";
const GOOGLE_APIS_BASE_URL: &str = "https://www.googleapis.com";

/// Which Google host a request is served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Classroom,
    GoogleApis,
}

/// A request that knows which Google host it belongs to.
pub trait GoogleRequest: ApiRequest {
    const SERVICE: Service;
}

pub struct Client {
    classroom: ApiClient,
    google: ApiClient,
}

impl Client {
    pub fn new(access_token: &SecretString) -> Self {
        Self::with_base_urls(access_token, CLASSROOM_BASE_URL, GOOGLE_APIS_BASE_URL)
    }

    /// Point the client at alternative hosts (emulators, recorded fixtures).
    pub fn with_base_urls(
        access_token: &SecretString,
        classroom_base_url: &str,
        google_base_url: &str,
    ) -> Self {
        let token = access_token.expose_secret();
        Self {
            classroom: ApiClient::new(classroom_base_url).bearer_auth(token),
            google: ApiClient::new(google_base_url).bearer_auth(token),
        }
    }

    pub async fn send<R>(&self, request: R) -> Result<R::Response, ClassroomApiError>
    where
        R: GoogleRequest,
    {
        let inner = match R::SERVICE {
            Service::Classroom => &self.classroom,
            Service::GoogleApis => &self.google,
        };
        inner.send(request).await.map_err(From::from)
    }
}

pub struct Request;

impl Request {
    pub fn courses() -> CourseRepository {
        CourseRepository::new()
    }

    pub fn course_work(course_id: impl Into<String>) -> CourseWorkRepository {
        CourseWorkRepository::new(course_id)
    }

    pub fn students(course_id: impl Into<String>) -> StudentRepository {
        StudentRepository::new(course_id)
    }

    pub fn submissions(
        course_id: impl Into<String>,
        course_work_id: impl Into<String>,
    ) -> SubmissionRepository {
        SubmissionRepository::new(course_id, course_work_id)
    }

    pub fn calendar() -> CalendarRepository {
        CalendarRepository::new()
    }

    pub fn userinfo() -> UserInfoRepository {
        UserInfoRepository::new()
    }
}
