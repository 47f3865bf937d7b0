use crate::endpoints::{
    calendar::{EventDateTime, InsertEvent, ListEvents},
    course_work::ListCourseWork,
    courses::{GetCourse, ListCourses},
    students::ListStudents,
    submissions::ListSubmissions,
    userinfo::GetUserInfo,
};
use chrono::{DateTime, Utc};

pub struct CourseRepository;

impl CourseRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn list(&self) -> ListCourses {
        ListCourses::new()
    }

    pub fn get(&self, course_id: impl Into<String>) -> GetCourse {
        GetCourse::new(course_id)
    }
}

pub struct CourseWorkRepository {
    course_id: String,
}

impl CourseWorkRepository {
    pub fn new(course_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
        }
    }

    pub fn list(&self) -> ListCourseWork {
        ListCourseWork::new(self.course_id.clone())
    }
}

pub struct StudentRepository {
    course_id: String,
}

impl StudentRepository {
    pub fn new(course_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
        }
    }

    pub fn list(&self) -> ListStudents {
        ListStudents::new(self.course_id.clone())
    }
}

pub struct SubmissionRepository {
    course_id: String,
    course_work_id: String,
}

impl SubmissionRepository {
    pub fn new(course_id: impl Into<String>, course_work_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            course_work_id: course_work_id.into(),
        }
    }

    pub fn list(&self) -> ListSubmissions {
        ListSubmissions::new(self.course_id.clone(), self.course_work_id.clone())
    }
}

pub struct CalendarRepository;

impl CalendarRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn list(&self, time_min: DateTime<Utc>, time_max: DateTime<Utc>) -> ListEvents {
        ListEvents::new(time_min, time_max)
    }

    pub fn insert(
        &self,
        summary: impl Into<String>,
        start: EventDateTime,
        end: EventDateTime,
    ) -> InsertEvent {
        InsertEvent::new(summary, start, end)
    }
}

pub struct UserInfoRepository;

impl UserInfoRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn get(&self) -> GetUserInfo {
        GetUserInfo
    }
}
