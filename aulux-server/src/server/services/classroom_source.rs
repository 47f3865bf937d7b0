use classroom_api::{
    endpoints::{
        course_work::CourseWork, courses::Course, students::Student,
        submissions::StudentSubmission,
    },
    Client, Request,
};
use futures::{stream, StreamExt};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;

use crate::server::error::ServerError;

/// Read access to the Classroom resources the reports are built from.
pub trait ClassroomSource: Send + Sync {
    fn courses(&self) -> impl Future<Output = Result<Vec<Course>, ServerError>> + Send;

    fn course_work(
        &self,
        course_id: &str,
    ) -> impl Future<Output = Result<Vec<CourseWork>, ServerError>> + Send;

    fn students(
        &self,
        course_id: &str,
    ) -> impl Future<Output = Result<Vec<Student>, ServerError>> + Send;

    fn submissions(
        &self,
        course_id: &str,
        course_work_id: &str,
    ) -> impl Future<Output = Result<Vec<StudentSubmission>, ServerError>> + Send;
}

/// The signed-in user's view of Google Classroom. Reads the first page only.
pub struct GoogleClassroom {
    client: Client,
    page_size: u32,
}

impl GoogleClassroom {
    pub fn new(client: Client, page_size: u32) -> Self {
        Self { client, page_size }
    }
}

impl ClassroomSource for GoogleClassroom {
    async fn courses(&self) -> Result<Vec<Course>, ServerError> {
        let response = self
            .client
            .send(Request::courses().list().page_size(self.page_size))
            .await?;
        Ok(response.courses)
    }

    async fn course_work(&self, course_id: &str) -> Result<Vec<CourseWork>, ServerError> {
        let response = self
            .client
            .send(Request::course_work(course_id).list().page_size(self.page_size))
            .await?;
        Ok(response.course_work)
    }

    async fn students(&self, course_id: &str) -> Result<Vec<Student>, ServerError> {
        let response = self
            .client
            .send(Request::students(course_id).list().page_size(self.page_size))
            .await?;
        Ok(response.students)
    }

    async fn submissions(
        &self,
        course_id: &str,
        course_work_id: &str,
    ) -> Result<Vec<StudentSubmission>, ServerError> {
        let response = self
            .client
            .send(Request::submissions(course_id, course_work_id).list())
            .await?;
        Ok(response.student_submissions)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GatherOptions {
    pub concurrency: usize,
    pub timeout: Duration,
}

/// A fetch that failed or timed out and was left out of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartialFailure {
    pub scope: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct CourseWorkSnapshot {
    pub work: CourseWork,
    pub submissions: Vec<StudentSubmission>,
}

#[derive(Debug, Clone)]
pub struct CourseSnapshot {
    pub course: Course,
    pub students: Vec<Student>,
    pub course_work: Vec<CourseWorkSnapshot>,
}

#[derive(Debug, Clone, Default)]
pub struct ClassroomSnapshot {
    pub courses: Vec<CourseSnapshot>,
    pub failures: Vec<PartialFailure>,
}

async fn with_timeout<T>(
    timeout: Duration,
    fut: impl Future<Output = Result<T, ServerError>>,
) -> Result<T, String> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("timed out after {}s", timeout.as_secs())),
    }
}

/// Fetch every course with its roster, course work and submissions.
///
/// Only a failure to list courses is fatal. Any other failed fetch is
/// recorded in `failures` and its data is skipped: a course whose course
/// work cannot be listed is dropped, a missing roster leaves it empty, and
/// a course work item whose submissions fail is dropped.
pub async fn gather<S: ClassroomSource>(
    source: &S,
    options: GatherOptions,
) -> Result<ClassroomSnapshot, ServerError> {
    let concurrency = options.concurrency.max(1);
    let courses = tokio::time::timeout(options.timeout, source.courses())
        .await
        .map_err(|_| ServerError::Upstream {
            status: axum::http::StatusCode::GATEWAY_TIMEOUT,
            message: "Timed out listing courses".to_string(),
            details: None,
        })??;

    let mut failures = Vec::new();

    let per_course = stream::iter(courses)
        .map(|course| async move {
            let (students, work) = tokio::join!(
                with_timeout(options.timeout, source.students(&course.id)),
                with_timeout(options.timeout, source.course_work(&course.id)),
            );
            (course, students, work)
        })
        .buffered(concurrency)
        .collect::<Vec<_>>()
        .await;

    let mut pending = Vec::new();
    for (course, students, work) in per_course {
        let students = students.unwrap_or_else(|message| {
            failures.push(PartialFailure {
                scope: format!("courses/{}/students", course.id),
                message,
            });
            Vec::new()
        });
        match work {
            Ok(work) => pending.push((course, students, work)),
            Err(message) => failures.push(PartialFailure {
                scope: format!("courses/{}/courseWork", course.id),
                message,
            }),
        }
    }

    let jobs = pending
        .iter()
        .enumerate()
        .flat_map(|(index, (course, _, work))| {
            work.iter()
                .map(move |w| (index, course.id.clone(), w.clone()))
        })
        .collect::<Vec<_>>();

    let fetched = stream::iter(jobs)
        .map(|(index, course_id, work)| async move {
            let result =
                with_timeout(options.timeout, source.submissions(&course_id, &work.id)).await;
            (index, course_id, work, result)
        })
        .buffered(concurrency)
        .collect::<Vec<_>>()
        .await;

    let mut by_course: Vec<Vec<CourseWorkSnapshot>> = vec![Vec::new(); pending.len()];
    for (index, course_id, work, result) in fetched {
        match result {
            Ok(submissions) => by_course[index].push(CourseWorkSnapshot { work, submissions }),
            Err(message) => failures.push(PartialFailure {
                scope: format!(
                    "courses/{}/courseWork/{}/studentSubmissions",
                    course_id, work.id
                ),
                message,
            }),
        }
    }

    for failure in &failures {
        tracing::warn!(scope = %failure.scope, error = %failure.message, "Classroom fetch failed");
    }

    let courses = pending
        .into_iter()
        .zip(by_course)
        .map(|((course, students, _), course_work)| CourseSnapshot {
            course,
            students,
            course_work,
        })
        .collect();

    Ok(ClassroomSnapshot { courses, failures })
}
