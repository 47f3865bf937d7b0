use chrono::{DateTime, Duration, Utc};
use classroom_api::endpoints::{course_work::CourseWork, students::Student};
use serde::{Serialize, Serializer};

use super::classroom_source::ClassroomSource;
use super::notifier::{
    Channel, EmailChannel, NotificationData, NotificationDispatcher, NotificationType, Recipient,
    WhatsAppChannel,
};
use crate::server::error::ServerError;

/// How far back a course work item counts as new.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NewTaskWindow {
    ThirtyMinutes,
    #[default]
    OneHour,
    TwoHours,
    OneDay,
}

impl NewTaskWindow {
    /// Unrecognised or missing values fall back to one hour.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("30m") => Self::ThirtyMinutes,
            Some("2h") => Self::TwoHours,
            Some("24h") => Self::OneDay,
            _ => Self::OneHour,
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            Self::ThirtyMinutes => Duration::minutes(30),
            Self::OneHour => Duration::hours(1),
            Self::TwoHours => Duration::hours(2),
            Self::OneDay => Duration::hours(24),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThirtyMinutes => "30m",
            Self::OneHour => "1h",
            Self::TwoHours => "2h",
            Self::OneDay => "24h",
        }
    }
}

impl Serialize for NewTaskWindow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

pub fn is_new(work: &CourseWork, now: DateTime<Utc>, window: NewTaskWindow) -> bool {
    work.creation_time
        .is_some_and(|created| created >= now - window.duration())
}

pub fn detect_new(
    works: &[CourseWork],
    now: DateTime<Utc>,
    window: NewTaskWindow,
) -> Vec<&CourseWork> {
    works.iter().filter(|w| is_new(w, now, window)).collect()
}

/// Students with an email address, addressed by email only.
pub fn roster_recipients(students: &[Student]) -> Vec<Recipient> {
    students
        .iter()
        .filter_map(|student| {
            let email = student.email()?;
            Some(Recipient {
                email: email.to_string(),
                phone: None,
                name: Some(student.full_name().unwrap_or("Estudiante").to_string()),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskNotificationResult {
    pub course_id: String,
    pub course_name: String,
    pub task_id: String,
    pub task_title: String,
    pub recipients: usize,
    pub emails_sent: usize,
    pub whatsapp_sent: usize,
    pub errors: usize,
}

/// Notify every course's students about course work created inside `window`.
///
/// Courses whose course work or roster cannot be read are logged and skipped.
pub async fn notify_new_tasks<S, E, W>(
    source: &S,
    dispatcher: &NotificationDispatcher<E, W>,
    teacher_name: &str,
    window: NewTaskWindow,
    now: DateTime<Utc>,
) -> Result<Vec<TaskNotificationResult>, ServerError>
where
    S: ClassroomSource,
    E: EmailChannel,
    W: WhatsAppChannel,
{
    let courses = source.courses().await?;
    let mut results = Vec::new();

    for course in courses {
        let works = match source.course_work(&course.id).await {
            Ok(works) => works,
            Err(e) => {
                tracing::warn!(course_id = %course.id, error = %e, "Skipping course: course work unavailable");
                continue;
            }
        };

        let new_tasks = detect_new(&works, now, window);
        if new_tasks.is_empty() {
            continue;
        }

        let recipients = match source.students(&course.id).await {
            Ok(students) => roster_recipients(&students),
            Err(e) => {
                tracing::warn!(course_id = %course.id, error = %e, "Skipping course: roster unavailable");
                continue;
            }
        };

        let course_name = if course.name.is_empty() {
            "Curso".to_string()
        } else {
            course.name.clone()
        };

        for task in new_tasks {
            let task_title = if task.title.is_empty() {
                "Nueva tarea".to_string()
            } else {
                task.title.clone()
            };
            let data = NotificationData {
                task_title: task_title.clone(),
                course_name: course_name.clone(),
                student_name: None,
                teacher_name: Some(teacher_name.to_string()),
                due_date: task.due_date.map(|d| d.to_string()),
                submission_date: None,
            };

            tracing::info!(
                course_id = %course.id,
                task_id = %task.id,
                recipients = recipients.len(),
                "Notifying new task"
            );
            let report = dispatcher
                .notify(&recipients, NotificationType::NewTask, &data)
                .await;

            results.push(TaskNotificationResult {
                course_id: course.id.clone(),
                course_name: course_name.clone(),
                task_id: task.id.clone(),
                task_title,
                recipients: recipients.len(),
                emails_sent: report.sent_on(Channel::Email),
                whatsapp_sent: report.sent_on(Channel::Whatsapp),
                errors: report.failed,
            });
        }
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::services::classroom_source::tests::{course, student, work, FakeClassroom};
    use crate::server::services::notifier::tests::FakeChannel;

    fn now() -> DateTime<Utc> {
        "2025-03-01T12:30:00Z".parse().unwrap()
    }

    fn created_at(id: &str, at: &str) -> CourseWork {
        let mut w = work("c1", id, "TP");
        w.creation_time = Some(at.parse().unwrap());
        w
    }

    #[test]
    fn window_parsing_falls_back_to_one_hour() {
        assert_eq!(NewTaskWindow::parse(Some("30m")), NewTaskWindow::ThirtyMinutes);
        assert_eq!(NewTaskWindow::parse(Some("24h")), NewTaskWindow::OneDay);
        assert_eq!(NewTaskWindow::parse(Some("3d")), NewTaskWindow::OneHour);
        assert_eq!(NewTaskWindow::parse(None), NewTaskWindow::OneHour);
        assert_eq!(NewTaskWindow::TwoHours.duration(), Duration::hours(2));
    }

    #[test]
    fn creation_time_decides_newness() {
        let works = vec![
            created_at("fresh", "2025-03-01T12:00:00Z"),
            created_at("edge", "2025-03-01T11:30:00Z"),
            created_at("old", "2025-03-01T11:29:59Z"),
        ];
        let ids = detect_new(&works, now(), NewTaskWindow::OneHour)
            .into_iter()
            .map(|w| w.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["fresh", "edge"]);

        let mut undated = created_at("x", "2025-03-01T12:00:00Z");
        undated.creation_time = None;
        assert!(!is_new(&undated, now(), NewTaskWindow::OneDay));
    }

    #[test]
    fn recipients_need_an_email() {
        let students = vec![
            student("c1", "u1", "Ana", "ana@x.org"),
            student("c1", "u2", "Beto", ""),
        ];
        let recipients = roster_recipients(&students);
        assert_eq!(recipients.len(), 1);
        assert_eq!(recipients[0].name.as_deref(), Some("Ana"));
    }

    #[tokio::test]
    async fn notifies_each_new_task_and_skips_broken_courses() {
        let mut classroom = FakeClassroom {
            courses: vec![course("c1", "Álgebra"), course("c2", "Historia")],
            failing: vec!["work:c2".to_string()],
            ..Default::default()
        };
        classroom.course_work.insert(
            "c1".into(),
            vec![
                created_at("w1", "2025-03-01T12:00:00Z"),
                created_at("w2", "2025-02-01T12:00:00Z"),
            ],
        );
        classroom.students.insert(
            "c1".into(),
            vec![
                student("c1", "u1", "Ana", "ana@x.org"),
                student("c1", "u2", "Beto", "beto@x.org"),
            ],
        );
        let dispatcher = NotificationDispatcher::new(FakeChannel::default(), FakeChannel::default());

        let results = notify_new_tasks(&classroom, &dispatcher, "Prof", NewTaskWindow::OneHour, now())
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].task_id, "w1");
        assert_eq!(results[0].course_name, "Álgebra");
        assert_eq!(results[0].recipients, 2);
        assert_eq!(results[0].emails_sent, 2);
        assert_eq!(results[0].whatsapp_sent, 0);
        assert_eq!(results[0].errors, 0);
    }

    #[tokio::test]
    async fn repeated_runs_report_the_same_tasks() {
        let mut classroom = FakeClassroom {
            courses: vec![course("c1", "Álgebra")],
            ..Default::default()
        };
        classroom
            .course_work
            .insert("c1".into(), vec![created_at("w1", "2025-03-01T12:00:00Z")]);
        let dispatcher = NotificationDispatcher::new(FakeChannel::default(), FakeChannel::default());

        for _ in 0..2 {
            let results =
                notify_new_tasks(&classroom, &dispatcher, "Prof", NewTaskWindow::OneHour, now())
                    .await
                    .unwrap();
            assert_eq!(results.len(), 1);
        }
    }
}
