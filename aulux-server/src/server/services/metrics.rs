//! Course progress, student risk and assignment health derived from a
//! [`ClassroomSnapshot`]. Everything here is pure; reports are rebuilt on
//! every request.

use classroom_api::endpoints::{
    course_work::CourseWork,
    submissions::{StudentSubmission, SubmissionState},
};
use itertools::Itertools;
use serde::Serialize;
use std::collections::BTreeMap;

use super::classroom_source::{ClassroomSnapshot, CourseSnapshot, PartialFailure};
use crate::server::models::percentage;

const AT_RISK_PENDING: usize = 3;
const AT_RISK_LATE: usize = 2;
const LOW_GRADE: f64 = 70.0;
const PROBLEMATIC_SCORE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubmissionOutcome {
    OnTime,
    Late,
    Missing,
}

/// Classify one submission against its course work's deadline.
pub fn classify(work: &CourseWork, submission: &StudentSubmission) -> SubmissionOutcome {
    let delivered = submission
        .state
        .as_ref()
        .is_some_and(SubmissionState::is_delivered);
    if !delivered {
        return SubmissionOutcome::Missing;
    }

    let deadline = match work.deadline() {
        Some(deadline) => deadline.and_utc(),
        None => return SubmissionOutcome::OnTime,
    };
    match submission.update_time {
        Some(updated) if updated > deadline => SubmissionOutcome::Late,
        _ => SubmissionOutcome::OnTime,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CourseHealth {
    Excelente,
    Bueno,
    RequiereAtencion,
    EnRiesgo,
}

impl CourseHealth {
    pub fn from_completion(completion_rate: u32) -> Self {
        match completion_rate {
            85.. => Self::Excelente,
            70.. => Self::Bueno,
            50.. => Self::RequiereAtencion,
            _ => Self::EnRiesgo,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    pub course_id: String,
    pub course_name: String,
    pub total: usize,
    pub on_time: usize,
    pub late: usize,
    pub missing: usize,
    pub completed: usize,
    pub on_time_rate: u32,
    pub late_rate: u32,
    pub missing_rate: u32,
    pub completion_rate: u32,
    pub assigned_tasks: usize,
    pub pending_reviews: usize,
    pub health: CourseHealth,
}

pub fn course_progress(snapshot: &CourseSnapshot) -> CourseProgress {
    let (mut on_time, mut late, mut missing, mut pending_reviews) = (0, 0, 0, 0);
    for item in &snapshot.course_work {
        for submission in &item.submissions {
            match classify(&item.work, submission) {
                SubmissionOutcome::OnTime => on_time += 1,
                SubmissionOutcome::Late => late += 1,
                SubmissionOutcome::Missing => missing += 1,
            }
            if submission.state == Some(SubmissionState::TurnedIn) && !submission.is_graded() {
                pending_reviews += 1;
            }
        }
    }

    let total = on_time + late + missing;
    let completed = on_time + late;
    let completion_rate = percentage(completed, total);
    CourseProgress {
        course_id: snapshot.course.id.clone(),
        course_name: snapshot.course.name.clone(),
        total,
        on_time,
        late,
        missing,
        completed,
        on_time_rate: percentage(on_time, total),
        late_rate: percentage(late, total),
        missing_rate: percentage(missing, total),
        completion_rate,
        assigned_tasks: snapshot.course_work.len(),
        pending_reviews,
        health: CourseHealth::from_completion(completion_rate),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StudentStatus {
    AtRisk,
    OnTrack,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRisk {
    pub user_id: String,
    pub name: String,
    pub email: Option<String>,
    pub courses: Vec<String>,
    pub pending: usize,
    pub late: usize,
    pub delivered: usize,
    pub at_risk: bool,
    pub status: StudentStatus,
}

pub fn is_at_risk(pending: usize, late: usize) -> bool {
    pending >= AT_RISK_PENDING || late >= AT_RISK_LATE
}

/// One entry per user id, merged across every course roster and submission.
pub fn student_risks(snapshot: &ClassroomSnapshot) -> Vec<StudentRisk> {
    let mut students: BTreeMap<String, StudentRisk> = BTreeMap::new();
    let blank = |user_id: &str| StudentRisk {
        user_id: user_id.to_string(),
        name: "Estudiante".to_string(),
        email: None,
        courses: Vec::new(),
        pending: 0,
        late: 0,
        delivered: 0,
        at_risk: false,
        status: StudentStatus::OnTrack,
    };

    for course in &snapshot.courses {
        for student in &course.students {
            let entry = students
                .entry(student.user_id.clone())
                .or_insert_with(|| blank(&student.user_id));
            if let Some(name) = student.full_name() {
                entry.name = name.to_string();
            }
            if let Some(email) = student.email() {
                entry.email = Some(email.to_string());
            }
            if !entry.courses.contains(&course.course.name) {
                entry.courses.push(course.course.name.clone());
            }
        }

        for item in &course.course_work {
            for submission in &item.submissions {
                if submission.user_id.is_empty() {
                    continue;
                }
                let entry = students
                    .entry(submission.user_id.clone())
                    .or_insert_with(|| blank(&submission.user_id));
                match classify(&item.work, submission) {
                    SubmissionOutcome::OnTime => entry.delivered += 1,
                    SubmissionOutcome::Late => {
                        entry.delivered += 1;
                        entry.late += 1;
                    }
                    SubmissionOutcome::Missing => entry.pending += 1,
                }
            }
        }
    }

    students
        .into_values()
        .map(|mut student| {
            student.at_risk = is_at_risk(student.pending, student.late);
            student.status = if student.at_risk {
                StudentStatus::AtRisk
            } else {
                StudentStatus::OnTrack
            };
            student
        })
        .sorted_by(|a, b| {
            b.at_risk
                .cmp(&a.at_risk)
                .then_with(|| b.pending.cmp(&a.pending))
                .then_with(|| a.name.cmp(&b.name))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentProblem {
    pub course_id: String,
    pub course_name: String,
    pub course_work_id: String,
    pub title: String,
    pub resubmissions: usize,
    pub low_grades: usize,
    pub problem_score: usize,
    pub total_submissions: usize,
    pub problematic: bool,
}

/// Assignments ordered by problem score, worst first.
pub fn assignment_problems(snapshot: &ClassroomSnapshot) -> Vec<AssignmentProblem> {
    snapshot
        .courses
        .iter()
        .flat_map(|course| {
            course.course_work.iter().map(move |item| {
                let resubmissions = item
                    .submissions
                    .iter()
                    .filter(|s| s.state == Some(SubmissionState::Returned))
                    .count();
                let low_grades = item
                    .submissions
                    .iter()
                    .filter(|s| s.assigned_grade.is_some_and(|g| g < LOW_GRADE))
                    .count();
                let problem_score = resubmissions + low_grades;
                AssignmentProblem {
                    course_id: course.course.id.clone(),
                    course_name: course.course.name.clone(),
                    course_work_id: item.work.id.clone(),
                    title: item.work.title.clone(),
                    resubmissions,
                    low_grades,
                    problem_score,
                    total_submissions: item.submissions.len(),
                    problematic: problem_score > PROBLEMATIC_SCORE,
                }
            })
        })
        .sorted_by(|a, b| b.problem_score.cmp(&a.problem_score))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GradeDistribution {
    pub excellent: usize,
    pub good: usize,
    pub regular: usize,
    pub poor: usize,
}

impl GradeDistribution {
    fn add(&mut self, grade: f64) {
        match grade {
            g if g >= 90.0 => self.excellent += 1,
            g if g >= 70.0 => self.good += 1,
            g if g >= 50.0 => self.regular += 1,
            _ => self.poor += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseGrades {
    pub course_id: String,
    pub course_name: String,
    pub average_grade: Option<f64>,
    pub graded_count: usize,
    pub distribution: GradeDistribution,
}

fn grades(snapshot: &CourseSnapshot) -> impl Iterator<Item = f64> + '_ {
    snapshot
        .course_work
        .iter()
        .flat_map(|item| item.submissions.iter())
        .filter_map(|s| s.assigned_grade)
}

fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    Some((mean * 10.0).round() / 10.0)
}

pub fn course_grades(snapshot: &CourseSnapshot) -> CourseGrades {
    let values = grades(snapshot).collect::<Vec<_>>();
    let mut distribution = GradeDistribution::default();
    values.iter().for_each(|g| distribution.add(*g));
    CourseGrades {
        course_id: snapshot.course.id.clone(),
        course_name: snapshot.course.name.clone(),
        average_grade: average(&values),
        graded_count: values.len(),
        distribution,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSummary {
    pub total_courses: usize,
    pub total_students: usize,
    pub total_on_time: usize,
    pub total_late: usize,
    pub total_missing: usize,
    pub students_on_track: usize,
    pub students_at_risk: usize,
    pub average_grade: Option<f64>,
    pub problematic_tasks: usize,
}

/// `GET /api/metrics`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub courses: Vec<CourseProgress>,
    pub students: Vec<StudentRisk>,
    pub summary: MetricsSummary,
    pub partial_failures: Vec<PartialFailure>,
}

/// `GET /api/metrics/coordinator`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinatorReport {
    pub courses: Vec<CourseProgress>,
    pub students: Vec<StudentRisk>,
    pub assignments: Vec<AssignmentProblem>,
    pub grades: Vec<CourseGrades>,
    pub summary: MetricsSummary,
    pub partial_failures: Vec<PartialFailure>,
}

pub fn coordinator_report(snapshot: &ClassroomSnapshot) -> CoordinatorReport {
    let courses = snapshot.courses.iter().map(course_progress).collect_vec();
    let students = student_risks(snapshot);
    let assignments = assignment_problems(snapshot);
    let grades = snapshot.courses.iter().map(course_grades).collect_vec();

    let all_grades = snapshot.courses.iter().flat_map(grades_of).collect_vec();
    let students_at_risk = students.iter().filter(|s| s.at_risk).count();
    let summary = MetricsSummary {
        total_courses: courses.len(),
        total_students: students.len(),
        total_on_time: courses.iter().map(|c| c.on_time).sum(),
        total_late: courses.iter().map(|c| c.late).sum(),
        total_missing: courses.iter().map(|c| c.missing).sum(),
        students_on_track: students.len() - students_at_risk,
        students_at_risk,
        average_grade: average(&all_grades),
        problematic_tasks: assignments.iter().filter(|a| a.problematic).count(),
    };

    CoordinatorReport {
        courses,
        students,
        assignments,
        grades,
        summary,
        partial_failures: snapshot.failures.clone(),
    }
}

fn grades_of(snapshot: &CourseSnapshot) -> Vec<f64> {
    grades(snapshot).collect()
}

pub fn progress_report(snapshot: &ClassroomSnapshot) -> ProgressReport {
    let report = coordinator_report(snapshot);
    ProgressReport {
        courses: report.courses,
        students: report.students,
        summary: report.summary,
        partial_failures: report.partial_failures,
    }
}
