//! Thin proxies over the Classroom API, acting as the signed-in user.

use axum::{
    extract::{Path, State},
    Json,
};
use classroom_api::{
    endpoints::{
        course_work::ListCourseWorkResponse, courses::ListCoursesResponse,
        students::ListStudentsResponse, submissions::ListSubmissionsResponse,
    },
    Request,
};
use tracing::Instrument;

use crate::server::{
    error::ServerError,
    extract::{ApiQuery, CurrentUser},
    models::PageSizeParams,
    AppState,
};

fn page_size(state: &AppState, params: &PageSizeParams) -> u32 {
    params
        .page_size
        .filter(|size| *size > 0)
        .unwrap_or(state.settings.classroom.page_size)
}

pub async fn list_courses(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiQuery(params): ApiQuery<PageSizeParams>,
) -> Result<Json<ListCoursesResponse>, ServerError> {
    let request = Request::courses().list().page_size(page_size(&state, &params));
    let span = tracing::info_span!("list_courses", email = %user.0.email);
    let response = user
        .classroom_client(&state.settings)
        .send(request)
        .instrument(span)
        .await?;
    Ok(Json(response))
}

pub async fn list_course_work(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(course_id): Path<String>,
    ApiQuery(params): ApiQuery<PageSizeParams>,
) -> Result<Json<ListCourseWorkResponse>, ServerError> {
    let request = Request::course_work(course_id.as_str())
        .list()
        .page_size(page_size(&state, &params));
    let span = tracing::info_span!("list_course_work", email = %user.0.email, course_id = %course_id);
    let response = user
        .classroom_client(&state.settings)
        .send(request)
        .instrument(span)
        .await?;
    Ok(Json(response))
}

pub async fn list_students(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(course_id): Path<String>,
    ApiQuery(params): ApiQuery<PageSizeParams>,
) -> Result<Json<ListStudentsResponse>, ServerError> {
    let request = Request::students(course_id.as_str())
        .list()
        .page_size(page_size(&state, &params));
    let span = tracing::info_span!("list_students", email = %user.0.email, course_id = %course_id);
    let response = user
        .classroom_client(&state.settings)
        .send(request)
        .instrument(span)
        .await?;
    Ok(Json(response))
}

pub async fn list_submissions(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((course_id, work_id)): Path<(String, String)>,
    ApiQuery(params): ApiQuery<PageSizeParams>,
) -> Result<Json<ListSubmissionsResponse>, ServerError> {
    let request = Request::submissions(course_id.as_str(), work_id.as_str())
        .list()
        .page_size(page_size(&state, &params));
    let span = tracing::info_span!(
        "list_submissions",
        email = %user.0.email,
        course_id = %course_id,
        work_id = %work_id
    );
    let response = user
        .classroom_client(&state.settings)
        .send(request)
        .instrument(span)
        .await?;
    Ok(Json(response))
}
