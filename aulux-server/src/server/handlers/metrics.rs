use axum::{extract::State, Json};
use tracing::Instrument;

use crate::server::{
    error::ServerError,
    extract::CurrentUser,
    models::Role,
    services::{
        gather,
        metrics::{coordinator_report, progress_report, CoordinatorReport, ProgressReport},
        GoogleClassroom,
    },
    AppState,
};

pub async fn metrics(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ProgressReport>, ServerError> {
    if user.0.role == Role::Alumno {
        return Err(ServerError::Forbidden(
            "El reporte de progreso es solo para docentes".to_string(),
        ));
    }

    let source = GoogleClassroom::new(
        user.classroom_client(&state.settings),
        state.settings.classroom.page_size,
    );
    let span = tracing::info_span!("metrics", email = %user.0.email);

    let snapshot = gather(&source, state.settings.gather_options())
        .instrument(span)
        .await?;
    if !snapshot.failures.is_empty() {
        tracing::warn!(
            failures = snapshot.failures.len(),
            "Metrics report built with partial data"
        );
    }

    Ok(Json(progress_report(&snapshot)))
}

pub async fn coordinator_metrics(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<CoordinatorReport>, ServerError> {
    user.require(Role::Coordinador)?;

    let source = GoogleClassroom::new(
        user.classroom_client(&state.settings),
        state.settings.classroom.page_size,
    );
    let span = tracing::info_span!("coordinator_metrics", email = %user.0.email);

    let snapshot = gather(&source, state.settings.gather_options())
        .instrument(span)
        .await?;
    if !snapshot.failures.is_empty() {
        tracing::warn!(
            failures = snapshot.failures.len(),
            "Coordinator report built with partial data"
        );
    }

    Ok(Json(coordinator_report(&snapshot)))
}
