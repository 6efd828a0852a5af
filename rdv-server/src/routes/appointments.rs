//! Calendar import/export endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
};

use rdv_core::{AppointmentStore, ImportSummary, RdvError, ics, import};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/appointments/import", post(import_appointments))
        .route("/appointments/{id}/ics", get(download_ics))
}

/// POST /appointments/import - Import every event of an uploaded .ics file
///
/// Always answers 200 with the aggregate summary when at least one event was
/// found; duplicates and per-event failures are reported inside the summary,
/// not as request failures.
async fn import_appointments(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ImportSummary>, AppError> {
    let mut store = state.store().write().await;
    let summary = import::import_calendar(&body, &mut *store)?;

    tracing::info!(
        imported = summary.imported,
        skipped = summary.skipped,
        errors = summary.errors,
        "calendar import finished"
    );

    Ok(Json(summary))
}

/// GET /appointments/{id}/ics - Download one appointment as calendar text
async fn download_ics(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store().read().await;
    let appointment = store.get(id)?.ok_or(RdvError::AppointmentNotFound(id))?;
    drop(store);

    let body = ics::generate_ics(&appointment);
    let filename = ics::export_filename(&appointment);

    tracing::info!(id, filename = %filename, "appointment exported");

    let headers = [
        (header::CONTENT_TYPE, "text/calendar".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", filename),
        ),
    ];
    Ok((headers, body))
}
