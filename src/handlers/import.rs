// src/handlers/import.rs

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::import::ImportReport,
};

/// Nome do campo multipart com o arquivo CSV.
pub const UPLOAD_FIELD: &str = "file";

// POST /api/import/clients-from-csv
#[utoipa::path(
    post,
    path = "/api/import/clients-from-csv",
    tag = "Import",
    request_body(content_type = "multipart/form-data", description = "Campo `file` com o CSV"),
    responses(
        (status = 200, description = "Resultado linha a linha", body = ImportReport),
        (status = 400, description = "Arquivo ausente ou ilegível")
    )
)]
pub async fn import_clients(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(mut multipart, _): WithRejection<Multipart, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::InvalidCsv(e.body_text()).to_api_error(&locale, &app_state.i18n_store)
    })? {
        if field.name() == Some(UPLOAD_FIELD) {
            let bytes = field.bytes().await.map_err(|e| {
                AppError::InvalidCsv(e.body_text()).to_api_error(&locale, &app_state.i18n_store)
            })?;
            upload = Some(bytes);
            break;
        }
    }

    let bytes = upload
        .ok_or(AppError::MissingUpload)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let outcome = app_state
        .import_service
        .import_clients(&app_state.db_pool, &bytes)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::OK,
        Json(outcome.into_report(&locale, &app_state.i18n_store)),
    ))
}
