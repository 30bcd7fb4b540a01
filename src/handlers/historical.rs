// src/handlers/historical.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;

use crate::{
    common::error::ApiError, config::AppState, middleware::i18n::Locale,
    models::historical::ClientHistory,
};

// GET /api/historical/clients/{internalCode}
#[utoipa::path(
    get,
    path = "/api/historical/clients/{internalCode}",
    tag = "Historical",
    params(("internalCode" = String, Path, description = "Código do cliente no sistema legado")),
    responses(
        (status = 200, description = "Vendas e pagamentos legados", body = ClientHistory),
        (status = 400, description = "Código não numérico")
    )
)]
pub async fn get_client_history(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(internal_code), _): WithRejection<Path<String>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let history = app_state
        .historical_service
        .client_history(&app_state.db_pool, &internal_code)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(history)))
}
