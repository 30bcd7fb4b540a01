// src/handlers/salespeople.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    handlers::params::{non_empty, validate_not_blank, validate_optional_email},
    middleware::i18n::Locale,
    models::salesperson::{Salesperson, SalespersonDetail},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalespersonPayload {
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Bego")]
    pub name: String,

    #[validate(custom(function = "validate_optional_email"))]
    #[schema(example = "bego@example.com")]
    pub email: Option<String>,

    #[schema(example = "7")]
    pub internal_code: Option<String>,
}

// GET /api/salespeople
#[utoipa::path(
    get,
    path = "/api/salespeople",
    tag = "Salespeople",
    responses(
        (status = 200, description = "Lista de vendedores", body = Vec<Salesperson>)
    )
)]
pub async fn list_salespeople(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let salespeople = app_state
        .salesperson_service
        .list(&app_state.db_pool)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(salespeople)))
}

// GET /api/salespeople/{id}
#[utoipa::path(
    get,
    path = "/api/salespeople/{id}",
    tag = "Salespeople",
    params(("id" = Uuid, Path, description = "ID do vendedor")),
    responses(
        (status = 200, description = "Vendedor com clientes e dívida total", body = SalespersonDetail),
        (status = 404, description = "Vendedor não encontrado")
    )
)]
pub async fn get_salesperson(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .salesperson_service
        .get_detail(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

// POST /api/salespeople
#[utoipa::path(
    post,
    path = "/api/salespeople",
    tag = "Salespeople",
    request_body = SalespersonPayload,
    responses(
        (status = 201, description = "Vendedor criado", body = Salesperson),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Email ou código interno já usado")
    )
)]
pub async fn create_salesperson(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Json(payload), _): WithRejection<Json<SalespersonPayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let salesperson = app_state
        .salesperson_service
        .create(
            &app_state.db_pool,
            payload.name.trim(),
            non_empty(&payload.email),
            non_empty(&payload.internal_code),
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(salesperson)))
}

// PUT /api/salespeople/{id}
#[utoipa::path(
    put,
    path = "/api/salespeople/{id}",
    tag = "Salespeople",
    params(("id" = Uuid, Path, description = "ID do vendedor")),
    request_body = SalespersonPayload,
    responses(
        (status = 200, description = "Vendedor atualizado", body = Salesperson),
        (status = 404, description = "Vendedor não encontrado"),
        (status = 409, description = "Email ou código interno já usado")
    )
)]
pub async fn update_salesperson(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<SalespersonPayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let salesperson = app_state
        .salesperson_service
        .update(
            &app_state.db_pool,
            id,
            payload.name.trim(),
            non_empty(&payload.email),
            non_empty(&payload.internal_code),
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(salesperson)))
}

// DELETE /api/salespeople/{id}
#[utoipa::path(
    delete,
    path = "/api/salespeople/{id}",
    tag = "Salespeople",
    params(("id" = Uuid, Path, description = "ID do vendedor")),
    responses(
        (status = 204, description = "Vendedor removido"),
        (status = 404, description = "Vendedor não encontrado"),
        (status = 409, description = "Vendedor ainda tem clientes ou fechamentos")
    )
)]
pub async fn delete_salesperson(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .salesperson_service
        .delete(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
