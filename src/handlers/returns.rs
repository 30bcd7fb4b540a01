// src/handlers/returns.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    handlers::params::{non_empty, validate_positive_amount, DateWindowQuery},
    middleware::{i18n::Locale, scope::ScopeContext},
    models::ledger::{Return, ReturnEntry},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReturnPayload {
    #[validate(required(message = "client_id_required"))]
    pub client_id: Option<Uuid>,

    #[validate(
        required(message = "amount_required"),
        custom(function = "validate_positive_amount")
    )]
    #[schema(value_type = Option<f64>, example = 20.0)]
    pub amount: Option<Decimal>,

    #[validate(length(min = 1, message = "description_required"))]
    #[schema(example = "Produto com defeito")]
    pub description: String,

    pub return_reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReturnPayload {
    #[validate(
        required(message = "amount_required"),
        custom(function = "validate_positive_amount")
    )]
    #[schema(value_type = Option<f64>, example = 20.0)]
    pub amount: Option<Decimal>,

    #[validate(length(min = 1, message = "description_required"))]
    pub description: String,

    pub return_reason: Option<String>,
}

// GET /api/returns
#[utoipa::path(
    get,
    path = "/api/returns",
    tag = "Returns",
    params(
        ("salespersonId" = Option<String>, Query, description = "UUID do vendedor (obrigatório)"),
        DateWindowQuery
    ),
    responses(
        (status = 200, description = "Devoluções do vendedor", body = Vec<ReturnEntry>),
        (status = 400, description = "Vendedor não informado")
    )
)]
pub async fn list_returns(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: ScopeContext,
    WithRejection(Query(query), _): WithRejection<Query<DateWindowQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let window = query.window(&locale, &app_state.i18n_store)?;

    let returns = app_state
        .ledger_service
        .list_returns(&app_state.db_pool, scope.0, window)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(returns)))
}

// GET /api/returns/{id}
#[utoipa::path(
    get,
    path = "/api/returns/{id}",
    tag = "Returns",
    params(("id" = Uuid, Path, description = "ID da devolução")),
    responses(
        (status = 200, description = "Devolução", body = Return),
        (status = 404, description = "Devolução não encontrada")
    )
)]
pub async fn get_return(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = app_state
        .ledger_service
        .get_return(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(entry)))
}

// POST /api/returns
#[utoipa::path(
    post,
    path = "/api/returns",
    tag = "Returns",
    request_body = CreateReturnPayload,
    responses(
        (status = 201, description = "Devolução registrada", body = Return),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado")
    )
)]
pub async fn create_return(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Json(payload), _): WithRejection<Json<CreateReturnPayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let (Some(client_id), Some(amount)) = (payload.client_id, payload.amount) else {
        return Err(AppError::InvalidParameter("clientId/amount".to_string())
            .to_api_error(&locale, &app_state.i18n_store));
    };

    let entry = app_state
        .ledger_service
        .create_return(
            &app_state.db_pool,
            client_id,
            amount,
            payload.description.trim(),
            non_empty(&payload.return_reason),
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(entry)))
}

// PUT /api/returns/{id}
#[utoipa::path(
    put,
    path = "/api/returns/{id}",
    tag = "Returns",
    params(("id" = Uuid, Path, description = "ID da devolução")),
    request_body = UpdateReturnPayload,
    responses(
        (status = 200, description = "Devolução atualizada", body = Return),
        (status = 404, description = "Devolução não encontrada")
    )
)]
pub async fn update_return(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateReturnPayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let Some(amount) = payload.amount else {
        return Err(AppError::InvalidParameter("amount".to_string())
            .to_api_error(&locale, &app_state.i18n_store));
    };

    let entry = app_state
        .ledger_service
        .update_return(
            &app_state.db_pool,
            id,
            amount,
            payload.description.trim(),
            non_empty(&payload.return_reason),
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(entry)))
}

// DELETE /api/returns/{id}
#[utoipa::path(
    delete,
    path = "/api/returns/{id}",
    tag = "Returns",
    params(("id" = Uuid, Path, description = "ID da devolução")),
    responses(
        (status = 204, description = "Devolução removida"),
        (status = 404, description = "Devolução não encontrada")
    )
)]
pub async fn delete_return(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .ledger_service
        .delete_return(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
