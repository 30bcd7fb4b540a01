// src/handlers/sales.rs

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
    handlers::params::{validate_positive_amount, DateWindowQuery},
    middleware::{i18n::Locale, scope::ScopeContext},
    models::ledger::{Sale, SaleEntry},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSalePayload {
    #[validate(required(message = "client_id_required"))]
    pub client_id: Option<Uuid>,

    #[validate(
        required(message = "amount_required"),
        custom(function = "validate_positive_amount")
    )]
    #[schema(value_type = Option<f64>, example = 100.0)]
    pub amount: Option<Decimal>,

    #[validate(length(min = 1, message = "description_required"))]
    #[schema(example = "Pedido de setembro")]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSalePayload {
    #[validate(
        required(message = "amount_required"),
        custom(function = "validate_positive_amount")
    )]
    #[schema(value_type = Option<f64>, example = 100.0)]
    pub amount: Option<Decimal>,

    #[validate(length(min = 1, message = "description_required"))]
    pub description: String,
}

// GET /api/sales
#[utoipa::path(
    get,
    path = "/api/sales",
    tag = "Sales",
    params(
        ("salespersonId" = Option<String>, Query, description = "UUID do vendedor ou TODOS"),
        DateWindowQuery
    ),
    responses(
        (status = 200, description = "Vendas com cliente e vendedor", body = Vec<SaleEntry>)
    )
)]
pub async fn list_sales(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: ScopeContext,
    WithRejection(Query(query), _): WithRejection<Query<DateWindowQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let window = query.window(&locale, &app_state.i18n_store)?;

    let sales = app_state
        .ledger_service
        .list_sales(&app_state.db_pool, scope.0, window)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(sales)))
}

// GET /api/sales/client/{clientId}
#[utoipa::path(
    get,
    path = "/api/sales/client/{clientId}",
    tag = "Sales",
    params(("clientId" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Vendas do cliente", body = Vec<Sale>),
        (status = 404, description = "Cliente não encontrado")
    )
)]
pub async fn list_client_sales(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(client_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let sales = app_state
        .ledger_service
        .list_client_sales(&app_state.db_pool, client_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(sales)))
}

// GET /api/sales/{id}
#[utoipa::path(
    get,
    path = "/api/sales/{id}",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID da venda")),
    responses(
        (status = 200, description = "Venda", body = Sale),
        (status = 404, description = "Venda não encontrada")
    )
)]
pub async fn get_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let sale = app_state
        .ledger_service
        .get_sale(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(sale)))
}

// POST /api/sales
#[utoipa::path(
    post,
    path = "/api/sales",
    tag = "Sales",
    request_body = CreateSalePayload,
    responses(
        (status = 201, description = "Venda registrada", body = Sale),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado")
    )
)]
pub async fn create_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Json(payload), _): WithRejection<Json<CreateSalePayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let (Some(client_id), Some(amount)) = (payload.client_id, payload.amount) else {
        return Err(AppError::InvalidParameter("clientId/amount".to_string())
            .to_api_error(&locale, &app_state.i18n_store));
    };

    let sale = app_state
        .ledger_service
        .create_sale(&app_state.db_pool, client_id, amount, payload.description.trim())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(sale)))
}

// PUT /api/sales/{id}
#[utoipa::path(
    put,
    path = "/api/sales/{id}",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID da venda")),
    request_body = UpdateSalePayload,
    responses(
        (status = 200, description = "Venda atualizada", body = Sale),
        (status = 404, description = "Venda não encontrada")
    )
)]
pub async fn update_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateSalePayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let Some(amount) = payload.amount else {
        return Err(AppError::InvalidParameter("amount".to_string())
            .to_api_error(&locale, &app_state.i18n_store));
    };

    let sale = app_state
        .ledger_service
        .update_sale(&app_state.db_pool, id, amount, payload.description.trim())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(sale)))
}

// DELETE /api/sales/{id}
#[utoipa::path(
    delete,
    path = "/api/sales/{id}",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID da venda")),
    responses(
        (status = 204, description = "Venda removida"),
        (status = 404, description = "Venda não encontrada")
    )
)]
pub async fn delete_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .ledger_service
        .delete_sale(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
