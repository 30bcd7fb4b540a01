// src/handlers/payments.rs

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
    models::ledger::{Payment, PaymentEntry},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentPayload {
    #[validate(required(message = "client_id_required"))]
    pub client_id: Option<Uuid>,

    #[validate(
        required(message = "amount_required"),
        custom(function = "validate_positive_amount")
    )]
    #[schema(value_type = Option<f64>, example = 50.0)]
    pub amount: Option<Decimal>,

    #[validate(length(min = 1, message = "payment_method_required"))]
    #[schema(example = "Transferência")]
    pub payment_method: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentPayload {
    #[validate(
        required(message = "amount_required"),
        custom(function = "validate_positive_amount")
    )]
    #[schema(value_type = Option<f64>, example = 50.0)]
    pub amount: Option<Decimal>,

    #[validate(length(min = 1, message = "payment_method_required"))]
    pub payment_method: String,
}

// GET /api/payments
#[utoipa::path(
    get,
    path = "/api/payments",
    tag = "Payments",
    params(
        ("salespersonId" = Option<String>, Query, description = "UUID do vendedor ou TODOS"),
        DateWindowQuery
    ),
    responses(
        (status = 200, description = "Pagamentos com cliente e vendedor", body = Vec<PaymentEntry>)
    )
)]
pub async fn list_payments(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: ScopeContext,
    WithRejection(Query(query), _): WithRejection<Query<DateWindowQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let window = query.window(&locale, &app_state.i18n_store)?;

    let payments = app_state
        .ledger_service
        .list_payments(&app_state.db_pool, scope.0, window)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(payments)))
}

// GET /api/payments/client/{clientId}
#[utoipa::path(
    get,
    path = "/api/payments/client/{clientId}",
    tag = "Payments",
    params(("clientId" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Pagamentos do cliente", body = Vec<Payment>),
        (status = 404, description = "Cliente não encontrado")
    )
)]
pub async fn list_client_payments(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(client_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let payments = app_state
        .ledger_service
        .list_client_payments(&app_state.db_pool, client_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(payments)))
}

// GET /api/payments/{id}
#[utoipa::path(
    get,
    path = "/api/payments/{id}",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 200, description = "Pagamento", body = Payment),
        (status = 404, description = "Pagamento não encontrado")
    )
)]
pub async fn get_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = app_state
        .ledger_service
        .get_payment(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(payment)))
}

// POST /api/payments
#[utoipa::path(
    post,
    path = "/api/payments",
    tag = "Payments",
    request_body = CreatePaymentPayload,
    responses(
        (status = 201, description = "Pagamento registrado", body = Payment),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado")
    )
)]
pub async fn create_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Json(payload), _): WithRejection<Json<CreatePaymentPayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let (Some(client_id), Some(amount)) = (payload.client_id, payload.amount) else {
        return Err(AppError::InvalidParameter("clientId/amount".to_string())
            .to_api_error(&locale, &app_state.i18n_store));
    };

    let payment = app_state
        .ledger_service
        .create_payment(&app_state.db_pool, client_id, amount, payload.payment_method.trim())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(payment)))
}

// PUT /api/payments/{id}
#[utoipa::path(
    put,
    path = "/api/payments/{id}",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    request_body = UpdatePaymentPayload,
    responses(
        (status = 200, description = "Pagamento atualizado", body = Payment),
        (status = 404, description = "Pagamento não encontrado")
    )
)]
pub async fn update_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdatePaymentPayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let Some(amount) = payload.amount else {
        return Err(AppError::InvalidParameter("amount".to_string())
            .to_api_error(&locale, &app_state.i18n_store));
    };

    let payment = app_state
        .ledger_service
        .update_payment(&app_state.db_pool, id, amount, payload.payment_method.trim())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(payment)))
}

// DELETE /api/payments/{id}
#[utoipa::path(
    delete,
    path = "/api/payments/{id}",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 204, description = "Pagamento removido"),
        (status = 404, description = "Pagamento não encontrado")
    )
)]
pub async fn delete_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .ledger_service
        .delete_payment(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
