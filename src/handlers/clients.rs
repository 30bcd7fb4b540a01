// src/handlers/clients.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    handlers::params::{non_empty, validate_not_blank, validate_optional_email},
    middleware::{i18n::Locale, scope::ScopeContext},
    models::client::{Client, ClientDetail, ClientSummary},
    services::client_service::ClientFields,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientPayload {
    #[schema(example = "1042")]
    pub internal_code: Option<String>,

    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "María López")]
    pub name: String,

    #[schema(example = "600123123")]
    pub phone: Option<String>,

    #[validate(custom(function = "validate_optional_email"))]
    pub email: Option<String>,

    pub address: Option<String>,

    #[validate(required(message = "salesperson_id_required"))]
    pub salesperson_id: Option<Uuid>,
}

impl ClientPayload {
    // Só depois do validate(): salesperson_id já foi conferido
    fn fields(&self) -> Option<ClientFields<'_>> {
        Some(ClientFields {
            internal_code: non_empty(&self.internal_code),
            name: self.name.trim(),
            phone: non_empty(&self.phone),
            email: non_empty(&self.email),
            address: non_empty(&self.address),
            salesperson_id: self.salesperson_id?,
        })
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ClientListQuery {
    /// Parte do nome ou do código interno
    pub search: Option<String>,
}

fn validated_fields<'a>(
    payload: &'a ClientPayload,
    locale: &Locale,
    app_state: &AppState,
) -> Result<ClientFields<'a>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(locale, &app_state.i18n_store))?;

    payload.fields().ok_or_else(|| {
        AppError::InvalidParameter("salespersonId".to_string())
            .to_api_error(locale, &app_state.i18n_store)
    })
}

// GET /api/clients
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clients",
    params(
        ("salespersonId" = Option<String>, Query, description = "UUID do vendedor ou TODOS"),
        ClientListQuery
    ),
    responses(
        (status = 200, description = "Clientes com dívida e mês do último pagamento", body = Vec<ClientSummary>),
        (status = 400, description = "Escopo inválido")
    )
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: ScopeContext,
    WithRejection(Query(query), _): WithRejection<Query<ClientListQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let clients = app_state
        .client_service
        .list(&app_state.db_pool, scope.0, query.search.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(clients)))
}

// GET /api/clients/{id}
#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente com vendedor, vendas, pagamentos e dívida", body = ClientDetail),
        (status = 404, description = "Cliente não encontrado")
    )
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .client_service
        .get_detail(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

// POST /api/clients
#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "Clients",
    request_body = ClientPayload,
    responses(
        (status = 201, description = "Cliente criado", body = Client),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Vendedor não encontrado"),
        (status = 409, description = "Código interno já usado")
    )
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Json(payload), _): WithRejection<Json<ClientPayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let fields = validated_fields(&payload, &locale, &app_state)?;

    let client = app_state
        .client_service
        .create(&app_state.db_pool, fields)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(client)))
}

// PUT /api/clients/{id}
#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = ClientPayload,
    responses(
        (status = 200, description = "Cliente atualizado (inclusive troca de vendedor)", body = Client),
        (status = 404, description = "Cliente ou vendedor não encontrado"),
        (status = 409, description = "Código interno já usado")
    )
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<ClientPayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let fields = validated_fields(&payload, &locale, &app_state)?;

    let client = app_state
        .client_service
        .update(&app_state.db_pool, id, fields)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(client)))
}

// DELETE /api/clients/{id}
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 204, description = "Cliente removido com vendas, pagamentos e devoluções"),
        (status = 404, description = "Cliente não encontrado")
    )
)]
pub async fn delete_client(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .client_service
        .delete(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
