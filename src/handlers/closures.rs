// src/handlers/closures.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::WithRejection;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    handlers::params::non_empty,
    middleware::i18n::Locale,
    models::{
        closure::MonthClosureView,
        scope::{DateWindow, SalespersonScope},
    },
    services::closure_service::{ClosureQuery, NewClosure},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClosurePayload {
    #[validate(length(min = 1, message = "closure_name_required"))]
    #[schema(example = "Fechamento outubro")]
    pub name: String,

    /// UUID do vendedor; ausente ou "TODOS" fecha o período geral
    pub salesperson_id: Option<String>,
    pub description: Option<String>,
    pub closed_by: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClosurePayload {
    #[validate(length(min = 1, message = "closure_name_required"))]
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ClosureListQuery {
    /// Trecho do nome do fechamento
    pub search: Option<String>,
    /// UUID do vendedor ou TODOS (só fechamentos gerais)
    pub salesperson_id: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl ClosureListQuery {
    fn into_query(self) -> Result<ClosureQuery, AppError> {
        // Sem o parâmetro a listagem não filtra por escopo
        let scope = match non_empty(&self.salesperson_id) {
            Some(raw) => Some(SalespersonScope::parse(Some(raw))?),
            None => None,
        };
        Ok(ClosureQuery {
            search: non_empty(&self.search).map(String::from),
            scope,
            window: DateWindow::new(self.date_from, self.date_to)?,
        })
    }
}

// POST /api/month-closures
#[utoipa::path(
    post,
    path = "/api/month-closures",
    tag = "Month Closures",
    request_body = CreateClosurePayload,
    responses(
        (status = 201, description = "Período fechado", body = MonthClosureView),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Vendedor não encontrado"),
        (status = 409, description = "Nada a fechar desde o último fechamento")
    )
)]
pub async fn create_closure(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Json(payload), _): WithRejection<Json<CreateClosurePayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let input = payload
        .validate()
        .map_err(AppError::from)
        .and_then(|_| SalespersonScope::parse(payload.salesperson_id.as_deref()))
        .map(|scope| NewClosure {
            name: payload.name.trim(),
            scope,
            description: non_empty(&payload.description),
            closed_by: non_empty(&payload.closed_by),
        })
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let closure = app_state
        .closure_service
        .create(&app_state.db_pool, input, Utc::now().date_naive())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(closure)))
}

// GET /api/month-closures
#[utoipa::path(
    get,
    path = "/api/month-closures",
    tag = "Month Closures",
    params(ClosureListQuery),
    responses(
        (status = 200, description = "Fechamentos, mais recentes primeiro", body = Vec<MonthClosureView>)
    )
)]
pub async fn list_closures(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Query(query), _): WithRejection<Query<ClosureListQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let query = query
        .into_query()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let closures = app_state
        .closure_service
        .list(&app_state.db_pool, &query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(closures)))
}

// GET /api/month-closures/{id}
#[utoipa::path(
    get,
    path = "/api/month-closures/{id}",
    tag = "Month Closures",
    params(("id" = Uuid, Path, description = "ID do fechamento")),
    responses(
        (status = 200, description = "Fechamento", body = MonthClosureView),
        (status = 404, description = "Fechamento não encontrado")
    )
)]
pub async fn get_closure(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let closure = app_state
        .closure_service
        .get(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(closure)))
}

// PUT /api/month-closures/{id}
#[utoipa::path(
    put,
    path = "/api/month-closures/{id}",
    tag = "Month Closures",
    params(("id" = Uuid, Path, description = "ID do fechamento")),
    request_body = UpdateClosurePayload,
    responses(
        (status = 200, description = "Nome/descrição atualizados", body = MonthClosureView),
        (status = 404, description = "Fechamento não encontrado")
    )
)]
pub async fn update_closure(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateClosurePayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let closure = app_state
        .closure_service
        .update_labels(
            &app_state.db_pool,
            id,
            payload.name.as_deref().map(str::trim),
            payload.description.as_deref(),
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(closure)))
}

// DELETE /api/month-closures/{id}
#[utoipa::path(
    delete,
    path = "/api/month-closures/{id}",
    tag = "Month Closures",
    params(("id" = Uuid, Path, description = "ID do fechamento")),
    responses(
        (status = 204, description = "Fechamento removido"),
        (status = 404, description = "Fechamento não encontrado")
    )
)]
pub async fn delete_closure(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .closure_service
        .delete(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/month-closures/{id}/pdf
#[utoipa::path(
    get,
    path = "/api/month-closures/{id}/pdf",
    tag = "Month Closures",
    params(("id" = Uuid, Path, description = "ID do fechamento")),
    responses(
        (status = 200, description = "Relatório do fechamento", content_type = "application/pdf"),
        (status = 404, description = "Fechamento não encontrado")
    )
)]
pub async fn closure_pdf(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<Response, ApiError> {
    let pdf_bytes = app_state
        .document_service
        .generate_closure_pdf(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"fechamento_{}.pdf\"", id),
        ),
    ];

    Ok((headers, pdf_bytes).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_salesperson_param_does_not_filter_scope() {
        let query = ClosureListQuery::default().into_query().unwrap();
        assert_eq!(query.scope, None);
    }

    #[test]
    fn todos_lists_only_general_closures() {
        let query = ClosureListQuery {
            salesperson_id: Some("TODOS".into()),
            ..Default::default()
        };
        assert_eq!(query.into_query().unwrap().scope, Some(SalespersonScope::All));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let query = ClosureListQuery {
            date_from: NaiveDate::from_ymd_opt(2025, 11, 1),
            date_to: NaiveDate::from_ymd_opt(2025, 10, 1),
            ..Default::default()
        };
        assert!(matches!(query.into_query(), Err(AppError::InvalidParameter(_))));
    }
}
