// src/handlers/analytics.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::ApiError,
    config::AppState,
    handlers::params::DateWindowQuery,
    middleware::{i18n::Locale, scope::ScopeContext},
    models::analytics::{
        AlertThresholds, AlertsReport, BadDebtReport, MonthlyReport, SalespersonComparison,
        SalespersonProfitability, TrendReport, ALERT_THRESHOLDS, DEFAULT_BAD_DEBT_DAYS,
    },
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MonthlyQuery {
    /// Ano (ex: 2025)
    pub year: i32,
    /// Mês, de 1 a 12
    pub month: u32,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BadDebtQuery {
    /// Dias mínimos sem venda (padrão: 90)
    pub days_threshold: Option<i64>,
}

// GET /api/analytics/comparison
#[utoipa::path(
    get,
    path = "/api/analytics/comparison",
    tag = "Analytics",
    params(DateWindowQuery),
    responses(
        (status = 200, description = "Vendedores lado a lado", body = Vec<SalespersonComparison>)
    )
)]
pub async fn get_comparison(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Query(query), _): WithRejection<Query<DateWindowQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let window = query.window(&locale, &app_state.i18n_store)?;

    let comparison = app_state
        .analytics_service
        .comparison(&app_state.db_pool, window)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(comparison)))
}

// GET /api/analytics/monthly
#[utoipa::path(
    get,
    path = "/api/analytics/monthly",
    tag = "Analytics",
    params(
        MonthlyQuery,
        ("salespersonId" = Option<String>, Query, description = "UUID do vendedor ou TODOS")
    ),
    responses(
        (status = 200, description = "Movimento do mês por vendedor", body = MonthlyReport),
        (status = 400, description = "Ano ou mês inválido")
    )
)]
pub async fn get_monthly(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: ScopeContext,
    WithRejection(Query(query), _): WithRejection<Query<MonthlyQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state
        .analytics_service
        .monthly(&app_state.db_pool, query.year, query.month, scope.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(report)))
}

// GET /api/analytics/profitability
#[utoipa::path(
    get,
    path = "/api/analytics/profitability",
    tag = "Analytics",
    params(
        ("salespersonId" = Option<String>, Query, description = "UUID do vendedor ou TODOS"),
        DateWindowQuery
    ),
    responses(
        (status = 200, description = "Recuperação, médias e comissão por vendedor", body = Vec<SalespersonProfitability>),
        (status = 400, description = "Escopo ou datas inválidos")
    )
)]
pub async fn get_profitability(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: ScopeContext,
    WithRejection(Query(query), _): WithRejection<Query<DateWindowQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let window = query.window(&locale, &app_state.i18n_store)?;

    let rows = app_state
        .analytics_service
        .profitability(&app_state.db_pool, scope.0, window)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(rows)))
}

// GET /api/analytics/trends
#[utoipa::path(
    get,
    path = "/api/analytics/trends",
    tag = "Analytics",
    params(
        ("salespersonId" = Option<String>, Query, description = "UUID do vendedor ou TODOS"),
        DateWindowQuery
    ),
    responses(
        (status = 200, description = "Vendas e pagamentos por dia", body = TrendReport),
        (status = 400, description = "Escopo ou datas inválidos")
    )
)]
pub async fn get_trends(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: ScopeContext,
    WithRejection(Query(query), _): WithRejection<Query<DateWindowQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let window = query.window(&locale, &app_state.i18n_store)?;

    let report = app_state
        .analytics_service
        .trends(&app_state.db_pool, scope.0, window)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(report)))
}

// GET /api/analytics/bad-debt
#[utoipa::path(
    get,
    path = "/api/analytics/bad-debt",
    tag = "Analytics",
    params(
        ("salespersonId" = Option<String>, Query, description = "UUID do vendedor ou TODOS"),
        BadDebtQuery
    ),
    responses(
        (status = 200, description = "Devedores sem venda recente com pontuação de risco", body = BadDebtReport),
        (status = 400, description = "Escopo ou limite inválido")
    )
)]
pub async fn get_bad_debt(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: ScopeContext,
    WithRejection(Query(query), _): WithRejection<Query<BadDebtQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let days = query.days_threshold.unwrap_or(DEFAULT_BAD_DEBT_DAYS);

    let report = app_state
        .analytics_service
        .bad_debt(&app_state.db_pool, scope.0, days)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(report)))
}

// GET /api/analytics/alerts
#[utoipa::path(
    get,
    path = "/api/analytics/alerts",
    tag = "Analytics",
    params(
        ("salespersonId" = Option<String>, Query, description = "UUID do vendedor ou TODOS")
    ),
    responses(
        (status = 200, description = "Alertas com os clientes ou vendedores envolvidos", body = AlertsReport),
        (status = 400, description = "Escopo inválido")
    )
)]
pub async fn get_alerts(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: ScopeContext,
) -> Result<impl IntoResponse, ApiError> {
    let findings = app_state
        .analytics_service
        .alerts(&app_state.db_pool, scope.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let report = findings.into_report(&locale, &app_state.i18n_store);
    Ok((StatusCode::OK, Json(report)))
}

// GET /api/analytics/alerts/config
#[utoipa::path(
    get,
    path = "/api/analytics/alerts/config",
    tag = "Analytics",
    responses(
        (status = 200, description = "Limites usados pelos alertas", body = AlertThresholds)
    )
)]
pub async fn get_alerts_config() -> Json<AlertThresholds> {
    Json(ALERT_THRESHOLDS)
}
