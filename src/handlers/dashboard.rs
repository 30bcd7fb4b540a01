// src/handlers/dashboard.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::{error::ApiError, i18n::I18nStore},
    config::AppState,
    handlers::params::DateWindowQuery,
    middleware::{i18n::Locale, scope::ScopeContext},
    models::{
        dashboard::{ClassifiedClient, CollectorRanking, DashboardKpis, SalespersonRanking},
        historical::HistoricalOverview,
        scope::DateWindow,
    },
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DelinquentQuery {
    /// Sem pagamento desde esta data (padrão: últimos 60 dias)
    pub date_from: Option<NaiveDate>,
}

/// Rótulo do período dos KPIs no idioma do cliente.
pub fn period_label(window: &DateWindow, locale: &Locale, store: &I18nStore) -> String {
    let (Some(from), Some(to)) = (window.from, window.to) else {
        // Com só uma das datas os KPIs também usam os últimos 30 dias
        return store.translate(&locale.0, "kpi_last_30_days");
    };
    store
        .translate(&locale.0, "kpi_period_range")
        .replace("{from}", &from.format("%d/%m/%Y").to_string())
        .replace("{to}", &to.format("%d/%m/%Y").to_string())
}

// GET /api/dashboard/kpis
#[utoipa::path(
    get,
    path = "/api/dashboard/kpis",
    tag = "Dashboard",
    params(
        ("salespersonId" = Option<String>, Query, description = "UUID do vendedor ou TODOS"),
        DateWindowQuery
    ),
    responses(
        (status = 200, description = "Dívida total e movimento do período", body = DashboardKpis),
        (status = 400, description = "Escopo ou datas inválidos"),
        (status = 404, description = "Vendedor não encontrado")
    )
)]
pub async fn get_kpis(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: ScopeContext,
    WithRejection(Query(query), _): WithRejection<Query<DateWindowQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let window = query.window(&locale, &app_state.i18n_store)?;
    let label = period_label(&window, &locale, &app_state.i18n_store);

    let kpis = app_state
        .dashboard_service
        .get_kpis(&app_state.db_pool, scope.0, window, label)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(kpis)))
}

// GET /api/dashboard/rankings
#[utoipa::path(
    get,
    path = "/api/dashboard/rankings",
    tag = "Dashboard",
    params(DateWindowQuery),
    responses(
        (status = 200, description = "Vendedores por valor vendido", body = Vec<SalespersonRanking>)
    )
)]
pub async fn get_salesperson_rankings(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Query(query), _): WithRejection<Query<DateWindowQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let window = query.window(&locale, &app_state.i18n_store)?;

    let rankings = app_state
        .dashboard_service
        .get_salesperson_rankings(&app_state.db_pool, window)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(rankings)))
}

// GET /api/dashboard/collectors
#[utoipa::path(
    get,
    path = "/api/dashboard/collectors",
    tag = "Dashboard",
    params(DateWindowQuery),
    responses(
        (status = 200, description = "Vendedores por valor cobrado", body = Vec<CollectorRanking>)
    )
)]
pub async fn get_collector_rankings(
    State(app_state): State<AppState>,
    locale: Locale,
    WithRejection(Query(query), _): WithRejection<Query<DateWindowQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let window = query.window(&locale, &app_state.i18n_store)?;

    let rankings = app_state
        .dashboard_service
        .get_collector_rankings(&app_state.db_pool, window)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(rankings)))
}

// GET /api/dashboard/delinquent
#[utoipa::path(
    get,
    path = "/api/dashboard/delinquent",
    tag = "Dashboard",
    params(
        ("salespersonId" = Option<String>, Query, description = "UUID do vendedor ou TODOS"),
        DelinquentQuery
    ),
    responses(
        (status = 200, description = "Top 10 clientes inadimplentes", body = Vec<ClassifiedClient>)
    )
)]
pub async fn get_delinquent(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: ScopeContext,
    WithRejection(Query(query), _): WithRejection<Query<DelinquentQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let clients = app_state
        .dashboard_service
        .get_delinquent(&app_state.db_pool, scope.0, query.date_from)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(clients)))
}

// GET /api/dashboard/opportunities
#[utoipa::path(
    get,
    path = "/api/dashboard/opportunities",
    tag = "Dashboard",
    params(("salespersonId" = Option<String>, Query, description = "UUID do vendedor ou TODOS")),
    responses(
        (status = 200, description = "Clientes com dívida pequena", body = Vec<ClassifiedClient>)
    )
)]
pub async fn get_opportunities(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: ScopeContext,
) -> Result<impl IntoResponse, ApiError> {
    let clients = app_state
        .dashboard_service
        .get_opportunities(&app_state.db_pool, scope.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(clients)))
}

// GET /api/dashboard/historical
#[utoipa::path(
    get,
    path = "/api/dashboard/historical",
    tag = "Dashboard",
    params(("salespersonId" = Option<String>, Query, description = "UUID do vendedor ou TODOS")),
    responses(
        (status = 200, description = "Totais do sistema legado por período", body = HistoricalOverview)
    )
)]
pub async fn get_historical(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: ScopeContext,
) -> Result<impl IntoResponse, ApiError> {
    let overview = app_state
        .historical_service
        .overview(&app_state.db_pool, scope.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(overview)))
}
