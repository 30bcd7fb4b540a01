// src/router.rs

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers};

/// Limite do upload de CSV.
pub const IMPORT_BODY_LIMIT: usize = 10 * 1024 * 1024;

fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin.trim() == "*" {
        return Ok(layer.allow_origin(Any));
    }
    let origin = HeaderValue::from_str(origin.trim())
        .with_context(|| format!("CORS_ORIGIN inválido: '{}'", origin))?;
    Ok(layer.allow_origin(origin))
}

pub fn create_router(app_state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    let salespeople_routes = Router::new()
        .route(
            "/",
            get(handlers::salespeople::list_salespeople)
                .post(handlers::salespeople::create_salesperson),
        )
        .route(
            "/{id}",
            get(handlers::salespeople::get_salesperson)
                .put(handlers::salespeople::update_salesperson)
                .delete(handlers::salespeople::delete_salesperson),
        );

    let client_routes = Router::new()
        .route(
            "/",
            get(handlers::clients::list_clients).post(handlers::clients::create_client),
        )
        .route(
            "/{id}",
            get(handlers::clients::get_client)
                .put(handlers::clients::update_client)
                .delete(handlers::clients::delete_client),
        );

    let sale_routes = Router::new()
        .route(
            "/",
            get(handlers::sales::list_sales).post(handlers::sales::create_sale),
        )
        .route("/client/{client_id}", get(handlers::sales::list_client_sales))
        .route(
            "/{id}",
            get(handlers::sales::get_sale)
                .put(handlers::sales::update_sale)
                .delete(handlers::sales::delete_sale),
        );

    let payment_routes = Router::new()
        .route(
            "/",
            get(handlers::payments::list_payments).post(handlers::payments::create_payment),
        )
        .route(
            "/client/{client_id}",
            get(handlers::payments::list_client_payments),
        )
        .route(
            "/{id}",
            get(handlers::payments::get_payment)
                .put(handlers::payments::update_payment)
                .delete(handlers::payments::delete_payment),
        );

    let return_routes = Router::new()
        .route(
            "/",
            get(handlers::returns::list_returns).post(handlers::returns::create_return),
        )
        .route(
            "/{id}",
            get(handlers::returns::get_return)
                .put(handlers::returns::update_return)
                .delete(handlers::returns::delete_return),
        );

    let dashboard_routes = Router::new()
        .route("/kpis", get(handlers::dashboard::get_kpis))
        .route("/rankings", get(handlers::dashboard::get_salesperson_rankings))
        .route("/collectors", get(handlers::dashboard::get_collector_rankings))
        .route("/delinquent", get(handlers::dashboard::get_delinquent))
        .route("/opportunities", get(handlers::dashboard::get_opportunities))
        .route("/historical", get(handlers::dashboard::get_historical));

    let closure_routes = Router::new()
        .route(
            "/",
            get(handlers::closures::list_closures).post(handlers::closures::create_closure),
        )
        .route(
            "/{id}",
            get(handlers::closures::get_closure)
                .put(handlers::closures::update_closure)
                .delete(handlers::closures::delete_closure),
        )
        .route("/{id}/pdf", get(handlers::closures::closure_pdf));

    let import_routes = Router::new()
        .route("/clients-from-csv", post(handlers::import::import_clients))
        .layer(DefaultBodyLimit::max(IMPORT_BODY_LIMIT));

    let analytics_routes = Router::new()
        .route("/comparison", get(handlers::analytics::get_comparison))
        .route("/monthly", get(handlers::analytics::get_monthly))
        .route("/profitability", get(handlers::analytics::get_profitability))
        .route("/trends", get(handlers::analytics::get_trends))
        .route("/bad-debt", get(handlers::analytics::get_bad_debt))
        .route("/alerts", get(handlers::analytics::get_alerts))
        .route("/alerts/config", get(handlers::analytics::get_alerts_config));

    let historical_routes = Router::new().route(
        "/clients/{internal_code}",
        get(handlers::historical::get_client_history),
    );

    let app = Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/salespeople", salespeople_routes)
        .nest("/api/clients", client_routes)
        .nest("/api/sales", sale_routes)
        .nest("/api/payments", payment_routes)
        .nest("/api/returns", return_routes)
        .nest("/api/dashboard", dashboard_routes)
        .nest("/api/month-closures", closure_routes)
        .nest("/api/import", import_routes)
        .nest("/api/analytics", analytics_routes)
        .nest("/api/historical", historical_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer(cors_origin)?)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_and_explicit_origins_are_accepted() {
        assert!(cors_layer("*").is_ok());
        assert!(cors_layer("http://localhost:5173").is_ok());
    }

    #[test]
    fn origin_with_control_characters_is_rejected() {
        assert!(cors_layer("http://bad\norigin").is_err());
    }
}
