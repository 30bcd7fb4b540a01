pub mod analytics;
pub mod clients;
pub mod closures;
pub mod dashboard;
pub mod historical;
pub mod import;
pub mod params;
pub mod payments;
pub mod returns;
pub mod sales;
pub mod salespeople;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

// GET /health
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Servidor no ar"))
)]
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "message": "Server is running" })))
}
