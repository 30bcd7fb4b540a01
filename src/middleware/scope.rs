// src/middleware/scope.rs

use axum::{
    extract::{FromRef, FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::scope::SalespersonScope,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScopeQuery {
    salesperson_id: Option<String>,
}

// Extrator do escopo (?salespersonId=<uuid>|TODOS). Ausente = todos os vendedores.
// O escopo é sempre explícito por requisição; nada fica guardado no servidor.
#[derive(Debug, Clone, Copy)]
pub struct ScopeContext(pub SalespersonScope);

impl<S> FromRequestParts<S> for ScopeContext
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let Ok(locale) = Locale::from_request_parts(parts, state).await;

        let Query(query) = Query::<ScopeQuery>::from_request_parts(parts, state)
            .await
            .map_err(ApiError::from)?;

        SalespersonScope::parse(query.salesperson_id.as_deref())
            .map(ScopeContext)
            .map_err(|e: AppError| e.to_api_error(&locale, &app_state.i18n_store))
    }
}
