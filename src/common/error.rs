// src/common/error.rs

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// Erros de domínio. Os serviços e repositórios só conhecem este tipo;
// a tradução para HTTP acontece em `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Parâmetro inválido: {0}")]
    InvalidParameter(String),

    #[error("Escopo de vendedor inválido: {0}")]
    InvalidScope(String),

    #[error("É obrigatório informar um vendedor específico")]
    SalespersonRequired,

    #[error("Vendedor não encontrado")]
    SalespersonNotFound,

    #[error("Cliente não encontrado")]
    ClientNotFound,

    #[error("Venda não encontrada")]
    SaleNotFound,

    #[error("Pagamento não encontrado")]
    PaymentNotFound,

    #[error("Devolução não encontrada")]
    ReturnNotFound,

    #[error("Fechamento não encontrado")]
    ClosureNotFound,

    // Chave da mensagem no catálogo (ex: "salesperson_email_taken")
    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(&'static str),

    #[error("Vendedor ainda possui clientes ou fechamentos")]
    SalespersonInUse,

    #[error("O período já está fechado até {0}")]
    ClosurePeriodEmpty(NaiveDate),

    #[error("Nenhum arquivo enviado")]
    MissingUpload,

    #[error("CSV inválido: {0}")]
    InvalidCsv(String),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidParameter(_)
            | AppError::InvalidScope(_)
            | AppError::SalespersonRequired
            | AppError::MissingUpload
            | AppError::InvalidCsv(_) => StatusCode::BAD_REQUEST,

            AppError::SalespersonNotFound
            | AppError::ClientNotFound
            | AppError::SaleNotFound
            | AppError::PaymentNotFound
            | AppError::ReturnNotFound
            | AppError::ClosureNotFound => StatusCode::NOT_FOUND,

            AppError::UniqueConstraintViolation(_)
            | AppError::SalespersonInUse
            | AppError::ClosurePeriodEmpty(_) => StatusCode::CONFLICT,

            AppError::FontNotFound(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message_key(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::InvalidParameter(_) => "invalid_parameter",
            AppError::InvalidScope(_) => "invalid_scope",
            AppError::SalespersonRequired => "salesperson_required",
            AppError::SalespersonNotFound => "salesperson_not_found",
            AppError::ClientNotFound => "client_not_found",
            AppError::SaleNotFound => "sale_not_found",
            AppError::PaymentNotFound => "payment_not_found",
            AppError::ReturnNotFound => "return_not_found",
            AppError::ClosureNotFound => "closure_not_found",
            AppError::UniqueConstraintViolation(key) => *key,
            AppError::SalespersonInUse => "salesperson_in_use",
            AppError::ClosurePeriodEmpty(_) => "closure_period_empty",
            AppError::MissingUpload => "missing_upload",
            AppError::InvalidCsv(_) => "invalid_csv",
            AppError::FontNotFound(_) => "font_not_found",
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => "internal_error",
        }
    }

    /// Converte o erro de domínio na resposta HTTP, traduzindo a mensagem
    /// para o idioma pedido pelo cliente.
    pub fn to_api_error(self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status();
        let lang = locale.0.as_str();

        match self {
            AppError::ValidationError(errors) => {
                // Campos em ordem alfabética para a mensagem principal ser estável
                let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
                fields.sort_by(|a, b| a.0.cmp(&b.0));

                let mut details = Map::new();
                let mut first_message = None;
                for (field, field_errors) in fields {
                    let messages: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            let key = e.message.as_deref().unwrap_or(e.code.as_ref());
                            Value::String(store.translate(lang, key))
                        })
                        .collect();
                    if first_message.is_none() {
                        first_message = messages.first().and_then(|m| m.as_str()).map(String::from);
                    }
                    details.insert(field.to_string(), Value::Array(messages));
                }

                ApiError {
                    status,
                    error: first_message
                        .unwrap_or_else(|| store.translate(lang, "validation_error")),
                    details: Some(Value::Object(details)),
                }
            }
            ref e if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                ApiError::new(status, store.translate(lang, e.message_key()))
            }
            e => {
                let mut api_error = ApiError::new(status, store.translate(lang, e.message_key()));
                // Parâmetros ajudam o frontend a mostrar o que estava errado
                match e {
                    AppError::InvalidParameter(detail) | AppError::InvalidCsv(detail) => {
                        api_error.details = Some(json!({ "reason": detail }));
                    }
                    AppError::InvalidScope(raw) => {
                        api_error.details = Some(json!({ "salespersonId": raw }));
                    }
                    AppError::ClosurePeriodEmpty(date) => {
                        api_error.details = Some(json!({ "lastDateTo": date }));
                    }
                    _ => {}
                }
                api_error
            }
        }
    }
}

// Resposta padronizada de erro: { "error": "...", "details": ... }
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: None,
        }
    }

    fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

// Rejeições dos extratores do axum (via WithRejection) viram 400 no mesmo formato.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    fn store() -> I18nStore {
        I18nStore::load().expect("catálogos embutidos devem ser válidos")
    }

    #[test]
    fn not_found_variants_map_to_404() {
        assert_eq!(AppError::ClientNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::SalespersonNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::ClosureNotFound.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn database_errors_are_sanitized() {
        let err = AppError::DatabaseError(sqlx::Error::PoolTimedOut);
        let api = err.to_api_error(&Locale("en".into()), &store());

        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("pool"));
        assert!(api.details.is_none());
    }

    #[test]
    fn validation_error_uses_first_field_message() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("required");
        err.message = Some("name_required".into());
        errors.add("name", err);

        let api = AppError::ValidationError(errors).to_api_error(&Locale("es".into()), &store());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.error, "El nombre es obligatorio");
        assert_eq!(api.details.unwrap()["name"][0], "El nombre es obligatorio");
    }

    #[test]
    fn closure_conflict_reports_last_date() {
        let date = NaiveDate::from_ymd_opt(2025, 10, 31).unwrap();
        let api = AppError::ClosurePeriodEmpty(date).to_api_error(&Locale("en".into()), &store());

        assert_eq!(api.status, StatusCode::CONFLICT);
        assert_eq!(api.details.unwrap()["lastDateTo"], "2025-10-31");
    }
}
