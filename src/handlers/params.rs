// src/handlers/params.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::IntoParams;
use validator::{ValidateEmail, ValidationError};

use crate::{
    common::{error::ApiError, i18n::I18nStore},
    middleware::i18n::Locale,
    models::scope::DateWindow,
};

// ---
// Validações customizadas (a mensagem é a chave do catálogo)
// ---
pub fn validate_positive_amount(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("amount_positive".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_not_blank(val: &str) -> Result<(), ValidationError> {
    if val.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("name_required".into());
        return Err(err);
    }
    Ok(())
}

/// Email opcional: em branco é aceito (vira ausente), senão precisa ser válido.
pub fn validate_optional_email(val: &str) -> Result<(), ValidationError> {
    if !val.trim().is_empty() && !val.trim().validate_email() {
        let mut err = ValidationError::new("email");
        err.message = Some("invalid_email".into());
        return Err(err);
    }
    Ok(())
}

/// Strings opcionais: "" e "   " contam como ausentes.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DateWindowQuery {
    /// Data inicial inclusiva (YYYY-MM-DD)
    pub date_from: Option<NaiveDate>,
    /// Data final inclusiva (YYYY-MM-DD)
    pub date_to: Option<NaiveDate>,
}

impl DateWindowQuery {
    pub fn window(&self, locale: &Locale, store: &I18nStore) -> Result<DateWindow, ApiError> {
        DateWindow::new(self.date_from, self.date_to).map_err(|e| e.to_api_error(locale, store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_amount_rejects_zero_and_negative() {
        assert!(validate_positive_amount(&Decimal::new(1, 2)).is_ok());
        assert!(validate_positive_amount(&Decimal::ZERO).is_err());
        assert!(validate_positive_amount(&Decimal::new(-5, 0)).is_err());
    }

    #[test]
    fn blank_email_is_accepted() {
        assert!(validate_optional_email("").is_ok());
        assert!(validate_optional_email("ana@example.com").is_ok());
        assert!(validate_optional_email("ana").is_err());
    }

    #[test]
    fn blank_strings_are_absent() {
        assert_eq!(non_empty(&Some("  x ".into())), Some("x"));
        assert_eq!(non_empty(&Some("   ".into())), None);
        assert_eq!(non_empty(&None), None);
    }
}
