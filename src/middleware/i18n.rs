// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::common::i18n::FALLBACK_LANG;

// Extrator de idioma (Accept-Language). Guarda só o idioma primário: "es-ES" -> "es".
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Locale {
    pub fn from_header(header_str: &str) -> Self {
        let lang = accept_language::parse(header_str)
            .first()
            .map(|tag| tag.split('-').next().unwrap_or(tag.as_str()).to_lowercase())
            .unwrap_or_else(|| FALLBACK_LANG.to_string());
        Locale(lang)
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale(FALLBACK_LANG.to_string())
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_default();

        Ok(locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_primary_subtag_only() {
        assert_eq!(Locale::from_header("es-ES,es;q=0.9,en;q=0.8").0, "es");
        assert_eq!(Locale::from_header("en").0, "en");
    }

    #[test]
    fn empty_header_defaults_to_english() {
        assert_eq!(Locale::from_header("").0, "en");
    }
}
