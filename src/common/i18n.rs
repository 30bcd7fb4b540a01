// src/common/i18n.rs

use std::collections::HashMap;

use anyhow::Context;

pub const FALLBACK_LANG: &str = "en";

// Catálogos embutidos no binário: (idioma, conteúdo JSON)
const CATALOGS: &[(&str, &str)] = &[
    ("en", include_str!("../../locales/en.json")),
    ("es", include_str!("../../locales/es.json")),
];

/// Mensagens traduzidas, indexadas por idioma e depois por chave.
#[derive(Debug, Clone)]
pub struct I18nStore {
    catalogs: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn load() -> anyhow::Result<Self> {
        let mut catalogs = HashMap::new();
        for (lang, raw) in CATALOGS {
            let messages: HashMap<String, String> = serde_json::from_str(raw)
                .with_context(|| format!("catálogo de mensagens '{}' inválido", lang))?;
            catalogs.insert(lang.to_string(), messages);
        }
        Ok(Self { catalogs })
    }

    /// Busca a chave no idioma pedido, depois no inglês; se nada existir
    /// devolve a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        [lang, FALLBACK_LANG]
            .iter()
            .filter_map(|l| self.catalogs.get(*l))
            .find_map(|messages| messages.get(key))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}
