// src/models/import.rs

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Descrição da venda criada com a dívida inicial de um cliente importado.
pub const OPENING_BALANCE_DESCRIPTION: &str = "migrated initial balance";

// Colunas do CSV
pub const COL_CLIENT_NAME: &str = "nombre_cliente";
pub const COL_PHONE: &str = "telefono_cliente";
pub const COL_EMAIL: &str = "email_cliente";
pub const COL_SALESPERSON: &str = "nombre_vendedor";
pub const COL_INITIAL_DEBT: &str = "deuda_inicial";

/// Linha crua do CSV: cabeçalho -> valor (já sem espaços nas pontas).
pub type CsvRecord = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    pub client_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub salesperson_name: String,
    pub initial_debt: Decimal,
}

/// Motivo de rejeição de uma linha; vira chave de mensagem traduzida.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowRejection {
    MissingRequiredFields,
    InvalidInitialDebt,
}

impl RowRejection {
    pub fn message_key(&self) -> &'static str {
        match self {
            RowRejection::MissingRequiredFields => "missing_required_fields",
            RowRejection::InvalidInitialDebt => "invalid_initial_debt",
        }
    }
}

fn field<'a>(record: &'a CsvRecord, column: &str) -> Option<&'a str> {
    record
        .get(column)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

impl ImportRow {
    pub fn from_record(record: &CsvRecord) -> Result<Self, RowRejection> {
        let (Some(client_name), Some(phone), Some(salesperson_name), Some(raw_debt)) = (
            field(record, COL_CLIENT_NAME),
            field(record, COL_PHONE),
            field(record, COL_SALESPERSON),
            field(record, COL_INITIAL_DEBT),
        ) else {
            return Err(RowRejection::MissingRequiredFields);
        };

        let initial_debt = Decimal::from_str(raw_debt)
            .ok()
            .filter(|d| !d.is_sign_negative())
            .ok_or(RowRejection::InvalidInitialDebt)?;

        Ok(Self {
            client_name: client_name.to_string(),
            phone: phone.to_string(),
            email: field(record, COL_EMAIL).map(String::from),
            salesperson_name: salesperson_name.to_string(),
            initial_debt,
        })
    }

    pub fn has_opening_balance(&self) -> bool {
        self.initial_debt > Decimal::ZERO
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportedClient {
    pub client_id: Uuid,
    pub client_name: String,
    pub salesperson_id: Uuid,
    pub salesperson_name: String,
    pub initial_debt: Decimal,
    pub sale_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportFailure {
    pub record: CsvRecord,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    #[schema(example = "Import completed")]
    pub message: String,
    pub imported: usize,
    pub failed: usize,
    pub results: Vec<ImportedClient>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ImportFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> CsvRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parses_complete_row() {
        let row = ImportRow::from_record(&record(&[
            (COL_CLIENT_NAME, " Ana Ruiz "),
            (COL_PHONE, "600111222"),
            (COL_EMAIL, ""),
            (COL_SALESPERSON, "Bego"),
            (COL_INITIAL_DEBT, "120.50"),
        ]))
        .unwrap();

        assert_eq!(row.client_name, "Ana Ruiz");
        assert_eq!(row.email, None);
        assert_eq!(row.initial_debt, Decimal::from_str("120.50").unwrap());
        assert!(row.has_opening_balance());
    }

    #[test]
    fn zero_debt_creates_no_opening_sale() {
        let row = ImportRow::from_record(&record(&[
            (COL_CLIENT_NAME, "Ana"),
            (COL_PHONE, "600"),
            (COL_SALESPERSON, "Bego"),
            (COL_INITIAL_DEBT, "0"),
        ]))
        .unwrap();
        assert!(!row.has_opening_balance());
    }

    #[test]
    fn missing_required_fields_are_rejected() {
        let err = ImportRow::from_record(&record(&[
            (COL_CLIENT_NAME, "Ana"),
            (COL_SALESPERSON, "Bego"),
            (COL_INITIAL_DEBT, "10"),
        ]))
        .unwrap_err();
        assert_eq!(err, RowRejection::MissingRequiredFields);
    }

    #[test]
    fn invalid_or_negative_debt_is_rejected() {
        for raw in ["abc", "-5"] {
            let err = ImportRow::from_record(&record(&[
                (COL_CLIENT_NAME, "Ana"),
                (COL_PHONE, "600"),
                (COL_SALESPERSON, "Bego"),
                (COL_INITIAL_DEBT, raw),
            ]))
            .unwrap_err();
            assert_eq!(err, RowRejection::InvalidInitialDebt, "valor {raw}");
        }
    }
}
