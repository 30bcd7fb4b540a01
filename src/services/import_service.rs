// src/services/import_service.rs

use sqlx::PgPool;

use crate::{
    common::{error::AppError, i18n::I18nStore},
    db::{ClientRepository, LedgerRepository, SalespersonRepository},
    middleware::i18n::Locale,
    models::import::{
        CsvRecord, ImportFailure, ImportReport, ImportRow, ImportedClient, RowRejection,
        OPENING_BALANCE_DESCRIPTION,
    },
};

/// Linha lida do arquivo; `Err` quando o próprio CSV está quebrado nela.
pub type ParsedLine = Result<CsvRecord, String>;

/// Lê o CSV inteiro (cabeçalho obrigatório). Valores e cabeçalhos chegam
/// sem espaços nas pontas; linhas com menos colunas ficam sem as chaves que
/// faltam. Bytes que não são UTF-8 (planilhas em Latin-1) viram U+FFFD e a
/// linha segue para validação.
pub fn parse_csv(bytes: &[u8]) -> Result<Vec<ParsedLine>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .byte_headers()
        .map_err(|e| AppError::InvalidCsv(e.to_string()))?
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(AppError::InvalidCsv("cabeçalho vazio".to_string()));
    }

    let lines = reader
        .byte_records()
        .map(|result| {
            result
                .map(|record| {
                    headers
                        .iter()
                        .zip(record.iter())
                        .map(|(h, v)| (h.clone(), String::from_utf8_lossy(v).into_owned()))
                        .collect::<CsvRecord>()
                })
                .map_err(|e| e.to_string())
        })
        .collect();
    Ok(lines)
}

#[derive(Debug)]
pub enum RowError {
    Malformed(String),
    Rejected(RowRejection),
    Failed(AppError),
}

#[derive(Debug, Default)]
pub struct ImportOutcome {
    pub imported: Vec<ImportedClient>,
    pub failures: Vec<(CsvRecord, RowError)>,
}

impl ImportOutcome {
    /// Monta a resposta com as mensagens de erro no idioma do cliente.
    pub fn into_report(self, locale: &Locale, store: &I18nStore) -> ImportReport {
        let lang = locale.0.as_str();
        let errors: Vec<ImportFailure> = self
            .failures
            .into_iter()
            .map(|(record, error)| {
                let error = match error {
                    RowError::Malformed(reason) => {
                        format!("{}: {}", store.translate(lang, "invalid_csv"), reason)
                    }
                    RowError::Rejected(rejection) => store.translate(lang, rejection.message_key()),
                    RowError::Failed(e) => e.to_api_error(locale, store).error,
                };
                ImportFailure { record, error }
            })
            .collect();

        ImportReport {
            message: store.translate(lang, "import_completed"),
            imported: self.imported.len(),
            failed: errors.len(),
            results: self.imported,
            errors,
        }
    }
}

#[derive(Clone)]
pub struct ImportService {
    salesperson_repo: SalespersonRepository,
    client_repo: ClientRepository,
    ledger_repo: LedgerRepository,
}

impl ImportService {
    pub fn new(
        salesperson_repo: SalespersonRepository,
        client_repo: ClientRepository,
        ledger_repo: LedgerRepository,
    ) -> Self {
        Self {
            salesperson_repo,
            client_repo,
            ledger_repo,
        }
    }

    /// Cada linha roda na sua própria transação: uma linha ruim não
    /// derruba as outras nem deixa cliente sem a venda inicial.
    pub async fn import_clients(
        &self,
        pool: &PgPool,
        bytes: &[u8],
    ) -> Result<ImportOutcome, AppError> {
        let lines = parse_csv(bytes)?;
        let mut outcome = ImportOutcome::default();

        for (index, line) in lines.into_iter().enumerate() {
            // +2: cabeçalho e numeração a partir de 1
            let line_number = index + 2;
            let record = match line {
                Ok(record) => record,
                Err(reason) => {
                    tracing::warn!("Linha {} do CSV ilegível: {}", line_number, reason);
                    outcome
                        .failures
                        .push((CsvRecord::new(), RowError::Malformed(reason)));
                    continue;
                }
            };

            let row = match ImportRow::from_record(&record) {
                Ok(row) => row,
                Err(rejection) => {
                    tracing::warn!("Linha {} rejeitada: {:?}", line_number, rejection);
                    outcome.failures.push((record, RowError::Rejected(rejection)));
                    continue;
                }
            };

            match self.import_row(pool, &row).await {
                Ok(imported) => outcome.imported.push(imported),
                Err(e) => {
                    tracing::warn!("Linha {} não importada: {}", line_number, e);
                    outcome.failures.push((record, RowError::Failed(e)));
                }
            }
        }

        tracing::info!(
            "Importação concluída: {} clientes importados, {} linhas com erro",
            outcome.imported.len(),
            outcome.failures.len()
        );
        Ok(outcome)
    }

    async fn import_row(&self, pool: &PgPool, row: &ImportRow) -> Result<ImportedClient, AppError> {
        let mut tx = pool.begin().await?;

        let salesperson = match self
            .salesperson_repo
            .find_by_name(&mut *tx, &row.salesperson_name)
            .await?
        {
            Some(existing) => existing,
            None => {
                self.salesperson_repo
                    .create(&mut *tx, &row.salesperson_name, None, None)
                    .await?
            }
        };

        let client = self
            .client_repo
            .create(
                &mut *tx,
                None,
                &row.client_name,
                Some(&row.phone),
                row.email.as_deref(),
                None,
                salesperson.id,
            )
            .await?;

        let sale_id = if row.has_opening_balance() {
            let sale = self
                .ledger_repo
                .create_sale(&mut *tx, client.id, row.initial_debt, OPENING_BALANCE_DESCRIPTION)
                .await?;
            Some(sale.id)
        } else {
            None
        };

        tx.commit().await?;

        Ok(ImportedClient {
            client_id: client.id,
            client_name: client.name,
            salesperson_id: salesperson.id,
            salesperson_name: salesperson.name,
            initial_debt: row.initial_debt,
            sale_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "nombre_cliente,telefono_cliente,email_cliente,nombre_vendedor,deuda_inicial\n";

    #[test]
    fn parses_rows_with_trimmed_values() {
        let csv = format!("{HEADER}  Ana Ruiz , 600111222 ,,Bego, 120.50\n");
        let lines = parse_csv(csv.as_bytes()).unwrap();

        assert_eq!(lines.len(), 1);
        let record = lines[0].as_ref().unwrap();
        assert_eq!(record["nombre_cliente"], "Ana Ruiz");
        assert_eq!(record["deuda_inicial"], "120.50");
        assert_eq!(record["email_cliente"], "");
    }

    #[test]
    fn short_rows_lack_the_missing_columns() {
        let csv = format!("{HEADER}Ana,600\n");
        let lines = parse_csv(csv.as_bytes()).unwrap();
        let record = lines[0].as_ref().unwrap();

        assert!(!record.contains_key("nombre_vendedor"));
        assert!(ImportRow::from_record(record).is_err());
    }

    #[test]
    fn valid_and_invalid_rows_are_counted_independently() {
        let csv = format!(
            "{HEADER}Ana,600,,Bego,10\nLuis,,,Bego,5\n\
             Eva,601,,David,abc\nPia,602,pia@x.es,David,0\n"
        );
        let lines = parse_csv(csv.as_bytes()).unwrap();
        let (ok, bad): (Vec<_>, Vec<_>) = lines
            .iter()
            .map(|l| ImportRow::from_record(l.as_ref().unwrap()))
            .partition(Result::is_ok);

        assert_eq!(ok.len(), 2);
        assert_eq!(bad.len(), 2);
    }

    #[test]
    fn latin1_bytes_keep_the_row_importable() {
        let mut csv = HEADER.as_bytes().to_vec();
        // "Muñoz" exportado em Windows-1252
        csv.extend_from_slice(b"Jos\xe9 Mu\xf1oz,600,,Bego,15\n");
        let lines = parse_csv(&csv).unwrap();

        assert_eq!(lines.len(), 1);
        let record = lines[0].as_ref().unwrap();
        assert_eq!(record["nombre_cliente"], "Jos\u{FFFD} Mu\u{FFFD}oz");
        assert_eq!(record["nombre_vendedor"], "Bego");
        let row = ImportRow::from_record(record).unwrap();
        assert_eq!(row.initial_debt, rust_decimal::Decimal::from(15));
    }

    #[test]
    fn empty_file_is_invalid() {
        assert!(matches!(parse_csv(b""), Err(AppError::InvalidCsv(_))));
    }

    #[test]
    fn report_translates_row_errors() {
        let store = I18nStore::load().unwrap();
        let outcome = ImportOutcome {
            imported: vec![],
            failures: vec![(
                CsvRecord::new(),
                RowError::Rejected(RowRejection::MissingRequiredFields),
            )],
        };

        let report = outcome.into_report(&Locale("es".into()), &store);
        assert_eq!(report.imported, 0);
        assert_eq!(report.failed, 1);
        assert_eq!(report.errors[0].error, "Faltan campos obligatorios");
        assert_eq!(report.message, "Importación completada");
    }
}
