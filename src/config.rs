// src/config.rs

use std::{env, path::PathBuf, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        AnalyticsRepository, ClientRepository, ClosureRepository, DashboardRepository,
        HistoricalRepository, LedgerRepository, SalespersonRepository,
    },
    services::{
        analytics_service::AnalyticsService, client_service::ClientService,
        closure_service::ClosureService, dashboard_service::DashboardService,
        document_service::DocumentService, historical_service::HistoricalService,
        import_service::ImportService, ledger_service::LedgerService,
        salesperson_service::SalespersonService,
    },
};

/// Configuração lida do ambiente (.env é carregado antes).
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub bind_address: String,
    pub cors_origin: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub fonts_dir: PathBuf,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} inválido: '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;

        Ok(Self {
            database_url,
            bind_address: var_or("BIND_ADDRESS", "0.0.0.0:5000"),
            cors_origin: var_or("CORS_ORIGIN", "http://localhost:5173"),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", 5)?,
            db_acquire_timeout: Duration::from_secs(parse_var("DB_ACQUIRE_TIMEOUT_SECS", 3)?),
            fonts_dir: PathBuf::from(var_or("FONTS_DIR", "./fonts")),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: Arc<I18nStore>,
    pub salesperson_service: SalespersonService,
    pub client_service: ClientService,
    pub ledger_service: LedgerService,
    pub dashboard_service: DashboardService,
    pub closure_service: ClosureService,
    pub import_service: ImportService,
    pub document_service: DocumentService,
    pub analytics_service: AnalyticsService,
    pub historical_service: HistoricalService,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(settings.db_acquire_timeout)
            .connect(&settings.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Self::from_pool(db_pool, settings)
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_pool(db_pool: PgPool, settings: &Settings) -> anyhow::Result<Self> {
        let i18n_store = Arc::new(I18nStore::load()?);

        let salesperson_repo = SalespersonRepository::new();
        let client_repo = ClientRepository::new();
        let ledger_repo = LedgerRepository::new();
        let closure_repo = ClosureRepository::new();

        Ok(Self {
            db_pool,
            i18n_store,
            salesperson_service: SalespersonService::new(
                salesperson_repo.clone(),
                client_repo.clone(),
            ),
            client_service: ClientService::new(
                client_repo.clone(),
                salesperson_repo.clone(),
                ledger_repo.clone(),
            ),
            ledger_service: LedgerService::new(ledger_repo.clone(), client_repo.clone()),
            dashboard_service: DashboardService::new(
                DashboardRepository::new(),
                client_repo.clone(),
                ledger_repo.clone(),
                salesperson_repo.clone(),
            ),
            closure_service: ClosureService::new(
                closure_repo.clone(),
                client_repo.clone(),
                ledger_repo.clone(),
            ),
            import_service: ImportService::new(salesperson_repo, client_repo, ledger_repo),
            document_service: DocumentService::new(closure_repo, settings.fonts_dir.clone()),
            analytics_service: AnalyticsService::new(AnalyticsRepository::new()),
            historical_service: HistoricalService::new(HistoricalRepository::new()),
        })
    }
}
