// src/services/historical_service.rs

use sqlx::{Acquire, Executor, Postgres};

use crate::{
    common::error::AppError,
    db::HistoricalRepository,
    models::{
        historical::{ClientHistory, HistoricalOverview},
        scope::SalespersonScope,
    },
};

#[derive(Clone)]
pub struct HistoricalService {
    repo: HistoricalRepository,
}

impl HistoricalService {
    pub fn new(repo: HistoricalRepository) -> Self {
        Self { repo }
    }

    pub async fn overview<'e, E>(
        &self,
        executor: E,
        scope: SalespersonScope,
    ) -> Result<HistoricalOverview, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let periods = self
            .repo
            .period_summaries(executor, scope.salesperson_id())
            .await?;
        Ok(HistoricalOverview::from_periods(periods))
    }

    /// Vendas e pagamentos legados de um código de cliente (numérico no
    /// sistema antigo).
    pub async fn client_history<'e, E>(
        &self,
        executor: E,
        internal_code: &str,
    ) -> Result<ClientHistory, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let code: i32 = internal_code.trim().parse().map_err(|_| {
            AppError::InvalidParameter(format!("código de cliente inválido: {internal_code}"))
        })?;

        let mut conn = executor.acquire().await?;
        let sales = self.repo.sales_by_client_code(&mut *conn, code).await?;
        let payments = self.repo.payments_by_client_code(&mut *conn, code).await?;

        Ok(ClientHistory::new(code.to_string(), sales, payments))
    }
}
