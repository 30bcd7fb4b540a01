// src/services/closure_service.rs

use chrono::NaiveDate;
use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        closure_repo::exact_scope,
        filters::{Condition, Filters},
        ledger_repo::{LEDGER_DATE, LEDGER_SALESPERSON},
        ClientRepository, ClosureRepository, LedgerRepository,
    },
    models::{
        closure::{ClosurePeriod, MonthClosureView, PeriodMetrics},
        scope::{DateWindow, SalespersonScope},
    },
};

/// Dados informados por quem fecha o período.
#[derive(Debug, Clone, Copy)]
pub struct NewClosure<'a> {
    pub name: &'a str,
    pub scope: SalespersonScope,
    pub description: Option<&'a str>,
    pub closed_by: Option<&'a str>,
}

/// Filtros da listagem de fechamentos.
#[derive(Debug, Clone, Default)]
pub struct ClosureQuery {
    pub search: Option<String>,
    /// `None` = não filtra; `Some(All)` = só fechamentos gerais
    pub scope: Option<SalespersonScope>,
    pub window: DateWindow,
}

#[derive(Clone)]
pub struct ClosureService {
    repo: ClosureRepository,
    client_repo: ClientRepository,
    ledger_repo: LedgerRepository,
}

impl ClosureService {
    pub fn new(
        repo: ClosureRepository,
        client_repo: ClientRepository,
        ledger_repo: LedgerRepository,
    ) -> Self {
        Self {
            repo,
            client_repo,
            ledger_repo,
        }
    }

    /// Vendas e pagamentos do período + dívida atual (histórica, não só do
    /// período) do escopo.
    pub async fn period_metrics(
        &self,
        conn: &mut PgConnection,
        scope: SalespersonScope,
        period: ClosurePeriod,
    ) -> Result<PeriodMetrics, AppError> {
        let window = DateWindow {
            from: Some(period.date_from),
            to: Some(period.date_to),
        };
        let ledger_filters = Filters::new()
            .scoped(LEDGER_SALESPERSON, scope)
            .within(LEDGER_DATE, window);
        let debt_filters = Filters::new().scoped("cd.salesperson_id", scope);

        let total_sales = self.ledger_repo.sales_total(&mut *conn, &ledger_filters).await?;
        let total_payments = self
            .ledger_repo
            .payments_total(&mut *conn, &ledger_filters)
            .await?;
        let total_debt = self.client_repo.total_debt(&mut *conn, &debt_filters).await?;

        Ok(PeriodMetrics {
            total_sales,
            total_payments,
            total_debt,
            net_amount: total_sales - total_payments,
        })
    }

    /// Fecha o período que vai do dia seguinte ao último fechamento do mesmo
    /// escopo (ou dia 1 do mês) até `today`. Se as métricas falharem o
    /// fechamento é gravado com zeros.
    pub async fn create<'e, E>(
        &self,
        executor: E,
        input: NewClosure<'_>,
        today: NaiveDate,
    ) -> Result<MonthClosureView, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        self.repo.lock_scope(&mut *tx, input.scope).await?;
        let last_date_to = self.repo.latest_date_to(&mut *tx, input.scope).await?;
        let period = match ClosurePeriod::next(last_date_to, today) {
            Some(period) => period,
            None => return Err(AppError::ClosurePeriodEmpty(last_date_to.unwrap_or(today))),
        };

        // Savepoint: um erro nas métricas não pode abortar a transação
        let metrics = {
            let mut savepoint = (&mut *tx).begin().await?;
            match self.period_metrics(&mut savepoint, input.scope, period).await {
                Ok(metrics) => {
                    savepoint.commit().await?;
                    metrics
                }
                Err(e) => {
                    tracing::error!(
                        "Falha ao calcular métricas do período {} a {}: {}",
                        period.date_from,
                        period.date_to,
                        e
                    );
                    savepoint.rollback().await?;
                    PeriodMetrics::default()
                }
            }
        };

        let closure = self
            .repo
            .create(
                &mut *tx,
                input.name,
                period,
                input.scope.salesperson_id(),
                metrics,
                input.description,
                input.closed_by,
            )
            .await?;
        let view = self
            .repo
            .find_by_id(&mut *tx, closure.id)
            .await?
            .ok_or(AppError::ClosureNotFound)?;

        tx.commit().await?;

        tracing::info!(
            "✅ Fechamento '{}' criado: {} a {} (vendas {}, pagamentos {})",
            closure.name,
            period.date_from,
            period.date_to,
            metrics.total_sales,
            metrics.total_payments
        );

        Ok(view.into())
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        query: &ClosureQuery,
    ) -> Result<Vec<MonthClosureView>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Janela: fechamentos que se sobrepõem a [from, to]
        let filters = Filters::new()
            .search(&["mc.name"], query.search.as_deref())
            .with_opt(query.scope.map(|scope| exact_scope("mc.salesperson_id", scope)))
            .with_opt(query.window.from.map(|d| Condition::DayOnOrAfter("mc.date_to", d)))
            .with_opt(query.window.to.map(|d| Condition::DayOnOrBefore("mc.date_from", d)));

        let rows = self.repo.list(executor, &filters).await?;
        Ok(rows.into_iter().map(MonthClosureView::from).collect())
    }

    pub async fn get<'e, E>(&self, executor: E, id: Uuid) -> Result<MonthClosureView, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_by_id(executor, id)
            .await?
            .map(MonthClosureView::from)
            .ok_or(AppError::ClosureNotFound)
    }

    /// Só renomeia / troca a descrição; os totais nunca são recalculados.
    pub async fn update_labels<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<MonthClosureView, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        if !self.repo.update_labels(&mut *tx, id, name, description).await? {
            return Err(AppError::ClosureNotFound);
        }
        let view = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::ClosureNotFound)?;
        tx.commit().await?;
        Ok(view.into())
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete(executor, id).await? {
            return Err(AppError::ClosureNotFound);
        }
        tracing::info!("Fechamento {} removido", id);
        Ok(())
    }
}
