// src/services/dashboard_service.rs

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};

use crate::{
    common::error::AppError,
    db::{
        dashboard_repo::DebtOrder,
        filters::{Condition, Filters},
        ledger_repo::{LEDGER_DATE, LEDGER_SALESPERSON},
        ClientRepository, DashboardRepository, LedgerRepository, SalespersonRepository,
    },
    models::{
        dashboard::{
            delinquency_cutoff, ClassifiedClient, CollectorRanking, DashboardKpis,
            SalespersonRanking, DELINQUENT_LIMIT, KPI_WINDOW_DAYS, OPPORTUNITY_CEILING,
        },
        scope::{DateWindow, SalespersonScope},
    },
};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    client_repo: ClientRepository,
    ledger_repo: LedgerRepository,
    salesperson_repo: SalespersonRepository,
}

/// Condições do filtro de inadimplência sobre a view `client_debts`:
/// deve algo e não paga desde `cutoff`.
pub fn delinquent_filters(scope: SalespersonScope, cutoff: DateTime<Utc>) -> Filters {
    Filters::new()
        .scoped("cd.salesperson_id", scope)
        .with(Condition::GreaterThan("cd.debt", Decimal::ZERO))
        .with(Condition::NullOrBefore("cd.last_payment_at", cutoff))
}

/// 0 < dívida < teto de oportunidade.
pub fn opportunity_filters(scope: SalespersonScope) -> Filters {
    Filters::new()
        .scoped("cd.salesperson_id", scope)
        .with(Condition::GreaterThan("cd.debt", Decimal::ZERO))
        .with(Condition::LessThan("cd.debt", OPPORTUNITY_CEILING))
}

impl DashboardService {
    pub fn new(
        repo: DashboardRepository,
        client_repo: ClientRepository,
        ledger_repo: LedgerRepository,
        salesperson_repo: SalespersonRepository,
    ) -> Self {
        Self {
            repo,
            client_repo,
            ledger_repo,
            salesperson_repo,
        }
    }

    /// Dívida total do escopo (sem recorte de datas) e vendas/pagamentos da
    /// janela. Sem as duas datas: últimos 30 dias. `period_label` vem pronto do handler.
    pub async fn get_kpis<'e, E>(
        &self,
        executor: E,
        scope: SalespersonScope,
        window: DateWindow,
        period_label: String,
    ) -> Result<DashboardKpis, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if let Some(id) = scope.salesperson_id() {
            if !self.salesperson_repo.exists(&mut *tx, id).await? {
                return Err(AppError::SalespersonNotFound);
            }
        }

        let debt_filters = Filters::new().scoped("cd.salesperson_id", scope);
        let total_debt = self.client_repo.total_debt(&mut *tx, &debt_filters).await?;

        let mut period_filters = Filters::new().scoped(LEDGER_SALESPERSON, scope);
        period_filters = if window.is_bounded() {
            period_filters.within(LEDGER_DATE, window)
        } else {
            let since = Utc::now() - Duration::days(KPI_WINDOW_DAYS);
            period_filters.with(Condition::Since(LEDGER_DATE, since))
        };
        let total_sales = self.ledger_repo.sales_total(&mut *tx, &period_filters).await?;
        let total_payments = self
            .ledger_repo
            .payments_total(&mut *tx, &period_filters)
            .await?;

        tx.commit().await?;

        Ok(DashboardKpis {
            total_debt,
            total_sales_last_30_days: total_sales,
            total_payments_last_30_days: total_payments,
            period_label,
        })
    }

    /// Top 10 inadimplentes, maior dívida primeiro. Com `since`, o critério
    /// vira "sem pagamento desde essa data" em vez da janela de 60 dias.
    pub async fn get_delinquent<'e, E>(
        &self,
        executor: E,
        scope: SalespersonScope,
        since: Option<NaiveDate>,
    ) -> Result<Vec<ClassifiedClient>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let cutoff = match since {
            Some(date) => date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()).ok_or_else(|| {
                AppError::InvalidParameter(format!("dateFrom inválido: {date}"))
            })?,
            None => delinquency_cutoff(Utc::now()),
        };

        self.repo
            .classified_clients(
                executor,
                &delinquent_filters(scope, cutoff),
                DebtOrder::HighestFirst,
                Some(DELINQUENT_LIMIT),
            )
            .await
    }

    /// Dívidas pequenas (0 < dívida < 75), menor primeiro.
    pub async fn get_opportunities<'e, E>(
        &self,
        executor: E,
        scope: SalespersonScope,
    ) -> Result<Vec<ClassifiedClient>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .classified_clients(
                executor,
                &opportunity_filters(scope),
                DebtOrder::LowestFirst,
                None,
            )
            .await
    }

    pub async fn get_salesperson_rankings<'e, E>(
        &self,
        executor: E,
        window: DateWindow,
    ) -> Result<Vec<SalespersonRanking>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let filters = Filters::new().within(LEDGER_DATE, window);
        self.repo.salesperson_rankings(executor, &filters).await
    }

    pub async fn get_collector_rankings<'e, E>(
        &self,
        executor: E,
        window: DateWindow,
    ) -> Result<Vec<CollectorRanking>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let filters = Filters::new().within(LEDGER_DATE, window);
        self.repo.collector_rankings(executor, &filters).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::QueryBuilder;
    use uuid::Uuid;

    #[test]
    fn delinquent_predicate_renders_debt_and_payment_gap() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM client_debts cd");
        delinquent_filters(SalespersonScope::Salesperson(Uuid::nil()), Utc::now())
            .push_where(&mut qb);
        assert_eq!(
            qb.sql(),
            "SELECT * FROM client_debts cd WHERE cd.salesperson_id = $1 AND cd.debt > $2 \
             AND (cd.last_payment_at IS NULL OR cd.last_payment_at < $3)"
        );
    }

    #[test]
    fn opportunity_predicate_is_an_open_interval() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM client_debts cd");
        opportunity_filters(SalespersonScope::All).push_where(&mut qb);
        assert_eq!(
            qb.sql(),
            "SELECT * FROM client_debts cd WHERE cd.debt > $1 AND cd.debt < $2"
        );
    }
}
