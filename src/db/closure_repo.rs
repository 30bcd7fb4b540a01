// src/db/closure_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::filters::{Condition, Filters},
    models::{
        closure::{ClosurePeriod, MonthClosure, MonthClosureRow, PeriodMetrics},
        scope::SalespersonScope,
    },
};

const CLOSURE_COLUMNS: &str = "id, name, date_from, date_to, salesperson_id, total_sales, \
     total_payments, total_debt, net_amount, description, closed_by, created_at, updated_at";

const CLOSURE_VIEW_SELECT: &str = "SELECT mc.id, mc.name, mc.date_from, mc.date_to, \
     mc.salesperson_id, mc.total_sales, mc.total_payments, mc.total_debt, mc.net_amount, \
     mc.description, mc.closed_by, mc.created_at, mc.updated_at, \
     sp.name AS salesperson_name, sp.email AS salesperson_email \
     FROM month_closures mc \
     LEFT JOIN salespeople sp ON sp.id = mc.salesperson_id";

/// Filtro exato do escopo: NULL para "todos", senão o id do vendedor.
/// Diferente de `Filters::scoped`, "todos" aqui não significa "sem filtro".
pub fn exact_scope(column: &'static str, scope: SalespersonScope) -> Condition {
    match scope {
        SalespersonScope::All => Condition::IsNull(column),
        SalespersonScope::Salesperson(id) => Condition::UuidEq(column, id),
    }
}

#[derive(Clone, Default)]
pub struct ClosureRepository;

impl ClosureRepository {
    pub fn new() -> Self {
        Self
    }

    /// Serializa a criação de fechamentos do mesmo escopo até o fim da transação.
    pub async fn lock_scope<'e, E>(
        &self,
        executor: E,
        scope: SalespersonScope,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let key = match scope {
            SalespersonScope::All => "month_closures:ALL".to_string(),
            SalespersonScope::Salesperson(id) => format!("month_closures:{id}"),
        };
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(key)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// `date_to` do fechamento mais recente exatamente deste escopo.
    pub async fn latest_date_to<'e, E>(
        &self,
        executor: E,
        scope: SalespersonScope,
    ) -> Result<Option<NaiveDate>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT date_to FROM month_closures");
        Filters::new()
            .with(exact_scope("salesperson_id", scope))
            .push_where(&mut qb);
        qb.push(" ORDER BY date_to DESC LIMIT 1");

        let date_to = qb
            .build_query_scalar::<NaiveDate>()
            .fetch_optional(executor)
            .await?;
        Ok(date_to)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        period: ClosurePeriod,
        salesperson_id: Option<Uuid>,
        metrics: PeriodMetrics,
        description: Option<&str>,
        closed_by: Option<&str>,
    ) -> Result<MonthClosure, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO month_closures (name, date_from, date_to, salesperson_id, total_sales, \
             total_payments, total_debt, net_amount, description, closed_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {CLOSURE_COLUMNS}"
        );
        sqlx::query_as::<_, MonthClosure>(&sql)
            .bind(name)
            .bind(period.date_from)
            .bind(period.date_to)
            .bind(salesperson_id)
            .bind(metrics.total_sales)
            .bind(metrics.total_payments)
            .bind(metrics.total_debt)
            .bind(metrics.net_amount)
            .bind(description)
            .bind(closed_by)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::SalespersonNotFound;
                    }
                }
                e.into()
            })
    }

    /// Listagem; `filters` usa os aliases `mc` (fechamento) e `sp` (vendedor).
    pub async fn list<'e, E>(
        &self,
        executor: E,
        filters: &Filters,
    ) -> Result<Vec<MonthClosureRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(CLOSURE_VIEW_SELECT);
        filters.push_where(&mut qb);
        qb.push(" ORDER BY mc.date_to DESC, mc.created_at DESC");

        let rows = qb
            .build_query_as::<MonthClosureRow>()
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<MonthClosureRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("{CLOSURE_VIEW_SELECT} WHERE mc.id = $1");
        let row = sqlx::query_as::<_, MonthClosureRow>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    /// Só nome e descrição são editáveis. `None` mantém o valor atual.
    pub async fn update_labels<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE month_closures
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM month_closures WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_scope_matches_only_unscoped_closures() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT date_to FROM month_closures");
        Filters::new()
            .with(exact_scope("salesperson_id", SalespersonScope::All))
            .push_where(&mut qb);
        assert_eq!(qb.sql(), "SELECT date_to FROM month_closures WHERE salesperson_id IS NULL");
    }

    #[test]
    fn salesperson_scope_binds_the_id() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT date_to FROM month_closures");
        Filters::new()
            .with(exact_scope("salesperson_id", SalespersonScope::Salesperson(Uuid::nil())))
            .push_where(&mut qb);
        assert_eq!(qb.sql(), "SELECT date_to FROM month_closures WHERE salesperson_id = $1");
    }
}
