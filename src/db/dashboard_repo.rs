// src/db/dashboard_repo.rs

use sqlx::{Executor, Postgres, QueryBuilder};

use crate::{
    common::error::AppError,
    db::{client_repo::CLIENT_DEBTS_CTE, filters::Filters},
    models::dashboard::{ClassifiedClient, CollectorRanking, SalespersonRanking},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebtOrder {
    HighestFirst,
    LowestFirst,
}

#[derive(Clone, Default)]
pub struct DashboardRepository;

// Totais por vendedor de uma tabela de lançamentos; vendedores sem
// movimento entram com zero. `filters` usa `l` (lançamento) e `c` (cliente).
fn ranking_query(
    table: &str,
    total_alias: &str,
    count_alias: &str,
    filters: &Filters,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new(format!(
        "WITH totals AS (SELECT c.salesperson_id, SUM(l.amount) AS total, COUNT(*) AS entries \
         FROM {table} l JOIN clients c ON c.id = l.client_id"
    ));
    filters.push_where(&mut qb);
    qb.push(format!(
        " GROUP BY c.salesperson_id) \
         SELECT sp.id, sp.name, sp.email, \
         COALESCE(t.total, 0) AS {total_alias}, COALESCE(t.entries, 0) AS {count_alias} \
         FROM salespeople sp LEFT JOIN totals t ON t.salesperson_id = sp.id \
         ORDER BY {total_alias} DESC, sp.name ASC"
    ));
    qb
}

impl DashboardRepository {
    pub fn new() -> Self {
        Self
    }

    /// Clientes da view `client_debts` (alias `cd`) que passam nos filtros,
    /// ordenados pela dívida.
    pub async fn classified_clients<'e, E>(
        &self,
        executor: E,
        filters: &Filters,
        order: DebtOrder,
        limit: Option<i64>,
    ) -> Result<Vec<ClassifiedClient>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(CLIENT_DEBTS_CTE);
        qb.push(
            "SELECT cd.id, cd.name, cd.phone, cd.email, cd.salesperson_id, cd.salesperson_name, \
             cd.debt, cd.last_payment_at AS last_payment_date FROM client_debts cd",
        );
        filters.push_where(&mut qb);
        qb.push(match order {
            DebtOrder::HighestFirst => " ORDER BY cd.debt DESC, cd.name ASC",
            DebtOrder::LowestFirst => " ORDER BY cd.debt ASC, cd.name ASC",
        });
        if let Some(limit) = limit {
            qb.push(" LIMIT ").push_bind(limit);
        }

        let clients = qb
            .build_query_as::<ClassifiedClient>()
            .fetch_all(executor)
            .await?;
        Ok(clients)
    }

    pub async fn salesperson_rankings<'e, E>(
        &self,
        executor: E,
        filters: &Filters,
    ) -> Result<Vec<SalespersonRanking>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = ranking_query("sales", "total_sold", "sale_count", filters);
        let rankings = qb
            .build_query_as::<SalespersonRanking>()
            .fetch_all(executor)
            .await?;
        Ok(rankings)
    }

    pub async fn collector_rankings<'e, E>(
        &self,
        executor: E,
        filters: &Filters,
    ) -> Result<Vec<CollectorRanking>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = ranking_query("payments", "total_collected", "payment_count", filters);
        let rankings = qb
            .build_query_as::<CollectorRanking>()
            .fetch_all(executor)
            .await?;
        Ok(rankings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::filters::Condition;
    use chrono::NaiveDate;

    #[test]
    fn ranking_filters_apply_inside_the_aggregate() {
        let from = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let filters = Filters::new().with(Condition::DateOnOrAfter("l.created_at", from));
        let qb = ranking_query("sales", "total_sold", "sale_count", &filters);
        let sql = qb.sql();

        assert!(sql.contains(
            "FROM sales l JOIN clients c ON c.id = l.client_id \
             WHERE (l.created_at AT TIME ZONE 'UTC')::date >= $1 GROUP BY"
        ));
        assert!(sql.ends_with("ORDER BY total_sold DESC, sp.name ASC"));
    }
}
