// src/db/analytics_repo.rs

use sqlx::{Executor, Postgres, QueryBuilder};

use crate::{
    common::error::AppError,
    db::{
        client_repo::CLIENT_DEBTS_CTE,
        filters::{Condition, Filters},
    },
    models::analytics::{
        DebtorActivity, IdleSalesperson, MonthlySalespersonData, SalespersonComparison, TrendPoint,
    },
};

/// Última atividade do cliente na view `client_debts`: o último pagamento,
/// ou a última venda se nunca pagou.
pub const LAST_ACTIVITY: &str = "COALESCE(cd.last_payment_at, cd.last_sale_at)";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedgerTable {
    Sales,
    Payments,
}

impl LedgerTable {
    fn name(self) -> &'static str {
        match self {
            LedgerTable::Sales => "sales",
            LedgerTable::Payments => "payments",
        }
    }
}

#[derive(Clone, Default)]
pub struct AnalyticsRepository;

// Atividade por vendedor dentro de `window` (aliases `l` e `c`). Cada bloco
// é agregado separado e só depois ligado ao vendedor.
fn activity_query(window: &Filters, salespeople: &Filters) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new(
        "WITH sale_stats AS (SELECT c.salesperson_id, COUNT(l.id) AS n, SUM(l.amount) AS total \
         FROM sales l JOIN clients c ON c.id = l.client_id",
    );
    window.push_where(&mut qb);
    qb.push(
        " GROUP BY c.salesperson_id), \
         payment_stats AS (SELECT c.salesperson_id, COUNT(l.id) AS n, SUM(l.amount) AS total \
         FROM payments l JOIN clients c ON c.id = l.client_id",
    );
    window.push_where(&mut qb);
    qb.push(
        " GROUP BY c.salesperson_id), \
         active AS (SELECT salesperson_id, COUNT(DISTINCT client_id) AS n FROM (\
         SELECT c.salesperson_id, l.client_id FROM sales l JOIN clients c ON c.id = l.client_id",
    );
    window.push_where(&mut qb);
    qb.push(
        " UNION SELECT c.salesperson_id, l.client_id FROM payments l \
         JOIN clients c ON c.id = l.client_id",
    );
    window.push_where(&mut qb);
    qb.push(
        ") moves GROUP BY salesperson_id), \
         client_counts AS (SELECT salesperson_id, COUNT(*) AS n FROM clients GROUP BY salesperson_id) \
         SELECT sp.id AS salesperson_id, sp.name AS salesperson_name, \
         COALESCE(ss.n, 0) AS sales_count, COALESCE(ss.total, 0) AS sales_amount, \
         COALESCE(ps.n, 0) AS payments_count, COALESCE(ps.total, 0) AS payments_amount, \
         COALESCE(cc.n, 0) AS client_count, COALESCE(a.n, 0) AS active_clients, \
         COALESCE(ss.total, 0) - COALESCE(ps.total, 0) AS pending_debt \
         FROM salespeople sp \
         LEFT JOIN sale_stats ss ON ss.salesperson_id = sp.id \
         LEFT JOIN payment_stats ps ON ps.salesperson_id = sp.id \
         LEFT JOIN active a ON a.salesperson_id = sp.id \
         LEFT JOIN client_counts cc ON cc.salesperson_id = sp.id",
    );
    salespeople.push_where(&mut qb);
    qb
}

// Série diária (dia UTC) de uma tabela de lançamentos; `filters` usa `l` e `c`.
fn trend_query(table: LedgerTable, filters: &Filters) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new(format!(
        "SELECT (l.created_at AT TIME ZONE 'UTC')::date AS period, \
         COUNT(*) AS count, SUM(l.amount) AS amount \
         FROM {} l JOIN clients c ON c.id = l.client_id",
        table.name()
    ));
    filters.push_where(&mut qb);
    qb.push(" GROUP BY period ORDER BY period ASC");
    qb
}

// Vendedores sem nenhum lançamento que passe em `window` (aliases `l` e `c`).
// `salespeople` usa `sp`.
fn idle_query(window: &Filters, salespeople: &Filters) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new(
        "WITH moving AS (SELECT c.salesperson_id FROM sales l JOIN clients c ON c.id = l.client_id",
    );
    window.push_where(&mut qb);
    qb.push(" UNION SELECT c.salesperson_id FROM payments l JOIN clients c ON c.id = l.client_id");
    window.push_where(&mut qb);
    qb.push(
        ") SELECT sp.id AS salesperson_id, sp.name AS salesperson_name FROM salespeople sp \
         LEFT JOIN moving m ON m.salesperson_id = sp.id",
    );
    salespeople
        .clone()
        .with(Condition::IsNull("m.salesperson_id"))
        .push_where(&mut qb);
    qb.push(" ORDER BY sp.name ASC");
    qb
}

impl AnalyticsRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn comparison<'e, E>(
        &self,
        executor: E,
        window: &Filters,
    ) -> Result<Vec<SalespersonComparison>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = activity_query(window, &Filters::new());
        qb.push(" ORDER BY sales_amount DESC, sp.name ASC");

        let rows = qb
            .build_query_as::<SalespersonComparison>()
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    /// `salespeople` usa o alias `sp` (ex: restringir a um vendedor).
    pub async fn monthly<'e, E>(
        &self,
        executor: E,
        window: &Filters,
        salespeople: &Filters,
    ) -> Result<Vec<MonthlySalespersonData>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = activity_query(window, salespeople);
        qb.push(" ORDER BY sp.name ASC");

        let rows = qb
            .build_query_as::<MonthlySalespersonData>()
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    /// Mesma atividade da comparação, restrita por `salespeople` (alias
    /// `sp`), quem mais cobrou primeiro.
    pub async fn profitability<'e, E>(
        &self,
        executor: E,
        window: &Filters,
        salespeople: &Filters,
    ) -> Result<Vec<SalespersonComparison>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = activity_query(window, salespeople);
        qb.push(" ORDER BY payments_amount DESC, sp.name ASC");

        let rows = qb
            .build_query_as::<SalespersonComparison>()
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    pub async fn daily_trend<'e, E>(
        &self,
        executor: E,
        table: LedgerTable,
        filters: &Filters,
    ) -> Result<Vec<TrendPoint>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = trend_query(table, filters);
        let points = qb
            .build_query_as::<TrendPoint>()
            .fetch_all(executor)
            .await?;
        Ok(points)
    }

    /// Clientes da view `client_debts` (alias `cd`), maior dívida primeiro.
    pub async fn debtors<'e, E>(
        &self,
        executor: E,
        filters: &Filters,
        limit: Option<i64>,
    ) -> Result<Vec<DebtorActivity>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(CLIENT_DEBTS_CTE);
        qb.push(
            "SELECT cd.id, cd.name, cd.phone, cd.salesperson_id, cd.salesperson_name, cd.debt, \
             cd.last_sale_at, cd.last_payment_at, cd.sale_count, cd.payment_count \
             FROM client_debts cd",
        );
        filters.push_where(&mut qb);
        qb.push(" ORDER BY cd.debt DESC, cd.name ASC");
        if let Some(limit) = limit {
            qb.push(" LIMIT ").push_bind(limit);
        }

        let rows = qb
            .build_query_as::<DebtorActivity>()
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    pub async fn idle_salespeople<'e, E>(
        &self,
        executor: E,
        window: &Filters,
        salespeople: &Filters,
    ) -> Result<Vec<IdleSalesperson>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = idle_query(window, salespeople);
        let rows = qb
            .build_query_as::<IdleSalesperson>()
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn window_is_bound_once_per_aggregate() {
        let from = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let window = Filters::new().with(Condition::DateOnOrAfter("l.created_at", from));
        let salespeople = Filters::new().with(Condition::UuidEq("sp.id", Uuid::nil()));
        let qb = activity_query(&window, &salespeople);
        let sql = qb.sql();

        for n in 1..=4 {
            let bound = format!("(l.created_at AT TIME ZONE 'UTC')::date >= ${n}");
            assert!(sql.contains(&bound), "falta ${n}");
        }
        assert!(sql.ends_with("WHERE sp.id = $5"));
    }

    #[test]
    fn trend_groups_by_utc_day() {
        let scope = Filters::new().with(Condition::UuidEq("c.salesperson_id", Uuid::nil()));
        let qb = trend_query(LedgerTable::Payments, &scope);
        let sql = qb.sql();

        assert!(sql.starts_with("SELECT (l.created_at AT TIME ZONE 'UTC')::date AS period"));
        assert!(sql.contains(
            "FROM payments l JOIN clients c ON c.id = l.client_id \
             WHERE c.salesperson_id = $1 GROUP BY period"
        ));
    }

    #[test]
    fn idle_salespeople_are_those_missing_from_the_window() {
        let since = chrono::Utc::now();
        let window = Filters::new().with(Condition::Since("l.created_at", since));
        let salespeople = Filters::new().with(Condition::UuidEq("sp.id", Uuid::nil()));
        let qb = idle_query(&window, &salespeople);
        let sql = qb.sql();

        assert!(sql.contains(
            "FROM sales l JOIN clients c ON c.id = l.client_id \
             WHERE l.created_at >= $1 UNION"
        ));
        assert!(sql.contains(
            "FROM payments l JOIN clients c ON c.id = l.client_id \
             WHERE l.created_at >= $2)"
        ));
        assert!(sql.ends_with("WHERE sp.id = $3 AND m.salesperson_id IS NULL ORDER BY sp.name ASC"));
    }
}
