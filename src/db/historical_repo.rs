// src/db/historical_repo.rs

use sqlx::{Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::historical::{HistoricalPayment, HistoricalPeriodSummary, HistoricalSale},
};

const SALE_COLUMNS: &str = "id, cod_com, cod_art, cod_cli, nombre_cli, apellidos_cli, nombre_art, \
     precio, cantidad, subtotal, total, fecha_com, vista, cod_user, period_label";
const PAYMENT_COLUMNS: &str = "id, cod_pago, cod_cliente_p, nombre_c_p, apellidos_c_p, fecha_pago, \
     tipo_de_pago, cantidad_pago, vista, cod_user, period_label";

#[derive(Clone, Default)]
pub struct HistoricalRepository;

// Agregado de uma tabela legada por period_label. Com vendedor, só entram
// as linhas cujo código de cliente bate com clients.internal_code dele.
fn push_period_stats(
    qb: &mut QueryBuilder<'static, Postgres>,
    table: &str,
    client_code: &str,
    amount: &str,
    salesperson_id: Option<Uuid>,
) {
    qb.push(format!(
        "SELECT h.period_label, COUNT(*) AS n, COALESCE(SUM(h.{amount}), 0) AS total FROM {table} h"
    ));
    if let Some(id) = salesperson_id {
        qb.push(format!(
            " JOIN clients c ON c.internal_code = h.{client_code}::text WHERE c.salesperson_id = "
        ))
        .push_bind(id);
    }
    qb.push(" GROUP BY h.period_label");
}

impl HistoricalRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn period_summaries<'e, E>(
        &self,
        executor: E,
        salesperson_id: Option<Uuid>,
    ) -> Result<Vec<HistoricalPeriodSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("WITH sale_stats AS (");
        push_period_stats(&mut qb, "historical_sales", "cod_cli", "total", salesperson_id);
        qb.push("), payment_stats AS (");
        push_period_stats(
            &mut qb,
            "historical_payments",
            "cod_cliente_p",
            "cantidad_pago",
            salesperson_id,
        );
        qb.push(
            "), labels AS (SELECT period_label FROM sale_stats \
             UNION SELECT period_label FROM payment_stats) \
             SELECT lb.period_label, \
             COALESCE(ss.n, 0) AS sales_count, COALESCE(ss.total, 0) AS sales_total, \
             COALESCE(ps.n, 0) AS payments_count, COALESCE(ps.total, 0) AS payments_total, \
             COALESCE(ss.total, 0) - COALESCE(ps.total, 0) AS balance \
             FROM labels lb \
             LEFT JOIN sale_stats ss ON ss.period_label = lb.period_label \
             LEFT JOIN payment_stats ps ON ps.period_label = lb.period_label \
             ORDER BY lb.period_label ASC",
        );

        let rows = qb
            .build_query_as::<HistoricalPeriodSummary>()
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    pub async fn sales_by_client_code<'e, E>(
        &self,
        executor: E,
        code: i32,
    ) -> Result<Vec<HistoricalSale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {SALE_COLUMNS} FROM historical_sales WHERE cod_cli = $1 \
             ORDER BY fecha_com DESC, id DESC"
        );
        let sales = sqlx::query_as::<_, HistoricalSale>(&sql)
            .bind(code)
            .fetch_all(executor)
            .await?;
        Ok(sales)
    }

    pub async fn payments_by_client_code<'e, E>(
        &self,
        executor: E,
        code: i32,
    ) -> Result<Vec<HistoricalPayment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {PAYMENT_COLUMNS} FROM historical_payments WHERE cod_cliente_p = $1 \
             ORDER BY fecha_pago DESC NULLS LAST, id DESC"
        );
        let payments = sqlx::query_as::<_, HistoricalPayment>(&sql)
            .bind(code)
            .fetch_all(executor)
            .await?;
        Ok(payments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unscoped_stats_do_not_join_clients() {
        let mut qb = QueryBuilder::<Postgres>::new("");
        push_period_stats(&mut qb, "historical_sales", "cod_cli", "total", None);
        assert!(!qb.sql().contains("JOIN clients"));
    }

    #[test]
    fn scoped_stats_join_by_internal_code() {
        let mut qb = QueryBuilder::<Postgres>::new("");
        push_period_stats(
            &mut qb,
            "historical_payments",
            "cod_cliente_p",
            "cantidad_pago",
            Some(Uuid::nil()),
        );
        assert!(qb.sql().contains(
            "JOIN clients c ON c.internal_code = h.cod_cliente_p::text WHERE c.salesperson_id = $1"
        ));
    }
}
