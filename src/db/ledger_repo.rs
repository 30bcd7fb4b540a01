// src/db/ledger_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::filters::Filters,
    models::ledger::{Payment, PaymentEntry, Return, ReturnEntry, Sale, SaleEntry},
};

// Nas consultas abaixo o lançamento é sempre `l` e o cliente `c`, assim
// os mesmos filtros servem para vendas, pagamentos e devoluções.
pub const LEDGER_DATE: &str = "l.created_at";
pub const LEDGER_SALESPERSON: &str = "c.salesperson_id";

const SALE_COLUMNS: &str = "id, amount, description, client_id, created_at, updated_at";
const PAYMENT_COLUMNS: &str = "id, amount, payment_method, client_id, created_at, updated_at";
const RETURN_COLUMNS: &str =
    "id, amount, description, return_reason, client_id, created_at, updated_at";

#[derive(Clone, Default)]
pub struct LedgerRepository;

// Lançamento para cliente inexistente
fn map_client_fk(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_foreign_key_violation() {
            return AppError::ClientNotFound;
        }
    }
    e.into()
}

fn entries_query(table: &str, columns: &str) -> QueryBuilder<'static, Postgres> {
    let prefixed = columns
        .split(", ")
        .map(|col| format!("l.{col}"))
        .collect::<Vec<_>>()
        .join(", ");
    QueryBuilder::new(format!(
        "SELECT {prefixed}, c.name AS client_name, c.salesperson_id, sp.name AS salesperson_name \
         FROM {table} l \
         JOIN clients c ON c.id = l.client_id \
         JOIN salespeople sp ON sp.id = c.salesperson_id"
    ))
}

impl LedgerRepository {
    pub fn new() -> Self {
        Self
    }

    /// Soma de `amount` da tabela (`sales` ou `payments`) dentro dos filtros.
    async fn sum_amount<'e, E>(
        &self,
        executor: E,
        table: &str,
        filters: &Filters,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT COALESCE(SUM(l.amount), 0) FROM {table} l JOIN clients c ON c.id = l.client_id"
        ));
        filters.push_where(&mut qb);

        let total = qb
            .build_query_scalar::<Decimal>()
            .fetch_one(executor)
            .await?;
        Ok(total)
    }

    async fn delete_from<'e, E>(&self, executor: E, table: &str, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("DELETE FROM {table} WHERE id = $1");
        let result = sqlx::query(&sql).bind(id).execute(executor).await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  VENDAS
    // =========================================================================

    pub async fn list_sales<'e, E>(
        &self,
        executor: E,
        filters: &Filters,
    ) -> Result<Vec<SaleEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = entries_query("sales", SALE_COLUMNS);
        filters.push_where(&mut qb);
        qb.push(" ORDER BY l.created_at DESC");

        let sales = qb.build_query_as::<SaleEntry>().fetch_all(executor).await?;
        Ok(sales)
    }

    pub async fn list_sales_by_client<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
    ) -> Result<Vec<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE client_id = $1 ORDER BY created_at DESC"
        );
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(client_id)
            .fetch_all(executor)
            .await?;
        Ok(sales)
    }

    pub async fn find_sale<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = $1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(sale)
    }

    pub async fn create_sale<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
        amount: Decimal,
        description: &str,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO sales (client_id, amount, description) VALUES ($1, $2, $3) \
             RETURNING {SALE_COLUMNS}"
        );
        sqlx::query_as::<_, Sale>(&sql)
            .bind(client_id)
            .bind(amount)
            .bind(description)
            .fetch_one(executor)
            .await
            .map_err(map_client_fk)
    }

    pub async fn update_sale<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        amount: Decimal,
        description: &str,
    ) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE sales SET amount = $2, description = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING {SALE_COLUMNS}"
        );
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .bind(amount)
            .bind(description)
            .fetch_optional(executor)
            .await?;
        Ok(sale)
    }

    pub async fn delete_sale<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.delete_from(executor, "sales", id).await
    }

    pub async fn sales_total<'e, E>(
        &self,
        executor: E,
        filters: &Filters,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.sum_amount(executor, "sales", filters).await
    }

    // =========================================================================
    //  PAGAMENTOS
    // =========================================================================

    pub async fn list_payments<'e, E>(
        &self,
        executor: E,
        filters: &Filters,
    ) -> Result<Vec<PaymentEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = entries_query("payments", PAYMENT_COLUMNS);
        filters.push_where(&mut qb);
        qb.push(" ORDER BY l.created_at DESC");

        let payments = qb
            .build_query_as::<PaymentEntry>()
            .fetch_all(executor)
            .await?;
        Ok(payments)
    }

    pub async fn list_payments_by_client<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
    ) -> Result<Vec<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE client_id = $1 ORDER BY created_at DESC"
        );
        let payments = sqlx::query_as::<_, Payment>(&sql)
            .bind(client_id)
            .fetch_all(executor)
            .await?;
        Ok(payments)
    }

    pub async fn find_payment<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1");
        let payment = sqlx::query_as::<_, Payment>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(payment)
    }

    pub async fn create_payment<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
        amount: Decimal,
        payment_method: &str,
    ) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO payments (client_id, amount, payment_method) VALUES ($1, $2, $3) \
             RETURNING {PAYMENT_COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&sql)
            .bind(client_id)
            .bind(amount)
            .bind(payment_method)
            .fetch_one(executor)
            .await
            .map_err(map_client_fk)
    }

    pub async fn update_payment<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        amount: Decimal,
        payment_method: &str,
    ) -> Result<Option<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE payments SET amount = $2, payment_method = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING {PAYMENT_COLUMNS}"
        );
        let payment = sqlx::query_as::<_, Payment>(&sql)
            .bind(id)
            .bind(amount)
            .bind(payment_method)
            .fetch_optional(executor)
            .await?;
        Ok(payment)
    }

    pub async fn delete_payment<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.delete_from(executor, "payments", id).await
    }

    pub async fn payments_total<'e, E>(
        &self,
        executor: E,
        filters: &Filters,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.sum_amount(executor, "payments", filters).await
    }

    // =========================================================================
    //  DEVOLUÇÕES
    // =========================================================================

    pub async fn list_returns<'e, E>(
        &self,
        executor: E,
        filters: &Filters,
    ) -> Result<Vec<ReturnEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = entries_query("returns", RETURN_COLUMNS);
        filters.push_where(&mut qb);
        qb.push(" ORDER BY l.created_at DESC");

        let returns = qb
            .build_query_as::<ReturnEntry>()
            .fetch_all(executor)
            .await?;
        Ok(returns)
    }

    pub async fn find_return<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Return>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {RETURN_COLUMNS} FROM returns WHERE id = $1");
        let item = sqlx::query_as::<_, Return>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(item)
    }

    pub async fn create_return<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
        amount: Decimal,
        description: &str,
        return_reason: Option<&str>,
    ) -> Result<Return, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Sem motivo informado vale o DEFAULT da coluna
        let sql = format!(
            "INSERT INTO returns (client_id, amount, description, return_reason) \
             VALUES ($1, $2, $3, COALESCE($4, 'product return')) \
             RETURNING {RETURN_COLUMNS}"
        );
        sqlx::query_as::<_, Return>(&sql)
            .bind(client_id)
            .bind(amount)
            .bind(description)
            .bind(return_reason)
            .fetch_one(executor)
            .await
            .map_err(map_client_fk)
    }

    pub async fn update_return<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        amount: Decimal,
        description: &str,
        return_reason: Option<&str>,
    ) -> Result<Option<Return>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE returns SET amount = $2, description = $3, \
             return_reason = COALESCE($4, return_reason), updated_at = NOW() \
             WHERE id = $1 RETURNING {RETURN_COLUMNS}"
        );
        let item = sqlx::query_as::<_, Return>(&sql)
            .bind(id)
            .bind(amount)
            .bind(description)
            .bind(return_reason)
            .fetch_optional(executor)
            .await?;
        Ok(item)
    }

    pub async fn delete_return<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.delete_from(executor, "returns", id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::filters::Condition;

    #[test]
    fn entries_query_joins_client_and_salesperson() {
        let mut qb = entries_query("sales", SALE_COLUMNS);
        Filters::new()
            .with(Condition::UuidEq(LEDGER_SALESPERSON, Uuid::nil()))
            .push_where(&mut qb);

        let sql = qb.sql();
        assert!(sql.starts_with("SELECT l.id, l.amount, l.description, l.client_id,"));
        assert!(sql.contains("FROM sales l JOIN clients c ON c.id = l.client_id"));
        assert!(sql.ends_with("WHERE c.salesperson_id = $1"));
    }
}
