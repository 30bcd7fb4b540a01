// src/db/client_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::filters::Filters,
    models::client::{Client, ClientDebtRow},
};

const CLIENT_COLUMNS: &str =
    "id, internal_code, name, phone, email, address, salesperson_id, created_at, updated_at";

/// Dívida por cliente. Vendas e pagamentos são somados cada um no seu
/// subselect antes do JOIN, senão N vendas x M pagamentos multiplicam as somas.
/// Clientes sem movimento aparecem com dívida 0.
pub const CLIENT_DEBTS_CTE: &str = r#"
    WITH sale_totals AS (
        SELECT client_id, SUM(amount) AS total, COUNT(*) AS entries,
               MAX(created_at) AS last_sale_at
        FROM sales
        GROUP BY client_id
    ),
    payment_totals AS (
        SELECT client_id, SUM(amount) AS total, COUNT(*) AS entries,
               MAX(created_at) AS last_payment_at
        FROM payments
        GROUP BY client_id
    ),
    client_debts AS (
        SELECT
            c.id, c.internal_code, c.name, c.phone, c.email, c.address,
            c.salesperson_id,
            sp.name AS salesperson_name,
            COALESCE(st.total, 0) - COALESCE(pt.total, 0) AS debt,
            pt.last_payment_at,
            st.last_sale_at,
            COALESCE(st.entries, 0) AS sale_count,
            COALESCE(pt.entries, 0) AS payment_count
        FROM clients c
        JOIN salespeople sp ON sp.id = c.salesperson_id
        LEFT JOIN sale_totals st ON st.client_id = c.id
        LEFT JOIN payment_totals pt ON pt.client_id = c.id
    )
"#;

#[derive(Clone, Default)]
pub struct ClientRepository;

fn map_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::UniqueConstraintViolation("client_code_taken");
        }
        if db_err.is_foreign_key_violation() {
            return AppError::SalespersonNotFound;
        }
    }
    e.into()
}

impl ClientRepository {
    pub fn new() -> Self {
        Self
    }

    /// Listagem com dívida calculada; `filters` usa o alias `cd`.
    pub async fn list_with_debt<'e, E>(
        &self,
        executor: E,
        filters: &Filters,
    ) -> Result<Vec<ClientDebtRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(CLIENT_DEBTS_CTE);
        qb.push("SELECT cd.* FROM client_debts cd");
        filters.push_where(&mut qb);
        qb.push(" ORDER BY cd.name ASC");

        let rows = qb
            .build_query_as::<ClientDebtRow>()
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    pub async fn find_with_debt<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<ClientDebtRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("{CLIENT_DEBTS_CTE} SELECT cd.* FROM client_debts cd WHERE cd.id = $1");
        let row = sqlx::query_as::<_, ClientDebtRow>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    /// Soma das dívidas dos clientes que passam nos filtros.
    pub async fn total_debt<'e, E>(
        &self,
        executor: E,
        filters: &Filters,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(CLIENT_DEBTS_CTE);
        qb.push("SELECT COALESCE(SUM(cd.debt), 0) FROM client_debts cd");
        filters.push_where(&mut qb);

        let total = qb
            .build_query_scalar::<Decimal>()
            .fetch_one(executor)
            .await?;
        Ok(total)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1");
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(client)
    }

    pub async fn list_by_salesperson<'e, E>(
        &self,
        executor: E,
        salesperson_id: Uuid,
    ) -> Result<Vec<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE salesperson_id = $1 ORDER BY name ASC"
        );
        let clients = sqlx::query_as::<_, Client>(&sql)
            .bind(salesperson_id)
            .fetch_all(executor)
            .await?;
        Ok(clients)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        internal_code: Option<&str>,
        name: &str,
        phone: Option<&str>,
        email: Option<&str>,
        address: Option<&str>,
        salesperson_id: Uuid,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO clients (internal_code, name, phone, email, address, salesperson_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {CLIENT_COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&sql)
            .bind(internal_code)
            .bind(name)
            .bind(phone)
            .bind(email)
            .bind(address)
            .bind(salesperson_id)
            .fetch_one(executor)
            .await
            .map_err(map_write_error)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        internal_code: Option<&str>,
        name: &str,
        phone: Option<&str>,
        email: Option<&str>,
        address: Option<&str>,
        salesperson_id: Uuid,
    ) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE clients SET internal_code = $2, name = $3, phone = $4, email = $5, \
             address = $6, salesperson_id = $7, updated_at = NOW() \
             WHERE id = $1 RETURNING {CLIENT_COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .bind(internal_code)
            .bind(name)
            .bind(phone)
            .bind(email)
            .bind(address)
            .bind(salesperson_id)
            .fetch_optional(executor)
            .await
            .map_err(map_write_error)
    }

    /// Apaga o cliente; vendas, pagamentos e devoluções saem junto (ON DELETE CASCADE).
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn exists<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)")
                .bind(id)
                .fetch_one(executor)
                .await?;
        Ok(exists)
    }
}
