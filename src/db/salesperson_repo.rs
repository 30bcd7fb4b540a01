// src/db/salesperson_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::salesperson::Salesperson,
};

const SALESPERSON_COLUMNS: &str = "id, name, email, internal_code, created_at, updated_at";

#[derive(Clone, Default)]
pub struct SalespersonRepository;

// Unicidade de email / código interno vira 409 com a mensagem certa
fn map_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let on_email = db_err.constraint().is_some_and(|c| c.contains("email"));
            return AppError::UniqueConstraintViolation(if on_email {
                "salesperson_email_taken"
            } else {
                "salesperson_code_taken"
            });
        }
    }
    e.into()
}

impl SalespersonRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<Salesperson>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {SALESPERSON_COLUMNS} FROM salespeople ORDER BY name ASC");
        let salespeople = sqlx::query_as::<_, Salesperson>(&sql)
            .fetch_all(executor)
            .await?;
        Ok(salespeople)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Salesperson>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {SALESPERSON_COLUMNS} FROM salespeople WHERE id = $1");
        let salesperson = sqlx::query_as::<_, Salesperson>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(salesperson)
    }

    /// Busca exata pelo nome (usado pelo importador de CSV).
    pub async fn find_by_name<'e, E>(
        &self,
        executor: E,
        name: &str,
    ) -> Result<Option<Salesperson>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {SALESPERSON_COLUMNS} FROM salespeople WHERE name = $1 ORDER BY created_at ASC LIMIT 1"
        );
        let salesperson = sqlx::query_as::<_, Salesperson>(&sql)
            .bind(name)
            .fetch_optional(executor)
            .await?;
        Ok(salesperson)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        email: Option<&str>,
        internal_code: Option<&str>,
    ) -> Result<Salesperson, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO salespeople (name, email, internal_code) VALUES ($1, $2, $3) \
             RETURNING {SALESPERSON_COLUMNS}"
        );
        sqlx::query_as::<_, Salesperson>(&sql)
            .bind(name)
            .bind(email)
            .bind(internal_code)
            .fetch_one(executor)
            .await
            .map_err(map_write_error)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        email: Option<&str>,
        internal_code: Option<&str>,
    ) -> Result<Option<Salesperson>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE salespeople SET name = $2, email = $3, internal_code = $4, updated_at = NOW() \
             WHERE id = $1 RETURNING {SALESPERSON_COLUMNS}"
        );
        sqlx::query_as::<_, Salesperson>(&sql)
            .bind(id)
            .bind(name)
            .bind(email)
            .bind(internal_code)
            .fetch_optional(executor)
            .await
            .map_err(map_write_error)
    }

    /// Devolve `true` se apagou. Vendedor com clientes/fechamentos -> SalespersonInUse.
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM salespeople WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::SalespersonInUse;
                    }
                }
                e.into()
            })?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn exists<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM salespeople WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    /// Soma da dívida de todos os clientes do vendedor.
    pub async fn total_debt<'e, E>(&self, executor: E, id: Uuid) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT
                COALESCE((SELECT SUM(s.amount) FROM sales s
                          JOIN clients c ON c.id = s.client_id
                          WHERE c.salesperson_id = $1), 0)
              - COALESCE((SELECT SUM(p.amount) FROM payments p
                          JOIN clients c ON c.id = p.client_id
                          WHERE c.salesperson_id = $1), 0)
            "#,
        )
        .bind(id)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }
}
