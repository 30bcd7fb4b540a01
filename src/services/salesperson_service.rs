// src/services/salesperson_service.rs

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ClientRepository, SalespersonRepository},
    models::salesperson::{Salesperson, SalespersonDetail},
};

#[derive(Clone)]
pub struct SalespersonService {
    repo: SalespersonRepository,
    client_repo: ClientRepository,
}

impl SalespersonService {
    pub fn new(repo: SalespersonRepository, client_repo: ClientRepository) -> Self {
        Self { repo, client_repo }
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<Salesperson>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list(executor).await
    }

    /// Vendedor + carteira de clientes + dívida total, lidos na mesma transação.
    pub async fn get_detail<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<SalespersonDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let salesperson = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::SalespersonNotFound)?;
        let clients = self.client_repo.list_by_salesperson(&mut *tx, id).await?;
        let total_debt = self.repo.total_debt(&mut *tx, id).await?;

        tx.commit().await?;

        Ok(SalespersonDetail {
            salesperson,
            clients,
            total_debt,
        })
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
        let salesperson = self.repo.create(executor, name, email, internal_code).await?;
        tracing::info!("Vendedor criado: {} ({})", salesperson.name, salesperson.id);
        Ok(salesperson)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        email: Option<&str>,
        internal_code: Option<&str>,
    ) -> Result<Salesperson, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update(executor, id, name, email, internal_code)
            .await?
            .ok_or(AppError::SalespersonNotFound)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete(executor, id).await? {
            return Err(AppError::SalespersonNotFound);
        }
        Ok(())
    }
}
