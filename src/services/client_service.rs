// src/services/client_service.rs

use chrono::Utc;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{filters::Filters, ClientRepository, LedgerRepository, SalespersonRepository},
    models::{
        client::{last_payment_month, Client, ClientDetail, ClientSummary},
        dashboard::classify_client,
        salesperson::SalespersonRef,
        scope::SalespersonScope,
    },
};

/// Campos editáveis de um cliente (criação e atualização).
#[derive(Debug, Clone, Copy)]
pub struct ClientFields<'a> {
    pub internal_code: Option<&'a str>,
    pub name: &'a str,
    pub phone: Option<&'a str>,
    pub email: Option<&'a str>,
    pub address: Option<&'a str>,
    pub salesperson_id: Uuid,
}

#[derive(Clone)]
pub struct ClientService {
    repo: ClientRepository,
    salesperson_repo: SalespersonRepository,
    ledger_repo: LedgerRepository,
}

impl ClientService {
    pub fn new(
        repo: ClientRepository,
        salesperson_repo: SalespersonRepository,
        ledger_repo: LedgerRepository,
    ) -> Self {
        Self {
            repo,
            salesperson_repo,
            ledger_repo,
        }
    }

    /// Clientes do escopo com dívida e mês do último pagamento.
    /// `search` procura no nome e no código interno.
    pub async fn list<'e, E>(
        &self,
        executor: E,
        scope: SalespersonScope,
        search: Option<&str>,
    ) -> Result<Vec<ClientSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let filters = Filters::new()
            .scoped("cd.salesperson_id", scope)
            .search(&["cd.name", "cd.internal_code"], search);

        let now = Utc::now();
        let rows = self.repo.list_with_debt(executor, &filters).await?;
        Ok(rows
            .into_iter()
            .map(|row| ClientSummary::from_row(row, now))
            .collect())
    }

    pub async fn get_detail<'e, E>(&self, executor: E, id: Uuid) -> Result<ClientDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let client = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::ClientNotFound)?;
        let debt_row = self
            .repo
            .find_with_debt(&mut *tx, id)
            .await?
            .ok_or(AppError::ClientNotFound)?;
        let salesperson = self
            .salesperson_repo
            .find_by_id(&mut *tx, client.salesperson_id)
            .await?
            .ok_or(AppError::SalespersonNotFound)?;
        let sales = self.ledger_repo.list_sales_by_client(&mut *tx, id).await?;
        let payments = self.ledger_repo.list_payments_by_client(&mut *tx, id).await?;

        tx.commit().await?;

        Ok(ClientDetail {
            standing: classify_client(debt_row.debt, debt_row.last_payment_at, Utc::now()),
            last_payment_month: last_payment_month(debt_row.last_payment_at),
            debt: debt_row.debt,
            salesperson: SalespersonRef {
                id: salesperson.id,
                name: salesperson.name,
                email: salesperson.email,
            },
            client,
            sales,
            payments,
        })
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        fields: ClientFields<'_>,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = self
            .repo
            .create(
                executor,
                fields.internal_code,
                fields.name,
                fields.phone,
                fields.email,
                fields.address,
                fields.salesperson_id,
            )
            .await?;
        tracing::info!("Cliente criado: {} ({})", client.name, client.id);
        Ok(client)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        fields: ClientFields<'_>,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update(
                executor,
                id,
                fields.internal_code,
                fields.name,
                fields.phone,
                fields.email,
                fields.address,
                fields.salesperson_id,
            )
            .await?
            .ok_or(AppError::ClientNotFound)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete(executor, id).await? {
            return Err(AppError::ClientNotFound);
        }
        Ok(())
    }
}
