// src/services/ledger_service.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        ledger_repo::{LEDGER_DATE, LEDGER_SALESPERSON},
        filters::Filters,
        ClientRepository, LedgerRepository,
    },
    models::{
        ledger::{Payment, PaymentEntry, Return, ReturnEntry, Sale, SaleEntry},
        scope::{DateWindow, SalespersonScope},
    },
};

#[derive(Clone)]
pub struct LedgerService {
    repo: LedgerRepository,
    client_repo: ClientRepository,
}

impl LedgerService {
    pub fn new(repo: LedgerRepository, client_repo: ClientRepository) -> Self {
        Self { repo, client_repo }
    }

    fn listing_filters(scope: SalespersonScope, window: DateWindow) -> Filters {
        Filters::new()
            .scoped(LEDGER_SALESPERSON, scope)
            .within(LEDGER_DATE, window)
    }

    // =========================================================================
    //  VENDAS
    // =========================================================================

    pub async fn list_sales<'e, E>(
        &self,
        executor: E,
        scope: SalespersonScope,
        window: DateWindow,
    ) -> Result<Vec<SaleEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .list_sales(executor, &Self::listing_filters(scope, window))
            .await
    }

    pub async fn list_client_sales<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
    ) -> Result<Vec<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;
        if !self.client_repo.exists(&mut *conn, client_id).await? {
            return Err(AppError::ClientNotFound);
        }
        self.repo.list_sales_by_client(&mut *conn, client_id).await
    }

    pub async fn get_sale<'e, E>(&self, executor: E, id: Uuid) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_sale(executor, id)
            .await?
            .ok_or(AppError::SaleNotFound)
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
        self.repo
            .create_sale(executor, client_id, amount, description)
            .await
    }

    pub async fn update_sale<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        amount: Decimal,
        description: &str,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update_sale(executor, id, amount, description)
            .await?
            .ok_or(AppError::SaleNotFound)
    }

    pub async fn delete_sale<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete_sale(executor, id).await? {
            return Err(AppError::SaleNotFound);
        }
        Ok(())
    }

    // =========================================================================
    //  PAGAMENTOS
    // =========================================================================

    pub async fn list_payments<'e, E>(
        &self,
        executor: E,
        scope: SalespersonScope,
        window: DateWindow,
    ) -> Result<Vec<PaymentEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .list_payments(executor, &Self::listing_filters(scope, window))
            .await
    }

    pub async fn list_client_payments<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
    ) -> Result<Vec<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;
        if !self.client_repo.exists(&mut *conn, client_id).await? {
            return Err(AppError::ClientNotFound);
        }
        self.repo.list_payments_by_client(&mut *conn, client_id).await
    }

    pub async fn get_payment<'e, E>(&self, executor: E, id: Uuid) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_payment(executor, id)
            .await?
            .ok_or(AppError::PaymentNotFound)
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
        self.repo
            .create_payment(executor, client_id, amount, payment_method)
            .await
    }

    pub async fn update_payment<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        amount: Decimal,
        payment_method: &str,
    ) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update_payment(executor, id, amount, payment_method)
            .await?
            .ok_or(AppError::PaymentNotFound)
    }

    pub async fn delete_payment<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete_payment(executor, id).await? {
            return Err(AppError::PaymentNotFound);
        }
        Ok(())
    }

    // =========================================================================
    //  DEVOLUÇÕES
    // =========================================================================

    /// Devoluções só são listadas por vendedor.
    pub async fn list_returns<'e, E>(
        &self,
        executor: E,
        scope: SalespersonScope,
        window: DateWindow,
    ) -> Result<Vec<ReturnEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if scope == SalespersonScope::All {
            return Err(AppError::SalespersonRequired);
        }
        self.repo
            .list_returns(executor, &Self::listing_filters(scope, window))
            .await
    }

    pub async fn get_return<'e, E>(&self, executor: E, id: Uuid) -> Result<Return, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_return(executor, id)
            .await?
            .ok_or(AppError::ReturnNotFound)
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
        self.repo
            .create_return(executor, client_id, amount, description, return_reason)
            .await
    }

    pub async fn update_return<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        amount: Decimal,
        description: &str,
        return_reason: Option<&str>,
    ) -> Result<Return, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update_return(executor, id, amount, description, return_reason)
            .await?
            .ok_or(AppError::ReturnNotFound)
    }

    pub async fn delete_return<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete_return(executor, id).await? {
            return Err(AppError::ReturnNotFound);
        }
        Ok(())
    }
}
