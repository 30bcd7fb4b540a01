// src/models/client.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{
    dashboard::{classify_client, ClientStanding},
    ledger::{Payment, Sale},
    salesperson::SalespersonRef,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[schema(example = "9b2f6a0e-3c1d-4f7a-8e2b-5d6c7e8f9a01")]
    pub id: Uuid,

    #[schema(example = "1042")]
    pub internal_code: Option<String>,

    #[schema(example = "María López")]
    pub name: String,

    #[schema(example = "600123123")]
    pub phone: Option<String>,

    pub email: Option<String>,
    pub address: Option<String>,

    pub salesperson_id: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Linha da view agregada `client_debts` (ver db::client_repo)
#[derive(Debug, Clone, FromRow)]
pub struct ClientDebtRow {
    pub id: Uuid,
    pub internal_code: Option<String>,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub salesperson_id: Uuid,
    pub salesperson_name: String,
    pub debt: Decimal,
    pub last_payment_at: Option<DateTime<Utc>>,
}

/// Item da listagem de clientes: dados básicos + dívida calculada na hora.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    pub id: Uuid,
    pub internal_code: Option<String>,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub salesperson_id: Uuid,
    pub salesperson_name: String,
    #[schema(example = "120.00")]
    pub debt: Decimal,
    /// "MM/YYYY" do último pagamento, ou "-" se nunca pagou
    #[schema(example = "09/2025")]
    pub last_payment_month: String,
    pub standing: ClientStanding,
}

impl ClientSummary {
    pub fn from_row(row: ClientDebtRow, now: DateTime<Utc>) -> Self {
        Self {
            standing: classify_client(row.debt, row.last_payment_at, now),
            last_payment_month: last_payment_month(row.last_payment_at),
            id: row.id,
            internal_code: row.internal_code,
            name: row.name,
            phone: row.phone,
            email: row.email,
            address: row.address,
            salesperson_id: row.salesperson_id,
            salesperson_name: row.salesperson_name,
            debt: row.debt,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientDetail {
    #[serde(flatten)]
    pub client: Client,
    pub salesperson: SalespersonRef,
    pub sales: Vec<Sale>,
    pub payments: Vec<Payment>,
    pub debt: Decimal,
    pub last_payment_month: String,
    pub standing: ClientStanding,
}

pub fn last_payment_month(last_payment_at: Option<DateTime<Utc>>) -> String {
    last_payment_at
        .map(|at| at.format("%m/%Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}
