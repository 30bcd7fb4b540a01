// src/models/salesperson.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::client::Client;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Salesperson {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(example = "Bego")]
    pub name: String,

    #[schema(example = "bego@example.com")]
    pub email: Option<String>,

    // Código do sistema antigo (usado para ligar os dados históricos)
    #[schema(example = "7")]
    pub internal_code: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Versão resumida, embutida em clientes e fechamentos
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalespersonRef {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalespersonDetail {
    #[serde(flatten)]
    pub salesperson: Salesperson,
    pub clients: Vec<Client>,
    /// Soma da dívida de todos os clientes do vendedor
    #[schema(example = "1530.75")]
    pub total_debt: Decimal,
}
