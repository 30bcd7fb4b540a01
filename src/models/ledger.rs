// src/models/ledger.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// =============================================================================
//  LANÇAMENTOS: vendas (débito), pagamentos (crédito) e devoluções
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    #[schema(example = "100.00")]
    pub amount: Decimal,
    #[schema(example = "Pedido de setembro")]
    pub description: String,
    pub client_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    #[schema(example = "30.00")]
    pub amount: Decimal,
    #[schema(example = "efectivo")]
    pub payment_method: String,
    pub client_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Devolução de mercadoria. Fica fora do cálculo da dívida.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Return {
    pub id: Uuid,
    pub amount: Decimal,
    pub description: String,
    #[schema(example = "product return")]
    pub return_reason: Option<String>,
    pub client_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Lançamento + nome do cliente e do vendedor, usado nas listagens gerais
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub sale: Sale,
    pub client_name: String,
    pub salesperson_id: Uuid,
    pub salesperson_name: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub payment: Payment,
    pub client_name: String,
    pub salesperson_id: Uuid,
    pub salesperson_name: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub item: Return,
    pub client_name: String,
    pub salesperson_id: Uuid,
    pub salesperson_name: String,
}
