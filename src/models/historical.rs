// src/models/historical.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

// Dados importados do sistema anterior. Só leitura; ligados aos clientes
// atuais apenas por clients.internal_code = código legado.

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalSale {
    pub id: i32,
    pub cod_com: i32,
    pub cod_art: Option<i32>,
    pub cod_cli: i32,
    pub nombre_cli: String,
    pub apellidos_cli: String,
    pub nombre_art: String,
    pub precio: Decimal,
    pub cantidad: i32,
    pub subtotal: Decimal,
    pub total: Decimal,
    pub fecha_com: NaiveDate,
    pub vista: i32,
    pub cod_user: Option<i32>,
    pub period_label: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalPayment {
    pub id: i32,
    pub cod_pago: i32,
    pub cod_cliente_p: Option<i32>,
    pub nombre_c_p: Option<String>,
    pub apellidos_c_p: Option<String>,
    pub fecha_pago: Option<NaiveDate>,
    pub tipo_de_pago: Option<String>,
    pub cantidad_pago: Option<Decimal>,
    pub vista: i32,
    pub cod_user: Option<i32>,
    pub period_label: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalPeriodSummary {
    #[schema(example = "Anteriores a Octubre 2025")]
    pub period_label: String,
    pub sales_count: i64,
    pub sales_total: Decimal,
    pub payments_count: i64,
    pub payments_total: Decimal,
    pub balance: Decimal,
}

/// Totais gerais + quebra por período.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalOverview {
    pub total_historical_sales: Decimal,
    pub total_historical_payments: Decimal,
    pub net_historical_amount: Decimal,
    pub periods: Vec<HistoricalPeriodSummary>,
}

impl HistoricalOverview {
    pub fn from_periods(periods: Vec<HistoricalPeriodSummary>) -> Self {
        let total_historical_sales: Decimal = periods.iter().map(|p| p.sales_total).sum();
        let total_historical_payments: Decimal = periods.iter().map(|p| p.payments_total).sum();
        Self {
            total_historical_sales,
            total_historical_payments,
            net_historical_amount: total_historical_sales - total_historical_payments,
            periods,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientHistory {
    pub internal_code: String,
    pub sales: Vec<HistoricalSale>,
    pub payments: Vec<HistoricalPayment>,
    pub sales_total: Decimal,
    pub payments_total: Decimal,
    pub balance: Decimal,
}

impl ClientHistory {
    pub fn new(
        internal_code: String,
        sales: Vec<HistoricalSale>,
        payments: Vec<HistoricalPayment>,
    ) -> Self {
        let sales_total: Decimal = sales.iter().map(|s| s.total).sum();
        let payments_total: Decimal = payments.iter().filter_map(|p| p.cantidad_pago).sum();
        Self {
            internal_code,
            sales,
            payments,
            sales_total,
            payments_total,
            balance: sales_total - payments_total,
        }
    }
}
