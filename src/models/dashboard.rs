// src/models/dashboard.rs

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Sem pagamento há mais do que isso (e com dívida) = inadimplente.
pub const DELINQUENCY_WINDOW_DAYS: i64 = 60;

/// Tamanho máximo da lista de inadimplentes.
pub const DELINQUENT_LIMIT: i64 = 10;

/// Janela padrão dos KPIs quando não vem dateFrom/dateTo.
pub const KPI_WINDOW_DAYS: i64 = 30;

/// Dívidas abaixo deste valor são "oportunidades" (fáceis de liquidar).
pub const OPPORTUNITY_CEILING: Decimal = Decimal::from_parts(75, 0, 0, false, 0);

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardKpis {
    #[schema(example = "15420.50")]
    pub total_debt: Decimal,
    #[schema(example = "3200.00")]
    pub total_sales_last_30_days: Decimal,
    #[schema(example = "2750.00")]
    pub total_payments_last_30_days: Decimal,
    #[schema(example = "Últimos 30 días")]
    pub period_label: String,
}

// Cliente candidato a inadimplente / oportunidade
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedClient {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub salesperson_id: Uuid,
    pub salesperson_name: String,
    pub debt: Decimal,
    pub last_payment_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalespersonRanking {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub total_sold: Decimal,
    pub sale_count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectorRanking {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub total_collected: Decimal,
    pub payment_count: i64,
}

// =============================================================================
//  CLASSIFICAÇÃO
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ClientStanding {
    /// Pagou mais do que comprou
    Credit,
    Settled,
    Delinquent,
    Opportunity,
    Outstanding,
}

pub fn delinquency_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(DELINQUENCY_WINDOW_DAYS)
}

/// Deve algo e não paga nada desde `cutoff`.
pub fn is_delinquent(
    debt: Decimal,
    last_payment_at: Option<DateTime<Utc>>,
    cutoff: DateTime<Utc>,
) -> bool {
    debt > Decimal::ZERO && last_payment_at.is_none_or(|at| at < cutoff)
}

pub fn is_opportunity(debt: Decimal) -> bool {
    debt > Decimal::ZERO && debt < OPPORTUNITY_CEILING
}

pub fn classify_client(
    debt: Decimal,
    last_payment_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> ClientStanding {
    if debt < Decimal::ZERO {
        ClientStanding::Credit
    } else if debt.is_zero() {
        ClientStanding::Settled
    } else if is_delinquent(debt, last_payment_at, delinquency_cutoff(now)) {
        ClientStanding::Delinquent
    } else if is_opportunity(debt) {
        ClientStanding::Opportunity
    } else {
        ClientStanding::Outstanding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn example_client_is_delinquent_not_opportunity() {
        // 100 + 50 de vendas, 30 pago, tudo há 90 dias
        let now = Utc::now();
        let debt = dec("100.00") + dec("50.00") - dec("30.00");
        let last_payment = Some(now - Duration::days(90));

        assert_eq!(debt, dec("120.00"));
        assert!(is_delinquent(debt, last_payment, delinquency_cutoff(now)));
        assert!(!is_opportunity(debt));
        assert_eq!(classify_client(debt, last_payment, now), ClientStanding::Delinquent);
    }

    #[test]
    fn recent_payment_is_not_delinquent() {
        let now = Utc::now();
        let recent = Some(now - Duration::days(10));
        assert!(!is_delinquent(dec("500"), recent, delinquency_cutoff(now)));
        assert_eq!(classify_client(dec("500"), recent, now), ClientStanding::Outstanding);
        assert_eq!(classify_client(dec("40"), recent, now), ClientStanding::Opportunity);
    }

    #[test]
    fn never_paid_with_debt_is_delinquent() {
        let now = Utc::now();
        assert!(is_delinquent(dec("10"), None, delinquency_cutoff(now)));
        assert!(!is_delinquent(Decimal::ZERO, None, delinquency_cutoff(now)));
    }

    #[test]
    fn opportunity_bounds_are_exclusive() {
        assert!(!is_opportunity(Decimal::ZERO));
        assert!(is_opportunity(dec("0.01")));
        assert!(is_opportunity(dec("74.99")));
        assert!(!is_opportunity(dec("75")));
        assert!(!is_opportunity(dec("-5")));
    }

    #[test]
    fn negative_and_zero_balances() {
        let now = Utc::now();
        assert_eq!(classify_client(dec("-20"), None, now), ClientStanding::Credit);
        assert_eq!(classify_client(Decimal::ZERO, None, now), ClientStanding::Settled);
    }
}
