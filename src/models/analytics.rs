// src/models/analytics.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalespersonComparison {
    pub salesperson_id: Uuid,
    pub salesperson_name: String,
    pub sales_count: i64,
    pub sales_amount: Decimal,
    pub payments_count: i64,
    pub payments_amount: Decimal,
    pub client_count: i64,
    /// Vendas − pagamentos dentro da janela
    pub pending_debt: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySalespersonData {
    pub salesperson_id: Uuid,
    pub salesperson_name: String,
    #[sqlx(rename = "sales_count")]
    pub total_sales: i64,
    #[sqlx(rename = "sales_amount")]
    pub total_sales_amount: Decimal,
    #[sqlx(rename = "payments_count")]
    pub total_payments: i64,
    #[sqlx(rename = "payments_amount")]
    pub total_payments_amount: Decimal,
    pub pending_debt: Decimal,
    // Clientes com alguma venda ou pagamento no mês
    pub active_clients: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub salespeople: Vec<MonthlySalespersonData>,
}

// =============================================================================
//  RENTABILIDADE
// =============================================================================

/// Comissão estimada sobre o valor cobrado.
pub const COMMISSION_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalespersonProfitability {
    #[serde(flatten)]
    pub activity: SalespersonComparison,
    /// Vendido por cliente da carteira; `null` sem clientes
    pub avg_sale_per_client: Option<Decimal>,
    pub avg_payment_amount: Option<Decimal>,
    /// Cobrado / vendido, em %; `null` sem vendas
    pub recovery_rate: Option<Decimal>,
    pub estimated_commission: Decimal,
}

fn ratio(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    numerator.checked_div(denominator).map(|r| r.round_dp(2))
}

impl From<SalespersonComparison> for SalespersonProfitability {
    fn from(activity: SalespersonComparison) -> Self {
        Self {
            avg_sale_per_client: ratio(activity.sales_amount, activity.client_count.into()),
            avg_payment_amount: ratio(activity.payments_amount, activity.payments_count.into()),
            recovery_rate: ratio(
                activity.payments_amount * Decimal::ONE_HUNDRED,
                activity.sales_amount,
            ),
            estimated_commission: (activity.payments_amount * COMMISSION_RATE).round_dp(2),
            activity,
        }
    }
}

// =============================================================================
//  TENDÊNCIAS
// =============================================================================

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// Dia (UTC)
    pub period: NaiveDate,
    pub count: i64,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrendReport {
    pub sales_trend: Vec<TrendPoint>,
    pub payments_trend: Vec<TrendPoint>,
}

// =============================================================================
//  RISCO DE DÍVIDA
// =============================================================================

/// Pontuação a partir da qual o cliente conta como alto risco.
pub const HIGH_RISK_SCORE: u8 = 70;

/// Dias sem venda a partir dos quais a dívida entra na análise.
pub const DEFAULT_BAD_DEBT_DAYS: i64 = 90;

/// Devedor com as datas da última venda e do último pagamento.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DebtorActivity {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub salesperson_id: Uuid,
    pub salesperson_name: String,
    pub debt: Decimal,
    pub last_sale_at: Option<DateTime<Utc>>,
    pub last_payment_at: Option<DateTime<Utc>>,
    pub sale_count: i64,
    pub payment_count: i64,
}

impl DebtorActivity {
    /// Último pagamento; sem nenhum, a última venda.
    pub fn last_activity_at(&self) -> Option<DateTime<Utc>> {
        self.last_payment_at.or(self.last_sale_at)
    }
}

fn days_since(at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<i64> {
    at.map(|at| (now - at).num_days())
}

/// 0-100: quanto mais tempo sem vender, menos provável receber. Quem nunca
/// pagou fica acima de quem paga, enquanto a venda for recente.
pub fn risk_score(days_since_last_sale: Option<i64>, has_paid: bool) -> u8 {
    match days_since_last_sale.unwrap_or(0) {
        d if d > 365 => 90,
        d if d > 180 => 70,
        d if d > 90 => 50,
        _ if !has_paid => 60,
        _ => 30,
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientRisk {
    #[serde(flatten)]
    pub client: DebtorActivity,
    pub days_since_last_sale: Option<i64>,
    pub days_since_last_activity: Option<i64>,
    pub risk_score: u8,
}

impl ClientRisk {
    pub fn assess(client: DebtorActivity, now: DateTime<Utc>) -> Self {
        let days_since_last_sale = days_since(client.last_sale_at, now);
        Self {
            days_since_last_activity: days_since(client.last_activity_at(), now),
            risk_score: risk_score(days_since_last_sale, client.last_payment_at.is_some()),
            days_since_last_sale,
            client,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BadDebtSummary {
    pub total_risky_clients: usize,
    pub total_risky_debt: Decimal,
    pub avg_risky_debt: Decimal,
    pub high_risk_clients: usize,
    pub high_risk_debt: Decimal,
}

impl BadDebtSummary {
    pub fn of(candidates: &[ClientRisk]) -> Self {
        let mut summary = Self::default();
        for candidate in candidates {
            summary.total_risky_clients += 1;
            summary.total_risky_debt += candidate.client.debt;
            if candidate.risk_score >= HIGH_RISK_SCORE {
                summary.high_risk_clients += 1;
                summary.high_risk_debt += candidate.client.debt;
            }
        }
        summary.avg_risky_debt = ratio(
            summary.total_risky_debt,
            Decimal::from(summary.total_risky_clients),
        )
        .unwrap_or_default();
        summary
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BadDebtReport {
    pub bad_debt_candidates: Vec<ClientRisk>,
    pub summary: BadDebtSummary,
}

// =============================================================================
//  ALERTAS
// =============================================================================

/// Limites usados pelos alertas, também expostos em `/alerts/config`.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertThresholds {
    /// Dias sem atividade para a dívida contar como antiga
    pub old_debt_days: i64,
    /// Dias sem vendas nem pagamentos para o vendedor contar como parado
    pub idle_salesperson_days: i64,
    pub vip_debt: Decimal,
    pub opportunity_min_debt: Decimal,
    pub opportunity_max_debt: Decimal,
    pub opportunity_min_days: i64,
    pub opportunity_max_days: i64,
    pub old_debt_limit: i64,
    pub opportunity_limit: i64,
    pub vip_limit: i64,
}

pub const ALERT_THRESHOLDS: AlertThresholds = AlertThresholds {
    old_debt_days: 90,
    idle_salesperson_days: 30,
    vip_debt: Decimal::from_parts(2000, 0, 0, false, 0),
    opportunity_min_debt: Decimal::from_parts(200, 0, 0, false, 0),
    opportunity_max_debt: Decimal::from_parts(1000, 0, 0, false, 0),
    opportunity_min_days: 30,
    opportunity_max_days: 60,
    old_debt_limit: 10,
    opportunity_limit: 15,
    vip_limit: 10,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    OldDebtClients,
    IdleSalespeople,
    CollectionOpportunities,
    VipClients,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AlertPriority {
    High,
    Medium,
    Low,
}

impl AlertKind {
    pub fn severity(self) -> AlertSeverity {
        match self {
            AlertKind::OldDebtClients => AlertSeverity::Critical,
            AlertKind::IdleSalespeople => AlertSeverity::Warning,
            AlertKind::CollectionOpportunities => AlertSeverity::Info,
            AlertKind::VipClients => AlertSeverity::Success,
        }
    }

    pub fn priority(self) -> AlertPriority {
        match self {
            AlertKind::OldDebtClients | AlertKind::VipClients => AlertPriority::High,
            AlertKind::IdleSalespeople | AlertKind::CollectionOpportunities => {
                AlertPriority::Medium
            }
        }
    }

    /// Prefixo das chaves `<prefixo>_title`, `_description` e `_action`.
    pub fn message_prefix(self) -> &'static str {
        match self {
            AlertKind::OldDebtClients => "alert_old_debt",
            AlertKind::IdleSalespeople => "alert_idle_salespeople",
            AlertKind::CollectionOpportunities => "alert_collection_opportunities",
            AlertKind::VipClients => "alert_vip_clients",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdleSalesperson {
    pub salesperson_id: Uuid,
    pub salesperson_name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum AlertData {
    Clients(Vec<ClientRisk>),
    Salespeople(Vec<IdleSalesperson>),
}

impl AlertData {
    pub fn len(&self) -> usize {
        match self {
            AlertData::Clients(rows) => rows.len(),
            AlertData::Salespeople(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessAlert {
    pub id: AlertKind,
    #[serde(rename = "type")]
    pub severity: AlertSeverity,
    pub priority: AlertPriority,
    pub title: String,
    pub description: String,
    pub action: String,
    pub data: AlertData,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct AlertSummary {
    pub total: usize,
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
    pub success: usize,
}

impl AlertSummary {
    pub fn of(alerts: &[BusinessAlert]) -> Self {
        let mut summary = Self {
            total: alerts.len(),
            ..Self::default()
        };
        for alert in alerts {
            match alert.severity {
                AlertSeverity::Critical => summary.critical += 1,
                AlertSeverity::Warning => summary.warning += 1,
                AlertSeverity::Info => summary.info += 1,
                AlertSeverity::Success => summary.success += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertsReport {
    pub alerts: Vec<BusinessAlert>,
    pub summary: AlertSummary,
}
