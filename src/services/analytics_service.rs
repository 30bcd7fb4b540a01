// src/services/analytics_service.rs

use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};

use crate::{
    common::{error::AppError, i18n::I18nStore},
    db::{
        analytics_repo::{LedgerTable, LAST_ACTIVITY},
        filters::{Condition, Filters},
        ledger_repo::{LEDGER_DATE, LEDGER_SALESPERSON},
        AnalyticsRepository,
    },
    middleware::i18n::Locale,
    models::{
        analytics::{
            AlertData, AlertKind, AlertSummary, AlertsReport, BadDebtReport, BadDebtSummary,
            BusinessAlert, ClientRisk, DebtorActivity, MonthlyReport, SalespersonComparison,
            SalespersonProfitability, TrendReport, ALERT_THRESHOLDS,
        },
        scope::{DateWindow, SalespersonScope},
    },
};

/// Início padrão da comparação quando não vem `dateFrom`.
pub fn default_comparison_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Primeiro e último dia do mês.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), AppError> {
    let invalid = || AppError::InvalidParameter(format!("mês inválido: {year}-{month}"));
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(invalid)?;
    Ok((first, last))
}

/// Janela da comparação e das tendências: o que faltar vira 2020-01-01 ou hoje.
pub fn default_range(window: DateWindow) -> DateWindow {
    DateWindow {
        from: window.from.or_else(|| Some(default_comparison_start())),
        to: window.to.or_else(|| Some(Utc::now().date_naive())),
    }
}

// Condições sobre a view `client_debts` (alias `cd`)

/// Deve algo e está parado há `old_debt_days` ou mais.
pub fn old_debt_filters(scope: SalespersonScope, now: DateTime<Utc>) -> Filters {
    let cutoff = now - Duration::days(ALERT_THRESHOLDS.old_debt_days);
    Filters::new()
        .scoped("cd.salesperson_id", scope)
        .with(Condition::GreaterThan("cd.debt", Decimal::ZERO))
        .with(Condition::Until(LAST_ACTIVITY, cutoff))
}

/// Dívida média e última atividade entre 30 e 60 dias atrás.
pub fn collection_opportunity_filters(scope: SalespersonScope, now: DateTime<Utc>) -> Filters {
    let t = ALERT_THRESHOLDS;
    Filters::new()
        .scoped("cd.salesperson_id", scope)
        .with(Condition::AtLeast("cd.debt", t.opportunity_min_debt))
        .with(Condition::AtMost("cd.debt", t.opportunity_max_debt))
        .with(Condition::Since(LAST_ACTIVITY, now - Duration::days(t.opportunity_max_days)))
        .with(Condition::Until(LAST_ACTIVITY, now - Duration::days(t.opportunity_min_days)))
}

pub fn vip_filters(scope: SalespersonScope) -> Filters {
    Filters::new()
        .scoped("cd.salesperson_id", scope)
        .with(Condition::AtLeast("cd.debt", ALERT_THRESHOLDS.vip_debt))
}

/// Deve algo e não compra nada há `days` dias ou mais.
pub fn bad_debt_filters(scope: SalespersonScope, now: DateTime<Utc>, days: i64) -> Filters {
    Filters::new()
        .scoped("cd.salesperson_id", scope)
        .with(Condition::GreaterThan("cd.debt", Decimal::ZERO))
        .with(Condition::Until("cd.last_sale_at", now - Duration::days(days)))
}

/// Resultado bruto dos alertas; os textos saem no idioma do cliente.
#[derive(Debug)]
pub struct AlertFindings {
    pub generated_at: DateTime<Utc>,
    pub findings: Vec<(AlertKind, AlertData)>,
}

fn alert_text(store: &I18nStore, lang: &str, kind: AlertKind, part: &str, count: usize) -> String {
    let t = ALERT_THRESHOLDS;
    let days = match kind {
        AlertKind::IdleSalespeople => t.idle_salesperson_days,
        _ => t.old_debt_days,
    };
    store
        .translate(lang, &format!("{}_{}", kind.message_prefix(), part))
        .replace("{count}", &count.to_string())
        .replace("{days}", &days.to_string())
        .replace("{min}", &t.opportunity_min_debt.to_string())
        .replace("{max}", &t.opportunity_max_debt.to_string())
        .replace("{amount}", &t.vip_debt.to_string())
}

impl AlertFindings {
    /// Só os achados com dados viram alerta.
    pub fn into_report(self, locale: &Locale, store: &I18nStore) -> AlertsReport {
        let lang = locale.0.as_str();
        let generated_at = self.generated_at;
        let alerts: Vec<BusinessAlert> = self
            .findings
            .into_iter()
            .filter(|(_, data)| !data.is_empty())
            .map(|(kind, data)| {
                let count = data.len();
                BusinessAlert {
                    id: kind,
                    severity: kind.severity(),
                    priority: kind.priority(),
                    title: alert_text(store, lang, kind, "title", count),
                    description: alert_text(store, lang, kind, "description", count),
                    action: alert_text(store, lang, kind, "action", count),
                    data,
                    created_at: generated_at,
                }
            })
            .collect();

        AlertsReport {
            summary: AlertSummary::of(&alerts),
            alerts,
        }
    }
}

#[derive(Clone)]
pub struct AnalyticsService {
    repo: AnalyticsRepository,
}

impl AnalyticsService {
    pub fn new(repo: AnalyticsRepository) -> Self {
        Self { repo }
    }

    /// Vendedores lado a lado na janela (padrão: 2020-01-01 até hoje).
    pub async fn comparison<'e, E>(
        &self,
        executor: E,
        window: DateWindow,
    ) -> Result<Vec<SalespersonComparison>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let filters = Filters::new().within(LEDGER_DATE, default_range(window));
        self.repo.comparison(executor, &filters).await
    }

    /// Sem datas, todo o histórico.
    pub async fn profitability<'e, E>(
        &self,
        executor: E,
        scope: SalespersonScope,
        window: DateWindow,
    ) -> Result<Vec<SalespersonProfitability>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let filters = Filters::new().within(LEDGER_DATE, window);
        let salespeople = Filters::new().scoped("sp.id", scope);

        let rows = self
            .repo
            .profitability(executor, &filters, &salespeople)
            .await?;
        Ok(rows.into_iter().map(SalespersonProfitability::from).collect())
    }

    /// Vendas e pagamentos por dia, na mesma janela padrão da comparação.
    pub async fn trends<'e, E>(
        &self,
        executor: E,
        scope: SalespersonScope,
        window: DateWindow,
    ) -> Result<TrendReport, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let filters = Filters::new()
            .scoped(LEDGER_SALESPERSON, scope)
            .within(LEDGER_DATE, default_range(window));

        let mut tx = executor.begin().await?;
        let sales_trend = self
            .repo
            .daily_trend(&mut *tx, LedgerTable::Sales, &filters)
            .await?;
        let payments_trend = self
            .repo
            .daily_trend(&mut *tx, LedgerTable::Payments, &filters)
            .await?;
        tx.commit().await?;

        Ok(TrendReport {
            sales_trend,
            payments_trend,
        })
    }

    /// Devedores sem venda há `days_threshold` dias, maior risco primeiro.
    pub async fn bad_debt<'e, E>(
        &self,
        executor: E,
        scope: SalespersonScope,
        days_threshold: i64,
    ) -> Result<BadDebtReport, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if days_threshold < 0 {
            return Err(AppError::InvalidParameter(format!(
                "daysThreshold negativo: {days_threshold}"
            )));
        }

        let now = Utc::now();
        let filters = bad_debt_filters(scope, now, days_threshold);
        let debtors = self.repo.debtors(executor, &filters, None).await?;

        let mut candidates: Vec<ClientRisk> = debtors
            .into_iter()
            .map(|debtor| ClientRisk::assess(debtor, now))
            .collect();
        candidates.sort_by(|a, b| {
            b.risk_score
                .cmp(&a.risk_score)
                .then_with(|| b.client.debt.cmp(&a.client.debt))
        });

        Ok(BadDebtReport {
            summary: BadDebtSummary::of(&candidates),
            bad_debt_candidates: candidates,
        })
    }

    /// Dívidas antigas, vendedores parados, oportunidades de cobrança e
    /// clientes VIP, numa mesma transação.
    pub async fn alerts<'e, E>(
        &self,
        executor: E,
        scope: SalespersonScope,
    ) -> Result<AlertFindings, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let t = ALERT_THRESHOLDS;
        let now = Utc::now();
        let assess = |rows: Vec<DebtorActivity>| {
            AlertData::Clients(rows.into_iter().map(|r| ClientRisk::assess(r, now)).collect())
        };

        let mut tx = executor.begin().await?;

        let old_debt = self
            .repo
            .debtors(&mut *tx, &old_debt_filters(scope, now), Some(t.old_debt_limit))
            .await?;

        let idle_since = now - Duration::days(t.idle_salesperson_days);
        let idle = self
            .repo
            .idle_salespeople(
                &mut *tx,
                &Filters::new().with(Condition::Since(LEDGER_DATE, idle_since)),
                &Filters::new().scoped("sp.id", scope),
            )
            .await?;

        let opportunities = self
            .repo
            .debtors(
                &mut *tx,
                &collection_opportunity_filters(scope, now),
                Some(t.opportunity_limit),
            )
            .await?;

        let vip = self
            .repo
            .debtors(&mut *tx, &vip_filters(scope), Some(t.vip_limit))
            .await?;

        tx.commit().await?;

        tracing::debug!(
            "Alertas: {} dívidas antigas, {} vendedores parados, {} oportunidades, {} VIP",
            old_debt.len(),
            idle.len(),
            opportunities.len(),
            vip.len()
        );

        Ok(AlertFindings {
            generated_at: now,
            findings: vec![
                (AlertKind::OldDebtClients, assess(old_debt)),
                (AlertKind::IdleSalespeople, AlertData::Salespeople(idle)),
                (AlertKind::CollectionOpportunities, assess(opportunities)),
                (AlertKind::VipClients, assess(vip)),
            ],
        })
    }

    pub async fn monthly<'e, E>(
        &self,
        executor: E,
        year: i32,
        month: u32,
        scope: SalespersonScope,
    ) -> Result<MonthlyReport, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (first, last) = month_bounds(year, month)?;
        let window = Filters::new()
            .with(Condition::DateOnOrAfter(LEDGER_DATE, first))
            .with(Condition::DateOnOrBefore(LEDGER_DATE, last));
        let salespeople = Filters::new().scoped("sp.id", scope);

        let rows = self.repo.monthly(executor, &window, &salespeople).await?;
        Ok(MonthlyReport {
            year,
            month,
            salespeople: rows,
        })
    }
}
