// src/models/closure.rs

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::salesperson::SalespersonRef;

/// Fotografia de um período. Depois de criada, só nome e descrição mudam.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthClosure {
    pub id: Uuid,
    #[schema(example = "Octubre 2025")]
    pub name: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    // None = fechamento de todos os vendedores
    pub salesperson_id: Option<Uuid>,
    pub total_sales: Decimal,
    pub total_payments: Decimal,
    pub total_debt: Decimal,
    pub net_amount: Decimal,
    pub description: Option<String>,
    pub closed_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Linha com o LEFT JOIN em salespeople
#[derive(Debug, Clone, FromRow)]
pub struct MonthClosureRow {
    #[sqlx(flatten)]
    pub closure: MonthClosure,
    pub salesperson_name: Option<String>,
    pub salesperson_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthClosureView {
    #[serde(flatten)]
    pub closure: MonthClosure,
    pub salesperson: Option<SalespersonRef>,
}

impl From<MonthClosureRow> for MonthClosureView {
    fn from(row: MonthClosureRow) -> Self {
        let salesperson = match (row.closure.salesperson_id, row.salesperson_name) {
            (Some(id), Some(name)) => Some(SalespersonRef {
                id,
                name,
                email: row.salesperson_email,
            }),
            _ => None,
        };
        Self {
            closure: row.closure,
            salesperson,
        }
    }
}

/// Intervalo fechado [date_from, date_to].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosurePeriod {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

impl ClosurePeriod {
    /// Período seguinte ao último fechamento do mesmo escopo. Sem fechamento
    /// anterior, começa no dia 1 do mês corrente. Devolve `None` quando o
    /// último fechamento já termina hoje (ou depois).
    pub fn next(last_date_to: Option<NaiveDate>, today: NaiveDate) -> Option<Self> {
        let date_from = match last_date_to {
            Some(last) => last.checked_add_days(Days::new(1))?,
            None => today.with_day(1)?,
        };

        (date_from <= today).then_some(Self {
            date_from,
            date_to: today,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeriodMetrics {
    pub total_sales: Decimal,
    pub total_payments: Decimal,
    pub total_debt: Decimal,
    pub net_amount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn first_closure_starts_on_first_of_month() {
        let period = ClosurePeriod::next(None, date(2025, 10, 17)).unwrap();
        assert_eq!(period.date_from, date(2025, 10, 1));
        assert_eq!(period.date_to, date(2025, 10, 17));
    }

    #[test]
    fn next_closure_is_contiguous() {
        let period = ClosurePeriod::next(Some(date(2025, 10, 31)), date(2025, 11, 30)).unwrap();
        assert_eq!(period.date_from, date(2025, 11, 1));

        let following = ClosurePeriod::next(Some(period.date_to), date(2025, 12, 31)).unwrap();
        assert_eq!(following.date_from, date(2025, 12, 1));
    }

    #[test]
    fn contiguity_crosses_year_boundary() {
        let period = ClosurePeriod::next(Some(date(2025, 12, 31)), date(2026, 1, 15)).unwrap();
        assert_eq!(period.date_from, date(2026, 1, 1));
    }

    #[test]
    fn closing_twice_on_the_same_day_yields_nothing() {
        assert!(ClosurePeriod::next(Some(date(2025, 10, 17)), date(2025, 10, 17)).is_none());
        // Período de um dia só é válido
        assert!(ClosurePeriod::next(Some(date(2025, 10, 16)), date(2025, 10, 17)).is_some());
    }
}
