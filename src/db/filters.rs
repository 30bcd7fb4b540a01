// src/db/filters.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::scope::{DateWindow, SalespersonScope};

/// Uma condição independente do WHERE. Cada filtro opcional vira uma
/// condição; todas são unidas com AND e os valores sempre vão como bind.
#[derive(Debug, Clone)]
pub enum Condition {
    UuidEq(&'static str, Uuid),
    IsNull(&'static str),
    /// ILIKE '%texto%' em qualquer uma das colunas
    Contains(&'static [&'static str], String),
    /// Dia UTC de uma coluna TIMESTAMPTZ, o mesmo calendário do "hoje"
    /// do servidor
    DateOnOrAfter(&'static str, NaiveDate),
    DateOnOrBefore(&'static str, NaiveDate),
    /// Colunas DATE, comparadas direto
    DayOnOrAfter(&'static str, NaiveDate),
    DayOnOrBefore(&'static str, NaiveDate),
    Since(&'static str, DateTime<Utc>),
    Until(&'static str, DateTime<Utc>),
    /// coluna IS NULL OR coluna < valor
    NullOrBefore(&'static str, DateTime<Utc>),
    GreaterThan(&'static str, Decimal),
    LessThan(&'static str, Decimal),
    AtLeast(&'static str, Decimal),
    AtMost(&'static str, Decimal),
}

#[derive(Debug, Clone, Default)]
pub struct Filters {
    conditions: Vec<Condition>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_opt(self, condition: Option<Condition>) -> Self {
        match condition {
            Some(c) => self.with(c),
            None => self,
        }
    }

    /// Restringe ao vendedor quando o escopo não é "todos".
    pub fn scoped(self, column: &'static str, scope: SalespersonScope) -> Self {
        self.with_opt(scope.salesperson_id().map(|id| Condition::UuidEq(column, id)))
    }

    /// Datas (inclusivas) da janela sobre uma coluna de data/timestamp.
    pub fn within(self, column: &'static str, window: DateWindow) -> Self {
        self.with_opt(window.from.map(|d| Condition::DateOnOrAfter(column, d)))
            .with_opt(window.to.map(|d| Condition::DateOnOrBefore(column, d)))
    }

    /// Busca textual; `None` ou texto em branco não filtra nada.
    pub fn search(self, columns: &'static [&'static str], term: Option<&str>) -> Self {
        let term = term.map(str::trim).filter(|t| !t.is_empty());
        self.with_opt(term.map(|t| Condition::Contains(columns, like_pattern(t))))
    }

    /// Acrescenta " WHERE a AND b ..." (ou nada, se não houver condições).
    pub fn push_where<'args>(&self, qb: &mut QueryBuilder<'args, Postgres>) {
        for (i, condition) in self.conditions.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            push_condition(qb, condition);
        }
    }
}

fn push_condition<'args>(qb: &mut QueryBuilder<'args, Postgres>, condition: &Condition) {
    match condition {
        Condition::UuidEq(column, value) => {
            qb.push(*column).push(" = ").push_bind(*value);
        }
        Condition::IsNull(column) => {
            qb.push(*column).push(" IS NULL");
        }
        Condition::Contains(columns, pattern) => {
            qb.push("(");
            for (i, column) in columns.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                qb.push(*column).push(" ILIKE ").push_bind(pattern.clone());
            }
            qb.push(")");
        }
        Condition::DateOnOrAfter(column, value) => {
            push_utc_day(qb, column).push(" >= ").push_bind(*value);
        }
        Condition::DateOnOrBefore(column, value) => {
            push_utc_day(qb, column).push(" <= ").push_bind(*value);
        }
        Condition::DayOnOrAfter(column, value) => {
            qb.push(*column).push(" >= ").push_bind(*value);
        }
        Condition::DayOnOrBefore(column, value) => {
            qb.push(*column).push(" <= ").push_bind(*value);
        }
        Condition::Since(column, value) => {
            qb.push(*column).push(" >= ").push_bind(*value);
        }
        Condition::Until(column, value) => {
            qb.push(*column).push(" <= ").push_bind(*value);
        }
        Condition::NullOrBefore(column, value) => {
            qb.push("(")
                .push(*column)
                .push(" IS NULL OR ")
                .push(*column)
                .push(" < ")
                .push_bind(*value)
                .push(")");
        }
        Condition::GreaterThan(column, value) => {
            qb.push(*column).push(" > ").push_bind(*value);
        }
        Condition::LessThan(column, value) => {
            qb.push(*column).push(" < ").push_bind(*value);
        }
        Condition::AtLeast(column, value) => {
            qb.push(*column).push(" >= ").push_bind(*value);
        }
        Condition::AtMost(column, value) => {
            qb.push(*column).push(" <= ").push_bind(*value);
        }
    }
}

fn push_utc_day<'q, 'args>(
    qb: &'q mut QueryBuilder<'args, Postgres>,
    column: &str,
) -> &'q mut QueryBuilder<'args, Postgres> {
    qb.push("(").push(column).push(" AT TIME ZONE 'UTC')::date")
}

// Escapa os curingas do LIKE para o texto ser buscado literalmente
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
