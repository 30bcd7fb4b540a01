// src/models/scope.rs

use chrono::NaiveDate;
use uuid::Uuid;

use crate::common::error::AppError;

/// Valores de `salespersonId` que significam "todos os vendedores".
pub const ALL_SALESPEOPLE: [&str; 2] = ["TODOS", "ALL"];

/// Dimensão pela qual dashboards, listagens e fechamentos são filtrados:
/// um vendedor específico ou todos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SalespersonScope {
    #[default]
    All,
    Salesperson(Uuid),
}

impl SalespersonScope {
    pub fn parse(raw: Option<&str>) -> Result<Self, AppError> {
        let raw = match raw.map(str::trim) {
            None | Some("") => return Ok(SalespersonScope::All),
            Some(value) => value,
        };

        if ALL_SALESPEOPLE.iter().any(|s| s.eq_ignore_ascii_case(raw)) {
            return Ok(SalespersonScope::All);
        }

        Uuid::parse_str(raw)
            .map(SalespersonScope::Salesperson)
            .map_err(|_| AppError::InvalidScope(raw.to_string()))
    }

    pub fn salesperson_id(&self) -> Option<Uuid> {
        match self {
            SalespersonScope::All => None,
            SalespersonScope::Salesperson(id) => Some(*id),
        }
    }
}

/// Janela de datas inclusiva vinda da query (`dateFrom`/`dateTo`).
/// Qualquer um dos lados pode faltar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateWindow {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Self, AppError> {
        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Err(AppError::InvalidParameter(format!(
                    "dateFrom ({f}) posterior a dateTo ({t})"
                )));
            }
        }
        Ok(Self { from, to })
    }

    /// As duas pontas informadas.
    pub fn is_bounded(&self) -> bool {
        self.from.is_some() && self.to.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_window_is_rejected() {
        let from = NaiveDate::from_ymd_opt(2025, 10, 31);
        let to = NaiveDate::from_ymd_opt(2025, 10, 1);
        assert!(matches!(DateWindow::new(from, to), Err(AppError::InvalidParameter(_))));
        assert!(DateWindow::new(to, from).is_ok());
        assert!(!DateWindow::new(None, None).unwrap().is_bounded());
    }

    #[test]
    fn one_sided_window_is_not_bounded() {
        let from = NaiveDate::from_ymd_opt(2025, 10, 1);
        assert!(!DateWindow::new(from, None).unwrap().is_bounded());
        assert!(!DateWindow::new(None, from).unwrap().is_bounded());
        assert!(DateWindow::new(from, from).unwrap().is_bounded());
    }

    #[test]
    fn absent_blank_and_sentinels_mean_all() {
        assert_eq!(SalespersonScope::parse(None).unwrap(), SalespersonScope::All);
        assert_eq!(SalespersonScope::parse(Some("  ")).unwrap(), SalespersonScope::All);
        assert_eq!(SalespersonScope::parse(Some("TODOS")).unwrap(), SalespersonScope::All);
        assert_eq!(SalespersonScope::parse(Some("all")).unwrap(), SalespersonScope::All);
    }

    #[test]
    fn uuid_selects_one_salesperson() {
        let id = Uuid::new_v4();
        let scope = SalespersonScope::parse(Some(&id.to_string())).unwrap();
        assert_eq!(scope, SalespersonScope::Salesperson(id));
        assert_eq!(scope.salesperson_id(), Some(id));
    }

    #[test]
    fn garbage_is_rejected() {
        let err = SalespersonScope::parse(Some("bego")).unwrap_err();
        assert!(matches!(err, AppError::InvalidScope(raw) if raw == "bego"));
    }
}
