// src/services/document_service.rs

use std::path::PathBuf;

use genpdf::{elements, style, Element};
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ClosureRepository,
    models::closure::MonthClosureView,
};

const FONT_FAMILY: &str = "Roboto";

fn render_error(e: genpdf::error::Error) -> AppError {
    AppError::InternalServerError(anyhow::Error::msg(e.to_string()))
}

fn money(value: Decimal) -> String {
    format!("{:.2} €", value)
}

#[derive(Clone)]
pub struct DocumentService {
    repo: ClosureRepository,
    fonts_dir: PathBuf,
}

impl DocumentService {
    pub fn new(repo: ClosureRepository, fonts_dir: PathBuf) -> Self {
        Self { repo, fonts_dir }
    }

    /// Relatório em PDF de um fechamento.
    pub async fn generate_closure_pdf<'e, E>(
        &self,
        executor: E,
        closure_id: Uuid,
    ) -> Result<Vec<u8>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let view: MonthClosureView = self
            .repo
            .find_by_id(executor, closure_id)
            .await?
            .ok_or(AppError::ClosureNotFound)?
            .into();

        self.render_closure(&view)
    }

    fn render_closure(&self, view: &MonthClosureView) -> Result<Vec<u8>, AppError> {
        let closure = &view.closure;

        let font_family = genpdf::fonts::from_files(&self.fonts_dir, FONT_FAMILY, None)
            .map_err(|_| AppError::FontNotFound(self.fonts_dir.display().to_string()))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("Cierre {}", closure.name));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- CABEÇALHO ---
        doc.push(
            elements::Paragraph::new(format!("CIERRE: {}", closure.name))
                .styled(style::Style::new().bold().with_font_size(18)),
        );
        doc.push(elements::Paragraph::new(format!(
            "Período: {} - {}",
            closure.date_from.format("%d/%m/%Y"),
            closure.date_to.format("%d/%m/%Y")
        )));
        let scope_label = view
            .salesperson
            .as_ref()
            .map(|sp| sp.name.clone())
            .unwrap_or_else(|| "TODOS".to_string());
        doc.push(elements::Paragraph::new(format!("Vendedor: {}", scope_label)));
        if let Some(closed_by) = &closure.closed_by {
            doc.push(elements::Paragraph::new(format!("Cerrado por: {}", closed_by)));
        }
        doc.push(elements::Paragraph::new(format!(
            "Generado: {}",
            closure.created_at.format("%d/%m/%Y %H:%M")
        )));

        doc.push(elements::Break::new(2));

        // --- TOTAIS ---
        let mut table = elements::TableLayout::new(vec![3, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let style_bold = style::Style::new().bold();
        table
            .row()
            .element(elements::Paragraph::new("Concepto").styled(style_bold))
            .element(elements::Paragraph::new("Importe").styled(style_bold))
            .push()
            .map_err(render_error)?;

        let lines = [
            ("Ventas del período", closure.total_sales),
            ("Cobros del período", closure.total_payments),
            ("Neto (ventas - cobros)", closure.net_amount),
            ("Deuda total pendiente", closure.total_debt),
        ];
        for (label, value) in lines {
            let mut amount = elements::Paragraph::new(money(value));
            amount.set_alignment(genpdf::Alignment::Right);
            table
                .row()
                .element(elements::Paragraph::new(label))
                .element(amount)
                .push()
                .map_err(render_error)?;
        }
        doc.push(table);

        // --- RODAPÉ ---
        if let Some(description) = &closure.description {
            doc.push(elements::Break::new(2));
            doc.push(
                elements::Paragraph::new(description.as_str())
                    .styled(style::Style::new().italic().with_font_size(9)),
            );
        }

        let mut buffer = Vec::new();
        doc.render(&mut buffer).map_err(render_error)?;
        Ok(buffer)
    }
}
