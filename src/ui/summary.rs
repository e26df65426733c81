use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::aggregate::KpiSummary;
use crate::data::filter::FilteredTable;

// ---------------------------------------------------------------------------
// Currency formatting
// ---------------------------------------------------------------------------

/// Format an amount as `R$ 1,234.56`. `grouped` adds the thousands separator.
pub fn format_brl(value: f64, grouped: bool) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let int_part = if grouped {
        let digits: Vec<char> = int_part.chars().collect();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, d) in digits.iter().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(*d);
        }
        out
    } else {
        int_part.to_string()
    };

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("R$ {sign}{int_part}.{frac_part}")
}

// ---------------------------------------------------------------------------
// KPI row
// ---------------------------------------------------------------------------

pub fn kpi_row(ui: &mut Ui, kpis: &KpiSummary) {
    ui.columns(2, |cols: &mut [Ui]| {
        cols[0].heading("Vendas totais:");
        cols[0].heading(format_brl(kpis.total, true));
        cols[1].heading("Preço médio por transação:");
        cols[1].heading(format_brl(kpis.average, false));
    });
    ui.label(format!("{} transações", kpis.transactions));
}

// ---------------------------------------------------------------------------
// Filtered records table
// ---------------------------------------------------------------------------

/// `headers` are the configured column names, in schema order.
pub fn records_table(ui: &mut Ui, filtered: &FilteredTable, headers: [&str; 6]) {
    let records = filtered.records();
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(320.0)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .columns(Column::auto().at_least(90.0), headers.len() - 1)
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for name in headers {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, records.len(), |mut row| {
                let r = &records[row.index()];
                row.col(|ui| {
                    ui.label(&r.city);
                });
                row.col(|ui| {
                    ui.label(&r.title);
                });
                row.col(|ui| {
                    ui.label(&r.payment_status);
                });
                row.col(|ui| {
                    ui.label(format_brl(r.total_price, true));
                });
                row.col(|ui| {
                    ui.label(r.units_sold.to_string());
                });
                row.col(|ui| {
                    ui.label(r.date.format("%d/%m/%Y").to_string());
                });
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouped_currency() {
        assert_eq!(format_brl(1234.5, true), "R$ 1,234.50");
        assert_eq!(format_brl(1234567.891, true), "R$ 1,234,567.89");
        assert_eq!(format_brl(999.999, true), "R$ 1,000.00");
        assert_eq!(format_brl(12.0, true), "R$ 12.00");
        assert_eq!(format_brl(0.0, true), "R$ 0.00");
    }

    #[test]
    fn ungrouped_currency() {
        assert_eq!(format_brl(1234.5, false), "R$ 1234.50");
        assert_eq!(format_brl(39.25, false), "R$ 39.25");
    }

    #[test]
    fn negative_amounts() {
        assert_eq!(format_brl(-1500.0, true), "R$ -1,500.00");
        assert_eq!(format_brl(-0.001, true), "R$ 0.00");
    }
}
