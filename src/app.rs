use eframe::egui::{self, Color32, RichText, ScrollArea};

use crate::color::ChartColors;
use crate::state::{AppState, DashboardView};
use crate::ui::{panels, plot, summary};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SalesDashboardApp {
    pub state: AppState,
    colors: ChartColors,
}

impl SalesDashboardApp {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            colors: ChartColors::default(),
        }
    }

    fn dashboard(&self, ui: &mut egui::Ui) {
        let dashboard = match &self.state.view {
            DashboardView::NoData => {
                ui.centered_and_justified(|ui| match &self.state.status_message {
                    Some(msg) => {
                        ui.heading(RichText::new(msg).color(Color32::RED));
                    }
                    None => {
                        ui.heading("Abra uma planilha de vendas  (Arquivo → Abrir…)");
                    }
                });
                return;
            }
            DashboardView::Empty => {
                ui.label(
                    RichText::new("Nenhum dado disponível com base nos filtros atuais!")
                        .color(Color32::from_rgb(0xe6, 0xa2, 0x3c))
                        .heading(),
                );
                return;
            }
            DashboardView::Ready(d) => d,
        };

        ui.heading("Painel de Vendas");
        ui.add_space(12.0);

        summary::kpi_row(ui, &dashboard.kpis);
        ui.separator();

        ui.columns(2, |cols| {
            plot::sales_by_date_chart(
                &mut cols[0],
                &dashboard.sales_by_date,
                self.colors.sales_by_date,
            );
            plot::product_bar_chart(
                &mut cols[1],
                "sales_by_product",
                "Vendas por produto",
                "Preço total",
                &dashboard.sales_by_title,
                self.colors.sales_by_product,
            );
        });

        ui.add_space(12.0);
        plot::product_bar_chart(
            ui,
            "units_by_product",
            "Unidades vendidas por produto",
            "Unidades vendidas",
            &dashboard.units_by_title,
            self.colors.units_by_product,
        );

        ui.add_space(12.0);
        egui::CollapsingHeader::new("Dados selecionados")
            .default_open(false)
            .show(ui, |ui| {
                summary::records_table(ui, &dashboard.filtered, self.state.config.schema.columns())
            });
    }
}

impl eframe::App for SalesDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: KPIs and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| self.dashboard(ui));
        });
    }
}
