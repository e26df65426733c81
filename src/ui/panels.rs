use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::FilterColumn;
use crate::state::{AppState, DashboardView};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filtre aqui:");
    ui.separator();

    // The Arc keeps the value lists alive while `state` is mutated below.
    let Some(table) = state.table.clone() else {
        ui.label("Nenhuma planilha carregada.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for column in FilterColumn::ALL {
                let all_values = table.distinct_values(column);
                let n_selected = state.selection.selected(column).len();
                let n_total = all_values.len();
                let header_text = format!("{}  ({n_selected}/{n_total})", column.prompt());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(column)
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("Todos").clicked() {
                                state.select_all(column);
                            }
                            if ui.small_button("Nenhum").clicked() {
                                state.select_none(column);
                            }
                        });

                        for value in all_values {
                            let mut checked = state.selection.contains(column, value);
                            if ui.checkbox(&mut checked, value.as_str()).changed() {
                                state.toggle_filter_value(column, value);
                            }
                        }
                    });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Arquivo", |ui: &mut Ui| {
            if ui.button("Abrir…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.source.is_some(), egui::Button::new("Recarregar"))
                .clicked()
            {
                state.reload();
                ui.close_menu();
            }
            let has_summary = matches!(state.view, DashboardView::Ready(_));
            if ui
                .add_enabled(has_summary, egui::Button::new("Exportar resumo…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            let visible = match &state.view {
                DashboardView::Ready(d) => d.filtered.len(),
                _ => 0,
            };
            ui.label(format!(
                "{} registros carregados, {visible} selecionados",
                table.len()
            ));
        }

        if let Some(path) = &state.source {
            ui.separator();
            ui.label(RichText::new(path.display().to_string()).weak());
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Abrir planilha de vendas")
        .add_filter(
            "Arquivos suportados",
            &["xlsx", "xlsm", "xls", "ods", "csv", "json", "parquet", "pq"],
        )
        .add_filter("Excel", &["xlsx", "xlsm", "xls"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

pub fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Exportar resumo")
        .set_file_name("resumo-vendas.json")
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        match state.export_summary(&path) {
            Ok(()) => state.status_message = None,
            Err(e) => {
                log::error!("Failed to export summary: {e:#}");
                state.status_message = Some(format!("Erro: {e:#}"));
            }
        }
    }
}
