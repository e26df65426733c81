use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

use crate::config::DashboardConfig;
use crate::data::aggregate::{
    compute_kpis, group_by_date_sum, group_by_title_sum, GroupAggregate, KpiSummary, Measure,
};
use crate::data::cache::DatasetCache;
use crate::data::filter::{filter, FilterSelection, FilteredTable};
use crate::data::model::{FilterColumn, SalesTable};

// ---------------------------------------------------------------------------
// Derived dashboard contents
// ---------------------------------------------------------------------------

/// Everything the dashboard draws for a non-empty selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    #[serde(skip)]
    pub filtered: FilteredTable,
    pub kpis: KpiSummary,
    pub sales_by_title: GroupAggregate<String>,
    pub units_by_title: GroupAggregate<String>,
    pub sales_by_date: GroupAggregate<NaiveDate>,
}

/// What the central panel shows.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardView {
    /// No table loaded (or the last load failed).
    NoData,
    /// The filters matched nothing.
    Empty,
    Ready(Box<Dashboard>),
}

impl DashboardView {
    /// Run the whole pipeline from scratch. KPIs and charts are only
    /// computed when at least one record passes the filters.
    pub fn compute(table: &SalesTable, selection: &FilterSelection) -> Self {
        let filtered = filter(table.records(), selection);
        let Some(kpis) = compute_kpis(&filtered) else {
            return DashboardView::Empty;
        };
        let sales_by_title = group_by_title_sum(&filtered, Measure::Price);
        let units_by_title = group_by_title_sum(&filtered, Measure::Units);
        let sales_by_date = group_by_date_sum(&filtered);
        log::debug!(
            "Aggregated {} products over {} dates, {:.2} in sales",
            sales_by_title.len(),
            sales_by_date.len(),
            sales_by_date.total()
        );
        DashboardView::Ready(Box::new(Dashboard {
            filtered,
            kpis,
            sales_by_title,
            units_by_title,
            sales_by_date,
        }))
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded tables, keyed by source.
    cache: DatasetCache,

    /// Current table (None until a source loads successfully).
    pub table: Option<Arc<SalesTable>>,

    /// Path of the current table.
    pub source: Option<PathBuf>,

    /// Per-column filter selections.
    pub selection: FilterSelection,

    /// Result of the pipeline for `table` + `selection`.
    pub view: DashboardView,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            cache: DatasetCache::new(),
            table: None,
            source: None,
            selection: FilterSelection::default(),
            view: DashboardView::NoData,
            status_message: None,
        }
    }

    /// Open the configured data path, if it exists.
    pub fn open_default(&mut self) {
        let path = self.config.data_path.clone();
        if path.exists() {
            self.open(&path);
        } else {
            log::info!("{} not found; waiting for File → Open…", path.display());
        }
    }

    /// Load `path` and show everything in it. On failure the dashboard is
    /// cleared and only the error is shown.
    pub fn open(&mut self, path: &Path) {
        match self.cache.load(path, &self.config) {
            Ok(table) => self.set_table(table, path),
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.table = None;
                self.source = None;
                self.selection = FilterSelection::default();
                self.view = DashboardView::NoData;
                self.status_message = Some(format!("Erro: {e}"));
            }
        }
    }

    /// Ingest a newly loaded table and select every value.
    pub fn set_table(&mut self, table: Arc<SalesTable>, path: &Path) {
        if table.is_empty() {
            log::warn!("{} has no sales records", path.display());
        }
        self.selection = FilterSelection::all(&table);
        self.table = Some(table);
        self.source = Some(path.to_path_buf());
        self.status_message = None;
        self.recompute();
    }

    /// Reload the current source from disk, bypassing the cache.
    pub fn reload(&mut self) {
        if let Some(path) = self.source.clone() {
            self.cache.invalidate();
            self.open(&path);
        }
    }

    /// Rebuild `view` after any table or filter change.
    pub fn recompute(&mut self) {
        self.view = match &self.table {
            Some(table) => DashboardView::compute(table, &self.selection),
            None => DashboardView::NoData,
        };
        log::debug!(
            "Recomputed dashboard: {}",
            match &self.view {
                DashboardView::NoData => "no data".to_string(),
                DashboardView::Empty => "empty selection".to_string(),
                DashboardView::Ready(d) => format!("{} records", d.filtered.len()),
            }
        );
    }

    /// Toggle a single value in a column's filter.
    pub fn toggle_filter_value(&mut self, column: FilterColumn, value: &str) {
        log::debug!("Toggled '{value}' in the {column} filter");
        self.selection.toggle(column, value);
        self.recompute();
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, column: FilterColumn) {
        if let Some(table) = &self.table {
            self.selection.select_all(table, column);
            self.recompute();
        }
    }

    /// Deselect all values in a column.
    pub fn select_none(&mut self, column: FilterColumn) {
        self.selection.select_none(column);
        self.recompute();
    }

    /// Write the current KPIs and aggregates to `path` as pretty JSON.
    pub fn export_summary(&self, path: &Path) -> Result<()> {
        let DashboardView::Ready(dashboard) = &self.view else {
            anyhow::bail!("nothing to export for the current filters");
        };
        let json = serde_json::to_string_pretty(&**dashboard)
            .context("serializing dashboard summary")?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        log::info!("Exported summary to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::*;

    const CSV: &str = "Cidade do comprador,Título,Estado do pagamento,Preço total,Unidades vendidas,Data\n\
                       A,X,Pago,10,1,2024-01-01\n\
                       B,X,Pago,20,2,2024-01-01\n\
                       B,Y,Pendente,5,4,2024-01-02\n";

    #[test]
    fn view_is_empty_when_nothing_matches() {
        let table = sample_table();
        let mut selection = FilterSelection::all(&table);
        selection.select_none(FilterColumn::City);
        assert_eq!(DashboardView::compute(&table, &selection), DashboardView::Empty);
    }

    #[test]
    fn view_holds_all_aggregates() {
        let table = sample_table();
        let DashboardView::Ready(d) = DashboardView::compute(&table, &FilterSelection::all(&table))
        else {
            panic!("expected a ready dashboard");
        };
        assert_eq!(d.filtered.len(), table.len());
        assert_eq!(d.sales_by_title.len(), 3);
        assert_eq!(d.units_by_title.len(), 3);
        assert_eq!(d.sales_by_date.len(), 4);
    }

    #[test]
    fn filter_changes_recompute_the_view() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vendas.csv");
        std::fs::write(&path, CSV).unwrap();

        let mut state = AppState::new(DashboardConfig::default());
        state.open(&path);
        let DashboardView::Ready(d) = &state.view else {
            panic!("expected a ready dashboard");
        };
        assert_eq!(d.kpis.total, 35.0);

        state.toggle_filter_value(FilterColumn::City, "B");
        let DashboardView::Ready(d) = &state.view else {
            panic!("expected a ready dashboard");
        };
        assert_eq!(d.kpis.total, 10.0);
        assert_eq!(d.kpis.average, 10.0);

        state.select_none(FilterColumn::PaymentStatus);
        assert_eq!(state.view, DashboardView::Empty);

        state.select_all(FilterColumn::PaymentStatus);
        state.select_all(FilterColumn::City);
        let DashboardView::Ready(d) = &state.view else {
            panic!("expected a ready dashboard");
        };
        assert_eq!(d.filtered.len(), 3);
    }

    #[test]
    fn load_error_clears_dashboard() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("vendas.csv");
        std::fs::write(&good, CSV).unwrap();
        let bad = dir.path().join("broken.csv");
        std::fs::write(&bad, "Título\nX\n").unwrap();

        let mut state = AppState::new(DashboardConfig::default());
        state.open(&good);
        assert!(state.table.is_some());

        state.open(&bad);
        assert!(state.table.is_none());
        assert_eq!(state.view, DashboardView::NoData);
        assert!(state
            .status_message
            .as_deref()
            .is_some_and(|m| m.contains("Cidade do comprador")));
    }

    #[test]
    fn header_only_source_shows_empty_view() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vazio.csv");
        std::fs::write(
            &path,
            "Cidade do comprador,Título,Estado do pagamento,Preço total,Unidades vendidas,Data\n",
        )
        .unwrap();

        let mut state = AppState::new(DashboardConfig::default());
        state.open(&path);
        assert!(state.table.as_ref().is_some_and(|t| t.is_empty()));
        assert_eq!(state.view, DashboardView::Empty);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn export_writes_summary_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vendas.csv");
        std::fs::write(&path, CSV).unwrap();
        let out = dir.path().join("resumo.json");

        let mut state = AppState::new(DashboardConfig::default());
        assert!(state.export_summary(&out).is_err());

        state.open(&path);
        state.export_summary(&out).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(json["kpis"]["total"], 35.0);
        assert_eq!(json["sales_by_date"][0]["key"], "2024-01-01");
        assert_eq!(json["units_by_title"][0]["key"], "X");
        assert!(json.get("filtered").is_none());
    }
}
