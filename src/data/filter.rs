use std::collections::BTreeSet;

use super::model::{FilterColumn, SalesRecord, SalesTable};

// ---------------------------------------------------------------------------
// FilterSelection – which values are allowed per column
// ---------------------------------------------------------------------------

/// Allowed values for each filterable column.
///
/// An empty set matches nothing. There is no "no filter" state: the
/// dashboard starts from [`FilterSelection::all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub cities: BTreeSet<String>,
    pub titles: BTreeSet<String>,
    pub statuses: BTreeSet<String>,
}

impl FilterSelection {
    /// Select every distinct value of every column (show everything).
    pub fn all(table: &SalesTable) -> Self {
        let mut selection = Self::default();
        for column in FilterColumn::ALL {
            selection.select_all(table, column);
        }
        selection
    }

    pub fn selected(&self, column: FilterColumn) -> &BTreeSet<String> {
        match column {
            FilterColumn::City => &self.cities,
            FilterColumn::Title => &self.titles,
            FilterColumn::PaymentStatus => &self.statuses,
        }
    }

    fn selected_mut(&mut self, column: FilterColumn) -> &mut BTreeSet<String> {
        match column {
            FilterColumn::City => &mut self.cities,
            FilterColumn::Title => &mut self.titles,
            FilterColumn::PaymentStatus => &mut self.statuses,
        }
    }

    pub fn contains(&self, column: FilterColumn, value: &str) -> bool {
        self.selected(column).contains(value)
    }

    /// Toggle a single value in a column's selection.
    pub fn toggle(&mut self, column: FilterColumn, value: &str) {
        let selected = self.selected_mut(column);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
    }

    /// Select all values of a column.
    pub fn select_all(&mut self, table: &SalesTable, column: FilterColumn) {
        *self.selected_mut(column) = table.distinct_values(column).iter().cloned().collect();
    }

    /// Deselect all values of a column.
    pub fn select_none(&mut self, column: FilterColumn) {
        self.selected_mut(column).clear();
    }

    /// Whether `record` passes all three column filters.
    pub fn matches(&self, record: &SalesRecord) -> bool {
        FilterColumn::ALL
            .iter()
            .all(|&column| self.contains(column, record.value(column)))
    }
}

// ---------------------------------------------------------------------------
// FilteredTable
// ---------------------------------------------------------------------------

/// The records of a table that pass a [`FilterSelection`], in table order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredTable {
    records: Vec<SalesRecord>,
}

impl FilteredTable {
    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing passed the filters. Callers stop here and report
    /// the empty state instead of computing KPIs or charts.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Keep the records whose city, title and payment status are all selected.
///
/// Takes a plain slice, so it applies equally to a [`SalesTable`] and to an
/// already-filtered table.
pub fn filter(records: &[SalesRecord], selection: &FilterSelection) -> FilteredTable {
    FilteredTable {
        records: records
            .iter()
            .filter(|r| selection.matches(r))
            .cloned()
            .collect(),
    }
}
