use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// FilterColumn – the three categorical columns the user can filter on
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterColumn {
    City,
    Title,
    PaymentStatus,
}

impl FilterColumn {
    pub const ALL: [FilterColumn; 3] = [
        FilterColumn::City,
        FilterColumn::Title,
        FilterColumn::PaymentStatus,
    ];

    /// Prompt shown above the column's multi-select.
    pub fn prompt(self) -> &'static str {
        match self {
            FilterColumn::City => "Selecione a cidade do comprador:",
            FilterColumn::Title => "Selecione o produto:",
            FilterColumn::PaymentStatus => "Selecione o estado do pagamento:",
        }
    }
}

impl fmt::Display for FilterColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterColumn::City => write!(f, "city"),
            FilterColumn::Title => write!(f, "title"),
            FilterColumn::PaymentStatus => write!(f, "payment status"),
        }
    }
}

// ---------------------------------------------------------------------------
// SalesRecord – one row of the sheet
// ---------------------------------------------------------------------------

/// A single sales transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRecord {
    pub city: String,
    pub title: String,
    pub payment_status: String,
    /// Total price of the transaction, in currency units.
    pub total_price: f64,
    pub units_sold: i64,
    pub date: NaiveDate,
}

impl SalesRecord {
    /// The record's value in a filterable column.
    pub fn value(&self, column: FilterColumn) -> &str {
        match column {
            FilterColumn::City => &self.city,
            FilterColumn::Title => &self.title,
            FilterColumn::PaymentStatus => &self.payment_status,
        }
    }
}

// ---------------------------------------------------------------------------
// SalesTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The loaded sheet. Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesTable {
    records: Vec<SalesRecord>,
    cities: Vec<String>,
    titles: Vec<String>,
    statuses: Vec<String>,
}

impl SalesTable {
    /// Build the distinct-value lists from the loaded records.
    pub fn from_records(records: Vec<SalesRecord>) -> Self {
        let cities = distinct(&records, FilterColumn::City);
        let titles = distinct(&records, FilterColumn::Title);
        let statuses = distinct(&records, FilterColumn::PaymentStatus);
        SalesTable {
            records,
            cities,
            titles,
            statuses,
        }
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    /// Distinct values of `column`, in order of first appearance.
    pub fn distinct_values(&self, column: FilterColumn) -> &[String] {
        match column {
            FilterColumn::City => &self.cities,
            FilterColumn::Title => &self.titles,
            FilterColumn::PaymentStatus => &self.statuses,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn distinct(records: &[SalesRecord], column: FilterColumn) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    records
        .iter()
        .map(|r| r.value(column))
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}
