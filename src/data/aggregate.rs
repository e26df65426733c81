use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use super::filter::FilteredTable;
use super::model::SalesRecord;

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

/// Headline figures for the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KpiSummary {
    /// Sum of total price over the filtered records.
    pub total: f64,
    /// Mean total price per transaction (unweighted by units).
    pub average: f64,
    pub transactions: usize,
}

/// Compute total and average price. `None` for an empty table: there is
/// no average of zero transactions.
pub fn compute_kpis(filtered: &FilteredTable) -> Option<KpiSummary> {
    if filtered.is_empty() {
        return None;
    }
    let total: f64 = filtered.records().iter().map(|r| r.total_price).sum();
    let transactions = filtered.len();
    Some(KpiSummary {
        total,
        average: total / transactions as f64,
        transactions,
    })
}

// ---------------------------------------------------------------------------
// Grouped sums
// ---------------------------------------------------------------------------

/// Which numeric column a grouped sum adds up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Price,
    Units,
}

impl Measure {
    fn of(self, record: &SalesRecord) -> f64 {
        match self {
            Measure::Price => record.total_price,
            Measure::Units => record.units_sold as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupEntry<K> {
    pub key: K,
    pub value: f64,
}

/// Ordered `(key, summed measure)` pairs ready for charting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GroupAggregate<K> {
    entries: Vec<GroupEntry<K>>,
}

impl<K> GroupAggregate<K> {
    pub fn entries(&self) -> &[GroupEntry<K>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum over all groups.
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.value).sum()
    }

    pub fn max_value(&self) -> Option<f64> {
        self.entries.iter().map(|e| e.value).reduce(f64::max)
    }
}

/// Sum `measure` per product title, ascending by sum.
///
/// Titles with equal sums keep the order in which they first appear.
pub fn group_by_title_sum(filtered: &FilteredTable, measure: Measure) -> GroupAggregate<String> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<GroupEntry<String>> = Vec::new();

    for record in filtered.records() {
        let slot = *slots.entry(record.title.as_str()).or_insert_with(|| {
            entries.push(GroupEntry {
                key: record.title.clone(),
                value: 0.0,
            });
            entries.len() - 1
        });
        entries[slot].value += measure.of(record);
    }

    // `sort_by` is stable, which gives the first-appearance tie-break.
    entries.sort_by(|a, b| a.value.total_cmp(&b.value));
    GroupAggregate { entries }
}

/// Sum total price per transaction date, in chronological order.
pub fn group_by_date_sum(filtered: &FilteredTable) -> GroupAggregate<NaiveDate> {
    let mut sums: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in filtered.records() {
        *sums.entry(record.date).or_default() += record.total_price;
    }
    GroupAggregate {
        entries: sums
            .into_iter()
            .map(|(key, value)| GroupEntry { key, value })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter, FilterSelection};
    use crate::data::model::fixtures::*;
    use crate::data::model::SalesTable;

    fn everything(table: &SalesTable) -> FilteredTable {
        filter(table.records(), &FilterSelection::all(table))
    }

    fn keys<K: Clone>(agg: &GroupAggregate<K>) -> Vec<K> {
        agg.entries().iter().map(|e| e.key.clone()).collect()
    }

    #[test]
    fn kpis_of_single_row() {
        let table = SalesTable::from_records(vec![
            record("A", "X", "Paid", 10.0, 1, date(2024, 1, 1)),
            record("B", "X", "Paid", 20.0, 2, date(2024, 1, 1)),
        ]);
        let mut selection = FilterSelection::all(&table);
        selection.toggle(crate::data::model::FilterColumn::City, "B");
        let filtered = filter(table.records(), &selection);

        let kpis = compute_kpis(&filtered).unwrap();
        assert_eq!(kpis.total, 10.0);
        assert_eq!(kpis.average, 10.0);
        assert_eq!(kpis.transactions, 1);

        let by_title = group_by_title_sum(&filtered, Measure::Price);
        assert_eq!(by_title.entries(), [GroupEntry { key: "X".to_string(), value: 10.0 }]);
    }

    #[test]
    fn kpis_sum_and_mean() {
        let table = sample_table();
        let kpis = compute_kpis(&everything(&table)).unwrap();
        assert!((kpis.total - 235.5).abs() < 1e-9);
        assert!((kpis.average - 235.5 / 6.0).abs() < 1e-9);
        assert!((kpis.average * kpis.transactions as f64 - kpis.total).abs() < 1e-9);
    }

    #[test]
    fn no_kpis_for_empty_selection() {
        assert_eq!(compute_kpis(&FilteredTable::default()), None);
    }

    #[test]
    fn title_sums_ascending() {
        let table = sample_table();
        let filtered = everything(&table);

        let price = group_by_title_sum(&filtered, Measure::Price);
        assert_eq!(keys(&price), ["Caneca", "Boné", "Camiseta"]);
        assert_eq!(price.entries()[2].value, 150.0);

        let units = group_by_title_sum(&filtered, Measure::Units);
        assert_eq!(keys(&units), ["Boné", "Caneca", "Camiseta"]);
        assert_eq!(units.entries()[0].value, 1.0);
        assert_eq!(units.entries()[1].value, 4.0);
        assert_eq!(units.entries()[2].value, 6.0);
    }

    #[test]
    fn equal_sums_keep_first_appearance() {
        let table = SalesTable::from_records(vec![
            record("A", "Zebra", "Paid", 5.0, 1, date(2024, 1, 1)),
            record("A", "Alpha", "Paid", 5.0, 1, date(2024, 1, 1)),
            record("A", "Mid", "Paid", 1.0, 1, date(2024, 1, 1)),
        ]);
        let agg = group_by_title_sum(&everything(&table), Measure::Price);
        assert_eq!(keys(&agg), ["Mid", "Zebra", "Alpha"]);
    }

    #[test]
    fn date_sums_are_chronological() {
        let table = sample_table();
        let agg = group_by_date_sum(&everything(&table));
        assert_eq!(
            keys(&agg),
            [date(2024, 3, 1), date(2024, 3, 2), date(2024, 3, 3), date(2024, 3, 4)]
        );
        assert_eq!(agg.entries()[0].value, 105.0);
        assert_eq!(agg.entries()[1].value, 95.5);
    }

    #[test]
    fn same_date_prices_add_up() {
        let table = SalesTable::from_records(vec![
            record("A", "X", "Paid", 5.0, 1, date(2024, 5, 10)),
            record("B", "Y", "Paid", 7.0, 1, date(2024, 5, 10)),
        ]);
        let agg = group_by_date_sum(&everything(&table));
        assert_eq!(agg.entries(), [GroupEntry { key: date(2024, 5, 10), value: 12.0 }]);
    }

    #[test]
    fn groups_partition_the_filtered_rows() {
        let table = sample_table();
        let mut selection = FilterSelection::all(&table);
        selection.toggle(crate::data::model::FilterColumn::PaymentStatus, "Cancelado");
        let filtered = filter(table.records(), &selection);

        let kpis = compute_kpis(&filtered).unwrap();
        let units: i64 = filtered.records().iter().map(|r| r.units_sold).sum();

        assert!((group_by_title_sum(&filtered, Measure::Price).total() - kpis.total).abs() < 1e-9);
        assert!((group_by_date_sum(&filtered).total() - kpis.total).abs() < 1e-9);
        assert_eq!(group_by_title_sum(&filtered, Measure::Units).total(), units as f64);
    }

    #[test]
    fn recomputation_is_reproducible() {
        let table = sample_table();
        let a = group_by_date_sum(&everything(&table));
        let b = group_by_date_sum(&everything(&table));
        assert_eq!(a, b);
        assert_eq!(a.max_value(), Some(105.0));
    }
}
