//! Multi-fund alignment onto a shared date axis.
//!
//! The x-axis is the union of every date string seen in any selected fund.
//! Each fund contributes one column; a fund without a record on a date gets
//! `None` there. Each series is indexed once (`date -> nav`) before rows are
//! built, so alignment stays near-linear in the total record count.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::domain::{CalendarDate, NavRecord};

/// Key of the date field in serialized rows and of the first export column.
pub const DATE_KEY: &str = "date";

/// Whether `code` would collide with [`DATE_KEY`] as a column name.
pub fn is_reserved_code(code: &str) -> bool {
    code.eq_ignore_ascii_case(DATE_KEY)
}

/// One fund's validated series, keyed by its fund code.
#[derive(Debug, Clone, PartialEq)]
pub struct FundSeries {
    pub code: String,
    pub records: Vec<NavRecord>,
}

impl FundSeries {
    pub fn new(code: impl Into<String>, records: Vec<NavRecord>) -> Self {
        Self {
            code: code.into(),
            records,
        }
    }
}

/// A row of the aligned matrix: one value slot per fund column.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow {
    pub date: String,
    pub day: CalendarDate,
    pub values: Vec<Option<Decimal>>,
}

/// Aligned matrix plus the fund codes naming its columns, in selection order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedTable {
    pub codes: Vec<String>,
    pub rows: Vec<AlignedRow>,
}

impl AlignedTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column index of `code`.
    pub fn column_index(&self, code: &str) -> Option<usize> {
        self.codes.iter().position(|c| c == code)
    }

    /// Serializable view borrowing this table (`{date, <code>: number|null}` per row).
    pub fn chart_rows(&self) -> Vec<ChartRow<'_>> {
        self.rows
            .iter()
            .map(|row| ChartRow {
                codes: &self.codes,
                row,
            })
            .collect()
    }
}

impl AlignedRow {
    pub fn non_null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

/// Borrowed row view that serializes with one key per fund code.
pub struct ChartRow<'a> {
    codes: &'a [String],
    row: &'a AlignedRow,
}

impl Serialize for ChartRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.codes.len() + 1))?;
        map.serialize_entry(DATE_KEY, &self.row.date)?;
        for (code, value) in self.codes.iter().zip(&self.row.values) {
            map.serialize_entry(code, &value.and_then(|v| v.to_f64()))?;
        }
        map.end()
    }
}

/// Merge several funds onto the union of their dates.
///
/// - rows are ordered by parsed date, ties (same day, different spelling) by text
/// - for a repeated date inside one fund, the first record wins
/// - a code listed twice is aligned once, at its first position
/// - no funds gives an empty table; an empty fund gives an all-`None` column
pub fn align(series: &[FundSeries]) -> AlignedTable {
    let mut seen_codes: HashSet<&str> = HashSet::new();
    let selected: Vec<&FundSeries> = series
        .iter()
        .filter(|s| seen_codes.insert(s.code.as_str()))
        .collect();

    let indexes: Vec<HashMap<&str, Decimal>> = selected.iter().map(|s| index_by_date(&s.records)).collect();

    let mut axis: HashMap<&str, CalendarDate> = HashMap::new();
    for s in &selected {
        for r in &s.records {
            axis.entry(r.date()).or_insert(r.day());
        }
    }

    let mut dates: Vec<(&str, CalendarDate)> = axis.into_iter().collect();
    dates.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));

    let rows = dates
        .into_iter()
        .map(|(date, day)| AlignedRow {
            date: date.to_string(),
            day,
            values: indexes.iter().map(|idx| idx.get(date).copied()).collect(),
        })
        .collect();

    AlignedTable {
        codes: selected.iter().map(|s| s.code.clone()).collect(),
        rows,
    }
}

fn index_by_date(records: &[NavRecord]) -> HashMap<&str, Decimal> {
    let mut index = HashMap::with_capacity(records.len());
    for r in records {
        index.entry(r.date()).or_insert(r.nav());
    }
    index
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn fund(code: &str, rows: &[(&str, Decimal)]) -> FundSeries {
        FundSeries::new(
            code,
            rows.iter().map(|(d, n)| NavRecord::new(d, *n).unwrap()).collect(),
        )
    }

    #[test]
    fn disjoint_single_record_series_give_two_sparse_rows() {
        let table = align(&[
            fund("A", &[("01-01-2024", dec!(10))]),
            fund("B", &[("02-01-2024", dec!(20))]),
        ]);
        assert_eq!(table.codes, vec!["A", "B"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].values, vec![Some(dec!(10)), None]);
        assert_eq!(table.rows[1].values, vec![None, Some(dec!(20))]);
        assert!(table.rows.iter().all(|r| r.non_null_count() == 1));
    }

    #[test]
    fn row_count_is_union_size_and_cells_match_membership() {
        let funds = [
            fund("A", &[("03-01-2024", dec!(3)), ("01-01-2024", dec!(1)), ("02-01-2024", dec!(2))]),
            fund("B", &[("02-01-2024", dec!(20)), ("04-01-2024", dec!(40))]),
            fund("C", &[("02-01-2024", dec!(200))]),
        ];
        let table = align(&funds);

        let dates: Vec<&str> = table.rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["01-01-2024", "02-01-2024", "03-01-2024", "04-01-2024"]);

        for row in &table.rows {
            let holders = funds
                .iter()
                .filter(|f| f.records.iter().any(|r| r.date() == row.date))
                .count();
            assert_eq!(row.non_null_count(), holders, "date {}", row.date);
        }
    }

    #[test]
    fn sorts_union_across_years_day_first() {
        let table = align(&[
            fund("A", &[("01-02-2024", dec!(1))]),
            fund("B", &[("31-12-2023", dec!(2)), ("15-01-2024", dec!(3))]),
        ]);
        let dates: Vec<&str> = table.rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["31-12-2023", "15-01-2024", "01-02-2024"]);
    }

    #[test]
    fn first_record_wins_for_repeated_dates() {
        let table = align(&[fund("A", &[("01-01-2024", dec!(1)), ("01-01-2024", dec!(9))])]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].values, vec![Some(dec!(1))]);
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(align(&[]), AlignedTable::default());

        let table = align(&[fund("A", &[("01-01-2024", dec!(1))]), fund("EMPTY", &[])]);
        assert_eq!(table.codes, vec!["A", "EMPTY"]);
        assert_eq!(table.rows[0].values, vec![Some(dec!(1)), None]);
        let empty = table.column_index("EMPTY").unwrap();
        assert!(table.rows.iter().all(|row| row.values[empty].is_none()));
    }

    #[test]
    fn duplicate_codes_are_aligned_once() {
        let table = align(&[
            fund("A", &[("01-01-2024", dec!(1))]),
            fund("A", &[("02-01-2024", dec!(2))]),
        ]);
        assert_eq!(table.codes, vec!["A"]);
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn chart_rows_serialize_with_code_keys_and_nulls() {
        let table = align(&[
            fund("A", &[("01-01-2024", dec!(10.5))]),
            fund("B", &[("02-01-2024", dec!(20))]),
        ]);
        let json = serde_json::to_string(&table.chart_rows()).unwrap();
        assert_eq!(
            json,
            r#"[{"date":"01-01-2024","A":10.5,"B":null},{"date":"02-01-2024","A":null,"B":20.0}]"#
        );
    }
}
