//! Period aggregation: group a series into daily/weekly/monthly/yearly buckets
//! and reduce each bucket to its mean NAV.
//!
//! Aggregation is always recomputed from the full series; there is no
//! incremental update when the granularity changes.

use std::collections::{HashMap, HashSet};

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;

use crate::domain::{DuplicatePolicy, Granularity, NavRecord, PeriodKey, PeriodRow};
use crate::series::date::period_key;

/// Decimal places of `PeriodRow::avg_nav`.
pub const AVG_NAV_DP: u32 = 4;

/// Running sum for one bucket.
#[derive(Debug, Clone)]
struct Bucket {
    key: PeriodKey,
    sum: Decimal,
    count: usize,
}

/// Group `records` by period and average each group.
///
/// Rows are ordered by each key's representative date; buckets whose
/// representatives coincide (daily keys spelled differently for the same day)
/// keep first-seen order. Empty input gives an empty table.
pub fn aggregate(records: &[NavRecord], granularity: Granularity, duplicates: DuplicatePolicy) -> Vec<PeriodRow> {
    let contributing = apply_duplicate_policy(records, duplicates);

    // Insertion-ordered accumulator: `slots` maps a key to its bucket index.
    let mut slots: HashMap<PeriodKey, usize> = HashMap::new();
    let mut buckets: Vec<Bucket> = Vec::new();

    for record in contributing {
        let key = period_key(record, granularity);
        let idx = *slots.entry(key.clone()).or_insert_with(|| {
            buckets.push(Bucket {
                key,
                sum: Decimal::ZERO,
                count: 0,
            });
            buckets.len() - 1
        });
        let bucket = &mut buckets[idx];
        match bucket.sum.checked_add(record.nav()) {
            Some(sum) => {
                bucket.sum = sum;
                bucket.count += 1;
            }
            None => warn!(date = record.date(), nav = %record.nav(), "NAV sum overflowed; record skipped"),
        }
    }

    buckets.sort_by_key(|b| b.key.representative_date());

    buckets
        .into_iter()
        .map(|b| PeriodRow {
            period: b.key.to_string(),
            avg_nav: mean_4dp(b.sum, b.count),
            key: b.key,
            count: b.count,
        })
        .collect()
}

/// Records that feed the averages under `policy`, in input order.
fn apply_duplicate_policy(records: &[NavRecord], policy: DuplicatePolicy) -> Vec<&NavRecord> {
    match policy {
        DuplicatePolicy::CountAll => records.iter().collect(),
        DuplicatePolicy::KeepFirst => {
            let mut seen: HashSet<&str> = HashSet::new();
            records.iter().filter(|r| seen.insert(r.date())).collect()
        }
        DuplicatePolicy::KeepLast => {
            let mut last: HashMap<&str, usize> = HashMap::new();
            for (idx, r) in records.iter().enumerate() {
                last.insert(r.date(), idx);
            }
            records
                .iter()
                .enumerate()
                .filter(|(idx, r)| last.get(r.date()) == Some(idx))
                .map(|(_, r)| r)
                .collect()
        }
    }
}

/// Arithmetic mean rounded half away from zero, always rendered with 4 decimals.
fn mean_4dp(sum: Decimal, count: usize) -> Decimal {
    let mut avg = sum
        .checked_div(Decimal::from(count))
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(AVG_NAV_DP, RoundingStrategy::MidpointAwayFromZero);
    avg.rescale(AVG_NAV_DP);
    avg
}
