use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::date_utils::{resolve_date, DateRange, TimeReference};
use crate::models::{MovementKind, TransactionRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PeriodTotals {
    pub inflow_cents: i64,
    pub outflow_cents: i64,
    pub net_cents: i64,
    pub transaction_count: usize,
}

impl PeriodTotals {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a TransactionRecord>,
    {
        let mut totals = Self::default();

        for record in records {
            match record.kind {
                MovementKind::Inflow => {
                    totals.inflow_cents = totals.inflow_cents.saturating_add(record.amount_cents)
                }
                MovementKind::Outflow => {
                    totals.outflow_cents = totals.outflow_cents.saturating_add(record.amount_cents)
                }
            }
            totals.transaction_count += 1;
        }

        totals.net_cents = totals.inflow_cents - totals.outflow_cents;
        totals
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub category: String,
    pub total_cents: i64,
    pub percentage: f64,
    pub transaction_count: usize,
}

/// Keep the records whose date falls inside `range`.
///
/// Records whose timestamp does not resolve are dropped.
pub fn filter_by_range<'a>(
    records: &'a [TransactionRecord],
    range: &DateRange,
    reference: &TimeReference,
) -> Vec<&'a TransactionRecord> {
    let filtered: Vec<&TransactionRecord> = records
        .iter()
        .filter(|record| {
            resolve_date(&record.timestamp, reference)
                .map(|date| range.contains(date))
                .unwrap_or(false)
        })
        .collect();

    debug!(
        from = %range.from,
        to = %range.to,
        total = records.len(),
        kept = filtered.len(),
        "Filtered records by date range"
    );

    filtered
}

/// Per-category totals for one direction, largest first.
pub fn breakdown_by_category<'a, I>(records: I, kind: MovementKind) -> Vec<CategoryBreakdown>
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    let mut category_data: HashMap<&str, (i64, usize)> = HashMap::new();

    for record in records.into_iter().filter(|r| r.kind == kind) {
        let entry = category_data
            .entry(record.category_or_default())
            .or_insert((0, 0));
        entry.0 = entry.0.saturating_add(record.amount_cents);
        entry.1 += 1;
    }

    let total = category_data
        .values()
        .fold(0i64, |acc, (total, _)| acc.saturating_add(*total));

    let mut result: Vec<CategoryBreakdown> = category_data
        .into_iter()
        .map(|(category, (total_cents, transaction_count))| CategoryBreakdown {
            category: category.to_string(),
            total_cents,
            percentage: if total > 0 {
                (total_cents as f64 / total as f64) * 100.0
            } else {
                0.0
            },
            transaction_count,
        })
        .collect();

    result.sort_by(|a, b| {
        b.total_cents
            .cmp(&a.total_cents)
            .then_with(|| a.category.cmp(&b.category))
    });
    result
}
