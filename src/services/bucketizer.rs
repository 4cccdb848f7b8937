//! Time-bucketed income/expense aggregation for the history chart.
//!
//! Records are grouped by a per-granularity key, summed per direction,
//! sorted chronologically and cut down to the most recent buckets.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::date_utils::{resolve_date, week_anchor, TimeReference};
use crate::models::{Bucket, Granularity, MovementKind, TransactionRecord};

/// A record left out of the totals because its timestamp did not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    /// Position in the input slice.
    pub index: usize,
    pub timestamp: String,
    pub kind: MovementKind,
    pub amount_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aggregation {
    pub granularity: Granularity,
    pub buckets: Vec<Bucket>,
    pub skipped: Vec<SkippedRecord>,
}

impl Aggregation {
    pub fn inflow_cents(&self) -> i64 {
        self.buckets
            .iter()
            .fold(0i64, |acc, b| acc.saturating_add(b.inflow_cents))
    }

    pub fn outflow_cents(&self) -> i64 {
        self.buckets
            .iter()
            .fold(0i64, |acc, b| acc.saturating_add(b.outflow_cents))
    }

    pub fn skipped_cents(&self, kind: MovementKind) -> i64 {
        self.skipped
            .iter()
            .filter(|s| s.kind == kind)
            .fold(0i64, |acc, s| acc.saturating_add(s.amount_cents))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bucketizer {
    reference: TimeReference,
}

impl Bucketizer {
    pub fn new(reference: TimeReference) -> Self {
        Self { reference }
    }

    pub fn aggregate(&self, records: &[TransactionRecord], granularity: Granularity) -> Aggregation {
        self.aggregate_iter(records.iter().enumerate(), granularity)
    }

    /// Like [`Bucketizer::aggregate`] but over a subset of a larger slice.
    /// Indices in `skipped` are the ones supplied alongside each record.
    pub fn aggregate_iter<'a, I>(&self, records: I, granularity: Granularity) -> Aggregation
    where
        I: IntoIterator<Item = (usize, &'a TransactionRecord)>,
    {
        let mut totals: BTreeMap<String, (i64, i64)> = BTreeMap::new();
        let mut skipped = Vec::new();
        let mut seen = 0usize;

        for (index, record) in records {
            seen += 1;
            let Some(date) = resolve_date(&record.timestamp, &self.reference) else {
                warn!(
                    index,
                    timestamp = %record.timestamp,
                    "Skipping record with unparseable timestamp"
                );
                skipped.push(SkippedRecord {
                    index,
                    timestamp: record.timestamp.clone(),
                    kind: record.kind,
                    amount_cents: record.amount_cents,
                });
                continue;
            };

            let key = bucket_key(date, granularity);
            trace!(index, %date, key = %key, "Bucketing record");

            // Totals saturate at i64::MAX rather than wrapping.
            let entry = totals.entry(key).or_insert((0, 0));
            match record.kind {
                MovementKind::Inflow => {
                    entry.0 = entry.0.saturating_add(record.amount_cents)
                }
                MovementKind::Outflow => {
                    entry.1 = entry.1.saturating_add(record.amount_cents)
                }
            }
        }

        // BTreeMap iterates keys in ascending order, which is chronological
        // for the zero-padded key formats.
        let cap = granularity.window_cap();
        let distinct = totals.len();
        let buckets: Vec<Bucket> = totals
            .into_iter()
            .skip(distinct.saturating_sub(cap))
            .map(|(key, (inflow_cents, outflow_cents))| Bucket {
                label: bucket_label(&key, granularity),
                key,
                inflow_cents,
                outflow_cents,
            })
            .collect();

        debug!(
            granularity = %granularity,
            records = seen,
            distinct_keys = distinct,
            buckets = buckets.len(),
            skipped = skipped.len(),
            "Aggregated records into buckets"
        );

        Aggregation {
            granularity,
            buckets,
            skipped,
        }
    }
}

/// Aggregate with dates resolved in UTC, returning only the buckets.
pub fn aggregate(records: &[TransactionRecord], granularity: Granularity) -> Vec<Bucket> {
    Bucketizer::default().aggregate(records, granularity).buckets
}

pub fn bucket_key(date: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Daily => date.format("%Y-%m-%d").to_string(),
        Granularity::Weekly => week_anchor(date).format("%Y-%m-%d").to_string(),
        Granularity::Monthly => date.format("%Y-%m").to_string(),
    }
}

/// `DD/MM` for daily and weekly keys, `MM/YYYY` for monthly ones.
pub fn bucket_label(key: &str, granularity: Granularity) -> String {
    let mut parts = key.split('-');
    let year = parts.next().unwrap_or_default();
    let month = parts.next().unwrap_or_default();

    match granularity {
        Granularity::Daily | Granularity::Weekly => {
            let day = parts.next().unwrap_or_default();
            format!("{}/{}", day, month)
        }
        Granularity::Monthly => format!("{}/{}", month, year),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(timestamp: &str, kind: MovementKind, amount_cents: i64) -> TransactionRecord {
        TransactionRecord::new(timestamp, kind, amount_cents).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_bucket_keys() {
        let date = d(2024, 3, 9);
        assert_eq!(bucket_key(date, Granularity::Daily), "2024-03-09");
        assert_eq!(bucket_key(date, Granularity::Weekly), "2024-03-04");
        assert_eq!(bucket_key(date, Granularity::Monthly), "2024-03");
    }

    #[test]
    fn test_bucket_labels() {
        assert_eq!(bucket_label("2024-03-09", Granularity::Daily), "09/03");
        assert_eq!(bucket_label("2024-03-04", Granularity::Weekly), "04/03");
        assert_eq!(bucket_label("2024-03", Granularity::Monthly), "03/2024");
    }

    #[test]
    fn test_monthly_scenario() {
        let records = vec![
            record("2024-01-15", MovementKind::Inflow, 10000),
            record("2024-01-20", MovementKind::Outflow, 4000),
            record("2024-02-01", MovementKind::Outflow, 2500),
        ];

        let buckets = aggregate(&records, Granularity::Monthly);

        assert_eq!(
            buckets,
            vec![
                Bucket {
                    key: "2024-01".into(),
                    label: "01/2024".into(),
                    inflow_cents: 10000,
                    outflow_cents: 4000,
                },
                Bucket {
                    key: "2024-02".into(),
                    label: "02/2024".into(),
                    inflow_cents: 0,
                    outflow_cents: 2500,
                },
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        let aggregation = Bucketizer::default().aggregate(&[], Granularity::Monthly);
        assert!(aggregation.buckets.is_empty());
        assert!(aggregation.skipped.is_empty());
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let records = vec![
            record("2024-03-02", MovementKind::Outflow, 300),
            record("2024-01-02", MovementKind::Outflow, 100),
            record("2024-02-02", MovementKind::Outflow, 200),
        ];

        let buckets = aggregate(&records, Granularity::Daily);
        let keys: Vec<&str> = buckets.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, vec!["2024-01-02", "2024-02-02", "2024-03-02"]);
    }

    #[test]
    fn test_weekly_boundary_day_eight() {
        let records = vec![
            record("2024-01-07", MovementKind::Outflow, 100),
            record("2024-01-08", MovementKind::Outflow, 200),
        ];

        let buckets = aggregate(&records, Granularity::Weekly);

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].key, "2024-01-01");
        assert_eq!(buckets[0].outflow_cents, 100);
        assert_eq!(buckets[1].key, "2024-01-08");
        assert_eq!(buckets[1].label, "08/01");
        assert_eq!(buckets[1].outflow_cents, 200);
    }

    #[test]
    fn test_weekly_resets_on_new_year() {
        let records = vec![
            record("2024-12-31", MovementKind::Inflow, 100),
            record("2025-01-01", MovementKind::Inflow, 200),
        ];

        let buckets = aggregate(&records, Granularity::Weekly);

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].key, "2024-12-30");
        assert_eq!(buckets[1].key, "2025-01-01");
    }

    #[test]
    fn test_daily_window_keeps_latest_thirty() {
        let start = d(2024, 1, 1);
        let records: Vec<TransactionRecord> = (0..35)
            .map(|i| {
                let date = start + chrono::Duration::days(i);
                record(&date.format("%Y-%m-%d").to_string(), MovementKind::Outflow, 100)
            })
            .collect();

        let buckets = aggregate(&records, Granularity::Daily);

        assert_eq!(buckets.len(), 30);
        assert_eq!(buckets[0].key, "2024-01-06");
        assert_eq!(buckets[29].key, "2024-02-04");
    }

    #[test]
    fn test_skips_malformed_timestamp() {
        let records = vec![
            record("2024-01-15", MovementKind::Inflow, 1000),
            record("garbage", MovementKind::Inflow, 500),
            record("2024-01-16", MovementKind::Outflow, 300),
        ];

        let aggregation = Bucketizer::default().aggregate(&records, Granularity::Monthly);

        assert_eq!(aggregation.buckets.len(), 1);
        assert_eq!(aggregation.buckets[0].inflow_cents, 1000);
        assert_eq!(aggregation.buckets[0].outflow_cents, 300);
        assert_eq!(aggregation.skipped.len(), 1);
        assert_eq!(aggregation.skipped[0].index, 1);
        assert_eq!(aggregation.skipped_cents(MovementKind::Inflow), 500);
        assert_eq!(aggregation.skipped_cents(MovementKind::Outflow), 0);
    }

    #[test]
    fn test_large_totals_saturate_instead_of_overflowing() {
        let big = record("2024-01-15", MovementKind::Inflow, crate::models::MAX_AMOUNT_CENTS);
        let records = vec![big; 100_000];

        let aggregation = Bucketizer::default().aggregate(&records, Granularity::Monthly);

        assert_eq!(aggregation.buckets.len(), 1);
        assert_eq!(aggregation.buckets[0].inflow_cents, i64::MAX);
        assert_eq!(aggregation.inflow_cents(), i64::MAX);
        assert_eq!(aggregation.buckets[0].net_cents(), i64::MAX);
    }

    #[test]
    fn test_time_reference_moves_record_across_days() {
        let records = vec![record("2024-01-31T23:30:00Z", MovementKind::Inflow, 100)];

        let utc = Bucketizer::new(TimeReference::Utc).aggregate(&records, Granularity::Monthly);
        let tokyo = Bucketizer::new("+09:00".parse().unwrap())
            .aggregate(&records, Granularity::Monthly);

        assert_eq!(utc.buckets[0].key, "2024-01");
        assert_eq!(tokyo.buckets[0].key, "2024-02");
    }

    #[test]
    fn test_aggregate_iter_reports_caller_indices() {
        let records = vec![
            record("2024-01-15", MovementKind::Inflow, 1000),
            record("bad", MovementKind::Outflow, 50),
        ];

        let aggregation = Bucketizer::default()
            .aggregate_iter(records.iter().enumerate().skip(1), Granularity::Daily);

        assert!(aggregation.buckets.is_empty());
        assert_eq!(aggregation.skipped[0].index, 1);
    }
}
