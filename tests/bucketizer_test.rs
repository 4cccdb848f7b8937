//! Behavioural tests for the time-bucketed aggregation.

mod common;

use common::{daily_series, date, inflow, outflow, total_of};
use finboard::date_utils::TimeReference;
use finboard::models::{Bucket, Granularity, MovementKind};
use finboard::{aggregate, Bucketizer};

/// Monthly grouping sums each direction separately.
#[test]
fn test_monthly_example() {
    let records = vec![
        inflow("2024-01-15", 10000),
        outflow("2024-01-20", 4000),
        outflow("2024-02-01", 2500),
    ];

    let buckets = aggregate(&records, Granularity::Monthly);

    let summary: Vec<(&str, i64, i64)> = buckets
        .iter()
        .map(|b| (b.label.as_str(), b.inflow_cents, b.outflow_cents))
        .collect();
    assert_eq!(
        summary,
        vec![("01/2024", 10000, 4000), ("02/2024", 0, 2500)]
    );
}

#[test]
fn test_empty_input_yields_no_buckets() {
    for granularity in Granularity::all() {
        assert!(aggregate(&[], *granularity).is_empty());
    }
}

/// 35 distinct days keep only the 30 most recent.
#[test]
fn test_daily_window_truncates_oldest() {
    let records = daily_series(date(2024, 1, 1), 35);

    let buckets = aggregate(&records, Granularity::Daily);

    assert_eq!(buckets.len(), 30);
    assert_eq!(buckets.first().map(|b| b.key.as_str()), Some("2024-01-06"));
    assert_eq!(buckets.last().map(|b| b.key.as_str()), Some("2024-02-04"));
    assert_eq!(buckets[0].label, "06/01");
}

#[test]
fn test_weekly_and_monthly_caps() {
    let records = daily_series(date(2023, 1, 1), 731);

    let weekly = aggregate(&records, Granularity::Weekly);
    let monthly = aggregate(&records, Granularity::Monthly);

    assert_eq!(weekly.len(), 12);
    assert_eq!(monthly.len(), 12);
    assert_eq!(monthly[0].label, "01/2024");
    assert_eq!(monthly[11].label, "12/2024");
    // 2024 is a leap year: the final span holds Dec 30 and Dec 31.
    assert_eq!(weekly[11].key, "2024-12-30");
    assert_eq!(weekly[11].label, "30/12");
}

#[test]
fn test_fewer_keys_than_cap_are_all_kept() {
    let records = vec![inflow("2024-05-01", 1), inflow("2024-06-01", 1)];
    assert_eq!(aggregate(&records, Granularity::Monthly).len(), 2);
}

#[test]
fn test_output_is_strictly_ascending() {
    let mut records = daily_series(date(2024, 1, 1), 90);
    records.reverse();

    for granularity in Granularity::all() {
        let buckets = aggregate(&records, *granularity);
        assert!(buckets.len() <= granularity.window_cap());
        assert!(
            buckets.windows(2).all(|pair| pair[0].key < pair[1].key),
            "{} buckets not strictly ascending",
            granularity
        );
    }
}

#[test]
fn test_day_eight_opens_second_week() {
    let records = vec![outflow("2024-01-07", 1), outflow("2024-01-08", 2)];

    let buckets = aggregate(&records, Granularity::Weekly);

    assert_eq!(
        buckets,
        vec![
            Bucket {
                key: "2024-01-01".into(),
                label: "01/01".into(),
                inflow_cents: 0,
                outflow_cents: 1,
            },
            Bucket {
                key: "2024-01-08".into(),
                label: "08/01".into(),
                inflow_cents: 0,
                outflow_cents: 2,
            },
        ]
    );
}

/// Totals plus skipped amounts equal input totals, per direction.
#[test]
fn test_conservation_with_malformed_records() {
    let mut records = daily_series(date(2024, 3, 1), 20);
    records.push(inflow("31/02/2024", 777));
    records.push(outflow("", 333));
    records.push(outflow("2024-03-10T12:00:00Z", 50));

    let aggregation = Bucketizer::default().aggregate(&records, Granularity::Monthly);

    assert_eq!(aggregation.skipped.len(), 2);
    assert_eq!(
        aggregation.inflow_cents() + aggregation.skipped_cents(MovementKind::Inflow),
        total_of(&records, MovementKind::Inflow)
    );
    assert_eq!(
        aggregation.outflow_cents() + aggregation.skipped_cents(MovementKind::Outflow),
        total_of(&records, MovementKind::Outflow)
    );
}

#[test]
fn test_malformed_record_does_not_abort() {
    let records = vec![
        inflow("2024-04-01", 500),
        inflow("yesterday", 10_000),
        outflow("2024-04-02", 200),
    ];

    let buckets = aggregate(&records, Granularity::Daily);

    let inflow_total: i64 = buckets.iter().map(|b| b.inflow_cents).sum();
    let outflow_total: i64 = buckets.iter().map(|b| b.outflow_cents).sum();
    assert_eq!(inflow_total, 500);
    assert_eq!(outflow_total, 200);
}

#[test]
fn test_aggregate_is_idempotent() {
    let records = daily_series(date(2024, 2, 10), 45);
    let bucketizer = Bucketizer::new(TimeReference::Utc);

    let first = bucketizer.aggregate(&records, Granularity::Weekly);
    let second = bucketizer.aggregate(&records, Granularity::Weekly);

    assert_eq!(first, second);
}

#[test]
fn test_unknown_granularity_is_rejected() {
    let result = "fortnightly".parse::<Granularity>();
    assert!(matches!(result, Err(finboard::error::AppError::Config(_))));
}

/// The same instant lands in different days depending on the reference.
#[test]
fn test_reference_applied_uniformly() {
    let records = vec![
        inflow("2024-06-30T22:00:00Z", 100),
        inflow("2024-07-01T03:00:00+00:00", 200),
    ];

    let utc = Bucketizer::new(TimeReference::Utc).aggregate(&records, Granularity::Monthly);
    let lima = Bucketizer::new("-05:00".parse().expect("offset"))
        .aggregate(&records, Granularity::Monthly);

    let utc_keys: Vec<&str> = utc.buckets.iter().map(|b| b.key.as_str()).collect();
    assert_eq!(utc_keys, vec!["2024-06", "2024-07"]);

    assert_eq!(lima.buckets.len(), 1);
    assert_eq!(lima.buckets[0].key, "2024-06");
    assert_eq!(lima.buckets[0].inflow_cents, 300);
}
