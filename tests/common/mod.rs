//! Shared builders for integration tests.

#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use finboard::models::{MovementKind, TransactionRecord};

pub fn inflow(timestamp: &str, cents: i64) -> TransactionRecord {
    TransactionRecord::new(timestamp, MovementKind::Inflow, cents).expect("valid record")
}

pub fn outflow(timestamp: &str, cents: i64) -> TransactionRecord {
    TransactionRecord::new(timestamp, MovementKind::Outflow, cents).expect("valid record")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// One inflow and one outflow per day for `days` consecutive days.
pub fn daily_series(start: NaiveDate, days: i64) -> Vec<TransactionRecord> {
    (0..days)
        .flat_map(|i| {
            let day = (start + Duration::days(i)).format("%Y-%m-%d").to_string();
            let cents = 100 + i;
            [inflow(&day, cents * 2), outflow(&day, cents)]
        })
        .collect()
}

pub fn total_of(records: &[TransactionRecord], kind: MovementKind) -> i64 {
    records
        .iter()
        .filter(|r| r.kind == kind)
        .map(|r| r.amount_cents)
        .sum()
}
