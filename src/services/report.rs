//! Analytics view payload: period totals, category breakdowns and the
//! bucketed history, computed from one flat list of movements.

use std::fmt::Write;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::date_utils::{resolve_date, DateRange, TimeReference};
use crate::filters::{format_money, format_money_neutral, format_percent};
use crate::models::{Bucket, Granularity, MovementKind, TransactionRecord};
use crate::services::analytics::{
    breakdown_by_category, filter_by_range, CategoryBreakdown, PeriodTotals,
};
use crate::services::bucketizer::{Bucketizer, SkippedRecord};

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub granularity: Granularity,
    /// Range for totals and category breakdowns.
    pub range: DateRange,
    /// Range of movements fed to the history buckets.
    pub history_range: DateRange,
    pub reference: TimeReference,
}

/// One outflow in the analysed range, as listed under the breakdowns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseRow {
    pub date: NaiveDate,
    pub category: String,
    pub amount_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    pub range: DateRange,
    pub history_range: DateRange,
    pub granularity: Granularity,
    pub totals: PeriodTotals,
    pub expenses_by_category: Vec<CategoryBreakdown>,
    pub income_by_category: Vec<CategoryBreakdown>,
    /// Outflows within `range`, newest first.
    pub expenses: Vec<ExpenseRow>,
    pub history: Vec<Bucket>,
    pub skipped: Vec<SkippedRecord>,
}

impl AnalyticsReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

pub fn build_report(records: &[TransactionRecord], options: &ReportOptions) -> AnalyticsReport {
    let in_range = filter_by_range(records, &options.range, &options.reference);

    let totals = PeriodTotals::from_records(in_range.iter().copied());
    let expenses_by_category =
        breakdown_by_category(in_range.iter().copied(), MovementKind::Outflow);
    let income_by_category = breakdown_by_category(in_range.iter().copied(), MovementKind::Inflow);
    let expenses = expense_rows(&in_range, &options.reference);

    // Unresolvable records go to the bucketizer so they are reported as skipped.
    let history_input = records.iter().enumerate().filter(|(_, record)| {
        resolve_date(&record.timestamp, &options.reference)
            .map(|date| options.history_range.contains(date))
            .unwrap_or(true)
    });
    let aggregation =
        Bucketizer::new(options.reference).aggregate_iter(history_input, options.granularity);

    info!(
        granularity = %options.granularity,
        in_range = in_range.len(),
        buckets = aggregation.buckets.len(),
        skipped = aggregation.skipped.len(),
        "Built analytics report"
    );

    AnalyticsReport {
        range: options.range,
        history_range: options.history_range,
        granularity: options.granularity,
        totals,
        expenses_by_category,
        income_by_category,
        expenses,
        history: aggregation.buckets,
        skipped: aggregation.skipped,
    }
}

fn expense_rows(records: &[&TransactionRecord], reference: &TimeReference) -> Vec<ExpenseRow> {
    let mut rows: Vec<ExpenseRow> = records
        .iter()
        .filter(|record| record.kind == MovementKind::Outflow)
        .filter_map(|record| {
            let date = resolve_date(&record.timestamp, reference)?;
            Some(ExpenseRow {
                date,
                category: record.category_or_default().to_string(),
                amount_cents: record.amount_cents,
            })
        })
        .collect();

    // Stable, so same-day movements keep their input order.
    rows.sort_by(|a, b| b.date.cmp(&a.date));
    rows
}

/// Plain-text rendering of a report for terminal output.
pub fn render_text(report: &AnalyticsReport, currency: &str, locale: &str) -> String {
    let money = |cents: i64| format_money_neutral(cents, currency, locale);
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "Analytics: {}", report.range.display_label());
    let _ = writeln!(out, "  Income:    {}", money(report.totals.inflow_cents));
    let _ = writeln!(out, "  Expenses:  {}", money(report.totals.outflow_cents));
    let _ = writeln!(
        out,
        "  Net:       {}",
        format_money(report.totals.net_cents, currency, locale)
    );
    let _ = writeln!(out, "  Movements: {}", report.totals.transaction_count);

    for (kind, breakdown) in [
        (MovementKind::Outflow, &report.expenses_by_category),
        (MovementKind::Inflow, &report.income_by_category),
    ] {
        let _ = writeln!(out);
        let _ = writeln!(out, "{} by category", kind.label());
        if breakdown.is_empty() {
            let _ = writeln!(out, "  (none)");
        }
        for entry in breakdown {
            let _ = writeln!(
                out,
                "  {:<24} {:>16} {:>8}",
                entry.category,
                money(entry.total_cents),
                format_percent(entry.percentage, locale)
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Expense movements ({})", report.expenses.len());
    if report.expenses.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for row in &report.expenses {
        let _ = writeln!(
            out,
            "  {}  {:<24} {:>16}",
            row.date.format("%d/%m/%Y"),
            row.category,
            format!("- {}", money(row.amount_cents))
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "History ({}, {} – {})",
        report.granularity,
        report.history_range.from_key(),
        report.history_range.to_key()
    );
    if report.history.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for bucket in &report.history {
        let _ = writeln!(
            out,
            "  {:<8} in {:>16}  out {:>16}  net {:>17}",
            bucket.label,
            money(bucket.inflow_cents),
            money(bucket.outflow_cents),
            format_money(bucket.net_cents(), currency, locale)
        );
    }

    if report.skipped_count() > 0 {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Skipped {} record(s) with unreadable dates",
            report.skipped_count()
        );
    }

    out
}
