use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc,
};
use serde::Serialize;

use crate::error::{AppError, AppResult};

const DATE_FORMAT: &str = "%Y-%m-%d";

const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
];

/// Naive forms are taken to be wall-clock time in the active reference.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// The time zone every timestamp of a computation is resolved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeReference {
    #[default]
    Utc,
    Local,
    Fixed(FixedOffset),
}

impl TimeReference {
    /// Calendar date of an absolute instant in this reference.
    pub fn date_of<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> NaiveDate {
        match self {
            Self::Utc => instant.with_timezone(&Utc).date_naive(),
            Self::Local => instant.with_timezone(&Local).date_naive(),
            Self::Fixed(offset) => instant.with_timezone(offset).date_naive(),
        }
    }
}

impl FromStr for TimeReference {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("utc") || trimmed == "Z" {
            return Ok(Self::Utc);
        }
        if trimmed.eq_ignore_ascii_case("local") {
            return Ok(Self::Local);
        }
        parse_offset(trimmed).map(Self::Fixed).ok_or_else(|| {
            AppError::Config(format!(
                "Invalid time reference '{}', expected 'utc', 'local' or an offset like '+05:00'",
                trimmed
            ))
        })
    }
}

impl fmt::Display for TimeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utc => f.write_str("utc"),
            Self::Local => f.write_str("local"),
            Self::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

fn parse_offset(s: &str) -> Option<FixedOffset> {
    let sign = match s.chars().next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    let digits: String = s[1..].chars().filter(|c| *c != ':').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let (hours, minutes): (i32, i32) = match digits.len() {
        2 => (digits.parse().ok()?, 0),
        4 => (digits[..2].parse().ok()?, digits[2..].parse().ok()?),
        _ => return None,
    };
    if minutes >= 60 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Resolve a stored timestamp to a calendar date.
///
/// Returns `None` when the text is not a recognised date or date-time.
pub fn resolve_date(timestamp: &str, reference: &TimeReference) -> Option<NaiveDate> {
    let raw = timestamp.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(reference.date_of(&instant));
    }

    // Offsets without a colon or minutes, as in Postgres text output
    // ("2024-01-15 10:30:00+00") or "2024-01-15T10:30:00+0000".
    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(instant) = DateTime::parse_from_str(raw, format) {
            return Some(reference.date_of(&instant));
        }
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.date());
        }
    }

    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

/// First day of the 7-day span containing `date`.
///
/// Spans are counted from January 1 of the date's own year (days 1-7,
/// 8-14, ...), so numbering restarts every year and the last span of a
/// year is shorter than a week.
pub fn week_anchor(date: NaiveDate) -> NaiveDate {
    let span_start = (date.ordinal0() / 7) * 7;
    date.with_ordinal0(span_start).unwrap_or(date)
}

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> AppResult<Self> {
        if from > to {
            return Err(AppError::Validation(format!(
                "Range start {} is after range end {}",
                from, to
            )));
        }
        Ok(Self { from, to })
    }

    pub fn parse(from: &str, to: &str) -> AppResult<Self> {
        let from = parse_date(from)?;
        let to = parse_date(to)?;
        Self::new(from, to)
    }

    /// First day of `today`'s month through `today`.
    pub fn month_to_date(today: NaiveDate) -> Self {
        Self {
            from: month_start(today),
            to: today,
        }
    }

    /// The last `months` calendar months, the current one included, ending at `today`.
    pub fn trailing_months(today: NaiveDate, months: u32) -> Self {
        let back = months.saturating_sub(1).min(i32::MAX as u32) as i32;
        Self {
            from: shift_months(month_start(today), -back),
            to: today,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    pub fn from_key(&self) -> String {
        self.from.format(DATE_FORMAT).to_string()
    }

    pub fn to_key(&self) -> String {
        self.to.format(DATE_FORMAT).to_string()
    }

    /// Human-readable label, e.g. "January 2024", "Jan 1 – Jan 15, 2024"
    /// or "Dec 1, 2023 – Jan 15, 2024".
    pub fn display_label(&self) -> String {
        if self.from == month_start(self.from) && self.to == month_end(self.from) {
            return self.from.format("%B %Y").to_string();
        }

        let from_fmt = self.from.format("%b %-d");
        if self.from.year() == self.to.year() {
            format!(
                "{} – {}, {}",
                from_fmt,
                self.to.format("%b %-d"),
                self.to.format("%Y")
            )
        } else {
            format!(
                "{}, {} – {}, {}",
                from_fmt,
                self.from.format("%Y"),
                self.to.format("%b %-d"),
                self.to.format("%Y")
            )
        }
    }
}

pub fn parse_date(s: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| AppError::Validation(format!("Invalid date '{}': {}", s.trim(), e)))
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn month_end(date: NaiveDate) -> NaiveDate {
    let next_month = shift_months(month_start(date), 1);
    next_month.pred_opt().unwrap_or(date)
}

/// First day of the month `months` away from `date`'s month, clamped to
/// the representable date range.
fn shift_months(date: NaiveDate, months: i32) -> NaiveDate {
    let total_months = (date.year() * 12 + date.month() as i32 - 1).saturating_add(months);
    let new_year = total_months.div_euclid(12);
    let new_month = (total_months.rem_euclid(12) + 1) as u32;
    match NaiveDate::from_ymd_opt(new_year, new_month, 1) {
        Some(shifted) => shifted,
        None if months < 0 => NaiveDate::MIN,
        None => NaiveDate::MAX,
    }
}
