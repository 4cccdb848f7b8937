use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::AppError;

/// Size of the time window movements are grouped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Number of most recent buckets kept after sorting.
    pub fn window_cap(&self) -> usize {
        match self {
            Self::Daily => 30,
            Self::Weekly => 12,
            Self::Monthly => 12,
        }
    }

    pub fn all() -> &'static [Granularity] {
        &[Self::Daily, Self::Weekly, Self::Monthly]
    }
}

impl FromStr for Granularity {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(AppError::Config(format!(
                "Unknown granularity '{}', expected one of: daily, weekly, monthly",
                other
            ))),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Income and expense totals for one time window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    /// `YYYY-MM-DD` for daily and weekly buckets, `YYYY-MM` for monthly ones.
    pub key: String,
    pub label: String,
    pub inflow_cents: i64,
    pub outflow_cents: i64,
}

impl Bucket {
    pub fn net_cents(&self) -> i64 {
        self.inflow_cents - self.outflow_cents
    }
}
