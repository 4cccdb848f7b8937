use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{AppError, AppResult};

pub const UNCATEGORIZED: &str = "Uncategorized";

/// Largest single movement accepted, in cents (one trillion in major units).
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_000_000;

/// Direction of a movement: money coming in or going out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Inflow,
    Outflow,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inflow => "inflow",
            Self::Outflow => "outflow",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Inflow => "Income",
            Self::Outflow => "Expenses",
        }
    }
}

impl FromStr for MovementKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inflow" | "income" | "ingreso" => Ok(Self::Inflow),
            "outflow" | "expense" | "gasto" => Ok(Self::Outflow),
            other => Err(AppError::Validation(format!(
                "Unknown movement type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dated income or expense movement as exported by the backend.
///
/// The timestamp is kept as raw text; resolving it to a calendar date is
/// deferred to the aggregation step so a bad value only drops that record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    pub timestamp: String,
    pub kind: MovementKind,
    pub amount_cents: i64,
    pub category: Option<String>,
}

impl TransactionRecord {
    pub fn new(
        timestamp: impl Into<String>,
        kind: MovementKind,
        amount_cents: i64,
    ) -> AppResult<Self> {
        if amount_cents < 0 {
            return Err(AppError::Validation(format!(
                "Amount must not be negative, got {} cents",
                amount_cents
            )));
        }
        if amount_cents > MAX_AMOUNT_CENTS {
            return Err(AppError::Validation(format!(
                "Amount exceeds the maximum of {} cents, got {}",
                MAX_AMOUNT_CENTS, amount_cents
            )));
        }

        Ok(Self {
            timestamp: timestamp.into(),
            kind,
            amount_cents,
            category: None,
        })
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        self.category = if category.trim().is_empty() {
            None
        } else {
            Some(category)
        };
        self
    }

    pub fn category_or_default(&self) -> &str {
        self.category.as_deref().unwrap_or(UNCATEGORIZED)
    }
}
