use std::env;

use crate::date_utils::TimeReference;
use crate::error::{AppError, AppResult};

pub const DEFAULT_CURRENCY: &str = "PEN";
pub const DEFAULT_LOCALE: &str = "es-PE";
pub const DEFAULT_HISTORY_MONTHS: u32 = 6;
/// Upper bound for `FINBOARD_HISTORY_MONTHS` (one hundred years).
pub const MAX_HISTORY_MONTHS: u32 = 1200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub time_reference: TimeReference,
    pub currency: String,
    pub locale: String,
    /// Calendar months of movements fed to the history chart.
    pub history_months: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_reference: TimeReference::Utc,
            currency: DEFAULT_CURRENCY.into(),
            locale: DEFAULT_LOCALE.into(),
            history_months: DEFAULT_HISTORY_MONTHS,
        }
    }
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let time_reference = match lookup("FINBOARD_TIME_REFERENCE") {
            Some(value) if !value.trim().is_empty() => value.parse()?,
            _ => defaults.time_reference,
        };

        let history_months = match lookup("FINBOARD_HISTORY_MONTHS") {
            Some(value) => match value.trim().parse::<u32>() {
                Ok(months) if (1..=MAX_HISTORY_MONTHS).contains(&months) => months,
                _ => {
                    return Err(AppError::Config(format!(
                        "FINBOARD_HISTORY_MONTHS must be between 1 and {}, got '{}'",
                        MAX_HISTORY_MONTHS, value
                    )))
                }
            },
            None => defaults.history_months,
        };

        Ok(Self {
            time_reference,
            currency: lookup("FINBOARD_CURRENCY")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.currency),
            locale: lookup("FINBOARD_LOCALE")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.locale),
            history_months,
        })
    }
}
