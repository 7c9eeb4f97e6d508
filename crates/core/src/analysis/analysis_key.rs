use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{Result, ValidationError};
use crate::history::Window;

/// Point or period an analysis is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisKey {
    /// The whole feed.
    Full,
    /// Everything up to and including a date.
    AsOf { date: NaiveDate },
    /// Activity within `[start, end]`, both inclusive.
    Range { start: NaiveDate, end: NaiveDate },
}

impl AnalysisKey {
    pub fn as_of(date: NaiveDate) -> Self {
        AnalysisKey::AsOf { date }
    }

    pub fn range(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let key = AnalysisKey::Range { start, end };
        key.validate()?;
        Ok(key)
    }

    pub fn validate(&self) -> Result<()> {
        if let AnalysisKey::Range { start, end } = *self {
            if start > end {
                return Err(ValidationError::InvalidInput(format!(
                    "Range start {} is after end {}",
                    start, end
                ))
                .into());
            }
        }
        Ok(())
    }

    pub fn window(&self) -> Window {
        match *self {
            AnalysisKey::Full => Window::Full,
            AnalysisKey::AsOf { date } => Window::Until(date),
            AnalysisKey::Range { start, end } => Window::Between { start, end },
        }
    }

    /// Valuation date of the base values. `None` when the window opens at
    /// genesis, where the base is the untouched initial state.
    pub fn open_date(&self) -> Option<NaiveDate> {
        match *self {
            AnalysisKey::Range { start, .. } => start.pred_opt(),
            _ => None,
        }
    }

    /// Valuation date of the current values. For the full feed this is the
    /// date of the last applied transaction.
    pub fn close_date(&self, last_transaction: Option<NaiveDate>) -> Option<NaiveDate> {
        match *self {
            AnalysisKey::Full => last_transaction,
            AnalysisKey::AsOf { date } => Some(date),
            AnalysisKey::Range { end, .. } => Some(end),
        }
    }
}

impl fmt::Display for AnalysisKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisKey::Full => write!(f, "full"),
            AnalysisKey::AsOf { date } => write!(f, "as-of {}", date),
            AnalysisKey::Range { start, end } => write!(f, "{}..={}", start, end),
        }
    }
}
