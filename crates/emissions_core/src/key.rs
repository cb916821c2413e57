use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("invalid date {value:?}: expected YYYY-MM-DD")]
    InvalidDate { value: String },
    #[error("range start {start} is after end {end}")]
    StartAfterEnd { start: NaiveDate, end: NaiveDate },
}

/// Identifies one unit of backend work: a single day or an inclusive
/// date range. Keys are validated on construction, before any network
/// call is made on their behalf.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobKey {
    Day(NaiveDate),
    Range { start: NaiveDate, end: NaiveDate },
}

impl JobKey {
    pub fn day(value: &str) -> Result<Self, KeyError> {
        Ok(JobKey::Day(parse_date(value)?))
    }

    pub fn range(start: &str, end: &str) -> Result<Self, KeyError> {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        if start > end {
            return Err(KeyError::StartAfterEnd { start, end });
        }
        Ok(JobKey::Range { start, end })
    }

    pub fn is_range(&self) -> bool {
        matches!(self, JobKey::Range { .. })
    }

    /// Number of days covered by the key (inclusive on both ends).
    pub fn total_days(&self) -> u32 {
        match self {
            JobKey::Day(_) => 1,
            JobKey::Range { start, end } => {
                (end.signed_duration_since(*start).num_days() + 1) as u32
            }
        }
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKey::Day(date) => write!(f, "{}", date.format(DATE_FORMAT)),
            JobKey::Range { start, end } => write!(
                f,
                "{}..{}",
                start.format(DATE_FORMAT),
                end.format(DATE_FORMAT)
            ),
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, KeyError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| KeyError::InvalidDate {
        value: value.to_string(),
    })
}
