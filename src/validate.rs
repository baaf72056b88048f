//! Field validators. Each one either returns the normalized value or a
//! [`ValidationError`]; the caller decides whether that is fatal.
mod dates;
mod ids;
mod maximum;

pub use dates::{validate_dates, DateRange, DateStamp, TimeUnit};
pub use ids::{OrderItemSet, RecordId, RecordIdSet};
pub use maximum::{Maximum, MaximumKind, ORDER_LIMIT_MAX};

use crate::catalog::Catalog;
use crate::error::ValidationError;
use std::fmt;
use std::str::FromStr;

pub fn validate_int<S: AsRef<str>>(values: &[S], max: Option<u64>) -> Result<Vec<u64>, ValidationError> {
    values
        .iter()
        .map(|v| {
            let v = v.as_ref().trim();
            if v.is_empty() || !v.chars().all(|c| c.is_ascii_digit()) {
                return Err(ValidationError::NotAnInteger(v.to_string()));
            }
            let n: u64 = v
                .parse()
                .map_err(|_| ValidationError::NotAnInteger(v.to_string()))?;
            if n == 0 {
                return Err(ValidationError::NotAnInteger(v.to_string()));
            }
            match max {
                Some(max) if n > max => Err(ValidationError::OutOfRange { value: n, max }),
                _ => Ok(n),
            }
        })
        .collect()
}

pub fn validate_single_int(value: &str, max: Option<u64>) -> Result<u64, ValidationError> {
    Ok(validate_int(&[value], max)?[0])
}

/// Returns the canonical collection id for an id or alias, ignoring case.
pub fn validate_collection(catalog: &Catalog, id: &str) -> Result<String, ValidationError> {
    catalog
        .resolve(id)
        .map(|c| c.id.clone())
        .ok_or_else(|| ValidationError::UnknownCollection(id.trim().to_string()))
}

pub fn validate_overlap(value: &str) -> Result<u8, ValidationError> {
    let pct = validate_single_int(value.trim().trim_end_matches('%'), Some(100))?;
    Ok(pct as u8)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const CHOICES: [&'static str; 4] = ["low", "medium", "high", "urgent"];
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(ValidationError::InvalidPriority(s.trim().to_string())),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Urgent => "Urgent",
        };
        f.write_str(s)
    }
}
