use crate::error::ValidationError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

// <n> <unit>, e.g. "24 hours"
static RELATIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\d+)\s+(minute|hour|day|week|month|year)s?$").expect("valid regex")
});

// YYYYMMDD[THHMMSS]
static STAMP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{8})(?:T(\d{6}))?$").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "minute" => Some(Self::Minute),
            "hour" => Some(Self::Hour),
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "year" => Some(Self::Year),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateStamp {
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
}

impl DateStamp {
    fn parse(s: &str) -> Option<Self> {
        let caps = STAMP_RE.captures(s)?;
        let date = NaiveDate::parse_from_str(&caps[1], "%Y%m%d").ok()?;
        let time = match caps.get(2) {
            Some(t) => Some(NaiveTime::parse_from_str(t.as_str(), "%H%M%S").ok()?),
            None => None,
        };
        Some(Self { date, time })
    }

    fn earliest(&self) -> NaiveDateTime {
        self.date.and_time(self.time.unwrap_or_default())
    }

    fn latest(&self) -> NaiveDateTime {
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default();
        self.date.and_time(self.time.unwrap_or(end_of_day))
    }
}

impl fmt::Display for DateStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date.format("%Y%m%d"))?;
        if let Some(t) = self.time {
            write!(f, "T{}", t.format("%H%M%S"))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateRange {
    Relative { amount: u32, unit: TimeUnit },
    Range { start: DateStamp, end: Option<DateStamp> },
}

impl DateRange {
    /// The pieces the command line joins with '-'.
    pub fn parts(&self) -> Vec<String> {
        match self {
            Self::Relative { .. } => vec![self.to_string()],
            Self::Range { start, end } => {
                let mut parts = vec![start.to_string()];
                if let Some(end) = end {
                    parts.push(end.to_string());
                }
                parts
            }
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relative { amount, unit } => {
                let plural = if *amount == 1 { "" } else { "s" };
                write!(f, "{} {}{}", amount, unit.as_str(), plural)
            }
            Self::Range { .. } => write!(f, "{}", self.parts().join("-")),
        }
    }
}

/// Empty input means no date constraint and yields `Ok(None)`.
pub fn validate_dates(text: &str) -> Result<Option<DateRange>, ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let invalid = || ValidationError::InvalidDates(text.to_string());

    if let Some(caps) = RELATIVE_RE.captures(text) {
        let amount: u32 = caps[1].parse().map_err(|_| invalid())?;
        let unit = TimeUnit::parse(&caps[2]).ok_or_else(invalid)?;
        if amount == 0 {
            return Err(invalid());
        }
        return Ok(Some(DateRange::Relative { amount, unit }));
    }

    let mut sides = text.splitn(2, '-');
    let start = sides.next().and_then(DateStamp::parse).ok_or_else(invalid)?;
    let end = match sides.next() {
        Some(s) => Some(DateStamp::parse(s).ok_or_else(invalid)?),
        None => None,
    };
    if let Some(end) = end {
        if start.earliest() > end.latest() {
            return Err(invalid());
        }
    }
    Ok(Some(DateRange::Range { start, end }))
}
