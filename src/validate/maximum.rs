use super::validate_single_int;
use crate::error::ValidationError;
use std::fmt;

/// EODMS refuses orders with more items than this.
pub const ORDER_LIMIT_MAX: u64 = 100;

/// What the `--maximum` value means depends on the workflow it is used in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaximumKind {
    /// `total:per_order`, a bare number is the total.
    Order,
    /// `total:per_order`, a bare number is the per-order limit.
    OrderCsv,
    /// Maximum number of search results when nothing is ordered.
    Search,
    /// Number of AVAILABLE_FOR_DOWNLOAD items to download.
    Download,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Maximum {
    Order {
        total: Option<u64>,
        per_order: Option<u64>,
    },
    Count(u64),
}

impl Maximum {
    /// Empty input means no limit and yields `Ok(None)`.
    pub fn parse(text: &str, kind: MaximumKind) -> Result<Option<Self>, ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let invalid = |_: ValidationError| ValidationError::InvalidMaximum(text.to_string());

        match kind {
            MaximumKind::Search | MaximumKind::Download => {
                let n = validate_single_int(text, None).map_err(invalid)?;
                Ok(Some(Self::Count(n)))
            }
            MaximumKind::Order | MaximumKind::OrderCsv => {
                let (total, per_order) = match text.split_once(':') {
                    Some((t, p)) => (t.trim(), p.trim()),
                    None if kind == MaximumKind::OrderCsv => ("", text),
                    None => (text, ""),
                };
                if total.is_empty() && per_order.is_empty() {
                    return Err(ValidationError::InvalidMaximum(text.to_string()));
                }
                let total = match total {
                    "" => None,
                    t => Some(validate_single_int(t, None).map_err(invalid)?),
                };
                let per_order = match per_order {
                    "" => None,
                    p => Some(validate_single_int(p, Some(ORDER_LIMIT_MAX))?),
                };
                Ok(Some(Self::Order { total, per_order }))
            }
        }
    }

    pub fn from_parts(total: Option<u64>, per_order: Option<u64>) -> Option<Self> {
        match (total, per_order) {
            (None, None) => None,
            (total, per_order) => Some(Self::Order { total, per_order }),
        }
    }
}

/// The colon is always written for order maximums so the value reads the same in every workflow.
impl fmt::Display for Maximum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{}", n),
            Self::Order { total, per_order } => {
                if let Some(t) = total {
                    write!(f, "{}", t)?;
                }
                f.write_str(":")?;
                if let Some(p) = per_order {
                    write!(f, "{}", p)?;
                }
                Ok(())
            }
        }
    }
}
