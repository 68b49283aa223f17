//! Staleness severity buckets
//!
//! IMPORTANT: the bucket strings are part of the report tables consumed by
//! downstream dashboards. Do not rename them.

use serde::{Deserialize, Serialize};

/// Staleness bucket for a table
///
/// Tables that fall into no bucket are in active use and are excluded from
/// the report entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableSeverity {
    /// Only ever referenced on its creation day, and at least 30 days old
    #[serde(rename = "never used")]
    NeverUsed,

    /// Absent from the logs entirely (log retention is six months)
    #[serde(rename = "6 months unused")]
    SixMonthsUnused,

    /// Last referenced between three and six months ago
    #[serde(rename = "3 months unused")]
    ThreeMonthsUnused,
}

impl TableSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NeverUsed => "never used",
            Self::SixMonthsUnused => "6 months unused",
            Self::ThreeMonthsUnused => "3 months unused",
        }
    }
}

impl std::fmt::Display for TableSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Staleness bucket for a column
///
/// Columns used within the last three months are excluded from the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnSeverity {
    /// No usage record at all within log retention
    #[serde(rename = "more than 6")]
    MoreThanSixMonths,

    /// Last used between three and six months ago
    #[serde(rename = "bet.3 and 6 m")]
    BetweenThreeAndSixMonths,
}

impl ColumnSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MoreThanSixMonths => "more than 6",
            Self::BetweenThreeAndSixMonths => "bet.3 and 6 m",
        }
    }
}

impl std::fmt::Display for ColumnSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
