//! Storage cost attribution for flagged tables

/// Storage rate in currency units per GB-month
const MONTHLY_RATE_PER_GB: f64 = 0.02;

/// Projected cost of keeping a table around
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostEstimate {
    /// Stored size in GB, rounded to the nearest whole number
    pub size_gb: f64,

    /// Monthly storage cost after discount, rounded
    pub monthly_cost: f64,

    /// Twelve months of the rounded monthly cost
    pub annual_cost: f64,
}

/// Estimate the storage cost of `size_bytes`.
///
/// `discount` is a fraction in [0, 1), default 0. Out-of-range values are
/// not rejected; the formula runs with whatever it is given.
pub fn estimate_cost(size_bytes: i64, discount: f64) -> CostEstimate {
    let size_gb = (size_bytes as f64 / 1e9).round();
    let monthly_cost = (size_gb * (1.0 - discount) * MONTHLY_RATE_PER_GB).round();

    CostEstimate {
        size_gb,
        monthly_cost,
        annual_cost: monthly_cost * 12.0,
    }
}
