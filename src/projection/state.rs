//! State carried from one fiscal year to the next

use crate::plan::General;

/// Balances threaded through the yearly fold. Each year's step receives the
/// previous year's carry and returns the carry for the following year.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct YearCarry {
    /// Outstanding loan principal at the start of the year
    pub loan_balance: f64,

    /// Revenue from clients acquired through channels in prior years
    pub channel_revenue_base: f64,

    /// Trade receivables at the end of the prior year
    pub receivables: f64,

    /// Trade payables at the end of the prior year
    pub payables: f64,

    /// Cash at the end of the prior year
    pub cash: f64,
}

impl YearCarry {
    /// Balances before the first fiscal year: the loan is fully outstanding
    /// and nothing else has happened yet
    pub fn opening(general: &General) -> Self {
        Self {
            loan_balance: general.loan_amount,
            ..Default::default()
        }
    }
}
