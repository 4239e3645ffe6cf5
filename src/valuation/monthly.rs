//! Monthly trajectory derived from the annual statements
//!
//! Each fiscal year's totals are spread evenly over twelve periods. This is a
//! linear approximation, not a re-run of the revenue engine at monthly
//! precision. Points are positional: with a stub first year, point `n` is
//! not project month `n`, so labels name the fiscal year and period instead
//! of a calendar month.

use serde::{Deserialize, Serialize};

use crate::plan::General;
use crate::projection::{CashFlowRow, IncomeStatementRow, ProjectCalendar};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPoint {
    /// 1-indexed position, `timeHorizonYears x 12` points in total
    pub month: u32,
    /// Fiscal year and period, e.g. `FY2026-P03`
    pub label: String,
    pub revenue: f64,
    pub ebitda: f64,
    pub free_cash_flow: f64,
    pub ending_cash: f64,
    pub cumulative_ebitda: f64,
    pub cumulative_free_cash_flow: f64,
}

/// Build the monthly series. Month 1 opens with the equity injection and the
/// loan proceeds; every month then adds its share of free cash flow and of
/// the remaining financing flows (repayments, dividends).
pub fn monthly_series(
    calendar: &ProjectCalendar,
    general: &General,
    income: &[IncomeStatementRow],
    cash_flow: &[CashFlowRow],
) -> Vec<MonthlyPoint> {
    if income.is_empty() || cash_flow.is_empty() {
        return Vec::new();
    }

    let mut points = Vec::with_capacity(income.len() * 12);
    let mut cash = general.initial_equity + general.loan_amount;
    let mut cumulative_ebitda = 0.0;
    let mut cumulative_free_cash_flow = 0.0;

    for (year, (inc, cf)) in income.iter().zip(cash_flow).enumerate() {
        let revenue = inc.total_revenue / 12.0;
        let ebitda = inc.ebitda / 12.0;
        let free_cash_flow = cf.free_cash_flow() / 12.0;
        let financing =
            (cf.financing_cash_flow - cf.equity_injection - cf.loan_proceeds) / 12.0;

        let year_index = year as u32 + 1;
        for period in 1..=12 {
            let month = year as u32 * 12 + period;
            cash += free_cash_flow + financing;
            cumulative_ebitda += ebitda;
            cumulative_free_cash_flow += free_cash_flow;

            points.push(MonthlyPoint {
                month,
                label: calendar.period_label(year_index, period),
                revenue,
                ebitda,
                free_cash_flow,
                ending_cash: cash,
                cumulative_ebitda,
                cumulative_free_cash_flow,
            });
        }
    }

    points
}
