//! Annual cash-flow statement derived from the income statement

use serde::{Deserialize, Serialize};

use crate::plan::{pct, BusinessPlan};
use super::calendar::FiscalYear;
use super::income::IncomeStatementRow;
use super::state::YearCarry;

const DAYS_PER_YEAR: f64 = 365.0;

/// One year of the cash-flow statement. Outflows are negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowRow {
    pub year: u32,

    // Operating
    /// Net profit plus the non-cash amortization charge
    pub gross_operating_cash_flow: f64,
    /// Receivables at year end minus receivables a year earlier
    pub change_in_receivables: f64,
    /// Payables at year end minus payables a year earlier
    pub change_in_payables: f64,
    pub operating_cash_flow: f64,

    // Investing
    pub investing_cash_flow: f64,

    // Financing
    pub equity_injection: f64,
    pub loan_proceeds: f64,
    pub principal_repayment: f64,
    pub dividends_paid: f64,
    pub financing_cash_flow: f64,

    // Summary
    pub net_cash_flow: f64,
    pub starting_cash: f64,
    pub ending_cash: f64,
}

impl CashFlowRow {
    /// Operating plus investing cash flow
    pub fn free_cash_flow(&self) -> f64 {
        self.operating_cash_flow + self.investing_cash_flow
    }

    /// Free cash flow available to equity holders after debt service
    pub fn free_cash_flow_to_equity(&self) -> f64 {
        self.free_cash_flow() + self.loan_proceeds - self.principal_repayment
    }
}

pub struct CashFlowBuilder<'a> {
    plan: &'a BusinessPlan,
}

impl<'a> CashFlowBuilder<'a> {
    pub fn new(plan: &'a BusinessPlan) -> Self {
        Self { plan }
    }

    /// Convert one income-statement year into cash terms. Working-capital
    /// balances and cash are read from and written back to the carry.
    pub fn build(
        &self,
        year: &FiscalYear,
        income: &IncomeStatementRow,
        mut carry: YearCarry,
    ) -> (CashFlowRow, YearCarry) {
        let general = &self.plan.general;

        let gross_operating_cash_flow = income.net_profit + income.amortization;

        let receivables = income.total_revenue * income.collection_days / DAYS_PER_YEAR;
        let payables = income.supplier_costs() * general.days_to_pay / DAYS_PER_YEAR;
        let change_in_receivables = receivables - carry.receivables;
        let change_in_payables = payables - carry.payables;
        let operating_cash_flow =
            gross_operating_cash_flow + change_in_payables - change_in_receivables;

        let capex: f64 = self
            .plan
            .investments
            .iter()
            .filter(|investment| year.contains(investment.month))
            .map(|investment| investment.amount.effective())
            .sum();
        let investing_cash_flow = -capex;

        let (equity_injection, loan_proceeds) = if year.index == 1 {
            (general.initial_equity, general.loan_amount)
        } else {
            (0.0, 0.0)
        };
        let principal_repayment = income.principal_repaid;
        let pays_dividends =
            year.index >= general.dividend_start_year && income.net_profit > 0.0;
        let dividends_paid = if pays_dividends {
            income.net_profit * pct(general.dividend_payout)
        } else {
            0.0
        };
        let financing_cash_flow =
            equity_injection + loan_proceeds - principal_repayment - dividends_paid;

        let net_cash_flow = operating_cash_flow + investing_cash_flow + financing_cash_flow;
        let starting_cash = carry.cash;
        let ending_cash = starting_cash + net_cash_flow;

        carry.receivables = receivables;
        carry.payables = payables;
        carry.cash = ending_cash;

        let row = CashFlowRow {
            year: year.index,
            gross_operating_cash_flow,
            change_in_receivables,
            change_in_payables,
            operating_cash_flow,
            investing_cash_flow,
            equity_injection,
            loan_proceeds,
            principal_repayment,
            dividends_paid,
            financing_cash_flow,
            net_cash_flow,
            starting_cash,
            ending_cash,
        };

        (row, carry)
    }
}
