//! Annual income statement

use serde::{Deserialize, Serialize};

use crate::plan::{pct, General};
use super::calendar::FiscalYear;
use super::costs::{BonusShares, YearCosts};
use super::engine::ProjectionConfig;
use super::revenue::YearRevenue;

/// One year of the income statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatementRow {
    pub year: u32,

    // Revenue by acquisition mode
    pub revenue_recoverable: f64,
    pub revenue_new_clients: f64,
    pub revenue_direct: f64,
    pub total_revenue: f64,

    // Operating costs
    pub personnel_costs: f64,
    pub fixed_costs: f64,
    pub variable_costs: f64,
    pub marketing_costs: f64,

    pub ebitda: f64,
    pub amortization: f64,
    pub ebit: f64,
    pub interest_expense: f64,
    pub ebt: f64,
    pub taxes: f64,
    pub net_profit: f64,

    /// Loan principal repaid during the year
    pub principal_repaid: f64,

    /// Revenue-weighted days to collect
    pub collection_days: f64,
}

impl IncomeStatementRow {
    pub fn total_costs(&self) -> f64 {
        self.personnel_costs + self.fixed_costs + self.variable_costs + self.marketing_costs
    }

    /// Costs settled with suppliers, the base of trade payables
    pub fn supplier_costs(&self) -> f64 {
        self.fixed_costs + self.variable_costs + self.marketing_costs
    }
}

pub struct IncomeStatementBuilder<'a> {
    general: &'a General,
    config: &'a ProjectionConfig,
    /// Effective amount of every investment, amortized on one blended schedule
    total_capex: f64,
}

impl<'a> IncomeStatementBuilder<'a> {
    pub fn new(general: &'a General, config: &'a ProjectionConfig, total_capex: f64) -> Self {
        Self { general, config, total_capex }
    }

    /// Build one year and return it with the loan balance left after repayment
    pub fn build(
        &self,
        year: &FiscalYear,
        revenue: &YearRevenue,
        mut costs: YearCosts,
        bonus: BonusShares,
        loan_balance: f64,
    ) -> (IncomeStatementRow, f64) {
        let total_revenue = revenue.total();
        let tax_rate = self.general.tax_rate();

        let amortization = self.amortization(year);
        let interest_expense = loan_balance * pct(self.general.loan_rate);

        // Profit-sharing bonuses are settled on pre-bonus results
        let pre_bonus_ebitda = total_revenue - costs.total();
        let ebitda_bonus = bonus.ebitda * pre_bonus_ebitda.max(0.0);
        let pre_bonus_ebt = pre_bonus_ebitda - ebitda_bonus - amortization - interest_expense;
        let pre_bonus_net = pre_bonus_ebt - pre_bonus_ebt.max(0.0) * tax_rate;
        let profit_bonus = bonus.net_profit * pre_bonus_net.max(0.0);
        costs.personnel += ebitda_bonus + profit_bonus;

        let ebitda = total_revenue - costs.total();
        let ebit = ebitda - amortization;
        let ebt = ebit - interest_expense;
        let taxes = ebt.max(0.0) * tax_rate;
        let net_profit = ebt - taxes;

        let principal_repaid = self.principal(year, loan_balance);

        let row = IncomeStatementRow {
            year: year.index,
            revenue_recoverable: revenue.recoverable,
            revenue_new_clients: revenue.new_clients,
            revenue_direct: revenue.direct,
            total_revenue,
            personnel_costs: costs.personnel,
            fixed_costs: costs.fixed,
            variable_costs: costs.variable,
            marketing_costs: costs.marketing,
            ebitda,
            amortization,
            ebit,
            interest_expense,
            ebt,
            taxes,
            net_profit,
            principal_repaid,
            collection_days: revenue.collection_days(self.general.days_to_collect),
        };

        (row, loan_balance - principal_repaid)
    }

    /// Blended straight-line charge; each item's own amortization period is ignored
    fn amortization(&self, year: &FiscalYear) -> f64 {
        let window = self.config.amortization_years;
        if window == 0 || year.index > window {
            0.0
        } else {
            self.total_capex / window as f64
        }
    }

    /// Straight-line repayment over the loan duration, capped at the balance
    fn principal(&self, year: &FiscalYear, loan_balance: f64) -> f64 {
        let duration = self.general.loan_duration_months;
        if duration == 0 || loan_balance <= 0.0 {
            return 0.0;
        }
        let months = year.active_months(1, Some(duration));
        let installment = self.general.loan_amount / duration as f64;
        (installment * months as f64).min(loan_balance)
    }
}
