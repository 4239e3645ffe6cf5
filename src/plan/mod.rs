//! Assumption document: the single input of every projection run

mod data;
mod items;
mod personnel;
pub mod loader;

pub use data::{
    DirectClient, General, NewClientChannel, RecoverableClient, ServiceType, Valuation,
    ValuationMethod, ValuePeriod,
};
pub use items::{FixedCost, Investment, ItemAmount, LineItem, VariableCost};
pub use personnel::{BonusRule, Compensation, Personnel};
pub use loader::{load_plan, load_plan_from_reader, load_plan_from_str};

use crate::error::{PlanError, PlanResult};
use serde::{Deserialize, Serialize};

/// Longest horizon a plan may project
pub const MAX_HORIZON_YEARS: u32 = 50;

/// Largest project month (or month count) a document field may hold
pub const MAX_PROJECT_MONTH: u32 = MAX_HORIZON_YEARS * 12;

/// Convert a percent-unit document value to a fraction
pub(crate) fn pct(value: f64) -> f64 {
    value / 100.0
}

/// Container for all plan assumptions
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessPlan {
    pub general: General,
    pub recoverable_clients: Vec<RecoverableClient>,
    pub new_client_channels: Vec<NewClientChannel>,
    pub direct_clients: Vec<DirectClient>,
    pub personnel: Vec<Personnel>,
    pub fixed_costs: Vec<FixedCost>,
    pub variable_costs: Vec<VariableCost>,
    pub investments: Vec<Investment>,
}

impl BusinessPlan {
    /// Reject documents the engine cannot project
    pub fn validate(&self) -> PlanResult<()> {
        let g = &self.general;

        if !(1..=12).contains(&g.start_month) {
            return Err(PlanError::invalid(
                "general.startMonth",
                format!("must be between 1 and 12, got {}", g.start_month),
            ));
        }
        if g.time_horizon_years > MAX_HORIZON_YEARS {
            return Err(PlanError::invalid(
                "general.timeHorizonYears",
                format!("must not exceed {MAX_HORIZON_YEARS}"),
            ));
        }

        let scalars = [
            ("general.inflationRate", g.inflation_rate),
            ("general.corporateTaxRate", g.corporate_tax_rate),
            ("general.regionalTaxRate", g.regional_tax_rate),
            ("general.initialEquity", g.initial_equity),
            ("general.loanAmount", g.loan_amount),
            ("general.loanRate", g.loan_rate),
            ("general.daysToCollect", g.days_to_collect),
            ("general.daysToPay", g.days_to_pay),
            ("general.minimumCashBuffer", g.minimum_cash_buffer),
            ("general.revenueGrowthRate", g.revenue_growth_rate),
            ("general.churnRate", g.churn_rate),
            ("general.dividendPayout", g.dividend_payout),
            ("general.valuation.exitMultiple", g.valuation.exit_multiple),
            ("general.valuation.perpetualGrowthRate", g.valuation.perpetual_growth_rate),
            ("general.valuation.discountRate", g.valuation.discount_rate),
        ];
        for (field, value) in scalars {
            if !value.is_finite() {
                return Err(PlanError::invalid(field, "must be a finite number"));
            }
        }

        for (i, client) in self.recoverable_clients.iter().enumerate() {
            let amounts = [
                client.prior_revenue,
                client.recovery_probability,
                client.recovery_amount_percentage,
                client.renewal_probability,
                client.annual_increase,
            ];
            if amounts.iter().any(|v| !v.is_finite()) {
                return Err(PlanError::invalid(
                    format!("recoverableClients[{i}]"),
                    "contains a non-finite number",
                ));
            }
            if !(0.0..=100.0).contains(&client.renewal_probability) {
                return Err(PlanError::invalid(
                    format!("recoverableClients[{i}].renewalProbability"),
                    "must be between 0 and 100",
                ));
            }
        }

        for (i, channel) in self.new_client_channels.iter().enumerate() {
            let amounts = [
                channel.monthly_spend,
                channel.leads_per_100,
                channel.conversion_rate,
                channel.average_contract_value,
            ];
            if amounts.iter().any(|v| !v.is_finite()) {
                return Err(PlanError::invalid(
                    format!("newClientChannels[{i}]"),
                    "contains a non-finite number",
                ));
            }
        }

        self.validate_months()?;

        let item_totals = self
            .fixed_costs
            .iter()
            .map(|c| ("fixedCosts", c.amount.effective()))
            .chain(self.variable_costs.iter().map(|c| ("variableCosts", c.amount.effective())))
            .chain(self.investments.iter().map(|c| ("investments", c.amount.effective())));
        for (field, total) in item_totals {
            if !total.is_finite() {
                return Err(PlanError::invalid(field, "contains a non-finite amount"));
            }
        }

        Ok(())
    }

    /// Month indices and durations stay within the longest horizon
    fn validate_months(&self) -> PlanResult<()> {
        let mut months = vec![(
            "general.loanDurationMonths".to_string(),
            Some(self.general.loan_duration_months),
        )];
        for (i, c) in self.recoverable_clients.iter().enumerate() {
            let field = |name: &str| format!("recoverableClients[{i}].{name}");
            months.push((field("contractStartMonth"), Some(c.contract_start_month)));
            months.push((field("contractDurationMonths"), Some(c.contract_duration_months)));
            months.push((field("rampUpMonths"), Some(c.ramp_up_months)));
        }
        for (i, c) in self.new_client_channels.iter().enumerate() {
            months.push((format!("newClientChannels[{i}].startMonth"), Some(c.start_month)));
        }
        for (i, c) in self.direct_clients.iter().enumerate() {
            months.push((format!("directClients[{i}].startMonth"), Some(c.start_month)));
        }
        for (i, p) in self.personnel.iter().enumerate() {
            months.push((format!("personnel[{i}].hireMonth"), Some(p.hire_month)));
            months.push((format!("personnel[{i}].endMonth"), p.end_month));
        }
        for (i, c) in self.fixed_costs.iter().enumerate() {
            months.push((format!("fixedCosts[{i}].startMonth"), Some(c.start_month)));
        }
        for (i, c) in self.investments.iter().enumerate() {
            months.push((format!("investments[{i}].month"), Some(c.month)));
        }

        for (field, month) in months {
            if month.is_some_and(|m| m > MAX_PROJECT_MONTH) {
                return Err(PlanError::invalid(
                    field,
                    format!("must not exceed {MAX_PROJECT_MONTH}"),
                ));
            }
        }
        Ok(())
    }

    /// Five-year demo plan for a small digital agency
    pub fn sample() -> Self {
        Self {
            general: General {
                currency: "EUR".to_string(),
                time_horizon_years: 5,
                start_month: 1,
                start_year: 2025,
                inflation_rate: 2.0,
                corporate_tax_rate: 24.0,
                regional_tax_rate: 3.9,
                initial_equity: 50_000.0,
                loan_amount: 60_000.0,
                loan_rate: 5.5,
                loan_duration_months: 60,
                days_to_collect: 60.0,
                days_to_pay: 30.0,
                minimum_cash_buffer: 10_000.0,
                revenue_growth_rate: 10.0,
                churn_rate: 15.0,
                dividend_payout: 30.0,
                dividend_start_year: 3,
                valuation: Valuation {
                    method: ValuationMethod::ExitMultiple,
                    exit_multiple: 5.0,
                    perpetual_growth_rate: 2.0,
                    discount_rate: 12.0,
                },
            },
            recoverable_clients: vec![
                RecoverableClient {
                    name: "Former retainer".to_string(),
                    prior_revenue: 80_000.0,
                    recovery_probability: 70.0,
                    recovery_amount_percentage: 80.0,
                    service_type: ServiceType::Recurring,
                    contract_start_month: 2,
                    contract_duration_months: 12,
                    renewal_probability: 80.0,
                    ramp_up_months: 3,
                    collection_days: Some(90.0),
                    annual_increase: 3.0,
                },
                RecoverableClient {
                    name: "Website rebuild".to_string(),
                    prior_revenue: 25_000.0,
                    recovery_probability: 50.0,
                    recovery_amount_percentage: 100.0,
                    service_type: ServiceType::OneOff,
                    contract_start_month: 6,
                    contract_duration_months: 1,
                    renewal_probability: 0.0,
                    ramp_up_months: 0,
                    collection_days: None,
                    annual_increase: 0.0,
                },
            ],
            new_client_channels: vec![NewClientChannel {
                name: "Paid search".to_string(),
                monthly_spend: 1_500.0,
                leads_per_100: 2.0,
                conversion_rate: 10.0,
                average_contract_value: 12_000.0,
                start_month: 4,
            }],
            direct_clients: vec![DirectClient {
                name: "Referrals".to_string(),
                number_of_clients: 3.0,
                start_month: 1,
                service_type: ServiceType::Recurring,
                contract_value: 1_000.0,
                value_period: ValuePeriod::Monthly,
            }],
            personnel: vec![
                Personnel {
                    role: "Founder".to_string(),
                    hire_month: 1,
                    end_month: None,
                    annual_raise: 0.0,
                    bonus: BonusRule::NetProfitPercent(5.0),
                    compensation: Compensation::OwnerCompensation { monthly_cost: 3_000.0 },
                },
                Personnel {
                    role: "Developer".to_string(),
                    hire_month: 3,
                    end_month: None,
                    annual_raise: 2.0,
                    bonus: BonusRule::None,
                    compensation: Compensation::Employee {
                        gross_salary: None,
                        net_salary: 24_000.0,
                        ral_coefficient: 1.45,
                        company_cost_coefficient: 1.35,
                    },
                },
            ],
            fixed_costs: vec![
                FixedCost {
                    name: "Office".to_string(),
                    start_month: 1,
                    amount: ItemAmount::Composite(vec![
                        LineItem { name: "Rent".to_string(), amount: 900.0 },
                        LineItem { name: "Utilities".to_string(), amount: 150.0 },
                    ]),
                },
                FixedCost {
                    name: "Software".to_string(),
                    start_month: 1,
                    amount: ItemAmount::Flat(300.0),
                },
            ],
            variable_costs: vec![VariableCost {
                name: "Subcontracting".to_string(),
                amount: ItemAmount::Flat(8.0),
            }],
            investments: vec![Investment {
                name: "Equipment".to_string(),
                month: 1,
                amortization_years: 3,
                amount: ItemAmount::Composite(vec![
                    LineItem { name: "Laptops".to_string(), amount: 9_000.0 },
                    LineItem { name: "Furniture".to_string(), amount: 6_000.0 },
                ]),
            }],
        }
    }
}
