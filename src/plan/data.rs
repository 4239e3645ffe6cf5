//! General settings and revenue cohorts of the assumption document

use serde::{Deserialize, Serialize};

/// Billing pattern of a client contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ServiceType {
    /// Billed continuously over the contract duration
    Recurring,
    /// Billed once, recognized in the year the contract starts
    OneOff,
}

/// Period the contract value of a direct client refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValuePeriod {
    #[default]
    Annual,
    Monthly,
}

/// How the business is valued at the end of the horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValuationMethod {
    /// Final-year EBITDA times an exit multiple
    #[default]
    ExitMultiple,
    /// Gordon growth on the final-year free cash flow
    PerpetualGrowth,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Valuation {
    pub method: ValuationMethod,
    pub exit_multiple: f64,
    /// Percent
    pub perpetual_growth_rate: f64,
    /// Percent
    pub discount_rate: f64,
}

impl Default for Valuation {
    fn default() -> Self {
        Self {
            method: ValuationMethod::ExitMultiple,
            exit_multiple: 5.0,
            perpetual_growth_rate: 2.0,
            discount_rate: 12.0,
        }
    }
}

/// Company-wide settings. Rates are in percent units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct General {
    /// Display label only, no conversion is ever applied
    pub currency: String,
    pub time_horizon_years: u32,
    /// Calendar month (1-12) of project month 1
    pub start_month: u32,
    pub start_year: i32,
    pub inflation_rate: f64,
    pub corporate_tax_rate: f64,
    pub regional_tax_rate: f64,
    pub initial_equity: f64,
    pub loan_amount: f64,
    pub loan_rate: f64,
    pub loan_duration_months: u32,
    pub days_to_collect: f64,
    pub days_to_pay: f64,
    pub minimum_cash_buffer: f64,
    pub revenue_growth_rate: f64,
    pub churn_rate: f64,
    pub dividend_payout: f64,
    pub dividend_start_year: u32,
    pub valuation: Valuation,
}

impl Default for General {
    fn default() -> Self {
        Self {
            currency: "EUR".to_string(),
            time_horizon_years: 5,
            start_month: 1,
            start_year: 2025,
            inflation_rate: 0.0,
            corporate_tax_rate: 0.0,
            regional_tax_rate: 0.0,
            initial_equity: 0.0,
            loan_amount: 0.0,
            loan_rate: 0.0,
            loan_duration_months: 0,
            days_to_collect: 60.0,
            days_to_pay: 60.0,
            minimum_cash_buffer: 0.0,
            revenue_growth_rate: 0.0,
            churn_rate: 0.0,
            dividend_payout: 0.0,
            dividend_start_year: 1,
            valuation: Valuation::default(),
        }
    }
}

impl General {
    pub fn tax_rate(&self) -> f64 {
        super::pct(self.corporate_tax_rate + self.regional_tax_rate)
    }
}

/// A former client the company expects to win back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoverableClient {
    #[serde(default)]
    pub name: String,
    pub prior_revenue: f64,
    pub recovery_probability: f64,
    pub recovery_amount_percentage: f64,
    pub service_type: ServiceType,
    pub contract_start_month: u32,
    #[serde(default = "default_contract_duration")]
    pub contract_duration_months: u32,
    #[serde(default)]
    pub renewal_probability: f64,
    #[serde(default)]
    pub ramp_up_months: u32,
    /// Overrides `General::days_to_collect` for this client
    #[serde(default)]
    pub collection_days: Option<f64>,
    #[serde(default)]
    pub annual_increase: f64,
}

fn default_contract_duration() -> u32 {
    12
}

impl RecoverableClient {
    /// Expected annual amount of the first contract instance
    pub fn recovered_amount(&self) -> f64 {
        self.prior_revenue
            * super::pct(self.recovery_probability)
            * super::pct(self.recovery_amount_percentage)
    }
}

/// A paid acquisition channel feeding new clients through a marketing funnel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClientChannel {
    #[serde(default)]
    pub name: String,
    pub monthly_spend: f64,
    pub leads_per_100: f64,
    pub conversion_rate: f64,
    pub average_contract_value: f64,
    #[serde(default = "default_start_month")]
    pub start_month: u32,
}

fn default_start_month() -> u32 {
    1
}

impl NewClientChannel {
    /// New contracts signed per month at the given monthly spend
    pub fn monthly_contracts(&self, spend: f64) -> f64 {
        spend / 100.0 * self.leads_per_100 * super::pct(self.conversion_rate)
    }
}

/// Clients signed without a funnel (referrals, existing network)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectClient {
    #[serde(default)]
    pub name: String,
    pub number_of_clients: f64,
    #[serde(default = "default_start_month")]
    pub start_month: u32,
    pub service_type: ServiceType,
    pub contract_value: f64,
    #[serde(default)]
    pub value_period: ValuePeriod,
}

impl DirectClient {
    pub fn annual_value(&self) -> f64 {
        match self.value_period {
            ValuePeriod::Annual => self.contract_value,
            ValuePeriod::Monthly => self.contract_value * 12.0,
        }
    }
}
