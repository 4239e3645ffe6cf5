//! Core projection engine: yearly statements, then KPIs and insights

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::PlanResult;
use crate::plan::BusinessPlan;
use crate::valuation::{
    compute_kpis, generate_insights, monthly_series, Insight, InsightThresholds, KpiBundle,
    MonthlyPoint,
};
use super::calendar::{FiscalYear, ProjectCalendar};
use super::cashflows::{CashFlowBuilder, CashFlowRow};
use super::costs::CostAggregation;
use super::income::{IncomeStatementBuilder, IncomeStatementRow};
use super::irr::IrrConfig;
use super::revenue::RevenueProjection;
use super::state::YearCarry;

/// Configuration for a projection run
#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    /// Straight-line window applied to total capital expenditure
    pub amortization_years: u32,

    /// Renewal chains stop once a contract's potential drops to this amount
    pub negligible_potential: f64,

    /// Hard ceiling on contract instances per renewal chain
    pub max_contract_instances: u32,

    pub irr: IrrConfig,

    pub insights: InsightThresholds,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            amortization_years: 5,
            negligible_potential: 1.0,
            max_contract_instances: 600,
            irr: IrrConfig::default(),
            insights: InsightThresholds::default(),
        }
    }
}

/// Everything a projection run produces
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub income_statement: Vec<IncomeStatementRow>,
    /// Same length and order as the income statement
    pub cash_flow: Vec<CashFlowRow>,
    pub kpis: KpiBundle,
    pub monthly: Vec<MonthlyPoint>,
    pub insights: Vec<Insight>,
}

/// Main projection engine
pub struct ProjectionEngine {
    plan: BusinessPlan,
    config: ProjectionConfig,
}

impl ProjectionEngine {
    pub fn new(plan: BusinessPlan, config: ProjectionConfig) -> Self {
        Self { plan, config }
    }

    pub fn plan(&self) -> &BusinessPlan {
        &self.plan
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Validate the plan and run the full projection
    pub fn run(&self) -> PlanResult<ProjectionResult> {
        self.plan.validate()?;

        let general = &self.plan.general;
        let calendar = ProjectCalendar::new(general);
        let (income_statement, cash_flow) = self.project_statements(&calendar);

        let monthly = monthly_series(&calendar, general, &income_statement, &cash_flow);
        let kpis = compute_kpis(general, &income_statement, &cash_flow, &monthly, &self.config.irr);
        let insights = generate_insights(general, &income_statement, &kpis, &self.config.insights);

        info!(
            "Projected {} years: EV {:?}, IRR {:?}, peak funding {:.2}",
            income_statement.len(),
            kpis.enterprise_value,
            kpis.irr,
            kpis.peak_funding_requirement
        );

        Ok(ProjectionResult {
            income_statement,
            cash_flow,
            kpis,
            monthly,
            insights,
        })
    }

    /// Fold over the fiscal years, threading the carry from one year into
    /// the next
    fn project_statements(
        &self,
        calendar: &ProjectCalendar,
    ) -> (Vec<IncomeStatementRow>, Vec<CashFlowRow>) {
        let years = calendar.fiscal_years();
        let step = YearStep::new(&self.plan, calendar, &self.config);

        let mut income = Vec::with_capacity(years.len());
        let mut cash = Vec::with_capacity(years.len());
        let mut carry = YearCarry::opening(&self.plan.general);

        for year in &years {
            let (income_row, cash_row, next) = step.run(year, carry);
            debug!(
                "Year {} (months {}-{}): revenue {:.2}, EBITDA {:.2}, net {:.2}, cash {:.2}",
                year.index,
                year.first_month,
                year.last_month,
                income_row.total_revenue,
                income_row.ebitda,
                income_row.net_profit,
                cash_row.ending_cash
            );
            income.push(income_row);
            cash.push(cash_row);
            carry = next;
        }

        (income, cash)
    }
}

/// The per-year pipeline: revenue, costs, income statement, cash flow
struct YearStep<'a> {
    revenue: RevenueProjection<'a>,
    costs: CostAggregation<'a>,
    income: IncomeStatementBuilder<'a>,
    cash: CashFlowBuilder<'a>,
}

impl<'a> YearStep<'a> {
    fn new(
        plan: &'a BusinessPlan,
        calendar: &'a ProjectCalendar,
        config: &'a ProjectionConfig,
    ) -> Self {
        let total_capex = plan
            .investments
            .iter()
            .map(|investment| investment.amount.effective())
            .sum();

        Self {
            revenue: RevenueProjection::new(plan, calendar, config),
            costs: CostAggregation::new(plan, calendar),
            income: IncomeStatementBuilder::new(&plan.general, config, total_capex),
            cash: CashFlowBuilder::new(plan),
        }
    }

    fn run(
        &self,
        year: &FiscalYear,
        mut carry: YearCarry,
    ) -> (IncomeStatementRow, CashFlowRow, YearCarry) {
        let (revenue, channel_base) = self.revenue.project_year(year, carry.channel_revenue_base);
        let costs = self.costs.project_year(year, revenue.total());
        let bonus = self.costs.bonus_shares(year);

        let (income_row, loan_balance) =
            self.income.build(year, &revenue, costs, bonus, carry.loan_balance);
        carry.channel_revenue_base = channel_base;
        carry.loan_balance = loan_balance;

        let (cash_row, carry) = self.cash.build(year, &income_row, carry);
        (income_row, cash_row, carry)
    }
}
