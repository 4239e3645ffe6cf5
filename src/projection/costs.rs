//! Cost aggregation: personnel, fixed, variable and marketing

use crate::plan::{pct, BonusRule, BusinessPlan, Personnel};
use super::calendar::{FiscalYear, ProjectCalendar};
use super::revenue::channel_spend;

/// Operating costs of one fiscal year. All values are non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct YearCosts {
    pub personnel: f64,
    pub fixed: f64,
    pub variable: f64,
    pub marketing: f64,
}

impl YearCosts {
    pub fn total(&self) -> f64 {
        self.personnel + self.fixed + self.variable + self.marketing
    }

    /// Costs settled with suppliers, the base of trade payables
    pub fn supplier_costs(&self) -> f64 {
        self.fixed + self.variable + self.marketing
    }
}

/// Profit-sharing rates active in a year, already prorated by each
/// employee's share of the year
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BonusShares {
    pub ebitda: f64,
    pub net_profit: f64,
}

pub struct CostAggregation<'a> {
    plan: &'a BusinessPlan,
    calendar: &'a ProjectCalendar,
}

impl<'a> CostAggregation<'a> {
    pub fn new(plan: &'a BusinessPlan, calendar: &'a ProjectCalendar) -> Self {
        Self { plan, calendar }
    }

    pub fn project_year(&self, year: &FiscalYear, total_revenue: f64) -> YearCosts {
        let general = &self.plan.general;
        let inflation = year.compound(pct(general.inflation_rate));

        let personnel: f64 = self
            .plan
            .personnel
            .iter()
            .map(|person| self.person_cost(person, year))
            .sum();

        let fixed: f64 = self
            .plan
            .fixed_costs
            .iter()
            .map(|cost| cost.amount.effective() * year.active_months(cost.start_month, None) as f64)
            .sum();

        let growth = pct(general.revenue_growth_rate);
        let marketing: f64 = self
            .plan
            .new_client_channels
            .iter()
            .map(|channel| {
                channel_spend(channel, year, growth)
                    * year.active_months(channel.start_month, None) as f64
            })
            .sum();

        let variable_rate: f64 = self
            .plan
            .variable_costs
            .iter()
            .map(|cost| pct(cost.amount.effective()))
            .sum();

        YearCosts {
            personnel: personnel * inflation,
            fixed: fixed * inflation,
            variable: total_revenue * variable_rate,
            marketing: marketing * inflation,
        }
    }

    /// Cost of one person in a year, before inflation
    fn person_cost(&self, person: &Personnel, year: &FiscalYear) -> f64 {
        let active = year.active_months(person.hire_month, person.end_month);
        if active == 0 {
            return 0.0;
        }

        let raise = self
            .calendar
            .year_of(person.hire_month)
            .filter(|&hire_year| year.index > hire_year)
            .map_or(1.0, |hire_year| {
                (1.0 + pct(person.annual_raise)).powi((year.index - hire_year) as i32)
            });

        person.annual_base_cost() * raise * active as f64 / 12.0
    }

    pub fn bonus_shares(&self, year: &FiscalYear) -> BonusShares {
        let mut shares = BonusShares::default();
        for person in &self.plan.personnel {
            let active = year.active_months(person.hire_month, person.end_month);
            if active == 0 {
                continue;
            }
            let share = active as f64 / year.months() as f64;
            match person.bonus {
                BonusRule::EbitdaPercent(rate) => shares.ebitda += pct(rate) * share,
                BonusRule::NetProfitPercent(rate) => shares.net_profit += pct(rate) * share,
                BonusRule::None | BonusRule::FixedAmount(_) => {}
            }
        }
        shares
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{
        Compensation, FixedCost, General, ItemAmount, LineItem, NewClientChannel, VariableCost,
    };
    use approx::assert_relative_eq;

    fn base_plan(years: u32) -> BusinessPlan {
        BusinessPlan {
            general: General {
                time_horizon_years: years,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn employee(hire_month: u32, end_month: Option<u32>) -> Personnel {
        Personnel {
            role: "Engineer".to_string(),
            hire_month,
            end_month,
            annual_raise: 0.0,
            bonus: BonusRule::None,
            compensation: Compensation::Employee {
                gross_salary: Some(24_000.0),
                net_salary: 0.0,
                ral_coefficient: 1.0,
                company_cost_coefficient: 1.5,
            },
        }
    }

    fn costs(plan: &BusinessPlan, revenue: f64) -> Vec<YearCosts> {
        let calendar = ProjectCalendar::new(&plan.general);
        let aggregation = CostAggregation::new(plan, &calendar);
        calendar
            .fiscal_years()
            .iter()
            .map(|year| aggregation.project_year(year, revenue))
            .collect()
    }

    #[test]
    fn test_employee_prorated_and_inflated() {
        let mut plan = base_plan(2);
        plan.general.inflation_rate = 10.0;
        plan.personnel.push(employee(7, None));

        let years = costs(&plan, 0.0);
        assert_relative_eq!(years[0].personnel, 36_000.0 * 6.0 / 12.0, max_relative = 1e-12);
        assert_relative_eq!(years[1].personnel, 36_000.0 * 1.1, max_relative = 1e-12);
    }

    #[test]
    fn test_departed_employee_costs_nothing() {
        let mut plan = base_plan(2);
        plan.personnel.push(employee(1, Some(12)));

        let years = costs(&plan, 0.0);
        assert_relative_eq!(years[0].personnel, 36_000.0, max_relative = 1e-12);
        assert_eq!(years[1].personnel, 0.0);
    }

    #[test]
    fn test_raise_applies_after_hiring_year() {
        let mut plan = base_plan(3);
        let mut person = employee(1, None);
        person.annual_raise = 5.0;
        plan.personnel.push(person);

        let years = costs(&plan, 0.0);
        assert_relative_eq!(years[0].personnel, 36_000.0, max_relative = 1e-12);
        assert_relative_eq!(years[2].personnel, 36_000.0 * 1.05 * 1.05, max_relative = 1e-12);
    }

    #[test]
    fn test_fixed_cost_uses_children_sum() {
        let mut plan = base_plan(1);
        plan.fixed_costs.push(FixedCost {
            name: "Office".to_string(),
            start_month: 4,
            amount: ItemAmount::Composite(vec![
                LineItem { name: "Rent".to_string(), amount: 700.0 },
                LineItem { name: "Cleaning".to_string(), amount: 100.0 },
            ]),
        });

        let years = costs(&plan, 0.0);
        assert_relative_eq!(years[0].fixed, 800.0 * 9.0, max_relative = 1e-12);
    }

    #[test]
    fn test_marketing_and_variable_are_independent() {
        let mut plan = base_plan(2);
        plan.general.revenue_growth_rate = 20.0;
        plan.new_client_channels.push(NewClientChannel {
            name: "Social".to_string(),
            monthly_spend: 500.0,
            leads_per_100: 1.0,
            conversion_rate: 10.0,
            average_contract_value: 1_000.0,
            start_month: 1,
        });
        plan.variable_costs.push(VariableCost {
            name: "Payment fees".to_string(),
            amount: ItemAmount::Flat(3.0),
        });

        let years = costs(&plan, 100_000.0);
        assert_relative_eq!(years[0].marketing, 6_000.0, max_relative = 1e-12);
        assert_relative_eq!(years[1].marketing, 7_200.0, max_relative = 1e-12);
        assert_relative_eq!(years[0].variable, 3_000.0, max_relative = 1e-12);
        assert_relative_eq!(years[0].supplier_costs(), 9_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_bonus_shares_prorated() {
        let mut plan = base_plan(1);
        let mut person = employee(7, None);
        person.bonus = BonusRule::EbitdaPercent(10.0);
        plan.personnel.push(person);

        let calendar = ProjectCalendar::new(&plan.general);
        let aggregation = CostAggregation::new(&plan, &calendar);
        let shares = aggregation.bonus_shares(&calendar.fiscal_years()[0]);
        assert_relative_eq!(shares.ebitda, 0.05, max_relative = 1e-12);
        assert_eq!(shares.net_profit, 0.0);
    }
}
