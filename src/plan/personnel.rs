//! Staff and owner compensation

use serde::{Deserialize, Serialize};

/// Compensation terms, tagged by contract kind in the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "contractKind", rename_all = "camelCase")]
pub enum Compensation {
    #[serde(rename_all = "camelCase")]
    Employee {
        /// Annual gross salary; derived from the net salary when absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gross_salary: Option<f64>,
        #[serde(default)]
        net_salary: f64,
        /// Net-to-gross multiplier
        #[serde(default = "default_coefficient")]
        ral_coefficient: f64,
        /// Gross-to-company-cost multiplier (social charges, severance accrual)
        #[serde(default = "default_coefficient")]
        company_cost_coefficient: f64,
    },
    #[serde(rename_all = "camelCase")]
    Freelance { monthly_cost: f64 },
    #[serde(rename_all = "camelCase")]
    OwnerCompensation { monthly_cost: f64 },
}

fn default_coefficient() -> f64 {
    1.0
}

/// Variable pay on top of the base compensation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum BonusRule {
    #[default]
    None,
    /// Percent of positive pre-bonus EBITDA
    EbitdaPercent(f64),
    /// Percent of positive pre-bonus net profit
    NetProfitPercent(f64),
    /// Flat annual amount, part of the company cost
    FixedAmount(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Personnel {
    #[serde(default)]
    pub role: String,
    #[serde(default = "default_hire_month")]
    pub hire_month: u32,
    #[serde(default)]
    pub end_month: Option<u32>,
    /// Percent, compounded on every fiscal year after the hiring year
    #[serde(default)]
    pub annual_raise: f64,
    #[serde(default)]
    pub bonus: BonusRule,
    #[serde(flatten)]
    pub compensation: Compensation,
}

fn default_hire_month() -> u32 {
    1
}

impl Personnel {
    /// Annual cost to the company for a full year of activity, before
    /// raises, inflation and performance bonuses
    pub fn annual_base_cost(&self) -> f64 {
        match &self.compensation {
            Compensation::Employee {
                gross_salary,
                net_salary,
                ral_coefficient,
                company_cost_coefficient,
            } => {
                let gross = gross_salary.unwrap_or(net_salary * ral_coefficient);
                let fixed_bonus = match self.bonus {
                    BonusRule::FixedAmount(amount) => amount,
                    _ => 0.0,
                };
                gross * company_cost_coefficient + fixed_bonus
            }
            Compensation::Freelance { monthly_cost }
            | Compensation::OwnerCompensation { monthly_cost } => monthly_cost * 12.0,
        }
    }

    pub fn is_employee(&self) -> bool {
        matches!(self.compensation, Compensation::Employee { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_employee_gross_from_net() {
        let person: Personnel = serde_json::from_value(json!({
            "role": "Developer",
            "contractKind": "employee",
            "hireMonth": 1,
            "netSalary": 20000.0,
            "ralCoefficient": 1.4,
            "companyCostCoefficient": 1.3
        }))
        .unwrap();

        assert!(person.is_employee());
        assert!((person.annual_base_cost() - 20000.0 * 1.4 * 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_explicit_gross_and_fixed_bonus() {
        let person: Personnel = serde_json::from_value(json!({
            "role": "Sales",
            "contractKind": "employee",
            "grossSalary": 30000.0,
            "netSalary": 1.0,
            "ralCoefficient": 99.0,
            "companyCostCoefficient": 1.5,
            "bonus": {"type": "fixedAmount", "value": 2000.0}
        }))
        .unwrap();

        assert_eq!(person.annual_base_cost(), 30000.0 * 1.5 + 2000.0);
    }

    #[test]
    fn test_freelance_monthly_cost() {
        let person: Personnel = serde_json::from_value(json!({
            "role": "Designer",
            "contractKind": "freelance",
            "monthlyCost": 1500.0,
            "hireMonth": 4,
            "endMonth": 9
        }))
        .unwrap();

        assert!(!person.is_employee());
        assert_eq!(person.annual_base_cost(), 18000.0);
        assert_eq!(person.end_month, Some(9));
        assert_eq!(person.bonus, BonusRule::None);
    }
}
