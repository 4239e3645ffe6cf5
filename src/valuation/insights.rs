//! Advisory insights raised from projection outputs

use serde::{Deserialize, Serialize};

use crate::plan::General;
use crate::projection::IncomeStatementRow;
use super::kpi::KpiBundle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub key: String,
    pub severity: Severity,
    pub title: String,
    pub description: String,
}

impl Insight {
    fn new(key: &str, severity: Severity, title: &str, description: String) -> Self {
        Self {
            key: key.to_string(),
            severity,
            title: title.to_string(),
            description,
        }
    }
}

/// Trigger levels for the advisory checks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsightThresholds {
    /// Collection days minus payment days above which the cash cycle is flagged
    pub cash_cycle_gap_days: f64,
    /// Personnel share of revenue (fraction) above which a year is flagged
    pub personnel_cost_ratio: f64,
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self {
            cash_cycle_gap_days: 30.0,
            personnel_cost_ratio: 0.5,
        }
    }
}

pub fn generate_insights(
    general: &General,
    income: &[IncomeStatementRow],
    kpis: &KpiBundle,
    thresholds: &InsightThresholds,
) -> Vec<Insight> {
    if income.is_empty() {
        return Vec::new();
    }

    let mut insights = Vec::new();
    insights.extend(liquidity(general, kpis));
    insights.extend(cash_cycle(general, income, thresholds));
    insights.extend(cost_structure(income, thresholds));
    insights.extend(sustainability(income));
    insights.extend(cash_buffer(general, kpis));
    insights
}

fn liquidity(general: &General, kpis: &KpiBundle) -> Option<Insight> {
    let peak = kpis.peak_funding_requirement;
    if peak <= general.initial_equity {
        return None;
    }

    let funded = general.initial_equity + general.loan_amount;
    let severity = if peak > funded {
        Severity::Critical
    } else {
        Severity::Warning
    };
    Some(Insight::new(
        "liquidity-risk",
        severity,
        "Liquidity risk",
        format!(
            "Peak funding requirement of {:.0} {} exceeds the initial equity of {:.0} {}.",
            peak, general.currency, general.initial_equity, general.currency
        ),
    ))
}

fn cash_cycle(
    general: &General,
    income: &[IncomeStatementRow],
    thresholds: &InsightThresholds,
) -> Option<Insight> {
    let revenue: f64 = income.iter().map(|row| row.total_revenue).sum();
    let collection_days = if revenue > 0.0 {
        income
            .iter()
            .map(|row| row.total_revenue * row.collection_days)
            .sum::<f64>()
            / revenue
    } else {
        general.days_to_collect
    };

    let gap = collection_days - general.days_to_pay;
    (gap > thresholds.cash_cycle_gap_days).then(|| {
        Insight::new(
            "cash-cycle",
            Severity::Warning,
            "Long cash conversion cycle",
            format!(
                "Customers pay after {:.0} days while suppliers are paid after {:.0} days; \
                 the {:.0}-day gap ties up working capital.",
                collection_days, general.days_to_pay, gap
            ),
        )
    })
}

fn cost_structure(
    income: &[IncomeStatementRow],
    thresholds: &InsightThresholds,
) -> Option<Insight> {
    let flagged: Vec<u32> = income
        .iter()
        .filter(|row| {
            row.total_revenue > 0.0
                && row.personnel_costs / row.total_revenue > thresholds.personnel_cost_ratio
        })
        .map(|row| row.year)
        .collect();

    if flagged.is_empty() {
        return None;
    }
    Some(Insight::new(
        "cost-structure",
        Severity::Warning,
        "Heavy personnel costs",
        format!(
            "Personnel costs exceed {:.0}% of revenue in year(s) {}.",
            thresholds.personnel_cost_ratio * 100.0,
            join_years(&flagged)
        ),
    ))
}

fn sustainability(income: &[IncomeStatementRow]) -> Option<Insight> {
    let flagged: Vec<u32> = income
        .windows(2)
        .filter_map(|pair| {
            let (prev, curr) = (&pair[0], &pair[1]);
            if prev.total_costs() <= 0.0 || prev.total_revenue <= 0.0 {
                return None;
            }
            let cost_growth = curr.total_costs() / prev.total_costs() - 1.0;
            let revenue_growth = curr.total_revenue / prev.total_revenue - 1.0;
            (cost_growth > revenue_growth).then_some(curr.year)
        })
        .collect();

    if flagged.is_empty() {
        return None;
    }
    Some(Insight::new(
        "sustainability",
        Severity::Warning,
        "Costs outgrowing revenue",
        format!(
            "Costs grow faster than revenue in year(s) {}.",
            join_years(&flagged)
        ),
    ))
}

fn cash_buffer(general: &General, kpis: &KpiBundle) -> Option<Insight> {
    let lowest = kpis.lowest_cash.as_ref()?;

    if lowest.value < 0.0 {
        Some(Insight::new(
            "cash-shortfall",
            Severity::Critical,
            "Cash shortfall",
            format!(
                "Cash falls to {:.0} {} in month {}.",
                lowest.value, general.currency, lowest.month
            ),
        ))
    } else if lowest.value < general.minimum_cash_buffer {
        Some(Insight::new(
            "cash-buffer",
            Severity::Warning,
            "Cash buffer breached",
            format!(
                "Cash falls to {:.0} {} in month {}, below the minimum buffer of {:.0} {}.",
                lowest.value,
                general.currency,
                lowest.month,
                general.minimum_cash_buffer,
                general.currency
            ),
        ))
    } else {
        None
    }
}

fn join_years(years: &[u32]) -> String {
    years
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
