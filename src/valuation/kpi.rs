//! Valuation and liquidity KPIs

use serde::{Deserialize, Serialize};

use crate::plan::{pct, General, ValuationMethod};
use crate::projection::irr::{calculate_irr, npv, IrrConfig};
use crate::projection::{CashFlowRow, IncomeStatementRow};
use super::monthly::MonthlyPoint;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowestCashPoint {
    pub month: u32,
    pub value: f64,
}

/// Headline KPIs of a projection. `None` means the value is unavailable,
/// never zero in disguise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiBundle {
    /// Deepest cumulative free-cash-flow deficit, always >= 0
    pub peak_funding_requirement: f64,
    pub lowest_cash: Option<LowestCashPoint>,
    /// First month with positive cumulative EBITDA
    pub break_even_month: Option<u32>,
    /// First month with positive cumulative free cash flow, in years
    pub payback_period_years: Option<f64>,
    pub enterprise_value: Option<f64>,
    /// Approximate when root-finding did not converge
    pub irr: Option<f64>,
    /// Equity cash flows discounted at the plan discount rate
    pub npv: Option<f64>,
}

/// Terminal value of the business at the end of the horizon
pub fn enterprise_value(
    general: &General,
    income: &[IncomeStatementRow],
    cash_flow: &[CashFlowRow],
) -> Option<f64> {
    let valuation = &general.valuation;
    match valuation.method {
        ValuationMethod::ExitMultiple => {
            income.last().map(|last| last.ebitda * valuation.exit_multiple)
        }
        ValuationMethod::PerpetualGrowth => {
            let discount = pct(valuation.discount_rate);
            let growth = pct(valuation.perpetual_growth_rate);
            if discount <= growth {
                return None;
            }
            cash_flow
                .last()
                .map(|last| last.free_cash_flow() * (1.0 + growth) / (discount - growth))
        }
    }
}

/// Equity cash-flow vector: initial equity outflow, yearly free cash flow to
/// equity, terminal value added to the final year
pub fn equity_cash_flows(
    general: &General,
    cash_flow: &[CashFlowRow],
    terminal_value: f64,
) -> Vec<f64> {
    if cash_flow.is_empty() {
        return Vec::new();
    }

    let mut flows = Vec::with_capacity(cash_flow.len() + 1);
    flows.push(-general.initial_equity);
    flows.extend(cash_flow.iter().map(CashFlowRow::free_cash_flow_to_equity));
    if let Some(last) = flows.last_mut() {
        *last += terminal_value;
    }
    flows
}

pub fn compute_kpis(
    general: &General,
    income: &[IncomeStatementRow],
    cash_flow: &[CashFlowRow],
    monthly: &[MonthlyPoint],
    irr_config: &IrrConfig,
) -> KpiBundle {
    if income.is_empty() || cash_flow.is_empty() {
        return KpiBundle::default();
    }

    let enterprise_value = enterprise_value(general, income, cash_flow);
    let (irr, npv_value) = match enterprise_value {
        Some(ev) => {
            let flows = equity_cash_flows(general, cash_flow, ev);
            (
                calculate_irr(&flows, irr_config),
                Some(npv(pct(general.valuation.discount_rate), &flows)),
            )
        }
        None => (None, None),
    };

    let lowest_cash = monthly
        .iter()
        .fold(None::<&MonthlyPoint>, |lowest, point| match lowest {
            Some(l) if l.ending_cash <= point.ending_cash => Some(l),
            _ => Some(point),
        })
        .map(|point| LowestCashPoint {
            month: point.month,
            value: point.ending_cash,
        });

    let break_even_month = monthly
        .iter()
        .find(|p| p.cumulative_ebitda > 0.0)
        .map(|p| p.month);

    let payback_period_years = monthly
        .iter()
        .find(|p| p.cumulative_free_cash_flow > 0.0)
        .map(|p| p.month as f64 / 12.0);

    let deepest = monthly
        .iter()
        .map(|p| p.cumulative_free_cash_flow)
        .fold(0.0_f64, f64::min);

    KpiBundle {
        peak_funding_requirement: if deepest < 0.0 { -deepest } else { 0.0 },
        lowest_cash,
        break_even_month,
        payback_period_years,
        enterprise_value,
        irr,
        npv: npv_value,
    }
}
