//! KPIs, valuation and advisory insights computed from the projected statements

mod insights;
mod kpi;
mod monthly;

pub use insights::{generate_insights, Insight, InsightThresholds, Severity};
pub use kpi::{compute_kpis, enterprise_value, equity_cash_flows, KpiBundle, LowestCashPoint};
pub use monthly::{monthly_series, MonthlyPoint};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{General, Valuation, ValuationMethod};
    use crate::projection::irr::IrrConfig;
    use crate::projection::{CashFlowRow, IncomeStatementRow, ProjectCalendar};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn income(year: u32, ebitda: f64) -> IncomeStatementRow {
        IncomeStatementRow {
            year,
            revenue_recoverable: 0.0,
            revenue_new_clients: 0.0,
            revenue_direct: ebitda.max(0.0),
            total_revenue: ebitda.max(0.0),
            personnel_costs: (-ebitda).max(0.0),
            fixed_costs: 0.0,
            variable_costs: 0.0,
            marketing_costs: 0.0,
            ebitda,
            amortization: 0.0,
            ebit: ebitda,
            interest_expense: 0.0,
            ebt: ebitda,
            taxes: 0.0,
            net_profit: ebitda,
            principal_repaid: 0.0,
            collection_days: 0.0,
        }
    }

    fn cash(year: u32, operating: f64, equity: f64, starting: f64) -> CashFlowRow {
        CashFlowRow {
            year,
            gross_operating_cash_flow: operating,
            change_in_receivables: 0.0,
            change_in_payables: 0.0,
            operating_cash_flow: operating,
            investing_cash_flow: 0.0,
            equity_injection: equity,
            loan_proceeds: 0.0,
            principal_repayment: 0.0,
            dividends_paid: 0.0,
            financing_cash_flow: equity,
            net_cash_flow: operating + equity,
            starting_cash: starting,
            ending_cash: starting + operating + equity,
        }
    }

    fn scenario() -> (General, Vec<IncomeStatementRow>, Vec<CashFlowRow>) {
        let general = General {
            time_horizon_years: 2,
            initial_equity: 24_000.0,
            valuation: Valuation {
                method: ValuationMethod::ExitMultiple,
                exit_multiple: 3.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let income = vec![income(1, -12_000.0), income(2, 24_000.0)];
        let cash = vec![
            cash(1, -12_000.0, 24_000.0, 0.0),
            cash(2, 24_000.0, 0.0, 12_000.0),
        ];
        (general, income, cash)
    }

    #[test]
    fn test_monthly_series_spreads_years() {
        let (general, income, cash) = scenario();
        let calendar = ProjectCalendar::new(&general);
        let monthly = monthly_series(&calendar, &general, &income, &cash);

        assert_eq!(monthly.len(), 24);
        assert_eq!(monthly[0].month, 1);
        assert_eq!(monthly[0].label, "FY2025-P01");
        assert_eq!(monthly[12].label, "FY2026-P01");
        assert_relative_eq!(monthly[0].ebitda, -1_000.0, max_relative = 1e-12);
        assert_relative_eq!(monthly[0].ending_cash, 23_000.0, max_relative = 1e-12);
        assert_abs_diff_eq!(monthly[11].ending_cash, cash[0].ending_cash, epsilon = 1e-6);
        assert_abs_diff_eq!(monthly[23].ending_cash, cash[1].ending_cash, epsilon = 1e-6);
    }

    #[test]
    fn test_stub_year_points_use_period_labels() {
        let (mut general, income, cash) = scenario();
        general.start_month = 9;
        general.start_year = 2025;
        let calendar = ProjectCalendar::new(&general);
        let monthly = monthly_series(&calendar, &general, &income, &cash);

        // The four-month stub year still yields twelve points
        assert_eq!(monthly.len(), 24);
        assert_eq!(monthly[4].month, 5);
        assert_eq!(monthly[4].label, "FY2025-P05");
        assert_eq!(monthly[11].label, "FY2025-P12");
        assert_eq!(monthly[12].month, 13);
        assert_eq!(monthly[12].label, "FY2026-P01");
    }

    #[test]
    fn test_kpis_from_monthly_series() {
        let (general, income, cash) = scenario();
        let calendar = ProjectCalendar::new(&general);
        let monthly = monthly_series(&calendar, &general, &income, &cash);
        let kpis = compute_kpis(&general, &income, &cash, &monthly, &IrrConfig::default());

        // 12 months of -1000, then +2000 per month
        assert_abs_diff_eq!(kpis.peak_funding_requirement, 12_000.0, epsilon = 1e-6);
        let lowest = kpis.lowest_cash.unwrap();
        assert_eq!(lowest.month, 12);
        assert_abs_diff_eq!(lowest.value, 12_000.0, epsilon = 1e-6);
        // Cumulative EBITDA is back to zero at month 18 and positive from 19
        assert_eq!(kpis.break_even_month, Some(19));
        assert_relative_eq!(kpis.payback_period_years.unwrap(), 19.0 / 12.0, max_relative = 1e-12);
        assert_relative_eq!(kpis.enterprise_value.unwrap(), 72_000.0, max_relative = 1e-12);
        assert!(kpis.irr.is_some());
        assert!(kpis.npv.is_some());
    }

    #[test]
    fn test_equity_vector_adds_terminal_value() {
        let (general, _, cash) = scenario();
        let flows = equity_cash_flows(&general, &cash, 72_000.0);
        assert_eq!(flows, vec![-24_000.0, -12_000.0, 96_000.0]);
    }

    #[test]
    fn test_perpetual_growth_unavailable_when_growth_exceeds_discount() {
        let (mut general, income, cash) = scenario();
        general.valuation = Valuation {
            method: ValuationMethod::PerpetualGrowth,
            perpetual_growth_rate: 12.0,
            discount_rate: 10.0,
            ..Default::default()
        };
        assert_eq!(enterprise_value(&general, &income, &cash), None);

        general.valuation.perpetual_growth_rate = 2.0;
        let ev = enterprise_value(&general, &income, &cash).unwrap();
        assert_relative_eq!(ev, 24_000.0 * 1.02 / 0.08, max_relative = 1e-12);
    }

    #[test]
    fn test_positive_cash_flow_needs_no_funding() {
        let general = General {
            time_horizon_years: 1,
            initial_equity: 10_000.0,
            ..Default::default()
        };
        let income = vec![income(1, 12_000.0)];
        let cash = vec![cash(1, 12_000.0, 10_000.0, 0.0)];
        let calendar = ProjectCalendar::new(&general);
        let monthly = monthly_series(&calendar, &general, &income, &cash);
        let kpis = compute_kpis(&general, &income, &cash, &monthly, &IrrConfig::default());

        assert_eq!(kpis.peak_funding_requirement, 0.0);
        assert_relative_eq!(kpis.payback_period_years.unwrap(), 1.0 / 12.0, max_relative = 1e-12);
        assert_eq!(kpis.break_even_month, Some(1));
    }

    #[test]
    fn test_idle_plan_never_breaks_even() {
        let general = General {
            time_horizon_years: 1,
            ..Default::default()
        };
        let income = vec![income(1, 0.0)];
        let cash = vec![cash(1, 0.0, 0.0, 0.0)];
        let calendar = ProjectCalendar::new(&general);
        let monthly = monthly_series(&calendar, &general, &income, &cash);
        let kpis = compute_kpis(&general, &income, &cash, &monthly, &IrrConfig::default());

        assert_eq!(kpis.break_even_month, None);
        assert_eq!(kpis.payback_period_years, None);
        assert_eq!(kpis.peak_funding_requirement, 0.0);
    }

    #[test]
    fn test_empty_projection_gives_empty_kpis() {
        let general = General::default();
        let kpis = compute_kpis(&general, &[], &[], &[], &IrrConfig::default());
        assert_eq!(kpis, KpiBundle::default());
        assert_eq!(kpis.peak_funding_requirement, 0.0);
    }
}
