//! Fiscal-year windows over project-relative months
//!
//! Project month 1 is the start month of the start year. Fiscal year 1 ends
//! in December of the start year (a stub year unless the plan starts in
//! January); every later fiscal year spans twelve months.

use chrono::{Months, NaiveDate};

use crate::plan::General;

/// A fiscal year expressed as an inclusive range of project months
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiscalYear {
    /// 1-indexed
    pub index: u32,
    pub first_month: u32,
    pub last_month: u32,
}

impl FiscalYear {
    pub fn months(&self) -> u32 {
        self.last_month + 1 - self.first_month
    }

    pub fn contains(&self, month: u32) -> bool {
        (self.first_month..=self.last_month).contains(&month)
    }

    /// Months of this year inside the activity window `[start, end]`;
    /// `end = None` means the activity never stops
    pub fn active_months(&self, start: u32, end: Option<u32>) -> u32 {
        let from = start.max(self.first_month);
        let to = end.map_or(self.last_month, |e| e.min(self.last_month));
        if to < from {
            0
        } else {
            to + 1 - from
        }
    }

    /// Inflation, growth or raise factor compounded since year 1
    pub fn compound(&self, rate: f64) -> f64 {
        (1.0 + rate).powi(self.index as i32 - 1)
    }
}

#[derive(Debug, Clone)]
pub struct ProjectCalendar {
    start: Option<NaiveDate>,
    start_year: i32,
    start_month: u32,
    horizon_years: u32,
}

impl ProjectCalendar {
    pub fn new(general: &General) -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(general.start_year, general.start_month, 1),
            start_year: general.start_year,
            start_month: general.start_month.clamp(1, 12),
            horizon_years: general.time_horizon_years,
        }
    }

    pub fn horizon_years(&self) -> u32 {
        self.horizon_years
    }

    /// Length of fiscal year 1
    pub fn stub_months(&self) -> u32 {
        13 - self.start_month
    }

    pub fn fiscal_years(&self) -> Vec<FiscalYear> {
        let mut years = Vec::with_capacity(self.horizon_years as usize);
        let mut first_month = 1;
        for index in 1..=self.horizon_years {
            let months = if index == 1 { self.stub_months() } else { 12 };
            years.push(FiscalYear {
                index,
                first_month,
                last_month: first_month + months - 1,
            });
            first_month += months;
        }
        years
    }

    /// Fiscal year containing a project month, if within the horizon
    pub fn year_of(&self, month: u32) -> Option<u32> {
        self.fiscal_years()
            .into_iter()
            .find(|y| y.contains(month))
            .map(|y| y.index)
    }

    /// Positional label (`FY<year>-P<nn>`) of the `period`-th twelfth of a
    /// fiscal year. Periods are not calendar months: a stub year is still
    /// split into twelve periods.
    pub fn period_label(&self, year_index: u32, period: u32) -> String {
        let year = i64::from(self.start_year) + i64::from(year_index) - 1;
        format!("FY{year}-P{period:02}")
    }

    /// Calendar label (`YYYY-MM`) of a project month
    pub fn label(&self, month: u32) -> String {
        self.start
            .and_then(|d| d.checked_add_months(Months::new(month.saturating_sub(1))))
            .map(|d| d.format("%Y-%m").to_string())
            .unwrap_or_else(|| format!("M{month}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calendar(start_month: u32, years: u32) -> ProjectCalendar {
        let general = General {
            start_month,
            start_year: 2025,
            time_horizon_years: years,
            ..Default::default()
        };
        ProjectCalendar::new(&general)
    }

    #[test]
    fn test_january_start_has_full_years() {
        let years = calendar(1, 3).fiscal_years();
        assert_eq!(years.len(), 3);
        assert_eq!(years[0], FiscalYear { index: 1, first_month: 1, last_month: 12 });
        assert_eq!(years[2], FiscalYear { index: 3, first_month: 25, last_month: 36 });
    }

    #[test]
    fn test_mid_year_start_creates_stub_year() {
        let years = calendar(9, 2).fiscal_years();
        assert_eq!(years[0].months(), 4);
        assert_eq!(years[1].first_month, 5);
        assert_eq!(years[1].last_month, 16);
    }

    #[test]
    fn test_active_months_overlap() {
        let year = FiscalYear { index: 2, first_month: 13, last_month: 24 };
        assert_eq!(year.active_months(1, None), 12);
        assert_eq!(year.active_months(20, None), 5);
        assert_eq!(year.active_months(25, None), 0);
        assert_eq!(year.active_months(1, Some(12)), 0);
        assert_eq!(year.active_months(10, Some(15)), 3);
    }

    #[test]
    fn test_zero_horizon_has_no_years() {
        assert!(calendar(1, 0).fiscal_years().is_empty());
    }

    #[test]
    fn test_labels_and_year_lookup() {
        let cal = calendar(11, 2);
        assert_eq!(cal.label(1), "2025-11");
        assert_eq!(cal.label(3), "2026-01");
        assert_eq!(cal.year_of(2), Some(1));
        assert_eq!(cal.year_of(3), Some(2));
        assert_eq!(cal.year_of(15), None);
    }

    #[test]
    fn test_period_labels_follow_fiscal_years() {
        let cal = calendar(9, 2);
        assert_eq!(cal.period_label(1, 1), "FY2025-P01");
        assert_eq!(cal.period_label(1, 12), "FY2025-P12");
        assert_eq!(cal.period_label(2, 1), "FY2026-P01");
    }
}
