//! Internal Rate of Return (IRR) calculation
//!
//! Newton-Raphson on the NPV function over yearly cash flows.

use log::warn;

/// Root-finding settings for [`calculate_irr`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrrConfig {
    pub initial_guess: f64,
    pub max_iterations: u32,
    /// Convergence threshold on the Newton step, also the floor under which
    /// the derivative is treated as vanished
    pub tolerance: f64,
}

impl Default for IrrConfig {
    fn default() -> Self {
        Self {
            initial_guess: 0.10,
            max_iterations: 100,
            tolerance: 1e-7,
        }
    }
}

/// Net present value of `cashflows` (index 0 undiscounted) at `rate`
pub fn npv(rate: f64, cashflows: &[f64]) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// Calculate NPV and its derivative with respect to rate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        npv += cf / (1.0 + rate).powi(t as i32);
        if t > 0 {
            dnpv -= (t as f64) * cf / (1.0 + rate).powi(t as i32 + 1);
        }
    }

    (npv, dnpv)
}

/// Calculate the IRR of yearly cash flows (positive = inflow, negative = outflow).
///
/// Iterates `r <- r - NPV(r)/NPV'(r)` until the step falls below the
/// tolerance. When the iteration budget runs out, or the derivative vanishes,
/// the current estimate is returned as an approximation. Returns `None` for
/// an empty vector, or when Newton diverges to a non-finite rate and
/// bisection cannot bracket a root either.
pub fn calculate_irr(cashflows: &[f64], config: &IrrConfig) -> Option<f64> {
    if cashflows.is_empty() {
        return None;
    }

    let mut rate = config.initial_guess;

    for _ in 0..config.max_iterations {
        let (npv, dnpv) = npv_and_derivative(cashflows, rate);

        if dnpv.abs() < config.tolerance {
            warn!("IRR derivative vanished at rate {:.6}, returning current estimate", rate);
            return Some(rate);
        }

        let new_rate = rate - npv / dnpv;
        if !new_rate.is_finite() || new_rate <= -1.0 {
            return calculate_irr_bisection(cashflows, config);
        }

        if (new_rate - rate).abs() < config.tolerance {
            return Some(new_rate);
        }

        rate = new_rate;
    }

    warn!(
        "IRR did not converge after {} iterations, returning estimate {:.6}",
        config.max_iterations, rate
    );
    Some(rate)
}

/// Fallback IRR calculation using bisection method
fn calculate_irr_bisection(cashflows: &[f64], config: &IrrConfig) -> Option<f64> {
    let mut low = -0.99_f64;
    let mut high = 10.0_f64;
    let max_iterations = 1000;

    let mut npv_low = npv(low, cashflows);
    if npv_low * npv(high, cashflows) > 0.0 {
        warn!("IRR has no root in [{low}, {high}]");
        return None;
    }

    for _ in 0..max_iterations {
        let mid = (low + high) / 2.0;
        let npv_mid = npv(mid, cashflows);

        if npv_mid.abs() < config.tolerance || (high - low) / 2.0 < config.tolerance {
            return Some(mid);
        }

        if npv_mid * npv_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_simple_irr() {
        // 100 invested, 161.05 returned after five years
        let cashflows = [-100.0, 0.0, 0.0, 0.0, 0.0, 161.051];
        let irr = calculate_irr(&cashflows, &IrrConfig::default()).unwrap();
        assert_abs_diff_eq!(irr, 0.10, epsilon = 1e-4);
    }

    #[test]
    fn test_level_cashflows() {
        // 1000 invested, 300 back for five years
        let cashflows = [-1000.0, 300.0, 300.0, 300.0, 300.0, 300.0];
        let irr = calculate_irr(&cashflows, &IrrConfig::default()).unwrap();
        assert_abs_diff_eq!(npv(irr, &cashflows), 0.0, epsilon = 1e-6);
        assert!(irr > 0.15 && irr < 0.16, "got {}", irr);
    }

    #[test]
    fn test_negative_irr() {
        let cashflows = [-1000.0, 200.0, 200.0, 200.0];
        let irr = calculate_irr(&cashflows, &IrrConfig::default()).unwrap();
        assert!(irr < 0.0);
        assert_abs_diff_eq!(npv(irr, &cashflows), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_empty_cashflows() {
        assert_eq!(calculate_irr(&[], &IrrConfig::default()), None);
    }

    #[test]
    fn test_no_sign_change_returns_estimate() {
        // NPV is positive at every rate, Newton cannot converge
        let cashflows = [100.0, 100.0];
        let irr = calculate_irr(&cashflows, &IrrConfig::default());
        assert!(irr.map_or(true, |r| r.is_finite()));
    }

    #[test]
    fn test_flat_npv_returns_initial_guess() {
        // A lone flow at t = 0 has no sensitivity to the rate
        let config = IrrConfig::default();
        assert_eq!(calculate_irr(&[-5.0], &config), Some(config.initial_guess));
        assert_eq!(calculate_irr(&[0.0, 0.0, 0.0], &config), Some(config.initial_guess));
    }

    #[test]
    fn test_npv_at_zero_is_sum() {
        assert_eq!(npv(0.0, &[-10.0, 4.0, 8.0]), 2.0);
    }
}
