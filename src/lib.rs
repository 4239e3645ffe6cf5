//! Plan Projection - multi-year financial projection engine for service businesses
//!
//! This library provides:
//! - Assumption documents (clients, channels, personnel, costs, investments, financing)
//! - Yearly revenue, cost, income-statement and cash-flow projection
//! - Valuation KPIs (enterprise value, IRR, NPV, peak funding, payback, break-even)
//! - Monthly cash trajectory and advisory insights
//! - One-variable sensitivity analysis over any numeric assumption

pub mod error;
pub mod plan;
pub mod projection;
pub mod scenario;
pub mod valuation;

// Re-export commonly used types
pub use error::{PlanError, PlanResult};
pub use plan::{load_plan, BusinessPlan};
pub use projection::{ProjectionConfig, ProjectionEngine, ProjectionResult};
pub use scenario::{SensitivityRequest, SensitivityResult, SensitivityRunner};
pub use valuation::{Insight, KpiBundle};
