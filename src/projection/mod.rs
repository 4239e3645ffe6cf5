//! Yearly projection of revenue, costs, income statement and cash flow

mod calendar;
mod cashflows;
mod costs;
mod engine;
mod income;
pub mod irr;
mod revenue;
mod state;

pub use calendar::{FiscalYear, ProjectCalendar};
pub use cashflows::{CashFlowBuilder, CashFlowRow};
pub use costs::{BonusShares, CostAggregation, YearCosts};
pub use engine::{ProjectionConfig, ProjectionEngine, ProjectionResult};
pub use income::{IncomeStatementBuilder, IncomeStatementRow};
pub use irr::{calculate_irr, npv, IrrConfig};
pub use revenue::{ContractInstance, RenewalChain, RevenueProjection, YearRevenue};
pub use state::YearCarry;
