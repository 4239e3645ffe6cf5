//! AWS Lambda handler for plan projections
//!
//! Accepts an assumption document as the event payload, with optional solver
//! overrides and an optional sensitivity request, and returns the projection
//! as JSON.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::info;
use serde::{Deserialize, Serialize};

use plan_projection::{
    BusinessPlan, ProjectionConfig, ProjectionEngine, ProjectionResult, SensitivityRequest,
    SensitivityResult, SensitivityRunner,
};

/// Input event
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRequest {
    pub plan: BusinessPlan,

    /// Run a sensitivity analysis next to the projection
    #[serde(default)]
    pub sensitivity: Option<SensitivityRequest>,

    /// Straight-line amortization window in years (default: 5)
    #[serde(default)]
    pub amortization_years: Option<u32>,

    /// IRR convergence tolerance (default: 1e-7)
    #[serde(default)]
    pub irr_tolerance: Option<f64>,
}

impl ProjectionRequest {
    fn config(&self) -> ProjectionConfig {
        let mut config = ProjectionConfig::default();
        if let Some(years) = self.amortization_years {
            config.amortization_years = years;
        }
        if let Some(tolerance) = self.irr_tolerance {
            config.irr.tolerance = tolerance;
        }
        config
    }
}

/// Output from the projection
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResponse {
    pub projection: ProjectionResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<SensitivityResult>,
    pub execution_time_ms: u64,
}

async fn handler(event: LambdaEvent<ProjectionRequest>) -> Result<ProjectionResponse, Error> {
    let start = std::time::Instant::now();
    let request = event.payload;
    let config = request.config();

    let sensitivity = match &request.sensitivity {
        Some(sensitivity) => Some(
            SensitivityRunner::new(config.clone()).run(&request.plan, sensitivity)?,
        ),
        None => None,
    };
    let projection = ProjectionEngine::new(request.plan, config).run()?;

    let execution_time_ms = start.elapsed().as_millis() as u64;
    info!(
        "Projected {} years in {} ms",
        projection.income_statement.len(),
        execution_time_ms
    );

    Ok(ProjectionResponse {
        projection,
        sensitivity,
        execution_time_ms,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
