//! Load assumption documents from JSON

use super::BusinessPlan;
use crate::error::PlanResult;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Load and validate a plan from a JSON file
pub fn load_plan<P: AsRef<Path>>(path: P) -> PlanResult<BusinessPlan> {
    let file = File::open(path)?;
    load_plan_from_reader(BufReader::new(file))
}

/// Load and validate a plan from any reader (e.g., request body, stdin)
pub fn load_plan_from_reader<R: std::io::Read>(reader: R) -> PlanResult<BusinessPlan> {
    let plan: BusinessPlan = serde_json::from_reader(reader)?;
    plan.validate()?;
    Ok(plan)
}

/// Load and validate a plan from a JSON string
pub fn load_plan_from_str(json: &str) -> PlanResult<BusinessPlan> {
    let plan: BusinessPlan = serde_json::from_str(json)?;
    plan.validate()?;
    Ok(plan)
}
