//! One-variable sensitivity analysis
//!
//! Perturbs a single numeric field of the plan by plus and minus a
//! percentage, then runs the full projection on independent copies.

mod path;

pub use path::{PathStep, ValuePath};

use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PlanError, PlanResult};
use crate::plan::BusinessPlan;
use crate::projection::{ProjectionConfig, ProjectionEngine};
use crate::valuation::KpiBundle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityRequest {
    /// Dotted or bracketed path into the plan document
    pub path: String,
    pub variation_percent: f64,
}

/// Headline KPIs compared across scenarios
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSubset {
    pub enterprise_value: Option<f64>,
    pub irr: Option<f64>,
    pub peak_funding_requirement: Option<f64>,
    pub payback_period_years: Option<f64>,
}

impl From<&KpiBundle> for KpiSubset {
    fn from(kpis: &KpiBundle) -> Self {
        Self {
            enterprise_value: kpis.enterprise_value,
            irr: kpis.irr,
            peak_funding_requirement: Some(kpis.peak_funding_requirement),
            payback_period_years: kpis.payback_period_years,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityResult {
    pub path: String,
    pub variation_percent: f64,
    pub base_value: f64,
    /// Value written into the pessimistic copy, after rounding integer fields
    pub pessimistic_value: f64,
    /// Value written into the optimistic copy, after rounding integer fields
    pub optimistic_value: f64,
    pub pessimistic: KpiSubset,
    pub base: KpiSubset,
    pub optimistic: KpiSubset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioKind {
    Pessimistic,
    Base,
    Optimistic,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 3] = [Self::Pessimistic, Self::Base, Self::Optimistic];

    /// Multiplier applied to the base value
    pub fn factor(self, variation_percent: f64) -> f64 {
        match self {
            Self::Pessimistic => 1.0 - variation_percent / 100.0,
            Self::Base => 1.0,
            Self::Optimistic => 1.0 + variation_percent / 100.0,
        }
    }
}

/// Runs the base, pessimistic and optimistic projections of a plan
#[derive(Debug, Clone, Default)]
pub struct SensitivityRunner {
    config: ProjectionConfig,
}

impl SensitivityRunner {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Resolve the path, then project the three scenarios in parallel.
    ///
    /// Fails when the path is malformed, missing, null or not numeric, and
    /// when it targets the amount of an item whose children define it. A
    /// scenario that fails to project reports an all-unavailable subset
    /// instead of aborting the analysis.
    pub fn run(
        &self,
        plan: &BusinessPlan,
        request: &SensitivityRequest,
    ) -> PlanResult<SensitivityResult> {
        if !request.variation_percent.is_finite() {
            return Err(PlanError::invalid(
                "variationPercent",
                "must be a finite number",
            ));
        }

        let path = ValuePath::parse(&request.path)?;
        let document = serde_json::to_value(plan)?;

        let node = path
            .get(&document)
            .filter(|node| !node.is_null())
            .ok_or_else(|| PlanError::VariableNotFound(request.path.clone()))?;
        let base_value = node
            .as_f64()
            .ok_or_else(|| PlanError::NotNumeric(request.path.clone()))?;
        let integral = node.is_i64() || node.is_u64();

        if is_derived_amount(&document, &path) {
            return Err(PlanError::DerivedValue(request.path.clone()));
        }

        info!(
            "Sensitivity on {} = {} at +/-{}%",
            path, base_value, request.variation_percent
        );

        let applied: Vec<(ScenarioKind, Value)> = ScenarioKind::ALL
            .iter()
            .map(|&kind| {
                let factor = kind.factor(request.variation_percent);
                (kind, perturbed_value(base_value, factor, integral))
            })
            .collect();

        let applied_value = |kind: ScenarioKind| {
            applied
                .iter()
                .find(|(k, _)| *k == kind)
                .and_then(|(_, value)| value.as_f64())
                .unwrap_or(f64::NAN)
        };
        let pessimistic_value = applied_value(ScenarioKind::Pessimistic);
        let optimistic_value = applied_value(ScenarioKind::Optimistic);

        if request.variation_percent != 0.0
            && (pessimistic_value == base_value || optimistic_value == base_value)
        {
            warn!(
                "Rounding {} to an integer leaves a scenario at {} (pessimistic {}, optimistic {})",
                path, base_value, pessimistic_value, optimistic_value
            );
        }

        let runs: Vec<(ScenarioKind, KpiSubset)> = applied
            .par_iter()
            .map(|(kind, value)| {
                let subset = self.run_scenario(&document, &path, *kind, value.clone());
                (*kind, subset)
            })
            .collect();

        let take = |kind: ScenarioKind| {
            runs.iter()
                .find(|(k, _)| *k == kind)
                .map(|(_, subset)| subset.clone())
                .unwrap_or_default()
        };

        Ok(SensitivityResult {
            path: request.path.clone(),
            variation_percent: request.variation_percent,
            base_value,
            pessimistic_value,
            optimistic_value,
            pessimistic: take(ScenarioKind::Pessimistic),
            base: take(ScenarioKind::Base),
            optimistic: take(ScenarioKind::Optimistic),
        })
    }

    fn run_scenario(
        &self,
        document: &Value,
        path: &ValuePath,
        kind: ScenarioKind,
        value: Value,
    ) -> KpiSubset {
        match self.try_scenario(document, path, value) {
            Ok(subset) => subset,
            Err(e) => {
                warn!("{:?} scenario for {} failed: {}", kind, path, e);
                KpiSubset::default()
            }
        }
    }

    fn try_scenario(
        &self,
        document: &Value,
        path: &ValuePath,
        value: Value,
    ) -> PlanResult<KpiSubset> {
        let mut copy = document.clone();
        path.set(&mut copy, value)?;
        let plan: BusinessPlan = serde_json::from_value(copy)?;
        let result = ProjectionEngine::new(plan, self.config.clone()).run()?;
        Ok(KpiSubset::from(&result.kpis))
    }
}

/// True when the path ends at the `amount` of an item with children. That
/// amount is recomputed from the children on load, so writing it is lost.
fn is_derived_amount(document: &Value, path: &ValuePath) -> bool {
    match path.parent(document) {
        Some((parent, PathStep::Field(name))) if name == "amount" => parent
            .get("children")
            .and_then(Value::as_array)
            .is_some_and(|children| !children.is_empty()),
        _ => false,
    }
}

/// Scaled value as a JSON number; integer fields stay integers
fn perturbed_value(base: f64, factor: f64, integral: bool) -> Value {
    let scaled = base * factor;
    if integral {
        Value::from(scaled.round() as i64)
    } else {
        Value::from(scaled)
    }
}
