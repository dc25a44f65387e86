//! Dispatch valuation requests to the model for a company's stage

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ValuationConfig;
use crate::error::Result;
use crate::valuation::{
    FieldRule, GrowthInputs, GrowthModel, PreSeedInputs, PreSeedModel, RegionRiskTable,
    SeedInputs, SeedModel, SeriesAInputs, SeriesAModel, Stage, ValuationModel, ValuationResult,
};

/// Inputs tagged with the stage they belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum ValuationInputs {
    PreSeed(PreSeedInputs),
    Seed(SeedInputs),
    SeriesA(SeriesAInputs),
    Growth(GrowthInputs),
}

impl ValuationInputs {
    pub fn stage(&self) -> Stage {
        match self {
            ValuationInputs::PreSeed(_) => Stage::PreSeed,
            ValuationInputs::Seed(_) => Stage::Seed,
            ValuationInputs::SeriesA(_) => Stage::SeriesA,
            ValuationInputs::Growth(_) => Stage::Growth,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValuationEngine {
    pre_seed: PreSeedModel,
    seed: SeedModel,
    series_a: SeriesAModel,
    growth: GrowthModel,
}

impl ValuationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ValuationConfig) -> Self {
        let regions = config
            .region_risk_file
            .as_deref()
            .map(RegionRiskTable::load)
            .unwrap_or_default();
        Self {
            growth: GrowthModel::new(regions),
            ..Self::default()
        }
    }

    pub fn calculate(&self, inputs: &ValuationInputs) -> Result<ValuationResult> {
        let result = match inputs {
            ValuationInputs::PreSeed(i) => self.pre_seed.calculate(i),
            ValuationInputs::Seed(i) => self.seed.calculate(i),
            ValuationInputs::SeriesA(i) => self.series_a.calculate(i),
            ValuationInputs::Growth(i) => self.growth.calculate(i),
        };
        log_outcome(inputs.stage(), &result);
        result
    }

    /// Untyped entry point: `stage` by name, `inputs` as a JSON object.
    pub fn calculate_json(&self, stage: &str, inputs: &Value) -> Result<ValuationResult> {
        let stage: Stage = stage.parse()?;
        let result = match stage {
            Stage::PreSeed => self.pre_seed.calculate_json(inputs),
            Stage::Seed => self.seed.calculate_json(inputs),
            Stage::SeriesA => self.series_a.calculate_json(inputs),
            Stage::Growth => self.growth.calculate_json(inputs),
        };
        log_outcome(stage, &result);
        result
    }

    /// False for unknown stages as well as bad inputs.
    pub fn validate_inputs(&self, stage: &str, inputs: &Value) -> bool {
        match stage.parse::<Stage>() {
            Ok(Stage::PreSeed) => self.pre_seed.validate_inputs(inputs),
            Ok(Stage::Seed) => self.seed.validate_inputs(inputs),
            Ok(Stage::SeriesA) => self.series_a.validate_inputs(inputs),
            Ok(Stage::Growth) => self.growth.validate_inputs(inputs),
            Err(_) => false,
        }
    }

    pub fn required_fields(&self, stage: &str) -> Result<Vec<FieldRule>> {
        Ok(match stage.parse::<Stage>()? {
            Stage::PreSeed => self.pre_seed.required_fields(),
            Stage::Seed => self.seed.required_fields(),
            Stage::SeriesA => self.series_a.required_fields(),
            Stage::Growth => self.growth.required_fields(),
        })
    }
}

fn log_outcome(stage: Stage, result: &Result<ValuationResult>) {
    match result {
        Ok(r) => tracing::debug!("{} valuation: {}", stage.as_str(), r),
        Err(e) => tracing::warn!("{} valuation failed: {}", stage.as_str(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tagged_inputs_dispatch_by_stage() {
        let inputs: ValuationInputs = serde_json::from_value(json!({
            "stage": "series_a",
            "dcf_value": 10_000_000.0,
            "comparable_value": 10_000_000.0,
            "equity_ratio": 1.0,
            "debt_ratio": 0.0,
            "cost_of_equity": 0.15,
            "cost_of_debt": 0.0,
            "tax_rate": 0.2
        }))
        .unwrap();
        assert_eq!(inputs.stage(), Stage::SeriesA);

        let result = ValuationEngine::new().calculate(&inputs).unwrap();
        assert_eq!(result.methodology, "Series A Hybrid");
        assert!((result.value - 10_000_000.0).abs() < 1e-6);
    }

    #[test]
    fn unknown_stage_is_rejected() {
        let engine = ValuationEngine::new();
        let err = engine.calculate_json("series_c", &json!({})).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported stage: series_c");
        assert!(engine.required_fields("series_c").is_err());
        assert!(!engine.validate_inputs("series_c", &json!({})));
    }

    #[test]
    fn required_fields_follow_stage() {
        let engine = ValuationEngine::new();
        let names: Vec<_> = engine
            .required_fields("growth")
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["fcf", "growth_rate", "wacc", "region"]);
    }

    #[test]
    fn json_inputs_are_validated_before_calculation() {
        let engine = ValuationEngine::new();
        let err = engine
            .calculate_json("pre_seed", &json!({ "tam": 1_000_000 }))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid inputs. Required fields: tam, team_score, current_traction"
        );
    }
}
