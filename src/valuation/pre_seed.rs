use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::valuation::{FieldRule, ValuationModel, ValuationResult};

const TAM_WEIGHT: f64 = 0.4;
const TEAM_WEIGHT: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreSeedInputs {
    /// Total addressable market in USD
    pub tam: f64,
    /// Team quality, 0..=1
    pub team_score: f64,
    /// Current revenue or users
    pub current_traction: f64,
}

/// Scorecard valuation for companies without meaningful revenue.
#[derive(Debug, Clone, Default)]
pub struct PreSeedModel;

impl PreSeedModel {
    pub fn scorecard_valuation(&self, tam: f64, team_score: f64) -> f64 {
        tam * TAM_WEIGHT + team_score * 1e6 * TEAM_WEIGHT
    }

    /// 0 when traction covers the whole market, 1 with no traction (or no market).
    pub fn market_risk(&self, current_traction: f64, tam: f64) -> f64 {
        let penetration = if tam > 0.0 { current_traction / tam } else { 0.0 };
        1.0 - penetration.min(1.0)
    }
}

impl ValuationModel for PreSeedModel {
    type Inputs = PreSeedInputs;

    fn methodology(&self) -> &'static str {
        "Pre-Seed Scorecard"
    }

    fn required_fields(&self) -> Vec<FieldRule> {
        vec![
            FieldRule::number("tam", "Total Addressable Market in USD").min(0.0),
            FieldRule::number("team_score", "Team score on a 0-1 scale")
                .min(0.0)
                .max(1.0),
            FieldRule::number("current_traction", "Current revenue or users").min(0.0),
        ]
    }

    fn compute(&self, inputs: &PreSeedInputs) -> Result<ValuationResult> {
        let value = self.scorecard_valuation(inputs.tam, inputs.team_score);
        let market_risk = self.market_risk(inputs.current_traction, inputs.tam);

        let mut risk_factors = BTreeMap::new();
        risk_factors.insert("market_risk".to_string(), market_risk);
        risk_factors.insert("execution_risk".to_string(), 1.0 - inputs.team_score);

        let confidence = 0.7 * (1.0 - market_risk) + 0.3 * inputs.team_score;

        Ok(ValuationResult {
            value,
            confidence,
            methodology: self.methodology().to_string(),
            risk_factors,
            warnings: Vec::new(),
        })
    }
}
