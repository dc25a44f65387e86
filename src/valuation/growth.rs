use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VentureLensError};
use crate::valuation::{FieldRule, ValuationModel, ValuationResult, mean};

const UNKNOWN_REGION_MULTIPLIER: f64 = 0.8;

static DEFAULT_REGION_RISK: Lazy<HashMap<String, f64>> = Lazy::new(|| {
    [
        ("north_america", 1.0),
        ("europe", 0.9),
        ("asia_pacific", 0.85),
        ("latin_america", 0.8),
        ("africa", 0.75),
    ]
    .into_iter()
    .map(|(region, multiplier)| (region.to_string(), multiplier))
    .collect()
});

/// Regional risk multipliers applied to growth-stage valuations.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRiskTable {
    multipliers: HashMap<String, f64>,
}

impl Default for RegionRiskTable {
    fn default() -> Self {
        Self {
            multipliers: DEFAULT_REGION_RISK.clone(),
        }
    }
}

impl RegionRiskTable {
    pub fn new(multipliers: HashMap<String, f64>) -> Self {
        Self {
            multipliers: multipliers
                .into_iter()
                .map(|(region, m)| (region.to_lowercase(), m))
                .collect(),
        }
    }

    /// Read a JSON object of region to multiplier. Falls back to the built-in
    /// table when the file is missing or malformed.
    pub fn load(path: &Path) -> Self {
        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|content| {
                serde_json::from_str::<HashMap<String, f64>>(&content).map_err(|e| e.to_string())
            });
        match parsed {
            Ok(multipliers) => {
                tracing::debug!(
                    "Loaded {} region risk multipliers from {}",
                    multipliers.len(),
                    path.display()
                );
                Self::new(multipliers)
            }
            Err(err) => {
                tracing::warn!(
                    "Region risk file {} unusable ({}), using defaults",
                    path.display(),
                    err
                );
                Self::default()
            }
        }
    }

    pub fn multiplier(&self, region: &str) -> f64 {
        self.multipliers
            .get(&region.to_lowercase())
            .copied()
            .unwrap_or(UNKNOWN_REGION_MULTIPLIER)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthInputs {
    /// Free cash flow in USD
    pub fcf: f64,
    /// Long-term growth rate
    pub growth_rate: f64,
    pub wacc: f64,
    pub region: String,
}

/// Perpetual-growth terminal value with a regional risk haircut.
#[derive(Debug, Clone, Default)]
pub struct GrowthModel {
    regions: RegionRiskTable,
}

impl GrowthModel {
    pub fn new(regions: RegionRiskTable) -> Self {
        Self { regions }
    }

    pub fn terminal_value(&self, fcf: f64, growth_rate: f64, wacc: f64) -> Result<f64> {
        if wacc <= growth_rate {
            return Err(VentureLensError::Valuation {
                message: "WACC must be greater than growth rate".to_string(),
            });
        }
        Ok(fcf * (1.0 + growth_rate) / (wacc - growth_rate))
    }

    pub fn region_risk_adjustment(&self, value: f64, region: &str) -> f64 {
        value * self.regions.multiplier(region)
    }
}

impl ValuationModel for GrowthModel {
    type Inputs = GrowthInputs;

    fn methodology(&self) -> &'static str {
        "Growth Terminal Value"
    }

    fn required_fields(&self) -> Vec<FieldRule> {
        vec![
            FieldRule::number("fcf", "Free Cash Flow in USD"),
            FieldRule::number("growth_rate", "Long-term growth rate (as decimal)"),
            FieldRule::number("wacc", "Weighted Average Cost of Capital (as decimal)"),
            FieldRule::text("region", "Operating region, e.g. north_america"),
        ]
    }

    fn compute(&self, inputs: &GrowthInputs) -> Result<ValuationResult> {
        if inputs.wacc == 0.0 {
            return Err(VentureLensError::Valuation {
                message: "WACC must be non-zero".to_string(),
            });
        }
        if inputs.fcf / 1e6 == -1.0 {
            return Err(VentureLensError::Valuation {
                message: "Free cash flow of -1,000,000 leaves scale risk undefined".to_string(),
            });
        }

        let base_value = self.terminal_value(inputs.fcf, inputs.growth_rate, inputs.wacc)?;
        let value = self.region_risk_adjustment(base_value, &inputs.region);

        let mut risk_factors = BTreeMap::new();
        risk_factors.insert("growth_risk".to_string(), inputs.growth_rate / inputs.wacc);
        risk_factors.insert(
            "region_risk".to_string(),
            1.0 - self.regions.multiplier(&inputs.region),
        );
        risk_factors.insert("scale_risk".to_string(), 1.0 / (1.0 + inputs.fcf / 1e6));

        let confidence = 0.85 * (1.0 - mean(&risk_factors));

        Ok(ValuationResult {
            value,
            confidence,
            methodology: self.methodology().to_string(),
            risk_factors,
            warnings: Vec::new(),
        })
    }
}
