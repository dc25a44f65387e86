//! Stage-based startup valuation models

pub mod engine;
pub mod growth;
pub mod pre_seed;
pub mod seed;
pub mod series_a;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, VentureLensError};

pub use engine::{ValuationEngine, ValuationInputs};
pub use growth::{GrowthInputs, GrowthModel, RegionRiskTable};
pub use pre_seed::{PreSeedInputs, PreSeedModel};
pub use seed::{CacLtvCheck, SeedInputs, SeedModel};
pub use series_a::{SeriesAInputs, SeriesAModel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub value: f64,
    pub confidence: f64,
    pub methodology: String,
    pub risk_factors: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl fmt::Display for ValuationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} (confidence {:.0}%)",
            self.methodology,
            format_currency(self.value),
            self.confidence * 100.0
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    PreSeed,
    Seed,
    SeriesA,
    Growth,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::PreSeed, Stage::Seed, Stage::SeriesA, Stage::Growth];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::PreSeed => "pre_seed",
            Stage::Seed => "seed",
            Stage::SeriesA => "series_a",
            Stage::Growth => "growth",
        }
    }
}

impl FromStr for Stage {
    type Err = VentureLensError;

    fn from_str(s: &str) -> Result<Self> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| VentureLensError::UnsupportedStage {
                stage: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Number,
    Text,
}

/// One required input and the range it must fall in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    pub description: &'static str,
}

impl FieldRule {
    pub const fn number(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Number,
            min: None,
            max: None,
            description,
        }
    }

    pub const fn text(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            min: None,
            max: None,
            description,
        }
    }

    pub const fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub const fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    fn accepts(&self, value: &Value) -> bool {
        match self.kind {
            FieldKind::Text => value.is_string(),
            FieldKind::Number => {
                let Some(n) = value.as_f64() else {
                    return false;
                };
                self.min.is_none_or(|min| n >= min) && self.max.is_none_or(|max| n <= max)
            }
        }
    }
}

/// True when `inputs` is an object carrying every rule's field with an
/// acceptable value.
pub fn validate_fields(rules: &[FieldRule], inputs: &Value) -> bool {
    let Some(map) = inputs.as_object() else {
        return false;
    };
    rules
        .iter()
        .all(|rule| map.get(rule.name).is_some_and(|v| rule.accepts(v)))
}

pub trait ValuationModel: Send + Sync {
    type Inputs: Serialize + DeserializeOwned;

    fn methodology(&self) -> &'static str;

    fn required_fields(&self) -> Vec<FieldRule>;

    /// Model arithmetic on inputs that already passed the field rules.
    fn compute(&self, inputs: &Self::Inputs) -> Result<ValuationResult>;

    /// Check `inputs` against the field rules, compute, and reject any
    /// non-finite figure in the result.
    fn calculate(&self, inputs: &Self::Inputs) -> Result<ValuationResult> {
        if !self.validate_inputs(&serde_json::to_value(inputs)?) {
            return Err(self.invalid_inputs());
        }
        let result = self.compute(inputs)?;
        ensure_finite(&result)?;
        Ok(result)
    }

    fn validate_inputs(&self, inputs: &Value) -> bool {
        validate_fields(&self.required_fields(), inputs)
    }

    fn invalid_inputs(&self) -> VentureLensError {
        VentureLensError::InvalidInputs {
            required: self
                .required_fields()
                .iter()
                .map(|r| r.name.to_string())
                .collect(),
        }
    }

    /// Check raw JSON against the field rules, then deserialize and calculate.
    fn calculate_json(&self, inputs: &Value) -> Result<ValuationResult> {
        if !self.validate_inputs(inputs) {
            return Err(self.invalid_inputs());
        }
        let typed: Self::Inputs = serde_json::from_value(inputs.clone())?;
        self.calculate(&typed)
    }
}

fn ensure_finite(result: &ValuationResult) -> Result<()> {
    let figures = [("value", result.value), ("confidence", result.confidence)];
    let non_finite = figures
        .into_iter()
        .chain(result.risk_factors.iter().map(|(k, v)| (k.as_str(), *v)))
        .find(|(_, v)| !v.is_finite());
    match non_finite {
        Some((name, v)) => Err(VentureLensError::Valuation {
            message: format!("{} is not a finite number ({})", name, v),
        }),
        None => Ok(()),
    }
}

pub(crate) fn mean(risk_factors: &BTreeMap<String, f64>) -> f64 {
    if risk_factors.is_empty() {
        return 0.0;
    }
    risk_factors.values().sum::<f64>() / risk_factors.len() as f64
}

/// `$1,234.56`. Negative amounts render as `$-1,234.56`.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("${}", amount);
    }
    let fixed = format!("{:.2}", amount.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("${}{}.{}", sign, grouped, frac)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(999.5), "$999.50");
        assert_eq!(format_currency(2_480_000.0), "$2,480,000.00");
        assert_eq!(format_currency(1234.567), "$1,234.57");
        assert_eq!(format_currency(-1500.0), "$-1,500.00");
    }

    #[test]
    fn stage_parses_known_names_only() {
        assert_eq!("series_a".parse::<Stage>().unwrap(), Stage::SeriesA);
        let err = "series_b".parse::<Stage>().unwrap_err();
        assert_eq!(err.to_string(), "Unsupported stage: series_b");
    }

    #[test]
    fn field_rules_check_presence_type_and_range() {
        let rules = [
            FieldRule::number("churn", "Monthly churn").min(0.01).max(1.0),
            FieldRule::text("region", "Operating region"),
        ];
        assert!(validate_fields(&rules, &json!({ "churn": 0.05, "region": "europe" })));
        assert!(!validate_fields(&rules, &json!({ "churn": 0.05 })));
        assert!(!validate_fields(&rules, &json!({ "churn": 0.001, "region": "europe" })));
        assert!(!validate_fields(&rules, &json!({ "churn": "5%", "region": "europe" })));
        assert!(!validate_fields(&rules, &json!({ "churn": 0.05, "region": 3 })));
        assert!(!validate_fields(&rules, &json!([0.05, "europe"])));
    }

    struct Unbounded;

    impl ValuationModel for Unbounded {
        type Inputs = Value;

        fn methodology(&self) -> &'static str {
            "Unbounded"
        }

        fn required_fields(&self) -> Vec<FieldRule> {
            vec![FieldRule::number("x", "Divisor")]
        }

        fn compute(&self, inputs: &Value) -> Result<ValuationResult> {
            let x = inputs["x"].as_f64().unwrap_or_default();
            Ok(ValuationResult {
                value: 1.0,
                confidence: 0.5,
                methodology: self.methodology().into(),
                risk_factors: BTreeMap::from([("ratio".to_string(), 1.0 / x)]),
                warnings: vec![],
            })
        }
    }

    #[test]
    fn non_finite_figures_are_rejected() {
        assert!(Unbounded.calculate(&json!({ "x": 2.0 })).is_ok());
        let err = Unbounded.calculate(&json!({ "x": 0.0 })).unwrap_err();
        assert_eq!(err.to_string(), "Valuation error: ratio is not a finite number (inf)");
    }

    #[test]
    fn typed_calculate_applies_field_rules() {
        let err = Unbounded.calculate(&json!({ "x": "two" })).unwrap_err();
        assert_eq!(err.to_string(), "Invalid inputs. Required fields: x");
    }

    #[test]
    fn result_display_uses_currency() {
        let result = ValuationResult {
            value: 2_480_000.0,
            confidence: 0.254,
            methodology: "Pre-Seed Scorecard".into(),
            risk_factors: BTreeMap::new(),
            warnings: vec![],
        };
        assert_eq!(
            result.to_string(),
            "Pre-Seed Scorecard: $2,480,000.00 (confidence 25%)"
        );
    }
}
