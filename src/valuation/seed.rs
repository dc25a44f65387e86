use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VentureLensError};
use crate::valuation::{FieldRule, ValuationModel, ValuationResult, mean};

const DEFAULT_MULTIPLE: f64 = 12.0;
const MAX_HEALTHY_CAC_LTV: f64 = 0.3;
const BASE_CONFIDENCE: f64 = 0.8;
const CAC_WARNING_PENALTY: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedInputs {
    pub mrr: f64,
    pub mom_growth: f64,
    pub churn: f64,
    pub cac: f64,
    pub ltv: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacLtvCheck {
    pub ratio: f64,
    pub warning: bool,
    pub message: String,
}

/// Bottom-up DCF on recurring revenue.
#[derive(Debug, Clone, Default)]
pub struct SeedModel;

impl SeedModel {
    pub fn bottom_up_dcf(&self, mrr: f64, mom_growth: f64, churn: f64) -> Result<f64> {
        if churn <= 0.0 {
            return Err(VentureLensError::Valuation {
                message: "Churn rate must be greater than 0".to_string(),
            });
        }
        let annual_revenue = mrr * (1.0 + mom_growth).powi(12);
        let multiple = DEFAULT_MULTIPLE * (1.0 + mom_growth) / churn;
        Ok(annual_revenue * multiple)
    }

    pub fn cac_ratio_alert(&self, cac: f64, ltv: f64) -> CacLtvCheck {
        let ratio = if ltv > 0.0 { cac / ltv } else { f64::INFINITY };
        if ratio > MAX_HEALTHY_CAC_LTV {
            CacLtvCheck {
                ratio,
                warning: true,
                message: format!(
                    "Warning: CAC/LTV ratio of {:.2} exceeds recommended maximum of {}",
                    ratio, MAX_HEALTHY_CAC_LTV
                ),
            }
        } else {
            CacLtvCheck {
                ratio,
                warning: false,
                message: format!("Healthy CAC/LTV ratio of {:.2}", ratio),
            }
        }
    }
}

impl ValuationModel for SeedModel {
    type Inputs = SeedInputs;

    fn methodology(&self) -> &'static str {
        "Seed Bottom-up DCF"
    }

    fn required_fields(&self) -> Vec<FieldRule> {
        vec![
            FieldRule::number("mrr", "Monthly Recurring Revenue in USD").min(10_000.0),
            FieldRule::number("mom_growth", "Month over Month growth rate (as decimal)")
                .min(0.0)
                .max(1.0),
            FieldRule::number("churn", "Monthly churn rate (as decimal)")
                .min(0.01)
                .max(1.0),
            FieldRule::number("cac", "Customer Acquisition Cost in USD").min(0.0),
            FieldRule::number("ltv", "Customer Lifetime Value in USD").min(0.0),
        ]
    }

    fn compute(&self, inputs: &SeedInputs) -> Result<ValuationResult> {
        let value = self.bottom_up_dcf(inputs.mrr, inputs.mom_growth, inputs.churn)?;
        let cac = self.cac_ratio_alert(inputs.cac, inputs.ltv);

        let mut risk_factors = BTreeMap::new();
        risk_factors.insert("churn_risk".to_string(), (inputs.churn * 12.0).min(1.0));
        risk_factors.insert(
            "growth_sustainability".to_string(),
            1.0 / (1.0 + inputs.mom_growth),
        );
        risk_factors.insert(
            "unit_economics".to_string(),
            if inputs.ltv > 0.0 {
                inputs.cac / inputs.ltv
            } else {
                1.0
            },
        );

        let mut base_confidence = BASE_CONFIDENCE;
        let mut warnings = Vec::new();
        if cac.warning {
            tracing::warn!("{}", cac.message);
            base_confidence *= CAC_WARNING_PENALTY;
            warnings.push(cac.message);
        }
        let confidence = base_confidence * (1.0 - mean(&risk_factors));

        Ok(ValuationResult {
            value,
            confidence,
            methodology: self.methodology().to_string(),
            risk_factors,
            warnings,
        })
    }
}
