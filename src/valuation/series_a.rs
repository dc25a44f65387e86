use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VentureLensError};
use crate::valuation::{FieldRule, ValuationModel, ValuationResult, mean};

const DCF_WEIGHT: f64 = 0.6;
const COMPARABLE_WEIGHT: f64 = 0.4;
/// WACC at which cost-of-capital risk reaches 1.
const HIGH_WACC: f64 = 0.15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesAInputs {
    pub dcf_value: f64,
    pub comparable_value: f64,
    pub equity_ratio: f64,
    pub debt_ratio: f64,
    pub cost_of_equity: f64,
    pub cost_of_debt: f64,
    pub tax_rate: f64,
}

/// Weighted blend of a DCF and a comparables valuation.
#[derive(Debug, Clone, Default)]
pub struct SeriesAModel;

impl SeriesAModel {
    pub fn hybrid_valuation(&self, dcf_value: f64, comparable_value: f64) -> f64 {
        dcf_value * DCF_WEIGHT + comparable_value * COMPARABLE_WEIGHT
    }

    /// E/V * Re + D/V * Rd * (1 - Tc)
    pub fn wacc(
        &self,
        equity_ratio: f64,
        debt_ratio: f64,
        cost_of_equity: f64,
        cost_of_debt: f64,
        tax_rate: f64,
    ) -> f64 {
        equity_ratio * cost_of_equity + debt_ratio * cost_of_debt * (1.0 - tax_rate)
    }
}

impl ValuationModel for SeriesAModel {
    type Inputs = SeriesAInputs;

    fn methodology(&self) -> &'static str {
        "Series A Hybrid"
    }

    fn required_fields(&self) -> Vec<FieldRule> {
        vec![
            FieldRule::number("dcf_value", "DCF valuation in USD").min(0.0),
            FieldRule::number("comparable_value", "Comparables valuation in USD").min(0.0),
            FieldRule::number("equity_ratio", "Equity share of capital (E/V)")
                .min(0.0)
                .max(1.0),
            FieldRule::number("debt_ratio", "Debt share of capital (D/V)")
                .min(0.0)
                .max(1.0),
            FieldRule::number("cost_of_equity", "Cost of equity (as decimal)").min(0.0),
            FieldRule::number("cost_of_debt", "Cost of debt (as decimal)").min(0.0),
            FieldRule::number("tax_rate", "Corporate tax rate (as decimal)")
                .min(0.0)
                .max(1.0),
        ]
    }

    fn compute(&self, inputs: &SeriesAInputs) -> Result<ValuationResult> {
        let larger = inputs.dcf_value.max(inputs.comparable_value);
        if larger <= 0.0 {
            return Err(VentureLensError::Valuation {
                message: "At least one of dcf_value and comparable_value must be positive"
                    .to_string(),
            });
        }

        let wacc = self.wacc(
            inputs.equity_ratio,
            inputs.debt_ratio,
            inputs.cost_of_equity,
            inputs.cost_of_debt,
            inputs.tax_rate,
        );
        let value = self.hybrid_valuation(inputs.dcf_value, inputs.comparable_value);

        let mut risk_factors = BTreeMap::new();
        risk_factors.insert("capital_structure_risk".to_string(), inputs.debt_ratio);
        risk_factors.insert("cost_of_capital_risk".to_string(), wacc / HIGH_WACC);
        risk_factors.insert(
            "valuation_divergence".to_string(),
            (inputs.dcf_value - inputs.comparable_value).abs() / larger,
        );

        let confidence = 0.9 * (1.0 - mean(&risk_factors));

        Ok(ValuationResult {
            value,
            confidence,
            methodology: self.methodology().to_string(),
            risk_factors,
            warnings: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> SeriesAInputs {
        SeriesAInputs {
            dcf_value: 20_000_000.0,
            comparable_value: 16_000_000.0,
            equity_ratio: 0.8,
            debt_ratio: 0.2,
            cost_of_equity: 0.12,
            cost_of_debt: 0.06,
            tax_rate: 0.25,
        }
    }

    #[test]
    fn wacc_applies_tax_shield_to_debt() {
        let wacc = SeriesAModel.wacc(0.8, 0.2, 0.12, 0.06, 0.25);
        assert!((wacc - (0.096 + 0.009)).abs() < 1e-12);
    }

    #[test]
    fn hybrid_blends_dcf_and_comparables() {
        let result = SeriesAModel.calculate(&inputs()).unwrap();
        assert!((result.value - 18_400_000.0).abs() < 1e-6);
        assert_eq!(result.methodology, "Series A Hybrid");

        let risks = [0.2, 0.105 / 0.15, 0.2];
        let expected = 0.9 * (1.0 - risks.iter().sum::<f64>() / 3.0);
        assert!((result.confidence - expected).abs() < 1e-9);
        assert!((result.risk_factors["valuation_divergence"] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn both_valuations_zero_is_an_error() {
        let mut inputs = inputs();
        inputs.dcf_value = 0.0;
        inputs.comparable_value = 0.0;
        assert!(SeriesAModel.calculate(&inputs).is_err());
    }
}
