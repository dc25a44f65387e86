//! Typed assessment payloads and the market context merged into them

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Industry and region the model should benchmark against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketContext {
    pub industry: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl MarketContext {
    pub fn new(industry: impl Into<String>) -> Self {
        Self {
            industry: industry.into(),
            region: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

/// A free-form business-model description. Unknown fields are carried through
/// to the model untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessModel {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_market: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_proposition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitive_advantage: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Business metrics as reported by the founder. Every figure is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mrr: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mom_growth: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub churn: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cac: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ltv: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub burn_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runway_months: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customers: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The known payload kinds the gateway can assess.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssessmentPayload {
    BusinessModel(BusinessModel),
    Metrics(BusinessMetrics),
}

/// Merge `payload` with `context` into the single JSON object sent as the user
/// message. Context keys win over payload keys of the same name. A payload that
/// does not serialize to an object is nested under `"payload"`.
pub fn merge_context<P: Serialize + ?Sized>(
    payload: &P,
    context: &MarketContext,
) -> serde_json::Result<Value> {
    let mut body = match serde_json::to_value(payload)? {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("payload".to_string(), other);
            map
        }
    };
    body.insert(
        "industry".to_string(),
        Value::String(context.industry.clone()),
    );
    if let Some(ref region) = context.region {
        body.insert("region".to_string(), Value::String(region.clone()));
    }
    Ok(Value::Object(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn metrics_merge_with_industry_only() {
        let metrics = BusinessMetrics {
            revenue: Some(100000.0),
            ..Default::default()
        };
        let body = merge_context(&metrics, &MarketContext::new("saas")).unwrap();
        assert_eq!(body, json!({ "revenue": 100000.0, "industry": "saas" }));
    }

    #[test]
    fn region_is_included_when_present() {
        let model = BusinessModel {
            description: "B2B invoicing".into(),
            ..Default::default()
        };
        let ctx = MarketContext::new("fintech").with_region("europe");
        let body = merge_context(&model, &ctx).unwrap();
        assert_eq!(body["region"], "europe");
        assert_eq!(body["industry"], "fintech");
        assert_eq!(body["description"], "B2B invoicing");
        assert!(body.get("target_market").is_none());
    }

    #[test]
    fn context_overrides_colliding_payload_keys() {
        let mut metrics = BusinessMetrics::default();
        metrics.extra.insert("industry".into(), json!("retail"));
        let body = merge_context(&metrics, &MarketContext::new("saas")).unwrap();
        assert_eq!(body, json!({ "industry": "saas" }));
    }

    #[test]
    fn non_object_payload_is_nested() {
        let body = merge_context(&json!([1, 2, 3]), &MarketContext::new("saas")).unwrap();
        assert_eq!(body, json!({ "payload": [1, 2, 3], "industry": "saas" }));
    }

    #[test]
    fn unknown_fields_survive_deserialization() {
        let metrics: BusinessMetrics =
            serde_json::from_value(json!({ "mrr": 12000.0, "nps": 61 })).unwrap();
        assert_eq!(metrics.mrr, Some(12000.0));
        assert_eq!(metrics.extra.get("nps"), Some(&json!(61)));
    }

    #[test]
    fn payload_is_tagged_by_kind() {
        let payload: AssessmentPayload = serde_json::from_value(json!({
            "kind": "metrics",
            "revenue": 5000.0
        }))
        .unwrap();
        match payload {
            AssessmentPayload::Metrics(m) => assert_eq!(m.revenue, Some(5000.0)),
            other => panic!("unexpected payload: {:?}", other),
        }
    }
}
