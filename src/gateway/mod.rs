//! AI-assisted assessment gateway.
//!
//! Each call sends exactly one chat request (system instruction + serialized
//! payload, JSON output requested) through the injected [`ChatModel`] and parses
//! the reply as JSON. Whatever goes wrong underneath, the caller only ever sees
//! [`VentureLensError::AssessmentFailed`] for the operation it attempted; the
//! real cause is logged here and dropped.

pub mod payload;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::clients::{ChatMessage, ChatModel, ChatRequest, ModelError};
use crate::error::{AssessmentOperation, Result, VentureLensError};

pub use payload::{AssessmentPayload, BusinessMetrics, BusinessModel, MarketContext, merge_context};

pub const ASSESS_BUSINESS_MODEL_INSTRUCTION: &str = "You are an experienced venture analyst. \
Assess the business model described in the user message for the given industry and, if provided, region. \
Respond with a JSON object containing: \"score\" (number between 0 and 1), \"strengths\" (array of strings), \
\"weaknesses\" (array of strings), \"risks\" (array of strings) and \"recommendations\" (array of strings).";

pub const VALIDATE_METRICS_INSTRUCTION: &str = "You are a financial analyst specialising in early-stage companies. \
Validate the business metrics in the user message against typical benchmarks for the given industry and, if provided, region. \
Respond with a JSON object containing: \"valid\" (boolean), \"issues\" (array of objects with \"metric\" and \"message\"), \
\"benchmarks\" (object mapping metric name to a typical range) and \"summary\" (string).";

/// Everything that can go wrong below the gateway boundary.
#[derive(Debug, Error)]
enum Fault {
    #[error("could not serialize payload: {0}")]
    Payload(serde_json::Error),
    #[error("model call failed: {0}")]
    Model(#[from] ModelError),
    #[error("reply is not valid JSON: {0}")]
    Reply(serde_json::Error),
    #[error("reply does not match expected shape: {0}")]
    Shape(serde_json::Error),
}

#[derive(Clone)]
pub struct AssessmentGateway {
    model: Arc<dyn ChatModel>,
}

impl AssessmentGateway {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Send `payload` under `system_instruction` and return the parsed reply.
    ///
    /// An empty or absent reply yields `{}`.
    pub async fn request<P: Serialize + ?Sized>(
        &self,
        operation: AssessmentOperation,
        system_instruction: &str,
        payload: &P,
    ) -> Result<Value> {
        self.exchange(system_instruction, payload)
            .await
            .map_err(|fault| fail(operation, fault))
    }

    /// Like [`request`](Self::request) but deserializes the reply into `T`.
    /// A reply that does not fit `T` fails the same way a transport error does.
    pub async fn request_as<T, P>(
        &self,
        operation: AssessmentOperation,
        system_instruction: &str,
        payload: &P,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let outcome = match self.exchange(system_instruction, payload).await {
            Ok(value) => serde_json::from_value(value).map_err(Fault::Shape),
            Err(fault) => Err(fault),
        };
        outcome.map_err(|fault| fail(operation, fault))
    }

    pub async fn assess_business_model(
        &self,
        model: &BusinessModel,
        context: &MarketContext,
    ) -> Result<Value> {
        let operation = AssessmentOperation::AssessBusinessModel;
        let body = merge_context(model, context).map_err(|e| fail(operation, Fault::Payload(e)))?;
        self.request(operation, ASSESS_BUSINESS_MODEL_INSTRUCTION, &body)
            .await
    }

    pub async fn validate_metrics(
        &self,
        metrics: &BusinessMetrics,
        context: &MarketContext,
    ) -> Result<Value> {
        let operation = AssessmentOperation::ValidateMetrics;
        let body =
            merge_context(metrics, context).map_err(|e| fail(operation, Fault::Payload(e)))?;
        self.request(operation, VALIDATE_METRICS_INSTRUCTION, &body)
            .await
    }

    /// Dispatch on the payload kind.
    pub async fn assess(
        &self,
        payload: &AssessmentPayload,
        context: &MarketContext,
    ) -> Result<Value> {
        match payload {
            AssessmentPayload::BusinessModel(model) => {
                self.assess_business_model(model, context).await
            }
            AssessmentPayload::Metrics(metrics) => self.validate_metrics(metrics, context).await,
        }
    }

    async fn exchange<P: Serialize + ?Sized>(
        &self,
        system_instruction: &str,
        payload: &P,
    ) -> std::result::Result<Value, Fault> {
        let user = serde_json::to_string(payload).map_err(Fault::Payload)?;
        let request = ChatRequest {
            messages: vec![
                ChatMessage::system(system_instruction),
                ChatMessage::user(user),
            ],
            json_output: true,
        };
        let reply = self.model.complete(&request).await?;
        parse_reply(reply.as_deref()).map_err(Fault::Reply)
    }
}

/// Empty or missing reply text is an empty object, not an error.
pub fn parse_reply(reply: Option<&str>) -> serde_json::Result<Value> {
    match reply.map(str::trim) {
        None | Some("") => Ok(Value::Object(Map::new())),
        Some(text) => serde_json::from_str(text),
    }
}

fn fail(operation: AssessmentOperation, fault: Fault) -> VentureLensError {
    tracing::error!("{}: {}", operation.failure_message(), fault);
    VentureLensError::assessment_failed(operation)
}
