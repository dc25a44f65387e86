//! In-memory model for tests and offline wiring

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::clients::traits::{ChatModel, ChatRequest, ModelError};

type Responder = dyn Fn(&ChatRequest) -> Result<Option<String>, ModelError> + Send + Sync;

/// A `ChatModel` whose replies are computed by a closure. Every request it
/// receives is recorded.
#[derive(Clone)]
pub struct ScriptedModel {
    responder: Arc<Responder>,
    seen: Arc<Mutex<Vec<ChatRequest>>>,
}

impl ScriptedModel {
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&ChatRequest) -> Result<Option<String>, ModelError> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(f),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always answer with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::from_fn(move |_| Ok(Some(text.clone())))
    }

    /// Always answer with no content.
    pub fn silent() -> Self {
        Self::from_fn(|_| Ok(None))
    }

    /// Always fail with a transport error.
    pub fn failing(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::from_fn(move |_| Err(ModelError::Transport(message.clone())))
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, request: &ChatRequest) -> Result<Option<String>, ModelError> {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());
        // Yield so concurrent callers interleave the way they would on a socket.
        tokio::task::yield_now().await;
        (self.responder)(request)
    }
}
