pub mod clients;
pub mod config;
pub mod error;
pub mod gateway;
pub mod valuation;

use tracing_subscriber::EnvFilter;

pub use clients::{ChatModel, OpenAiChatClient};
pub use config::Config;
pub use error::{AssessmentOperation, Result, VentureLensError};
pub use gateway::{AssessmentGateway, AssessmentPayload, BusinessMetrics, BusinessModel, MarketContext};
pub use valuation::{Stage, ValuationEngine, ValuationInputs, ValuationResult};

/// Install the global fmt subscriber. `VENTURE_LENS_LOG` beats the configured level.
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_env("VENTURE_LENS_LOG")
        .or_else(|_| EnvFilter::try_new(&config.runtime.log_level))
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_LEVEL));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Build a gateway backed by the configured chat-completions endpoint.
pub fn gateway_from_config(config: &Config) -> AssessmentGateway {
    let client = OpenAiChatClient::new(&config.model);
    tracing::info!("Assessment gateway using model {}", client.model());
    AssessmentGateway::new(std::sync::Arc::new(client))
}
