pub mod openai;
pub mod scripted;
pub mod traits;

pub use openai::OpenAiChatClient;
pub use scripted::ScriptedModel;
pub use traits::{ChatMessage, ChatModel, ChatRequest, ModelError, Role};
