mod error;
mod prompt;
mod service;
mod session;
mod store;

pub use prompt::PromptComposer;
pub use service::ChatService;
pub use session::{ChatMode, SessionId};
pub use store::SessionStore;

use crate::{config::Config, llm::LanguageModel};
use std::sync::Arc;

pub fn create_service(config: &Config, model: Arc<dyn LanguageModel>) -> ChatService {
    ChatService::new(
        model,
        SessionStore::new(),
        PromptComposer::new(config.persona_prompt.clone(), config.analysis_prompt.clone()),
        config.chat_temperature,
        config.chat_max_tokens,
    )
}
