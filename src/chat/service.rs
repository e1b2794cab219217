use super::error::ChatError;
use super::prompt::PromptComposer;
use super::session::{ChatMode, SessionId};
use super::store::SessionStore;
use crate::llm::{LanguageModel, ModelRequest};
use std::sync::Arc;
use tracing::{info, warn};

pub struct ChatService {
    model: Arc<dyn LanguageModel>,
    store: Arc<SessionStore>,
    composer: PromptComposer,
    temperature: f64,
    max_tokens: u64,
}

impl ChatService {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        store: Arc<SessionStore>,
        composer: PromptComposer,
        temperature: f64,
        max_tokens: u64,
    ) -> Self {
        Self {
            model,
            store,
            composer,
            temperature,
            max_tokens,
        }
    }

    /// One conversation turn: record the user message, ask the model with the
    /// mode's system prompt and the bounded history, record the reply.
    ///
    /// Turns on the same id run one at a time. The user message stays in the
    /// history when the model call fails.
    pub async fn respond(&self, id: SessionId, text: &str) -> Result<String, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let _turn = self.store.lock_turn(id).await;

        self.store.append_user(id, text).await;
        let session = self.store.get_or_create(id).await;
        let messages = self.composer.compose(&session);

        let request =
            ModelRequest::new(messages, self.temperature).with_max_tokens(self.max_tokens);
        let reply = match self.model.complete(request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Model call failed for session {}: {}", id, e);
                return Err(e.into());
            }
        };

        self.store.append_assistant(id, &reply).await;
        info!("Session {} answered in {} mode", id, session.mode);
        Ok(reply)
    }

    pub async fn reset(&self, id: SessionId) {
        let _turn = self.store.lock_turn(id).await;
        self.store.reset(id).await;
    }

    pub async fn set_mode(&self, id: SessionId, mode: ChatMode) {
        let _turn = self.store.lock_turn(id).await;
        self.store.set_mode(id, mode).await;
    }

    pub async fn toggle_mode(&self, id: SessionId) -> ChatMode {
        let _turn = self.store.lock_turn(id).await;
        self.store.toggle_mode(id).await
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }
}
