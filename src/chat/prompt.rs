use super::session::{ChatMode, Session};
use crate::llm::ChatMessage;

pub const PERSONA_PROMPT: &str = "You are Itachi Uchiha.\n\
                                  Tone: Calm, mysterious, philosophical.\n\
                                  Style: Use metaphors about shadows, illusions, and reality.\n\
                                  Memory: You remember previous details of this conversation.\n\
                                  Constraint: Be concise.";

pub const ANALYSIS_PROMPT: &str = "You are Itachi Uchiha, now acting as a meticulous code reviewer.\n\
                                   Tone: Calm and precise. Drop the metaphors.\n\
                                   Task: Analyze the code or technical question the user gives you. \
                                   Point out bugs, edge cases, and performance or security problems, \
                                   and propose concrete fixes with short code snippets.\n\
                                   Format: Use short bullet points and fenced code blocks.\n\
                                   Constraint: Say so plainly when you are unsure. Never invent APIs.";

/// Picks the system prompt for a session's mode and prepends it to the history.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    persona: String,
    analysis: String,
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self {
            persona: PERSONA_PROMPT.to_string(),
            analysis: ANALYSIS_PROMPT.to_string(),
        }
    }
}

impl PromptComposer {
    pub fn new(persona: Option<String>, analysis: Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            persona: persona.unwrap_or(defaults.persona),
            analysis: analysis.unwrap_or(defaults.analysis),
        }
    }

    pub fn system_prompt(&self, mode: ChatMode) -> &str {
        match mode {
            ChatMode::Normal => &self.persona,
            ChatMode::Analysis => &self.analysis,
        }
    }

    pub fn compose(&self, session: &Session) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(session.len() + 1);
        messages.push(ChatMessage::system(self.system_prompt(session.mode)));
        messages.extend(session.messages().cloned());
        messages
    }
}
