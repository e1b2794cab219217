use crate::llm::ChatMessage;
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// Non-system messages kept per conversation.
pub const HISTORY_LIMIT: usize = 10;

pub type SessionId = u64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChatMode {
    #[default]
    Normal,
    Analysis,
}

impl ChatMode {
    pub fn toggled(self) -> Self {
        match self {
            ChatMode::Normal => ChatMode::Analysis,
            ChatMode::Analysis => ChatMode::Normal,
        }
    }
}

impl fmt::Display for ChatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatMode::Normal => f.write_str("normal"),
            ChatMode::Analysis => f.write_str("analysis"),
        }
    }
}

impl FromStr for ChatMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" | "chat" => Ok(ChatMode::Normal),
            "analysis" | "code" => Ok(ChatMode::Analysis),
            other => Err(format!("unknown mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    messages: VecDeque<ChatMessage>,
    pub mode: ChatMode,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            messages: VecDeque::with_capacity(HISTORY_LIMIT + 1),
            mode: ChatMode::Normal,
        }
    }

    /// Appends and evicts from the front until the history fits the limit.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push_back(message);
        while self.messages.len() > HISTORY_LIMIT {
            self.messages.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.mode = ChatMode::Normal;
    }

    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_evicts_oldest_first() {
        let mut session = Session::new(1);
        for i in 0..13 {
            session.push(ChatMessage::user(format!("m{}", i)));
            assert!(session.len() <= HISTORY_LIMIT);
        }

        let contents: Vec<&str> = session.messages().map(|m| m.content.as_str()).collect();
        assert_eq!(contents.first(), Some(&"m3"));
        assert_eq!(contents.last(), Some(&"m12"));
    }

    #[test]
    fn clear_resets_mode() {
        let mut session = Session::new(7);
        session.mode = ChatMode::Analysis;
        session.push(ChatMessage::user("hi"));

        session.clear();

        assert!(session.is_empty());
        assert_eq!(session.mode, ChatMode::Normal);
    }

    #[test]
    fn parses_and_toggles_modes() {
        assert_eq!("Analysis".parse::<ChatMode>(), Ok(ChatMode::Analysis));
        assert_eq!(" normal ".parse::<ChatMode>(), Ok(ChatMode::Normal));
        assert!("loud".parse::<ChatMode>().is_err());
        assert_eq!(ChatMode::Normal.toggled(), ChatMode::Analysis);
        assert_eq!(ChatMode::Analysis.toggled(), ChatMode::Normal);
    }
}
