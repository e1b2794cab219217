use chrono::{DateTime, Local};

pub const RECENT_TURN_COUNT: usize = 5;

#[derive(Debug, Clone)]
pub struct ConversationTurn {
    pub question: String,
    pub generated_sql: String,
    pub asked_at: DateTime<Local>,
}

impl ConversationTurn {
    pub fn format_for_display(&self) -> String {
        format!(
            "[{}] Q: {}\n{}",
            self.asked_at.format("%H:%M:%S"),
            self.question,
            self.generated_sql
        )
    }
}

/// Append-only log of answered questions, kept for the lifetime of the process.
#[derive(Debug, Default)]
pub struct QueryHistory {
    turns: Vec<ConversationTurn>,
}

impl QueryHistory {
    pub fn record(&mut self, question: &str, generated_sql: &str) {
        self.turns.push(ConversationTurn {
            question: question.to_string(),
            generated_sql: generated_sql.to_string(),
            asked_at: Local::now(),
        });
    }

    /// Newest first.
    pub fn recent(&self, n: usize) -> Vec<ConversationTurn> {
        self.turns.iter().rev().take(n).cloned().collect()
    }
}
