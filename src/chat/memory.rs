use crate::models::ChatMessage;
use crate::utils::estimate_tokens;

/// Conversation history bounded by a token budget
///
/// When the budget is exceeded the oldest messages are dropped first.
/// The newest message is always kept, even if it alone is over budget.
#[derive(Debug, Clone)]
pub struct ChatMemory {
    token_limit: usize,
    messages: Vec<ChatMessage>,
}

impl ChatMemory {
    pub fn new(token_limit: usize) -> Self {
        Self {
            token_limit,
            messages: Vec::new(),
        }
    }

    pub fn put(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.trim();
    }

    /// Messages in chronological order
    pub fn get(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn reset(&mut self) {
        self.messages.clear();
    }

    pub fn token_count(&self) -> usize {
        self.messages.iter().map(|m| estimate_tokens(&m.content)).sum()
    }

    pub fn token_limit(&self) -> usize {
        self.token_limit
    }

    fn trim(&mut self) {
        let mut total = self.token_count();
        let mut drop = 0;
        while total > self.token_limit && drop + 1 < self.messages.len() {
            total -= estimate_tokens(&self.messages[drop].content);
            drop += 1;
        }
        if drop > 0 {
            tracing::debug!(dropped = drop, limit = self.token_limit, "chat memory over budget");
            self.messages.drain(..drop);
        }
    }
}
