//! Sliding-window conversation memory.
//!
//! Keeps the last `k` completed turns, oldest evicted first. Only the
//! user's original question is stored, never the retrieval-augmented
//! prompt that was actually sent to the model.

use cvagent_core::message::Message;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One completed exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub human_input: String,
    pub agent_output: String,
}

impl ConversationTurn {
    pub fn new(human_input: impl Into<String>, agent_output: impl Into<String>) -> Self {
        Self {
            human_input: human_input.into(),
            agent_output: agent_output.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMemory {
    window: usize,
    turns: VecDeque<ConversationTurn>,
}

impl ConversationMemory {
    /// Memory that retains at most `window` turns. A window of 0 retains nothing.
    pub fn new(window: usize) -> Self {
        Self {
            window,
            turns: VecDeque::new(),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Record a turn, evicting the oldest ones past the window.
    pub fn append(&mut self, turn: ConversationTurn) {
        if self.window == 0 {
            return;
        }
        self.turns.push_back(turn);
        while self.turns.len() > self.window {
            self.turns.pop_front();
        }
    }

    /// Retained turns, oldest first.
    pub fn recent(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Alternating user/assistant messages for the retained turns.
    pub fn to_messages(&self) -> Vec<Message> {
        self.turns
            .iter()
            .flat_map(|t| [Message::user(&t.human_input), Message::assistant(&t.agent_output)])
            .collect()
    }
}
