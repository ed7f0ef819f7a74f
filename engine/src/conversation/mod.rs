//! Conversation State
//!
//! The append-only turn history of one conversation, the pointer to the agent
//! currently in control, and the shared memory scratchpad agents read and
//! write through well-known keys. Pure data: the orchestrator owns the only
//! mutable copy while a message is being handled.

use sdk::errors::EngineError;
use sdk::types::{AgentId, Turn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Shared key-value scratchpad
pub type Memory = BTreeMap<String, String>;

/// Well-known memory keys
pub mod keys {
    pub const COURSE_TITLE: &str = "course_title";
    pub const TARGET_AUDIENCE: &str = "target_audience";
    pub const LEARNING_OBJECTIVES: &str = "learning_objectives";
    pub const OUTLINE: &str = "outline";
    pub const NOTES: &str = "notes";
}

/// State of a single conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    turns: Vec<Turn>,
    active_agent: AgentId,
    #[serde(default)]
    memory: Memory,
}

impl ConversationState {
    /// Create an empty conversation controlled by `entry_agent`
    pub fn new(entry_agent: AgentId) -> Self {
        Self {
            turns: Vec::new(),
            active_agent: entry_agent,
            memory: Memory::new(),
        }
    }

    /// All committed turns, oldest first
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The agent that will receive the next user message
    pub fn active_agent(&self) -> &AgentId {
        &self.active_agent
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Read one memory value
    pub fn recall(&self, key: &str) -> Option<&str> {
        self.memory.get(key).map(String::as_str)
    }

    /// True until the first turn is committed
    pub fn is_fresh(&self) -> bool {
        self.turns.is_empty()
    }

    /// Append a committed turn. History is never edited or shortened.
    pub(crate) fn push_turn(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub(crate) fn set_active_agent(&mut self, agent: AgentId) {
        self.active_agent = agent;
    }

    pub(crate) fn remember(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.memory.insert(key.into(), value.into());
    }

    /// Serialize the conversation as a JSON transcript
    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string_pretty(self).map_err(|e| EngineError::Serialization(e.to_string()))
    }

    /// Restore a conversation from a JSON transcript
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json).map_err(|e| EngineError::Serialization(e.to_string()))
    }
}
