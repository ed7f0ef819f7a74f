//! Agents
//!
//! An agent is a specialist behavior unit: a fixed definition (instructions,
//! allowed tools, allowed handoff targets) plus a `generate` capability that
//! turns the conversation context into a candidate response. The orchestrator
//! never branches on which agent is active; it only calls `generate` through
//! the registry.

pub mod content_expert;
pub mod critic;
pub mod faq;
pub mod instructional_design;
pub mod intent;
pub mod registry;
pub mod triage;

pub use content_expert::ContentExpertAgent;
pub use critic::CriticAgent;
pub use faq::FaqAgent;
pub use instructional_design::InstructionalDesignAgent;
pub use intent::Intent;
pub use registry::{AgentRegistry, RegisteredAgent, RegistryBuilder};
pub use triage::TriageAgent;

use crate::conversation::Memory;
use sdk::types::{AgentId, Role, ToolCall, ToolId, ToolRequest, Turn};
use std::collections::BTreeSet;

/// Ids of the built-in agents
pub mod ids {
    pub const TRIAGE: &str = "triage";
    pub const INSTRUCTIONAL_DESIGN: &str = "instructional_design";
    pub const FAQ: &str = "faq";
    pub const CONTENT_EXPERT: &str = "content_expert";
    pub const CRITIC: &str = "critic";
}

/// Immutable description of an agent's capabilities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDefinition {
    pub id: AgentId,
    pub display_name: String,
    pub instructions: String,
    pub allowed_tools: BTreeSet<ToolId>,
    pub allowed_handoffs: BTreeSet<AgentId>,
    /// Memory defaults set when control is handed to this agent; keys that
    /// already hold a value are left alone
    pub handoff_memory: Vec<(String, String)>,
}

impl AgentDefinition {
    pub fn new(
        id: impl Into<AgentId>,
        display_name: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            instructions: instructions.into(),
            allowed_tools: BTreeSet::new(),
            allowed_handoffs: BTreeSet::new(),
            handoff_memory: Vec::new(),
        }
    }

    pub fn with_tools<'a>(mut self, tools: impl IntoIterator<Item = &'a str>) -> Self {
        self.allowed_tools.extend(tools.into_iter().map(ToolId::from));
        self
    }

    pub fn with_handoffs<'a>(mut self, targets: impl IntoIterator<Item = &'a str>) -> Self {
        self.allowed_handoffs
            .extend(targets.into_iter().map(AgentId::from));
        self
    }

    pub fn with_handoff_memory(mut self, key: &str, value: &str) -> Self {
        self.handoff_memory.push((key.to_string(), value.to_string()));
        self
    }

    pub fn allows_tool(&self, tool: &ToolId) -> bool {
        self.allowed_tools.contains(tool)
    }

    pub fn allows_handoff(&self, target: &AgentId) -> bool {
        self.allowed_handoffs.contains(target)
    }
}

/// Request to transfer control to another agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffDirective {
    pub target: AgentId,
    pub reason: String,
}

/// What an agent produced for one generation step
///
/// A candidate with a handoff directive is resolved as a handoff even if it
/// also requests tools; a candidate with tool requests and no handoff sends
/// the orchestrator into tool invocation; otherwise `text` is the final
/// response. Memory writes only take effect if the candidate is accepted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    pub text: String,
    pub tool_requests: Vec<ToolRequest>,
    pub handoff: Option<HandoffDirective>,
    pub memory_writes: Vec<(String, String)>,
}

impl Candidate {
    /// A final textual response
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Pause generation until the given tools have answered
    pub fn use_tools(requests: Vec<ToolRequest>) -> Self {
        Self {
            tool_requests: requests,
            ..Self::default()
        }
    }

    /// Transfer control to `target`
    pub fn handoff(target: impl Into<AgentId>, reason: impl Into<String>) -> Self {
        Self {
            handoff: Some(HandoffDirective {
                target: target.into(),
                reason: reason.into(),
            }),
            ..Self::default()
        }
    }

    /// Text used if the candidate ends up committed as-is
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Stage a memory write applied when the candidate is accepted
    pub fn remember(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.memory_writes.push((key.into(), value.into()));
        self
    }

    pub fn needs_tools(&self) -> bool {
        self.handoff.is_none() && !self.tool_requests.is_empty()
    }
}

/// Everything an agent may look at while generating
#[derive(Debug, Clone, Copy)]
pub struct AgentContext<'a> {
    pub definition: &'a AgentDefinition,
    /// The user message being handled
    pub user_message: &'a str,
    /// Committed history including the current user turn
    pub history: &'a [Turn],
    pub memory: &'a Memory,
    /// Tool results fed back so far in this generation step, in request order
    pub tool_results: &'a [ToolCall],
    /// Number of tool rounds already completed for this generation step
    pub round: usize,
}

impl<'a> AgentContext<'a> {
    pub fn recall(&self, key: &str) -> Option<&'a str> {
        self.memory.get(key).map(String::as_str)
    }

    /// Latest result for `tool`, if it has been called in this step
    pub fn tool_result(&self, tool: &str) -> Option<&'a ToolCall> {
        self.tool_results
            .iter()
            .rev()
            .find(|call| call.tool_id.as_str() == tool)
    }

    /// Most recent response released by any agent before this message
    pub fn last_agent_reply(&self) -> Option<&'a Turn> {
        self.history
            .iter()
            .rev()
            .find(|turn| turn.role == Role::Agent)
    }
}

/// Capability every agent implements
pub trait Agent: Send + Sync {
    /// Produce a candidate response for the current context
    fn generate(&self, ctx: &AgentContext<'_>) -> Candidate;

    /// Instructions in effect for this conversation
    fn instructions(&self, definition: &AgentDefinition, _memory: &Memory) -> String {
        definition.instructions.clone()
    }
}
