//! Conversation record types
//!
//! Identifiers, turns, tool-call records and guardrail verdicts shared by the
//! engine and anything that replays or renders a conversation. All records are
//! plain serde data so a conversation can be stored and replayed as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a registered agent
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AgentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifier of a lookup tool
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolId(String);

impl ToolId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ToolId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Request from an agent to run a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    pub tool_id: ToolId,
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl ToolRequest {
    /// Create a new request with no parameters
    pub fn new(tool_id: impl Into<ToolId>) -> Self {
        Self {
            tool_id: tool_id.into(),
            params: serde_json::Map::new(),
        }
    }

    /// Add a parameter
    pub fn with_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// Get a string parameter
    pub fn param_str(&self, key: &str) -> Result<&str, ToolError> {
        match self.params.get(key) {
            Some(serde_json::Value::String(s)) => Ok(s),
            Some(_) => Err(ToolError::InvalidParameter(key.to_string())),
            None => Err(ToolError::MissingParameter(key.to_string())),
        }
    }

    /// Get an optional string parameter
    pub fn param_str_opt(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(|v| v.as_str())
    }

    /// The parameters as a JSON object, as recorded on the resulting [`ToolCall`]
    pub fn input(&self) -> serde_json::Value {
        serde_json::Value::Object(self.params.clone())
    }
}

/// Outcome class of a tool invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    /// A record was found; output is non-empty
    Ok,
    /// The lookup ran but nothing matched; output is empty
    NotFound,
    /// The tool is unknown, misconfigured or was given malformed input
    Error,
}

impl fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolStatus::Ok => write!(f, "ok"),
            ToolStatus::NotFound => write!(f, "not_found"),
            ToolStatus::Error => write!(f, "error"),
        }
    }
}

/// Record of one tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool_id: ToolId,
    pub input: serde_json::Value,
    pub output: String,
    pub status: ToolStatus,
}

impl ToolCall {
    pub fn ok(request: &ToolRequest, output: impl Into<String>) -> Self {
        Self {
            tool_id: request.tool_id.clone(),
            input: request.input(),
            output: output.into(),
            status: ToolStatus::Ok,
        }
    }

    pub fn not_found(request: &ToolRequest) -> Self {
        Self {
            tool_id: request.tool_id.clone(),
            input: request.input(),
            output: String::new(),
            status: ToolStatus::NotFound,
        }
    }

    /// Error outcome; `output` carries the error description for the agent
    pub fn error(request: &ToolRequest, message: impl Into<String>) -> Self {
        Self {
            tool_id: request.tool_id.clone(),
            input: request.input(),
            output: message.into(),
            status: ToolStatus::Error,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ToolStatus::Ok
    }
}

/// Identifier of a guardrail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardrailId {
    Jailbreak,
    Relevance,
}

impl fmt::Display for GuardrailId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardrailId::Jailbreak => write!(f, "jailbreak"),
            GuardrailId::Relevance => write!(f, "relevance"),
        }
    }
}

/// Result of one guardrail evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardrailVerdict {
    pub guardrail_id: GuardrailId,
    pub tripped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl GuardrailVerdict {
    pub fn pass(guardrail_id: GuardrailId) -> Self {
        Self {
            guardrail_id,
            tripped: false,
            reason: None,
        }
    }

    pub fn trip(guardrail_id: GuardrailId, reason: impl Into<String>) -> Self {
        Self {
            guardrail_id,
            tripped: true,
            reason: Some(reason.into()),
        }
    }
}

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
    System,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Agent => write!(f, "agent"),
            Role::System => write!(f, "system"),
        }
    }
}

/// A transfer of control recorded on a system turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffRecord {
    pub from: AgentId,
    pub to: AgentId,
}

/// One committed unit of conversation history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    #[serde(default)]
    pub agent_id: Option<AgentId>,
    pub content: String,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default)]
    pub guardrail_verdicts: Vec<GuardrailVerdict>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handoff: Option<HandoffRecord>,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    fn new(role: Role, agent_id: Option<AgentId>, content: impl Into<String>) -> Self {
        Self {
            role,
            agent_id,
            content: content.into(),
            tool_calls: Vec::new(),
            guardrail_verdicts: Vec::new(),
            handoff: None,
            created_at: Utc::now(),
        }
    }

    /// A user utterance
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, None, content)
    }

    /// A released agent response
    pub fn agent(
        agent_id: AgentId,
        content: impl Into<String>,
        tool_calls: Vec<ToolCall>,
        guardrail_verdicts: Vec<GuardrailVerdict>,
    ) -> Self {
        Self {
            tool_calls,
            guardrail_verdicts,
            ..Self::new(Role::Agent, Some(agent_id), content)
        }
    }

    /// System turn auditing a transfer of control; attributed to the handing-off agent
    pub fn handoff(
        from: AgentId,
        to: AgentId,
        tool_calls: Vec<ToolCall>,
        guardrail_verdicts: Vec<GuardrailVerdict>,
    ) -> Self {
        let content = format!("Transferred from {} to {}", from, to);
        Self {
            tool_calls,
            guardrail_verdicts,
            handoff: Some(HandoffRecord {
                from: from.clone(),
                to,
            }),
            ..Self::new(Role::System, Some(from), content)
        }
    }

    /// Synthesized replacement for a candidate blocked by a guardrail
    pub fn refusal(
        agent_id: AgentId,
        content: impl Into<String>,
        guardrail_verdicts: Vec<GuardrailVerdict>,
    ) -> Self {
        Self {
            guardrail_verdicts,
            ..Self::new(Role::System, Some(agent_id), content)
        }
    }

    /// Apologetic turn emitted when a call aborts
    pub fn system_error(content: impl Into<String>) -> Self {
        Self::new(Role::System, None, content)
    }

    /// True when this turn replaced a candidate that tripped a guardrail
    pub fn is_refusal(&self) -> bool {
        self.guardrail_verdicts.iter().any(|v| v.tripped)
    }
}

/// Tool-specific errors
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Tool unavailable: {0}")]
    Unavailable(String),
}
