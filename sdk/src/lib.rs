//! Coursewright SDK
//!
//! Shared library providing the conversation record types, the error taxonomy
//! and the tool trait used by the engine and by anything that replays or
//! renders a conversation.

/// Error types and handling
pub mod errors;

/// Lookup tool trait
pub mod tool;

/// Conversation record types
pub mod types;

// Re-export commonly used types
pub use errors::{EngineError, EngineErrorExt};
pub use tool::LookupTool;
pub use types::{
    AgentId, GuardrailId, GuardrailVerdict, HandoffRecord, Role, ToolCall, ToolError, ToolId,
    ToolRequest, ToolStatus, Turn,
};
