//! Error types and handling
//!
//! This module provides the error type used throughout the Coursewright engine.
//! The `EngineErrorExt` trait classifies every error so the orchestrator can
//! decide what to do with it:
//!
//! - **Recoverable conversational events** (`GuardrailTripped`, `ToolNotFound`,
//!   `ToolError`, `HandoffInvalid`) are resolved inside a call and never reach
//!   the caller.
//! - **Fatal-for-the-call** errors (`HandoffLoopExceeded`, `ToolLoopExceeded`)
//!   abort the current message with a single apologetic system turn; the
//!   conversation stays usable.
//! - **Configuration** errors indicate a deployment defect and are returned to
//!   the caller as-is.
//!
//! User hints never contain raw identifiers or internal details.

use thiserror::Error;

/// Trait for engine error extensions
pub trait EngineErrorExt {
    /// Returns a user-friendly hint for the error
    fn user_hint(&self) -> &str;

    /// Returns whether the conversation can carry on normally after this error
    fn is_recoverable(&self) -> bool;

    /// Returns whether the error indicates a deployment defect rather than a
    /// conversational event
    fn is_configuration(&self) -> bool;
}

/// Main engine error type
///
/// # Examples
///
/// ```
/// use sdk::errors::{EngineError, EngineErrorExt};
///
/// let error = EngineError::ToolNotFound("faq_lookup".to_string());
/// println!("Hint: {}", error.user_hint());
/// assert!(error.is_recoverable());
///
/// let fatal_error = EngineError::HandoffLoopExceeded { limit: 4 };
/// assert!(!fatal_error.is_recoverable());
/// assert!(!fatal_error.is_configuration());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Malformed agent registry: {0}")]
    MalformedRegistry(String),

    // Caller errors
    #[error("User message must not be empty")]
    EmptyMessage,

    #[error("Unknown conversation: {0}")]
    UnknownConversation(String),

    // Guardrail events
    #[error("Guardrail '{guardrail}' tripped: {reason}")]
    GuardrailTripped { guardrail: String, reason: String },

    // Tool errors
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Tool error: {0}")]
    ToolError(String),

    // Handoff errors
    #[error("Invalid handoff from {from} to {to}: {reason}")]
    HandoffInvalid {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Handoff limit exceeded: more than {limit} handoffs in one message")]
    HandoffLoopExceeded { limit: usize },

    #[error("Tool loop limit exceeded: more than {limit} tool rounds in one generation")]
    ToolLoopExceeded { limit: usize },

    // Transcript errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            // Configuration errors
            Self::Config(_) => "Check your config.toml file for errors",
            Self::UnknownAgent(_) => "The configured agent does not exist. Check the agent id",
            Self::MalformedRegistry(_) => "The agent catalog is inconsistent. Check handoff targets",

            // Caller errors
            Self::EmptyMessage => "Please type a message first",
            Self::UnknownConversation(_) => "That conversation no longer exists. Start a new one",

            // Guardrail events
            Self::GuardrailTripped { .. } => {
                "That request can't be answered here. Try a course-design question"
            }

            // Tool errors
            Self::ToolNotFound(_) => "No answer is available for that question yet",
            Self::ToolError(_) => "A lookup failed. The answer may be less specific than usual",

            // Handoff errors
            Self::HandoffInvalid { .. } => "The request stayed with the current specialist",
            Self::HandoffLoopExceeded { .. } => {
                "The request bounced between specialists. Try rephrasing it"
            }
            Self::ToolLoopExceeded { .. } => "The request needed too many lookups. Try a narrower question",

            // Transcript errors
            Self::Serialization(_) => "The transcript could not be read or written",

            // Generic IO error
            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // Abort the current call
            Self::HandoffLoopExceeded { .. } | Self::ToolLoopExceeded { .. } => false,

            // Deployment defects
            Self::Config(_) | Self::UnknownAgent(_) | Self::MalformedRegistry(_) => false,

            // All other errors are potentially recoverable
            _ => true,
        }
    }

    fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::UnknownAgent(_) | Self::MalformedRegistry(_)
        )
    }
}
