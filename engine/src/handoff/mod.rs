//! Handoff Protocol
//!
//! Rules for transferring control between agents while a single user message
//! is being handled. A transfer is valid only if the target is declared by the
//! active agent, registered, and not the active agent itself. The number of
//! transfers per message is capped to stop agents bouncing a request back and
//! forth forever.

use crate::agent::{AgentDefinition, AgentRegistry};
use crate::conversation::ConversationState;
use sdk::errors::EngineError;
use sdk::types::{AgentId, GuardrailVerdict, ToolCall, Turn};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandoffProtocol {
    max_handoffs: usize,
}

impl HandoffProtocol {
    pub fn new(max_handoffs: usize) -> Self {
        Self { max_handoffs }
    }

    pub fn max_handoffs(&self) -> usize {
        self.max_handoffs
    }

    /// Check a requested transfer.
    ///
    /// `completed` is the number of transfers already performed for the
    /// current message.
    ///
    /// # Errors
    ///
    /// * `EngineError::HandoffInvalid` - target not allowed, not registered,
    ///   or the active agent itself; the caller ignores the handoff
    /// * `EngineError::HandoffLoopExceeded` - the per-message cap is reached;
    ///   the caller aborts the message
    pub fn validate(
        &self,
        registry: &AgentRegistry,
        from: &AgentDefinition,
        target: &AgentId,
        completed: usize,
    ) -> Result<(), EngineError> {
        let invalid = |reason: &str| EngineError::HandoffInvalid {
            from: from.id.to_string(),
            to: target.to_string(),
            reason: reason.to_string(),
        };

        if !from.allows_handoff(target) {
            return Err(invalid("target is not in the agent's allowed handoffs"));
        }
        if !registry.contains(target) {
            return Err(invalid("target is not registered"));
        }
        if target == &from.id {
            return Err(invalid("an agent cannot hand off to itself"));
        }
        if completed >= self.max_handoffs {
            return Err(EngineError::HandoffLoopExceeded {
                limit: self.max_handoffs,
            });
        }

        Ok(())
    }

    /// Record a validated transfer on the working state.
    ///
    /// Appends a system turn carrying the handing-off agent's tool calls and
    /// verdicts, fills in the target's handoff memory defaults for keys that
    /// are still unset, then moves the active-agent pointer. Existing turns and
    /// memory values are never changed.
    pub(crate) fn transfer(
        &self,
        state: &mut ConversationState,
        from: &AgentId,
        to: &AgentDefinition,
        tool_calls: Vec<ToolCall>,
        verdicts: Vec<GuardrailVerdict>,
    ) -> Turn {
        info!("Handing off from {} to {}", from, to.id);

        let turn = Turn::handoff(from.clone(), to.id.clone(), tool_calls, verdicts);
        state.push_turn(turn.clone());

        for (key, value) in &to.handoff_memory {
            if state.recall(key).is_none() {
                debug!("Initializing '{}' for {}", key, to.id);
                state.remember(key.clone(), value.clone());
            }
        }

        state.set_active_agent(to.id.clone());
        turn
    }
}

impl Default for HandoffProtocol {
    fn default() -> Self {
        Self::new(4)
    }
}
