//! Conversation events
//!
//! The ordered event stream a caller emits for an exchange, derived from the
//! turns the orchestrator committed. User turns produce nothing; a refusal
//! produces only its guardrail trips; any other turn produces its tool calls
//! followed by either a handoff or a message.

use sdk::types::{AgentId, GuardrailId, Role, ToolId, ToolStatus, Turn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationEvent {
    Message {
        agent_id: Option<AgentId>,
        text: String,
    },
    Handoff {
        from_agent_id: AgentId,
        to_agent_id: AgentId,
    },
    ToolCall {
        tool_id: ToolId,
        input: serde_json::Value,
        output: String,
        status: ToolStatus,
    },
    GuardrailTrip {
        guardrail_id: GuardrailId,
        reason: Option<String>,
    },
}

/// Events for a single committed turn
pub fn events_for_turn(turn: &Turn) -> Vec<ConversationEvent> {
    if turn.role == Role::User {
        return Vec::new();
    }

    if turn.is_refusal() {
        return turn
            .guardrail_verdicts
            .iter()
            .filter(|verdict| verdict.tripped)
            .map(|verdict| ConversationEvent::GuardrailTrip {
                guardrail_id: verdict.guardrail_id,
                reason: verdict.reason.clone(),
            })
            .collect();
    }

    let mut events: Vec<ConversationEvent> = turn
        .tool_calls
        .iter()
        .map(|call| ConversationEvent::ToolCall {
            tool_id: call.tool_id.clone(),
            input: call.input.clone(),
            output: call.output.clone(),
            status: call.status,
        })
        .collect();

    match &turn.handoff {
        Some(record) => events.push(ConversationEvent::Handoff {
            from_agent_id: record.from.clone(),
            to_agent_id: record.to.clone(),
        }),
        None => events.push(ConversationEvent::Message {
            agent_id: turn.agent_id.clone(),
            text: turn.content.clone(),
        }),
    }

    events
}

/// Events for a sequence of turns, in commit order
pub fn events_for_turns(turns: &[Turn]) -> Vec<ConversationEvent> {
    turns.iter().flat_map(events_for_turn).collect()
}
