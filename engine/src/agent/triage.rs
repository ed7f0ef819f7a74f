//! Triage agent
//!
//! Entry point of every conversation. Classifies the request and hands it to
//! the specialist that owns it. Its own text is only shown if the handoff is
//! refused.

use super::{ids, Agent, AgentContext, AgentDefinition, Candidate, Intent};

const INSTRUCTIONS: &str = "You are a helpful triaging agent for course design. \
Route the request to one of the specialist agents on every turn: \
Instructional Design organizes outlines and objectives, \
FAQ answers quick questions about running a course, \
Content Expert provides detailed entrepreneurship knowledge, \
Critic reviews drafts or answers from other agents. \
If none of these apply, respond directly.";

/// Shown when no specialist could take the request
pub const FALLBACK: &str = "I can help you plan, structure and review a course for \
entrepreneurs. Tell me what your course is about and I'll bring in the right specialist.";

pub fn definition() -> AgentDefinition {
    AgentDefinition::new(ids::TRIAGE, "Triage Agent", INSTRUCTIONS).with_handoffs([
        ids::INSTRUCTIONAL_DESIGN,
        ids::FAQ,
        ids::CONTENT_EXPERT,
        ids::CRITIC,
    ])
}

pub struct TriageAgent;

impl Agent for TriageAgent {
    fn generate(&self, ctx: &AgentContext<'_>) -> Candidate {
        let intent = Intent::classify(ctx.user_message);
        Candidate::handoff(intent.specialist(), format!("{:?} request", intent)).with_text(FALLBACK)
    }
}
