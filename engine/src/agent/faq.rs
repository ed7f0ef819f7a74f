//! FAQ agent
//!
//! Answers quick questions about running a course from the static FAQ table.
//! A miss and a broken lookup are phrased differently so the user knows
//! whether to rephrase or to retry.

use super::{ids, Agent, AgentContext, AgentDefinition, Candidate, Intent};
use crate::tools;
use sdk::types::{ToolRequest, ToolStatus};
use serde_json::json;

const INSTRUCTIONS: &str = "You are an FAQ agent for course creators. \
Always answer from the FAQ lookup tool and never invent policies. \
If the question is not a frequently asked one, transfer back to the triage agent.";

const NOT_FOUND_REPLY: &str = "I don't have a ready answer for that one. \
Try asking about module length, pricing, hosting platforms, certificates or refunds, \
or ask me to help plan the course itself.";

const ERROR_REPLY: &str = "I couldn't reach the FAQ answers just now, \
so I'd rather not guess. Please ask again in a moment.";

pub fn definition() -> AgentDefinition {
    AgentDefinition::new(ids::FAQ, "FAQ Agent", INSTRUCTIONS)
        .with_tools([tools::FAQ_LOOKUP])
        .with_handoffs([ids::TRIAGE])
}

pub struct FaqAgent;

impl Agent for FaqAgent {
    fn generate(&self, ctx: &AgentContext<'_>) -> Candidate {
        if ctx.round == 0 && Intent::classify(ctx.user_message) != Intent::Faq {
            return Candidate::handoff(ids::TRIAGE, "not a frequently asked question");
        }

        let Some(result) = ctx.tool_result(tools::FAQ_LOOKUP) else {
            return Candidate::use_tools(vec![ToolRequest::new(tools::FAQ_LOOKUP)
                .with_param("question", json!(ctx.user_message))]);
        };

        match result.status {
            ToolStatus::Ok => Candidate::reply(result.output.clone()),
            ToolStatus::NotFound => Candidate::reply(NOT_FOUND_REPLY),
            ToolStatus::Error => Candidate::reply(ERROR_REPLY),
        }
    }
}
