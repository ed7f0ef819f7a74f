//! Critic agent
//!
//! Reviews the course outline kept in memory, or failing that the latest
//! response from another agent, and gives short actionable feedback.

use super::{ids, Agent, AgentContext, AgentDefinition, Candidate, Intent};
use crate::conversation::keys;

const INSTRUCTIONS: &str = "You are a critic agent. When asked or when it would be helpful, \
evaluate the latest course materials or responses from the other agents \
and provide concise, actionable feedback for improvement.";

/// Outlines shorter than this are flagged as thin
const MIN_OUTLINE_MODULES: usize = 4;

pub fn definition() -> AgentDefinition {
    AgentDefinition::new(ids::CRITIC, "Critic Agent", INSTRUCTIONS).with_handoffs([ids::TRIAGE])
}

pub struct CriticAgent;

impl CriticAgent {
    fn review_outline(ctx: &AgentContext<'_>, outline: &str) -> String {
        let modules = outline.lines().filter(|line| !line.trim().is_empty()).count();
        let title = ctx.recall(keys::COURSE_TITLE).unwrap_or("your course");

        let mut points = Vec::new();
        if modules < MIN_OUTLINE_MODULES {
            points.push(format!(
                "- With {} modules the outline is thin. Add a module that applies the material to the learner's own business.",
                modules
            ));
        } else {
            points.push(format!(
                "- {} modules is a good length. Make sure each one ends with something the learner builds.",
                modules
            ));
        }
        if ctx.recall(keys::LEARNING_OBJECTIVES).is_none() {
            points.push(
                "- No learning objectives yet. Write one measurable objective per module.".to_string(),
            );
        }
        if ctx.recall(keys::TARGET_AUDIENCE).is_none() {
            points.push(
                "- The audience isn't defined. Name who it's for so examples can be matched to them."
                    .to_string(),
            );
        }
        if !outline.to_lowercase().contains("case stud") {
            points.push("- Add at least one real case study to ground the concepts.".to_string());
        }

        format!("Feedback on the outline for {}:\n{}", title, points.join("\n"))
    }

    fn review_reply(reply: &str) -> String {
        let words = reply.split_whitespace().count();
        let mut points = Vec::new();
        if words > 120 {
            points.push("- It's long. Cut it to the three points a learner must remember.");
        } else {
            points.push("- It's concise. Check that every point leads to an action.");
        }
        if !reply.contains('\n') {
            points.push("- Break it into steps or bullets so it's easier to follow.");
        }
        points.push("- Close with one exercise so learners apply it straight away.");

        format!("Feedback on the last answer:\n{}", points.join("\n"))
    }
}

impl Agent for CriticAgent {
    fn generate(&self, ctx: &AgentContext<'_>) -> Candidate {
        if ctx.round == 0 && Intent::classify(ctx.user_message) != Intent::Review {
            return Candidate::handoff(ids::TRIAGE, "request is not a review");
        }

        if let Some(outline) = ctx.recall(keys::OUTLINE) {
            return Candidate::reply(Self::review_outline(ctx, outline));
        }

        match ctx.last_agent_reply() {
            Some(turn) => Candidate::reply(Self::review_reply(&turn.content)),
            None => Candidate::reply(
                "There's nothing to review yet. Share a draft or ask for an outline first and I'll give you feedback on it.",
            ),
        }
    }
}
