//! Instructional Design agent
//!
//! Structures the course: proposes an outline for the topic the user names,
//! and records the title, audience and objectives it picks up along the way.

use super::{ids, Agent, AgentContext, AgentDefinition, Candidate, Intent};
use crate::conversation::{keys, Memory};
use crate::text;
use crate::tools;
use sdk::types::{ToolRequest, ToolStatus};
use serde_json::json;

const INSTRUCTIONS: &str = "You are an instructional design specialist helping structure the course. \
Use your tools to suggest outlines and lesson ideas. \
If the request is outside instructional design, transfer back to the triage agent.";

const TOPIC_MARKERS: &[&str] = &[
    "course on",
    "course about",
    "class on",
    "class about",
    "workshop on",
    "workshop about",
    "program on",
    "module on",
    "teach",
];

const AUDIENCE_MARKERS: &[&str] = &["audience is", "aimed at", "designed for", "targeted at"];

const OBJECTIVE_MARKERS: &[&str] = &[
    "objective is",
    "objectives are",
    "goal is",
    "students should",
    "learners should",
];

pub fn definition() -> AgentDefinition {
    AgentDefinition::new(ids::INSTRUCTIONAL_DESIGN, "Instructional Design Agent", INSTRUCTIONS)
        .with_tools([tools::OUTLINE_COURSE, tools::LESSON_CONTENT])
        .with_handoffs([ids::TRIAGE])
}

pub struct InstructionalDesignAgent;

impl InstructionalDesignAgent {
    /// Audience and objectives mentioned in this message
    fn captured(ctx: &AgentContext<'_>) -> Vec<(&'static str, String)> {
        let mut captured = Vec::new();
        if let Some(audience) = text::phrase_after(ctx.user_message, AUDIENCE_MARKERS) {
            captured.push((keys::TARGET_AUDIENCE, audience));
        }
        if let Some(objectives) = text::phrase_after(ctx.user_message, OBJECTIVE_MARKERS) {
            captured.push((keys::LEARNING_OBJECTIVES, objectives));
        }
        captured
    }

    fn topic(ctx: &AgentContext<'_>) -> Option<String> {
        text::phrase_after(ctx.user_message, TOPIC_MARKERS)
            .or_else(|| ctx.recall(keys::COURSE_TITLE).map(str::to_string))
    }

    fn closing(ctx: &AgentContext<'_>, captured: &[(&'static str, String)]) -> String {
        let audience = captured
            .iter()
            .find(|(key, _)| *key == keys::TARGET_AUDIENCE)
            .map(|(_, value)| value.as_str())
            .or_else(|| ctx.recall(keys::TARGET_AUDIENCE));

        match audience {
            Some(audience) => format!(
                "I've kept it practical for {}. Share your learning objectives and I'll break each module into lessons.",
                audience
            ),
            None => "Who is the course for, and what should learners be able to do by the end? \
                     With that I can break each module into lessons."
                .to_string(),
        }
    }
}

impl Agent for InstructionalDesignAgent {
    fn instructions(&self, definition: &AgentDefinition, memory: &Memory) -> String {
        let objectives = memory
            .get(keys::LEARNING_OBJECTIVES)
            .map(String::as_str)
            .unwrap_or("[none]");
        format!("{} Learning objectives: {}.", definition.instructions, objectives)
    }

    fn generate(&self, ctx: &AgentContext<'_>) -> Candidate {
        if ctx.round == 0 && Intent::classify(ctx.user_message) != Intent::Planning {
            return Candidate::handoff(ids::TRIAGE, "request is outside instructional design");
        }

        let captured = Self::captured(ctx);

        let Some(topic) = Self::topic(ctx) else {
            let mut candidate = Candidate::reply(
                "Happy to help you structure it. What topic will the course cover, and who is it for?",
            );
            for (key, value) in captured {
                candidate = candidate.remember(key, value);
            }
            return candidate;
        };

        let Some(result) = ctx.tool_result(tools::OUTLINE_COURSE) else {
            return Candidate::use_tools(vec![
                ToolRequest::new(tools::OUTLINE_COURSE).with_param("topic", json!(topic))
            ]);
        };

        let mut candidate = match result.status {
            ToolStatus::Ok => Candidate::reply(format!(
                "Here's a proposed outline for your course on {}:\n\n{}\n\n{}",
                topic,
                result.output,
                Self::closing(ctx, &captured)
            ))
            .remember(keys::OUTLINE, result.output.clone()),
            ToolStatus::NotFound | ToolStatus::Error => Candidate::reply(format!(
                "I couldn't draft an outline for {} just now. Tell me the three or four things \
                 learners must walk away with and we'll build the modules from those.",
                topic
            )),
        }
        .remember(keys::COURSE_TITLE, topic);

        for (key, value) in captured {
            candidate = candidate.remember(key, value);
        }
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdk::types::{ToolCall, Turn};

    fn context<'a>(
        definition: &'a AgentDefinition,
        message: &'a str,
        history: &'a [Turn],
        memory: &'a Memory,
        tool_results: &'a [ToolCall],
        round: usize,
    ) -> AgentContext<'a> {
        AgentContext {
            definition,
            user_message: message,
            history,
            memory,
            tool_results,
            round,
        }
    }

    #[test]
    fn test_requests_outline_for_named_topic() {
        let definition = definition();
        let memory = Memory::new();
        let message = "I need help planning a course on social media marketing";
        let history = vec![Turn::user(message)];
        let ctx = context(&definition, message, &history, &memory, &[], 0);

        let candidate = InstructionalDesignAgent.generate(&ctx);
        assert_eq!(candidate.tool_requests.len(), 1);
        let request = &candidate.tool_requests[0];
        assert_eq!(request.tool_id.as_str(), tools::OUTLINE_COURSE);
        assert_eq!(request.param_str("topic").unwrap(), "social media marketing");
    }

    #[test]
    fn test_replies_with_outline_and_remembers_it() {
        let definition = definition();
        let memory = Memory::new();
        let message = "Plan a course on negotiation. The audience is first-time founders";
        let history = vec![Turn::user(message)];
        let request = ToolRequest::new(tools::OUTLINE_COURSE).with_param("topic", json!("negotiation"));
        let results = vec![ToolCall::ok(&request, "1. Introduction to negotiation")];
        let ctx = context(&definition, message, &history, &memory, &results, 1);

        let candidate = InstructionalDesignAgent.generate(&ctx);
        assert!(candidate.text.starts_with("Here's a proposed outline for your course on negotiation"));
        assert!(candidate.text.contains("first time founders"));
        assert!(candidate
            .memory_writes
            .contains(&(keys::COURSE_TITLE.to_string(), "negotiation".to_string())));
        assert!(candidate
            .memory_writes
            .contains(&(keys::TARGET_AUDIENCE.to_string(), "first time founders".to_string())));
    }

    #[test]
    fn test_asks_for_topic_when_unknown() {
        let definition = definition();
        let memory = Memory::new();
        let message = "hello";
        let history = vec![Turn::user(message)];
        let ctx = context(&definition, message, &history, &memory, &[], 0);

        let candidate = InstructionalDesignAgent.generate(&ctx);
        assert!(candidate.tool_requests.is_empty());
        assert!(candidate.text.contains("What topic"));
    }

    #[test]
    fn test_hands_back_off_topic_requests() {
        let definition = definition();
        let memory = Memory::new();
        let message = "How long should each module be?";
        let history = vec![Turn::user(message)];
        let ctx = context(&definition, message, &history, &memory, &[], 0);

        let candidate = InstructionalDesignAgent.generate(&ctx);
        assert_eq!(candidate.handoff.unwrap().target.as_str(), ids::TRIAGE);
    }

    #[test]
    fn test_instructions_carry_learning_objectives() {
        let definition = definition();
        let mut memory = Memory::new();
        assert!(InstructionalDesignAgent
            .instructions(&definition, &memory)
            .ends_with("Learning objectives: [none]."));

        memory.insert(
            keys::LEARNING_OBJECTIVES.to_string(),
            "price a first offer".to_string(),
        );
        assert!(InstructionalDesignAgent
            .instructions(&definition, &memory)
            .ends_with("Learning objectives: price a first offer."));
    }
}
