//! Content Expert agent
//!
//! Supplies subject-matter key points for a module. Keeps a running list of
//! the modules it has covered in the `notes` memory key.

use super::{ids, Agent, AgentContext, AgentDefinition, Candidate, Intent};
use crate::conversation::{keys, Memory};
use crate::text;
use crate::tools;
use sdk::types::{ToolRequest, ToolStatus};
use serde_json::json;

const INSTRUCTIONS: &str = "You are a content expert specializing in entrepreneurship. \
Provide factual information and resources to help develop the course. \
Ask clarifying questions if needed and use your tools when appropriate.";

const SUBJECT_MARKERS: &[&str] = &[
    "lesson content for",
    "content for",
    "key points for",
    "key points on",
    "tell me about",
    "explain",
    "what is",
    "what are",
    "examples of",
    "example of",
    "resources for",
    "resources on",
    "case study on",
    "case study about",
];

pub fn definition() -> AgentDefinition {
    AgentDefinition::new(ids::CONTENT_EXPERT, "Content Expert Agent", INSTRUCTIONS)
        .with_tools([tools::OUTLINE_COURSE, tools::LESSON_CONTENT])
        .with_handoffs([ids::TRIAGE])
        .with_handoff_memory(keys::NOTES, "")
}

pub struct ContentExpertAgent;

impl ContentExpertAgent {
    fn subject(ctx: &AgentContext<'_>) -> Option<String> {
        text::phrase_after(ctx.user_message, SUBJECT_MARKERS)
            .or_else(|| ctx.recall(keys::COURSE_TITLE).map(str::to_string))
    }

    fn notes_with(ctx: &AgentContext<'_>, subject: &str) -> String {
        match ctx.recall(keys::NOTES) {
            Some(notes) if !notes.is_empty() => {
                if notes.lines().any(|line| line == subject) {
                    notes.to_string()
                } else {
                    format!("{}\n{}", notes, subject)
                }
            }
            _ => subject.to_string(),
        }
    }
}

impl Agent for ContentExpertAgent {
    fn instructions(&self, definition: &AgentDefinition, memory: &Memory) -> String {
        let title = memory
            .get(keys::COURSE_TITLE)
            .map(String::as_str)
            .unwrap_or("[unknown topic]");
        format!("{} Current course title: {}.", definition.instructions, title)
    }

    fn generate(&self, ctx: &AgentContext<'_>) -> Candidate {
        if ctx.round == 0 && Intent::classify(ctx.user_message) != Intent::Content {
            return Candidate::handoff(ids::TRIAGE, "request needs another specialist");
        }

        let Some(subject) = Self::subject(ctx) else {
            return Candidate::reply(
                "Which module or topic should I cover? Give me its name and I'll pull together the key points.",
            );
        };

        let Some(result) = ctx.tool_result(tools::LESSON_CONTENT) else {
            return Candidate::use_tools(vec![
                ToolRequest::new(tools::LESSON_CONTENT).with_param("module", json!(subject))
            ]);
        };

        match result.status {
            ToolStatus::Ok => Candidate::reply(format!(
                "{}\n\nWant me to turn these into a lesson plan with an exercise?",
                result.output
            ))
            .remember(keys::NOTES, Self::notes_with(ctx, &subject)),
            ToolStatus::NotFound | ToolStatus::Error => Candidate::reply(format!(
                "I don't have material on {} yet. Tell me a bit more about what the module should cover.",
                subject
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdk::types::{ToolCall, Turn};

    #[test]
    fn test_requests_lesson_content_for_subject() {
        let definition = definition();
        let memory = Memory::new();
        let message = "Explain customer discovery";
        let history = vec![Turn::user(message)];
        let ctx = AgentContext {
            definition: &definition,
            user_message: message,
            history: &history,
            memory: &memory,
            tool_results: &[],
            round: 0,
        };

        let candidate = ContentExpertAgent.generate(&ctx);
        let request = &candidate.tool_requests[0];
        assert_eq!(request.tool_id.as_str(), tools::LESSON_CONTENT);
        assert_eq!(request.param_str("module").unwrap(), "customer discovery");
    }

    #[test]
    fn test_appends_covered_subject_to_notes() {
        let definition = definition();
        let mut memory = Memory::new();
        memory.insert(keys::NOTES.to_string(), "pricing".to_string());
        let message = "Explain customer discovery";
        let history = vec![Turn::user(message)];
        let request =
            ToolRequest::new(tools::LESSON_CONTENT).with_param("module", json!("customer discovery"));
        let results = vec![ToolCall::ok(&request, "Key points for customer discovery:")];
        let ctx = AgentContext {
            definition: &definition,
            user_message: message,
            history: &history,
            memory: &memory,
            tool_results: &results,
            round: 1,
        };

        let candidate = ContentExpertAgent.generate(&ctx);
        assert!(candidate.text.starts_with("Key points for customer discovery:"));
        assert_eq!(
            candidate.memory_writes,
            vec![(keys::NOTES.to_string(), "pricing\ncustomer discovery".to_string())]
        );
    }

    #[test]
    fn test_instructions_name_the_course() {
        let definition = definition();
        let mut memory = Memory::new();
        assert!(ContentExpertAgent
            .instructions(&definition, &memory)
            .ends_with("Current course title: [unknown topic]."));

        memory.insert(keys::COURSE_TITLE.to_string(), "negotiation".to_string());
        let instructions = ContentExpertAgent.instructions(&definition, &memory);
        assert!(instructions.starts_with(INSTRUCTIONS));
        assert!(instructions.ends_with("Current course title: negotiation."));
    }

    #[test]
    fn test_handoff_starts_empty_notes() {
        assert_eq!(
            definition().handoff_memory,
            vec![(keys::NOTES.to_string(), String::new())]
        );
    }
}
