use super::{Guardrail, GuardrailContext};
use crate::agent::Candidate;
use crate::text;
use async_trait::async_trait;
use sdk::types::{GuardrailId, GuardrailVerdict};
use std::collections::HashSet;

/// Words that mark a message as part of course creation for entrepreneurs
const TOPIC_KEYWORDS: &[&str] = &[
    // course building
    "course", "module", "lesson", "curriculum", "syllabus", "outline", "learning", "learner",
    "student", "objective", "audience", "teach", "teaching", "training", "workshop", "class",
    "quiz", "assessment", "video", "content", "topic", "cohort", "enroll", "enrollment",
    "certificate", "instructional", "design", "feedback", "review", "draft", "duration",
    "exercise", "education", "educational", "product", "platform", "plan", "planning",
    "expand", "section", "step", "refund", "launch", "lms", "homework", "presell",
    // entrepreneurship
    "entrepreneur", "entrepreneurship", "business", "businesses", "founder", "startup",
    "marketing", "sales", "sell", "selling", "pricing", "price", "customer", "revenue",
    "profit", "funding", "investor", "brand", "branding", "strategy", "growth", "finance",
    "negotiation", "hiring", "leadership", "pitch", "market", "ecommerce", "freelance",
];

/// Conversational filler that is allowed on its own
const SMALL_TALK: &[&str] = &[
    "hi", "hello", "hey", "thanks", "thank", "you", "ok", "okay", "yes", "no", "sure",
    "great", "cool", "bye", "goodbye", "good", "morning", "afternoon", "evening", "please",
    "got", "it", "sounds", "perfect", "awesome", "nice", "yep", "nope", "alright", "cheers",
    "there", "that", "works", "lol", "wow",
];

/// Rejects messages unrelated to building courses for entrepreneurs
///
/// Only the latest user message is judged. Small talk made up entirely of
/// conversational filler passes.
pub struct RelevanceGuardrail {
    keywords: HashSet<String>,
    phrases: Vec<String>,
}

impl RelevanceGuardrail {
    /// Create a guardrail with the built-in vocabulary plus `extra` keywords.
    ///
    /// Multi-word extras match as whole phrases.
    pub fn with_keywords(extra: &[String]) -> Self {
        let mut keywords: HashSet<String> = TOPIC_KEYWORDS.iter().map(|k| k.to_string()).collect();
        let mut phrases = Vec::new();

        for keyword in extra {
            let normalized = text::normalize(keyword);
            if normalized.is_empty() {
                continue;
            }
            if normalized.contains(' ') {
                phrases.push(normalized);
            } else {
                keywords.insert(normalized);
            }
        }

        Self { keywords, phrases }
    }

    fn is_on_topic(&self, message: &str) -> bool {
        let normalized = text::normalize(message);
        let on_topic_token = normalized.split(' ').any(|token| {
            self.keywords.contains(token)
                || token
                    .strip_suffix('s')
                    .is_some_and(|singular| self.keywords.contains(singular))
        });

        on_topic_token
            || self
                .phrases
                .iter()
                .any(|phrase| text::contains_phrase(&normalized, phrase))
    }

    fn is_small_talk(message: &str) -> bool {
        let tokens = text::tokens(message);
        !tokens.is_empty() && tokens.iter().all(|token| SMALL_TALK.contains(&token.as_str()))
    }
}

#[async_trait]
impl Guardrail for RelevanceGuardrail {
    fn id(&self) -> GuardrailId {
        GuardrailId::Relevance
    }

    async fn evaluate(&self, _candidate: &Candidate, ctx: &GuardrailContext<'_>) -> GuardrailVerdict {
        if self.is_on_topic(ctx.user_message) || Self::is_small_talk(ctx.user_message) {
            GuardrailVerdict::pass(GuardrailId::Relevance)
        } else {
            GuardrailVerdict::trip(
                GuardrailId::Relevance,
                "Message is unrelated to course creation",
            )
        }
    }
}
