//! Intent classification
//!
//! Keyword routing shared by Triage (to pick a specialist) and by the
//! specialists themselves (to notice a request that belongs elsewhere and hand
//! it back). Categories are checked in a fixed priority order; a message that
//! matches nothing is treated as course planning.
//!
//! When the message names a course topic ("a course on pricing strategy"),
//! only the request in front of the topic is classified, so a topic that
//! happens to contain an FAQ or review word still reaches planning.

use super::ids;
use crate::text;
use sdk::types::AgentId;

/// What the user is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Structure a course: outline, objectives, audience
    Planning,
    /// Quick factual question about running a course
    Faq,
    /// Subject-matter knowledge for a module
    Content,
    /// Feedback on a draft or a previous answer
    Review,
}

/// Phrases that introduce the subject of a course
const TOPIC_MARKERS: &[&str] = &[
    "course on",
    "course about",
    "course for",
    "class on",
    "class about",
    "workshop on",
    "workshop about",
    "program on",
    "program about",
    "module on",
    "module about",
];

const REVIEW_PHRASES: &[&str] = &["review", "feedback", "critique", "evaluate", "improve my"];

const FAQ_PHRASES: &[&str] = &[
    "how long",
    "how many",
    "how much",
    "charge",
    "price",
    "pricing",
    "platform",
    "host",
    "lms",
    "certificate",
    "certificates",
    "refund",
    "refunds",
    "duration",
    "length",
];

const CONTENT_PHRASES: &[&str] = &[
    "what is",
    "what are",
    "explain",
    "example",
    "examples",
    "key points",
    "lesson content",
    "tell me about",
    "resources",
    "case study",
];

impl Intent {
    /// Classify a user message
    pub fn classify(message: &str) -> Self {
        let request = text::text_before(message, TOPIC_MARKERS);
        let request = request.as_deref().unwrap_or(message);

        if text::contains_any(request, REVIEW_PHRASES) {
            Intent::Review
        } else if text::contains_any(request, FAQ_PHRASES) {
            Intent::Faq
        } else if text::contains_any(request, CONTENT_PHRASES) {
            Intent::Content
        } else {
            Intent::Planning
        }
    }

    /// The specialist that owns this intent
    pub fn specialist(self) -> AgentId {
        let id = match self {
            Intent::Planning => ids::INSTRUCTIONAL_DESIGN,
            Intent::Faq => ids::FAQ,
            Intent::Content => ids::CONTENT_EXPERT,
            Intent::Review => ids::CRITIC,
        };
        AgentId::from(id)
    }
}
