//! FAQ lookup tool
//!
//! Static answer table keyed by question fragments. A question matches an
//! entry when any of the entry's fragments occurs in it on whole-word
//! boundaries after normalization. Entries are checked in table order and the
//! first match wins; there is no ranking.

use super::FAQ_LOOKUP;
use crate::text;
use async_trait::async_trait;
use sdk::tool::LookupTool;
use sdk::types::{ToolError, ToolId, ToolRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One answer and the question fragments that select it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub topic: String,
    pub fragments: Vec<String>,
    pub answer: String,
}

impl FaqEntry {
    pub fn new(topic: &str, fragments: &[&str], answer: &str) -> Self {
        Self {
            topic: topic.to_string(),
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            answer: answer.to_string(),
        }
    }
}

/// Ordered FAQ answer table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaqTable {
    entries: Vec<FaqEntry>,
}

impl FaqTable {
    pub fn new(entries: Vec<FaqEntry>) -> Self {
        Self { entries }
    }

    /// Built-in answers for entrepreneurs building a course
    pub fn builtin() -> Self {
        Self::new(vec![
            FaqEntry::new(
                "course_length",
                &[
                    "how long should the course be",
                    "how long should my course be",
                    "how long should a course be",
                    "course length",
                    "how many modules",
                ],
                "Most entrepreneur courses work best with 4 to 8 modules and 2 to 4 hours of \
                 content in total. Start small and add modules once learners ask for more.",
            ),
            FaqEntry::new(
                "module_length",
                &[
                    "how long should each module be",
                    "how long should a module be",
                    "how long should modules be",
                    "how long should each lesson be",
                    "module length",
                    "lesson length",
                    "module duration",
                ],
                "Aim for modules of 20 to 40 minutes, split into lessons of 5 to 10 minutes. \
                 Busy founders finish short lessons and come back for the next one.",
            ),
            FaqEntry::new(
                "pricing",
                &[
                    "how much should i charge",
                    "what should i charge",
                    "how should i price",
                    "price my course",
                    "pricing",
                    "price",
                ],
                "Price on the outcome, not the hours. Self-paced courses for entrepreneurs \
                 commonly sell for $49 to $299; cohort courses with live sessions for $300 to $1,500.",
            ),
            FaqEntry::new(
                "platform",
                &[
                    "which platform",
                    "what platform",
                    "platform",
                    "where should i host",
                    "host my course",
                    "lms",
                ],
                "Any hosted course platform with video, quizzes and payments will do for a \
                 first course. Pick the one that lets you export your students' emails.",
            ),
            FaqEntry::new(
                "certificate",
                &["certificate", "certificates", "certification"],
                "Certificates of completion are optional. They help for professional audiences \
                 and matter little for founders, who care more about results.",
            ),
            FaqEntry::new(
                "video_length",
                &[
                    "how long should videos be",
                    "how long should each video be",
                    "video length",
                ],
                "Keep videos under 10 minutes, ideally 3 to 6. One idea per video.",
            ),
            FaqEntry::new(
                "refunds",
                &["refund", "refunds", "money back"],
                "A 14 to 30 day refund policy is standard and lowers the risk of buying. \
                 Refund rates stay low when the course delivers what the sales page promises.",
            ),
            FaqEntry::new(
                "launch",
                &["when should i launch", "how do i launch", "launch my course", "pre sell", "presell"],
                "Pre-sell to a small group before the course is finished, then build it with \
                 their feedback. A live beta cohort is the fastest way to validate demand.",
            ),
        ])
    }

    /// Append entries after the built-in ones
    pub fn extend(&mut self, entries: impl IntoIterator<Item = FaqEntry>) {
        self.entries.extend(entries);
    }

    pub fn entries(&self) -> &[FaqEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry whose fragments occur in `question`
    pub fn lookup(&self, question: &str) -> Option<&FaqEntry> {
        let haystack = text::normalize(question);
        self.entries.iter().find(|entry| {
            entry
                .fragments
                .iter()
                .any(|fragment| text::contains_phrase(&haystack, fragment))
        })
    }
}

/// `faq_lookup` tool over an [`FaqTable`]
pub struct FaqLookupTool {
    table: Arc<FaqTable>,
}

impl FaqLookupTool {
    pub fn new(table: Arc<FaqTable>) -> Self {
        Self { table }
    }
}

#[async_trait]
impl LookupTool for FaqLookupTool {
    fn id(&self) -> ToolId {
        ToolId::from(FAQ_LOOKUP)
    }

    fn description(&self) -> &str {
        "Look up a short answer to a frequently asked question about running a course"
    }

    async fn lookup(&self, request: &ToolRequest) -> Result<Option<String>, ToolError> {
        let question = request.param_str("question")?;
        if question.trim().is_empty() {
            return Err(ToolError::InvalidParameter("question".to_string()));
        }
        if self.table.is_empty() {
            return Err(ToolError::Unavailable("FAQ table has no entries".to_string()));
        }

        Ok(self
            .table
            .lookup(question)
            .map(|entry| entry.answer.clone()))
    }
}
