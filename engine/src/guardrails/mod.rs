//! Guardrail Engine
//!
//! Independent safety predicates evaluated against every candidate before any
//! of it reaches the user. All guardrails run concurrently and are joined
//! before release; none sees another's verdict. Verdicts come back in
//! priority order (highest first), so the first tripped verdict is the one a
//! refusal cites.

pub mod jailbreak;
pub mod relevance;

pub use jailbreak::{JailbreakGuardrail, JailbreakMatch};
pub use relevance::RelevanceGuardrail;

use crate::agent::Candidate;
use async_trait::async_trait;
use futures::future::join_all;
use sdk::errors::EngineError;
use sdk::types::{GuardrailId, GuardrailVerdict, Turn};
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::warn;

/// What a guardrail may inspect besides the candidate
#[derive(Debug, Clone, Copy)]
pub struct GuardrailContext<'a> {
    /// The latest user message
    pub user_message: &'a str,
    /// Committed history including the latest user turn
    pub history: &'a [Turn],
    /// Instructions of the agent that produced the candidate
    pub instructions: &'a str,
}

/// A pure safety predicate
#[async_trait]
pub trait Guardrail: Send + Sync {
    fn id(&self) -> GuardrailId;

    /// Higher runs first in the verdict order
    fn priority(&self) -> i32 {
        0
    }

    /// Judge a candidate. Must return the same verdict for the same input.
    async fn evaluate(&self, candidate: &Candidate, ctx: &GuardrailContext<'_>) -> GuardrailVerdict;
}

/// Fixed user-facing text that replaces a candidate blocked by `id`
pub fn refusal_template(id: GuardrailId) -> &'static str {
    match id {
        GuardrailId::Jailbreak => {
            "Sorry, I can't help with that. I can only assist with designing and building your course."
        }
        GuardrailId::Relevance => {
            "Sorry, I can only answer questions related to creating courses and educational products for entrepreneurs."
        }
    }
}

/// The first tripped verdict in priority order
pub fn first_tripped(verdicts: &[GuardrailVerdict]) -> Option<&GuardrailVerdict> {
    verdicts.iter().find(|verdict| verdict.tripped)
}

/// Runs every guardrail against a candidate
#[derive(Clone)]
pub struct GuardrailEngine {
    guardrails: Vec<Arc<dyn Guardrail>>,
}

impl std::fmt::Debug for GuardrailEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardrailEngine")
            .field("guardrails", &self.guardrails.len())
            .finish()
    }
}

impl GuardrailEngine {
    /// Create an engine; guardrails are ordered by descending priority.
    pub fn new(mut guardrails: Vec<Arc<dyn Guardrail>>) -> Self {
        guardrails.sort_by_key(|g| Reverse(g.priority()));
        Self { guardrails }
    }

    /// Jailbreak and relevance guardrails with optional configured extras.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Config` if an extra jailbreak pattern is not a
    /// valid regular expression.
    pub fn builtin(
        extra_topic_keywords: &[String],
        extra_jailbreak_patterns: &[String],
    ) -> Result<Self, EngineError> {
        Ok(Self::new(vec![
            Arc::new(JailbreakGuardrail::with_patterns(extra_jailbreak_patterns)?),
            Arc::new(RelevanceGuardrail::with_keywords(extra_topic_keywords)),
        ]))
    }

    /// Guardrail ids in verdict order
    pub fn order(&self) -> Vec<GuardrailId> {
        self.guardrails.iter().map(|g| g.id()).collect()
    }

    /// One verdict per guardrail, in priority order
    pub async fn evaluate(
        &self,
        candidate: &Candidate,
        ctx: &GuardrailContext<'_>,
    ) -> Vec<GuardrailVerdict> {
        let verdicts = join_all(
            self.guardrails
                .iter()
                .map(|guardrail| guardrail.evaluate(candidate, ctx)),
        )
        .await;

        for verdict in verdicts.iter().filter(|v| v.tripped) {
            let tripped = EngineError::GuardrailTripped {
                guardrail: verdict.guardrail_id.to_string(),
                reason: verdict
                    .reason
                    .clone()
                    .unwrap_or_else(|| "no reason given".to_string()),
            };
            warn!("{}", tripped);
        }

        verdicts
    }
}
