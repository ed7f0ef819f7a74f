//! Orchestrator
//!
//! The dispatch loop that handles one user message:
//!
//! 1. Route to the active agent (the entry agent for a fresh conversation)
//! 2. Generate, re-entering generation with tool results until the agent
//!    yields a final candidate or a handoff (bounded by `max_tool_iterations`)
//! 3. Run every guardrail on the candidate; any trip replaces the whole
//!    exchange with a refusal
//! 4. Validate and perform handoffs, re-invoking the new agent on the same
//!    user message (bounded by `max_handoffs`)
//! 5. Commit the agent's response
//!
//! All work happens on a copy of the caller's state. The caller's state is
//! never touched, so dropping the future at any await point commits nothing.

use crate::agent::{AgentContext, AgentRegistry, Candidate, RegisteredAgent};
use crate::config::Config;
use crate::conversation::ConversationState;
use crate::events::{self, ConversationEvent};
use crate::guardrails::{self, GuardrailContext, GuardrailEngine};
use crate::handoff::HandoffProtocol;
use crate::tools::{FaqTable, ToolInvoker};
use sdk::errors::{EngineError, EngineErrorExt};
use sdk::types::{AgentId, GuardrailId, GuardrailVerdict, ToolCall, ToolRequest, Turn};
use std::fmt;
use tracing::{debug, error, info, warn};

/// Committed when an agent accepted the request but produced no text
const FALLBACK_REPLY: &str =
    "I'm not sure how to help with that yet. Could you tell me a bit more about your course?";

/// Default cap on tool rounds per generation step
pub const DEFAULT_MAX_TOOL_ITERATIONS: usize = 4;

/// Default cap on handoffs per user message
pub const DEFAULT_MAX_HANDOFFS: usize = 4;

/// States of the per-message state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Routing,
    Generating,
    ToolInvocation,
    GuardrailCheck,
    HandoffPending,
    Committing,
    Blocked,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Routing => "routing",
            Phase::Generating => "generating",
            Phase::ToolInvocation => "tool_invocation",
            Phase::GuardrailCheck => "guardrail_check",
            Phase::HandoffPending => "handoff_pending",
            Phase::Committing => "committing",
            Phase::Blocked => "blocked",
        };
        f.write_str(name)
    }
}

/// How a message was resolved
#[derive(Debug)]
pub enum Outcome {
    /// An agent's response was committed
    Responded { agent_id: AgentId },
    /// A guardrail tripped and a refusal was committed
    Blocked {
        guardrail_id: GuardrailId,
        agent_id: AgentId,
    },
    /// A loop limit was hit and an apology was committed
    Aborted(EngineError),
}

/// Result of handling one user message
#[derive(Debug)]
pub struct Exchange {
    /// The state the caller should adopt
    pub state: ConversationState,
    /// Turns appended by this call, in commit order, starting with the user turn
    pub turns: Vec<Turn>,
    pub outcome: Outcome,
    /// Phases walked, starting and ending at `Idle`
    pub phases: Vec<Phase>,
}

impl Exchange {
    /// Events the caller should emit for this exchange
    pub fn events(&self) -> Vec<ConversationEvent> {
        events::events_for_turns(&self.turns)
    }

    /// The agent turn released to the user, if any
    pub fn reply(&self) -> Option<&Turn> {
        match self.outcome {
            Outcome::Responded { .. } => self.turns.last(),
            _ => None,
        }
    }
}

/// Limits and entry point of the dispatch loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorSettings {
    pub entry_agent: AgentId,
    pub max_tool_iterations: usize,
    pub max_handoffs: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            entry_agent: AgentId::from(crate::agent::ids::TRIAGE),
            max_tool_iterations: DEFAULT_MAX_TOOL_ITERATIONS,
            max_handoffs: DEFAULT_MAX_HANDOFFS,
        }
    }
}

/// Records and logs phase transitions
struct PhaseTrace {
    phases: Vec<Phase>,
}

impl PhaseTrace {
    fn new() -> Self {
        Self {
            phases: vec![Phase::Idle],
        }
    }

    fn enter(&mut self, phase: Phase) {
        let from = self.phases.last().copied().unwrap_or(Phase::Idle);
        debug!("Phase {} -> {}", from, phase);
        self.phases.push(phase);
    }

    fn finish(mut self) -> Vec<Phase> {
        self.enter(Phase::Idle);
        self.phases
    }
}

/// Final candidate of one agent's generation step
struct Step {
    candidate: Candidate,
    /// Calls to allowed tools, in request order
    tool_calls: Vec<ToolCall>,
}

enum Resolution {
    Committed { agent_id: AgentId },
    Blocked { verdicts: Vec<GuardrailVerdict> },
}

pub struct Orchestrator {
    registry: AgentRegistry,
    tools: ToolInvoker,
    guardrails: GuardrailEngine,
    handoffs: HandoffProtocol,
    entry_agent: AgentId,
    max_tool_iterations: usize,
}

impl Orchestrator {
    /// Assemble an orchestrator.
    ///
    /// # Errors
    ///
    /// * `EngineError::UnknownAgent` - the entry agent is not registered
    /// * `EngineError::MalformedRegistry` - an agent allows a tool the invoker
    ///   does not have
    /// * `EngineError::Config` - a limit is zero
    pub fn new(
        registry: AgentRegistry,
        tools: ToolInvoker,
        guardrails: GuardrailEngine,
        settings: OrchestratorSettings,
    ) -> Result<Self, EngineError> {
        if !registry.contains(&settings.entry_agent) {
            return Err(EngineError::UnknownAgent(settings.entry_agent.to_string()));
        }

        for definition in registry.definitions() {
            if let Some(missing) = definition.allowed_tools.iter().find(|t| !tools.contains(t)) {
                return Err(EngineError::MalformedRegistry(format!(
                    "agent '{}' allows unknown tool '{}'",
                    definition.id, missing
                )));
            }
        }

        if settings.max_tool_iterations == 0 {
            return Err(EngineError::Config(
                "max_tool_iterations must be at least 1".to_string(),
            ));
        }
        if settings.max_handoffs == 0 {
            return Err(EngineError::Config(
                "max_handoffs must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            registry,
            tools,
            guardrails,
            handoffs: HandoffProtocol::new(settings.max_handoffs),
            entry_agent: settings.entry_agent,
            max_tool_iterations: settings.max_tool_iterations,
        })
    }

    /// The built-in course-design catalog with default limits
    pub fn builtin() -> Result<Self, EngineError> {
        Self::new(
            AgentRegistry::builtin()?,
            ToolInvoker::builtin(FaqTable::builtin()),
            GuardrailEngine::builtin(&[], &[])?,
            OrchestratorSettings::default(),
        )
    }

    /// Build from a loaded configuration
    pub fn from_config(config: &Config) -> Result<Self, EngineError> {
        let mut faq = FaqTable::builtin();
        faq.extend(config.faq.entries.iter().cloned());

        Self::new(
            AgentRegistry::builtin()?,
            ToolInvoker::builtin(faq),
            GuardrailEngine::builtin(
                &config.guardrails.extra_topic_keywords,
                &config.guardrails.extra_jailbreak_patterns,
            )?,
            OrchestratorSettings {
                entry_agent: AgentId::from(config.orchestrator.entry_agent.as_str()),
                max_tool_iterations: config.orchestrator.max_tool_iterations,
                max_handoffs: config.orchestrator.max_handoffs,
            },
        )
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn tools(&self) -> &ToolInvoker {
        &self.tools
    }

    pub fn entry_agent(&self) -> &AgentId {
        &self.entry_agent
    }

    /// A fresh conversation controlled by the entry agent
    pub fn new_conversation(&self) -> ConversationState {
        ConversationState::new(self.entry_agent.clone())
    }

    /// Handle one user message against `state`.
    ///
    /// Guardrail trips and loop limits are normal outcomes reported through
    /// [`Exchange::outcome`]; the returned state always has the user turn
    /// appended.
    ///
    /// # Errors
    ///
    /// * `EngineError::EmptyMessage` - the message is empty or whitespace
    /// * `EngineError::UnknownAgent` - the active agent is not registered
    pub async fn handle_user_message(
        &self,
        state: &ConversationState,
        user_text: &str,
    ) -> Result<Exchange, EngineError> {
        let message = user_text.trim();
        if message.is_empty() {
            return Err(EngineError::EmptyMessage);
        }

        let mut trace = PhaseTrace::new();
        trace.enter(Phase::Routing);

        let start_agent = if state.is_fresh() {
            self.entry_agent.clone()
        } else {
            state.active_agent().clone()
        };
        if !self.registry.contains(&start_agent) {
            return Err(EngineError::UnknownAgent(start_agent.to_string()));
        }

        info!("Handling message with agent {}", start_agent);

        let user_turn = Turn::user(message);
        let mut working = state.clone();
        working.set_active_agent(start_agent.clone());
        working.push_turn(user_turn.clone());

        match self.run(&mut working, message, &mut trace).await {
            Ok(Resolution::Committed { agent_id }) => {
                let turns = working.turns()[state.turns().len()..].to_vec();
                Ok(Exchange {
                    state: working,
                    turns,
                    outcome: Outcome::Responded { agent_id },
                    phases: trace.finish(),
                })
            }
            Ok(Resolution::Blocked { verdicts }) => {
                let guardrail_id = guardrails::first_tripped(&verdicts)
                    .map(|v| v.guardrail_id)
                    .unwrap_or(GuardrailId::Jailbreak);
                let refusal = Turn::refusal(
                    start_agent.clone(),
                    guardrails::refusal_template(guardrail_id),
                    verdicts,
                );
                let outcome = Outcome::Blocked {
                    guardrail_id,
                    agent_id: start_agent.clone(),
                };
                Ok(Self::rollback(state, start_agent, user_turn, refusal, trace, outcome))
            }
            Err(
                err @ (EngineError::HandoffLoopExceeded { .. }
                | EngineError::ToolLoopExceeded { .. }),
            ) => {
                error!("Aborting message: {}", err);
                let apology = Turn::system_error(format!(
                    "Sorry, I couldn't finish handling that request. {}.",
                    err.user_hint()
                ));
                Ok(Self::rollback(
                    state,
                    start_agent,
                    user_turn,
                    apology,
                    trace,
                    Outcome::Aborted(err),
                ))
            }
            Err(err) => Err(err),
        }
    }

    /// Discard everything the call did except the user turn, then append `closing`
    fn rollback(
        state: &ConversationState,
        start_agent: AgentId,
        user_turn: Turn,
        closing: Turn,
        trace: PhaseTrace,
        outcome: Outcome,
    ) -> Exchange {
        let mut rolled_back = state.clone();
        rolled_back.set_active_agent(start_agent);
        rolled_back.push_turn(user_turn.clone());
        rolled_back.push_turn(closing.clone());

        Exchange {
            state: rolled_back,
            turns: vec![user_turn, closing],
            outcome,
            phases: trace.finish(),
        }
    }

    async fn run(
        &self,
        working: &mut ConversationState,
        message: &str,
        trace: &mut PhaseTrace,
    ) -> Result<Resolution, EngineError> {
        let mut completed_handoffs = 0;

        loop {
            let active = working.active_agent().clone();
            let agent = self
                .registry
                .get(&active)
                .ok_or_else(|| EngineError::UnknownAgent(active.to_string()))?;

            let step = self.generate(agent, working, message, trace).await?;

            trace.enter(Phase::GuardrailCheck);
            let verdicts = {
                let instructions = agent
                    .behavior
                    .instructions(&agent.definition, working.memory());
                let ctx = GuardrailContext {
                    user_message: message,
                    history: working.turns(),
                    instructions: &instructions,
                };
                self.guardrails.evaluate(&step.candidate, &ctx).await
            };
            if guardrails::first_tripped(&verdicts).is_some() {
                trace.enter(Phase::Blocked);
                return Ok(Resolution::Blocked { verdicts });
            }

            let Step {
                candidate,
                tool_calls,
            } = step;

            if let Some(directive) = &candidate.handoff {
                trace.enter(Phase::HandoffPending);
                match self.handoffs.validate(
                    &self.registry,
                    &agent.definition,
                    &directive.target,
                    completed_handoffs,
                ) {
                    Ok(()) => {
                        let target = self
                            .registry
                            .get(&directive.target)
                            .ok_or_else(|| EngineError::UnknownAgent(directive.target.to_string()))?;
                        debug!("Handoff reason: {}", directive.reason);
                        Self::apply_memory(working, &candidate);
                        self.handoffs.transfer(
                            working,
                            &active,
                            &target.definition,
                            tool_calls,
                            verdicts,
                        );
                        completed_handoffs += 1;
                        trace.enter(Phase::Routing);
                        continue;
                    }
                    Err(err @ EngineError::HandoffInvalid { .. }) => {
                        warn!("Ignoring handoff: {}", err);
                    }
                    Err(err) => return Err(err),
                }
            }

            trace.enter(Phase::Committing);
            let text = if candidate.text.trim().is_empty() {
                FALLBACK_REPLY.to_string()
            } else {
                candidate.text.clone()
            };
            Self::apply_memory(working, &candidate);
            working.push_turn(Turn::agent(active.clone(), text, tool_calls, verdicts));
            working.set_active_agent(active.clone());

            return Ok(Resolution::Committed { agent_id: active });
        }
    }

    /// Run one agent until it stops asking for tools
    async fn generate(
        &self,
        agent: &RegisteredAgent,
        working: &ConversationState,
        message: &str,
        trace: &mut PhaseTrace,
    ) -> Result<Step, EngineError> {
        let definition = &agent.definition;
        let mut recorded: Vec<ToolCall> = Vec::new();
        let mut fed_back: Vec<ToolCall> = Vec::new();

        for round in 0..=self.max_tool_iterations {
            trace.enter(Phase::Generating);
            let candidate = {
                let ctx = AgentContext {
                    definition,
                    user_message: message,
                    history: working.turns(),
                    memory: working.memory(),
                    tool_results: &fed_back,
                    round,
                };
                agent.behavior.generate(&ctx)
            };

            if !candidate.needs_tools() {
                return Ok(Step {
                    candidate,
                    tool_calls: recorded,
                });
            }
            if round == self.max_tool_iterations {
                break;
            }

            trace.enter(Phase::ToolInvocation);
            let allowed: Vec<ToolRequest> = candidate
                .tool_requests
                .iter()
                .filter(|request| definition.allows_tool(&request.tool_id))
                .cloned()
                .collect();
            let mut invoked = self.tools.invoke_all(&allowed).await.into_iter();

            for request in &candidate.tool_requests {
                if definition.allows_tool(&request.tool_id) {
                    if let Some(call) = invoked.next() {
                        recorded.push(call.clone());
                        fed_back.push(call);
                    }
                } else {
                    warn!(
                        "Agent {} requested tool '{}' outside its allowed tools",
                        definition.id, request.tool_id
                    );
                    fed_back.push(ToolCall::error(
                        request,
                        format!("Tool '{}' is not available to this agent", request.tool_id),
                    ));
                }
            }
        }

        Err(EngineError::ToolLoopExceeded {
            limit: self.max_tool_iterations,
        })
    }

    fn apply_memory(working: &mut ConversationState, candidate: &Candidate) {
        for (key, value) in &candidate.memory_writes {
            working.remember(key.clone(), value.clone());
        }
    }
}
