//! Loop limit tests
//!
//! Custom agent catalogs that bounce a message between agents or keep asking
//! for tools, checking that the orchestrator aborts cleanly and leaves prior
//! history untouched.

use async_trait::async_trait;
use coursewright_engine::agent::{
    Agent, AgentContext, AgentDefinition, AgentRegistry, Candidate, RegistryBuilder,
};
use coursewright_engine::events::ConversationEvent;
use coursewright_engine::guardrails::GuardrailEngine;
use coursewright_engine::orchestrator::{Orchestrator, OrchestratorSettings, Outcome};
use coursewright_engine::tools::ToolInvoker;
use sdk::errors::EngineError;
use sdk::tool::LookupTool;
use sdk::types::{AgentId, Role, ToolError, ToolId, ToolRequest};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Always hands the message to `target`, unless the user says "stay"
struct Bouncer {
    target: &'static str,
}

impl Agent for Bouncer {
    fn generate(&self, ctx: &AgentContext<'_>) -> Candidate {
        if ctx.user_message.contains("stay") {
            Candidate::reply(format!("{} keeps it", ctx.definition.id))
        } else {
            Candidate::handoff(self.target, "not mine").with_text("passing along")
        }
    }
}

/// Asks for the echo tool on every round
struct ToolHog;

impl Agent for ToolHog {
    fn generate(&self, ctx: &AgentContext<'_>) -> Candidate {
        Candidate::use_tools(vec![
            ToolRequest::new("echo").with_param("text", json!(ctx.round.to_string()))
        ])
    }
}

/// Asks for the echo tool until it has `rounds` results
struct Patient {
    rounds: usize,
}

impl Agent for Patient {
    fn generate(&self, ctx: &AgentContext<'_>) -> Candidate {
        if ctx.tool_results.len() >= self.rounds {
            Candidate::reply(format!("done after {} lookups", ctx.tool_results.len()))
        } else {
            Candidate::use_tools(vec![ToolRequest::new("echo").with_param("text", json!("hi"))])
        }
    }
}

struct EchoTool {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl LookupTool for EchoTool {
    fn id(&self) -> ToolId {
        ToolId::from("echo")
    }

    fn description(&self) -> &str {
        "Repeats its input"
    }

    async fn lookup(&self, request: &ToolRequest) -> Result<Option<String>, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(request.param_str("text")?.to_string()))
    }
}

fn ping_pong_registry() -> AgentRegistry {
    RegistryBuilder::new()
        .register(
            AgentDefinition::new("ping", "Ping", "Pass to pong").with_handoffs(["pong"]),
            Arc::new(Bouncer { target: "pong" }),
        )
        .register(
            AgentDefinition::new("pong", "Pong", "Pass to ping").with_handoffs(["ping"]),
            Arc::new(Bouncer { target: "ping" }),
        )
        .build()
        .unwrap()
}

fn ping_pong(max_handoffs: usize) -> Orchestrator {
    Orchestrator::new(
        ping_pong_registry(),
        ToolInvoker::empty(),
        GuardrailEngine::new(vec![]),
        OrchestratorSettings {
            entry_agent: AgentId::from("ping"),
            max_tool_iterations: 2,
            max_handoffs,
        },
    )
    .unwrap()
}

fn tool_orchestrator(behavior: Arc<dyn Agent>, calls: Arc<AtomicUsize>) -> Orchestrator {
    let registry = RegistryBuilder::new()
        .register(
            AgentDefinition::new("looper", "Looper", "Look things up").with_tools(["echo"]),
            behavior,
        )
        .build()
        .unwrap();

    let mut tools = ToolInvoker::empty();
    tools.register(Arc::new(EchoTool { calls }));

    Orchestrator::new(
        registry,
        tools,
        GuardrailEngine::new(vec![]),
        OrchestratorSettings {
            entry_agent: AgentId::from("looper"),
            max_tool_iterations: 3,
            max_handoffs: 4,
        },
    )
    .unwrap()
}

#[tokio::test]
async fn test_ping_pong_aborts_with_handoff_loop_exceeded() {
    let orchestrator = ping_pong(4);
    let state = orchestrator.new_conversation();

    let settled = orchestrator
        .handle_user_message(&state, "please stay")
        .await
        .unwrap();
    assert!(matches!(settled.outcome, Outcome::Responded { .. }));
    let prior = settled.state.turns().to_vec();

    let exchange = orchestrator
        .handle_user_message(&settled.state, "bounce this around")
        .await
        .unwrap();

    match &exchange.outcome {
        Outcome::Aborted(EngineError::HandoffLoopExceeded { limit }) => assert_eq!(*limit, 4),
        other => panic!("expected a handoff loop abort, got {:?}", other),
    }

    // Prior turns are an unchanged prefix; only the user turn and the apology follow
    let turns = exchange.state.turns();
    assert_eq!(&turns[..prior.len()], prior.as_slice());
    assert_eq!(turns.len(), prior.len() + 2);
    assert_eq!(turns[prior.len()].role, Role::User);
    assert_eq!(turns[prior.len() + 1].role, Role::System);
    assert!(turns[prior.len() + 1].handoff.is_none());

    // None of the intermediate transfers survive
    assert!(!exchange
        .events()
        .iter()
        .any(|e| matches!(e, ConversationEvent::Handoff { .. })));
    assert_eq!(exchange.state.active_agent().as_str(), "ping");
}

#[tokio::test]
async fn test_handoffs_below_the_limit_complete() {
    struct Once;

    impl Agent for Once {
        fn generate(&self, ctx: &AgentContext<'_>) -> Candidate {
            if ctx.definition.id.as_str() == "ping" {
                Candidate::handoff("pong", "yours")
            } else {
                Candidate::reply("pong here")
            }
        }
    }

    let registry = RegistryBuilder::new()
        .register(
            AgentDefinition::new("ping", "Ping", "Pass to pong").with_handoffs(["pong"]),
            Arc::new(Once),
        )
        .register(
            AgentDefinition::new("pong", "Pong", "Answer").with_handoffs(["ping"]),
            Arc::new(Once),
        )
        .build()
        .unwrap();
    let orchestrator = Orchestrator::new(
        registry,
        ToolInvoker::empty(),
        GuardrailEngine::new(vec![]),
        OrchestratorSettings {
            entry_agent: AgentId::from("ping"),
            max_tool_iterations: 1,
            max_handoffs: 1,
        },
    )
    .unwrap();

    let exchange = orchestrator
        .handle_user_message(&orchestrator.new_conversation(), "hello")
        .await
        .unwrap();

    assert!(matches!(exchange.outcome, Outcome::Responded { .. }));
    assert_eq!(exchange.state.active_agent().as_str(), "pong");
    assert_eq!(exchange.reply().unwrap().content, "pong here");
}

#[tokio::test]
async fn test_tool_hog_aborts_with_tool_loop_exceeded() {
    let calls = Arc::new(AtomicUsize::new(0));
    let orchestrator = tool_orchestrator(Arc::new(ToolHog), Arc::clone(&calls));
    let state = orchestrator.new_conversation();

    let exchange = orchestrator
        .handle_user_message(&state, "look it up")
        .await
        .unwrap();

    match &exchange.outcome {
        Outcome::Aborted(EngineError::ToolLoopExceeded { limit }) => assert_eq!(*limit, 3),
        other => panic!("expected a tool loop abort, got {:?}", other),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    assert_eq!(exchange.turns.len(), 2);
    assert!(exchange.turns[1].tool_calls.is_empty());
    match exchange.events().as_slice() {
        [ConversationEvent::Message { agent_id: None, text }] => {
            assert!(text.starts_with("Sorry, I couldn't finish handling that request."));
        }
        other => panic!("expected a single apology, got {:?}", other),
    }
}

#[tokio::test]
async fn test_tool_rounds_up_to_the_limit_are_allowed() {
    let calls = Arc::new(AtomicUsize::new(0));
    let orchestrator = tool_orchestrator(Arc::new(Patient { rounds: 3 }), Arc::clone(&calls));

    let exchange = orchestrator
        .handle_user_message(&orchestrator.new_conversation(), "look it up")
        .await
        .unwrap();

    assert!(matches!(exchange.outcome, Outcome::Responded { .. }));
    let reply = exchange.reply().unwrap();
    assert_eq!(reply.content, "done after 3 lookups");
    assert_eq!(reply.tool_calls.len(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_zero_limits_are_rejected() {
    let err = Orchestrator::new(
        ping_pong_registry(),
        ToolInvoker::empty(),
        GuardrailEngine::new(vec![]),
        OrchestratorSettings {
            entry_agent: AgentId::from("ping"),
            max_tool_iterations: 1,
            max_handoffs: 0,
        },
    )
    .err()
    .expect("zero handoff limit rejected");
    assert!(matches!(err, EngineError::Config(_)));
}

#[test]
fn test_unknown_entry_agent_is_rejected() {
    let err = Orchestrator::new(
        ping_pong_registry(),
        ToolInvoker::empty(),
        GuardrailEngine::new(vec![]),
        OrchestratorSettings {
            entry_agent: AgentId::from("triage"),
            ..OrchestratorSettings::default()
        },
    )
    .err()
    .expect("unknown entry agent rejected");
    assert!(matches!(err, EngineError::UnknownAgent(_)));
}

#[test]
fn test_allowed_tool_must_exist() {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = RegistryBuilder::new()
        .register(
            AgentDefinition::new("looper", "Looper", "Look things up").with_tools(["missing"]),
            Arc::new(ToolHog),
        )
        .build()
        .unwrap();
    let mut tools = ToolInvoker::empty();
    tools.register(Arc::new(EchoTool { calls }));

    let err = Orchestrator::new(
        registry,
        tools,
        GuardrailEngine::new(vec![]),
        OrchestratorSettings {
            entry_agent: AgentId::from("looper"),
            ..OrchestratorSettings::default()
        },
    )
    .err()
    .expect("unknown tool rejected");
    assert!(matches!(err, EngineError::MalformedRegistry(_)));
}
