//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - chat: Interactive conversation, optionally saved as a transcript
//! - send: One message, one exchange
//! - agents: List the agent registry
//! - faq: Direct FAQ lookup
//! - replay: Re-emit the events of a saved transcript
//! - config show: Print the effective configuration

use anyhow::{Context, Result};
use serde_json::json;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::config::Config;
use crate::conversation::ConversationState;
use crate::events::{self, ConversationEvent};
use crate::orchestrator::{Exchange, Orchestrator, Outcome};
use crate::tools::FAQ_LOOKUP;
use sdk::types::{Role, ToolRequest, Turn};

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Words that end an interactive session
const EXIT_WORDS: &[&str] = &["exit", "quit", "bye"];

/// Send a single message to a fresh conversation
pub async fn handle_send(message: String, config: &Config, format: OutputFormat) -> Result<()> {
    let orchestrator = Orchestrator::from_config(config)?;
    let state = orchestrator.new_conversation();

    let exchange = orchestrator.handle_user_message(&state, &message).await?;
    print_exchange(&orchestrator, &exchange, format)
}

/// Interactive conversation on stdin/stdout
pub async fn handle_chat(save: Option<PathBuf>, config: &Config, format: OutputFormat) -> Result<()> {
    let orchestrator = Orchestrator::from_config(config)?;
    let mut state = orchestrator.new_conversation();

    if let OutputFormat::Text = format {
        println!("Coursewright - tell me about the course you want to build.");
        println!("Type 'exit' to leave.");
        println!();
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        if let OutputFormat::Text = format {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if EXIT_WORDS.contains(&line.to_lowercase().as_str()) {
            break;
        }

        let exchange = orchestrator.handle_user_message(&state, line).await?;
        print_exchange(&orchestrator, &exchange, format)?;
        state = exchange.state;
    }

    if let Some(file) = save {
        let path = transcript_path(config, &file);
        save_transcript(&state, &path)?;
        if let OutputFormat::Text = format {
            println!("Transcript saved to {}", path.display());
        }
    }

    Ok(())
}

/// List the registered agents
pub fn handle_agents(config: &Config, format: OutputFormat) -> Result<()> {
    let orchestrator = Orchestrator::from_config(config)?;
    let registry = orchestrator.registry();

    match format {
        OutputFormat::Text => {
            println!("Agents ({} registered):", registry.len());
            println!();
            for definition in registry.definitions() {
                let entry = if &definition.id == orchestrator.entry_agent() {
                    " (entry)"
                } else {
                    ""
                };
                println!("{}{}", definition.display_name, entry);
                println!("  id:        {}", definition.id);
                println!("  tools:     {}", join_or_none(definition.allowed_tools.iter()));
                println!("  handoffs:  {}", join_or_none(definition.allowed_handoffs.iter()));
                println!();
            }
        }
        OutputFormat::Json => {
            let agents: Vec<_> = registry
                .definitions()
                .map(|definition| {
                    json!({
                        "id": definition.id,
                        "display_name": definition.display_name,
                        "allowed_tools": definition.allowed_tools,
                        "allowed_handoffs": definition.allowed_handoffs,
                        "entry": &definition.id == orchestrator.entry_agent(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&agents)?);
        }
    }

    Ok(())
}

/// Look up an FAQ answer without going through an agent
pub async fn handle_faq(question: String, config: &Config, format: OutputFormat) -> Result<()> {
    let orchestrator = Orchestrator::from_config(config)?;
    let request = ToolRequest::new(FAQ_LOOKUP).with_param("question", json!(question));
    let call = orchestrator.tools().invoke(&request).await;

    match format {
        OutputFormat::Text => {
            if call.is_ok() {
                println!("{}", call.output);
            } else if call.output.is_empty() {
                println!("No answer found ({})", call.status);
            } else {
                println!("Lookup failed ({}): {}", call.status, call.output);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&call)?);
        }
    }

    Ok(())
}

/// Re-emit the events of a saved transcript
pub fn handle_replay(file: PathBuf, config: &Config, format: OutputFormat) -> Result<()> {
    let path = if file.exists() {
        file
    } else {
        transcript_path(config, &file)
    };
    let state = load_transcript(&path)?;

    match format {
        OutputFormat::Text => {
            println!("Transcript: {}", path.display());
            println!("Active agent: {}", state.active_agent());
            println!();
            for turn in state.turns() {
                println!("{}", render_turn(turn));
            }
        }
        OutputFormat::Json => {
            let events = events::events_for_turns(state.turns());
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
    }

    Ok(())
}

/// Print the effective configuration
pub fn handle_config_show(config: &Config, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", config.to_toml()?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
    }
    Ok(())
}

fn print_exchange(
    orchestrator: &Orchestrator,
    exchange: &Exchange,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for turn in exchange.turns.iter().filter(|t| t.role != Role::User) {
                println!("{}", render_turn_named(orchestrator, turn));
            }
            if let Outcome::Aborted(err) = &exchange.outcome {
                tracing::debug!("Exchange aborted: {}", err);
            }
            println!();
        }
        OutputFormat::Json => {
            let events: Vec<ConversationEvent> = exchange.events();
            println!("{}", serde_json::to_string(&events)?);
        }
    }
    Ok(())
}

/// Text rendering of a turn using agent display names
fn render_turn_named(orchestrator: &Orchestrator, turn: &Turn) -> String {
    let name = turn
        .agent_id
        .as_ref()
        .and_then(|id| orchestrator.registry().get(id))
        .map(|agent| agent.definition.display_name.clone());

    match (turn.role, name) {
        (Role::Agent, Some(name)) => {
            let mut out = String::new();
            for call in &turn.tool_calls {
                out.push_str(&format!("  [{} -> {}]\n", call.tool_id, call.status));
            }
            out.push_str(&format!("{}: {}", name, turn.content));
            out
        }
        _ => render_turn(turn),
    }
}

/// Text rendering of a turn using ids only
pub fn render_turn(turn: &Turn) -> String {
    let speaker = turn
        .agent_id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "system".to_string());

    if let Some(record) = &turn.handoff {
        return format!("  ({} -> {})", record.from, record.to);
    }
    if turn.is_refusal() {
        let cited = turn
            .guardrail_verdicts
            .iter()
            .find(|v| v.tripped)
            .map(|v| v.guardrail_id.to_string())
            .unwrap_or_default();
        return format!("{} [blocked: {}]", turn.content, cited);
    }

    match turn.role {
        Role::User => format!("you: {}", turn.content),
        Role::Agent | Role::System => {
            let mut out = String::new();
            for call in &turn.tool_calls {
                out.push_str(&format!("  [{} -> {}]\n", call.tool_id, call.status));
            }
            out.push_str(&format!("{}: {}", speaker, turn.content));
            out
        }
    }
}

fn join_or_none<T: std::fmt::Display>(items: impl Iterator<Item = T>) -> String {
    let joined: Vec<String> = items.map(|item| item.to_string()).collect();
    if joined.is_empty() {
        "none".to_string()
    } else {
        joined.join(", ")
    }
}

/// Relative transcript names live in the configured data directory
fn transcript_path(config: &Config, file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        config.core.data_dir.join(file)
    }
}

/// Write a conversation as a JSON transcript
pub fn save_transcript(state: &ConversationState, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, state.to_json()?)
        .with_context(|| format!("Failed to write transcript {}", path.display()))?;
    Ok(())
}

/// Read a JSON transcript
pub fn load_transcript(path: &Path) -> Result<ConversationState> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read transcript {}", path.display()))?;
    Ok(ConversationState::from_json(&contents)?)
}
