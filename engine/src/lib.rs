//! Coursewright Engine Library
//!
//! This library provides the conversation engine behind Coursewright: a team
//! of course-design agents coordinated by an orchestrator, with lookup tools,
//! guardrails and audited handoffs. It is used by both the main binary and
//! integration tests.

/// Configuration management module
pub mod config;

/// Text normalization shared by classifiers and guardrails
pub mod text;

/// Conversation state and shared memory
pub mod conversation;

/// Agent definitions, behaviors and the registry
pub mod agent;

/// Built-in lookup tools
pub mod tools;

/// Guardrails applied to every candidate response
pub mod guardrails;

/// Handoff validation and transfer
pub mod handoff;

/// Per-message dispatch loop
pub mod orchestrator;

/// Client-facing conversation events
pub mod events;

/// Multi-conversation service
pub mod service;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
