//! CLI interface for Coursewright
//!
//! This module provides the command-line interface using clap's derive API.
//! It defines all commands and global flags for talking to the course-design
//! agents from a terminal.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Coursewright course-design assistant
///
/// A team of specialist agents that helps entrepreneurs plan, structure and
/// review courses, with safety checks on every reply.
#[derive(Parser, Debug)]
#[command(name = "coursewright")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start an interactive conversation
    Chat {
        /// Save the transcript to this file when the conversation ends
        #[arg(long, value_name = "FILE")]
        save: Option<PathBuf>,
    },

    /// Send a single message and print the reply
    Send {
        /// The message to send
        message: String,
    },

    /// List the registered agents
    Agents,

    /// Look up an FAQ answer directly
    Faq {
        /// The question to look up
        question: String,
    },

    /// Re-emit the events of a saved transcript
    Replay {
        /// Transcript file
        file: PathBuf,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["coursewright", "agents"]);
        assert!(matches!(cli.command, Command::Agents));
        assert!(!cli.json);
        assert!(cli.log.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["coursewright", "--json", "--log", "debug", "agents"]);
        assert!(cli.json);
        assert_eq!(cli.log, Some("debug".to_string()));
    }

    #[test]
    fn test_send_command() {
        let cli = Cli::parse_from(["coursewright", "send", "How long should each module be?"]);
        if let Command::Send { message } = cli.command {
            assert_eq!(message, "How long should each module be?");
        } else {
            panic!("Expected Send command");
        }
    }

    #[test]
    fn test_chat_save() {
        let cli = Cli::parse_from(["coursewright", "chat", "--save", "pricing.json"]);
        if let Command::Chat { save } = cli.command {
            assert_eq!(save, Some(PathBuf::from("pricing.json")));
        } else {
            panic!("Expected Chat command");
        }
    }

    #[test]
    fn test_config_show() {
        let cli = Cli::parse_from(["coursewright", "config", "show"]);
        if let Command::Config { action } = cli.command {
            assert!(matches!(action, ConfigAction::Show));
        } else {
            panic!("Expected Config command");
        }
    }
}
