//! Configuration management
//!
//! This module handles loading, validation, and management of the Coursewright
//! configuration. Configuration is stored in TOML format at
//! ~/.coursewright/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Log level, data directory for saved transcripts
//! - **orchestrator**: Entry agent and per-message loop limits
//! - **guardrails**: Extra topic keywords and jailbreak patterns
//! - **faq**: Extra FAQ entries appended to the built-in table
//!
//! Every section except `core` may be omitted.
//!
//! # Examples
//!
//! ```no_run
//! use coursewright_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load configuration from default location
//! let config = Config::load_or_create()?;
//!
//! println!("Entry agent: {}", config.orchestrator.entry_agent);
//! println!("Max handoffs: {}", config.orchestrator.max_handoffs);
//! # Ok(())
//! # }
//! ```

use crate::orchestrator::{DEFAULT_MAX_HANDOFFS, DEFAULT_MAX_TOOL_ITERATIONS};
use crate::tools::FaqEntry;
use regex::Regex;
use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Core engine settings
    pub core: CoreConfig,

    /// Dispatch loop settings
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Guardrail vocabulary extensions
    #[serde(default)]
    pub guardrails: GuardrailsConfig,

    /// Extra FAQ answers
    #[serde(default)]
    pub faq: FaqConfig,
}

/// Core engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory for saved transcripts (supports ~ expansion)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

/// Orchestrator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Agent that receives the first message of a conversation
    #[serde(default = "default_entry_agent")]
    pub entry_agent: String,

    /// Tool rounds allowed in one generation step
    #[serde(default = "default_max_tool_iterations")]
    pub max_tool_iterations: usize,

    /// Handoffs allowed while handling one message
    #[serde(default = "default_max_handoffs")]
    pub max_handoffs: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            entry_agent: default_entry_agent(),
            max_tool_iterations: default_max_tool_iterations(),
            max_handoffs: default_max_handoffs(),
        }
    }
}

/// Guardrail configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardrailsConfig {
    /// Additional words or phrases that make a message on-topic
    #[serde(default)]
    pub extra_topic_keywords: Vec<String>,

    /// Additional regular expressions that mark a jailbreak attempt
    #[serde(default)]
    pub extra_jailbreak_patterns: Vec<String>,
}

/// FAQ configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqConfig {
    #[serde(default)]
    pub entries: Vec<FaqEntry>,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("~/.coursewright/transcripts")
}

fn default_entry_agent() -> String {
    crate::agent::ids::TRIAGE.to_string()
}

fn default_max_tool_iterations() -> usize {
    DEFAULT_MAX_TOOL_ITERATIONS
}

fn default_max_handoffs() -> usize {
    DEFAULT_MAX_HANDOFFS
}

impl Config {
    /// Load configuration from the default location (~/.coursewright/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml(&contents)
    }

    /// Parse and validate configuration text
    pub fn from_toml(contents: &str) -> Result<Self, EngineError> {
        let mut config: Config = toml::from_str(contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Serialize configuration as TOML
    pub fn to_toml(&self) -> Result<String, EngineError> {
        toml::to_string_pretty(self)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Create default configuration and save to path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Directory creation fails
    /// - File write fails
    fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let mut config = Self::default_config();
        config.validate_and_process()?;

        fs::write(path, config.to_toml()?)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(config)
    }

    /// Get the default configuration file path (~/.coursewright/config.toml)
    pub fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".coursewright").join("config.toml"))
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            core: CoreConfig {
                log_level: default_log_level(),
                data_dir: default_data_dir(),
            },
            orchestrator: OrchestratorConfig::default(),
            guardrails: GuardrailsConfig::default(),
            faq: FaqConfig::default(),
        }
    }

    /// Validate and process configuration
    ///
    /// This method:
    /// - Validates log level and loop limits
    /// - Compiles extra jailbreak patterns
    /// - Rejects blank keywords and incomplete FAQ entries
    /// - Expands ~ in the data directory and creates it
    fn validate_and_process(&mut self) -> Result<(), EngineError> {
        // Validate log level
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        // Validate orchestrator limits
        if self.orchestrator.entry_agent.trim().is_empty() {
            return Err(EngineError::Config("entry_agent must not be empty".to_string()));
        }
        if self.orchestrator.max_tool_iterations == 0 {
            return Err(EngineError::Config(
                "max_tool_iterations must be at least 1".to_string(),
            ));
        }
        if self.orchestrator.max_handoffs == 0 {
            return Err(EngineError::Config(
                "max_handoffs must be at least 1".to_string(),
            ));
        }

        // Validate guardrail extensions
        if self
            .guardrails
            .extra_topic_keywords
            .iter()
            .any(|k| k.trim().is_empty())
        {
            return Err(EngineError::Config(
                "extra_topic_keywords must not contain blank entries".to_string(),
            ));
        }
        for pattern in &self.guardrails.extra_jailbreak_patterns {
            Regex::new(pattern).map_err(|e| {
                EngineError::Config(format!("Invalid jailbreak pattern '{}': {}", pattern, e))
            })?;
        }

        // Validate FAQ entries
        for entry in &self.faq.entries {
            if entry.topic.trim().is_empty() || entry.answer.trim().is_empty() {
                return Err(EngineError::Config(
                    "FAQ entries need a topic and an answer".to_string(),
                ));
            }
            if entry.fragments.is_empty() || entry.fragments.iter().any(|f| f.trim().is_empty()) {
                return Err(EngineError::Config(format!(
                    "FAQ entry '{}' needs at least one non-blank fragment",
                    entry.topic
                )));
            }
        }

        // Expand and create data directory
        self.core.data_dir = expand_path(&self.core.data_dir)?;
        if !self.core.data_dir.exists() {
            fs::create_dir_all(&self.core.data_dir).map_err(|e| {
                EngineError::Config(format!("Failed to create data directory: {}", e))
            })?;
        }

        Ok(())
    }
}

/// Expand ~ in path to user's home directory
///
/// # Examples
///
/// ```ignore
/// let path = PathBuf::from("~/transcripts");
/// let expanded = expand_path(&path)?;
/// // expanded is now /home/user/transcripts (on Unix)
/// ```
fn expand_path(path: &Path) -> Result<PathBuf, EngineError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| EngineError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir, extra: &str) -> String {
        format!(
            "[core]\nlog_level = \"debug\"\ndata_dir = {:?}\n{}",
            dir.path().join("transcripts").to_string_lossy(),
            extra
        )
    }

    #[test]
    fn test_default_config_creation() {
        let config = Config::default_config();

        assert_eq!(config.core.log_level, "info");
        assert_eq!(config.orchestrator.entry_agent, "triage");
        assert_eq!(config.orchestrator.max_tool_iterations, 4);
        assert_eq!(config.orchestrator.max_handoffs, 4);
        assert!(config.faq.entries.is_empty());
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::from_toml(&config_in(&dir, "")).unwrap();

        assert_eq!(config.orchestrator, OrchestratorConfig::default());
        assert!(config.core.data_dir.is_dir());
    }

    #[test]
    fn test_full_config() {
        let dir = TempDir::new().unwrap();
        let extra = r#"
[orchestrator]
max_handoffs = 2

[guardrails]
extra_topic_keywords = ["podcasting"]
extra_jailbreak_patterns = ["(?i)grandma exploit"]

[[faq.entries]]
topic = "cohort_size"
fragments = ["cohort size", "how big should a cohort be"]
answer = "Keep cohorts between 10 and 30 learners."
"#;
        let config = Config::from_toml(&config_in(&dir, extra)).unwrap();

        assert_eq!(config.orchestrator.max_handoffs, 2);
        assert_eq!(config.orchestrator.max_tool_iterations, 4);
        assert_eq!(config.guardrails.extra_topic_keywords, vec!["podcasting"]);
        assert_eq!(config.faq.entries[0].topic, "cohort_size");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = TempDir::new().unwrap();
        let cases = [
            "[orchestrator]\nmax_handoffs = 0\n",
            "[orchestrator]\nmax_tool_iterations = 0\n",
            "[guardrails]\nextra_jailbreak_patterns = [\"(unclosed\"]\n",
            "[guardrails]\nextra_topic_keywords = [\"  \"]\n",
            "[[faq.entries]]\ntopic = \"x\"\nfragments = []\nanswer = \"y\"\n",
        ];

        for case in cases {
            let err = Config::from_toml(&config_in(&dir, case)).unwrap_err();
            assert!(matches!(err, EngineError::Config(_)), "accepted: {case}");
        }
    }

    #[test]
    fn test_invalid_log_level() {
        let err = Config::from_toml("[core]\nlog_level = \"loud\"\n").unwrap_err();
        assert!(err.to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test");
        let expanded = expand_path(&path).unwrap();

        let home = dirs::home_dir().unwrap();
        assert_eq!(expanded, home.join("test"));
    }

    #[test]
    fn test_expand_path_without_tilde() {
        let path = PathBuf::from("/absolute/path");
        let expanded = expand_path(&path).unwrap();

        assert_eq!(expanded, path);
    }

    #[test]
    fn test_load_from_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, config_in(&dir, "")).unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.core.log_level, "debug");
    }
}
