//! Configuration loading and validation for VaultMind.
//!
//! Loads configuration from `vaultmind.toml` with `VAULTMIND_*` environment
//! variable overrides. Out-of-range values are clamped with a warning
//! rather than rejected, so a bad settings file never blocks a turn.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// Parallel tool execution is clamped to this range regardless of what
/// the settings file asks for.
pub const MIN_CONCURRENCY: usize = 1;
pub const MAX_CONCURRENCY: usize = 10;

/// Smallest accepted retrieval context budget, in characters.
pub const MIN_CONTEXT_BUDGET: usize = 1_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// The root configuration structure. Maps directly to `vaultmind.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default model identifier
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Parallel tool execution settings
    #[serde(default)]
    pub parallelism: ParallelismConfig,

    /// Retrieval settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

fn default_model() -> String {
    "claude-sonnet-4".into()
}
fn default_temperature() -> f32 {
    0.7
}

/// Settings consumed by the tool execution coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallelismConfig {
    /// When false, every batch runs strictly sequentially
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum simultaneously running tool calls (clamped 1–10)
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_true() -> bool {
    true
}
fn default_max_concurrent() -> usize {
    4
}

impl Default for ParallelismConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

impl ParallelismConfig {
    /// The concurrency limit after server-side clamping.
    pub fn effective_limit(&self) -> usize {
        self.max_concurrent.clamp(MIN_CONCURRENCY, MAX_CONCURRENCY)
    }
}

/// Settings for the retrieval-augmented answer path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Hard character budget for the assembled context block
    #[serde(default = "default_context_budget")]
    pub context_budget_chars: usize,

    /// How many prior turns feed the question-condensing step
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

fn default_context_budget() -> usize {
    24_000
}
fn default_history_window() -> usize {
    6
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            context_budget_chars: default_context_budget(),
            history_window: default_history_window(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            default_temperature: default_temperature(),
            parallelism: ParallelismConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, apply environment overrides,
    /// and validate. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            toml::from_str(&raw)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        config.validate();
        Ok(config)
    }

    /// Apply `VAULTMIND_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(model) = std::env::var("VAULTMIND_MODEL") {
            self.default_model = model;
        }
        if let Ok(v) = std::env::var("VAULTMIND_PARALLEL_ENABLED") {
            self.parallelism.enabled = v == "1" || v.eq_ignore_ascii_case("true");
        }
        if let Ok(v) = std::env::var("VAULTMIND_MAX_CONCURRENT")
            && let Ok(n) = v.parse()
        {
            self.parallelism.max_concurrent = n;
        }
    }

    /// Clamp out-of-range values in place.
    fn validate(&mut self) {
        let limit = self.parallelism.effective_limit();
        if limit != self.parallelism.max_concurrent {
            warn!(
                requested = self.parallelism.max_concurrent,
                clamped = limit,
                "Concurrency setting out of range, clamping"
            );
            self.parallelism.max_concurrent = limit;
        }
        if self.retrieval.context_budget_chars < MIN_CONTEXT_BUDGET {
            warn!(
                requested = self.retrieval.context_budget_chars,
                floor = MIN_CONTEXT_BUDGET,
                "Context budget below floor, raising"
            );
            self.retrieval.context_budget_chars = MIN_CONTEXT_BUDGET;
        }
        if !(0.0..=2.0).contains(&self.default_temperature) {
            self.default_temperature = default_temperature();
        }
    }
}
