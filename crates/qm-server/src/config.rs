//! Server configuration, loadable from TOML with environment overrides.

use std::str::FromStr;

use qm_interpreter::ModelConfig;
use serde::Deserialize;

/// Which interpretation strategy serves `/api/chat`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverMode {
    #[default]
    Rules,
    Model,
    Tiered,
}

impl FromStr for ResolverMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rules" => Ok(Self::Rules),
            "model" => Ok(Self::Model),
            "tiered" => Ok(Self::Tiered),
            other => anyhow::bail!("unknown resolver mode '{other}' (expected rules, model or tiered)"),
        }
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen address (e.g., "0.0.0.0").
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub resolver: ResolverMode,
    /// Conversational model settings. Disabled unless configured.
    #[serde(default)]
    pub model: ModelConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            resolver: ResolverMode::default(),
            model: ModelConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Apply `QUEST_*` environment overrides.
    pub fn with_env_overrides(self) -> anyhow::Result<Self> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        if let Some(host) = lookup("QUEST_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("QUEST_PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid QUEST_PORT '{port}': {e}"))?;
        }
        if let Some(mode) = lookup("QUEST_RESOLVER") {
            self.resolver = mode.parse()?;
        }
        if let Some(host) = lookup("QUEST_MODEL_HOST") {
            self.model.host = host;
            self.model.enabled = true;
        }
        if let Some(model) = lookup("QUEST_MODEL") {
            self.model.model = model;
            self.model.enabled = true;
        }
        Ok(self)
    }

    /// Listen address as `host:port`.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resolver mode actually served. Model-backed modes fall back to
    /// rules while the model is disabled.
    pub fn effective_resolver(&self) -> ResolverMode {
        match self.resolver {
            ResolverMode::Model | ResolverMode::Tiered if !self.model.enabled => {
                tracing::warn!(
                    requested = ?self.resolver,
                    "model disabled, serving rule-based resolver"
                );
                ResolverMode::Rules
            }
            mode => mode,
        }
    }
}
