//! Configuration file schema

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration, merged from defaults and TOML files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub agent: AgentFileConfig,
    pub channel: ChannelFileConfig,
    pub store: StoreFileConfig,
    pub client: ClientFileConfig,
}

/// External agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentFileConfig {
    /// Agent identifier at the invocation service.
    pub agent_id: String,
    /// Deployment alias of the agent.
    pub alias_id: String,
    /// Service region; the SDK default chain applies when unset.
    pub region: Option<String>,
    /// Named credentials profile, if not using the default chain.
    pub profile: Option<String>,
    /// Upper bound for one invocation, stream drain included.
    pub timeout_secs: u64,
}

impl Default for AgentFileConfig {
    fn default() -> Self {
        Self {
            agent_id: String::new(),
            alias_id: String::new(),
            region: None,
            profile: None,
            timeout_secs: 60,
        }
    }
}

/// Notification channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelFileConfig {
    /// Topic completion events are published on.
    pub topic: String,
    /// Per-topic buffer capacity.
    pub capacity: usize,
}

impl Default for ChannelFileConfig {
    fn default() -> Self {
        Self {
            topic: "default/channel".to_string(),
            capacity: 64,
        }
    }
}

/// Message store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreFileConfig {
    /// JSONL file backing the store; in-memory when unset.
    pub path: Option<PathBuf>,
}

/// Client-side settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientFileConfig {
    /// How long the client waits for a completion notification before it
    /// synthesizes a local error answer.
    pub answer_timeout_secs: u64,
    /// JSONL exchange log; disabled when unset.
    pub exchange_log: Option<PathBuf>,
}

impl Default for ClientFileConfig {
    fn default() -> Self {
        Self {
            answer_timeout_secs: 90,
            exchange_log: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FileConfig::default();
        assert_eq!(config.agent.timeout_secs, 60);
        assert_eq!(config.channel.topic, "default/channel");
        assert!(config.store.path.is_none());
        assert_eq!(config.client.answer_timeout_secs, 90);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: FileConfig = toml::from_str(
            r#"
            [agent]
            agent_id = "AGENT"
            alias_id = "ALIAS"
            region = "eu-west-1"
            "#,
        )
        .unwrap();
        assert_eq!(config.agent.agent_id, "AGENT");
        assert_eq!(config.agent.timeout_secs, 60);
        assert_eq!(config.channel.capacity, 64);
    }
}
