//! Console configuration file types and loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use super::store::MemoryStore;
use crate::state::{ChannelContext, Identity};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Console configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Where the console is "sitting".
    pub console: ConsoleConfig,
    /// Operator options, nested by server and channel scope.
    #[serde(default)]
    pub options: toml::Table,
    /// Initial channel membership for the simulated channel.
    #[serde(default)]
    pub roster: Vec<RosterEntry>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Flatten `[options]` into a scoped key store.
    pub fn option_store(&self) -> MemoryStore {
        MemoryStore::from_table(&self.options)
    }

    pub fn channel_context(&self) -> ChannelContext {
        ChannelContext::new(&self.console.server, &self.console.channel)
    }
}

/// Console identity and location.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
    /// Server name used for option scoping (e.g., "libera").
    pub server: String,
    /// Channel the console operates on (e.g., "#rust").
    pub channel: String,
    /// Our own nickname on that server.
    pub nick: String,
}

/// One channel member seeded into the simulated channel.
#[derive(Debug, Clone, Deserialize)]
pub struct RosterEntry {
    pub nick: String,
    #[serde(default = "default_user")]
    pub user: String,
    pub host: String,
    /// Holds +o.
    #[serde(default)]
    pub op: bool,
}

fn default_user() -> String {
    "~user".to_string()
}

impl RosterEntry {
    pub fn identity(&self) -> Identity {
        Identity::new(&self.nick, &self.user, &self.host)
    }
}
