//! Configuration validation.
//!
//! Validates the console configuration at startup to catch common errors early.

use super::Config;
use super::defaults::KNOWN_KEYS;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("console.server is required")]
    MissingServerName,
    #[error("console.nick is required")]
    MissingNick,
    #[error("console.channel must start with one of '#&+!', got '{0}'")]
    InvalidChannelName(String),
    #[error("roster nick '{0}' contains characters not allowed in a nickname")]
    InvalidRosterNick(String),
    #[error("roster lists '{0}' more than once")]
    DuplicateRosterNick(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.console.server.is_empty() {
        errors.push(ValidationError::MissingServerName);
    }
    if config.console.nick.is_empty() {
        errors.push(ValidationError::MissingNick);
    }
    if !crate::irc::is_channel_name(&config.console.channel) {
        errors.push(ValidationError::InvalidChannelName(
            config.console.channel.clone(),
        ));
    }

    let mut seen = std::collections::HashSet::new();
    for entry in &config.roster {
        if entry.nick.is_empty() || entry.nick.contains(['!', '@', ' ', ',']) {
            errors.push(ValidationError::InvalidRosterNick(entry.nick.clone()));
        } else if !seen.insert(crate::irc::irc_to_lower(&entry.nick)) {
            errors.push(ValidationError::DuplicateRosterNick(entry.nick.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Non-fatal findings worth a startup warning.
pub fn warnings(config: &Config) -> Vec<String> {
    let store = config.option_store();
    let mut out = Vec::new();

    let has_op_cmd = store
        .keys()
        .any(|k| k == "op_cmd" || k.ends_with(".op_cmd"));
    if !has_op_cmd {
        out.push("op_cmd is not set at any scope; commands needing op will fail".to_string());
    }

    for key in store.keys() {
        let leaf = key.rsplit('.').next().unwrap_or(key);
        if !KNOWN_KEYS.contains(&leaf) {
            out.push(format!("unknown option '{key}'"));
        }
    }

    out
}
