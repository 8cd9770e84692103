//! Configuration loading and option resolution.
//!
//! This module is split into logical submodules:
//! - [`types`]: Console config file structs (Config, ConsoleConfig, RosterEntry)
//! - [`store`]: Flat key/value option storage (ConfigStore, MemoryStore)
//! - [`scoped`]: `server.channel.key > server.key > key` resolution and typed getters
//! - [`defaults`]: Option keys and their default values
//! - [`validation`]: Startup checks for the console config

pub mod defaults;
mod scoped;
mod store;
mod types;
pub mod validation;

pub use scoped::{ScopedConfig, expand_template, parse_bool};
pub use store::{ConfigStore, MemoryStore};
pub use types::{Config, ConfigError, ConsoleConfig, RosterEntry};
