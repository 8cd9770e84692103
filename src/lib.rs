//! chanop - channel operator helper for IRC clients.
//!
//! Moderation commands (kick, ban, kickban, unban) that request operator
//! privilege on demand, queue their protocol lines in order with optional
//! pacing, and drop privilege again after use.
//!
//! The host supplies channel state through [`state::ChannelSource`], an
//! outbound line sink through [`queue::Connection`] and options through
//! [`config::ConfigStore`]; [`commands::Operator`] ties them together.

pub mod banmask;
pub mod commands;
pub mod config;
pub mod console;
pub mod error;
pub mod irc;
pub mod privilege;
pub mod queue;
pub mod state;

pub use commands::{Host, Operator};
pub use error::{ConnectionError, OperatorError};
