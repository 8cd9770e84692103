//! Unified error handling for chanop.
//!
//! Every error is local to a single invocation. Nothing here is allowed to
//! leak queue state from one invocation into the next.

use thiserror::Error;

// ============================================================================
// Operator Errors (command processing)
// ============================================================================

/// Errors that abort a moderation command invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperatorError {
    /// A required template (e.g. `op_cmd`) is unset at every scope.
    #[error("no value configured for '{0}'")]
    ConfigMissing(String),

    /// The invocation has no channel context, or we are not on the channel.
    #[error("not in channel {channel} on {server}")]
    NotInChannel { server: String, channel: String },

    /// A `default_banmask` token outside {nick,user,host,exact}.
    #[error("'{0}' is an invalid option for 'default_banmask', allowed: 'nick', 'user', 'host', 'exact'")]
    InvalidBanMaskPolicy(String),

    #[error("{command}: {detail}")]
    MalformedArguments {
        command: &'static str,
        detail: String,
    },

    /// Target nick is not present in the channel.
    #[error("no such nick in channel: {0}")]
    UnknownNick(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

impl OperatorError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigMissing(_) => "config_missing",
            Self::NotInChannel { .. } => "not_in_channel",
            Self::InvalidBanMaskPolicy(_) => "invalid_banmask_policy",
            Self::MalformedArguments { .. } => "malformed_arguments",
            Self::UnknownNick(_) => "unknown_nick",
            Self::UnknownCommand(_) => "unknown_command",
        }
    }

    /// Text shown to the invoking user.
    ///
    /// Argument errors carry the command usage line so the user can retry.
    pub fn user_message(&self) -> String {
        match self {
            Self::ConfigMissing(key) if key == "op_cmd" => {
                "No command defined for getting op (set 'op_cmd').".to_string()
            }
            Self::MalformedArguments { command, detail } => match crate::commands::usage(command) {
                Some(usage) => format!("{detail}. Usage: {command} {usage}"),
                None => detail.clone(),
            },
            other => other.to_string(),
        }
    }
}

/// Result type for command handlers.
pub type OperatorResult = Result<(), OperatorError>;

// ============================================================================
// Connection Errors (single emission)
// ============================================================================

/// Failure to hand one command line to the connection.
///
/// The queue logs these and keeps going; they never abort a flush.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("connection closed")]
    Closed,

    #[error("rejected command line: {0}")]
    Rejected(String),
}
