//! Channel membership types and the point-in-time channel view.

use crate::error::OperatorError;
use crate::irc::irc_eq;
use std::fmt;
use tracing::error;

/// The (server, channel) pair an invocation runs against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelContext {
    pub server: String,
    pub channel: String,
}

impl ChannelContext {
    pub fn new(server: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            channel: channel.into(),
        }
    }

    pub fn not_in_channel(&self) -> OperatorError {
        OperatorError::NotInChannel {
            server: self.server.clone(),
            channel: self.channel.clone(),
        }
    }
}

impl fmt::Display for ChannelContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.server, self.channel)
    }
}

/// A participant as seen by the server: `nick!user@host`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub nick: String,
    pub user: String,
    pub host: String,
}

impl Identity {
    pub fn new(nick: impl Into<String>, user: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            user: user.into(),
            host: host.into(),
        }
    }

    /// Parse `nick!user@host`. Returns `None` unless all three parts are present.
    pub fn parse(hostmask: &str) -> Option<Self> {
        let (nick, rest) = hostmask.split_once('!')?;
        let (user, host) = rest.split_once('@')?;
        if nick.is_empty() || user.is_empty() || host.is_empty() {
            return None;
        }
        Some(Self::new(nick, user, host))
    }

    pub fn hostmask(&self) -> String {
        format!("{}!{}@{}", self.nick, self.user, self.host)
    }
}

/// One member of one channel.
///
/// Replaced wholesale when the member's privilege changes; never patched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub identity: Identity,
    /// Holds +o.
    pub operator: bool,
}

impl Membership {
    pub fn new(identity: Identity, operator: bool) -> Self {
        Self { identity, operator }
    }
}

/// Answer to "do we hold operator privilege here?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    Operator,
    Regular,
    /// No channel context, or we are not listed on the channel.
    Unknown,
}

/// Live channel state owned by the host client.
pub trait ChannelSource {
    /// Snapshot of the channel's members, or `None` when we are not on it.
    fn members(&self, context: &ChannelContext) -> Option<Vec<Membership>>;

    /// Our own nickname on `server`.
    fn own_nick(&self, server: &str) -> Option<String>;
}

/// Point-in-time reads against a [`ChannelSource`].
///
/// Nothing is cached: presence and privilege can change between one step of
/// an invocation and the next, so every query goes back to the source.
pub struct ChannelStateView<'a> {
    source: &'a dyn ChannelSource,
    context: &'a ChannelContext,
}

impl<'a> ChannelStateView<'a> {
    pub fn new(source: &'a dyn ChannelSource, context: &'a ChannelContext) -> Self {
        Self { source, context }
    }

    pub fn context(&self) -> &ChannelContext {
        self.context
    }

    /// Our nick on this server, if the host knows it.
    pub fn own_nick(&self) -> Option<String> {
        self.source.own_nick(&self.context.server)
    }

    /// Privilege held by `nick`.
    pub fn is_operator(&self, nick: &str) -> Privilege {
        match self.find_member(nick) {
            Ok(Some(member)) if member.operator => Privilege::Operator,
            Ok(Some(_)) => Privilege::Regular,
            Ok(None) => Privilege::Unknown,
            Err(e) => {
                error!(context = %self.context, nick, error = %e, "Privilege check failed");
                Privilege::Unknown
            }
        }
    }

    /// Look a member up by nick (IRC case-insensitive).
    pub fn find_member(&self, nick: &str) -> Result<Option<Membership>, OperatorError> {
        let members = self
            .source
            .members(self.context)
            .ok_or_else(|| self.context.not_in_channel())?;
        Ok(members
            .into_iter()
            .find(|m| irc_eq(&m.identity.nick, nick)))
    }

    pub fn is_member(&self, nick: &str) -> Result<bool, OperatorError> {
        Ok(self.find_member(nick)?.is_some())
    }

    /// Current `nick!user@host` of `nick`.
    pub fn hostmask_of(&self, nick: &str) -> Result<Option<String>, OperatorError> {
        Ok(self.find_member(nick)?.map(|m| m.identity.hostmask()))
    }
}
