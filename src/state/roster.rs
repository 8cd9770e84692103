//! In-memory channel roster.
//!
//! Implements [`ChannelSource`] for hosts that keep no state of their own
//! (the console, tests). Server notifications are applied as [`ServerEvent`]s
//! and always replace a membership rather than mutating it.

use super::channel::{ChannelContext, ChannelSource, Identity, Membership};
use crate::irc::{irc_eq, irc_to_lower};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Asynchronous channel notification relevant to moderation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    Join(Identity),
    Part(String),
    Op(String),
    Deop(String),
}

impl ServerEvent {
    /// Parse the console notation: `+o nick`, `-o nick`,
    /// `join nick!user@host`, `part nick`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let verb = parts.next()?;
        let arg = parts.next()?;
        match verb.to_ascii_lowercase().as_str() {
            "+o" => Some(Self::Op(arg.to_string())),
            "-o" => Some(Self::Deop(arg.to_string())),
            "join" => Identity::parse(arg).map(Self::Join),
            "part" | "kick" | "quit" => Some(Self::Part(arg.to_string())),
            _ => None,
        }
    }
}

/// Channel memberships keyed by (server, channel), plus our nick per server.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    channels: BTreeMap<ChannelContext, Vec<Membership>>,
    own_nicks: HashMap<String, String>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_own_nick(&mut self, server: &str, nick: &str) {
        self.own_nicks
            .insert(irc_to_lower(server), nick.to_string());
    }

    /// Add a member (or replace one with the same nick). Creates the channel.
    pub fn join(&mut self, context: &ChannelContext, identity: Identity) {
        let members = self.channels.entry(context.clone()).or_default();
        members.retain(|m| !irc_eq(&m.identity.nick, &identity.nick));
        members.push(Membership::new(identity, false));
    }

    /// Remove a member. Our own part forgets the channel entirely.
    pub fn part(&mut self, context: &ChannelContext, nick: &str) {
        let own = self.own_nick(&context.server);
        if own.as_deref().is_some_and(|own| irc_eq(own, nick)) {
            self.channels.remove(context);
            return;
        }
        if let Some(members) = self.channels.get_mut(context) {
            members.retain(|m| !irc_eq(&m.identity.nick, nick));
        }
    }

    /// Swap in a fresh membership carrying the new privilege flag.
    pub fn set_operator(&mut self, context: &ChannelContext, nick: &str, operator: bool) {
        let Some(members) = self.channels.get_mut(context) else {
            return;
        };
        if let Some(slot) = members
            .iter_mut()
            .find(|m| irc_eq(&m.identity.nick, nick))
        {
            *slot = Membership::new(slot.identity.clone(), operator);
        }
    }

    pub fn apply(&mut self, context: &ChannelContext, event: ServerEvent) {
        debug!(context = %context, event = ?event, "Applying server event");
        match event {
            ServerEvent::Join(identity) => self.join(context, identity),
            ServerEvent::Part(nick) => self.part(context, &nick),
            ServerEvent::Op(nick) => self.set_operator(context, &nick, true),
            ServerEvent::Deop(nick) => self.set_operator(context, &nick, false),
        }
    }

    pub fn member_count(&self, context: &ChannelContext) -> usize {
        self.channels.get(context).map_or(0, Vec::len)
    }
}

impl ChannelSource for Roster {
    fn members(&self, context: &ChannelContext) -> Option<Vec<Membership>> {
        self.channels.get(context).cloned()
    }

    fn own_nick(&self, server: &str) -> Option<String> {
        self.own_nicks.get(&irc_to_lower(server)).cloned()
    }
}
