//! Integration test common infrastructure.
//!
//! Provides a recording connection and a ready-made channel with an
//! [`Operator`] wired to it.

#![allow(dead_code)]

use chanop::commands::Host;
use chanop::config::{ConfigStore, MemoryStore};
use chanop::error::{ConnectionError, OperatorError};
use chanop::queue::{Connection, OutboundCommand};
use chanop::state::{ChannelContext, Identity, Roster, ServerEvent};
use chanop::Operator;
use std::time::Instant;

pub const OP_CMD: &str = "PRIVMSG ChanServ :OP $channel $nick";

/// Connection that remembers everything sent through it.
#[derive(Default)]
pub struct RecordingConnection {
    pub sent: Vec<(ChannelContext, OutboundCommand)>,
    /// Lines containing this text are rejected.
    pub reject: Option<String>,
}

impl RecordingConnection {
    pub fn lines(&self) -> Vec<String> {
        self.sent.iter().map(|(_, c)| c.line.clone()).collect()
    }
}

impl Connection for RecordingConnection {
    fn send(
        &mut self,
        context: &ChannelContext,
        command: &OutboundCommand,
    ) -> Result<(), ConnectionError> {
        if let Some(bad) = &self.reject
            && command.line.contains(bad.as_str())
        {
            return Err(ConnectionError::Rejected(command.line.clone()));
        }
        self.sent.push((context.clone(), command.clone()));
        Ok(())
    }
}

/// `#rust` on `libera` with us (`warden`, not opped), alice, bob and eve.
pub struct Channel {
    pub context: ChannelContext,
    pub roster: Roster,
    pub connection: RecordingConnection,
    pub operator: Operator,
    pub now: Instant,
}

impl Channel {
    /// Channel with `op_cmd` set and pacing disabled.
    pub fn new() -> Self {
        let mut store = MemoryStore::new();
        store.set("op_cmd", OP_CMD);
        store.set("pacing_unit_ms", "0");
        Self::with_store(store)
    }

    pub fn with_store(store: MemoryStore) -> Self {
        let context = ChannelContext::new("libera", "#rust");
        let mut roster = Roster::new();
        roster.set_own_nick("libera", "warden");
        roster.join(&context, Identity::new("warden", "warden", "ops.example.org"));
        roster.join(&context, Identity::new("alice", "~alice", "alice.example.com"));
        roster.join(&context, Identity::new("bob", "bob", "bob.example.net"));
        roster.join(&context, Identity::new("eve", "~eve", "evil.example.com"));

        Self {
            context,
            roster,
            connection: RecordingConnection::default(),
            operator: Operator::new(store),
            now: Instant::now(),
        }
    }

    pub fn invoke(&mut self, input: &str) -> Result<Option<String>, OperatorError> {
        let now = self.now;
        self.invoke_at(input, now)
    }

    pub fn invoke_at(&mut self, input: &str, now: Instant) -> Result<Option<String>, OperatorError> {
        let mut host = Host::new(&self.roster, &mut self.connection);
        self.operator.invoke(&mut host, &self.context, input, now)
    }

    pub fn tick(&mut self, now: Instant) -> usize {
        let mut host = Host::new(&self.roster, &mut self.connection);
        self.operator.tick(&mut host, now)
    }

    /// Apply a console-notation server event, e.g. `+o warden`.
    pub fn event(&mut self, line: &str) {
        let event = ServerEvent::parse(line).expect("valid event");
        self.roster.apply(&self.context, event);
    }

    pub fn lines(&self) -> Vec<String> {
        self.connection.lines()
    }

    pub fn clear_sent(&mut self) {
        self.connection.sent.clear();
    }
}
