//! Interactive console host.
//!
//! Simulates one channel on one server: a [`Roster`] seeded from the config
//! file stands in for client state, and outbound lines are written to a
//! channel instead of a socket. A single writer task holds paced lines back
//! until they are due and releases everything in send order.

use crate::commands::{Host, Operator};
use crate::config::Config;
use crate::error::ConnectionError;
use crate::irc::irc_eq;
use crate::queue::{Connection, OutboundCommand};
use crate::state::{ChannelContext, Identity, Roster, ServerEvent};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Upper bound on how far ahead a line can be scheduled.
const MAX_WAIT: Duration = Duration::from_secs(86400 * 365 * 30);

// ============================================================================
// Connection
// ============================================================================

/// A line waiting for its release time.
struct Pending {
    line: String,
    due: tokio::time::Instant,
}

/// Connection that delivers lines to an output channel, honouring waits.
///
/// Lines leave in the order they were sent: a line is never released before
/// an earlier one, even when its own wait is shorter.
pub struct PacedConnection {
    tx: mpsc::UnboundedSender<Pending>,
}

impl PacedConnection {
    /// Start the writer task. Must be called inside a tokio runtime.
    ///
    /// Released lines arrive on the returned receiver. The writer stops once
    /// the connection is dropped and every pending line is out, or when the
    /// receiver goes away.
    pub fn spawn() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<Pending>();
        let (out_tx, out_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(pending) = rx.recv().await {
                tokio::time::sleep_until(pending.due).await;
                if out_tx.send(pending.line).is_err() {
                    debug!("Console output closed; stopping writer");
                    break;
                }
            }
        });

        (Self { tx }, out_rx)
    }
}

impl Connection for PacedConnection {
    fn send(
        &mut self,
        context: &ChannelContext,
        command: &OutboundCommand,
    ) -> Result<(), ConnectionError> {
        let line = format!("[{context}] -> {}", command.line);
        let wait = command.wait.unwrap_or_default();
        let wait = if wait > MAX_WAIT {
            warn!(context = %context, wait_secs = wait.as_secs(), "Pacing wait clamped");
            MAX_WAIT
        } else {
            wait
        };

        self.tx
            .send(Pending {
                line,
                due: tokio::time::Instant::now() + wait,
            })
            .map_err(|_| ConnectionError::Closed)
    }
}

// ============================================================================
// Console
// ============================================================================

pub struct Console {
    context: ChannelContext,
    roster: Roster,
    operator: Operator,
}

impl Console {
    /// Build the simulated channel and operator from a loaded config.
    pub fn from_config(config: &Config) -> Self {
        let context = config.channel_context();
        let mut roster = Roster::new();
        roster.set_own_nick(&context.server, &config.console.nick);

        let listed = config
            .roster
            .iter()
            .any(|entry| irc_eq(&entry.nick, &config.console.nick));
        if !listed {
            let nick = &config.console.nick;
            roster.join(&context, Identity::new(nick, format!("~{nick}"), "localhost"));
        }
        for entry in &config.roster {
            roster.join(&context, entry.identity());
            if entry.op {
                roster.set_operator(&context, &entry.nick, true);
            }
        }

        info!(
            context = %context,
            members = roster.member_count(&context),
            "Console channel ready"
        );

        Self {
            context,
            roster,
            operator: Operator::new(config.option_store()),
        }
    }

    pub fn context(&self) -> &ChannelContext {
        &self.context
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    /// Handle one input line. Returns text to show the user.
    ///
    /// `< event` lines update the roster; anything else is a command.
    pub fn handle_line(
        &mut self,
        line: &str,
        connection: &mut dyn Connection,
        now: Instant,
    ) -> Option<String> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if let Some(event) = line.strip_prefix('<') {
            return match ServerEvent::parse(event) {
                Some(event) => {
                    self.roster.apply(&self.context, event);
                    None
                }
                None => Some(format!("Unrecognised event: {}", event.trim())),
            };
        }

        let mut host = Host::new(&self.roster, connection);
        match self.operator.invoke(&mut host, &self.context, line, now) {
            Ok(reply) => reply,
            Err(e) => Some(e.user_message()),
        }
    }

    /// Fire due relinquish timers.
    pub fn tick(&mut self, connection: &mut dyn Connection, now: Instant) -> usize {
        let mut host = Host::new(&self.roster, connection);
        let fired = self.operator.tick(&mut host, now);
        if fired > 0 {
            debug!(fired, "Relinquish timers fired");
        }
        fired
    }
}
