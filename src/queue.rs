//! Ordered, paced command dispatch.
//!
//! Commands are collected during one invocation and emitted in FIFO order
//! on [`CommandQueue::flush`]. With a non-zero pacing unit each command is
//! held back by the sum of the delay units of every command before it, so a
//! burst of kicks and bans does not trip server flood protection.
//!
//! Ordering relies on the connection: lines written to one IRC connection
//! are processed by the server in the order they were sent. That is why a
//! grant request can be queued directly in front of the commands that need
//! the privilege.

use crate::error::ConnectionError;
use crate::state::ChannelContext;
use std::time::Duration;
use tracing::{debug, warn};

/// Outbound protocol line sink owned by the host.
pub trait Connection {
    /// Hand one command to the connection. Fire-and-forget: an `Ok` only
    /// means the line was accepted for sending.
    fn send(
        &mut self,
        context: &ChannelContext,
        command: &OutboundCommand,
    ) -> Result<(), ConnectionError>;
}

/// A line plus its pacing directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundCommand {
    pub line: String,
    /// Hold the line back this long after the batch starts. `None` sends now.
    pub wait: Option<Duration>,
}

/// One pending command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedCommand {
    pub context: ChannelContext,
    pub line: String,
    /// Units of delay this command adds in front of the next one.
    pub delay_units: u32,
}

/// Outcome of one flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub sent: usize,
    pub failed: usize,
}

/// FIFO of pending commands for one command family.
#[derive(Debug, Default)]
pub struct CommandQueue {
    commands: Vec<QueuedCommand>,
    /// Running delay total while a flush is in progress.
    wait_units: u32,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command adding one delay unit.
    pub fn enqueue(&mut self, context: &ChannelContext, line: impl Into<String>) {
        self.enqueue_with_delay(context, line, 1);
    }

    pub fn enqueue_with_delay(
        &mut self,
        context: &ChannelContext,
        line: impl Into<String>,
        delay_units: u32,
    ) {
        self.commands.push(QueuedCommand {
            context: context.clone(),
            line: line.into(),
            delay_units,
        });
    }

    pub fn pending(&self) -> &[QueuedCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Running delay total; zero whenever no flush is in progress.
    pub fn wait_units(&self) -> u32 {
        self.wait_units
    }

    /// Emit every pending command in order, then clear the queue.
    ///
    /// A failed emission is logged and skipped; later commands still go out
    /// and the queue always ends empty.
    pub fn flush(&mut self, connection: &mut dyn Connection, unit: Duration) -> FlushReport {
        let commands = std::mem::take(&mut self.commands);
        let mut report = FlushReport::default();

        for cmd in commands {
            let wait = (!unit.is_zero() && self.wait_units > 0)
                .then(|| unit.checked_mul(self.wait_units).unwrap_or(Duration::MAX));
            let outbound = OutboundCommand {
                line: cmd.line,
                wait,
            };

            debug!(
                context = %cmd.context,
                line = %outbound.line,
                wait_ms = wait.map_or(0, |w| w.as_millis() as u64),
                "Emitting queued command"
            );

            match connection.send(&cmd.context, &outbound) {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    warn!(context = %cmd.context, line = %outbound.line, error = %e, "Command emission failed");
                    report.failed += 1;
                }
            }
            self.wait_units = self.wait_units.saturating_add(cmd.delay_units);
        }

        self.clear();
        report
    }

    /// Discard commands queued after the first `len`.
    pub fn truncate(&mut self, len: usize) {
        self.commands.truncate(len);
    }

    /// Drop everything pending and reset pacing.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.wait_units = 0;
    }
}
