//! On-demand operator privilege.
//!
//! A [`PrivilegeController`] per channel decides whether we already hold +o,
//! queues the configured grant command when we don't, and arranges for the
//! privilege to be dropped again after use.
//!
//! Grants are optimistic. The grant command is queued in front of the
//! commands that need it and nothing waits for the server to confirm: IRC
//! offers no acknowledgement to wait on, and the connection preserves line
//! order. If the grant is refused, the server rejects the moderation
//! commands too and says so out of band.
//!
//! Whether privilege was held manually or acquired for an action matters:
//! only acquired privilege is ever dropped automatically, and that holds
//! across a chain of commands issued while the privilege is still up.

use crate::config::ScopedConfig;
use crate::error::OperatorError;
use crate::queue::CommandQueue;
use crate::state::{ChannelContext, ChannelStateView, Privilege};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

// ============================================================================
// Controller
// ============================================================================

/// Lifecycle of our privilege on one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivilegeState {
    Unprivileged,
    /// Grant queued, not yet observed in channel state.
    Acquiring,
    Privileged,
    /// Privileged, with a relinquish timer armed.
    RelinquishScheduled,
}

/// Where the current privilege came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Held before any moderation command needed it, or requested with `op`.
    Manual,
    /// Requested by a moderation command; eligible for automatic relinquish.
    Acquired,
}

/// What [`PrivilegeController::schedule_relinquish`] decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelinquishPlan {
    /// Privilege stays (manual, or auto-relinquish disabled).
    Keep,
    /// Relinquish command queued behind the action commands.
    Immediate,
    /// Timer armed for this long.
    After(Duration),
}

/// Privilege bookkeeping for one channel.
#[derive(Debug, Clone)]
pub struct PrivilegeController {
    context: ChannelContext,
    state: PrivilegeState,
    provenance: Option<Provenance>,
    /// A grant was sent and channel state has not shown +o since.
    grant_unconfirmed: bool,
}

impl PrivilegeController {
    pub fn new(context: ChannelContext) -> Self {
        Self {
            context,
            state: PrivilegeState::Unprivileged,
            provenance: None,
            grant_unconfirmed: false,
        }
    }

    pub fn context(&self) -> &ChannelContext {
        &self.context
    }

    pub fn state(&self) -> PrivilegeState {
        self.state
    }

    pub fn provenance(&self) -> Option<Provenance> {
        self.provenance
    }

    /// Make sure privilege is held or requested before privileged commands
    /// are queued.
    ///
    /// Already holding +o returns at once. Otherwise the grant command goes
    /// on `queue` and the state becomes `Acquiring`; fails with
    /// `ConfigMissing` when no grant command is configured and with
    /// `NotInChannel` when our own membership can't be read.
    pub fn ensure_privilege(
        &mut self,
        view: &ChannelStateView<'_>,
        config: &ScopedConfig<'_>,
        queue: &mut CommandQueue,
    ) -> Result<(), OperatorError> {
        let nick = view
            .own_nick()
            .ok_or_else(|| self.context.not_in_channel())?;

        match view.is_operator(&nick) {
            Privilege::Operator => {
                self.grant_unconfirmed = false;
                if self.provenance.is_none() {
                    debug!(context = %self.context, "Privilege already held; treating as manual");
                    self.provenance = Some(Provenance::Manual);
                }
                if self.state != PrivilegeState::RelinquishScheduled {
                    self.state = PrivilegeState::Privileged;
                }
                Ok(())
            }
            Privilege::Regular => {
                let grant = config.op_cmd(&nick)?;
                info!(context = %self.context, nick = %nick, "Requesting operator privilege");
                queue.enqueue(&self.context, grant);
                self.state = PrivilegeState::Acquiring;
                self.provenance = Some(Provenance::Acquired);
                self.grant_unconfirmed = true;
                Ok(())
            }
            Privilege::Unknown => Err(self.context.not_in_channel()),
        }
    }

    /// Request privilege on the user's explicit behalf.
    ///
    /// Privilege obtained this way is never dropped automatically, and any
    /// pending relinquish for this channel is cancelled.
    pub fn request_manual(
        &mut self,
        view: &ChannelStateView<'_>,
        config: &ScopedConfig<'_>,
        queue: &mut CommandQueue,
        timers: &mut RelinquishTimers,
    ) -> Result<(), OperatorError> {
        self.ensure_privilege(view, config, queue)?;
        self.provenance = Some(Provenance::Manual);
        if timers.cancel(&self.context) {
            info!(context = %self.context, "Cancelled pending relinquish; privilege is now manual");
        }
        if self.state == PrivilegeState::RelinquishScheduled {
            self.state = PrivilegeState::Privileged;
        }
        Ok(())
    }

    /// Arrange for acquired privilege to be dropped after use.
    ///
    /// No-op for manual privilege or when `deop_after_use` is off. A zero
    /// `deop_delay` queues the relinquish command right away; otherwise a
    /// timer is armed, replacing any earlier one for this channel.
    pub fn schedule_relinquish(
        &mut self,
        config: &ScopedConfig<'_>,
        queue: &mut CommandQueue,
        timers: &mut RelinquishTimers,
        nick: &str,
        now: Instant,
    ) -> RelinquishPlan {
        if self.provenance != Some(Provenance::Acquired) || !config.deop_after_use() {
            return RelinquishPlan::Keep;
        }

        let delay = config.deop_delay();
        if delay.is_zero() {
            timers.cancel(&self.context);
            queue.enqueue(&self.context, config.deop_cmd(nick));
            self.reset();
            info!(context = %self.context, "Relinquishing privilege after use");
            return RelinquishPlan::Immediate;
        }

        let Some(deadline) = now.checked_add(delay) else {
            warn!(
                context = %self.context,
                delay_secs = delay.as_secs(),
                "deop_delay out of range; privilege will not be relinquished automatically"
            );
            return RelinquishPlan::Keep;
        };
        timers.arm(&self.context, deadline);
        self.state = PrivilegeState::RelinquishScheduled;
        info!(context = %self.context, delay_secs = delay.as_secs(), "Relinquish scheduled");
        RelinquishPlan::After(delay)
    }

    /// Drop privilege if we currently hold it.
    ///
    /// Idempotent: when +o is already gone nothing is queued. Returns whether
    /// a relinquish command was queued.
    pub fn relinquish(
        &mut self,
        view: &ChannelStateView<'_>,
        config: &ScopedConfig<'_>,
        queue: &mut CommandQueue,
    ) -> Result<bool, OperatorError> {
        let nick = view
            .own_nick()
            .ok_or_else(|| self.context.not_in_channel())?;

        let queued = match view.is_operator(&nick) {
            Privilege::Operator => {
                queue.enqueue(&self.context, config.deop_cmd(&nick));
                info!(context = %self.context, nick = %nick, "Relinquishing operator privilege");
                true
            }
            Privilege::Regular => {
                debug!(context = %self.context, "Privilege already gone; nothing to relinquish");
                false
            }
            Privilege::Unknown => return Err(self.context.not_in_channel()),
        };

        self.reset();
        Ok(queued)
    }

    /// Drop privilege on the user's explicit request and disarm the timer.
    ///
    /// A grant that was sent but not yet seen in channel state is already
    /// ahead of us on the connection, so the relinquish command is queued
    /// anyway and the server applies both in order.
    pub fn request_release(
        &mut self,
        view: &ChannelStateView<'_>,
        config: &ScopedConfig<'_>,
        queue: &mut CommandQueue,
        timers: &mut RelinquishTimers,
    ) -> Result<bool, OperatorError> {
        let nick = view
            .own_nick()
            .ok_or_else(|| self.context.not_in_channel())?;
        timers.cancel(&self.context);

        if self.grant_unconfirmed && view.is_operator(&nick) == Privilege::Regular {
            queue.enqueue(&self.context, config.deop_cmd(&nick));
            info!(context = %self.context, nick = %nick, "Relinquishing privilege behind unconfirmed grant");
            self.reset();
            return Ok(true);
        }
        self.relinquish(view, config, queue)
    }

    fn reset(&mut self) {
        self.state = PrivilegeState::Unprivileged;
        self.provenance = None;
        self.grant_unconfirmed = false;
    }
}

// ============================================================================
// Relinquish timers
// ============================================================================

/// A relinquish waiting for its deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRelinquish {
    pub context: ChannelContext,
    pub deadline: Instant,
}

/// Relinquish timers keyed by controller (one per channel).
///
/// At most one timer per controller: arming replaces the previous entry and
/// firing removes it, so a superseded timer can never fire.
#[derive(Debug, Default)]
pub struct RelinquishTimers {
    pending: BTreeMap<ChannelContext, Instant>,
}

impl RelinquishTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) the timer for `context`.
    pub fn arm(&mut self, context: &ChannelContext, deadline: Instant) {
        if self.pending.insert(context.clone(), deadline).is_some() {
            debug!(context = %context, "Replaced pending relinquish timer");
        }
    }

    /// Disarm. Returns whether a timer was pending.
    pub fn cancel(&mut self, context: &ChannelContext) -> bool {
        self.pending.remove(context).is_some()
    }

    pub fn is_armed(&self, context: &ChannelContext) -> bool {
        self.pending.contains_key(context)
    }

    pub fn deadline(&self, context: &ChannelContext) -> Option<Instant> {
        self.pending.get(context).copied()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return every timer whose deadline has passed.
    pub fn take_expired(&mut self, now: Instant) -> Vec<PendingRelinquish> {
        let expired: Vec<ChannelContext> = self
            .pending
            .iter()
            .filter(|(_, deadline)| now >= **deadline)
            .map(|(context, _)| context.clone())
            .collect();

        expired
            .into_iter()
            .filter_map(|context| {
                let deadline = self.pending.remove(&context)?;
                Some(PendingRelinquish { context, deadline })
            })
            .collect()
    }
}
