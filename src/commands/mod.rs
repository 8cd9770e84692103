//! Operator command dispatch.
//!
//! Every moderation command runs the same pipeline:
//!
//! 1. **Parse** the arguments into [`Action`]s (may consult channel state).
//! 2. **Authorize**: make sure operator privilege is held or requested.
//! 3. **Execute** each action into the command family's queue.
//! 4. **Schedule relinquish** of privilege acquired for this invocation.
//! 5. **Flush** the queue to the connection.
//!
//! A failure in steps 1-3 aborts the invocation: nothing it queued is sent.
//!
//! Which handler serves `kick` and `ban` is decided at dispatch time from
//! [`Variants`], refreshed whenever the corresponding option changes.

mod action;
mod args;
mod ban;
pub mod help;
mod kick;

pub use action::Action;
pub use args::{BanArgs, clean_reason, parse_ban_args, split_first_word};
pub use ban::{BanHandler, KickBanHandler, UnbanHandler, resolve_ban_mask};
pub use help::usage;
pub use kick::{KickHandler, MultiKickHandler, kick_reason_or_default};

use crate::config::defaults::{
    ENABLE_MULTIPLE_KICK, INVERT_KICKBAN_ORDER, MERGE_BANS, default_enable_multiple_kick,
    default_invert_kickban_order, default_merge_bans,
};
use crate::config::{ConfigStore, ScopedConfig, parse_bool};
use crate::error::{OperatorError, OperatorResult};
use crate::privilege::{PrivilegeController, RelinquishTimers};
use crate::queue::{CommandQueue, Connection};
use crate::state::{ChannelContext, ChannelSource, ChannelStateView};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, error, info, warn};

// ============================================================================
// Handler trait
// ============================================================================

/// What a handler may look at while parsing.
pub struct PlanContext<'a> {
    pub view: &'a ChannelStateView<'a>,
    pub config: &'a ScopedConfig<'a>,
}

impl<'a> PlanContext<'a> {
    pub fn new(view: &'a ChannelStateView<'a>, config: &'a ScopedConfig<'a>) -> Self {
        Self { view, config }
    }
}

/// A moderation command's parse stage.
pub trait Handler {
    fn name(&self) -> &'static str;

    /// Turn raw arguments into actions. Runs before privilege is touched,
    /// so a bad invocation never requests op.
    fn parse(&self, ctx: &PlanContext<'_>, args: &str) -> Result<Vec<Action>, OperatorError>;
}

// ============================================================================
// Commands and families
// ============================================================================

/// Commands understood by [`Operator::invoke`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    Op,
    Deop,
    Kick,
    /// Multi-nick kick regardless of `enable_multiple_kick`.
    MultiKick,
    Ban,
    Unban,
    KickBan,
    Set,
    Help,
}

impl CommandName {
    /// Resolve a command word, with or without a leading `/` or `o` prefix.
    pub fn parse(word: &str) -> Option<Self> {
        let word = word.trim_start_matches('/').to_ascii_lowercase();
        match word.as_str() {
            "op" | "oop" => Some(Self::Op),
            "deop" | "odeop" => Some(Self::Deop),
            "kick" | "okick" => Some(Self::Kick),
            "multikick" | "mkick" => Some(Self::MultiKick),
            "ban" | "oban" => Some(Self::Ban),
            "unban" | "ounban" => Some(Self::Unban),
            "kickban" | "kban" | "okban" => Some(Self::KickBan),
            "set" => Some(Self::Set),
            "help" => Some(Self::Help),
            _ => None,
        }
    }

    /// Queue shared by this command's invocations.
    pub fn family(self) -> Family {
        match self {
            Self::Op | Self::Set | Self::Help => Family::Op,
            Self::Deop => Family::Deop,
            Self::Kick | Self::MultiKick => Family::Kick,
            Self::Ban | Self::Unban => Family::Ban,
            Self::KickBan => Family::KickBan,
        }
    }
}

/// Command families; each owns one [`CommandQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Family {
    Op,
    Deop,
    Kick,
    Ban,
    KickBan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KickVariant {
    Single,
    Multiple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BanVariant {
    /// One MODE line per mask.
    Single,
    /// Up to four masks per MODE line.
    Merged,
}

/// Dispatch-time handler selection, read from the global options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variants {
    pub kick: KickVariant,
    pub ban: BanVariant,
    pub invert_kickban: bool,
}

impl Variants {
    pub fn from_store(store: &dyn ConfigStore) -> Self {
        let flag = |key: &str, default: bool| {
            store
                .get(key)
                .and_then(|raw| parse_bool(&raw))
                .unwrap_or(default)
        };
        Self {
            kick: if flag(ENABLE_MULTIPLE_KICK, default_enable_multiple_kick()) {
                KickVariant::Multiple
            } else {
                KickVariant::Single
            },
            ban: if flag(MERGE_BANS, default_merge_bans()) {
                BanVariant::Merged
            } else {
                BanVariant::Single
            },
            invert_kickban: flag(INVERT_KICKBAN_ORDER, default_invert_kickban_order()),
        }
    }
}

// ============================================================================
// Operator
// ============================================================================

/// Host-owned collaborators for one call.
pub struct Host<'a> {
    pub channels: &'a dyn ChannelSource,
    pub connection: &'a mut dyn Connection,
}

impl<'a> Host<'a> {
    pub fn new(channels: &'a dyn ChannelSource, connection: &'a mut dyn Connection) -> Self {
        Self {
            channels,
            connection,
        }
    }
}

/// Owns options, per-family queues, per-channel privilege controllers and
/// relinquish timers. Single-threaded: the host calls in from one thread.
pub struct Operator {
    store: Box<dyn ConfigStore>,
    variants: Variants,
    queues: BTreeMap<Family, CommandQueue>,
    controllers: BTreeMap<ChannelContext, PrivilegeController>,
    timers: RelinquishTimers,
}

impl Operator {
    pub fn new(store: impl ConfigStore + 'static) -> Self {
        let variants = Variants::from_store(&store);
        Self {
            store: Box::new(store),
            variants,
            queues: BTreeMap::new(),
            controllers: BTreeMap::new(),
            timers: RelinquishTimers::new(),
        }
    }

    pub fn variants(&self) -> Variants {
        self.variants
    }

    pub fn store(&self) -> &dyn ConfigStore {
        self.store.as_ref()
    }

    pub fn controller(&self, context: &ChannelContext) -> Option<&PrivilegeController> {
        self.controllers.get(context)
    }

    pub fn timers(&self) -> &RelinquishTimers {
        &self.timers
    }

    /// Change an option. Variant toggles take effect on the next dispatch.
    pub fn set_option(&mut self, key: &str, value: &str) {
        self.store.set(key, value);
        if matches!(key, ENABLE_MULTIPLE_KICK | MERGE_BANS | INVERT_KICKBAN_ORDER) {
            self.variants = Variants::from_store(self.store.as_ref());
            info!(key, value, variants = ?self.variants, "Command variants updated");
        } else {
            debug!(key, value, "Option updated");
        }
    }

    /// Run one user command line (e.g. `kick eve flooding`) against `context`.
    ///
    /// Returns text for the user, if the command produces any.
    pub fn invoke(
        &mut self,
        host: &mut Host<'_>,
        context: &ChannelContext,
        input: &str,
        now: Instant,
    ) -> Result<Option<String>, OperatorError> {
        let (word, args) = split_first_word(input);
        let command =
            CommandName::parse(word).ok_or_else(|| OperatorError::UnknownCommand(word.to_string()))?;

        let result = match command {
            CommandName::Help => return Ok(Some(help::render(args))),
            CommandName::Set => self.set_from_args(args),
            CommandName::Op => self.op(host, context).map(|()| None),
            CommandName::Deop => self.deop(host, context).map(|()| None),
            _ => self.moderate(host, context, command, args, now).map(|()| None),
        };

        if let Err(e) = &result {
            match e {
                OperatorError::NotInChannel { .. } => {
                    error!(context = %context, command = ?command, error = %e, "Command failed")
                }
                _ => warn!(
                    context = %context,
                    command = ?command,
                    error_code = e.error_code(),
                    error = %e,
                    "Command failed"
                ),
            }
        }
        result
    }

    /// Fire every relinquish timer that is due. Returns how many fired.
    pub fn tick(&mut self, host: &mut Host<'_>, now: Instant) -> usize {
        let fired = self.timers.take_expired(now);
        for pending in &fired {
            let context = &pending.context;
            let view = ChannelStateView::new(host.channels, context);
            let config = ScopedConfig::new(self.store.as_ref(), context);
            let controller = self
                .controllers
                .entry(context.clone())
                .or_insert_with(|| PrivilegeController::new(context.clone()));
            let queue = self.queues.entry(Family::Deop).or_default();

            match controller.relinquish(&view, &config, queue) {
                Ok(_) => {
                    queue.flush(&mut *host.connection, config.pacing_unit());
                }
                Err(e) => error!(context = %context, error = %e, "Relinquish timer could not run"),
            }
        }
        fired.len()
    }

    fn set_from_args(&mut self, args: &str) -> Result<Option<String>, OperatorError> {
        let (key, value) = split_first_word(args);
        if key.is_empty() || value.is_empty() {
            return Err(OperatorError::MalformedArguments {
                command: "set",
                detail: "missing option or value".to_string(),
            });
        }
        self.set_option(key, value);
        Ok(Some(format!("{key} = {value}")))
    }

    fn op(&mut self, host: &mut Host<'_>, context: &ChannelContext) -> OperatorResult {
        let view = ChannelStateView::new(host.channels, context);
        let config = ScopedConfig::new(self.store.as_ref(), context);
        let controller = self
            .controllers
            .entry(context.clone())
            .or_insert_with(|| PrivilegeController::new(context.clone()));
        let queue = self.queues.entry(Family::Op).or_default();

        let mark = queue.len();
        if let Err(e) = controller.request_manual(&view, &config, queue, &mut self.timers) {
            queue.truncate(mark);
            return Err(e);
        }
        queue.flush(&mut *host.connection, config.pacing_unit());
        Ok(())
    }

    fn deop(&mut self, host: &mut Host<'_>, context: &ChannelContext) -> OperatorResult {
        let view = ChannelStateView::new(host.channels, context);
        let config = ScopedConfig::new(self.store.as_ref(), context);
        let controller = self
            .controllers
            .entry(context.clone())
            .or_insert_with(|| PrivilegeController::new(context.clone()));
        let queue = self.queues.entry(Family::Deop).or_default();

        controller.request_release(&view, &config, queue, &mut self.timers)?;
        queue.flush(&mut *host.connection, config.pacing_unit());
        Ok(())
    }

    fn handler_for(&self, command: CommandName) -> Box<dyn Handler> {
        let merged = self.variants.ban == BanVariant::Merged;
        match command {
            CommandName::Kick => match self.variants.kick {
                KickVariant::Single => Box::new(KickHandler),
                KickVariant::Multiple => Box::new(MultiKickHandler),
            },
            CommandName::MultiKick => Box::new(MultiKickHandler),
            CommandName::Unban => Box::new(UnbanHandler { merged }),
            CommandName::KickBan => Box::new(KickBanHandler {
                invert: self.variants.invert_kickban,
            }),
            _ => Box::new(BanHandler { merged }),
        }
    }

    fn moderate(
        &mut self,
        host: &mut Host<'_>,
        context: &ChannelContext,
        command: CommandName,
        args: &str,
        now: Instant,
    ) -> OperatorResult {
        let handler = self.handler_for(command);
        let view = ChannelStateView::new(host.channels, context);
        let config = ScopedConfig::new(self.store.as_ref(), context);

        // Parse
        let actions = handler.parse(&PlanContext::new(&view, &config), args)?;
        let nick = view.own_nick().ok_or_else(|| context.not_in_channel())?;

        let controller = self
            .controllers
            .entry(context.clone())
            .or_insert_with(|| PrivilegeController::new(context.clone()));
        let queue = self.queues.entry(command.family()).or_default();

        // Authorize + Execute, rolled back together
        let mark = queue.len();
        let saved = controller.clone();
        if let Err(e) = stage(controller, &view, &config, queue, &actions) {
            queue.truncate(mark);
            *controller = saved;
            return Err(e);
        }

        let plan = controller.schedule_relinquish(&config, queue, &mut self.timers, &nick, now);
        let report = queue.flush(&mut *host.connection, config.pacing_unit());
        debug!(
            context = %context,
            command = handler.name(),
            actions = actions.len(),
            sent = report.sent,
            failed = report.failed,
            relinquish = ?plan,
            "Command complete"
        );
        Ok(())
    }
}

fn stage(
    controller: &mut PrivilegeController,
    view: &ChannelStateView<'_>,
    config: &ScopedConfig<'_>,
    queue: &mut CommandQueue,
    actions: &[Action],
) -> OperatorResult {
    controller.ensure_privilege(view, config, queue)?;
    for action in actions {
        action.execute(view, queue)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryStore;

    #[test]
    fn test_command_aliases() {
        assert_eq!(CommandName::parse("/okick"), Some(CommandName::Kick));
        assert_eq!(CommandName::parse("KBAN"), Some(CommandName::KickBan));
        assert_eq!(CommandName::parse("oop"), Some(CommandName::Op));
        assert_eq!(CommandName::parse("multikick"), Some(CommandName::MultiKick));
        assert_eq!(CommandName::parse("mute"), None);
    }

    #[test]
    fn test_families() {
        assert_eq!(CommandName::Unban.family(), Family::Ban);
        assert_eq!(CommandName::Ban.family(), Family::Ban);
        assert_eq!(CommandName::MultiKick.family(), Family::Kick);
        assert_ne!(CommandName::Kick.family(), CommandName::KickBan.family());
    }

    #[test]
    fn test_default_variants() {
        let variants = Variants::from_store(&MemoryStore::new());
        assert_eq!(variants.kick, KickVariant::Single);
        assert_eq!(variants.ban, BanVariant::Merged);
        assert!(!variants.invert_kickban);
    }

    #[test]
    fn test_set_option_swaps_variants() {
        let mut operator = Operator::new(MemoryStore::new());
        operator.set_option("enable_multiple_kick", "on");
        operator.set_option("merge_bans", "off");
        operator.set_option("invert_kickban_order", "yes");

        let variants = operator.variants();
        assert_eq!(variants.kick, KickVariant::Multiple);
        assert_eq!(variants.ban, BanVariant::Single);
        assert!(variants.invert_kickban);
        assert_eq!(
            operator.handler_for(CommandName::Kick).name(),
            MultiKickHandler.name()
        );
    }

    #[test]
    fn test_scoped_toggle_does_not_swap_variant() {
        let mut operator = Operator::new(MemoryStore::new());
        operator.set_option("libera.merge_bans", "off");
        assert_eq!(operator.variants().ban, BanVariant::Merged);
    }
}
