//! Moderation actions and their translation into queued commands.

use super::ban::resolve_ban_mask;
use crate::banmask::{BanMaskPolicy, make_banmask, merged_ban_lines, single_ban_lines};
use crate::error::{OperatorError, OperatorResult};
use crate::irc::{kick_line, mode_line};
use crate::queue::CommandQueue;
use crate::state::ChannelStateView;
use tracing::info;

/// One logical moderation step, produced by a handler's parse stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Kick {
        nick: String,
        reason: String,
    },
    Ban {
        /// Nicks or full masks, in argument order.
        targets: Vec<String>,
        policy: BanMaskPolicy,
        merged: bool,
    },
    Unban {
        masks: Vec<String>,
        merged: bool,
    },
    KickBan {
        nick: String,
        reason: String,
        policy: BanMaskPolicy,
        /// Kick before banning.
        invert: bool,
    },
}

impl Action {
    /// Queue the protocol lines for this action.
    ///
    /// Masks are derived from channel state at this point, so a kickban
    /// resolves the hostmask before either of its lines is queued.
    pub fn execute(
        &self,
        view: &ChannelStateView<'_>,
        queue: &mut CommandQueue,
    ) -> OperatorResult {
        let context = view.context();
        let channel = context.channel.as_str();

        match self {
            Self::Kick { nick, reason } => {
                info!(context = %context, nick = %nick, reason = %reason, "Kick");
                queue.enqueue(context, kick_line(channel, nick, reason));
            }
            Self::Ban {
                targets,
                policy,
                merged,
            } => {
                let masks = targets
                    .iter()
                    .map(|t| resolve_ban_mask(view, t, policy))
                    .collect::<Result<Vec<_>, _>>()?;
                info!(context = %context, masks = ?masks, policy = %policy, "Ban");
                let lines = if *merged {
                    merged_ban_lines(channel, true, &masks)
                } else {
                    single_ban_lines(channel, true, &masks)
                };
                for line in lines {
                    queue.enqueue(context, line);
                }
            }
            Self::Unban { masks, merged } => {
                info!(context = %context, masks = ?masks, "Unban");
                let lines = if *merged {
                    merged_ban_lines(channel, false, masks)
                } else {
                    single_ban_lines(channel, false, masks)
                };
                for line in lines {
                    queue.enqueue(context, line);
                }
            }
            Self::KickBan {
                nick,
                reason,
                policy,
                invert,
            } => {
                let hostmask = view
                    .hostmask_of(nick)?
                    .ok_or_else(|| OperatorError::UnknownNick(nick.clone()))?;
                let mask = make_banmask(&hostmask, policy);
                info!(context = %context, nick = %nick, mask = %mask, invert, "Kickban");

                let ban = mode_line(channel, true, 'b', std::slice::from_ref(&mask));
                let kick = kick_line(channel, nick, reason);
                if *invert {
                    queue.enqueue(context, kick);
                    queue.enqueue(context, ban);
                } else {
                    queue.enqueue(context, ban);
                    queue.enqueue(context, kick);
                }
            }
        }
        Ok(())
    }
}
