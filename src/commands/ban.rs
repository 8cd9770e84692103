//! BAN, UNBAN and KICKBAN command handlers.

use super::args::parse_ban_args;
use super::kick::kick_reason_or_default;
use super::{Action, Handler, PlanContext};
use crate::banmask::{BanMaskPolicy, make_banmask};
use crate::error::OperatorError;
use crate::irc::is_hostmask;
use crate::state::ChannelStateView;
use tracing::warn;

/// Turn one ban target into a mask.
///
/// Full masks pass through untouched. Nicks are looked up in the channel
/// and reduced per `policy`; a nick nobody in the channel carries is passed
/// through as given.
pub fn resolve_ban_mask(
    view: &ChannelStateView<'_>,
    target: &str,
    policy: &BanMaskPolicy,
) -> Result<String, OperatorError> {
    if is_hostmask(target) {
        return Ok(target.to_string());
    }
    match view.hostmask_of(target)? {
        Some(hostmask) => Ok(make_banmask(&hostmask, policy)),
        None => {
            warn!(context = %view.context(), target, "Ban target not in channel; using it verbatim");
            Ok(target.to_string())
        }
    }
}

/// `ban <nick|mask>... [-h] [-u] [-n] [-e]`
///
/// With `merged` set, masks are packed four to a MODE line.
pub struct BanHandler {
    pub merged: bool,
}

impl Handler for BanHandler {
    fn name(&self) -> &'static str {
        "ban"
    }

    fn parse(&self, ctx: &PlanContext<'_>, args: &str) -> Result<Vec<Action>, OperatorError> {
        let parsed = parse_ban_args("ban", args)?;
        if parsed.words.is_empty() {
            return Err(OperatorError::MalformedArguments {
                command: "ban",
                detail: "missing nick or mask".to_string(),
            });
        }
        let policy = parsed
            .policy
            .unwrap_or_else(|| ctx.config.default_banmask());
        Ok(vec![Action::Ban {
            targets: parsed.words,
            policy,
            merged: self.merged,
        }])
    }
}

/// `unban <mask>...`
pub struct UnbanHandler {
    pub merged: bool,
}

impl Handler for UnbanHandler {
    fn name(&self) -> &'static str {
        "unban"
    }

    fn parse(&self, _ctx: &PlanContext<'_>, args: &str) -> Result<Vec<Action>, OperatorError> {
        let masks: Vec<String> = args.split_whitespace().map(str::to_string).collect();
        if masks.is_empty() {
            return Err(OperatorError::MalformedArguments {
                command: "unban",
                detail: "missing mask".to_string(),
            });
        }
        Ok(vec![Action::Unban {
            masks,
            merged: self.merged,
        }])
    }
}

/// `kickban <nick> [reason] [-h] [-u] [-n] [-e]`
///
/// The target must be in the channel: its hostmask is needed for the ban.
pub struct KickBanHandler {
    pub invert: bool,
}

impl Handler for KickBanHandler {
    fn name(&self) -> &'static str {
        "kickban"
    }

    fn parse(&self, ctx: &PlanContext<'_>, args: &str) -> Result<Vec<Action>, OperatorError> {
        let parsed = parse_ban_args("kickban", args)?;
        let Some((nick, reason)) = parsed.words.split_first() else {
            return Err(OperatorError::MalformedArguments {
                command: "kickban",
                detail: "missing nick".to_string(),
            });
        };

        if !ctx.view.is_member(nick)? {
            return Err(OperatorError::UnknownNick(nick.clone()));
        }

        let policy = parsed
            .policy
            .unwrap_or_else(|| ctx.config.default_banmask());
        Ok(vec![Action::KickBan {
            nick: nick.clone(),
            reason: kick_reason_or_default(&reason.join(" ")),
            policy,
            invert: self.invert,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banmask::MaskPart;
    use crate::config::{ConfigStore, MemoryStore, ScopedConfig};
    use crate::state::{ChannelContext, Identity, Roster};

    fn fixture() -> (Roster, MemoryStore, ChannelContext) {
        let context = ChannelContext::new("libera", "#rust");
        let mut roster = Roster::new();
        roster.set_own_nick("libera", "warden");
        roster.join(&context, Identity::new("warden", "w", "ops.example.org"));
        roster.join(&context, Identity::new("eve", "~eve", "evil.example.com"));
        (roster, MemoryStore::new(), context)
    }

    #[test]
    fn test_resolve_full_mask_verbatim() {
        let (roster, _, context) = fixture();
        let view = ChannelStateView::new(&roster, &context);
        let mask = resolve_ban_mask(&view, "*!*@spam.net", &BanMaskPolicy::exact()).unwrap();
        assert_eq!(mask, "*!*@spam.net");
    }

    #[test]
    fn test_resolve_member() {
        let (roster, _, context) = fixture();
        let view = ChannelStateView::new(&roster, &context);
        let policy = BanMaskPolicy::empty().with(MaskPart::Host);
        assert_eq!(
            resolve_ban_mask(&view, "eve", &policy).unwrap(),
            "*!*@evil.example.com"
        );
    }

    #[test]
    fn test_resolve_unknown_nick_passes_through() {
        let (roster, _, context) = fixture();
        let view = ChannelStateView::new(&roster, &context);
        let policy = BanMaskPolicy::empty().with(MaskPart::Host);
        assert_eq!(resolve_ban_mask(&view, "ghost", &policy).unwrap(), "ghost");
    }

    #[test]
    fn test_ban_uses_configured_default_policy() {
        let (roster, mut store, context) = fixture();
        store.set("libera.default_banmask", "user,host");
        let view = ChannelStateView::new(&roster, &context);
        let config = ScopedConfig::new(&store, &context);
        let ctx = PlanContext::new(&view, &config);

        let actions = BanHandler { merged: true }.parse(&ctx, "eve").unwrap();
        match &actions[0] {
            Action::Ban { policy, merged, targets } => {
                assert_eq!(policy.parts(), &[MaskPart::User, MaskPart::Host]);
                assert!(*merged);
                assert_eq!(targets, &vec!["eve".to_string()]);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn test_ban_flags_override_default() {
        let (roster, store, context) = fixture();
        let view = ChannelStateView::new(&roster, &context);
        let config = ScopedConfig::new(&store, &context);
        let ctx = PlanContext::new(&view, &config);

        let actions = BanHandler { merged: false }.parse(&ctx, "-n eve").unwrap();
        match &actions[0] {
            Action::Ban { policy, .. } => assert_eq!(policy.parts(), &[MaskPart::Nick]),
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn test_ban_requires_target() {
        let (roster, store, context) = fixture();
        let view = ChannelStateView::new(&roster, &context);
        let config = ScopedConfig::new(&store, &context);
        let ctx = PlanContext::new(&view, &config);

        assert!(BanHandler { merged: true }.parse(&ctx, "-h").is_err());
        assert!(UnbanHandler { merged: true }.parse(&ctx, "").is_err());
    }

    #[test]
    fn test_kickban_parses_reason_and_flags() {
        let (roster, store, context) = fixture();
        let view = ChannelStateView::new(&roster, &context);
        let config = ScopedConfig::new(&store, &context);
        let ctx = PlanContext::new(&view, &config);

        let actions = KickBanHandler { invert: false }
            .parse(&ctx, "eve -e no more spam")
            .unwrap();
        assert_eq!(
            actions,
            vec![Action::KickBan {
                nick: "eve".into(),
                reason: "no more spam".into(),
                policy: BanMaskPolicy::exact(),
                invert: false,
            }]
        );
    }

    #[test]
    fn test_kickban_unknown_nick() {
        let (roster, store, context) = fixture();
        let view = ChannelStateView::new(&roster, &context);
        let config = ScopedConfig::new(&store, &context);
        let ctx = PlanContext::new(&view, &config);

        let err = KickBanHandler { invert: false }
            .parse(&ctx, "ghost")
            .unwrap_err();
        assert_eq!(err, OperatorError::UnknownNick("ghost".into()));
    }
}
