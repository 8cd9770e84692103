//! KICK command handlers.

use super::args::{clean_reason, split_first_word};
use super::{Action, Handler, PlanContext};
use crate::config::defaults::default_kick_reason;
use crate::error::OperatorError;

/// Kick reason, falling back to the default when blank.
pub fn kick_reason_or_default(reason: &str) -> String {
    let reason = reason.trim();
    if reason.is_empty() {
        default_kick_reason().to_string()
    } else {
        reason.to_string()
    }
}

/// `kick <nick> [reason]`
pub struct KickHandler;

impl Handler for KickHandler {
    fn name(&self) -> &'static str {
        "kick"
    }

    fn parse(&self, _ctx: &PlanContext<'_>, args: &str) -> Result<Vec<Action>, OperatorError> {
        let (nick, reason) = split_first_word(args);
        if nick.is_empty() {
            return Err(OperatorError::MalformedArguments {
                command: "kick",
                detail: "missing nick".to_string(),
            });
        }
        Ok(vec![Action::Kick {
            nick: nick.to_string(),
            reason: kick_reason_or_default(reason),
        }])
    }
}

/// `kick <nick> [<nick> ...] [:] [reason]`
///
/// Leading words are taken as nicks for as long as they name current channel
/// members. The first word that isn't a member, or that starts with the
/// configured separator, starts the shared reason.
pub struct MultiKickHandler;

impl Handler for MultiKickHandler {
    fn name(&self) -> &'static str {
        "kick"
    }

    fn parse(&self, ctx: &PlanContext<'_>, args: &str) -> Result<Vec<Action>, OperatorError> {
        let separator = ctx.config.multikick_separator();
        let words: Vec<&str> = args.split_whitespace().collect();

        let mut nicks = Vec::new();
        for word in &words {
            if !separator.is_empty() && word.starts_with(separator.as_str()) {
                break;
            }
            if !ctx.view.is_member(word)? {
                break;
            }
            nicks.push(*word);
        }

        if nicks.is_empty() {
            return Err(OperatorError::MalformedArguments {
                command: "kick",
                detail: "no channel member named".to_string(),
            });
        }

        let rest = words[nicks.len()..].join(" ");
        let reason = kick_reason_or_default(clean_reason(&rest, &separator));

        Ok(nicks
            .into_iter()
            .map(|nick| Action::Kick {
                nick: nick.to_string(),
                reason: reason.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigStore, MemoryStore, ScopedConfig};
    use crate::state::{ChannelContext, ChannelStateView, Identity, Roster};

    fn fixture() -> (Roster, MemoryStore, ChannelContext) {
        let context = ChannelContext::new("libera", "#rust");
        let mut roster = Roster::new();
        roster.set_own_nick("libera", "warden");
        for nick in ["warden", "alice", "bob", "spamming"] {
            roster.join(&context, Identity::new(nick, "u", "example.org"));
        }
        (roster, MemoryStore::new(), context)
    }

    fn kicks(actions: &[Action]) -> Vec<(String, String)> {
        actions
            .iter()
            .map(|a| match a {
                Action::Kick { nick, reason } => (nick.clone(), reason.clone()),
                other => panic!("unexpected action {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_kick_with_reason() {
        let (roster, store, context) = fixture();
        let view = ChannelStateView::new(&roster, &context);
        let config = ScopedConfig::new(&store, &context);
        let ctx = PlanContext::new(&view, &config);

        let actions = KickHandler.parse(&ctx, "eve stop flooding").unwrap();
        assert_eq!(
            kicks(&actions),
            vec![("eve".to_string(), "stop flooding".to_string())]
        );
    }

    #[test]
    fn test_kick_default_reason() {
        let (roster, store, context) = fixture();
        let view = ChannelStateView::new(&roster, &context);
        let config = ScopedConfig::new(&store, &context);
        let ctx = PlanContext::new(&view, &config);

        let actions = KickHandler.parse(&ctx, "eve").unwrap();
        assert_eq!(kicks(&actions), vec![("eve".to_string(), "bye".to_string())]);
        assert!(KickHandler.parse(&ctx, "   ").is_err());
    }

    #[test]
    fn test_multikick_with_separator() {
        let (roster, store, context) = fixture();
        let view = ChannelStateView::new(&roster, &context);
        let config = ScopedConfig::new(&store, &context);
        let ctx = PlanContext::new(&view, &config);

        let actions = MultiKickHandler
            .parse(&ctx, "alice bob : spamming")
            .unwrap();
        assert_eq!(
            kicks(&actions),
            vec![
                ("alice".to_string(), "spamming".to_string()),
                ("bob".to_string(), "spamming".to_string()),
            ]
        );
    }

    #[test]
    fn test_multikick_separator_protects_member_named_like_reason() {
        let (roster, store, context) = fixture();
        let view = ChannelStateView::new(&roster, &context);
        let config = ScopedConfig::new(&store, &context);
        let ctx = PlanContext::new(&view, &config);

        // "spamming" is a member; without ':' it would be kicked too
        let actions = MultiKickHandler.parse(&ctx, "alice :spamming").unwrap();
        assert_eq!(
            kicks(&actions),
            vec![("alice".to_string(), "spamming".to_string())]
        );
    }

    #[test]
    fn test_multikick_stops_at_first_non_member() {
        let (roster, store, context) = fixture();
        let view = ChannelStateView::new(&roster, &context);
        let config = ScopedConfig::new(&store, &context);
        let ctx = PlanContext::new(&view, &config);

        let actions = MultiKickHandler.parse(&ctx, "alice go away bob").unwrap();
        assert_eq!(
            kicks(&actions),
            vec![("alice".to_string(), "go away bob".to_string())]
        );
    }

    #[test]
    fn test_multikick_custom_separator() {
        let (roster, mut store, context) = fixture();
        store.set("multikick_separator", "--");
        let view = ChannelStateView::new(&roster, &context);
        let config = ScopedConfig::new(&store, &context);
        let ctx = PlanContext::new(&view, &config);

        let actions = MultiKickHandler.parse(&ctx, "bob -- enough").unwrap();
        assert_eq!(
            kicks(&actions),
            vec![("bob".to_string(), "enough".to_string())]
        );
    }

    #[test]
    fn test_multikick_without_members_is_malformed() {
        let (roster, store, context) = fixture();
        let view = ChannelStateView::new(&roster, &context);
        let config = ScopedConfig::new(&store, &context);
        let ctx = PlanContext::new(&view, &config);

        let err = MultiKickHandler.parse(&ctx, "mallory bye").unwrap_err();
        assert_eq!(err.error_code(), "malformed_arguments");
    }

    #[test]
    fn test_multikick_outside_channel() {
        let (roster, store, _) = fixture();
        let context = ChannelContext::new("libera", "#nowhere");
        let view = ChannelStateView::new(&roster, &context);
        let config = ScopedConfig::new(&store, &context);
        let ctx = PlanContext::new(&view, &config);

        let err = MultiKickHandler.parse(&ctx, "alice").unwrap_err();
        assert_eq!(err.error_code(), "not_in_channel");
    }
}
