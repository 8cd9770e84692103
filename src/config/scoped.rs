//! Hierarchical option resolution.
//!
//! Lookup order for a key is `server.channel.key`, then `server.key`, then
//! the bare `key`. The most specific scope that has a value wins.

use super::defaults::{self, *};
use super::store::ConfigStore;
use crate::banmask::BanMaskPolicy;
use crate::error::OperatorError;
use crate::state::ChannelContext;
use std::time::Duration;
use tracing::{error, warn};

/// Read-only view of the option store scoped to one channel.
pub struct ScopedConfig<'a> {
    store: &'a dyn ConfigStore,
    context: &'a ChannelContext,
}

impl<'a> ScopedConfig<'a> {
    pub fn new(store: &'a dyn ConfigStore, context: &'a ChannelContext) -> Self {
        Self { store, context }
    }

    /// Resolve a key through channel, server and global scope.
    pub fn get(&self, key: &str) -> Option<String> {
        let server = &self.context.server;
        let channel = &self.context.channel;
        self.store
            .get(&format!("{server}.{channel}.{key}"))
            .or_else(|| self.store.get(&format!("{server}.{key}")))
            .or_else(|| self.store.get(key))
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(raw) => parse_bool(&raw).unwrap_or_else(|| {
                warn!(key, value = %raw, "Invalid boolean option, using default");
                default
            }),
            None => default,
        }
    }

    pub fn get_u64(&self, key: &str, default: u64) -> u64 {
        match self.get(key) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(key, value = %raw, "Invalid numeric option, using default");
                default
            }),
            None => default,
        }
    }

    // === Privilege templates ===

    /// Command that requests operator status. Required.
    pub fn op_cmd(&self, nick: &str) -> Result<String, OperatorError> {
        let template = self
            .get(OP_CMD)
            .ok_or_else(|| OperatorError::ConfigMissing(OP_CMD.to_string()))?;
        Ok(expand_template(&template, self.context, nick))
    }

    /// Command that drops operator status.
    pub fn deop_cmd(&self, nick: &str) -> String {
        let template = self.get(DEOP_CMD).unwrap_or_else(default_deop_cmd);
        expand_template(&template, self.context, nick)
    }

    pub fn deop_after_use(&self) -> bool {
        self.get_bool(DEOP_AFTER_USE, default_deop_after_use())
    }

    pub fn deop_delay(&self) -> Duration {
        Duration::from_secs(self.get_u64(DEOP_DELAY, default_deop_delay()))
    }

    // === Ban / kick options ===

    /// Ban mask policy used when an invocation names no mask flags.
    ///
    /// An invalid value is reported and degrades to the empty policy
    /// (nick-only masks).
    pub fn default_banmask(&self) -> BanMaskPolicy {
        let raw = self.get(DEFAULT_BANMASK).unwrap_or_else(defaults::default_banmask);
        match BanMaskPolicy::parse_list(&raw) {
            Ok(policy) => policy,
            Err(e) => {
                error!(
                    server = %self.context.server,
                    channel = %self.context.channel,
                    error = %e,
                    "Rejected default_banmask"
                );
                BanMaskPolicy::empty()
            }
        }
    }

    pub fn multikick_separator(&self) -> String {
        self.get(MULTIKICK_SEPARATOR)
            .unwrap_or_else(default_multikick_separator)
    }

    /// Wall-clock length of one queue delay unit. Zero disables pacing.
    pub fn pacing_unit(&self) -> Duration {
        Duration::from_millis(self.get_u64(PACING_UNIT_MS, default_pacing_unit_ms()))
    }
}

/// Substitute `$channel`, `$nick` and `$server` in a command template.
pub fn expand_template(template: &str, context: &ChannelContext, nick: &str) -> String {
    template
        .replace("$channel", &context.channel)
        .replace("$server", &context.server)
        .replace("$nick", nick)
}

/// Parse the boolean spellings hosts commonly store.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banmask::MaskPart;
    use crate::config::MemoryStore;

    fn ctx(channel: &str) -> ChannelContext {
        ChannelContext::new("libera", channel)
    }

    #[test]
    fn test_channel_scope_beats_server_scope() {
        let mut store = MemoryStore::new();
        store.set("libera.op_cmd", "server-level");
        store.set("libera.#rust.op_cmd", "channel-level");
        store.set("op_cmd", "global");

        let rust = ctx("#rust");
        let scoped = ScopedConfig::new(&store, &rust);
        assert_eq!(scoped.get("op_cmd").as_deref(), Some("channel-level"));

        let other = ctx("#other");
        let scoped = ScopedConfig::new(&store, &other);
        assert_eq!(scoped.get("op_cmd").as_deref(), Some("server-level"));

        let elsewhere = ChannelContext::new("oftc", "#rust");
        let scoped = ScopedConfig::new(&store, &elsewhere);
        assert_eq!(scoped.get("op_cmd").as_deref(), Some("global"));
    }

    #[test]
    fn test_op_cmd_missing_is_config_missing() {
        let store = MemoryStore::new();
        let c = ctx("#rust");
        let scoped = ScopedConfig::new(&store, &c);
        assert_eq!(
            scoped.op_cmd("me"),
            Err(OperatorError::ConfigMissing("op_cmd".into()))
        );
    }

    #[test]
    fn test_templates_expand_all_tokens() {
        let mut store = MemoryStore::new();
        store.set("op_cmd", "PRIVMSG ChanServ :OP $channel $nick ($server)");
        let c = ctx("#rust");
        let scoped = ScopedConfig::new(&store, &c);
        assert_eq!(
            scoped.op_cmd("me").unwrap(),
            "PRIVMSG ChanServ :OP #rust me (libera)"
        );
        assert_eq!(scoped.deop_cmd("me"), "MODE #rust -o me");
    }

    #[test]
    fn test_defaults() {
        let store = MemoryStore::new();
        let c = ctx("#rust");
        let scoped = ScopedConfig::new(&store, &c);
        assert!(scoped.deop_after_use());
        assert_eq!(scoped.deop_delay(), Duration::from_secs(300));
        assert_eq!(scoped.multikick_separator(), ":");
        assert_eq!(scoped.pacing_unit(), Duration::from_secs(1));
        assert!(scoped.default_banmask().contains(MaskPart::Host));
    }

    #[test]
    fn test_bool_spellings() {
        assert_eq!(parse_bool("on"), Some(true));
        assert_eq!(parse_bool("OFF"), Some(false));
        assert_eq!(parse_bool(" yes "), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_invalid_bool_falls_back_to_default() {
        let mut store = MemoryStore::new();
        store.set("deop_after_use", "sometimes");
        let c = ctx("#rust");
        let scoped = ScopedConfig::new(&store, &c);
        assert!(scoped.deop_after_use());
    }

    #[test]
    fn test_invalid_banmask_degrades_to_empty_policy() {
        let mut store = MemoryStore::new();
        store.set("default_banmask", "host,ident");
        let c = ctx("#rust");
        let scoped = ScopedConfig::new(&store, &c);
        assert!(scoped.default_banmask().is_empty());
    }
}
