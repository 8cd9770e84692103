//! Key/value option storage.
//!
//! The host owns option storage; the operator only needs `get` and `set`
//! over flat dotted keys (`server.channel.key`, `server.key`, `key`).

use std::collections::BTreeMap;

/// Flat option storage supplied by the host.
pub trait ConfigStore {
    /// Fetch a raw value. Empty strings count as unset.
    fn get(&self, key: &str) -> Option<String>;

    /// Store a raw value.
    fn set(&mut self, key: &str, value: &str);
}

/// In-memory option store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a TOML table.
    ///
    /// Nested tables become key prefixes, so
    /// `[libera."#rust"] op_cmd = "..."` is stored as `libera.#rust.op_cmd`.
    pub fn from_table(table: &toml::Table) -> Self {
        let mut store = Self::new();
        flatten_into(&mut store.values, "", table);
        store
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate stored keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).filter(|v| !v.is_empty()).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

fn flatten_into(out: &mut BTreeMap<String, String>, prefix: &str, table: &toml::Table) {
    for (key, value) in table {
        let full = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::Table(inner) => flatten_into(out, &full, inner),
            toml::Value::String(s) => {
                out.insert(full, s.clone());
            }
            toml::Value::Boolean(b) => {
                out.insert(full, if *b { "on" } else { "off" }.to_string());
            }
            toml::Value::Integer(i) => {
                out.insert(full, i.to_string());
            }
            toml::Value::Array(items) => {
                // Lists (e.g. default_banmask = ["nick", "host"]) collapse to comma form.
                let joined = items
                    .iter()
                    .map(|v| match v {
                        toml::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(",");
                out.insert(full, joined);
            }
            other => {
                out.insert(full, other.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_value_is_unset() {
        let mut store = MemoryStore::new();
        store.set("op_cmd", "");
        assert_eq!(store.get("op_cmd"), None);
        store.set("op_cmd", "PRIVMSG ChanServ :OP $channel");
        assert_eq!(store.get("op_cmd").as_deref(), Some("PRIVMSG ChanServ :OP $channel"));
    }

    #[test]
    fn test_flatten_nested_scopes() {
        let table: toml::Table = toml::from_str(
            r##"
            deop_delay = 60
            merge_bans = false
            default_banmask = ["nick", "host"]

            [libera]
            op_cmd = "PRIVMSG ChanServ :OP $channel $nick"

            [libera."#rust"]
            op_cmd = "PRIVMSG ChanServ :OP #rust"
            "##,
        )
        .unwrap();

        let store = MemoryStore::from_table(&table);
        assert_eq!(store.get("deop_delay").as_deref(), Some("60"));
        assert_eq!(store.get("merge_bans").as_deref(), Some("off"));
        assert_eq!(store.get("default_banmask").as_deref(), Some("nick,host"));
        assert_eq!(
            store.get("libera.op_cmd").as_deref(),
            Some("PRIVMSG ChanServ :OP $channel $nick")
        );
        assert_eq!(
            store.get("libera.#rust.op_cmd").as_deref(),
            Some("PRIVMSG ChanServ :OP #rust")
        );
        assert_eq!(store.len(), 5);
    }
}
