//! Ban mask derivation.
//!
//! A [`BanMaskPolicy`] says which parts of `nick!user@host` survive into the
//! ban pattern; every part not in the policy becomes `*`. The empty policy
//! is special: it bans by bare nick.

use crate::error::OperatorError;
use crate::irc::mode_line;
use std::fmt;

/// Largest number of list-mode changes packed into one MODE line.
pub const MAX_BANS_PER_MODE: usize = 4;

/// One component of a hostmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaskPart {
    Nick,
    User,
    Host,
}

impl MaskPart {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nick => "nick",
            Self::User => "user",
            Self::Host => "host",
        }
    }
}

/// Ordered set of hostmask components to preserve.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BanMaskPolicy {
    parts: Vec<MaskPart>,
}

impl BanMaskPolicy {
    /// Nick-only fallback policy.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Preserve all three components.
    pub fn exact() -> Self {
        Self {
            parts: vec![MaskPart::Nick, MaskPart::User, MaskPart::Host],
        }
    }

    /// Add a component, ignoring duplicates.
    pub fn insert(&mut self, part: MaskPart) {
        if !self.parts.contains(&part) {
            self.parts.push(part);
        }
    }

    pub fn with(mut self, part: MaskPart) -> Self {
        self.insert(part);
        self
    }

    pub fn contains(&self, part: MaskPart) -> bool {
        self.parts.contains(&part)
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn parts(&self) -> &[MaskPart] {
        &self.parts
    }

    /// Parse a comma list drawn from `nick`, `user`, `host`, `exact`.
    ///
    /// Any unrecognized token rejects the whole value.
    pub fn parse_list(raw: &str) -> Result<Self, OperatorError> {
        let mut policy = Self::empty();
        for token in raw.split(',').map(str::trim) {
            match token {
                "nick" => policy.insert(MaskPart::Nick),
                "user" => policy.insert(MaskPart::User),
                "host" => policy.insert(MaskPart::Host),
                "exact" => {
                    for part in Self::exact().parts {
                        policy.insert(part);
                    }
                }
                other => return Err(OperatorError::InvalidBanMaskPolicy(other.to_string())),
            }
        }
        Ok(policy)
    }
}

impl fmt::Display for BanMaskPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.parts.iter().map(|p| p.as_str()).collect();
        write!(f, "{}", names.join(","))
    }
}

/// Split `nick!user@host` into its three components.
///
/// Missing separators yield empty components rather than failing.
pub fn split_hostmask(hostmask: &str) -> (&str, &str, &str) {
    let (nick, rest) = hostmask.split_once('!').unwrap_or((hostmask, ""));
    let (user, host) = rest.split_once('@').unwrap_or((rest, ""));
    (nick, user, host)
}

/// Build a ban pattern from a hostmask according to `policy`.
///
/// Pure: equal inputs always produce the same mask.
pub fn make_banmask(hostmask: &str, policy: &BanMaskPolicy) -> String {
    let (nick, user, host) = split_hostmask(hostmask);
    if policy.is_empty() {
        return nick.to_string();
    }

    let pick = |part: MaskPart, value: &str| -> String {
        if policy.contains(part) {
            value.to_string()
        } else {
            "*".to_string()
        }
    };

    format!(
        "{}!{}@{}",
        pick(MaskPart::Nick, nick),
        pick(MaskPart::User, user),
        pick(MaskPart::Host, host)
    )
}

/// Pack ban (or unban) masks into MODE lines, [`MAX_BANS_PER_MODE`] per line.
///
/// Masks keep their argument order; the last line carries the remainder.
pub fn merged_ban_lines(channel: &str, adding: bool, masks: &[String]) -> Vec<String> {
    masks
        .chunks(MAX_BANS_PER_MODE)
        .map(|batch| mode_line(channel, adding, 'b', batch))
        .collect()
}

/// One MODE line per mask.
pub fn single_ban_lines(channel: &str, adding: bool, masks: &[String]) -> Vec<String> {
    masks
        .iter()
        .map(|mask| mode_line(channel, adding, 'b', std::slice::from_ref(mask)))
        .collect()
}
