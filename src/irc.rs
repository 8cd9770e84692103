//! IRC wire helpers: case mapping, name checks and command line builders.
//!
//! Only the handful of outbound commands a channel operator needs are built
//! here (KICK and channel MODE). Everything else is a configured template.

/// Convert a single character to IRC lowercase using RFC 1459 case mapping.
///
/// In addition to ASCII lowercase conversion, this maps:
/// - `[` → `{`
/// - `]` → `}`
/// - `\` → `|`
/// - `~` → `^`
#[inline]
pub const fn irc_lower_char(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        'A'..='Z' => (c as u8 + 32) as char,
        _ => c,
    }
}

/// Convert a string to IRC lowercase using RFC 1459 case mapping.
pub fn irc_to_lower(s: &str) -> String {
    s.chars().map(irc_lower_char).collect()
}

/// Compare two nicks or channel names case-insensitively.
pub fn irc_eq(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a
            .chars()
            .zip(b.chars())
            .all(|(ca, cb)| irc_lower_char(ca) == irc_lower_char(cb))
}

/// Whether `name` carries a channel prefix.
#[inline]
pub fn is_channel_name(name: &str) -> bool {
    name.len() > 1 && name.starts_with(['#', '&', '+', '!'])
}

/// Whether an argument already is a `nick!user@host` style mask.
#[inline]
pub fn is_hostmask(arg: &str) -> bool {
    arg.contains('!') && arg.contains('@')
}

/// `KICK <channel> <nick> :<reason>`
pub fn kick_line(channel: &str, nick: &str, reason: &str) -> String {
    format!("KICK {channel} {nick} :{reason}")
}

/// `MODE <channel> (+|-)<letter × n> <arg1> ... <argn>`
///
/// One mode letter is emitted per argument.
pub fn mode_line(channel: &str, adding: bool, letter: char, args: &[String]) -> String {
    let sign = if adding { '+' } else { '-' };
    let letters: String = std::iter::repeat_n(letter, args.len()).collect();
    if args.is_empty() {
        format!("MODE {channel} {sign}{letter}")
    } else {
        format!("MODE {channel} {sign}{letters} {}", args.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc1459_lowering() {
        assert_eq!(irc_to_lower("Nick[Away]"), "nick{away}");
        assert_eq!(irc_to_lower("a\\b~"), "a|b^");
        assert!(irc_eq("EVE", "eve"));
        assert!(irc_eq("[x]", "{X}"));
        assert!(!irc_eq("eve", "eve_"));
    }

    #[test]
    fn test_channel_names() {
        assert!(is_channel_name("#rust"));
        assert!(is_channel_name("&local"));
        assert!(!is_channel_name("#"));
        assert!(!is_channel_name("rust"));
    }

    #[test]
    fn test_hostmask_detection() {
        assert!(is_hostmask("*!*@evil.example.com"));
        assert!(is_hostmask("eve!~e@host"));
        assert!(!is_hostmask("eve"));
        assert!(!is_hostmask("eve@host"));
        assert!(!is_hostmask("eve!user"));
    }

    #[test]
    fn test_kick_line() {
        assert_eq!(
            kick_line("#rust", "eve", "spamming"),
            "KICK #rust eve :spamming"
        );
    }

    #[test]
    fn test_mode_line_repeats_letter_per_arg() {
        let args = vec!["a!*@*".to_string(), "b!*@*".to_string(), "c!*@*".to_string()];
        assert_eq!(
            mode_line("#rust", true, 'b', &args),
            "MODE #rust +bbb a!*@* b!*@* c!*@*"
        );
        assert_eq!(
            mode_line("#rust", false, 'b', &args[..1]),
            "MODE #rust -b a!*@*"
        );
    }
}
