//! Usage and help text for the operator commands.

/// (command, usage, description)
const HELP_TOPICS: &[(&str, &str, &str)] = &[
    (
        "op",
        "",
        "Asks for operator status using the configured op_cmd. Status obtained \
         this way is never dropped automatically. op_cmd can be set globally, \
         per server (<server>.op_cmd) or per channel (<server>.<channel>.op_cmd).",
    ),
    ("deop", "", "Drops operator status if held."),
    (
        "kick",
        "<nick> [reason]",
        "Kicks nick, requesting operator status if needed. With \
         enable_multiple_kick on: kick <nick> [<nick> ...] [:] [reason]; using \
         ':' between the nicks and the reason is recommended.",
    ),
    (
        "multikick",
        "<nick> [<nick> ...] [:] [reason]",
        "Kicks several nicks with one reason, whatever enable_multiple_kick says.",
    ),
    (
        "ban",
        "<nick|mask> [<nick|mask> ...] [-h|--host] [-u|--user] [-n|--nick] [-e|--exact]",
        "Bans users, requesting operator status if needed. Flags pick which \
         parts of nick!user@host are kept; without flags default_banmask \
         applies. Full masks are used as given.",
    ),
    (
        "unban",
        "<mask> [<mask> ...]",
        "Removes bans, requesting operator status if needed.",
    ),
    (
        "kickban",
        "<nick> [reason] [-h|--host] [-u|--user] [-n|--nick] [-e|--exact]",
        "Bans and kicks nick, requesting operator status if needed. The ban is \
         set first unless invert_kickban_order is on.",
    ),
    ("set", "<option> <value>", "Changes an operator option."),
    ("help", "[command]", "Shows help for a command, or lists all commands."),
];

/// Usage line for `command`, if it exists.
pub fn usage(command: &str) -> Option<&'static str> {
    HELP_TOPICS
        .iter()
        .find(|(name, _, _)| name.eq_ignore_ascii_case(command))
        .map(|(_, usage, _)| *usage)
}

/// Help for one command, or the command list.
pub fn render(topic: &str) -> String {
    let topic = topic.trim().trim_start_matches('/');
    if topic.is_empty() {
        let names: Vec<&str> = HELP_TOPICS.iter().map(|(name, _, _)| *name).collect();
        return format!("Commands: {}. Use 'help <command>' for details.", names.join(", "));
    }

    match HELP_TOPICS
        .iter()
        .find(|(name, _, _)| name.eq_ignore_ascii_case(topic))
    {
        Some((name, usage, text)) if usage.is_empty() => format!("{name}: {text}"),
        Some((name, usage, text)) => format!("{name} {usage}: {text}"),
        None => format!("No help available for '{topic}'."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_lookup() {
        assert_eq!(usage("kick"), Some("<nick> [reason]"));
        assert_eq!(usage("KICKBAN").map(|u| u.starts_with("<nick>")), Some(true));
        assert_eq!(usage("frob"), None);
    }

    #[test]
    fn test_render_index() {
        let text = render("");
        assert!(text.contains("kickban"));
        assert!(text.contains("unban"));
    }

    #[test]
    fn test_render_topic() {
        assert!(render("/ban").starts_with("ban <nick|mask>"));
        assert!(render("deop").starts_with("deop: "));
        assert_eq!(render("nope"), "No help available for 'nope'.");
    }
}
