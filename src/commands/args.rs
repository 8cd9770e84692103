//! Argument parsing shared by the moderation commands.
//!
//! These are pure functions: no channel state, no configuration.

use crate::banmask::{BanMaskPolicy, MaskPart};
use crate::error::OperatorError;

/// Split off the first whitespace-delimited word.
///
/// # Examples
/// ```ignore
/// assert_eq!(split_first_word("eve go away"), ("eve", "go away"));
/// assert_eq!(split_first_word("  eve  "), ("eve", ""));
/// ```
pub fn split_first_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim()),
        None => (input.trim_end(), ""),
    }
}

/// Parsed `ban` / `kickban` arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BanArgs {
    /// Mask flags given on the command line; `None` means use the configured default.
    pub policy: Option<BanMaskPolicy>,
    /// Non-option words, in order.
    pub words: Vec<String>,
}

/// Pull `-h -u -n -e` (and `--host --user --nick --exact`) out of `args`.
///
/// Options may appear anywhere and short ones may be bundled (`-hu`).
/// `--` ends option processing. `-e` wins over every other flag.
pub fn parse_ban_args(command: &'static str, args: &str) -> Result<BanArgs, OperatorError> {
    let mut policy = BanMaskPolicy::empty();
    let mut exact = false;
    let mut words = Vec::new();
    let mut options_done = false;

    for word in args.split_whitespace() {
        if options_done || !word.starts_with('-') || word == "-" {
            words.push(word.to_string());
            continue;
        }
        if word == "--" {
            options_done = true;
            continue;
        }

        if let Some(long) = word.strip_prefix("--") {
            match long {
                "host" => policy.insert(MaskPart::Host),
                "user" => policy.insert(MaskPart::User),
                "nick" => policy.insert(MaskPart::Nick),
                "exact" => exact = true,
                _ => return Err(unknown_option(command, word)),
            }
            continue;
        }

        for flag in word[1..].chars() {
            match flag {
                'h' => policy.insert(MaskPart::Host),
                'u' => policy.insert(MaskPart::User),
                'n' => policy.insert(MaskPart::Nick),
                'e' => exact = true,
                _ => return Err(unknown_option(command, &format!("-{flag}"))),
            }
        }
    }

    let policy = if exact {
        Some(BanMaskPolicy::exact())
    } else if policy.is_empty() {
        None
    } else {
        Some(policy)
    };

    Ok(BanArgs { policy, words })
}

fn unknown_option(command: &'static str, option: &str) -> OperatorError {
    OperatorError::MalformedArguments {
        command,
        detail: format!("unknown option '{option}'"),
    }
}

/// Strip a leading separator run and surrounding blanks from a kick reason.
pub fn clean_reason<'a>(reason: &'a str, separator: &str) -> &'a str {
    let reason = reason.trim();
    if separator.is_empty() {
        return reason;
    }
    reason.trim_start_matches(separator).trim()
}
