//! Default values for operator options.
//!
//! Separated into its own module for clarity and reuse.

// =============================================================================
// Option Keys
// =============================================================================

pub const OP_CMD: &str = "op_cmd";
pub const DEOP_CMD: &str = "deop_cmd";
pub const DEOP_AFTER_USE: &str = "deop_after_use";
pub const DEOP_DELAY: &str = "deop_delay";
pub const DEFAULT_BANMASK: &str = "default_banmask";
pub const ENABLE_MULTIPLE_KICK: &str = "enable_multiple_kick";
pub const MERGE_BANS: &str = "merge_bans";
pub const INVERT_KICKBAN_ORDER: &str = "invert_kickban_order";
pub const MULTIKICK_SEPARATOR: &str = "multikick_separator";
pub const PACING_UNIT_MS: &str = "pacing_unit_ms";

/// Every option key the operator understands.
pub const KNOWN_KEYS: &[&str] = &[
    OP_CMD,
    DEOP_CMD,
    DEOP_AFTER_USE,
    DEOP_DELAY,
    DEFAULT_BANMASK,
    ENABLE_MULTIPLE_KICK,
    MERGE_BANS,
    INVERT_KICKBAN_ORDER,
    MULTIKICK_SEPARATOR,
    PACING_UNIT_MS,
];

// =============================================================================
// Privilege Defaults
// =============================================================================

pub fn default_deop_cmd() -> String {
    "MODE $channel -o $nick".to_string()
}

pub fn default_deop_after_use() -> bool {
    true
}

/// Seconds between the last privileged action and the automatic deop.
pub fn default_deop_delay() -> u64 {
    300
}

// =============================================================================
// Ban / Kick Defaults
// =============================================================================

pub fn default_banmask() -> String {
    "host".to_string()
}

pub fn default_enable_multiple_kick() -> bool {
    false
}

pub fn default_merge_bans() -> bool {
    true
}

pub fn default_invert_kickban_order() -> bool {
    false
}

pub fn default_multikick_separator() -> String {
    ":".to_string()
}

pub fn default_kick_reason() -> &'static str {
    "bye"
}

// =============================================================================
// Pacing Defaults
// =============================================================================

/// One delay unit, in milliseconds.
pub fn default_pacing_unit_ms() -> u64 {
    1000
}
