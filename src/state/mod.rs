//! Channel state module.
//!
//! Read-only access to who is on a channel and who holds +o, plus an
//! in-memory [`Roster`] for hosts without their own state.

mod channel;
mod roster;

pub use channel::{
    ChannelContext, ChannelSource, ChannelStateView, Identity, Membership, Privilege,
};
pub use roster::{Roster, ServerEvent};
