//! External collaborators consumed by the game, never depended on.

pub mod mailer;
pub mod stats;

pub use mailer::{LogMailer, OutboundMailer};
pub use stats::{MemoryStatsStore, StatsStore};
