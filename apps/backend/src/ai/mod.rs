//! Bot decision engine: deterministic heuristics for bidding and card
//! choice. Stays 100% legal by only ever picking from the legal sets the
//! rules engine computes.

pub mod bidding;
pub mod play;

pub use bidding::{choose_bid, BidChoice};
pub use play::choose_card;
