//! Domain layer: pure game rules, no I/O.

pub mod bidding;
pub mod cards_logic;
pub mod cards_serde;
pub mod cards_types;
pub mod deck;
pub mod player_view;
pub mod rules;
pub mod scoring;
pub mod state;

#[cfg(test)]
mod tests_props_legality;

// Re-exports for ergonomics
pub use bidding::{Announce, Auction, Bid, BidStep, Contract};
pub use cards_logic::{card_beats, card_points, card_power, hand_has_suit, is_trump};
pub use cards_types::{Card, Rank, Suit, TrumpMode};
pub use deck::{Deck, DECK_SIZE};
pub use player_view::BotView;
pub use rules::{current_winner, playable_cards, trick_points, trick_winner};
pub use state::{
    next_seat, nth_from, other_team, partner_of, same_team, seat_offset, team_of, Seat, TeamId,
    SEATS,
};
