//! The slice of room state a bot is allowed to see when deciding a card.

use super::cards_logic::{card_power, is_trump};
use super::cards_types::{Card, Rank, Suit, TrumpMode};
use super::state::Seat;

/// Bot-visible state for one card decision. Only public information plus
/// the seat's own hand: no other hand is ever exposed here.
#[derive(Debug)]
pub struct BotView<'a> {
    pub seat: Seat,
    pub hand: &'a [Card],
    /// Indices into `hand` that are legal right now.
    pub legal: &'a [usize],
    pub mode: TrumpMode,
    /// Plays of the trick in progress.
    pub plays: &'a [(Seat, Card)],
    /// Every card played this round, current trick included.
    pub fallen: &'a [Card],
    /// Whether the seat's team holds the contract.
    pub attacking: bool,
    pub tricks_won: [u8; 4],
}

impl BotView<'_> {
    /// How many cards of the trump suit have already fallen.
    pub fn trumps_fallen(&self) -> usize {
        self.fallen
            .iter()
            .filter(|&&c| is_trump(c, self.mode))
            .count()
    }

    /// A card is master when no higher card of its suit is still out in an
    /// unseen hand (everything above it is fallen or held by this seat).
    pub fn is_master(&self, card: Card) -> bool {
        let power = card_power(card, self.mode);
        Rank::ALL
            .iter()
            .map(|&rank| Card::new(card.suit, rank))
            .filter(|&other| card_power(other, self.mode) > power)
            .all(|other| self.fallen.contains(&other) || self.hand.contains(&other))
    }

    pub fn holds_suit(&self, suit: Suit) -> bool {
        self.hand.iter().any(|c| c.suit == suit)
    }
}
