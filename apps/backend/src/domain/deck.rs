//! The 32-card deck: construction, shuffle, cut, deal and rebuild.
//!
//! The deck is conserved for the whole match: it is shuffled once before
//! the first round, and every later round is rebuilt from the two teams'
//! won-trick piles (attacking team first) and then cut, never reshuffled.

use rand::seq::SliceRandom;
use rand::Rng;

use super::cards_types::{Card, Rank, Suit};
use super::state::SEATS;

pub const DECK_SIZE: usize = 32;

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Fresh deck in construction order: ranks outer, suits inner.
    pub fn new() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for rank in Rank::ALL {
            for suit in Suit::ALL {
                cards.push(Card::new(suit, rank));
            }
        }
        Self { cards }
    }

    /// Empty deck, for the phases where all cards are out in hands/piles.
    pub fn empty() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Random shuffle; only ever used before the first round of a match.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Cut the deck at a random interior point.
    pub fn cut<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        debug_assert_eq!(self.cards.len(), DECK_SIZE);
        let at = rng.random_range(1..DECK_SIZE);
        self.cards.rotate_left(at);
    }

    /// Rebuild from the round's won-trick piles, attacking team first.
    pub fn rebuild(&mut self, attacking_pile: Vec<Card>, defending_pile: Vec<Card>) {
        debug_assert!(self.cards.is_empty());
        self.cards.extend(attacking_pile);
        self.cards.extend(defending_pile);
        debug_assert_eq!(self.cards.len(), DECK_SIZE);
        debug_assert!(all_unique(&self.cards));
    }

    /// Gather the four hands back in seat order (all-pass redeal path).
    pub fn gather(&mut self, hands: [Vec<Card>; SEATS]) {
        debug_assert!(self.cards.is_empty());
        for hand in hands {
            self.cards.extend(hand);
        }
        debug_assert_eq!(self.cards.len(), DECK_SIZE);
        debug_assert!(all_unique(&self.cards));
    }

    /// Deal the whole deck round-robin, one card at a time: card `i` goes
    /// to seat `i % 4`. Leaves the deck empty.
    pub fn deal(&mut self) -> [Vec<Card>; SEATS] {
        debug_assert_eq!(self.cards.len(), DECK_SIZE);
        let mut hands: [Vec<Card>; SEATS] = Default::default();
        for (i, card) in self.cards.drain(..).enumerate() {
            hands[i % SEATS].push(card);
        }
        hands
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

fn all_unique(cards: &[Card]) -> bool {
    let mut seen = std::collections::HashSet::new();
    cards.iter().all(|c| seen.insert(*c))
}
