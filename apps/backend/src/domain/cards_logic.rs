//! Card game logic: trumpness, point values, rank orders, card comparison.

use super::cards_types::{Card, Rank, Suit, TrumpMode};

pub fn is_trump(card: Card, mode: TrumpMode) -> bool {
    match mode {
        TrumpMode::Suit(trump) => card.suit == trump,
        TrumpMode::AllTrump => true,
        TrumpMode::NoTrump => false,
    }
}

/// Point value of a card under the round's trump regime.
///
/// Every regime totals 152 points across the deck, before the last-trick
/// and belote bonuses.
pub fn card_points(card: Card, mode: TrumpMode) -> i32 {
    match mode {
        TrumpMode::Suit(trump) if card.suit == trump => trump_suit_points(card.rank),
        TrumpMode::Suit(_) => plain_suit_points(card.rank),
        TrumpMode::AllTrump => match card.rank {
            Rank::Jack => 14,
            Rank::Nine => 9,
            Rank::Ace => 6,
            Rank::Ten => 5,
            Rank::King => 3,
            Rank::Queen => 1,
            Rank::Seven | Rank::Eight => 0,
        },
        TrumpMode::NoTrump => match card.rank {
            Rank::Ace => 19,
            Rank::Ten => 10,
            Rank::King => 4,
            Rank::Queen => 3,
            Rank::Jack => 2,
            Rank::Seven | Rank::Eight | Rank::Nine => 0,
        },
    }
}

fn trump_suit_points(rank: Rank) -> i32 {
    match rank {
        Rank::Jack => 20,
        Rank::Nine => 14,
        Rank::Ace => 11,
        Rank::Ten => 10,
        Rank::King => 4,
        Rank::Queen => 3,
        Rank::Seven | Rank::Eight => 0,
    }
}

fn plain_suit_points(rank: Rank) -> i32 {
    match rank {
        Rank::Ace => 11,
        Rank::Ten => 10,
        Rank::King => 4,
        Rank::Queen => 3,
        Rank::Jack => 2,
        Rank::Seven | Rank::Eight | Rank::Nine => 0,
    }
}

/// Trump rank order: 7 < 8 < Q < K < 10 < A < 9 < J.
pub fn trump_power(rank: Rank) -> u8 {
    match rank {
        Rank::Seven => 0,
        Rank::Eight => 1,
        Rank::Queen => 2,
        Rank::King => 3,
        Rank::Ten => 4,
        Rank::Ace => 5,
        Rank::Nine => 6,
        Rank::Jack => 7,
    }
}

/// Plain rank order: 7 < 8 < 9 < J < Q < K < 10 < A.
///
/// Off-trump, Nine stays below Jack: it carries no points, so the value
/// order and the rank order agree.
pub fn plain_power(rank: Rank) -> u8 {
    match rank {
        Rank::Seven => 0,
        Rank::Eight => 1,
        Rank::Nine => 2,
        Rank::Jack => 3,
        Rank::Queen => 4,
        Rank::King => 5,
        Rank::Ten => 6,
        Rank::Ace => 7,
    }
}

/// Strength of a card within its own suit under the round's regime.
pub fn card_power(card: Card, mode: TrumpMode) -> u8 {
    if is_trump(card, mode) {
        trump_power(card.rank)
    } else {
        plain_power(card.rank)
    }
}

pub fn hand_has_suit(hand: &[Card], suit: Suit) -> bool {
    hand.iter().any(|c| c.suit == suit)
}

/// Does `a` beat `b` given the lead suit and trump regime?
///
/// In AllTrump and NoTrump only lead-suit cards compete (ranked with the
/// trump and plain order respectively); with a trump suit, any trump beats
/// any non-trump.
pub fn card_beats(a: Card, b: Card, lead: Suit, mode: TrumpMode) -> bool {
    match mode {
        TrumpMode::Suit(trump) => {
            let a_trump = a.suit == trump;
            let b_trump = b.suit == trump;
            if a_trump && !b_trump {
                return true;
            }
            if b_trump && !a_trump {
                return false;
            }
            if a_trump && b_trump {
                return trump_power(a.rank) > trump_power(b.rank);
            }
            let a_follows = a.suit == lead;
            let b_follows = b.suit == lead;
            if a_follows && !b_follows {
                return true;
            }
            if b_follows && !a_follows {
                return false;
            }
            if a_follows && b_follows {
                return plain_power(a.rank) > plain_power(b.rank);
            }
            false
        }
        TrumpMode::AllTrump | TrumpMode::NoTrump => {
            let a_follows = a.suit == lead;
            let b_follows = b.suit == lead;
            if a_follows && !b_follows {
                return true;
            }
            if b_follows && !a_follows {
                return false;
            }
            if a_follows && b_follows {
                let power = if mode == TrumpMode::AllTrump {
                    trump_power
                } else {
                    plain_power
                };
                return power(a.rank) > power(b.rank);
            }
            false
        }
    }
}
