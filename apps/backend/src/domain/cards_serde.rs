//! Wire encoding for cards and trump modes.
//!
//! Suits are Hearts=3, Diamonds=4, Clubs=5, Spades=6 (AllTrump=7 and
//! NoTrump=8 as bid suits), ranks 7..=14 for Seven..=Ace. Cards serialize
//! as `{"suit": n, "value": n}`.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::cards_types::{Card, Rank, Suit, TrumpMode};

pub fn suit_code(suit: Suit) -> u8 {
    match suit {
        Suit::Hearts => 3,
        Suit::Diamonds => 4,
        Suit::Clubs => 5,
        Suit::Spades => 6,
    }
}

pub fn suit_from_code(code: u8) -> Option<Suit> {
    match code {
        3 => Some(Suit::Hearts),
        4 => Some(Suit::Diamonds),
        5 => Some(Suit::Clubs),
        6 => Some(Suit::Spades),
        _ => None,
    }
}

pub fn rank_code(rank: Rank) -> u8 {
    match rank {
        Rank::Seven => 7,
        Rank::Eight => 8,
        Rank::Nine => 9,
        Rank::Ten => 10,
        Rank::Jack => 11,
        Rank::Queen => 12,
        Rank::King => 13,
        Rank::Ace => 14,
    }
}

pub fn rank_from_code(code: u8) -> Option<Rank> {
    match code {
        7 => Some(Rank::Seven),
        8 => Some(Rank::Eight),
        9 => Some(Rank::Nine),
        10 => Some(Rank::Ten),
        11 => Some(Rank::Jack),
        12 => Some(Rank::Queen),
        13 => Some(Rank::King),
        14 => Some(Rank::Ace),
        _ => None,
    }
}

/// Bid-suit code: the four suits plus 7=AllTrump, 8=NoTrump.
pub fn trump_mode_code(mode: TrumpMode) -> u8 {
    match mode {
        TrumpMode::Suit(suit) => suit_code(suit),
        TrumpMode::AllTrump => 7,
        TrumpMode::NoTrump => 8,
    }
}

pub fn trump_mode_from_code(code: u8) -> Option<TrumpMode> {
    match code {
        7 => Some(TrumpMode::AllTrump),
        8 => Some(TrumpMode::NoTrump),
        other => suit_from_code(other).map(TrumpMode::Suit),
    }
}

#[derive(Serialize, Deserialize)]
struct WireCard {
    suit: u8,
    value: u8,
}

impl Serialize for Card {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireCard {
            suit: suit_code(self.suit),
            value: rank_code(self.rank),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireCard::deserialize(deserializer)?;
        let suit = suit_from_code(wire.suit)
            .ok_or_else(|| D::Error::custom(format!("invalid suit code {}", wire.suit)))?;
        let rank = rank_from_code(wire.value)
            .ok_or_else(|| D::Error::custom(format!("invalid rank code {}", wire.value)))?;
        Ok(Card::new(suit, rank))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_round_trips_with_wire_codes() {
        let card = Card::new(Suit::Hearts, Rank::Jack);
        let json = serde_json::to_string(&card).unwrap();
        assert_eq!(json, r#"{"suit":3,"value":11}"#);
        let back: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(back, card);
    }

    #[test]
    fn bid_suit_codes_cover_special_modes() {
        assert_eq!(trump_mode_from_code(7), Some(TrumpMode::AllTrump));
        assert_eq!(trump_mode_from_code(8), Some(TrumpMode::NoTrump));
        assert_eq!(
            trump_mode_from_code(6),
            Some(TrumpMode::Suit(Suit::Spades))
        );
        assert_eq!(trump_mode_from_code(2), None);
        assert_eq!(trump_mode_code(TrumpMode::Suit(Suit::Hearts)), 3);
    }

    #[test]
    fn bad_codes_are_rejected() {
        assert!(serde_json::from_str::<Card>(r#"{"suit":9,"value":11}"#).is_err());
        assert!(serde_json::from_str::<Card>(r#"{"suit":3,"value":15}"#).is_err());
    }
}
