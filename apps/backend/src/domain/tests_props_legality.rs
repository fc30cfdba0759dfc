//! Property tests: legality and deck conservation over simulated rounds.

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use super::cards_logic::hand_has_suit;
use super::cards_types::{Card, Suit, TrumpMode};
use super::deck::{Deck, DECK_SIZE};
use super::rules::{playable_cards, trick_winner};
use super::state::{nth_from, Seat, SEATS};

const MODES: [TrumpMode; 6] = [
    TrumpMode::Suit(Suit::Hearts),
    TrumpMode::Suit(Suit::Diamonds),
    TrumpMode::Suit(Suit::Clubs),
    TrumpMode::Suit(Suit::Spades),
    TrumpMode::AllTrump,
    TrumpMode::NoTrump,
];

proptest! {
    // Deal a random round and let every seat play its first legal card for
    // all eight tricks. At every step the legal set must be non-empty,
    // in-range and follow-suit; at the end all 32 cards must be accounted
    // for exactly once.
    #[test]
    fn simulated_rounds_respect_legality_and_conservation(
        seed in any::<u64>(),
        mode_idx in 0usize..MODES.len(),
    ) {
        let mode = MODES[mode_idx];
        let mut deck = Deck::new();
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        deck.shuffle(&mut rng);
        let mut hands = deck.deal();

        let mut pile: Vec<Card> = Vec::new();
        let mut leader: Seat = 0;
        for _ in 0..8 {
            let mut plays: Vec<(Seat, Card)> = Vec::new();
            for i in 0..SEATS as u8 {
                let seat = nth_from(leader, i);
                let hand = &hands[seat as usize];
                let legal = playable_cards(hand, &plays, mode, seat);
                prop_assert!(!legal.is_empty());
                prop_assert!(legal.iter().all(|&idx| idx < hand.len()));
                if let Some(&(_, first)) = plays.first() {
                    let lead = first.suit;
                    if hand_has_suit(hand, lead) {
                        prop_assert!(legal.iter().all(|&idx| hand[idx].suit == lead));
                    }
                }
                let card = hands[seat as usize].remove(legal[0]);
                plays.push((seat, card));
            }
            let winner = trick_winner(&plays, mode).expect("complete trick");
            prop_assert!(plays.iter().any(|&(seat, _)| seat == winner));
            pile.extend(plays.iter().map(|&(_, card)| card));
            leader = winner;
        }

        prop_assert!(hands.iter().all(|h| h.is_empty()));
        prop_assert_eq!(pile.len(), DECK_SIZE);
        let unique: std::collections::HashSet<Card> = pile.iter().copied().collect();
        prop_assert_eq!(unique.len(), DECK_SIZE);
    }

    // Rebuilding the deck from arbitrary splits of the piles and cutting it
    // never creates or destroys a card.
    #[test]
    fn rebuild_and_cut_conserve_the_deck(seed in any::<u64>(), split in 0usize..=DECK_SIZE) {
        let mut deck = Deck::new();
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        deck.shuffle(&mut rng);
        let hands = deck.deal();
        let mut cards: Vec<Card> = hands.into_iter().flatten().collect();
        let defending = cards.split_off(split.min(cards.len()));
        deck.rebuild(cards, defending);
        deck.cut(&mut rng);
        let dealt = deck.deal();
        let unique: std::collections::HashSet<Card> =
            dealt.iter().flatten().copied().collect();
        prop_assert_eq!(unique.len(), DECK_SIZE);
    }
}
