//! Legal-play computation and trick resolution.

use super::cards_logic::{card_beats, card_points, card_power, hand_has_suit, trump_power};
use super::cards_types::{Card, Suit, TrumpMode};
use super::state::{partner_of, Seat};

/// The card currently holding an (incomplete) trick.
pub fn current_winner(plays: &[(Seat, Card)], mode: TrumpMode) -> Option<(Seat, Card)> {
    let (_, first) = *plays.first()?;
    let lead = first.suit;
    let mut best = plays[0];
    for &(seat, card) in &plays[1..] {
        if card_beats(card, best.1, lead, mode) {
            best = (seat, card);
        }
    }
    Some(best)
}

/// Winner of a completed 4-card trick.
pub fn trick_winner(plays: &[(Seat, Card)], mode: TrumpMode) -> Option<Seat> {
    if plays.len() < 4 {
        return None;
    }
    current_winner(plays, mode).map(|(seat, _)| seat)
}

pub fn trick_points(plays: &[(Seat, Card)], mode: TrumpMode) -> i32 {
    plays.iter().map(|&(_, card)| card_points(card, mode)).sum()
}

fn lead_is_trump(lead: Suit, mode: TrumpMode) -> bool {
    match mode {
        TrumpMode::Suit(trump) => lead == trump,
        TrumpMode::AllTrump => true,
        TrumpMode::NoTrump => false,
    }
}

/// Indices into `hand` of the cards `seat` may legally play into the
/// current trick. Independent of turn enforcement, so it also serves
/// reconnection resync and the bots.
///
/// Rules, in order:
/// - leading: anything;
/// - holding the lead suit: must follow; when the lead suit is trump and an
///   opponent holds the trick, a higher trump must be played if one is held;
/// - void in the lead suit with the partner holding the trick: free discard;
/// - void otherwise (trump-suit rounds): must trump when holding trump,
///   overtrumping a previous trump if possible, under-trumping only when
///   nothing higher is held;
/// - void with no trump (or AllTrump/NoTrump rounds): free discard.
pub fn playable_cards(
    hand: &[Card],
    plays: &[(Seat, Card)],
    mode: TrumpMode,
    seat: Seat,
) -> Vec<usize> {
    let all: Vec<usize> = (0..hand.len()).collect();
    let Some(&(_, first)) = plays.first() else {
        return all;
    };
    let lead = first.suit;
    let (winner_seat, winner_card) =
        current_winner(plays, mode).expect("non-empty trick has a winner");
    let partner_winning = winner_seat == partner_of(seat);

    if hand_has_suit(hand, lead) {
        let followers: Vec<usize> = all
            .iter()
            .copied()
            .filter(|&i| hand[i].suit == lead)
            .collect();
        if lead_is_trump(lead, mode) && !partner_winning {
            let over: Vec<usize> = followers
                .iter()
                .copied()
                .filter(|&i| trump_power(hand[i].rank) > trump_power(winner_card.rank))
                .collect();
            if !over.is_empty() {
                return over;
            }
        }
        return followers;
    }

    if partner_winning {
        return all;
    }

    if let TrumpMode::Suit(trump) = mode {
        if hand_has_suit(hand, trump) {
            let trumps: Vec<usize> = all
                .iter()
                .copied()
                .filter(|&i| hand[i].suit == trump)
                .collect();
            if winner_card.suit == trump {
                let over: Vec<usize> = trumps
                    .iter()
                    .copied()
                    .filter(|&i| trump_power(hand[i].rank) > trump_power(winner_card.rank))
                    .collect();
                if !over.is_empty() {
                    return over;
                }
            }
            return trumps;
        }
    }

    all
}

/// Strength-or-value ordering key used by the bots when shedding: cheap
/// cards first.
pub fn shed_key(card: Card, mode: TrumpMode) -> (i32, u8) {
    (card_points(card, mode), card_power(card, mode))
}
