//! Card choice: mode-aware heuristics over the legal set.

use crate::domain::player_view::BotView;
use crate::domain::rules::shed_key;
use crate::domain::{card_beats, card_points, card_power, is_trump, partner_of, TrumpMode};

/// Pick the index (into the hand) of the card to play. `view.legal` must
/// be non-empty; the result is always one of its entries.
pub fn choose_card(view: &BotView) -> usize {
    debug_assert!(!view.legal.is_empty(), "bot asked to play with no legal card");
    // Forced card, including the last card of the hand.
    if view.legal.len() == 1 {
        return view.legal[0];
    }
    if view.plays.is_empty() {
        lead(view)
    } else {
        follow(view)
    }
}

fn lead(view: &BotView) -> usize {
    // While attacking in a trump-suit round, pull the opponents' trumps
    // until enough have fallen.
    if view.attacking {
        if let TrumpMode::Suit(trump) = view.mode {
            if view.trumps_fallen() < 5 {
                let chase = view
                    .legal
                    .iter()
                    .copied()
                    .filter(|&i| view.hand[i].suit == trump)
                    .max_by_key(|&i| card_power(view.hand[i], view.mode));
                if let Some(i) = chase {
                    return i;
                }
            }
        }
    }

    // Cash a master when it cannot be cut any more; side-suit masters
    // before trump ones, to keep trumps in hand.
    let master = view
        .legal
        .iter()
        .copied()
        .filter(|&i| view.is_master(view.hand[i]) && master_is_safe(view, i))
        .max_by_key(|&i| {
            let card = view.hand[i];
            (!is_trump(card, view.mode), card_points(card, view.mode))
        });
    if let Some(i) = master {
        return i;
    }

    low_from_longest(view)
}

/// A side-suit master can still be trumped while opposing trumps are out.
fn master_is_safe(view: &BotView, idx: usize) -> bool {
    match view.mode {
        TrumpMode::Suit(trump) if view.hand[idx].suit != trump => view.trumps_fallen() >= 5,
        _ => true,
    }
}

/// Lead low from the longest suit, keeping honors back.
fn low_from_longest(view: &BotView) -> usize {
    let suit_len = |i: &usize| {
        view.hand
            .iter()
            .filter(|c| c.suit == view.hand[*i].suit)
            .count()
    };
    let longest = view.legal.iter().copied().max_by_key(|i| suit_len(i));
    let target_suit = view.hand[longest.expect("legal set non-empty")].suit;
    view.legal
        .iter()
        .copied()
        .filter(|&i| view.hand[i].suit == target_suit)
        .min_by_key(|&i| card_power(view.hand[i], view.mode))
        .expect("suit just selected from legal cards")
}

fn follow(view: &BotView) -> usize {
    let (win_seat, win_card) = crate::domain::current_winner(view.plays, view.mode)
        .expect("follow requires a started trick");
    let lead_suit = view.plays[0].1.suit;

    if win_seat == partner_of(view.seat) && partner_secure(view, win_card, lead_suit) {
        return shed(view);
    }

    // Overtake with the minimal sufficient card.
    let winner = view
        .legal
        .iter()
        .copied()
        .filter(|&i| card_beats(view.hand[i], win_card, lead_suit, view.mode))
        .min_by_key(|&i| card_power(view.hand[i], view.mode));
    match winner {
        Some(i) => i,
        None => shed(view),
    }
}

/// Is the partner's winning card safe enough to dump on?
fn partner_secure(view: &BotView, win_card: crate::domain::Card, lead_suit: crate::domain::Suit) -> bool {
    if view.plays.len() == 3 {
        // Closing the trick: the partner has already won it.
        return true;
    }
    if view.is_master(win_card) {
        return true;
    }
    if let TrumpMode::Suit(trump) = view.mode {
        if win_card.suit == trump && lead_suit != trump {
            return true;
        }
    }
    false
}

/// Cheapest card to part with: never a master or a trump when something
/// worthless is available.
fn shed(view: &BotView) -> usize {
    view.legal
        .iter()
        .copied()
        .min_by_key(|&i| {
            let card = view.hand[i];
            let mut penalty = 0i32;
            if view.is_master(card) {
                penalty += 1000;
            }
            if matches!(view.mode, TrumpMode::Suit(_)) && is_trump(card, view.mode) {
                penalty += 500;
            }
            let (points, power) = shed_key(card, view.mode);
            (penalty, points, power)
        })
        .expect("legal set non-empty")
}
