//! Round settlement: pure function from a round outcome to team points.

use super::bidding::{Announce, Contract};
use super::state::{other_team, team_of, TeamId};

/// Everything the settlement needs about a finished round.
///
/// `points` are the card points actually realized by each team, already
/// including the 10-point last-trick bonus and the 20-point belote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutcome {
    pub contract: Contract,
    pub points: [i32; 2],
    pub tricks_by_seat: [u8; 4],
}

impl RoundOutcome {
    fn tricks_by_team(&self) -> [u8; 2] {
        let mut teams = [0u8; 2];
        for (seat, &tricks) in self.tricks_by_seat.iter().enumerate() {
            teams[team_of(seat as u8)] += tricks;
        }
        teams
    }
}

/// Whether the round fulfilled its contract (used for broadcasting; the
/// scores themselves come from [`settle_round`]).
pub fn contract_made(outcome: &RoundOutcome) -> bool {
    let team = outcome.contract.team();
    match outcome.contract.announce {
        Announce::Capot => outcome.tricks_by_team()[team] == 8,
        Announce::Generale => outcome.tricks_by_seat[outcome.contract.seat as usize] == 8,
        announce => {
            let value = announce.contract_value().expect("numeric announce");
            outcome.points[team] >= value
        }
    }
}

/// Per-team scores for one round.
///
/// The contract term carries the coinche multiplier (×2) or surcoinche
/// (×4); realized points are never multiplied. Meeting the contract
/// exactly counts as success.
pub fn settle_round(outcome: &RoundOutcome) -> [i32; 2] {
    let contract = &outcome.contract;
    let team = contract.team();
    let opp = other_team(team);
    let mult = contract.multiplier();
    let tricks = outcome.tricks_by_team();

    let mut scores = [0i32; 2];
    match contract.announce {
        Announce::Capot => {
            if tricks[team] == 8 {
                scores[team] = 250 + 250 * mult;
            } else {
                scores[opp] = 160 + 250 * mult;
            }
        }
        Announce::Generale => {
            if outcome.tricks_by_seat[contract.seat as usize] == 8 {
                scores[team] = 500 + 500 * mult;
            } else {
                scores[opp] = 160 + 500 * mult;
            }
        }
        announce => {
            let value = announce.contract_value().expect("numeric announce");
            if tricks[team] == 8 {
                // Undeclared capot replaces the normal success formula.
                scores[team] = 250 * mult + outcome.points[team];
                scores[opp] = outcome.points[opp];
            } else if outcome.points[team] >= value {
                scores[team] = value * mult + outcome.points[team];
                scores[opp] = outcome.points[opp];
            } else if tricks[opp] == 8 {
                // The defenders can capot undeclared too; it replaces their
                // 160 + contract take.
                scores[opp] = 250 * mult + outcome.points[opp];
            } else {
                scores[opp] = 160 + value * mult;
            }
        }
    }
    scores
}

/// Threshold for ending the match on cumulative scores.
pub const MATCH_TARGET: i32 = 1000;

/// The winning team once either total reaches the target; a tie at or
/// above the target is resolved by the higher total, an exact tie plays
/// another round.
pub fn match_winner(totals: [i32; 2]) -> Option<TeamId> {
    if totals[0] < MATCH_TARGET && totals[1] < MATCH_TARGET {
        return None;
    }
    match totals[0].cmp(&totals[1]) {
        std::cmp::Ordering::Greater => Some(0),
        std::cmp::Ordering::Less => Some(1),
        std::cmp::Ordering::Equal => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cards_types::{Suit, TrumpMode};

    fn contract(announce: Announce, coinched: bool, surcoinched: bool) -> Contract {
        Contract {
            seat: 0,
            announce,
            mode: TrumpMode::Suit(Suit::Hearts),
            coinched,
            surcoinched,
        }
    }

    #[test]
    fn met_contract_keeps_both_teams_points() {
        // Contract 80, bidding team makes 90 of the 162: 170 for them,
        // the defenders keep their own 72.
        let outcome = RoundOutcome {
            contract: contract(Announce::Eighty, false, false),
            points: [90, 72],
            tricks_by_seat: [3, 2, 2, 1],
        };
        assert!(contract_made(&outcome));
        assert_eq!(settle_round(&outcome), [170, 72]);
    }

    #[test]
    fn contract_met_exactly_at_threshold_succeeds() {
        let outcome = RoundOutcome {
            contract: contract(Announce::Hundred, false, false),
            points: [100, 62],
            tricks_by_seat: [3, 1, 2, 2],
        };
        assert!(contract_made(&outcome));
        assert_eq!(settle_round(&outcome), [200, 62]);
    }

    #[test]
    fn failed_contract_gives_defenders_160_plus_value() {
        let outcome = RoundOutcome {
            contract: contract(Announce::Ninety, false, false),
            points: [70, 92],
            tricks_by_seat: [2, 3, 1, 2],
        };
        assert!(!contract_made(&outcome));
        assert_eq!(settle_round(&outcome), [0, 250]);
    }

    #[test]
    fn coinched_failure_doubles_the_contract_term() {
        // Contract 100 coinched and failed: defenders take 160 + 2×100.
        let outcome = RoundOutcome {
            contract: contract(Announce::Hundred, true, false),
            points: [80, 82],
            tricks_by_seat: [2, 2, 2, 2],
        };
        assert_eq!(settle_round(&outcome), [0, 360]);
    }

    #[test]
    fn coinched_success_doubles_only_the_contract_term() {
        let outcome = RoundOutcome {
            contract: contract(Announce::Hundred, true, false),
            points: [110, 52],
            tricks_by_seat: [3, 1, 3, 1],
        };
        assert_eq!(settle_round(&outcome), [310, 52]);
    }

    #[test]
    fn surcoinche_quadruples_the_contract_term() {
        let outcome = RoundOutcome {
            contract: contract(Announce::Eighty, true, true),
            points: [60, 102],
            tricks_by_seat: [2, 2, 2, 2],
        };
        assert_eq!(settle_round(&outcome), [0, 160 + 4 * 80]);
    }

    #[test]
    fn undeclared_capot_scores_250_plus_points() {
        let outcome = RoundOutcome {
            contract: contract(Announce::Eighty, false, false),
            points: [162, 0],
            tricks_by_seat: [5, 0, 3, 0],
        };
        assert_eq!(settle_round(&outcome), [412, 0]);
    }

    #[test]
    fn defenders_taking_every_trick_also_capot_undeclared() {
        let outcome = RoundOutcome {
            contract: contract(Announce::Eighty, false, false),
            points: [0, 162],
            tricks_by_seat: [0, 4, 0, 4],
        };
        assert!(!contract_made(&outcome));
        assert_eq!(settle_round(&outcome), [0, 412]);
    }

    #[test]
    fn declared_capot_achieved_scores_500() {
        let outcome = RoundOutcome {
            contract: contract(Announce::Capot, false, false),
            points: [162, 0],
            tricks_by_seat: [4, 0, 4, 0],
        };
        assert!(contract_made(&outcome));
        assert_eq!(settle_round(&outcome), [500, 0]);
    }

    #[test]
    fn declared_capot_failed_gives_defenders_410() {
        let outcome = RoundOutcome {
            contract: contract(Announce::Capot, false, false),
            points: [120, 42],
            tricks_by_seat: [5, 1, 2, 0],
        };
        assert!(!contract_made(&outcome));
        assert_eq!(settle_round(&outcome), [0, 410]);
    }

    #[test]
    fn coinched_capot_uses_the_multiplier_formulas() {
        let achieved = RoundOutcome {
            contract: contract(Announce::Capot, true, false),
            points: [162, 0],
            tricks_by_seat: [4, 0, 4, 0],
        };
        assert_eq!(settle_round(&achieved), [250 + 250 * 2, 0]);
        let failed = RoundOutcome {
            contract: contract(Announce::Capot, true, false),
            points: [100, 62],
            tricks_by_seat: [4, 2, 2, 0],
        };
        assert_eq!(settle_round(&failed), [0, 160 + 250 * 2]);
    }

    #[test]
    fn generale_requires_a_single_seat_to_take_everything() {
        let achieved = RoundOutcome {
            contract: contract(Announce::Generale, false, false),
            points: [162, 0],
            tricks_by_seat: [8, 0, 0, 0],
        };
        assert!(contract_made(&achieved));
        assert_eq!(settle_round(&achieved), [1000, 0]);

        // All eight tricks for the team, but split between partners.
        let split = RoundOutcome {
            contract: contract(Announce::Generale, false, false),
            points: [162, 0],
            tricks_by_seat: [7, 0, 1, 0],
        };
        assert!(!contract_made(&split));
        assert_eq!(settle_round(&split), [0, 660]);
    }

    #[test]
    fn surcoinched_generale_failed_gives_defenders_the_full_term() {
        let outcome = RoundOutcome {
            contract: contract(Announce::Generale, true, true),
            points: [140, 22],
            tricks_by_seat: [6, 1, 1, 0],
        };
        assert_eq!(settle_round(&outcome), [0, 160 + 500 * 4]);
    }

    #[test]
    fn match_ends_at_1000_with_higher_total_winning() {
        assert_eq!(match_winner([990, 980]), None);
        assert_eq!(match_winner([1010, 400]), Some(0));
        assert_eq!(match_winner([990, 1050]), Some(1));
        assert_eq!(match_winner([1020, 1100]), Some(1));
        // Exact tie above the threshold: play on.
        assert_eq!(match_winner([1020, 1020]), None);
    }
}
