//! The auction: announce ladder and the bidding/coinche state machine.

use super::cards_types::TrumpMode;
use super::state::{next_seat, same_team, team_of, Seat, TeamId};
use crate::errors::GameError;

/// Ordered announce ladder. The derived `Ord` follows declaration order,
/// which is the only comparison the auction uses.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Announce {
    Eighty,
    Ninety,
    Hundred,
    HundredTen,
    HundredTwenty,
    HundredThirty,
    HundredForty,
    HundredFifty,
    HundredSixty,
    Capot,
    Generale,
}

impl Announce {
    pub const ALL: [Announce; 11] = [
        Announce::Eighty,
        Announce::Ninety,
        Announce::Hundred,
        Announce::HundredTen,
        Announce::HundredTwenty,
        Announce::HundredThirty,
        Announce::HundredForty,
        Announce::HundredFifty,
        Announce::HundredSixty,
        Announce::Capot,
        Announce::Generale,
    ];

    /// Numeric contract value; Capot and Generale score by their own
    /// formulas and carry none.
    pub fn contract_value(self) -> Option<i32> {
        match self {
            Announce::Eighty => Some(80),
            Announce::Ninety => Some(90),
            Announce::Hundred => Some(100),
            Announce::HundredTen => Some(110),
            Announce::HundredTwenty => Some(120),
            Announce::HundredThirty => Some(130),
            Announce::HundredForty => Some(140),
            Announce::HundredFifty => Some(150),
            Announce::HundredSixty => Some(160),
            Announce::Capot | Announce::Generale => None,
        }
    }

    /// Wire code, 1..=11 in ladder order.
    pub fn code(self) -> u8 {
        Announce::ALL.iter().position(|&a| a == self).unwrap() as u8 + 1
    }

    pub fn from_code(code: u8) -> Option<Announce> {
        match code {
            1..=11 => Some(Announce::ALL[code as usize - 1]),
            _ => None,
        }
    }

    /// The next step up the ladder, if any.
    pub fn next_up(self) -> Option<Announce> {
        Announce::from_code(self.code() + 1)
    }
}

/// Wire codes for the non-announce bid actions.
pub const BID_CODE_PASS: u8 = 12;
pub const BID_CODE_COINCHE: u8 = 13;
pub const BID_CODE_SURCOINCHE: u8 = 14;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Bid {
    pub seat: Seat,
    pub announce: Announce,
    pub mode: TrumpMode,
}

/// The settled outcome of an auction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Contract {
    pub seat: Seat,
    pub announce: Announce,
    pub mode: TrumpMode,
    pub coinched: bool,
    pub surcoinched: bool,
}

impl Contract {
    pub fn team(&self) -> TeamId {
        team_of(self.seat)
    }

    /// Score multiplier on the contract term: 1, 2 coinched, 4 surcoinched.
    pub fn multiplier(&self) -> i32 {
        if self.surcoinched {
            4
        } else if self.coinched {
            2
        } else {
            1
        }
    }
}

/// What the auction wants to happen next after an accepted action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BidStep {
    /// Bidding continues; it is now `next`'s turn to speak.
    Continue { next: Seat },
    /// Four opening passes: throw the hands in and redeal.
    Redeal,
    /// A coinche was declared; normal turn order is suspended until the
    /// surcoinche window closes or a surcoinche arrives.
    AwaitSurcoinche,
    Settled(Contract),
}

/// Bidding state for one round.
///
/// Turn order starts at the round's first bidder. Coinche and surcoinche
/// ignore turn order; everything else is rejected while the surcoinche
/// window is open.
#[derive(Debug, Clone)]
pub struct Auction {
    turn: Seat,
    best: Option<Bid>,
    consecutive_passes: u8,
    coincher: Option<Seat>,
    surcoincher: Option<Seat>,
    window_open: bool,
}

impl Auction {
    pub fn new(first_bidder: Seat) -> Self {
        Self {
            turn: first_bidder,
            best: None,
            consecutive_passes: 0,
            coincher: None,
            surcoincher: None,
            window_open: false,
        }
    }

    pub fn turn(&self) -> Seat {
        self.turn
    }

    pub fn best(&self) -> Option<&Bid> {
        self.best.as_ref()
    }

    pub fn coinched(&self) -> bool {
        self.coincher.is_some()
    }

    pub fn window_open(&self) -> bool {
        self.window_open
    }

    pub fn announce(
        &mut self,
        seat: Seat,
        announce: Announce,
        mode: TrumpMode,
    ) -> Result<BidStep, GameError> {
        if self.window_open {
            return Err(GameError::BiddingSuspended);
        }
        if seat != self.turn {
            return Err(GameError::OutOfTurn);
        }
        if let Some(best) = &self.best {
            if announce <= best.announce {
                return Err(GameError::BidTooLow);
            }
        }
        self.best = Some(Bid {
            seat,
            announce,
            mode,
        });
        self.consecutive_passes = 0;
        self.turn = next_seat(seat);
        Ok(BidStep::Continue { next: self.turn })
    }

    pub fn pass(&mut self, seat: Seat) -> Result<BidStep, GameError> {
        if self.window_open {
            return Err(GameError::BiddingSuspended);
        }
        if seat != self.turn {
            return Err(GameError::OutOfTurn);
        }
        self.consecutive_passes += 1;
        self.turn = next_seat(seat);
        match &self.best {
            None if self.consecutive_passes >= 4 => Ok(BidStep::Redeal),
            Some(_) if self.consecutive_passes >= 3 => Ok(BidStep::Settled(self.settle())),
            _ => Ok(BidStep::Continue { next: self.turn }),
        }
    }

    /// Coinche: any seat of the team opposing the best announce, while no
    /// coinche is active. Opens the surcoinche acceptance window.
    pub fn coinche(&mut self, seat: Seat) -> Result<BidStep, GameError> {
        let Some(best) = &self.best else {
            return Err(GameError::CoincheUnavailable);
        };
        if self.coincher.is_some() || same_team(seat, best.seat) {
            return Err(GameError::CoincheUnavailable);
        }
        self.coincher = Some(seat);
        self.window_open = true;
        Ok(BidStep::AwaitSurcoinche)
    }

    /// Surcoinche: any seat of the announcing team while the window is
    /// open. Settles the auction immediately at multiplier 4.
    pub fn surcoinche(&mut self, seat: Seat) -> Result<BidStep, GameError> {
        if !self.window_open {
            return Err(GameError::SurcoincheUnavailable);
        }
        let best = self.best.as_ref().expect("window open implies a best bid");
        if !same_team(seat, best.seat) {
            return Err(GameError::SurcoincheUnavailable);
        }
        self.surcoincher = Some(seat);
        self.window_open = false;
        Ok(BidStep::Settled(self.settle()))
    }

    /// The surcoinche window elapsed unanswered: settle as coinched only.
    pub fn window_elapsed(&mut self) -> BidStep {
        debug_assert!(self.window_open);
        self.window_open = false;
        BidStep::Settled(self.settle())
    }

    fn settle(&self) -> Contract {
        let best = self.best.as_ref().expect("settle requires a best bid");
        Contract {
            seat: best.seat,
            announce: best.announce,
            mode: best.mode,
            coinched: self.coincher.is_some(),
            surcoinched: self.surcoincher.is_some(),
        }
    }
}
