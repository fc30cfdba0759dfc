//! Domain-level error taxonomy.
//!
//! `GameError` covers protocol violations: an illegal card, an out-of-turn
//! action, a malformed bid. They are answered with a non-fatal `error`
//! frame and leave room state unchanged. Connectivity failures never show
//! up here; they are recovered through bot substitution and resync.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("not your turn")]
    OutOfTurn,

    #[error("card index {0} is out of range")]
    BadCardIndex(usize),

    #[error("that card is not legal to play")]
    IllegalCard,

    #[error("announce must strictly exceed the current best bid")]
    BidTooLow,

    #[error("invalid bid value or suit")]
    BadBid,

    #[error("coinche is not available")]
    CoincheUnavailable,

    #[error("surcoinche is not available")]
    SurcoincheUnavailable,

    #[error("bidding is suspended while a coinche is pending")]
    BiddingSuspended,

    #[error("action does not match the current game phase")]
    PhaseMismatch,

    #[error("seat has forfeited and cannot act")]
    SeatForfeited,

    #[error("seat is bot-controlled; rehumanize first")]
    BotControlled,

    #[error("you are not in a game room")]
    NotInRoom,

    #[error("you must register a player name first")]
    NotRegistered,

    #[error("player name is not available")]
    NameUnavailable,

    #[error("invalid player name")]
    InvalidName,

    #[error("lobby not found")]
    LobbyNotFound,

    #[error("lobby is full")]
    LobbyFull,

    #[error("{0}")]
    LobbyRule(String),
}
