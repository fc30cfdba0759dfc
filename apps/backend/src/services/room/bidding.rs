//! Room-side bidding: wire decoding, auction stepping, coinche windows.

use actix::prelude::*;
use tracing::info;

use crate::ai::BidChoice;
use crate::domain::bidding::{BID_CODE_COINCHE, BID_CODE_PASS, BID_CODE_SURCOINCHE};
use crate::domain::cards_serde::trump_mode_from_code;
use crate::domain::{Announce, BidStep, Seat};
use crate::errors::GameError;
use crate::ws::protocol::ServerMsg;

use super::{Room, RoomPhase};

/// A decoded bid action.
enum BidAction {
    Pass,
    Coinche,
    Surcoinche,
    Announce(Announce, crate::domain::TrumpMode),
}

fn decode_bid(bid_value: u8, suit: Option<u8>) -> Result<BidAction, GameError> {
    match bid_value {
        BID_CODE_PASS => Ok(BidAction::Pass),
        BID_CODE_COINCHE => Ok(BidAction::Coinche),
        BID_CODE_SURCOINCHE => Ok(BidAction::Surcoinche),
        value => {
            let announce = Announce::from_code(value).ok_or(GameError::BadBid)?;
            let mode = suit
                .and_then(trump_mode_from_code)
                .ok_or(GameError::BadBid)?;
            Ok(BidAction::Announce(announce, mode))
        }
    }
}

impl Room {
    pub(crate) fn on_make_bid(
        &mut self,
        ctx: &mut Context<Self>,
        seat: Seat,
        bid_value: u8,
        suit: Option<u8>,
    ) {
        if let Err(err) = self.apply_bid(ctx, seat, bid_value, suit) {
            self.send_error(seat, err);
        }
    }

    pub(crate) fn apply_bot_bid(
        &mut self,
        ctx: &mut Context<Self>,
        seat: Seat,
        choice: BidChoice,
    ) -> Result<(), GameError> {
        let (bid_value, suit) = match choice {
            BidChoice::Pass => (BID_CODE_PASS, None),
            BidChoice::Announce(announce, mode) => (
                announce.code(),
                Some(crate::domain::cards_serde::trump_mode_code(mode)),
            ),
        };
        self.apply_bid(ctx, seat, bid_value, suit)
    }

    fn apply_bid(
        &mut self,
        ctx: &mut Context<Self>,
        seat: Seat,
        bid_value: u8,
        suit: Option<u8>,
    ) -> Result<(), GameError> {
        let action = decode_bid(bid_value, suit)?;
        let step = {
            let RoomPhase::Bidding(auction) = &mut self.phase else {
                return Err(GameError::PhaseMismatch);
            };
            match action {
                BidAction::Pass => auction.pass(seat)?,
                BidAction::Coinche => auction.coinche(seat)?,
                BidAction::Surcoinche => auction.surcoinche(seat)?,
                BidAction::Announce(announce, mode) => auction.announce(seat, announce, mode)?,
            }
        };

        self.broadcast(&ServerMsg::BidMade {
            player_index: seat,
            bid_value,
            suit,
        });
        self.handle_bid_step(ctx, step);
        Ok(())
    }

    fn handle_bid_step(&mut self, ctx: &mut Context<Self>, step: BidStep) {
        match step {
            BidStep::Continue { .. } => {
                self.broadcast_game_state(false);
                self.advance(ctx);
            }
            BidStep::Redeal => {
                info!(room_id = self.id, "[ROOM] four passes, redealing");
                self.redeal_after_passes(ctx);
            }
            BidStep::AwaitSurcoinche => {
                // Turn order is suspended; only the surcoinche window timer
                // (or a surcoinche) moves the auction forward.
                self.timers.bid.cancel(ctx);
                self.timers.turn.cancel(ctx);
                self.broadcast(&ServerMsg::SurcoincheWaiting {
                    delay_ms: self.cfg.surcoinche_delay.as_millis() as u64,
                });
                self.arm_surcoinche_delay(ctx);
            }
            BidStep::Settled(contract) => {
                self.timers.surcoinche.cancel(ctx);
                self.begin_play(ctx, contract);
            }
        }
    }
}
