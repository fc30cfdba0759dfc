//! Per-room timer slots.
//!
//! Each slot carries a monotonically increasing generation. Cancelling the
//! actix handle is advisory only: a firing that was already queued checks
//! its captured generation against the slot and discards itself when
//! superseded. Re-arming bumps the generation, which invalidates every
//! earlier firing.

use actix::prelude::*;
use tracing::{debug, info};

use crate::domain::BidStep;
use crate::ws::protocol::ServerMsg;

use super::{Room, RoomPhase};

#[derive(Default)]
pub(crate) struct TimerBank {
    pub turn: TimerSlot,
    pub bid: TimerSlot,
    pub surcoinche: TimerSlot,
}

#[derive(Default)]
pub(crate) struct TimerSlot {
    gen: u64,
    handle: Option<SpawnHandle>,
}

impl TimerSlot {
    /// Invalidate any queued firing and cancel the handle if possible.
    pub fn cancel(&mut self, ctx: &mut Context<Room>) {
        self.gen += 1;
        if let Some(handle) = self.handle.take() {
            ctx.cancel_future(handle);
        }
    }

    fn arm(&mut self, ctx: &mut Context<Room>, handle: SpawnHandle) {
        if let Some(old) = self.handle.replace(handle) {
            ctx.cancel_future(old);
        }
    }

    fn next_gen(&mut self) -> u64 {
        self.gen += 1;
        self.gen
    }

    fn is_current(&self, gen: u64) -> bool {
        self.gen == gen
    }
}

impl Room {
    pub(crate) fn arm_turn_timer(&mut self, ctx: &mut Context<Self>) {
        let gen = self.timers.turn.next_gen();
        let handle = ctx.run_later(self.cfg.turn_timeout, move |room, ctx| {
            room.timers.turn.handle = None;
            if !room.timers.turn.is_current(gen) {
                debug!(room_id = room.id, gen, "[ROOM] stale turn timer discarded");
                return;
            }
            room.on_turn_timeout(ctx);
        });
        self.timers.turn.arm(ctx, handle);
    }

    pub(crate) fn arm_bid_timer(&mut self, ctx: &mut Context<Self>) {
        let gen = self.timers.bid.next_gen();
        let handle = ctx.run_later(self.cfg.bid_timeout, move |room, ctx| {
            room.timers.bid.handle = None;
            if !room.timers.bid.is_current(gen) {
                debug!(room_id = room.id, gen, "[ROOM] stale bid timer discarded");
                return;
            }
            room.on_bid_timeout(ctx);
        });
        self.timers.bid.arm(ctx, handle);
    }

    fn on_turn_timeout(&mut self, ctx: &mut Context<Self>) {
        let Some(seat) = self.current_actor() else {
            return;
        };
        if self.seats[seat as usize].is_bot {
            return;
        }
        info!(room_id = self.id, seat, "[ROOM] turn timeout, substituting bot");
        self.bot_substitute(ctx, seat);
    }

    fn on_bid_timeout(&mut self, ctx: &mut Context<Self>) {
        let Some(seat) = self.current_actor() else {
            return;
        };
        if self.seats[seat as usize].is_bot {
            return;
        }
        info!(room_id = self.id, seat, "[ROOM] bid timeout, substituting bot");
        self.bot_substitute(ctx, seat);
    }

    /// Stage one of the surcoinche window: the animation delay after the
    /// coinche, before the acceptance countdown opens.
    pub(crate) fn arm_surcoinche_delay(&mut self, ctx: &mut Context<Self>) {
        let gen = self.timers.surcoinche.next_gen();
        let handle = ctx.run_later(self.cfg.surcoinche_delay, move |room, ctx| {
            room.timers.surcoinche.handle = None;
            if !room.timers.surcoinche.is_current(gen) {
                debug!(room_id = room.id, gen, "[ROOM] stale surcoinche delay discarded");
                return;
            }
            let seconds = room.cfg.surcoinche_window_secs;
            room.broadcast(&ServerMsg::SurcoincheOffer { seconds });
            room.arm_surcoinche_tick(ctx, seconds);
        });
        self.timers.surcoinche.arm(ctx, handle);
    }

    /// Stage two: one broadcast tick per interval until the window closes.
    pub(crate) fn arm_surcoinche_tick(&mut self, ctx: &mut Context<Self>, remaining: u8) {
        let gen = self.timers.surcoinche.next_gen();
        let handle = ctx.run_later(self.cfg.tick_interval, move |room, ctx| {
            room.timers.surcoinche.handle = None;
            if !room.timers.surcoinche.is_current(gen) {
                debug!(room_id = room.id, gen, "[ROOM] stale surcoinche tick discarded");
                return;
            }
            let remaining = remaining.saturating_sub(1);
            if remaining > 0 {
                room.broadcast(&ServerMsg::SurcoincheUpdate { seconds: remaining });
                room.arm_surcoinche_tick(ctx, remaining);
                return;
            }
            room.on_surcoinche_window_elapsed(ctx);
        });
        self.timers.surcoinche.arm(ctx, handle);
    }

    fn on_surcoinche_window_elapsed(&mut self, ctx: &mut Context<Self>) {
        let step = {
            let RoomPhase::Bidding(auction) = &mut self.phase else {
                return;
            };
            if !auction.window_open() {
                return;
            }
            auction.window_elapsed()
        };
        info!(room_id = self.id, "[ROOM] surcoinche window elapsed");
        self.broadcast(&ServerMsg::SurcoincheTimeout);
        if let BidStep::Settled(contract) = step {
            self.begin_play(ctx, contract);
        }
    }
}
