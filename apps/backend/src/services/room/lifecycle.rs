//! Round and room lifecycle: dealing, settlement, reconnection, forfeit.

use actix::prelude::*;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::bidding::Contract;
use crate::domain::scoring::{contract_made, match_winner, settle_round, RoundOutcome};
use crate::domain::{next_seat, other_team, team_of, Auction, Rank, Seat, TrumpMode, Card, Deck};
use crate::services::coordinator::{RoomNotice, SeatResult};
use crate::ws::protocol::ServerMsg;
use crate::ws::session::Outbound;

use super::{PlayState, Room, RoomPhase, SeatConn};

impl Room {
    /// First round of the match: the only time the deck is shuffled.
    pub(crate) fn start_match(&mut self, ctx: &mut Context<Self>) {
        self.deck = Deck::new();
        self.deck.shuffle(&mut self.rng);
        self.round_no = 1;
        self.deal_hands();
        self.phase = RoomPhase::Bidding(Auction::new(self.first_bidder));

        for seat in 0..4u8 {
            self.send_to_seat(
                seat,
                ServerMsg::GameFound {
                    room_id: self.id,
                    player_position: seat,
                    my_cards: self.seats[seat as usize].hand.clone(),
                    opponents: self.opponents_of(seat),
                },
            );
        }
        self.broadcast_game_state(false);
        self.advance(ctx);
    }

    fn deal_hands(&mut self) {
        let hands = self.deck.deal();
        for (seat, hand) in hands.into_iter().enumerate() {
            let mut hand = hand;
            hand.sort();
            self.seats[seat].hand = hand;
            self.seats[seat].has_belote = false;
        }
    }

    /// Four opening passes: gather the hands in seat order, cut, deal
    /// again. The first bidder rotates like on a settled round.
    pub(crate) fn redeal_after_passes(&mut self, ctx: &mut Context<Self>) {
        self.broadcast(&ServerMsg::NewMancheAnimation);
        let hands = std::array::from_fn(|seat| std::mem::take(&mut self.seats[seat].hand));
        self.deck.gather(hands);
        self.deck.cut(&mut self.rng);
        self.first_bidder = next_seat(self.first_bidder);
        self.start_bidding_round(ctx);
    }

    fn start_bidding_round(&mut self, ctx: &mut Context<Self>) {
        self.deal_hands();
        self.phase = RoomPhase::Bidding(Auction::new(self.first_bidder));
        for seat in 0..4u8 {
            self.send_to_seat(
                seat,
                ServerMsg::NewManche {
                    my_cards: self.seats[seat as usize].hand.clone(),
                    first_bidder: self.first_bidder,
                },
            );
        }
        self.broadcast_game_state(false);
        self.advance(ctx);
    }

    /// The auction settled: lock the contract, detect belote, open trick
    /// play with the round's first bidder leading.
    pub(crate) fn begin_play(&mut self, ctx: &mut Context<Self>, contract: Contract) {
        self.timers.bid.cancel(ctx);
        self.timers.surcoinche.cancel(ctx);

        let mut belote_team = None;
        if let TrumpMode::Suit(trump) = contract.mode {
            for seat in 0..4usize {
                let hand = &self.seats[seat].hand;
                if hand.contains(&Card::new(trump, Rank::King))
                    && hand.contains(&Card::new(trump, Rank::Queen))
                {
                    self.seats[seat].has_belote = true;
                    belote_team = Some(team_of(seat as Seat));
                }
            }
        }

        info!(
            room_id = self.id,
            contract_seat = contract.seat,
            announce = ?contract.announce,
            mode = ?contract.mode,
            coinched = contract.coinched,
            surcoinched = contract.surcoinched,
            "[ROOM] contract settled, trick play begins"
        );

        self.phase = RoomPhase::Playing(Box::new(PlayState {
            contract,
            leader: self.first_bidder,
            plays: Vec::with_capacity(4),
            tricks_played: 0,
            tricks_won: [0; 4],
            piles: [Vec::with_capacity(16), Vec::with_capacity(16)],
            points: [0; 2],
            belote_team,
            belote_shown: 0,
            fallen: Vec::with_capacity(32),
        }));
        self.broadcast_game_state(false);
        self.advance(ctx);
    }

    /// Eight tricks are in: bonuses, settlement, next round or game over.
    pub(crate) fn settle_round_end(&mut self, ctx: &mut Context<Self>, last_trick_winner: Seat) {
        let RoomPhase::Playing(play) = std::mem::replace(&mut self.phase, RoomPhase::Finished)
        else {
            return;
        };
        let mut play = *play;

        play.points[team_of(last_trick_winner)] += 10;
        if let Some(team) = play.belote_team {
            play.points[team] += 20;
        }

        let outcome = RoundOutcome {
            contract: play.contract,
            points: play.points,
            tricks_by_seat: play.tricks_won,
        };
        let round_scores = settle_round(&outcome);
        let made = contract_made(&outcome);
        self.scores[0] += round_scores[0];
        self.scores[1] += round_scores[1];

        info!(
            room_id = self.id,
            round_no = self.round_no,
            round_score_team1 = round_scores[0],
            round_score_team2 = round_scores[1],
            total_team1 = self.scores[0],
            total_team2 = self.scores[1],
            contract_made = made,
            "[ROOM] round settled"
        );

        self.broadcast(&ServerMsg::MancheFinished {
            score_team1: self.scores[0],
            score_team2: self.scores[1],
            round_score_team1: round_scores[0],
            round_score_team2: round_scores[1],
            contract_made: made,
        });

        if let Some(winning_team) = match_winner(self.scores) {
            self.broadcast(&ServerMsg::GameOver {
                winning_team: winning_team as u8,
                score_team1: self.scores[0],
                score_team2: self.scores[1],
            });
            let results = (0..4u8)
                .map(|seat| {
                    let state = &self.seats[seat as usize];
                    SeatResult {
                        name: state.name.clone(),
                        human: !state.permanent_bot && !state.forfeited,
                        won: team_of(seat) == winning_team,
                    }
                })
                .collect();
            self.coordinator.do_send(RoomNotice::MatchFinished {
                room_id: self.id,
                results,
            });
            self.teardown(ctx, false);
            return;
        }

        // Next round: rebuild the deck from the piles, attacking team
        // first, cut, rotate the first bidder.
        let attacking = play.contract.team();
        let attacking_pile = std::mem::take(&mut play.piles[attacking]);
        let defending_pile = std::mem::take(&mut play.piles[other_team(attacking)]);
        self.deck.rebuild(attacking_pile, defending_pile);
        self.deck.cut(&mut self.rng);
        self.first_bidder = next_seat(self.first_bidder);
        self.round_no += 1;
        self.broadcast(&ServerMsg::NewMancheAnimation);
        self.start_bidding_round(ctx);
    }

    /// Voluntary forfeit: permanent eviction, bot replacement, possible
    /// room teardown when nobody human is left to come back.
    pub(crate) fn on_forfeit(&mut self, ctx: &mut Context<Self>, seat: Seat) {
        if self.seats[seat as usize].forfeited {
            return;
        }
        info!(room_id = self.id, seat, "[ROOM] seat forfeited");
        let state = &mut self.seats[seat as usize];
        state.forfeited = true;
        state.is_bot = true;
        state.conn = None;
        let name = state.name.clone();

        self.broadcast(&ServerMsg::PlayerForfeited { player_index: seat });
        self.coordinator.do_send(RoomNotice::SeatForfeited {
            room_id: self.id,
            name,
        });

        if self
            .seats
            .iter()
            .all(|s| s.forfeited || s.permanent_bot)
        {
            info!(room_id = self.id, "[ROOM] no reachable identity left, tearing down");
            self.teardown(ctx, true);
            return;
        }

        if self.current_actor() == Some(seat) {
            self.advance(ctx);
        }
    }

    /// A still-connected seat that was bot-flagged by a timeout takes
    /// back control.
    pub(crate) fn on_rehumanize(&mut self, ctx: &mut Context<Self>, seat: Seat) {
        let state = &mut self.seats[seat as usize];
        if state.forfeited || state.conn.is_none() || !state.is_bot {
            return;
        }
        info!(room_id = self.id, seat, "[ROOM] seat rehumanized");
        state.is_bot = false;
        self.send_to_seat(seat, ServerMsg::GameState(self.build_game_state(seat, true)));
        if self.current_actor() == Some(seat) {
            self.advance(ctx);
        }
    }

    /// A new connection presented the seat's identity: rebind and resync.
    pub(crate) fn on_rebind(
        &mut self,
        ctx: &mut Context<Self>,
        seat: Seat,
        conn_id: Uuid,
        tx: Recipient<Outbound>,
    ) {
        let state = &mut self.seats[seat as usize];
        if state.forfeited || state.permanent_bot {
            tx.do_send(Outbound(ServerMsg::GameNoLongerExists));
            return;
        }
        info!(room_id = self.id, seat, conn_id = %conn_id, "[ROOM] seat rebound");
        state.conn = Some(SeatConn { id: conn_id, tx });
        state.is_bot = false;
        self.send_to_seat(seat, ServerMsg::GameState(self.build_game_state(seat, true)));
        if self.current_actor() == Some(seat) {
            self.advance(ctx);
        }
    }

    /// Transport-level drop. A disconnect for a connection that has
    /// already been superseded by a rebind is a no-op.
    pub(crate) fn on_connection_lost(
        &mut self,
        ctx: &mut Context<Self>,
        seat: Seat,
        conn_id: Uuid,
    ) {
        let state = &mut self.seats[seat as usize];
        let Some(conn) = &state.conn else {
            return;
        };
        if conn.id != conn_id {
            warn!(
                room_id = self.id,
                seat,
                stale = %conn_id,
                "[ROOM] stale disconnect ignored"
            );
            return;
        }
        state.conn = None;
        if state.forfeited {
            return;
        }
        info!(room_id = self.id, seat, "[ROOM] seat disconnected, bot takes over");
        state.is_bot = true;
        self.broadcast(&ServerMsg::PlayerDisconnected { player_index: seat });
        self.broadcast(&ServerMsg::BotReplacement { player_index: seat });
        if self.current_actor() == Some(seat) {
            self.advance(ctx);
        }
    }

    pub(crate) fn teardown(&mut self, ctx: &mut Context<Self>, notify_players: bool) {
        if notify_players {
            self.broadcast(&ServerMsg::GameNoLongerExists);
        }
        self.phase = RoomPhase::Finished;
        self.coordinator
            .do_send(RoomNotice::RoomClosed { room_id: self.id });
        ctx.stop();
    }
}
