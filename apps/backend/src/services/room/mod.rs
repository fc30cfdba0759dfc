//! The room actor: one running match, four seats.
//!
//! All room state is owned by this single actor and mutated only inside
//! its message handlers, so a room is a serialization domain of its own.
//! Bot turns step through a `ProcessTurn` self-notification instead of an
//! in-handler loop, keeping the mailbox responsive between bot moves.

mod bidding;
mod lifecycle;
mod timers;
mod tricks;

use actix::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::TimingConfig;
use crate::domain::bidding::Contract;
use crate::domain::cards_serde::trump_mode_code;
use crate::domain::{nth_from, playable_cards, Auction, Card, Deck, Seat, TeamId};
use crate::errors::GameError;
use crate::services::coordinator::RoomNotice;
use crate::ws::protocol::{GameStateInfo, LastBidInfo, OpponentInfo, PliEntry, ServerMsg};
use crate::ws::session::Outbound;

use self::timers::TimerBank;

/// Initial description of one seat when the room is created.
pub struct SeatInit {
    pub name: String,
    pub conn: Option<(Uuid, Recipient<Outbound>)>,
    pub bot: bool,
}

pub(crate) struct SeatConn {
    pub id: Uuid,
    pub tx: Recipient<Outbound>,
}

pub(crate) struct RoomSeat {
    pub name: String,
    pub conn: Option<SeatConn>,
    pub is_bot: bool,
    pub forfeited: bool,
    /// Seats filled with bots at creation; never eligible to rebind.
    pub permanent_bot: bool,
    pub hand: Vec<Card>,
    pub has_belote: bool,
}

pub(crate) struct PlayState {
    pub contract: Contract,
    pub leader: Seat,
    pub plays: Vec<(Seat, Card)>,
    pub tricks_played: u8,
    pub tricks_won: [u8; 4],
    pub piles: [Vec<Card>; 2],
    pub points: [i32; 2],
    pub belote_team: Option<TeamId>,
    pub belote_shown: u8,
    pub fallen: Vec<Card>,
}

pub(crate) enum RoomPhase {
    Bidding(Auction),
    Playing(Box<PlayState>),
    Finished,
}

pub struct Room {
    pub(crate) id: u64,
    pub(crate) cfg: TimingConfig,
    pub(crate) coordinator: Recipient<RoomNotice>,
    pub(crate) seats: [RoomSeat; 4],
    pub(crate) scores: [i32; 2],
    pub(crate) round_no: u32,
    pub(crate) first_bidder: Seat,
    pub(crate) phase: RoomPhase,
    pub(crate) deck: Deck,
    pub(crate) rng: ChaCha20Rng,
    pub(crate) timers: TimerBank,
}

impl Room {
    /// `seed` pins the shuffle and cuts for deterministic tests.
    pub fn new(
        id: u64,
        cfg: TimingConfig,
        seats: Vec<SeatInit>,
        coordinator: Recipient<RoomNotice>,
        seed: Option<u64>,
    ) -> Self {
        assert_eq!(seats.len(), 4, "a room needs exactly four seats");
        let seats: Vec<RoomSeat> = seats
            .into_iter()
            .map(|init| RoomSeat {
                name: init.name,
                conn: init
                    .conn
                    .map(|(conn_id, tx)| SeatConn { id: conn_id, tx }),
                is_bot: init.bot,
                forfeited: false,
                permanent_bot: init.bot,
                hand: Vec::new(),
                has_belote: false,
            })
            .collect();
        let rng = match seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_os_rng(),
        };
        Self {
            id,
            cfg,
            coordinator,
            seats: seats.try_into().unwrap_or_else(|_| unreachable!()),
            scores: [0; 2],
            round_no: 0,
            first_bidder: 0,
            phase: RoomPhase::Finished,
            deck: Deck::empty(),
            rng,
            timers: TimerBank::default(),
        }
    }

    /// The seat expected to act right now, if anyone.
    pub(crate) fn current_actor(&self) -> Option<Seat> {
        match &self.phase {
            RoomPhase::Bidding(auction) if !auction.window_open() => Some(auction.turn()),
            RoomPhase::Bidding(_) => None,
            RoomPhase::Playing(play) => Some(nth_from(play.leader, play.plays.len() as u8)),
            RoomPhase::Finished => None,
        }
    }

    /// Fan a frame out to every connected seat; unbound seats are skipped.
    pub(crate) fn broadcast(&self, msg: &ServerMsg) {
        for seat in &self.seats {
            if let Some(conn) = &seat.conn {
                conn.tx.do_send(Outbound(msg.clone()));
            }
        }
    }

    pub(crate) fn send_to_seat(&self, seat: Seat, msg: ServerMsg) {
        if let Some(conn) = &self.seats[seat as usize].conn {
            conn.tx.do_send(Outbound(msg));
        }
    }

    pub(crate) fn send_error(&self, seat: Seat, err: GameError) {
        debug!(room_id = self.id, seat, error = %err, "[ROOM] rejected action");
        self.send_to_seat(
            seat,
            ServerMsg::Error {
                message: err.to_string(),
            },
        );
    }

    /// Personalized snapshot; `full` adds the seat's hand and the
    /// opponents' remaining card counts (reconnection resync).
    pub(crate) fn build_game_state(&self, seat: Seat, full: bool) -> GameStateInfo {
        let mut state = GameStateInfo {
            score_team1: self.scores[0],
            score_team2: self.scores[1],
            ..Default::default()
        };

        match &self.phase {
            RoomPhase::Bidding(auction) => {
                state.current_player = auction.turn();
                state.bidding_phase = true;
                state.bidding_player = Some(auction.turn());
                state.coinched = auction.coinched();
                state.last_bid = auction.best().map(|bid| LastBidInfo {
                    player_index: bid.seat,
                    bid_value: bid.announce.code(),
                    suit: trump_mode_code(bid.mode),
                });
            }
            RoomPhase::Playing(play) => {
                let actor = nth_from(play.leader, play.plays.len() as u8);
                state.current_player = actor;
                state.atout = Some(trump_mode_code(play.contract.mode));
                state.coinched = play.contract.coinched;
                state.surcoinched = play.contract.surcoinched;
                state.last_bid = Some(LastBidInfo {
                    player_index: play.contract.seat,
                    bid_value: play.contract.announce.code(),
                    suit: trump_mode_code(play.contract.mode),
                });
                state.current_pli = play
                    .plays
                    .iter()
                    .map(|&(player_id, card)| PliEntry { player_id, card })
                    .collect();
                state.playable_cards = Some(playable_cards(
                    &self.seats[seat as usize].hand,
                    &play.plays,
                    play.contract.mode,
                    seat,
                ));
            }
            RoomPhase::Finished => {}
        }

        state.current_player_name = self.seats[state.current_player as usize].name.clone();

        if full {
            state.my_cards = Some(self.seats[seat as usize].hand.clone());
            state.opponents = Some(self.opponents_of(seat));
        }
        state
    }

    pub(crate) fn opponents_of(&self, seat: Seat) -> Vec<OpponentInfo> {
        (0..4u8)
            .filter(|&other| other != seat)
            .map(|other| OpponentInfo {
                position: other,
                name: self.seats[other as usize].name.clone(),
                card_count: self.seats[other as usize].hand.len(),
            })
            .collect()
    }

    pub(crate) fn broadcast_game_state(&self, full: bool) {
        for seat in 0..4u8 {
            if self.seats[seat as usize].conn.is_some() {
                self.send_to_seat(seat, ServerMsg::GameState(self.build_game_state(seat, full)));
            }
        }
    }

    /// After every accepted action: hand the turn to a bot, or arm the
    /// matching timeout for a human.
    pub(crate) fn advance(&mut self, ctx: &mut Context<Self>) {
        self.timers.bid.cancel(ctx);
        self.timers.turn.cancel(ctx);
        let Some(actor) = self.current_actor() else {
            return;
        };
        if self.seats[actor as usize].is_bot {
            ctx.notify(ProcessTurn);
            return;
        }
        match &self.phase {
            RoomPhase::Bidding(_) => self.arm_bid_timer(ctx),
            RoomPhase::Playing(_) => self.arm_turn_timer(ctx),
            RoomPhase::Finished => {}
        }
    }

    /// Flag a seat as bot-controlled and let the bot move if it is that
    /// seat's turn.
    pub(crate) fn bot_substitute(&mut self, ctx: &mut Context<Self>, seat: Seat) {
        self.seats[seat as usize].is_bot = true;
        self.broadcast(&ServerMsg::BotReplacement { player_index: seat });
        if self.current_actor() == Some(seat) {
            self.advance(ctx);
        }
    }
}

impl Actor for Room {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(
            room_id = self.id,
            players = ?self.seats.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            "[ROOM] started"
        );
        self.start_match(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        info!(room_id = self.id, "[ROOM] stopped");
    }
}

/// Player-originated commands, routed through the coordinator.
#[derive(Message)]
#[rtype(result = "()")]
pub enum RoomCmd {
    MakeBid {
        seat: Seat,
        bid_value: u8,
        suit: Option<u8>,
    },
    PlayCard {
        seat: Seat,
        card_index: usize,
    },
    Forfeit {
        seat: Seat,
    },
    Rehumanize {
        seat: Seat,
    },
    Rebind {
        seat: Seat,
        conn_id: Uuid,
        tx: Recipient<Outbound>,
    },
    ConnectionLost {
        seat: Seat,
        conn_id: Uuid,
    },
}

/// Internal stepper for bot turns.
#[derive(Message)]
#[rtype(result = "()")]
pub(crate) struct ProcessTurn;

impl Handler<RoomCmd> for Room {
    type Result = ();

    fn handle(&mut self, msg: RoomCmd, ctx: &mut Self::Context) -> Self::Result {
        match msg {
            RoomCmd::MakeBid {
                seat,
                bid_value,
                suit,
            } => {
                if let Err(err) = self.acting_seat_ok(seat) {
                    self.send_error(seat, err);
                    return;
                }
                self.on_make_bid(ctx, seat, bid_value, suit);
            }
            RoomCmd::PlayCard { seat, card_index } => {
                if let Err(err) = self.acting_seat_ok(seat) {
                    self.send_error(seat, err);
                    return;
                }
                self.on_play_card(ctx, seat, card_index);
            }
            RoomCmd::Forfeit { seat } => self.on_forfeit(ctx, seat),
            RoomCmd::Rehumanize { seat } => self.on_rehumanize(ctx, seat),
            RoomCmd::Rebind { seat, conn_id, tx } => self.on_rebind(ctx, seat, conn_id, tx),
            RoomCmd::ConnectionLost { seat, conn_id } => {
                self.on_connection_lost(ctx, seat, conn_id)
            }
        }
    }
}

impl Room {
    /// A human command is only valid from a live, human-controlled seat.
    fn acting_seat_ok(&self, seat: Seat) -> Result<(), GameError> {
        let state = &self.seats[seat as usize];
        if state.forfeited {
            return Err(GameError::SeatForfeited);
        }
        if state.is_bot {
            return Err(GameError::BotControlled);
        }
        Ok(())
    }
}

impl Handler<ProcessTurn> for Room {
    type Result = ();

    fn handle(&mut self, _msg: ProcessTurn, ctx: &mut Self::Context) -> Self::Result {
        let Some(seat) = self.current_actor() else {
            return;
        };
        if !self.seats[seat as usize].is_bot {
            // A rebind can land between two bot steps; fall back to timers.
            self.advance(ctx);
            return;
        }
        match &self.phase {
            RoomPhase::Bidding(auction) => {
                let choice =
                    crate::ai::choose_bid(&self.seats[seat as usize].hand, seat, auction.best());
                debug!(room_id = self.id, seat, ?choice, "[ROOM] bot bid");
                if let Err(err) = self.apply_bot_bid(ctx, seat, choice) {
                    // The bot only ever picks from legal options.
                    warn!(room_id = self.id, seat, error = %err, "[ROOM] bot bid rejected");
                }
            }
            RoomPhase::Playing(play) => {
                let hand = &self.seats[seat as usize].hand;
                let legal = playable_cards(hand, &play.plays, play.contract.mode, seat);
                let view = crate::domain::BotView {
                    seat,
                    hand,
                    legal: &legal,
                    mode: play.contract.mode,
                    plays: &play.plays,
                    fallen: &play.fallen,
                    attacking: crate::domain::team_of(seat) == play.contract.team(),
                    tricks_won: play.tricks_won,
                };
                let card_index = crate::ai::choose_card(&view);
                if let Err(err) = self.apply_play(ctx, seat, card_index) {
                    warn!(room_id = self.id, seat, error = %err, "[ROOM] bot play rejected");
                }
            }
            RoomPhase::Finished => {}
        }
    }
}
