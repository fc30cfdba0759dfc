//! Matchmaking: a FIFO queue and a generation-guarded countdown that
//! seats the first four players into a fresh room.

use actix::prelude::*;
use tracing::info;
use uuid::Uuid;

use crate::errors::GameError;
use crate::services::room::{Room, SeatInit};
use crate::ws::protocol::ServerMsg;

use super::coordinator::Coordinator;

#[derive(Default)]
pub(crate) struct Countdown {
    pub gen: u64,
    pub handle: Option<SpawnHandle>,
    pub remaining: u8,
}

impl Coordinator {
    pub(crate) fn on_join_matchmaking(&mut self, ctx: &mut Context<Self>, conn_id: Uuid) {
        if !self.queue.contains(&conn_id) {
            if let Err(err) = self.idle_registered_name(conn_id) {
                return self.send_error(conn_id, err);
            }
            self.queue.push_back(conn_id);
            info!(conn_id = %conn_id, queued = self.queue.len(), "[MATCHMAKING] joined");
        }
        self.send(
            conn_id,
            ServerMsg::MatchmakingStatus {
                status: "searching".to_string(),
                players_in_queue: self.queue.len(),
            },
        );
        self.maybe_start_countdown(ctx);
    }

    pub(crate) fn on_leave_matchmaking(&mut self, ctx: &mut Context<Self>, conn_id: Uuid) {
        self.drop_from_queue(ctx, conn_id);
        self.send(
            conn_id,
            ServerMsg::MatchmakingStatus {
                status: "left".to_string(),
                players_in_queue: self.queue.len(),
            },
        );
    }

    pub(crate) fn drop_from_queue(&mut self, ctx: &mut Context<Self>, conn_id: Uuid) {
        if let Some(pos) = self.queue.iter().position(|&id| id == conn_id) {
            self.queue.remove(pos);
            info!(conn_id = %conn_id, queued = self.queue.len(), "[MATCHMAKING] left");
        }
        if self.queue.len() < 4 {
            self.cancel_countdown(ctx);
        }
    }

    pub(crate) fn maybe_start_countdown(&mut self, ctx: &mut Context<Self>) {
        if self.queue.len() < 4 || self.countdown.handle.is_some() {
            return;
        }
        self.countdown.remaining = self.cfg.matchmaking_countdown_secs;
        info!(seconds = self.countdown.remaining, "[MATCHMAKING] countdown started");
        self.broadcast_queue(ServerMsg::MatchmakingCountdown {
            seconds: self.countdown.remaining,
        });
        self.arm_countdown_tick(ctx);
    }

    pub(crate) fn cancel_countdown(&mut self, ctx: &mut Context<Self>) {
        self.countdown.gen += 1;
        if let Some(handle) = self.countdown.handle.take() {
            ctx.cancel_future(handle);
        }
    }

    fn arm_countdown_tick(&mut self, ctx: &mut Context<Self>) {
        self.countdown.gen += 1;
        let gen = self.countdown.gen;
        let handle = ctx.run_later(self.cfg.tick_interval, move |coord, ctx| {
            coord.countdown.handle = None;
            if coord.countdown.gen != gen {
                return;
            }
            coord.countdown_tick(ctx);
        });
        if let Some(old) = self.countdown.handle.replace(handle) {
            ctx.cancel_future(old);
        }
    }

    fn countdown_tick(&mut self, ctx: &mut Context<Self>) {
        if self.queue.len() < 4 {
            self.cancel_countdown(ctx);
            return;
        }
        self.countdown.remaining = self.countdown.remaining.saturating_sub(1);
        if self.countdown.remaining > 0 {
            self.broadcast_queue(ServerMsg::MatchmakingCountdown {
                seconds: self.countdown.remaining,
            });
            self.arm_countdown_tick(ctx);
            return;
        }
        let mut humans = Vec::with_capacity(4);
        while humans.len() < 4 {
            let conn_id = self.queue.pop_front().expect("queue length checked");
            let name = self
                .conns
                .get(&conn_id)
                .and_then(|entry| entry.name.clone())
                .expect("queued connections are registered");
            humans.push((conn_id, name));
        }
        self.create_room(ctx, humans);
        // More players may still be waiting.
        self.maybe_start_countdown(ctx);
    }

    pub(crate) fn broadcast_queue(&self, msg: ServerMsg) {
        for &conn_id in &self.queue {
            self.send(conn_id, msg.clone());
        }
    }

    /// Seat the given players into a new room; remaining seats get bots.
    /// Two humans sit as partners (seats 0 and 2).
    pub(crate) fn create_room(&mut self, ctx: &mut Context<Self>, humans: Vec<(Uuid, String)>) {
        let room_id = self.next_room_id;
        self.next_room_id += 1;

        let seat_order: &[usize] = match humans.len() {
            2 => &[0, 2],
            3 => &[0, 1, 2],
            _ => &[0, 1, 2, 3],
        };
        let mut assigned: [Option<(Uuid, String)>; 4] = Default::default();
        for (human, &seat) in humans.into_iter().zip(seat_order) {
            assigned[seat] = Some(human);
        }

        let mut seats = Vec::with_capacity(4);
        for (seat, slot) in assigned.into_iter().enumerate() {
            match slot {
                Some((conn_id, name)) => {
                    let tx = self
                        .conns
                        .get(&conn_id)
                        .map(|entry| entry.tx.clone())
                        .expect("seated connections exist");
                    self.bindings.insert(name.clone(), (room_id, seat as u8));
                    if let Some(entry) = self.conns.get_mut(&conn_id) {
                        entry.room = Some((room_id, seat as u8));
                    }
                    seats.push(SeatInit {
                        name,
                        conn: Some((conn_id, tx)),
                        bot: false,
                    });
                }
                None => seats.push(SeatInit {
                    name: format!("Bot {}", seat + 1),
                    conn: None,
                    bot: true,
                }),
            }
        }

        info!(room_id, "[MATCHMAKING] room created");
        let room = Room::new(
            room_id,
            self.cfg.clone(),
            seats,
            ctx.address().recipient(),
            None,
        )
        .start();
        self.rooms.insert(room_id, room);
    }

    /// A connection may only enter matchmaking or a lobby when registered
    /// and not already committed elsewhere.
    pub(crate) fn idle_registered_name(&self, conn_id: Uuid) -> Result<String, GameError> {
        let entry = self.conns.get(&conn_id).ok_or(GameError::NotRegistered)?;
        let name = entry.name.clone().ok_or(GameError::NotRegistered)?;
        if entry.room.is_some() {
            return Err(GameError::LobbyRule("already in a game".into()));
        }
        if entry.lobby.is_some() {
            return Err(GameError::LobbyRule("already in a lobby".into()));
        }
        if self.queue.contains(&conn_id) {
            return Err(GameError::LobbyRule("already in matchmaking".into()));
        }
        Ok(name)
    }
}
