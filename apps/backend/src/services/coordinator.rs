//! The coordinator actor: connection registry, identity bindings,
//! matchmaking, lobbies, and routing between sessions and rooms.
//!
//! Everything here runs on one actor, so registry and queue mutations are
//! naturally serialized; rooms are independent actors reached only by
//! message passing.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use actix::fut::wrap_future;
use actix::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::{info, warn};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::adapters::{OutboundMailer, StatsStore};
use crate::config::TimingConfig;
use crate::domain::Seat;
use crate::errors::GameError;
use crate::services::lobby::Lobby;
use crate::services::matchmaking::Countdown;
use crate::services::room::{Room, RoomCmd};
use crate::ws::protocol::{ClientMsg, ServerMsg};
use crate::ws::session::Outbound;

#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    pub conn_id: Uuid,
    pub tx: Recipient<Outbound>,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub conn_id: Uuid,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct ClientCommand {
    pub conn_id: Uuid,
    pub msg: ClientMsg,
}

#[derive(Debug, Clone)]
pub struct SeatResult {
    pub name: String,
    /// Human identities still attached at the end (bots and forfeits are
    /// excluded from result recording here; forfeits were recorded when
    /// they left).
    pub human: bool,
    pub won: bool,
}

/// Notifications from room actors back to the coordinator.
#[derive(Message)]
#[rtype(result = "()")]
pub enum RoomNotice {
    SeatForfeited { room_id: u64, name: String },
    MatchFinished { room_id: u64, results: Vec<SeatResult> },
    RoomClosed { room_id: u64 },
}

pub(crate) struct ConnEntry {
    pub tx: Recipient<Outbound>,
    pub name: Option<String>,
    pub room: Option<(u64, Seat)>,
    pub lobby: Option<String>,
}

pub struct Coordinator {
    pub(crate) cfg: TimingConfig,
    pub(crate) stats: Arc<dyn StatsStore>,
    pub(crate) mailer: Arc<dyn OutboundMailer>,
    pub(crate) conns: HashMap<Uuid, ConnEntry>,
    /// Active connections by registered name.
    pub(crate) names: HashMap<String, Uuid>,
    /// Identity → live room seat; survives disconnects until forfeit or
    /// room teardown.
    pub(crate) bindings: HashMap<String, (u64, Seat)>,
    pub(crate) queue: VecDeque<Uuid>,
    pub(crate) countdown: Countdown,
    pub(crate) lobbies: HashMap<String, Lobby>,
    pub(crate) rooms: HashMap<u64, Addr<Room>>,
    pub(crate) next_room_id: u64,
    pub(crate) rng: ChaCha20Rng,
}

impl Coordinator {
    pub fn new(
        cfg: TimingConfig,
        stats: Arc<dyn StatsStore>,
        mailer: Arc<dyn OutboundMailer>,
    ) -> Self {
        Self {
            cfg,
            stats,
            mailer,
            conns: HashMap::new(),
            names: HashMap::new(),
            bindings: HashMap::new(),
            queue: VecDeque::new(),
            countdown: Countdown::default(),
            lobbies: HashMap::new(),
            rooms: HashMap::new(),
            next_room_id: 1,
            rng: ChaCha20Rng::from_os_rng(),
        }
    }

    pub(crate) fn send(&self, conn_id: Uuid, msg: ServerMsg) {
        if let Some(entry) = self.conns.get(&conn_id) {
            entry.tx.do_send(Outbound(msg));
        }
    }

    pub(crate) fn send_error(&self, conn_id: Uuid, err: GameError) {
        self.send(
            conn_id,
            ServerMsg::Error {
                message: err.to_string(),
            },
        );
    }

    fn on_register(&mut self, conn_id: Uuid, raw_name: &str) {
        let name: String = raw_name.trim().nfc().collect();
        if !lazy_regex::regex_is_match!(r"^[\p{L}\p{N}][\p{L}\p{N} _\-]{1,23}$", &name) {
            return self.send_error(conn_id, GameError::InvalidName);
        }

        if let Some(&existing) = self.names.get(&name) {
            if existing != conn_id {
                let reconnecting = self.bindings.contains_key(&name);
                if !reconnecting && self.conns.contains_key(&existing) {
                    return self.send_error(conn_id, GameError::NameUnavailable);
                }
                // Reconnection takeover: the new connection supersedes the
                // old binding; any disconnect still queued for the old one
                // is stale by construction.
                if let Some(old) = self.conns.get_mut(&existing) {
                    old.name = None;
                    old.room = None;
                }
            }
        }

        let tx = {
            let Some(entry) = self.conns.get_mut(&conn_id) else {
                return;
            };
            if let Some(previous) = entry.name.take() {
                self.names.remove(&previous);
            }
            entry.name = Some(name.clone());
            entry.tx.clone()
        };
        self.names.insert(name.clone(), conn_id);
        info!(conn_id = %conn_id, player = %name, "[COORDINATOR] registered");

        tx.do_send(Outbound(ServerMsg::Registered {
            connection_id: conn_id.to_string(),
            player_name: name.clone(),
        }));

        // Identity bound to a live room: rebind and resync.
        if let Some(&(room_id, seat)) = self.bindings.get(&name) {
            if let Some(room) = self.rooms.get(&room_id) {
                if let Some(entry) = self.conns.get_mut(&conn_id) {
                    entry.room = Some((room_id, seat));
                }
                info!(conn_id = %conn_id, room_id, seat, "[COORDINATOR] reconnecting to room");
                room.do_send(RoomCmd::Rebind { seat, conn_id, tx });
            }
        }
    }

    fn route_to_room(&self, conn_id: Uuid, build: impl FnOnce(Seat) -> RoomCmd) {
        let Some(entry) = self.conns.get(&conn_id) else {
            return;
        };
        let Some((room_id, seat)) = entry.room else {
            return self.send_error(conn_id, GameError::NotInRoom);
        };
        match self.rooms.get(&room_id) {
            Some(room) => room.do_send(build(seat)),
            None => self.send(conn_id, ServerMsg::GameNoLongerExists),
        }
    }

    fn registered_name(&self, conn_id: Uuid) -> Result<String, GameError> {
        self.conns
            .get(&conn_id)
            .and_then(|entry| entry.name.clone())
            .ok_or(GameError::NotRegistered)
    }

    fn spawn_record_result(&self, ctx: &mut Context<Self>, name: String, won: bool) {
        let stats = self.stats.clone();
        ctx.spawn(
            wrap_future(async move { stats.record_result(&name, won).await }).map(
                |res, _, _| {
                    if let Err(err) = res {
                        warn!(error = %err, "[COORDINATOR] failed to record result");
                    }
                },
            ),
        );
    }
}

impl Actor for Coordinator {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!("[COORDINATOR] started");
    }
}

impl Handler<Connect> for Coordinator {
    type Result = ();

    fn handle(&mut self, msg: Connect, _ctx: &mut Self::Context) -> Self::Result {
        self.conns.insert(
            msg.conn_id,
            ConnEntry {
                tx: msg.tx,
                name: None,
                room: None,
                lobby: None,
            },
        );
    }
}

impl Handler<Disconnect> for Coordinator {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, ctx: &mut Self::Context) -> Self::Result {
        let Some(entry) = self.conns.remove(&msg.conn_id) else {
            return;
        };
        self.drop_from_queue(ctx, msg.conn_id);
        if let Some(code) = &entry.lobby {
            let code = code.clone();
            self.remove_from_lobby(&code, msg.conn_id);
        }
        if let Some(name) = &entry.name {
            if self.names.get(name) == Some(&msg.conn_id) {
                self.names.remove(name);
            }
        }
        if let Some((room_id, seat)) = entry.room {
            if let Some(room) = self.rooms.get(&room_id) {
                room.do_send(RoomCmd::ConnectionLost {
                    seat,
                    conn_id: msg.conn_id,
                });
            }
        }
        info!(conn_id = %msg.conn_id, "[COORDINATOR] connection closed");
    }
}

impl Handler<ClientCommand> for Coordinator {
    type Result = ();

    fn handle(&mut self, msg: ClientCommand, ctx: &mut Self::Context) -> Self::Result {
        let conn_id = msg.conn_id;
        if !self.conns.contains_key(&conn_id) {
            return;
        }
        match msg.msg {
            ClientMsg::Register { player_name } => self.on_register(conn_id, &player_name),

            ClientMsg::JoinMatchmaking => self.on_join_matchmaking(ctx, conn_id),
            ClientMsg::LeaveMatchmaking => self.on_leave_matchmaking(ctx, conn_id),

            ClientMsg::PlayCard { card_index } => {
                self.route_to_room(conn_id, |seat| RoomCmd::PlayCard { seat, card_index })
            }
            ClientMsg::MakeBid { bid_value, suit } => self.route_to_room(conn_id, |seat| {
                RoomCmd::MakeBid {
                    seat,
                    bid_value,
                    suit,
                }
            }),
            ClientMsg::Forfeit => self.route_to_room(conn_id, |seat| RoomCmd::Forfeit { seat }),
            ClientMsg::Rehumanize => {
                self.route_to_room(conn_id, |seat| RoomCmd::Rehumanize { seat })
            }

            ClientMsg::CreatePrivateLobby => self.on_create_lobby(conn_id),
            ClientMsg::JoinPrivateLobby { code } => self.on_join_lobby(conn_id, &code),
            ClientMsg::LobbyReady { ready } => self.on_lobby_ready(conn_id, ready),
            ClientMsg::StartLobbyGame => self.on_start_lobby_game(ctx, conn_id),
            ClientMsg::LeaveLobby => self.on_leave_lobby(conn_id),

            ClientMsg::RegisterAccount {
                player_name,
                password,
            } => {
                let stats = self.stats.clone();
                let tx = self.conns[&conn_id].tx.clone();
                ctx.spawn(
                    wrap_future(async move {
                        let res = stats.register_account(&player_name, &password).await;
                        (player_name, res)
                    })
                    .map(move |(player_name, res), _, _| match res {
                        Ok(()) => tx.do_send(Outbound(ServerMsg::AccountRegistered {
                            player_name,
                        })),
                        Err(err) => {
                            warn!(error = %err, "[COORDINATOR] account registration failed");
                            tx.do_send(Outbound(ServerMsg::Error {
                                message: err.to_string(),
                            }));
                        }
                    }),
                );
            }

            ClientMsg::LoginAccount {
                player_name,
                password,
            } => {
                let stats = self.stats.clone();
                let tx = self.conns[&conn_id].tx.clone();
                ctx.spawn(
                    wrap_future(async move {
                        let res = stats.login(&player_name, &password).await;
                        (player_name, res)
                    })
                    .map(move |(player_name, res), _, _| match res {
                        Ok(summary) => tx.do_send(Outbound(ServerMsg::LoginSuccess {
                            player_name,
                            stats: summary,
                        })),
                        Err(err) => tx.do_send(Outbound(ServerMsg::LoginFailed {
                            message: err.to_string(),
                        })),
                    }),
                );
            }

            ClientMsg::DeleteAccount {
                player_name,
                password,
            } => {
                let stats = self.stats.clone();
                let tx = self.conns[&conn_id].tx.clone();
                ctx.spawn(
                    wrap_future(async move { stats.delete_account(&player_name, &password).await })
                        .map(move |res, _, _| match res {
                            Ok(()) => tx.do_send(Outbound(ServerMsg::AccountDeleted)),
                            Err(err) => tx.do_send(Outbound(ServerMsg::Error {
                                message: err.to_string(),
                            })),
                        }),
                );
            }

            ClientMsg::GetStats => {
                let name = match self.registered_name(conn_id) {
                    Ok(name) => name,
                    Err(err) => return self.send_error(conn_id, err),
                };
                let stats = self.stats.clone();
                let tx = self.conns[&conn_id].tx.clone();
                ctx.spawn(
                    wrap_future(async move { stats.stats_for(&name).await }).map(
                        move |res, _, _| match res {
                            Ok(summary) => {
                                tx.do_send(Outbound(ServerMsg::Stats { stats: summary }))
                            }
                            Err(err) => tx.do_send(Outbound(ServerMsg::Error {
                                message: err.to_string(),
                            })),
                        },
                    ),
                );
            }

            ClientMsg::UpdateAvatar { avatar } => {
                let name = match self.registered_name(conn_id) {
                    Ok(name) => name,
                    Err(err) => return self.send_error(conn_id, err),
                };
                let stats = self.stats.clone();
                let tx = self.conns[&conn_id].tx.clone();
                ctx.spawn(
                    wrap_future(async move { stats.set_avatar(&name, &avatar).await }).map(
                        move |res, _, _| match res {
                            Ok(()) => tx.do_send(Outbound(ServerMsg::AvatarUpdated)),
                            Err(err) => {
                                warn!(error = %err, "[COORDINATOR] avatar update failed");
                                tx.do_send(Outbound(ServerMsg::Error {
                                    message: err.to_string(),
                                }));
                            }
                        },
                    ),
                );
            }

            ClientMsg::SendContactMessage { message, email } => {
                let from = self
                    .registered_name(conn_id)
                    .unwrap_or_else(|_| "anonymous".to_string());
                let mailer = self.mailer.clone();
                ctx.spawn(
                    wrap_future(async move {
                        mailer
                            .send_contact(&from, email.as_deref(), &message)
                            .await
                    })
                    .map(|res, _, _| {
                        // Fire-and-forget: success or failure only reaches
                        // the log, never gameplay.
                        if let Err(err) = res {
                            warn!(error = %err, "[COORDINATOR] contact mail failed");
                        }
                    }),
                );
            }

            ClientMsg::ReportCrash { details } => {
                let from = self
                    .registered_name(conn_id)
                    .unwrap_or_else(|_| "anonymous".to_string());
                let mailer = self.mailer.clone();
                ctx.spawn(
                    wrap_future(async move { mailer.send_crash_report(&from, &details).await })
                        .map(|res, _, _| {
                            if let Err(err) = res {
                                warn!(error = %err, "[COORDINATOR] crash report mail failed");
                            }
                        }),
                );
            }
        }
    }
}

impl Handler<RoomNotice> for Coordinator {
    type Result = ();

    fn handle(&mut self, msg: RoomNotice, ctx: &mut Self::Context) -> Self::Result {
        match msg {
            RoomNotice::SeatForfeited { room_id, name } => {
                info!(room_id, player = %name, "[COORDINATOR] seat forfeited");
                self.bindings.remove(&name);
                if let Some(&conn_id) = self.names.get(&name) {
                    if let Some(entry) = self.conns.get_mut(&conn_id) {
                        entry.room = None;
                    }
                }
                // A forfeit is recorded as a loss right away.
                self.spawn_record_result(ctx, name, false);
            }
            RoomNotice::MatchFinished { room_id, results } => {
                info!(room_id, "[COORDINATOR] match finished");
                for result in results.into_iter().filter(|r| r.human) {
                    self.spawn_record_result(ctx, result.name, result.won);
                }
            }
            RoomNotice::RoomClosed { room_id } => {
                info!(room_id, "[COORDINATOR] room closed");
                self.rooms.remove(&room_id);
                self.bindings.retain(|_, &mut (bound, _)| bound != room_id);
                for entry in self.conns.values_mut() {
                    if entry.room.map(|(id, _)| id) == Some(room_id) {
                        entry.room = None;
                    }
                }
            }
        }
    }
}
