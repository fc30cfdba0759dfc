//! Private lobbies: a pre-room grouping of 2 or 4 named players behind a
//! join code. Starting converts the lobby into a room, filling the empty
//! seats with bots.

use actix::prelude::*;
use rand::Rng;
use tracing::info;
use uuid::Uuid;

use crate::errors::GameError;
use crate::ws::protocol::{LobbyPlayerInfo, ServerMsg};

use super::coordinator::Coordinator;

/// Unambiguous alphabet for join codes.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LEN: usize = 6;

pub(crate) struct Lobby {
    pub code: String,
    /// The first member is the host.
    pub members: Vec<LobbyMember>,
}

pub(crate) struct LobbyMember {
    pub conn_id: Uuid,
    pub name: String,
    pub ready: bool,
}

impl Lobby {
    pub fn players(&self) -> Vec<LobbyPlayerInfo> {
        self.members
            .iter()
            .enumerate()
            .map(|(i, member)| LobbyPlayerInfo {
                name: member.name.clone(),
                ready: member.ready,
                host: i == 0,
            })
            .collect()
    }
}

impl Coordinator {
    pub(crate) fn on_create_lobby(&mut self, conn_id: Uuid) {
        let name = match self.idle_registered_name(conn_id) {
            Ok(name) => name,
            Err(err) => return self.send_lobby_error(conn_id, err),
        };
        let code = self.fresh_lobby_code();
        info!(code, host = %name, "[LOBBY] created");
        self.lobbies.insert(
            code.clone(),
            Lobby {
                code: code.clone(),
                members: vec![LobbyMember {
                    conn_id,
                    name,
                    ready: false,
                }],
            },
        );
        if let Some(entry) = self.conns.get_mut(&conn_id) {
            entry.lobby = Some(code.clone());
        }
        self.send(conn_id, ServerMsg::LobbyCreated { code: code.clone() });
        self.broadcast_lobby(&code);
    }

    pub(crate) fn on_join_lobby(&mut self, conn_id: Uuid, code: &str) {
        let name = match self.idle_registered_name(conn_id) {
            Ok(name) => name,
            Err(err) => return self.send_lobby_error(conn_id, err),
        };
        let code = code.trim().to_uppercase();
        let Some(lobby) = self.lobbies.get_mut(&code) else {
            return self.send_lobby_error(conn_id, GameError::LobbyNotFound);
        };
        if lobby.members.len() >= 4 {
            return self.send_lobby_error(conn_id, GameError::LobbyFull);
        }
        lobby.members.push(LobbyMember {
            conn_id,
            name,
            ready: false,
        });
        let players = lobby.players();
        if let Some(entry) = self.conns.get_mut(&conn_id) {
            entry.lobby = Some(code.clone());
        }
        self.send(
            conn_id,
            ServerMsg::LobbyJoined {
                code: code.clone(),
                players,
            },
        );
        self.broadcast_lobby(&code);
    }

    pub(crate) fn on_lobby_ready(&mut self, conn_id: Uuid, ready: bool) {
        let Some(code) = self.lobby_of(conn_id) else {
            return self.send_lobby_error(conn_id, GameError::LobbyNotFound);
        };
        if let Some(lobby) = self.lobbies.get_mut(&code) {
            if let Some(member) = lobby.members.iter_mut().find(|m| m.conn_id == conn_id) {
                member.ready = ready;
            }
        }
        self.broadcast_lobby(&code);
    }

    pub(crate) fn on_start_lobby_game(&mut self, ctx: &mut Context<Self>, conn_id: Uuid) {
        let Some(code) = self.lobby_of(conn_id) else {
            return self.send_lobby_error(conn_id, GameError::LobbyNotFound);
        };
        {
            let Some(lobby) = self.lobbies.get(&code) else {
                return self.send_lobby_error(conn_id, GameError::LobbyNotFound);
            };
            if lobby.members[0].conn_id != conn_id {
                return self.send_lobby_error(
                    conn_id,
                    GameError::LobbyRule("only the host can start the game".into()),
                );
            }
            let count = lobby.members.len();
            if count != 2 && count != 4 {
                return self.send_lobby_error(
                    conn_id,
                    GameError::LobbyRule("a game needs 2 or 4 players".into()),
                );
            }
            if !lobby.members.iter().all(|m| m.ready) {
                return self.send_lobby_error(
                    conn_id,
                    GameError::LobbyRule("everyone must be ready".into()),
                );
            }
        }
        let lobby = self.lobbies.remove(&code).expect("lobby checked above");
        info!(code, players = lobby.members.len(), "[LOBBY] starting game");
        let humans: Vec<(Uuid, String)> = lobby
            .members
            .iter()
            .map(|m| (m.conn_id, m.name.clone()))
            .collect();
        for member in &lobby.members {
            if let Some(entry) = self.conns.get_mut(&member.conn_id) {
                entry.lobby = None;
            }
            self.send(member.conn_id, ServerMsg::LobbyGameStart);
        }
        self.create_room(ctx, humans);
    }

    pub(crate) fn on_leave_lobby(&mut self, conn_id: Uuid) {
        if let Some(code) = self.lobby_of(conn_id) {
            self.remove_from_lobby(&code, conn_id);
        }
    }

    pub(crate) fn remove_from_lobby(&mut self, code: &str, conn_id: Uuid) {
        if let Some(entry) = self.conns.get_mut(&conn_id) {
            entry.lobby = None;
        }
        let Some(lobby) = self.lobbies.get_mut(code) else {
            return;
        };
        lobby.members.retain(|m| m.conn_id != conn_id);
        if lobby.members.is_empty() {
            self.lobbies.remove(code);
            info!(code, "[LOBBY] emptied, removed");
            return;
        }
        self.broadcast_lobby(code);
    }

    pub(crate) fn broadcast_lobby(&self, code: &str) {
        let Some(lobby) = self.lobbies.get(code) else {
            return;
        };
        let players = lobby.players();
        for member in &lobby.members {
            self.send(
                member.conn_id,
                ServerMsg::LobbyUpdate {
                    players: players.clone(),
                },
            );
        }
    }

    fn lobby_of(&self, conn_id: Uuid) -> Option<String> {
        self.conns.get(&conn_id).and_then(|entry| entry.lobby.clone())
    }

    fn send_lobby_error(&self, conn_id: Uuid, err: GameError) {
        self.send(
            conn_id,
            ServerMsg::LobbyError {
                message: err.to_string(),
            },
        );
    }

    fn fresh_lobby_code(&mut self) -> String {
        loop {
            let code: String = (0..CODE_LEN)
                .map(|_| {
                    let i = self.rng.random_range(0..CODE_ALPHABET.len());
                    CODE_ALPHABET[i] as char
                })
                .collect();
            if !self.lobbies.contains_key(&code) {
                return code;
            }
        }
    }
}
