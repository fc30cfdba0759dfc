//! Server-side orchestration: the coordinator actor and the room actors.

pub mod coordinator;
pub mod lobby;
pub mod matchmaking;
pub mod room;
