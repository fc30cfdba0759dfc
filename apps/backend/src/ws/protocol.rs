//! Wire protocol: discriminated JSON messages over the WebSocket.
//!
//! Tags and payload fields are camelCase on the wire (`cardIndex`,
//! `bidValue`, `playerName`). Suits and bid values travel as the numeric
//! codes documented in `domain::cards_serde` and `domain::bidding`.

use serde::{Deserialize, Serialize};

use crate::domain::Card;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMsg {
    #[serde(rename_all = "camelCase")]
    Register { player_name: String },

    #[serde(rename_all = "camelCase")]
    RegisterAccount { player_name: String, password: String },

    #[serde(rename_all = "camelCase")]
    LoginAccount { player_name: String, password: String },

    #[serde(rename_all = "camelCase")]
    DeleteAccount { player_name: String, password: String },

    GetStats,

    JoinMatchmaking,

    LeaveMatchmaking,

    #[serde(rename_all = "camelCase")]
    PlayCard { card_index: usize },

    /// `bid_value`: 1..=11 announces, 12 pass, 13 coinche, 14 surcoinche.
    /// `suit`: 3..=6 plain suits, 7 all-trump, 8 no-trump; required only
    /// for announces.
    #[serde(rename_all = "camelCase")]
    MakeBid { bid_value: u8, suit: Option<u8> },

    Forfeit,

    Rehumanize,

    CreatePrivateLobby,

    #[serde(rename_all = "camelCase")]
    JoinPrivateLobby { code: String },

    #[serde(rename_all = "camelCase")]
    LobbyReady { ready: bool },

    StartLobbyGame,

    LeaveLobby,

    #[serde(rename_all = "camelCase")]
    UpdateAvatar { avatar: String },

    #[serde(rename_all = "camelCase")]
    ReportCrash { details: String },

    #[serde(rename_all = "camelCase")]
    SendContactMessage {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        email: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OpponentInfo {
    pub position: u8,
    pub name: String,
    pub card_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PliEntry {
    pub player_id: u8,
    pub card: Card,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LastBidInfo {
    pub player_index: u8,
    pub bid_value: u8,
    pub suit: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LobbyPlayerInfo {
    pub name: String,
    pub ready: bool,
    pub host: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub games_played: u32,
    pub wins: u32,
    pub losses: u32,
}

/// Personalized game snapshot. Fields that only matter for a full resync
/// (own hand, opponents' card counts) are omitted from routine updates.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameStateInfo {
    pub current_player: u8,
    pub current_player_name: String,
    pub bidding_phase: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bidding_player: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atout: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playable_cards: Option<Vec<usize>>,
    pub score_team1: i32,
    pub score_team2: i32,
    pub current_pli: Vec<PliEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_bid: Option<LastBidInfo>,
    pub coinched: bool,
    pub surcoinched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_cards: Option<Vec<Card>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponents: Option<Vec<OpponentInfo>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMsg {
    #[serde(rename_all = "camelCase")]
    Connected { message: String },

    #[serde(rename_all = "camelCase")]
    Registered {
        connection_id: String,
        player_name: String,
    },

    #[serde(rename_all = "camelCase")]
    MatchmakingStatus {
        status: String,
        players_in_queue: usize,
    },

    #[serde(rename_all = "camelCase")]
    MatchmakingCountdown { seconds: u8 },

    #[serde(rename_all = "camelCase")]
    GameFound {
        room_id: u64,
        player_position: u8,
        my_cards: Vec<Card>,
        opponents: Vec<OpponentInfo>,
    },

    GameState(GameStateInfo),

    #[serde(rename_all = "camelCase")]
    CardPlayed {
        player_index: u8,
        card_index: usize,
        card: Card,
    },

    #[serde(rename_all = "camelCase")]
    BidMade {
        player_index: u8,
        bid_value: u8,
        #[serde(skip_serializing_if = "Option::is_none")]
        suit: Option<u8>,
    },

    #[serde(rename_all = "camelCase")]
    PliFinished { winner_index: u8, points: i32 },

    #[serde(rename_all = "camelCase")]
    MancheFinished {
        score_team1: i32,
        score_team2: i32,
        round_score_team1: i32,
        round_score_team2: i32,
        contract_made: bool,
    },

    #[serde(rename_all = "camelCase")]
    GameOver {
        winning_team: u8,
        score_team1: i32,
        score_team2: i32,
    },

    NewMancheAnimation,

    #[serde(rename_all = "camelCase")]
    NewManche {
        my_cards: Vec<Card>,
        first_bidder: u8,
    },

    #[serde(rename_all = "camelCase")]
    SurcoincheWaiting { delay_ms: u64 },

    #[serde(rename_all = "camelCase")]
    SurcoincheOffer { seconds: u8 },

    #[serde(rename_all = "camelCase")]
    SurcoincheUpdate { seconds: u8 },

    SurcoincheTimeout,

    #[serde(rename_all = "camelCase")]
    Belote { player_index: u8 },

    #[serde(rename_all = "camelCase")]
    Rebelote { player_index: u8 },

    #[serde(rename_all = "camelCase")]
    BotReplacement { player_index: u8 },

    #[serde(rename_all = "camelCase")]
    PlayerForfeited { player_index: u8 },

    #[serde(rename_all = "camelCase")]
    PlayerDisconnected { player_index: u8 },

    GameNoLongerExists,

    #[serde(rename_all = "camelCase")]
    Error { message: String },

    #[serde(rename_all = "camelCase")]
    AccountRegistered { player_name: String },

    AccountDeleted,

    #[serde(rename_all = "camelCase")]
    LoginSuccess {
        player_name: String,
        stats: StatsSummary,
    },

    #[serde(rename_all = "camelCase")]
    LoginFailed { message: String },

    #[serde(rename_all = "camelCase")]
    Stats { stats: StatsSummary },

    AvatarUpdated,

    #[serde(rename_all = "camelCase")]
    LobbyCreated { code: String },

    #[serde(rename_all = "camelCase")]
    LobbyJoined {
        code: String,
        players: Vec<LobbyPlayerInfo>,
    },

    #[serde(rename_all = "camelCase")]
    LobbyUpdate { players: Vec<LobbyPlayerInfo> },

    #[serde(rename_all = "camelCase")]
    LobbyError { message: String },

    LobbyGameStart,
}
