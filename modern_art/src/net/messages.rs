//! Wire protocol: JSON messages between clients and the server.
//!
//! Every message is an internally tagged object; the `type` field selects
//! the variant and the remaining fields are flattened alongside it.

use crate::bot::Difficulty;
use crate::catalog::{Artist, AuctionType, Card, Money};
use crate::game::PlayerPublic;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Client to server.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateRoom {
        player_name: String,
    },
    JoinRoom {
        player_name: String,
        room_id: String,
    },
    ListRooms,
    AddBot {
        #[serde(default)]
        difficulty: Option<Difficulty>,
    },
    RemoveBot,
    StartGame,
    PlayCard {
        card_index: usize,
        #[serde(default)]
        double_card_index: Option<usize>,
    },
    Bid {
        amount: Money,
    },
    Pass,
    Accept,
    SetPrice {
        amount: Money,
    },
    DoubleResponse {
        #[serde(default)]
        card_index: Option<usize>,
    },
}

impl ClientMessage {
    /// In-game actions are forwarded to the room's game; lobby messages
    /// return `None`.
    #[must_use]
    pub fn into_game_action(self) -> Option<GameAction> {
        match self {
            Self::PlayCard {
                card_index,
                double_card_index,
            } => Some(GameAction::PlayCard {
                card_index,
                double_card_index,
            }),
            Self::Bid { amount } => Some(GameAction::Bid { amount }),
            Self::Pass => Some(GameAction::Pass),
            Self::Accept => Some(GameAction::Accept),
            Self::SetPrice { amount } => Some(GameAction::SetPrice { amount }),
            Self::DoubleResponse { card_index } => {
                Some(GameAction::DoubleResponse { card_index })
            }
            _ => None,
        }
    }
}

/// A player action addressed to a running game.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GameAction {
    PlayCard {
        card_index: usize,
        double_card_index: Option<usize>,
    },
    Bid {
        amount: Money,
    },
    Pass,
    Accept,
    SetPrice {
        amount: Money,
    },
    DoubleResponse {
        card_index: Option<usize>,
    },
}

/// Lobby listing entry for one joinable room.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RoomSummary {
    pub room_id: String,
    pub host: String,
    pub player_count: usize,
    pub started: bool,
}

/// Server to client.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Error {
        message: String,
    },
    RoomCreated {
        room_id: String,
        player_id: String,
        players: Vec<PlayerPublic>,
    },
    RoomJoined {
        room_id: String,
        player_id: String,
        players: Vec<PlayerPublic>,
    },
    RoomList {
        rooms: Vec<RoomSummary>,
    },
    PlayerJoined {
        players: Vec<PlayerPublic>,
        player_name: String,
    },
    PlayerLeft {
        players: Vec<PlayerPublic>,
        player_name: String,
    },
    GameStarted {
        hand: Vec<Card>,
        players: Vec<PlayerPublic>,
        your_index: usize,
        round: u8,
        current_turn: usize,
    },
    YourTurn {
        player_index: usize,
    },
    TurnChanged {
        player_index: usize,
    },
    CardPlayed {
        artist: Artist,
        board_count: u8,
        player_index: usize,
        player_name: String,
        auction_type: AuctionType,
        #[serde(default)]
        is_double: bool,
    },
    DoubleRequest {
        player_index: usize,
        artist: Artist,
    },
    AuctionStarted {
        auction_type: AuctionType,
        card: Card,
        seller_index: usize,
        current_bid: Money,
        can_act: bool,
        fixed_price: Money,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        double_card: Option<Card>,
    },
    BidUpdate {
        player_index: usize,
        player_name: String,
        amount: Money,
        can_act: bool,
    },
    /// Private acknowledgement of a sealed bid; amounts are never
    /// broadcast before resolution.
    BidConfirmed {
        amount: Money,
    },
    AuctionResult {
        winner_index: usize,
        winner_name: String,
        price: Money,
        card: Card,
        players: Vec<PlayerPublic>,
    },
    RoundEnded {
        round_values: BTreeMap<Artist, Money>,
        market: BTreeMap<Artist, Money>,
        players: Vec<PlayerPublic>,
        earnings: BTreeMap<String, Money>,
        next_round: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new_hand: Option<Vec<Card>>,
    },
    GameEnded {
        players: Vec<PlayerPublic>,
        winner_index: usize,
        winner_name: String,
    },
}
