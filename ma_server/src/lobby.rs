//! Room registry and pre-game membership.
//!
//! The lobby owns every room until its game starts, and keeps routing
//! player actions to the right room actor afterwards. All mutation goes
//! through one async mutex; nothing here blocks on the game itself, so
//! holding the lock stays cheap.

use std::collections::HashMap;

use log::info;
use modern_art::bot::{Difficulty, NamePool};
use modern_art::catalog::STARTING_MONEY;
use modern_art::{GameConfig, MAX_PLAYERS, MIN_PLAYERS, Player, PlayerPublic, RoomSummary, ServerMessage};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use crate::room::{self, GameSender};

/// One seat in a room. Bots have no sender; a disconnected human keeps the
/// seat but loses the sender once the game has started.
struct SeatEntry {
    player_id: String,
    name: String,
    sender: Option<UnboundedSender<ServerMessage>>,
}

impl SeatEntry {
    fn is_bot(&self) -> bool {
        self.player_id.starts_with("bot_")
    }

    fn public(&self) -> PlayerPublic {
        PlayerPublic {
            name: self.name.clone(),
            money: STARTING_MONEY,
            hand_count: 0,
            paintings_count: 0,
            is_bot: self.is_bot(),
        }
    }
}

struct Room {
    room_id: String,
    host_id: String,
    seats: Vec<SeatEntry>,
    started: bool,
    difficulty: Difficulty,
    names: NamePool,
    game: Option<GameSender>,
}

impl Room {
    fn broadcast(&self, message: &ServerMessage) {
        for seat in &self.seats {
            if let Some(sender) = &seat.sender {
                let _ = sender.send(message.clone());
            }
        }
    }

    fn public_players(&self) -> Vec<PlayerPublic> {
        self.seats.iter().map(SeatEntry::public).collect()
    }

    fn summary(&self) -> RoomSummary {
        let host = self
            .seats
            .iter()
            .find(|seat| seat.player_id == self.host_id)
            .map(|seat| seat.name.clone())
            .unwrap_or_default();
        RoomSummary {
            room_id: self.room_id.clone(),
            host,
            player_count: self.seats.len(),
            started: self.started,
        }
    }
}

pub struct Lobby {
    rooms: HashMap<String, Room>,
    player_room: HashMap<String, String>,
    rng: StdRng,
}

impl Lobby {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
            player_room: HashMap::new(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Create a room with the caller as host. Returns the new player id for
    /// the connection to remember.
    pub fn create_room(
        &mut self,
        player_name: &str,
        sender: UnboundedSender<ServerMessage>,
    ) -> Result<String, String> {
        let player_name = player_name.trim();
        if player_name.is_empty() {
            return Err("Player name is required".to_string());
        }

        let room_id = new_room_id();
        let player_id = new_player_id();
        let room = Room {
            room_id: room_id.clone(),
            host_id: player_id.clone(),
            seats: vec![SeatEntry {
                player_id: player_id.clone(),
                name: player_name.to_string(),
                sender: Some(sender.clone()),
            }],
            started: false,
            difficulty: Difficulty::Normal,
            names: NamePool::new(&mut self.rng),
            game: None,
        };

        let _ = sender.send(ServerMessage::RoomCreated {
            room_id: room_id.clone(),
            player_id: player_id.clone(),
            players: room.public_players(),
        });
        info!("room {room_id}: created by {player_name}");

        self.rooms.insert(room_id.clone(), room);
        self.player_room.insert(player_id.clone(), room_id);
        Ok(player_id)
    }

    /// Join an existing room. Rejected once the game has started or the
    /// table is full.
    pub fn join_room(
        &mut self,
        player_name: &str,
        room_id: &str,
        sender: UnboundedSender<ServerMessage>,
    ) -> Result<String, String> {
        let player_name = player_name.trim();
        if player_name.is_empty() {
            return Err("Player name is required".to_string());
        }
        let room_id = room_id.to_uppercase();
        let room = self
            .rooms
            .get_mut(&room_id)
            .ok_or_else(|| format!("Room {room_id} not found"))?;
        if room.started {
            return Err("Game already started".to_string());
        }
        if room.seats.len() >= MAX_PLAYERS {
            return Err("Room is full".to_string());
        }

        let player_id = new_player_id();
        room.seats.push(SeatEntry {
            player_id: player_id.clone(),
            name: player_name.to_string(),
            sender: Some(sender.clone()),
        });
        let players = room.public_players();

        let _ = sender.send(ServerMessage::RoomJoined {
            room_id: room_id.clone(),
            player_id: player_id.clone(),
            players: players.clone(),
        });
        let joined = ServerMessage::PlayerJoined {
            players,
            player_name: player_name.to_string(),
        };
        for seat in &room.seats {
            if seat.player_id != player_id {
                if let Some(other) = &seat.sender {
                    let _ = other.send(joined.clone());
                }
            }
        }
        info!("room {room_id}: {player_name} joined");

        self.player_room.insert(player_id.clone(), room_id);
        Ok(player_id)
    }

    /// Rooms still open for joining.
    pub fn list_rooms(&self, sender: &UnboundedSender<ServerMessage>) {
        let rooms = self
            .rooms
            .values()
            .filter(|room| !room.started && room.seats.len() < MAX_PLAYERS)
            .map(Room::summary)
            .collect();
        let _ = sender.send(ServerMessage::RoomList { rooms });
    }

    /// Host-only: seat a bot. An explicit difficulty applies to every bot
    /// in the room's game.
    pub fn add_bot(
        &mut self,
        player_id: &str,
        difficulty: Option<Difficulty>,
    ) -> Result<(), String> {
        let room_id = self.host_room_id(player_id, "add bots")?;
        let room = self
            .rooms
            .get_mut(&room_id)
            .ok_or_else(|| "Not in a room".to_string())?;
        if room.started {
            return Err("Game already started".to_string());
        }
        if room.seats.len() >= MAX_PLAYERS {
            return Err("Room is full".to_string());
        }
        if let Some(difficulty) = difficulty {
            room.difficulty = difficulty;
        }

        let name = room.names.next_name(&mut self.rng);
        room.seats.push(SeatEntry {
            player_id: format!("bot_{}", new_player_id()),
            name: name.clone(),
            sender: None,
        });
        room.broadcast(&ServerMessage::PlayerJoined {
            players: room.public_players(),
            player_name: name,
        });
        Ok(())
    }

    /// Host-only: remove the most recently added bot.
    pub fn remove_bot(&mut self, player_id: &str) -> Result<(), String> {
        let room = self.room_of_host(player_id, "remove bots")?;
        if room.started {
            return Err("Game already started".to_string());
        }
        let last_bot = room
            .seats
            .iter()
            .rposition(SeatEntry::is_bot)
            .ok_or_else(|| "No bots to remove".to_string())?;
        let removed = room.seats.remove(last_bot);
        room.broadcast(&ServerMessage::PlayerLeft {
            players: room.public_players(),
            player_name: removed.name,
        });
        Ok(())
    }

    /// Host-only: lock the seats and hand the room to a game actor.
    pub fn start_game(&mut self, player_id: &str) -> Result<(), String> {
        let room = self.room_of_host(player_id, "start the game")?;
        if room.started {
            return Err("Game already started".to_string());
        }
        if room.seats.len() < MIN_PLAYERS {
            return Err(format!("Need at least {MIN_PLAYERS} players"));
        }

        let players = room
            .seats
            .iter()
            .map(|seat| match &seat.sender {
                Some(sender) => Player::human(seat.name.clone(), sender.clone()),
                None => Player::bot(seat.name.clone()),
            })
            .collect();
        let config = GameConfig {
            difficulty: room.difficulty,
            ..GameConfig::default()
        };

        room.started = true;
        room.game = Some(room::spawn(room.room_id.clone(), players, config));
        info!("room {}: game started with {} seats", room.room_id, room.seats.len());
        Ok(())
    }

    /// Channel and seat index for an in-game action from this player.
    /// A finished game's actor has hung up its channel; actions sent after
    /// that are answered "no game" instead of vanishing into a dead sender.
    pub fn route_action(&self, player_id: &str) -> Option<(GameSender, usize)> {
        let room_id = self.player_room.get(player_id)?;
        let room = self.rooms.get(room_id)?;
        let game = room.game.clone()?;
        if game.is_closed() {
            return None;
        }
        let index = room
            .seats
            .iter()
            .position(|seat| seat.player_id == player_id)?;
        Some((game, index))
    }

    /// Connection closed. Before a game starts the seat is freed; during a
    /// game the seat stays so indices keep their meaning, but delivery to it
    /// stops. A room with no connected humans left is dropped, which also
    /// ends its game actor.
    pub fn disconnect(&mut self, player_id: &str) {
        let Some(room_id) = self.player_room.remove(player_id) else {
            return;
        };
        let Some(room) = self.rooms.get_mut(&room_id) else {
            return;
        };
        let Some(seat_index) = room
            .seats
            .iter()
            .position(|seat| seat.player_id == player_id)
        else {
            return;
        };

        let name = if room.started {
            let seat = &mut room.seats[seat_index];
            seat.sender = None;
            seat.name.clone()
        } else {
            room.seats.remove(seat_index).name
        };
        info!("room {room_id}: {name} disconnected");

        let humans_left = room
            .seats
            .iter()
            .any(|seat| !seat.is_bot() && seat.sender.is_some());
        if !humans_left {
            info!("room {room_id}: no humans left, closing");
            self.rooms.remove(&room_id);
            return;
        }

        if room.host_id == player_id {
            if let Some(new_host) = room
                .seats
                .iter()
                .find(|seat| !seat.is_bot() && seat.sender.is_some())
            {
                room.host_id = new_host.player_id.clone();
            }
        }
        room.broadcast(&ServerMessage::PlayerLeft {
            players: room.public_players(),
            player_name: name,
        });
    }

    fn host_room_id(&self, player_id: &str, what: &str) -> Result<String, String> {
        let room_id = self
            .player_room
            .get(player_id)
            .ok_or_else(|| "Not in a room".to_string())?;
        let room = self
            .rooms
            .get(room_id)
            .ok_or_else(|| "Not in a room".to_string())?;
        if room.host_id != player_id {
            return Err(format!("Only the host can {what}"));
        }
        Ok(room_id.clone())
    }

    fn room_of_host(&mut self, player_id: &str, what: &str) -> Result<&mut Room, String> {
        let room_id = self
            .player_room
            .get(player_id)
            .ok_or_else(|| "Not in a room".to_string())?;
        let room = self
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| "Not in a room".to_string())?;
        if room.host_id != player_id {
            return Err(format!("Only the host can {what}"));
        }
        Ok(room)
    }
}

impl Default for Lobby {
    fn default() -> Self {
        Self::new()
    }
}

fn new_room_id() -> String {
    Uuid::new_v4().simple().to_string()[..6].to_uppercase()
}

fn new_player_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}
