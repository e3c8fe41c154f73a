//! Game entities: players and their seats, the round board, and the
//! cumulative market.

use crate::bot::models::Difficulty;
use crate::catalog::{Artist, Card, Money, ROUND_END_CARD_COUNT, STARTING_MONEY, round_value};
use crate::net::messages::ServerMessage;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::mpsc;

/// How a participant is reached.
///
/// Humans hold the sending half of their connection's outbound channel;
/// automated participants have no connection and message delivery to them
/// is a no-op.
#[derive(Clone, Debug)]
pub enum Seat {
    Human(mpsc::UnboundedSender<ServerMessage>),
    Bot,
}

/// One participant in a game.
#[derive(Debug)]
pub struct Player {
    pub name: String,
    pub money: Money,
    pub hand: Vec<Card>,
    pub paintings: Vec<Card>,
    seat: Seat,
}

impl Player {
    #[must_use]
    pub fn human(name: impl Into<String>, sender: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self::new(name, Seat::Human(sender))
    }

    #[must_use]
    pub fn bot(name: impl Into<String>) -> Self {
        Self::new(name, Seat::Bot)
    }

    fn new(name: impl Into<String>, seat: Seat) -> Self {
        Self {
            name: name.into(),
            money: STARTING_MONEY,
            hand: Vec::new(),
            paintings: Vec::new(),
            seat,
        }
    }

    #[must_use]
    pub fn is_bot(&self) -> bool {
        matches!(self.seat, Seat::Bot)
    }

    /// Deliver a message to this participant. No-op for bots; a failed send
    /// (disconnected client) is swallowed and never aborts game processing.
    pub fn send(&self, message: ServerMessage) {
        if let Seat::Human(sender) = &self.seat {
            let _ = sender.send(message);
        }
    }

    /// The hand-hidden view every participant may see.
    #[must_use]
    pub fn public(&self) -> PlayerPublic {
        PlayerPublic {
            name: self.name.clone(),
            money: self.money,
            hand_count: self.hand.len(),
            paintings_count: self.paintings.len(),
            is_bot: self.is_bot(),
        }
    }
}

/// Public player snapshot included in broadcasts.
#[derive(Clone, Debug, PartialEq, Serialize, serde::Deserialize)]
pub struct PlayerPublic {
    pub name: String,
    pub money: Money,
    pub hand_count: usize,
    pub paintings_count: usize,
    pub is_bot: bool,
}

/// Per-artist tally of cards played face-up in the current round.
/// Reset at every round boundary.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Board {
    counts: [u8; Artist::COUNT],
}

impl Board {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn count(&self, artist: Artist) -> u8 {
        self.counts[artist.index()]
    }

    #[must_use]
    pub fn counts(&self) -> &[u8; Artist::COUNT] {
        &self.counts
    }

    /// Apply one increment and return the new count. The caller must check
    /// [`Board::ends_round`] after every single increment, including both
    /// halves of a double play.
    pub fn increment(&mut self, artist: Artist) -> u8 {
        self.counts[artist.index()] += 1;
        self.counts[artist.index()]
    }

    #[must_use]
    pub fn ends_round(&self, artist: Artist) -> bool {
        self.count(artist) >= ROUND_END_CARD_COUNT
    }

    pub fn reset(&mut self) {
        self.counts = [0; Artist::COUNT];
    }

    /// Per-artist value earned this round: artists with at least one card
    /// played are ranked by count, ties broken by the fixed artist priority
    /// order, and ranks 1..3 earn 30000/20000/10000.
    #[must_use]
    pub fn round_values(&self) -> [Money; Artist::COUNT] {
        let mut ranked: Vec<(usize, u8)> = self
            .counts
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, count)| count > 0)
            .collect();
        ranked.sort_by_key(|&(artist_idx, count)| (Reverse(count), artist_idx));

        let mut values = [0; Artist::COUNT];
        for (rank0, (artist_idx, _)) in ranked.into_iter().enumerate() {
            values[artist_idx] = round_value(rank0 + 1);
        }
        values
    }

    #[must_use]
    pub fn to_map(&self) -> BTreeMap<Artist, u8> {
        Artist::ALL
            .into_iter()
            .map(|artist| (artist, self.count(artist)))
            .collect()
    }
}

/// Cumulative per-artist value carried across rounds. Monotonically
/// non-decreasing; never reset.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Market {
    values: [Money; Artist::COUNT],
}

impl Market {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn value(&self, artist: Artist) -> Money {
        self.values[artist.index()]
    }

    #[must_use]
    pub fn values(&self) -> &[Money; Artist::COUNT] {
        &self.values
    }

    pub fn award(&mut self, artist: Artist, value: Money) {
        self.values[artist.index()] += value;
    }

    #[must_use]
    pub fn to_map(&self) -> BTreeMap<Artist, Money> {
        Artist::ALL
            .into_iter()
            .map(|artist| (artist, self.value(artist)))
            .collect()
    }
}

/// Per-game tuning: presentation pacing, bot difficulty, and bot timing.
#[derive(Clone, Debug)]
pub struct GameConfig {
    /// Pause after an auction resolves, for presentation only.
    pub auction_result_pause: Duration,
    /// Pause after a round's scoring, for presentation only.
    pub round_end_pause: Duration,
    pub difficulty: Difficulty,
    /// Bounds of the randomized "thinking" delay before a bot decision.
    pub min_think: Duration,
    pub max_think: Duration,
    /// Hard wall-clock limit per bot decision; on expiry a safe fallback is
    /// substituted, never a retry.
    pub decision_timeout: Duration,
    /// Seed for the bot engine's RNG; `None` seeds from the OS.
    pub bot_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            auction_result_pause: Duration::from_secs(2),
            round_end_pause: Duration::from_secs(2),
            difficulty: Difficulty::Normal,
            min_think: Duration::from_millis(800),
            max_think: Duration::from_millis(2500),
            decision_timeout: Duration::from_secs(5),
            bot_seed: None,
        }
    }
}

impl GameConfig {
    /// Zero pacing and instant bot decisions, for tests.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            auction_result_pause: Duration::ZERO,
            round_end_pause: Duration::ZERO,
            min_think: Duration::ZERO,
            max_think: Duration::ZERO,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.bot_seed = Some(seed);
        self
    }
}
