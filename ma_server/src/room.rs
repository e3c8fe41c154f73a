//! Room actor: one spawned task owns a running game.
//!
//! All player actions for a room flow through a single channel, so the
//! game processes exactly one action at a time and bot driving inside an
//! entry point can never interleave with another action.

use log::info;
use modern_art::net::GameAction;
use modern_art::{Game, GameConfig, Phase, Player};
use tokio::sync::mpsc;

/// Handle for forwarding `(player_index, action)` pairs into a room's game.
pub type GameSender = mpsc::UnboundedSender<(usize, GameAction)>;

/// Start a game for the given seats and return its action channel. The
/// task ends when the game finishes or every handle is dropped.
pub fn spawn(room_id: String, players: Vec<Player>, config: GameConfig) -> GameSender {
    let (tx, mut rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut game = Game::new(players, config);
        game.start().await;
        while game.phase() != Phase::GameOver {
            let Some((player_index, action)) = rx.recv().await else {
                info!("room {room_id}: all connections gone, dropping game");
                return;
            };
            game.dispatch(player_index, action).await;
        }
        info!("room {room_id}: game finished");
    });
    tx
}
