//! Engine for a multiplayer auction card game.
//!
//! Players take turns putting painting cards up for auction under one of
//! five protocols; each sale raises an artist's standing, rounds end when
//! any artist hits five cards, and paintings cash out at the artist's
//! cumulative market value. The richest player after four rounds wins.
//!
//! The crate is transport-agnostic: [`game::Game`] consumes
//! [`net::GameAction`] values and emits [`net::ServerMessage`] values
//! through per-player channels. Bots plug into the same validation path
//! as humans via [`bot::BotController`].

pub mod bot;
pub mod catalog;
pub mod game;
pub mod net;

pub use catalog::{Artist, AuctionType, Card, Deck, MAX_PLAYERS, MIN_PLAYERS, Money};
pub use game::{ActionError, Game, GameConfig, Phase, Player, PlayerPublic};
pub use net::{ClientMessage, GameAction, RoomSummary, ServerMessage};
