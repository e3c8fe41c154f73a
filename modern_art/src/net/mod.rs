//! Wire protocol types shared by the engine and the server.

pub mod messages;

pub use messages::{ClientMessage, GameAction, RoomSummary, ServerMessage};
