//! Automated players: valuation brain, difficulty presets, and the async
//! controller that paces and times out their decisions.

pub mod controller;
pub mod decision;
pub mod models;

pub use controller::{AuctionContext, BotController};
pub use decision::BotDecisionMaker;
pub use models::{Difficulty, DifficultyParams, NamePool};
