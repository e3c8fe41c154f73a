//! Core game logic: entities, the auction state machine, and the
//! turn/round orchestrator.

pub mod auction;
pub mod entities;
pub mod orchestrator;

pub use auction::{Auction, AuctionAction, AuctionOutcome, AuctionState};
pub use entities::{Board, GameConfig, Market, Player, PlayerPublic, Seat};
pub use orchestrator::{Game, Phase};

use crate::catalog::Money;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every way a player action can be rejected.
///
/// A rejection is reported to the offending actor only and never mutates
/// game state; the game always continues.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum ActionError {
    #[error("game not active")]
    GameNotActive,
    #[error("auction in progress")]
    AuctionInProgress,
    #[error("no auction in progress")]
    NoActiveAuction,
    #[error("waiting for a double response")]
    DoublePending,
    #[error("no double response expected from you")]
    NoDoublePending,
    #[error("not your turn")]
    NotYourTurn,
    #[error("invalid card index")]
    InvalidCardIndex,
    #[error("double card must be same artist")]
    DoubleArtistMismatch,
    #[error("seller cannot bid")]
    SellerCannotBid,
    #[error("already passed")]
    AlreadyPassed,
    #[error("already submitted a bid")]
    AlreadyBid,
    #[error("bid must be higher than {current}")]
    BidTooLow { current: Money },
    #[error("amount must be in multiples of 1000")]
    NotAMultiple,
    #[error("price must be positive")]
    PriceNotPositive,
    #[error("not waiting for a price")]
    NotWaitingForPrice,
    #[error("not enough money")]
    InsufficientFunds,
    #[error("wrong auction type for this action")]
    WrongAuctionType,
    #[error("invalid action")]
    InvalidAction,
}
