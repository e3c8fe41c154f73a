//! The auction state machine.
//!
//! One `Auction` owns the lifecycle of a single card (or a paired double)
//! from creation to a terminal resolution. The orchestrator maps a `double`
//! play onto an effective protocol before construction, so an `Auction` is
//! never constructed with [`AuctionType::Double`].
//!
//! Every action is validated before any record is mutated: a rejected action
//! leaves the auction exactly as it was.

use super::ActionError;
use crate::catalog::{AuctionType, BID_INCREMENT, Card, Money};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Lifecycle states. The double-pending sub-state lives in the
/// orchestrator, not here.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuctionState {
    WaitingForBids,
    WaitingForPrice,
    WaitingForAccept,
    Resolved,
}

/// A player action forwarded into the machine. `Pass` doubles as the
/// fixed-price decline.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AuctionAction {
    Bid(Money),
    Pass,
    SetPrice(Money),
    Accept,
}

/// Terminal resolution. `winner == seller` means the seller acquires the
/// card themselves (no money transfer).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AuctionOutcome {
    pub winner: usize,
    pub price: Money,
    pub seller: usize,
}

/// State and bidding records for one active auction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Auction {
    protocol: AuctionType,
    seller: usize,
    card: Card,
    double_card: Option<Card>,
    num_players: usize,
    state: AuctionState,
    current_bid: Money,
    current_bidder: Option<usize>,
    fixed_price: Money,
    /// Per-player recorded bids. For sealed auctions this is the full record;
    /// for live formats it only informs views.
    bids: BTreeMap<usize, Money>,
    /// Players no longer eligible to act. For once-around this includes
    /// players who already bid (one chance each).
    passed: BTreeSet<usize>,
    /// Whose turn it is, for the strictly ordered formats.
    cursor: Option<usize>,
}

impl Auction {
    /// Create an auction for an effective protocol.
    ///
    /// # Panics
    ///
    /// Debug-panics if `protocol` is `Double`; the orchestrator substitutes
    /// the second card's type (or `Open`) before construction.
    #[must_use]
    pub fn new(
        protocol: AuctionType,
        seller: usize,
        card: Card,
        double_card: Option<Card>,
        num_players: usize,
    ) -> Self {
        debug_assert_ne!(protocol, AuctionType::Double);
        let mut auction = Self {
            protocol,
            seller,
            card,
            double_card,
            num_players,
            state: AuctionState::WaitingForBids,
            current_bid: 0,
            current_bidder: None,
            fixed_price: 0,
            bids: BTreeMap::new(),
            passed: BTreeSet::new(),
            cursor: None,
        };
        match protocol {
            AuctionType::FixedPrice => auction.state = AuctionState::WaitingForPrice,
            AuctionType::OnceAround => auction.cursor = auction.next_eligible(seller),
            _ => {}
        }
        auction
    }

    #[must_use]
    pub fn protocol(&self) -> AuctionType {
        self.protocol
    }

    #[must_use]
    pub fn seller(&self) -> usize {
        self.seller
    }

    #[must_use]
    pub fn card(&self) -> Card {
        self.card
    }

    #[must_use]
    pub fn double_card(&self) -> Option<Card> {
        self.double_card
    }

    #[must_use]
    pub fn is_double(&self) -> bool {
        self.double_card.is_some()
    }

    #[must_use]
    pub fn state(&self) -> AuctionState {
        self.state
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.state == AuctionState::Resolved
    }

    #[must_use]
    pub fn current_bid(&self) -> Money {
        self.current_bid
    }

    #[must_use]
    pub fn current_bidder(&self) -> Option<usize> {
        self.current_bidder
    }

    #[must_use]
    pub fn fixed_price(&self) -> Money {
        self.fixed_price
    }

    #[must_use]
    pub fn has_bid(&self, player: usize) -> bool {
        self.bids.contains_key(&player)
    }

    /// Whether `player` may act right now.
    #[must_use]
    pub fn can_act(&self, player: usize) -> bool {
        if self.state == AuctionState::Resolved {
            return false;
        }
        match self.protocol {
            AuctionType::Open => player != self.seller && !self.passed.contains(&player),
            AuctionType::Sealed => player != self.seller && !self.bids.contains_key(&player),
            AuctionType::OnceAround => self.cursor == Some(player),
            AuctionType::FixedPrice => {
                if self.state == AuctionState::WaitingForPrice {
                    player == self.seller
                } else {
                    self.cursor == Some(player)
                }
            }
            AuctionType::Double => false,
        }
    }

    /// Main entry point: dispatch by protocol and action kind. Returns a
    /// resolution once the protocol's terminal condition is met, `None`
    /// while more input is needed.
    pub fn process_action(
        &mut self,
        actor: usize,
        action: AuctionAction,
    ) -> Result<Option<AuctionOutcome>, ActionError> {
        match (self.protocol, action) {
            (AuctionType::Open, AuctionAction::Bid(amount)) => {
                self.open_bid(actor, amount)?;
                Ok(self.check_open_resolved())
            }
            (AuctionType::Open, AuctionAction::Pass) => {
                self.open_pass(actor)?;
                Ok(self.check_open_resolved())
            }
            (AuctionType::OnceAround, AuctionAction::Bid(amount)) => {
                self.once_around_bid(actor, amount)?;
                Ok(self.check_once_around_resolved())
            }
            (AuctionType::OnceAround, AuctionAction::Pass) => {
                self.once_around_pass(actor)?;
                Ok(self.check_once_around_resolved())
            }
            (AuctionType::Sealed, AuctionAction::Bid(amount)) => {
                self.sealed_bid(actor, amount)?;
                Ok(self.check_sealed_resolved())
            }
            (AuctionType::Sealed, AuctionAction::Pass) => {
                // A sealed pass is recorded as a bid of zero.
                self.sealed_bid(actor, 0)?;
                Ok(self.check_sealed_resolved())
            }
            (AuctionType::FixedPrice, AuctionAction::SetPrice(price)) => {
                self.set_fixed_price(actor, price)?;
                Ok(self.check_fixed_price_resolved())
            }
            (AuctionType::FixedPrice, AuctionAction::Accept) => self.fixed_price_accept(actor),
            (AuctionType::FixedPrice, AuctionAction::Pass) => {
                self.fixed_price_decline(actor)?;
                Ok(self.check_fixed_price_resolved())
            }
            _ => Err(ActionError::WrongAuctionType),
        }
    }

    /// Next player clockwise from `from` who is still eligible.
    fn next_eligible(&self, from: usize) -> Option<usize> {
        (1..self.num_players)
            .map(|step| (from + step) % self.num_players)
            .find(|idx| !self.passed.contains(idx))
    }

    fn validate_amount(amount: Money) -> Result<(), ActionError> {
        if amount % BID_INCREMENT != 0 {
            return Err(ActionError::NotAMultiple);
        }
        Ok(())
    }

    // --- Open ---

    fn open_bid(&mut self, actor: usize, amount: Money) -> Result<(), ActionError> {
        if actor == self.seller {
            return Err(ActionError::SellerCannotBid);
        }
        if self.passed.contains(&actor) {
            return Err(ActionError::AlreadyPassed);
        }
        Self::validate_amount(amount)?;
        if amount <= self.current_bid {
            return Err(ActionError::BidTooLow {
                current: self.current_bid,
            });
        }
        self.current_bid = amount;
        self.current_bidder = Some(actor);
        self.bids.insert(actor, amount);
        Ok(())
    }

    fn open_pass(&mut self, actor: usize) -> Result<(), ActionError> {
        if actor == self.seller {
            return Err(ActionError::SellerCannotBid);
        }
        if self.passed.contains(&actor) {
            return Err(ActionError::AlreadyPassed);
        }
        self.passed.insert(actor);
        Ok(())
    }

    fn check_open_resolved(&mut self) -> Option<AuctionOutcome> {
        let active: Vec<usize> = (0..self.num_players)
            .filter(|&idx| idx != self.seller && !self.passed.contains(&idx))
            .collect();
        let only_bidder_left = active.len() == 1
            && Some(active[0]) == self.current_bidder
            && self.current_bid > 0;
        if active.is_empty() || only_bidder_left {
            return Some(self.resolve_to_bidder());
        }
        None
    }

    // --- Once around ---

    fn once_around_bid(&mut self, actor: usize, amount: Money) -> Result<(), ActionError> {
        if self.cursor != Some(actor) {
            return Err(ActionError::NotYourTurn);
        }
        Self::validate_amount(amount)?;
        if amount <= self.current_bid {
            return Err(ActionError::BidTooLow {
                current: self.current_bid,
            });
        }
        self.current_bid = amount;
        self.current_bidder = Some(actor);
        self.bids.insert(actor, amount);
        // One chance each: a bidder immediately exits the turn order.
        self.passed.insert(actor);
        self.cursor = self.next_eligible(actor);
        Ok(())
    }

    fn once_around_pass(&mut self, actor: usize) -> Result<(), ActionError> {
        if self.cursor != Some(actor) {
            return Err(ActionError::NotYourTurn);
        }
        self.passed.insert(actor);
        self.cursor = self.next_eligible(actor);
        Ok(())
    }

    fn check_once_around_resolved(&mut self) -> Option<AuctionOutcome> {
        if self.cursor.is_none() || self.cursor == Some(self.seller) {
            return Some(self.resolve_to_bidder());
        }
        None
    }

    // --- Sealed ---

    fn sealed_bid(&mut self, actor: usize, amount: Money) -> Result<(), ActionError> {
        if actor == self.seller {
            return Err(ActionError::SellerCannotBid);
        }
        if self.bids.contains_key(&actor) {
            return Err(ActionError::AlreadyBid);
        }
        Self::validate_amount(amount)?;
        self.bids.insert(actor, amount);
        Ok(())
    }

    fn check_sealed_resolved(&mut self) -> Option<AuctionOutcome> {
        if self.bids.len() < self.num_players - 1 {
            return None;
        }
        self.state = AuctionState::Resolved;
        // Highest bid wins; the BTreeMap iterates in index order, so a
        // strict comparison breaks ties in favor of the lowest index.
        let mut winner = None;
        let mut best = 0;
        for (&player, &amount) in &self.bids {
            if amount > best {
                best = amount;
                winner = Some(player);
            }
        }
        Some(match winner {
            Some(player) => AuctionOutcome {
                winner: player,
                price: best,
                seller: self.seller,
            },
            None => AuctionOutcome {
                winner: self.seller,
                price: 0,
                seller: self.seller,
            },
        })
    }

    // --- Fixed price ---

    fn set_fixed_price(&mut self, actor: usize, price: Money) -> Result<(), ActionError> {
        if self.state != AuctionState::WaitingForPrice {
            return Err(ActionError::NotWaitingForPrice);
        }
        if actor != self.seller {
            return Err(ActionError::NotYourTurn);
        }
        if price == 0 {
            return Err(ActionError::PriceNotPositive);
        }
        Self::validate_amount(price)?;
        self.fixed_price = price;
        self.current_bid = price;
        self.state = AuctionState::WaitingForAccept;
        self.cursor = self.next_eligible(self.seller);
        Ok(())
    }

    fn fixed_price_accept(
        &mut self,
        actor: usize,
    ) -> Result<Option<AuctionOutcome>, ActionError> {
        if self.state != AuctionState::WaitingForAccept {
            return Err(ActionError::InvalidAction);
        }
        if self.cursor != Some(actor) {
            return Err(ActionError::NotYourTurn);
        }
        self.state = AuctionState::Resolved;
        Ok(Some(AuctionOutcome {
            winner: actor,
            price: self.fixed_price,
            seller: self.seller,
        }))
    }

    fn fixed_price_decline(&mut self, actor: usize) -> Result<(), ActionError> {
        if self.state != AuctionState::WaitingForAccept {
            return Err(ActionError::InvalidAction);
        }
        if self.cursor != Some(actor) {
            return Err(ActionError::NotYourTurn);
        }
        self.passed.insert(actor);
        self.cursor = self.next_eligible(actor);
        Ok(())
    }

    fn check_fixed_price_resolved(&mut self) -> Option<AuctionOutcome> {
        if self.state != AuctionState::WaitingForAccept {
            return None;
        }
        if self.cursor.is_none() || self.cursor == Some(self.seller) {
            // The offer went all the way around: seller buys at their own
            // asking price.
            self.state = AuctionState::Resolved;
            return Some(AuctionOutcome {
                winner: self.seller,
                price: self.fixed_price,
                seller: self.seller,
            });
        }
        None
    }

    /// Resolve to the current high bidder, or to the seller at price 0 if
    /// nobody ever bid.
    fn resolve_to_bidder(&mut self) -> AuctionOutcome {
        self.state = AuctionState::Resolved;
        match self.current_bidder {
            Some(bidder) => AuctionOutcome {
                winner: bidder,
                price: self.current_bid,
                seller: self.seller,
            },
            None => AuctionOutcome {
                winner: self.seller,
                price: 0,
                seller: self.seller,
            },
        }
    }
}
