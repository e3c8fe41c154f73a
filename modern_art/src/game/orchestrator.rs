//! Turn and round orchestration for one game.
//!
//! `Game` owns all state for a single table. Exactly one task drives it at
//! a time (the room actor), so every entry point takes `&mut self` and runs
//! to completion before the next action is processed.
//!
//! Bot driving is a flat loop rather than recursion: `handle_*` entry
//! points validate and apply one action, then call [`Game::pump`], which
//! keeps applying bot decisions until a human must act or the game ends.
//! The `apply_*` internals never pump, so the call depth stays constant no
//! matter how many bot actions chain together.

use super::auction::{Auction, AuctionAction, AuctionOutcome};
use super::entities::{Board, GameConfig, Market, Player, PlayerPublic};
use super::ActionError;
use crate::bot::{AuctionContext, BotController};
use crate::catalog::{Artist, AuctionType, Card, Deck, MAX_ROUNDS, Money};
use crate::net::messages::{GameAction, ServerMessage};
use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeMap;
use tokio::time::sleep;

/// Coarse game lifecycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Setup,
    RoundActive,
    GameOver,
}

/// A double card played without a partner named yet; the seller owes a
/// response before anything else may happen.
#[derive(Clone, Copy, Debug)]
struct PendingDouble {
    card: Card,
    player: usize,
}

/// Full state of one running game.
pub struct Game {
    players: Vec<Player>,
    deck: Deck,
    round: u8,
    current_turn: usize,
    board: Board,
    market: Market,
    auction: Option<Auction>,
    pending_double: Option<PendingDouble>,
    /// Running total the bank has paid for paintings at round ends. Auction
    /// money only moves between players, so the table always holds exactly
    /// its starting money plus this.
    total_payouts: Money,
    phase: Phase,
    /// Re-entrancy guard for [`Game::pump`].
    driving_bots: bool,
    bots: BotController,
    config: GameConfig,
    rng: StdRng,
}

impl Game {
    #[must_use]
    pub fn new(players: Vec<Player>, config: GameConfig) -> Self {
        let rng = match config.bot_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let bots = BotController::new(
            config.difficulty,
            config.bot_seed,
            config.min_think,
            config.max_think,
            config.decision_timeout,
        );
        Self {
            players,
            deck: Deck::build(),
            round: 0,
            current_turn: 0,
            board: Board::new(),
            market: Market::new(),
            auction: None,
            pending_double: None,
            total_payouts: 0,
            phase: Phase::Setup,
            driving_bots: false,
            bots,
            config,
            rng,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn round(&self) -> u8 {
        self.round
    }

    #[must_use]
    pub fn current_turn(&self) -> usize {
        self.current_turn
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Total money the bank has paid out for paintings so far.
    #[must_use]
    pub fn total_payouts(&self) -> Money {
        self.total_payouts
    }

    /// Shuffle, deal round one, and announce the game. Drives any leading
    /// bot turns before returning.
    pub async fn start(&mut self) {
        if self.phase != Phase::Setup {
            return;
        }
        info!(
            "=== GAME START === players={:?}",
            self.players.iter().map(|p| p.name.as_str()).collect::<Vec<_>>()
        );
        self.deck.shuffle(&mut self.rng);
        self.round = 1;
        self.current_turn = 0;
        self.phase = Phase::RoundActive;

        let num_players = self.players.len();
        let hands = self.deck.deal(num_players, self.round);
        for (player, hand) in self.players.iter_mut().zip(hands) {
            player.hand = hand;
        }

        let players = self.public_players();
        for (i, player) in self.players.iter().enumerate() {
            player.send(ServerMessage::GameStarted {
                hand: player.hand.clone(),
                players: players.clone(),
                your_index: i,
                round: self.round,
                current_turn: self.current_turn,
            });
        }
        self.send_to(
            self.current_turn,
            ServerMessage::YourTurn {
                player_index: self.current_turn,
            },
        );

        self.pump().await;
    }

    /// Route one wire action from a seated player.
    pub async fn dispatch(&mut self, player_index: usize, action: GameAction) {
        if player_index >= self.players.len() {
            return;
        }
        match action {
            GameAction::PlayCard {
                card_index,
                double_card_index,
            } => {
                self.handle_play_card(player_index, card_index, double_card_index)
                    .await;
            }
            GameAction::Bid { amount } => self.handle_bid(player_index, amount).await,
            GameAction::Pass => self.handle_pass(player_index).await,
            GameAction::Accept => self.handle_accept(player_index).await,
            GameAction::SetPrice { amount } => self.handle_set_price(player_index, amount).await,
            GameAction::DoubleResponse { card_index } => {
                self.handle_double_response(player_index, card_index).await;
            }
        }
    }

    pub async fn handle_play_card(
        &mut self,
        player_index: usize,
        card_index: usize,
        double_card_index: Option<usize>,
    ) {
        if let Err(err) = self
            .apply_play_card(player_index, card_index, double_card_index)
            .await
        {
            self.send_error(player_index, &err);
            return;
        }
        self.pump().await;
    }

    pub async fn handle_double_response(
        &mut self,
        player_index: usize,
        card_index: Option<usize>,
    ) {
        if let Err(err) = self.apply_double_response(player_index, card_index).await {
            self.send_error(player_index, &err);
            return;
        }
        self.pump().await;
    }

    pub async fn handle_bid(&mut self, player_index: usize, amount: Money) {
        if let Err(err) = self.apply_bid(player_index, amount).await {
            self.send_error(player_index, &err);
            return;
        }
        self.pump().await;
    }

    pub async fn handle_pass(&mut self, player_index: usize) {
        if let Err(err) = self.apply_pass(player_index).await {
            self.send_error(player_index, &err);
            return;
        }
        self.pump().await;
    }

    pub async fn handle_accept(&mut self, player_index: usize) {
        if let Err(err) = self.apply_accept(player_index).await {
            self.send_error(player_index, &err);
            return;
        }
        self.pump().await;
    }

    pub async fn handle_set_price(&mut self, player_index: usize, price: Money) {
        if let Err(err) = self.apply_set_price(player_index, price).await {
            self.send_error(player_index, &err);
            return;
        }
        self.pump().await;
    }

    // --- Action internals. These validate, mutate, and broadcast, but
    // never drive bots. ---

    async fn apply_play_card(
        &mut self,
        player_index: usize,
        card_index: usize,
        double_card_index: Option<usize>,
    ) -> Result<(), ActionError> {
        if self.phase != Phase::RoundActive {
            return Err(ActionError::GameNotActive);
        }
        if self.auction.is_some() {
            return Err(ActionError::AuctionInProgress);
        }
        if self.pending_double.is_some() {
            return Err(ActionError::DoublePending);
        }
        if player_index != self.current_turn {
            return Err(ActionError::NotYourTurn);
        }
        let hand = &self.players[player_index].hand;
        if card_index >= hand.len() {
            return Err(ActionError::InvalidCardIndex);
        }
        let card = hand[card_index];

        if card.auction_type == AuctionType::Double {
            if let Some(partner_index) = double_card_index {
                if partner_index >= hand.len() || partner_index == card_index {
                    return Err(ActionError::InvalidCardIndex);
                }
                let partner = hand[partner_index];
                if partner.artist != card.artist {
                    return Err(ActionError::DoubleArtistMismatch);
                }
                self.remove_pair(player_index, card_index, partner_index);
                let effective = effective_type(partner.auction_type);
                self.auction_off(player_index, card, effective, Some(partner))
                    .await;
                return Ok(());
            }

            let has_partner = hand
                .iter()
                .enumerate()
                .any(|(i, c)| i != card_index && c.artist == card.artist);
            if has_partner {
                // Hold the turn open until the seller names a partner or
                // declines.
                self.players[player_index].hand.remove(card_index);
                self.pending_double = Some(PendingDouble {
                    card,
                    player: player_index,
                });
                self.broadcast(ServerMessage::DoubleRequest {
                    player_index,
                    artist: card.artist,
                });
                return Ok(());
            }
            // No partner anywhere in hand: the double runs alone as open.
            self.players[player_index].hand.remove(card_index);
            self.auction_off(player_index, card, AuctionType::Open, None)
                .await;
            return Ok(());
        }

        self.players[player_index].hand.remove(card_index);
        self.auction_off(player_index, card, card.auction_type, None)
            .await;
        Ok(())
    }

    async fn apply_double_response(
        &mut self,
        player_index: usize,
        card_index: Option<usize>,
    ) -> Result<(), ActionError> {
        let Some(pending) = self.pending_double else {
            return Err(ActionError::NoDoublePending);
        };
        if pending.player != player_index {
            return Err(ActionError::NoDoublePending);
        }
        self.pending_double = None;
        let base = pending.card;

        // An out-of-range or wrong-artist partner counts as a decline.
        let hand = &self.players[player_index].hand;
        let partner = card_index
            .and_then(|idx| hand.get(idx).map(|card| (idx, *card)))
            .filter(|(_, card)| card.artist == base.artist);

        match partner {
            Some((idx, partner)) => {
                self.players[player_index].hand.remove(idx);
                let effective = effective_type(partner.auction_type);
                self.auction_off(player_index, base, effective, Some(partner))
                    .await;
            }
            None => {
                self.auction_off(player_index, base, AuctionType::Open, None)
                    .await;
            }
        }
        Ok(())
    }

    async fn apply_bid(&mut self, player_index: usize, amount: Money) -> Result<(), ActionError> {
        let Some(auction) = self.auction.as_mut() else {
            return Err(ActionError::NoActiveAuction);
        };
        if amount > self.players[player_index].money {
            return Err(ActionError::InsufficientFunds);
        }
        info!(
            "[BID] {} bids {} (type={})",
            self.players[player_index].name,
            amount,
            auction.protocol()
        );
        let outcome = auction.process_action(player_index, AuctionAction::Bid(amount))?;
        let sealed = auction.protocol() == AuctionType::Sealed;

        if sealed {
            // Sealed amounts stay private until resolution.
            self.send_to(player_index, ServerMessage::BidConfirmed { amount });
        } else {
            self.broadcast_bid_update(player_index, amount, Some(player_index));
        }

        if let Some(outcome) = outcome {
            self.resolve_auction(outcome).await;
        }
        Ok(())
    }

    async fn apply_pass(&mut self, player_index: usize) -> Result<(), ActionError> {
        let Some(auction) = self.auction.as_mut() else {
            return Err(ActionError::NoActiveAuction);
        };
        info!(
            "[PASS] {} passes (type={})",
            self.players[player_index].name,
            auction.protocol()
        );
        let outcome = auction.process_action(player_index, AuctionAction::Pass)?;
        let sealed = auction.protocol() == AuctionType::Sealed;

        if !sealed {
            self.broadcast_bid_update(player_index, 0, None);
        }

        if let Some(outcome) = outcome {
            self.resolve_auction(outcome).await;
        }
        Ok(())
    }

    async fn apply_accept(&mut self, player_index: usize) -> Result<(), ActionError> {
        let Some(auction) = self.auction.as_mut() else {
            return Err(ActionError::NoActiveAuction);
        };
        if auction.protocol() != AuctionType::FixedPrice {
            return Err(ActionError::WrongAuctionType);
        }
        if auction.fixed_price() > self.players[player_index].money {
            return Err(ActionError::InsufficientFunds);
        }
        info!(
            "[ACCEPT] {} accepts fixed_price={}",
            self.players[player_index].name,
            auction.fixed_price()
        );
        let outcome = auction.process_action(player_index, AuctionAction::Accept)?;
        if let Some(outcome) = outcome {
            self.resolve_auction(outcome).await;
        }
        Ok(())
    }

    async fn apply_set_price(
        &mut self,
        player_index: usize,
        price: Money,
    ) -> Result<(), ActionError> {
        let Some(auction) = self.auction.as_mut() else {
            return Err(ActionError::NoActiveAuction);
        };
        if auction.protocol() != AuctionType::FixedPrice {
            return Err(ActionError::WrongAuctionType);
        }
        info!(
            "[SET_PRICE] {} sets price={}",
            self.players[player_index].name, price
        );
        let outcome = auction.process_action(player_index, AuctionAction::SetPrice(price))?;
        self.broadcast_bid_update(player_index, price, None);

        if let Some(outcome) = outcome {
            self.resolve_auction(outcome).await;
        }
        Ok(())
    }

    /// Put `card` on the board and open its auction. With a double partner
    /// the board is incremented twice and the round-end check runs after
    /// each increment; a round ended this way discards the cards unsold.
    async fn auction_off(
        &mut self,
        seller: usize,
        card: Card,
        effective: AuctionType,
        double_card: Option<Card>,
    ) {
        let is_double = double_card.is_some();
        let increments = 1 + usize::from(is_double);
        let seller_name = self.players[seller].name.clone();

        for _ in 0..increments {
            let count = self.board.increment(card.artist);
            if self.board.ends_round(card.artist) {
                self.broadcast(ServerMessage::CardPlayed {
                    artist: card.artist,
                    board_count: count,
                    player_index: seller,
                    player_name: seller_name.clone(),
                    auction_type: if is_double {
                        AuctionType::Double
                    } else {
                        effective
                    },
                    is_double,
                });
                self.end_round().await;
                return;
            }
        }

        info!(
            "[PLAY] {} plays {} ({}), board[{}]={}",
            seller_name,
            card.artist,
            effective,
            card.artist,
            self.board.count(card.artist)
        );
        self.broadcast(ServerMessage::CardPlayed {
            artist: card.artist,
            board_count: self.board.count(card.artist),
            player_index: seller,
            player_name: seller_name,
            auction_type: effective,
            is_double,
        });
        self.start_auction(seller, card, effective, double_card);
    }

    fn start_auction(
        &mut self,
        seller: usize,
        card: Card,
        effective: AuctionType,
        double_card: Option<Card>,
    ) {
        info!(
            "[AUCTION START] type={} seller={} artist={}{}",
            effective,
            self.players[seller].name,
            card.artist,
            if double_card.is_some() { " (double)" } else { "" }
        );
        let auction = Auction::new(effective, seller, card, double_card, self.players.len());
        for (i, player) in self.players.iter().enumerate() {
            player.send(ServerMessage::AuctionStarted {
                auction_type: effective,
                card,
                seller_index: seller,
                current_bid: 0,
                can_act: auction.can_act(i),
                fixed_price: 0,
                double_card,
            });
        }
        self.auction = Some(auction);
    }

    async fn resolve_auction(&mut self, outcome: AuctionOutcome) {
        let Some(auction) = self.auction.take() else {
            return;
        };
        info!(
            "[AUCTION END] winner={} price={} seller={}",
            self.players[outcome.winner].name, outcome.price, self.players[outcome.seller].name
        );

        // A seller self-purchase moves no money.
        if outcome.winner != outcome.seller {
            self.players[outcome.winner].money -= outcome.price;
            self.players[outcome.seller].money += outcome.price;
        }
        self.players[outcome.winner].paintings.push(auction.card());
        if let Some(partner) = auction.double_card() {
            self.players[outcome.winner].paintings.push(partner);
        }

        self.broadcast(ServerMessage::AuctionResult {
            winner_index: outcome.winner,
            winner_name: self.players[outcome.winner].name.clone(),
            price: outcome.price,
            card: auction.card(),
            players: self.public_players(),
        });

        sleep(self.config.auction_result_pause).await;
        self.advance_turn().await;
    }

    /// Move to the next player holding cards. Ends the round when every
    /// hand is empty.
    async fn advance_turn(&mut self) {
        debug!("[ADVANCE] from {}", self.players[self.current_turn].name);
        if self.players.iter().all(|p| p.hand.is_empty()) {
            self.end_round().await;
            return;
        }

        let num_players = self.players.len();
        for step in 1..=num_players {
            let next = (self.current_turn + step) % num_players;
            if !self.players[next].hand.is_empty() {
                self.current_turn = next;
                break;
            }
        }

        self.broadcast(ServerMessage::TurnChanged {
            player_index: self.current_turn,
        });
        self.send_to(
            self.current_turn,
            ServerMessage::YourTurn {
                player_index: self.current_turn,
            },
        );
    }

    async fn end_round(&mut self) {
        info!(
            "=== ROUND {} END === board={:?}",
            self.round,
            self.board.to_map()
        );
        let values = self.board.round_values();
        for artist in Artist::ALL {
            self.market.award(artist, values[artist.index()]);
        }
        let round_values: BTreeMap<Artist, Money> = Artist::ALL
            .into_iter()
            .map(|artist| (artist, values[artist.index()]))
            .collect();

        // Sell every painting to the bank at its artist's market value.
        let mut earnings = BTreeMap::new();
        for player in &mut self.players {
            let earned: Money = player
                .paintings
                .iter()
                .map(|painting| self.market.value(painting.artist))
                .sum();
            player.money += earned;
            self.total_payouts += earned;
            player.paintings.clear();
            earnings.insert(player.name.clone(), earned);
        }

        self.round += 1;
        if self.round > MAX_ROUNDS {
            self.end_game(round_values, earnings).await;
            return;
        }

        self.board.reset();
        let num_players = self.players.len();
        let hands = self.deck.deal(num_players, self.round);
        for (player, extra) in self.players.iter_mut().zip(hands) {
            player.hand.extend(extra);
        }

        let players = self.public_players();
        for player in &self.players {
            player.send(ServerMessage::RoundEnded {
                round_values: round_values.clone(),
                market: self.market.to_map(),
                players: players.clone(),
                earnings: earnings.clone(),
                next_round: self.round,
                new_hand: Some(player.hand.clone()),
            });
        }

        self.current_turn = 0;
        sleep(self.config.round_end_pause).await;
        self.broadcast(ServerMessage::TurnChanged {
            player_index: self.current_turn,
        });
        self.send_to(
            self.current_turn,
            ServerMessage::YourTurn {
                player_index: self.current_turn,
            },
        );
    }

    async fn end_game(
        &mut self,
        round_values: BTreeMap<Artist, Money>,
        earnings: BTreeMap<String, Money>,
    ) {
        self.phase = Phase::GameOver;
        info!(
            "=== GAME END === scores={:?}",
            self.players
                .iter()
                .map(|p| (p.name.as_str(), p.money))
                .collect::<Vec<_>>()
        );

        // Highest money wins; ties go to the earliest seat.
        let winner_index = self
            .players
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.money.cmp(&b.1.money).then(b.0.cmp(&a.0)))
            .map(|(i, _)| i)
            .unwrap_or(0);

        let players = self.public_players();
        for player in &self.players {
            player.send(ServerMessage::RoundEnded {
                round_values: round_values.clone(),
                market: self.market.to_map(),
                players: players.clone(),
                earnings: earnings.clone(),
                next_round: self.round,
                new_hand: None,
            });
        }

        sleep(self.config.round_end_pause).await;
        self.broadcast(ServerMessage::GameEnded {
            players,
            winner_index,
            winner_name: self.players[winner_index].name.clone(),
        });
    }

    // --- Bot driving ---

    /// Apply bot decisions until a human must act, the phase leaves
    /// `RoundActive`, or nothing is left to drive. Safe to call from any
    /// entry point; re-entrant calls return immediately.
    async fn pump(&mut self) {
        if self.driving_bots {
            return;
        }
        self.driving_bots = true;

        loop {
            if self.phase != Phase::RoundActive {
                break;
            }

            if let Some(pending) = self.pending_double {
                if !self.players[pending.player].is_bot() {
                    break;
                }
                let hand = self.players[pending.player].hand.clone();
                let choice = self.bots.decide_double(&hand, pending.card.artist).await;
                if let Err(err) = self
                    .apply_double_response(pending.player, choice)
                    .await
                {
                    warn!("bot double response rejected ({err}), declining");
                    let _ = self.apply_double_response(pending.player, None).await;
                }
                continue;
            }

            if self.auction.is_some() {
                if self.drive_auction().await {
                    continue;
                }
                break;
            }

            // Turn phase. A player left with no cards is skipped even if
            // the deck ran short at the deal.
            let turn = self.current_turn;
            if self.players[turn].hand.is_empty() {
                self.advance_turn().await;
                continue;
            }
            if !self.players[turn].is_bot() {
                break;
            }

            let hand = self.players[turn].hand.clone();
            let name = self.players[turn].name.clone();
            info!(
                "[BOT TURN] {} (round={}, board={:?})",
                name,
                self.round,
                self.board.to_map()
            );
            let (card_index, double_index) = self
                .bots
                .decide_turn(&name, &hand, &self.board, &self.market)
                .await;
            if let Err(err) = self
                .apply_play_card(turn, card_index, double_index)
                .await
            {
                warn!("bot {name} played an invalid card ({err}), retrying at random");
                let fallback = self.bots.random_index(hand.len());
                if let Err(err) = self.apply_play_card(turn, fallback, None).await {
                    warn!("bot {name} fallback play failed ({err}), stopping bot drive");
                    break;
                }
            }
        }

        self.driving_bots = false;
    }

    /// Run one slice of bot auction activity. Returns whether anything
    /// happened; `false` means a human holds the next move.
    async fn drive_auction(&mut self) -> bool {
        let Some(auction) = &self.auction else {
            return false;
        };
        match auction.protocol() {
            AuctionType::Open => self.drive_open_auction().await,
            AuctionType::Sealed => self.drive_sealed_auction().await,
            _ => self.drive_turn_based_auction().await,
        }
    }

    /// One full pass over the bots in an open auction: each eligible bot
    /// bids or passes once. The bot already holding the high bid sits
    /// still, and the pass stops early once a human becomes the blocker.
    async fn drive_open_auction(&mut self) -> bool {
        let num_players = self.players.len();
        let mut acted = false;
        for i in 0..num_players {
            let Some(auction) = &self.auction else {
                return true;
            };
            if auction.protocol() != AuctionType::Open {
                return true;
            }
            if !self.players[i].is_bot()
                || !auction.can_act(i)
                || auction.current_bidder() == Some(i)
            {
                continue;
            }
            self.drive_one_bot(i).await;
            acted = true;
        }

        if let Some(auction) = &self.auction {
            let human_can_act = self
                .players
                .iter()
                .enumerate()
                .any(|(i, p)| !p.is_bot() && auction.can_act(i));
            if human_can_act {
                return false;
            }
        }
        acted
    }

    /// Collect sealed bids from every bot that has not submitted yet.
    async fn drive_sealed_auction(&mut self) -> bool {
        let num_players = self.players.len();
        let mut acted = false;
        for i in 0..num_players {
            let Some(auction) = &self.auction else {
                return true;
            };
            if !self.players[i].is_bot() || !auction.can_act(i) {
                continue;
            }
            self.drive_one_bot(i).await;
            acted = true;
        }
        acted
    }

    /// Once-around and fixed-price move one actor at a time.
    async fn drive_turn_based_auction(&mut self) -> bool {
        let Some(auction) = &self.auction else {
            return false;
        };
        let actor = (0..self.players.len()).find(|&i| auction.can_act(i));
        match actor {
            Some(i) if self.players[i].is_bot() => {
                self.drive_one_bot(i).await;
                true
            }
            _ => false,
        }
    }

    /// Ask the brain for one auction action and apply it through the same
    /// validation as a human action. A rejected decision falls back to the
    /// safe action so an auction can never wedge on a bot.
    async fn drive_one_bot(&mut self, player_index: usize) {
        let Some(auction) = &self.auction else {
            return;
        };
        let ctx = AuctionContext {
            protocol: auction.protocol(),
            card: auction.card(),
            is_double: auction.is_double(),
            current_bid: auction.current_bid(),
            fixed_price: auction.fixed_price(),
            is_seller: auction.seller() == player_index,
            my_money: self.players[player_index].money,
            board: &self.board,
            market: &self.market,
        };
        let is_price_setter =
            ctx.protocol == AuctionType::FixedPrice && ctx.is_seller && ctx.fixed_price == 0;
        let name = self.players[player_index].name.clone();
        let action = self.bots.decide_auction(&name, ctx).await;

        if let Err(err) = self.apply_bot_action(player_index, action).await {
            warn!("bot {name} auction action rejected ({err}), using fallback");
            let fallback = if is_price_setter {
                AuctionAction::SetPrice(crate::catalog::BID_INCREMENT)
            } else {
                AuctionAction::Pass
            };
            if let Err(err) = self.apply_bot_action(player_index, fallback).await {
                warn!("bot {name} fallback action failed ({err})");
            }
        }
    }

    async fn apply_bot_action(
        &mut self,
        player_index: usize,
        action: AuctionAction,
    ) -> Result<(), ActionError> {
        match action {
            AuctionAction::Bid(amount) => self.apply_bid(player_index, amount).await,
            AuctionAction::Pass => self.apply_pass(player_index).await,
            AuctionAction::SetPrice(price) => self.apply_set_price(player_index, price).await,
            AuctionAction::Accept => self.apply_accept(player_index).await,
        }
    }

    fn remove_pair(&mut self, player_index: usize, first: usize, second: usize) {
        let hand = &mut self.players[player_index].hand;
        hand.remove(first.max(second));
        hand.remove(first.min(second));
    }

    // --- Messaging ---

    fn broadcast(&self, message: ServerMessage) {
        for player in &self.players {
            player.send(message.clone());
        }
    }

    fn send_to(&self, player_index: usize, message: ServerMessage) {
        self.players[player_index].send(message);
    }

    fn send_error(&self, player_index: usize, err: &ActionError) {
        self.send_to(
            player_index,
            ServerMessage::Error {
                message: err.to_string(),
            },
        );
    }

    fn broadcast_bid_update(&self, actor: usize, amount: Money, exclude: Option<usize>) {
        let Some(auction) = &self.auction else {
            return;
        };
        let name = self.players[actor].name.clone();
        for (i, player) in self.players.iter().enumerate() {
            player.send(ServerMessage::BidUpdate {
                player_index: actor,
                player_name: name.clone(),
                amount,
                can_act: auction.can_act(i) && Some(i) != exclude,
            });
        }
    }

    fn public_players(&self) -> Vec<PlayerPublic> {
        self.players.iter().map(Player::public).collect()
    }
}

/// The partner card's printed type runs the resolution; a double partner
/// falls back to open.
fn effective_type(printed: AuctionType) -> AuctionType {
    if printed == AuctionType::Double {
        AuctionType::Open
    } else {
        printed
    }
}
