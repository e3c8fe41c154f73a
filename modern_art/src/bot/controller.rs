//! Async bot driving: randomized thinking delays, a hard per-decision
//! timeout, and safe fallbacks when the timeout fires.
//!
//! The controller never touches game state. It reads a snapshot, returns a
//! decision, and lets the orchestrator apply it through the same validation
//! path human actions take.

use super::decision::BotDecisionMaker;
use super::models::{Difficulty, NamePool};
use crate::catalog::{Artist, AuctionType, BID_INCREMENT, Card, Money};
use crate::game::{AuctionAction, Board, Market};
use log::warn;
use rand::Rng;
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// Everything a bot sees when acting in an auction.
pub struct AuctionContext<'a> {
    pub protocol: AuctionType,
    pub card: Card,
    pub is_double: bool,
    pub current_bid: Money,
    pub fixed_price: Money,
    pub is_seller: bool,
    pub my_money: Money,
    pub board: &'a Board,
    pub market: &'a Market,
}

/// Drives every bot in one game through a shared brain.
#[derive(Debug)]
pub struct BotController {
    brain: BotDecisionMaker,
    names: NamePool,
    min_think: Duration,
    max_think: Duration,
    decision_timeout: Duration,
}

impl BotController {
    #[must_use]
    pub fn new(
        difficulty: Difficulty,
        seed: Option<u64>,
        min_think: Duration,
        max_think: Duration,
        decision_timeout: Duration,
    ) -> Self {
        let mut brain = BotDecisionMaker::new(difficulty, seed);
        let names = NamePool::new(brain.rng_mut());
        Self {
            brain,
            names,
            min_think,
            max_think,
            decision_timeout,
        }
    }

    /// A display name for the next bot seated.
    pub fn next_name(&mut self) -> String {
        self.names.next_name(self.brain.rng_mut())
    }

    /// Uniform random index into a non-empty collection, for fallbacks.
    pub fn random_index(&mut self, len: usize) -> usize {
        self.brain.rng_mut().random_range(0..len.max(1))
    }

    /// Pick a card (and optional double partner) for a bot's turn.
    ///
    /// On timeout the bot plays a random card without a partner.
    pub async fn decide_turn(
        &mut self,
        name: &str,
        hand: &[Card],
        board: &Board,
        market: &Market,
    ) -> (usize, Option<usize>) {
        debug_assert!(!hand.is_empty());
        let think = self.think_delay();
        let decided = timeout(self.decision_timeout, async {
            sleep(think).await;
            let card_index = self.brain.choose_card(hand, board, market).unwrap_or(0);
            let double_index = if hand[card_index].auction_type == AuctionType::Double {
                self.brain
                    .choose_double_card(hand, hand[card_index].artist, Some(card_index))
            } else {
                None
            };
            (card_index, double_index)
        })
        .await;

        match decided {
            Ok(choice) => choice,
            Err(_) => {
                warn!("bot {name} timed out choosing a card, playing at random");
                let fallback = self.brain.rng_mut().random_range(0..hand.len());
                (fallback, None)
            }
        }
    }

    /// Answer a double request: a same-artist partner index, or `None` to
    /// let the double run alone.
    pub async fn decide_double(&mut self, hand: &[Card], base_artist: Artist) -> Option<usize> {
        let think = self.think_delay();
        timeout(self.decision_timeout, async {
            sleep(think).await;
            self.brain.choose_double_card(hand, base_artist, None)
        })
        .await
        .unwrap_or_else(|_| {
            warn!("bot timed out on a double request, declining");
            None
        })
    }

    /// Decide one auction action for the given snapshot.
    ///
    /// On timeout the fallback is a pass, except for the fixed-price seller
    /// who must name a price and asks the minimum.
    pub async fn decide_auction(&mut self, name: &str, ctx: AuctionContext<'_>) -> AuctionAction {
        let think = self.think_delay();
        let decided = timeout(self.decision_timeout, async {
            sleep(think).await;
            self.decide_auction_now(&ctx)
        })
        .await;

        match decided {
            Ok(action) => action,
            Err(_) => {
                warn!("bot {name} timed out in auction, using fallback");
                if ctx.protocol == AuctionType::FixedPrice && ctx.is_seller {
                    AuctionAction::SetPrice(BID_INCREMENT)
                } else {
                    AuctionAction::Pass
                }
            }
        }
    }

    fn decide_auction_now(&mut self, ctx: &AuctionContext<'_>) -> AuctionAction {
        match ctx.protocol {
            AuctionType::Open => self
                .brain
                .decide_bid_open(
                    ctx.card,
                    ctx.current_bid,
                    ctx.my_money,
                    ctx.board,
                    ctx.market,
                    ctx.is_double,
                )
                .map_or(AuctionAction::Pass, AuctionAction::Bid),
            AuctionType::OnceAround => self
                .brain
                .decide_bid_once_around(
                    ctx.card,
                    ctx.current_bid,
                    ctx.my_money,
                    ctx.board,
                    ctx.market,
                    ctx.is_double,
                )
                .map_or(AuctionAction::Pass, AuctionAction::Bid),
            AuctionType::Sealed => {
                let bid = self.brain.decide_bid_sealed(
                    ctx.card,
                    ctx.my_money,
                    ctx.board,
                    ctx.market,
                    ctx.is_double,
                );
                if bid > 0 {
                    AuctionAction::Bid(bid)
                } else {
                    AuctionAction::Pass
                }
            }
            AuctionType::FixedPrice => {
                if ctx.is_seller {
                    AuctionAction::SetPrice(self.brain.choose_fixed_price(
                        ctx.card,
                        ctx.board,
                        ctx.market,
                        ctx.is_double,
                    ))
                } else if self.brain.decide_fixed_price_accept(
                    ctx.card,
                    ctx.fixed_price,
                    ctx.my_money,
                    ctx.board,
                    ctx.market,
                    ctx.is_double,
                ) {
                    AuctionAction::Accept
                } else {
                    AuctionAction::Pass
                }
            }
            // Auctions never run with the bare double type.
            AuctionType::Double => AuctionAction::Pass,
        }
    }

    fn think_delay(&mut self) -> Duration {
        let min = self.min_think.as_millis() as u64;
        let max = self.max_think.as_millis() as u64;
        if max <= min {
            return self.min_think;
        }
        Duration::from_millis(self.brain.rng_mut().random_range(min..=max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_controller(seed: u64) -> BotController {
        BotController::new(
            Difficulty::Normal,
            Some(seed),
            Duration::ZERO,
            Duration::ZERO,
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn decide_turn_returns_a_legal_index() {
        let mut controller = fast_controller(5);
        let hand = vec![
            Card {
                id: 0,
                artist: Artist::RedTarou,
                auction_type: AuctionType::Open,
            },
            Card {
                id: 1,
                artist: Artist::BlueTarou,
                auction_type: AuctionType::Sealed,
            },
        ];
        let (card_index, double_index) = controller
            .decide_turn("Monet", &hand, &Board::new(), &Market::new())
            .await;
        assert!(card_index < hand.len());
        assert_eq!(double_index, None);
    }

    #[tokio::test]
    async fn double_card_turn_offers_a_matching_partner() {
        let mut controller = fast_controller(8);
        let hand = vec![
            Card {
                id: 0,
                artist: Artist::RedTarou,
                auction_type: AuctionType::Double,
            },
            Card {
                id: 1,
                artist: Artist::RedTarou,
                auction_type: AuctionType::Open,
            },
        ];
        let mut board = Board::new();
        board.increment(Artist::RedTarou);
        board.increment(Artist::RedTarou);
        let mut market = Market::new();
        market.award(Artist::RedTarou, 30_000);
        // The double card dominates on score; with a partner available the
        // controller should pair it.
        let (card_index, double_index) = controller
            .decide_turn("Monet", &hand, &board, &market)
            .await;
        if card_index == 0 {
            assert_eq!(double_index, Some(1));
        }
    }

    #[tokio::test]
    async fn fixed_price_seller_always_names_a_price() {
        let mut controller = fast_controller(13);
        let ctx = AuctionContext {
            protocol: AuctionType::FixedPrice,
            card: Card {
                id: 0,
                artist: Artist::GreenTarou,
                auction_type: AuctionType::FixedPrice,
            },
            is_double: false,
            current_bid: 0,
            fixed_price: 0,
            is_seller: true,
            my_money: 100_000,
            board: &Board::new(),
            market: &Market::new(),
        };
        match controller.decide_auction("Monet", ctx).await {
            AuctionAction::SetPrice(price) => {
                assert!(price >= BID_INCREMENT);
                assert_eq!(price % BID_INCREMENT, 0);
            }
            other => panic!("expected a price, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn sealed_decision_is_a_bid_or_a_pass() {
        let mut controller = fast_controller(21);
        let ctx = AuctionContext {
            protocol: AuctionType::Sealed,
            card: Card {
                id: 0,
                artist: Artist::BlueTarou,
                auction_type: AuctionType::Sealed,
            },
            is_double: false,
            current_bid: 0,
            fixed_price: 0,
            is_seller: false,
            my_money: 100_000,
            board: &Board::new(),
            market: &Market::new(),
        };
        match controller.decide_auction("Monet", ctx).await {
            AuctionAction::Bid(amount) => assert!(amount > 0 && amount % BID_INCREMENT == 0),
            AuctionAction::Pass => {}
            other => panic!("unexpected sealed decision {other:?}"),
        }
    }

    /// Thinks longer than the deadline allows, so every decision times out.
    fn stalled_controller(seed: u64) -> BotController {
        BotController::new(
            Difficulty::Normal,
            Some(seed),
            Duration::from_millis(200),
            Duration::from_millis(200),
            Duration::from_millis(5),
        )
    }

    #[tokio::test]
    async fn turn_timeout_falls_back_to_a_legal_card() {
        let mut controller = stalled_controller(17);
        let hand = vec![
            Card {
                id: 0,
                artist: Artist::RedTarou,
                auction_type: AuctionType::Double,
            },
            Card {
                id: 1,
                artist: Artist::RedTarou,
                auction_type: AuctionType::Open,
            },
        ];
        let (card_index, double_index) = controller
            .decide_turn("Monet", &hand, &Board::new(), &Market::new())
            .await;
        assert!(card_index < hand.len());
        // The fallback never risks an illegal pairing.
        assert_eq!(double_index, None);
    }

    #[tokio::test]
    async fn auction_timeout_falls_back_to_pass_or_minimum_price() {
        let card = Card {
            id: 0,
            artist: Artist::GreenTarou,
            auction_type: AuctionType::Open,
        };
        let board = Board::new();
        let market = Market::new();
        let ctx = |protocol, is_seller| AuctionContext {
            protocol,
            card,
            is_double: false,
            current_bid: 10_000,
            fixed_price: 5_000,
            is_seller,
            my_money: 100_000,
            board: &board,
            market: &market,
        };

        let mut controller = stalled_controller(29);
        assert_eq!(
            controller
                .decide_auction("Monet", ctx(AuctionType::Open, false))
                .await,
            AuctionAction::Pass
        );
        assert_eq!(
            controller
                .decide_auction("Monet", ctx(AuctionType::Sealed, false))
                .await,
            AuctionAction::Pass
        );
        // The fixed-price seller must name a price; the fallback asks the
        // legal minimum.
        assert_eq!(
            controller
                .decide_auction("Monet", ctx(AuctionType::FixedPrice, true))
                .await,
            AuctionAction::SetPrice(BID_INCREMENT)
        );
    }

    #[tokio::test]
    async fn double_request_timeout_declines() {
        let mut controller = stalled_controller(31);
        let hand = vec![Card {
            id: 0,
            artist: Artist::BlueTarou,
            auction_type: AuctionType::Open,
        }];
        assert_eq!(
            controller.decide_double(&hand, Artist::BlueTarou).await,
            None
        );
    }

    #[test]
    fn bot_names_are_unique_within_a_game() {
        let mut controller = fast_controller(3);
        let a = controller.next_name();
        let b = controller.next_name();
        assert_ne!(a, b);
    }
}
