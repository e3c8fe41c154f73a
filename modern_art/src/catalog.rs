//! The fixed card catalog: artists, auction types, deck composition, deal
//! schedule, and value tables.
//!
//! Everything in here is static data consumed by the orchestrator. The deck
//! is built once per game and only ever shrinks.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Monetary amount. The currency unit is 1; every amount that crosses the
/// wire must be a multiple of [`BID_INCREMENT`].
pub type Money = u32;

pub const STARTING_MONEY: Money = 100_000;
pub const BID_INCREMENT: Money = 1_000;
pub const MAX_ROUNDS: u8 = 4;
/// A round ends the instant any artist's board count reaches this.
pub const ROUND_END_CARD_COUNT: u8 = 5;
pub const MIN_PLAYERS: usize = 3;
pub const MAX_PLAYERS: usize = 5;

/// The five artists. Declaration order is the fixed priority order used to
/// break scoring ties.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Artist {
    #[serde(rename = "Orange Tarou")]
    OrangeTarou,
    #[serde(rename = "Green Tarou")]
    GreenTarou,
    #[serde(rename = "Blue Tarou")]
    BlueTarou,
    #[serde(rename = "Yellow Tarou")]
    YellowTarou,
    #[serde(rename = "Red Tarou")]
    RedTarou,
}

impl Artist {
    pub const COUNT: usize = 5;

    pub const ALL: [Self; Self::COUNT] = [
        Self::OrangeTarou,
        Self::GreenTarou,
        Self::BlueTarou,
        Self::YellowTarou,
        Self::RedTarou,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::OrangeTarou => "Orange Tarou",
            Self::GreenTarou => "Green Tarou",
            Self::BlueTarou => "Blue Tarou",
            Self::YellowTarou => "Yellow Tarou",
            Self::RedTarou => "Red Tarou",
        }
    }
}

impl fmt::Display for Artist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The five auction protocols a card can be printed with.
///
/// `Double` is a modifier rather than a protocol of its own: the second
/// card's printed type becomes the effective protocol for the resolution.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuctionType {
    Open,
    OnceAround,
    Sealed,
    FixedPrice,
    Double,
}

impl AuctionType {
    pub const ALL: [Self; 5] = [
        Self::Open,
        Self::OnceAround,
        Self::Sealed,
        Self::FixedPrice,
        Self::Double,
    ];
}

impl fmt::Display for AuctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Open => "open",
            Self::OnceAround => "once_around",
            Self::Sealed => "sealed",
            Self::FixedPrice => "fixed_price",
            Self::Double => "double",
        };
        write!(f, "{repr}")
    }
}

/// An immutable painting card. Created once at deck build and owned by
/// exactly one container (deck, hand, paintings pile, or active auction)
/// at any time.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Card {
    #[serde(rename = "card_id")]
    pub id: u8,
    pub artist: Artist,
    pub auction_type: AuctionType,
}

/// Per-artist count of each auction type, in [`AuctionType::ALL`] order.
/// Rows sum to 12/13/14/15/16 for a 70-card deck.
const fn auction_distribution(artist: Artist) -> [u8; 5] {
    match artist {
        Artist::OrangeTarou => [3, 2, 2, 2, 3],
        Artist::GreenTarou => [3, 3, 2, 2, 3],
        Artist::BlueTarou => [3, 3, 3, 2, 3],
        Artist::YellowTarou => [3, 3, 3, 3, 3],
        Artist::RedTarou => [3, 3, 3, 3, 4],
    }
}

/// Cards dealt per player for a given player count and round, or `None` if
/// either is out of range.
#[must_use]
pub fn deal_count(num_players: usize, round: u8) -> Option<usize> {
    if round < 1 || round > MAX_ROUNDS {
        return None;
    }
    let schedule: [usize; MAX_ROUNDS as usize] = match num_players {
        3 => [10, 6, 6, 6],
        4 => [9, 4, 4, 4],
        5 => [8, 3, 3, 3],
        _ => return None,
    };
    Some(schedule[round as usize - 1])
}

/// Value awarded to an artist finishing the round at `rank` (1-based).
#[must_use]
pub const fn round_value(rank: usize) -> Money {
    match rank {
        1 => 30_000,
        2 => 20_000,
        3 => 10_000,
        _ => 0,
    }
}

/// The draw pile. Instantiated once per game and shuffled once; cards are
/// only removed, never returned.
#[derive(Clone, Debug, Default)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Build the full 70-card deck in catalog order.
    #[must_use]
    pub fn build() -> Self {
        let mut cards = Vec::with_capacity(70);
        let mut id = 0;
        for artist in Artist::ALL {
            let distribution = auction_distribution(artist);
            for (type_idx, count) in distribution.into_iter().enumerate() {
                let auction_type = AuctionType::ALL[type_idx];
                for _ in 0..count {
                    cards.push(Card {
                        id,
                        artist,
                        auction_type,
                    });
                    id += 1;
                }
            }
        }
        Self { cards }
    }

    pub fn shuffle(&mut self, rng: &mut impl Rng) {
        self.cards.shuffle(rng);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Deal one round's hands, round-robin from the top of the deck.
    ///
    /// If the deck runs dry mid-deal, later players simply receive fewer
    /// cards; the deal never fails.
    pub fn deal(&mut self, num_players: usize, round: u8) -> Vec<Vec<Card>> {
        let count = deal_count(num_players, round).unwrap_or(0);
        let mut hands = vec![Vec::with_capacity(count); num_players];
        let mut top = self.cards.drain(..).collect::<std::collections::VecDeque<_>>();
        for _ in 0..count {
            for hand in hands.iter_mut() {
                if let Some(card) = top.pop_front() {
                    hand.push(card);
                }
            }
        }
        self.cards = top.into_iter().collect();
        hands
    }
}
