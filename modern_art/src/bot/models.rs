//! Bot difficulty presets and naming.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Difficulty preset selected when a bot is seated.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
        };
        write!(f, "{repr}")
    }
}

/// Tunable behavior parameters behind a difficulty preset.
#[derive(Clone, Copy, Debug)]
pub struct DifficultyParams {
    /// Random jitter applied to card scores and valuations, as a fraction.
    pub variance: f32,

    /// Center of the willingness-to-pay multiplier on estimated value.
    pub aggression_base: f32,

    /// Chance the bot declines to pair a double at all.
    pub decline_double_chance: f64,

    /// Raise steps the bot picks from when nudging an open auction upward.
    pub open_raise_steps: &'static [u32],

    /// Fraction range of estimated value asked as a fixed price.
    pub fixed_price_fraction: (f32, f32),
}

impl DifficultyParams {
    /// Loose and noisy: wide jitter, cautious spending, bargain prices.
    #[must_use]
    pub fn easy() -> Self {
        Self {
            variance: 0.4,
            aggression_base: 0.6,
            decline_double_chance: 0.3,
            open_raise_steps: &[1_000, 2_000, 3_000, 5_000],
            fixed_price_fraction: (0.5, 0.8),
        }
    }

    /// Balanced default.
    #[must_use]
    pub fn normal() -> Self {
        Self {
            variance: 0.2,
            aggression_base: 0.75,
            decline_double_chance: 0.0,
            open_raise_steps: &[1_000, 2_000, 3_000, 5_000],
            fixed_price_fraction: (0.6, 0.9),
        }
    }

    /// Tight valuations, minimal raises to save money, prices close to
    /// value.
    #[must_use]
    pub fn hard() -> Self {
        Self {
            variance: 0.1,
            aggression_base: 0.85,
            decline_double_chance: 0.0,
            open_raise_steps: &[1_000],
            fixed_price_fraction: (0.7, 1.0),
        }
    }

    #[must_use]
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self::easy(),
            Difficulty::Normal => Self::normal(),
            Difficulty::Hard => Self::hard(),
        }
    }

    /// Willingness-to-pay multiplier for one decision, jittered ±0.1
    /// around the preset's base.
    pub fn aggression(&self, rng: &mut impl Rng) -> f32 {
        self.aggression_base + rng.random_range(-0.1..=0.1)
    }
}

/// Painter names handed out to bots in order of seating.
const BOT_NAMES: [&str; 10] = [
    "Monet", "Picasso", "Warhol", "Banksy", "Frida", "Vermeer", "Pollock", "Basquiat", "Hockney",
    "Matisse",
];

/// Shuffled pool of bot display names. Repeats only after the pool is
/// exhausted.
#[derive(Clone, Debug)]
pub struct NamePool {
    remaining: Vec<&'static str>,
}

impl NamePool {
    #[must_use]
    pub fn new(rng: &mut impl Rng) -> Self {
        let mut remaining = BOT_NAMES.to_vec();
        remaining.shuffle(rng);
        Self { remaining }
    }

    pub fn next_name(&mut self, rng: &mut impl Rng) -> String {
        if self.remaining.is_empty() {
            self.remaining = BOT_NAMES.to_vec();
            self.remaining.shuffle(rng);
        }
        self.remaining.pop().unwrap_or("Bot").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn presets_order_by_discipline() {
        let easy = DifficultyParams::easy();
        let normal = DifficultyParams::normal();
        let hard = DifficultyParams::hard();
        assert!(easy.variance > normal.variance);
        assert!(normal.variance > hard.variance);
        assert!(easy.aggression_base < normal.aggression_base);
        assert!(normal.aggression_base < hard.aggression_base);
        assert_eq!(hard.open_raise_steps, &[1_000]);
    }

    #[test]
    fn aggression_stays_near_base() {
        let mut rng = StdRng::seed_from_u64(3);
        let params = DifficultyParams::normal();
        for _ in 0..200 {
            let a = params.aggression(&mut rng);
            assert!((params.aggression_base - 0.1..=params.aggression_base + 0.1).contains(&a));
        }
    }

    #[test]
    fn name_pool_hands_out_unique_names_until_exhausted() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut pool = NamePool::new(&mut rng);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..BOT_NAMES.len() {
            assert!(seen.insert(pool.next_name(&mut rng)));
        }
        // Pool refills rather than running dry.
        assert!(!pool.next_name(&mut rng).is_empty());
    }

    #[test]
    fn difficulty_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Difficulty::Hard).unwrap(), "\"hard\"");
        let d: Difficulty = serde_json::from_str("\"easy\"").unwrap();
        assert_eq!(d, Difficulty::Easy);
    }
}
