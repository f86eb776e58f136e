//! Weighted outcome sampling.
//!
//! Every random decision in the engine goes through a [`RandomSource`] so tests can script the
//! exact draws. Selection over weighted tables is a stable left-to-right scan: the first bucket
//! whose running total exceeds the draw wins, and the last bucket is returned when rounding
//! leaves the draw past every boundary.
//!
//! Ranged outcomes (crash points) interpolate a second uniform draw inside the selected band and
//! round to two decimals, half up.

use rand::{rngs::StdRng, Rng, SeedableRng};
use wagerhall_types::arcade::{
    Card, WeightedRange, WeightedSymbol, HUNDREDTH, RANKS_PER_SUIT, SUITS,
};

/// Source of uniform randomness.
pub trait RandomSource: Send {
    /// Uniform value in `[0, 1)`.
    fn unit(&mut self) -> f64;

    /// Uniform integer in `0..n`. `n` must be positive.
    fn below(&mut self, n: u32) -> u32 {
        let scaled = (self.unit() * n as f64) as u32;
        scaled.min(n.saturating_sub(1))
    }
}

/// Production random source backed by `StdRng`.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: StdRng,
}

impl GameRng {
    /// Deterministic generator, used for replays and tests.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for GameRng {
    fn unit(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    fn below(&mut self, n: u32) -> u32 {
        self.inner.gen_range(0..n.max(1))
    }
}

/// Anything that carries a sampling weight.
pub trait Weighted {
    fn weight(&self) -> f64;
}

impl Weighted for WeightedRange {
    fn weight(&self) -> f64 {
        self.weight
    }
}

impl Weighted for WeightedSymbol {
    fn weight(&self) -> f64 {
        self.weight
    }
}

pub fn total_weight<T: Weighted>(buckets: &[T]) -> f64 {
    buckets.iter().map(Weighted::weight).sum()
}

/// Index of the bucket whose cumulative interval contains `draw` (`0 <= draw < total`).
///
/// Falls back to the last bucket when no interval matches. Returns `None` only for an empty
/// table.
pub fn select_index<T: Weighted>(buckets: &[T], draw: f64) -> Option<usize> {
    let mut running = 0.0;
    for (index, bucket) in buckets.iter().enumerate() {
        running += bucket.weight();
        if draw < running {
            return Some(index);
        }
    }
    buckets.len().checked_sub(1)
}

pub fn select<T: Weighted>(buckets: &[T], draw: f64) -> Option<&T> {
    select_index(buckets, draw).map(|index| &buckets[index])
}

/// Draw a bucket index proportionally to its weight.
pub fn sample_index<T: Weighted>(buckets: &[T], rng: &mut dyn RandomSource) -> Option<usize> {
    let draw = rng.unit() * total_weight(buckets);
    select_index(buckets, draw)
}

/// Interpolate `u` in `[0, 1)` inside `[lower, upper)` and round half up to a whole hundredth.
///
/// The result is in basis points.
pub fn interpolate(range: &WeightedRange, u: f64) -> u64 {
    let value = range.lower + u * (range.upper - range.lower);
    let hundredths = (value * 100.0 + 0.5).floor().max(0.0);
    (hundredths as u64).saturating_mul(HUNDREDTH)
}

/// Draw a crash point (basis points) from the configured bands.
pub fn sample_crash_point(ranges: &[WeightedRange], rng: &mut dyn RandomSource) -> Option<u64> {
    let index = sample_index(ranges, rng)?;
    Some(interpolate(&ranges[index], rng.unit()))
}

/// Draw one reel symbol index.
pub fn sample_symbol(symbols: &[WeightedSymbol], rng: &mut dyn RandomSource) -> Option<usize> {
    sample_index(symbols, rng)
}

/// Draw a card with replacement: rank first, then suit.
pub fn draw_card(rng: &mut dyn RandomSource) -> Card {
    let rank = rng.below(RANKS_PER_SUIT as u32) as u8;
    let suit = rng.below(SUITS as u32) as u8;
    Card::new(rank, suit).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::ScriptedRng;
    use proptest::prelude::*;

    fn bands() -> Vec<WeightedRange> {
        vec![
            WeightedRange::new(1.0, 2.0, 55.0),
            WeightedRange::new(2.0, 3.0, 25.0),
            WeightedRange::new(3.0, 4.0, 10.0),
            WeightedRange::new(4.0, 5.0, 7.0),
            WeightedRange::new(5.0, 15.0, 3.0),
        ]
    }

    #[test]
    fn test_select_boundaries() {
        let table = bands();
        assert_eq!(select_index(&table, 0.0), Some(0));
        assert_eq!(select_index(&table, 54.999), Some(0));
        assert_eq!(select_index(&table, 55.0), Some(1));
        assert_eq!(select_index(&table, 79.999), Some(1));
        assert_eq!(select_index(&table, 99.999), Some(4));
    }

    #[test]
    fn test_select_skips_zero_weight_prefix() {
        let table = vec![
            WeightedRange::new(1.0, 2.0, 0.0),
            WeightedRange::new(2.0, 3.0, 0.0),
            WeightedRange::new(3.0, 4.0, 5.0),
        ];
        assert_eq!(select_index(&table, 0.0), Some(2));
    }

    #[test]
    fn test_select_falls_back_to_last_bucket() {
        let table = bands();
        // A draw at (or past) the total never satisfies `draw < running`.
        assert_eq!(select_index(&table, 100.0), Some(4));
        assert_eq!(select_index(&table, 1e9), Some(4));
        let empty: Vec<WeightedRange> = Vec::new();
        assert_eq!(select_index(&empty, 0.0), None);
    }

    #[test]
    fn test_interpolate_rounds_half_up() {
        let band = WeightedRange::new(1.0, 2.0, 1.0);
        assert_eq!(interpolate(&band, 0.0), 10_000);
        assert_eq!(interpolate(&band, 0.456), 14_600);
        assert_eq!(interpolate(&band, 0.454), 14_500);
        assert_eq!(interpolate(&band, 0.999), 20_000);

        let wide = WeightedRange::new(5.0, 15.0, 1.0);
        assert_eq!(interpolate(&wide, 0.25), 75_000);
    }

    #[test]
    fn test_scripted_crash_point() {
        // 0.6 * 100 = 60 lands in the 2.0..3.0 band; 0.3 interpolates to 2.30.
        let mut rng = ScriptedRng::new([0.6, 0.3]);
        assert_eq!(sample_crash_point(&bands(), &mut rng), Some(23_000));
    }

    #[test]
    fn test_seeded_crash_point_is_reproducible() {
        let table = bands();
        let mut first = GameRng::from_seed(7);
        let mut second = GameRng::from_seed(7);
        for _ in 0..32 {
            let a = sample_crash_point(&table, &mut first).expect("non-empty");
            let b = sample_crash_point(&table, &mut second).expect("non-empty");
            assert_eq!(a, b);
            assert_eq!(a % HUNDREDTH, 0);
            assert!((10_000..=150_000).contains(&a));
        }
    }

    #[test]
    fn test_draw_card_uses_rank_then_suit() {
        // rank index 4 ("5"), suit index 2 (clubs)
        let mut rng = ScriptedRng::new([4.5 / 13.0, 2.5 / 4.0]);
        let card = draw_card(&mut rng);
        assert_eq!(card.rank(), 4);
        assert_eq!(card.suit(), 2);
        assert_eq!(card.to_string(), "5♣");
    }

    #[test]
    fn test_below_never_reaches_bound() {
        let mut rng = ScriptedRng::new([0.999_999_999]);
        assert_eq!(rng.below(13), 12);
    }

    proptest! {
        #[test]
        fn prop_zero_draw_selects_first_positive(
            weights in proptest::collection::vec(0.0f64..10.0, 1..12),
        ) {
            let table: Vec<WeightedRange> = weights
                .iter()
                .enumerate()
                .map(|(i, w)| WeightedRange::new(i as f64, i as f64 + 1.0, *w))
                .collect();
            let first_positive = weights.iter().position(|w| *w > 0.0);
            let selected = select_index(&table, 0.0);
            match first_positive {
                Some(index) => prop_assert_eq!(selected, Some(index)),
                None => prop_assert_eq!(selected, Some(table.len() - 1)),
            }
        }

        #[test]
        fn prop_draw_below_total_selects_last_positive(
            weights in proptest::collection::vec(0.5f64..10.0, 1..12),
        ) {
            let table: Vec<WeightedRange> = weights
                .iter()
                .enumerate()
                .map(|(i, w)| WeightedRange::new(i as f64, i as f64 + 1.0, *w))
                .collect();
            let total = total_weight(&table);
            let draw = total - 1e-9;
            prop_assert_eq!(select_index(&table, draw), Some(table.len() - 1));
        }

        #[test]
        fn prop_interpolation_stays_in_band(u in 0.0f64..1.0) {
            let band = WeightedRange::new(2.0, 3.0, 1.0);
            let bps = interpolate(&band, u);
            prop_assert!((20_000..=30_000).contains(&bps));
            prop_assert_eq!(bps % HUNDREDTH, 0);
        }
    }
}
