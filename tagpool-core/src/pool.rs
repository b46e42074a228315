//! Deduplicated item pool and weighted sampling.
//!
//! ## Sampling
//!
//! ```text
//! for each item (insertion order):   p_i = effective_probability(item, config)
//!                                    p_i < 0 or NaN  => InvalidProbability
//! total  = Σ p_i                     total == 0      => EmptyOrZeroWeightPool
//! target = draw * total
//! pick first item with  p_0 + ... + p_i > target
//! ```
//!
//! If rounding keeps the running sum at or below `target` all the way through,
//! the last item with positive weight is returned. Sampling never mutates the
//! pool or the config.

use crate::config::ModifierConfig;
use crate::error::PoolError;
use crate::item::TaggedItem;
use crate::random::UniformSource;
use rustc_hash::FxHashMap;
use std::hash::Hash;
use tracing::instrument;

/// Result of a successful draw: the selected content and its tags.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<'a, T> {
    pub content: &'a T,
    pub tags: Vec<String>,
}

/// A set of [`TaggedItem`]s keyed by content equality.
///
/// Iteration (and the cumulative walk of sampling) follows insertion order.
/// Removing an item keeps the relative order of the others.
#[derive(Debug, Clone)]
pub struct ItemPool<T> {
    items: Vec<TaggedItem<T>>,
    index: FxHashMap<T, usize>,
}

impl<T> Default for ItemPool<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: FxHashMap::default(),
        }
    }
}

impl<T: Eq + Hash + Clone> ItemPool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `content` with base probability 1.
    pub fn add_item(&mut self, content: T) -> &mut TaggedItem<T> {
        self.add_item_with_probability(content, 1.0)
    }

    /// Add `content` and return its item for tagging.
    ///
    /// If equal content is already a member the existing item is kept
    /// untouched (including its base probability) and returned.
    pub fn add_item_with_probability(
        &mut self,
        content: T,
        base_probability: f64,
    ) -> &mut TaggedItem<T> {
        let position = match self.index.get(&content).copied() {
            Some(position) => position,
            None => self.push(TaggedItem::new(content, base_probability)),
        };
        &mut self.items[position]
    }

    /// Insert a pre-built item. Returns false (and drops `item`) when equal
    /// content is already a member.
    pub fn insert(&mut self, item: TaggedItem<T>) -> bool {
        if self.index.contains_key(item.content()) {
            return false;
        }
        self.push(item);
        true
    }

    fn push(&mut self, item: TaggedItem<T>) -> usize {
        let position = self.items.len();
        self.index.insert(item.content().clone(), position);
        self.items.push(item);
        position
    }

    pub fn remove(&mut self, content: &T) -> Option<TaggedItem<T>> {
        let position = self.index.remove(content)?;
        for later in self.index.values_mut() {
            if *later > position {
                *later -= 1;
            }
        }
        Some(self.items.remove(position))
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }

    pub fn contains(&self, content: &T) -> bool {
        self.index.contains_key(content)
    }

    pub fn get(&self, content: &T) -> Option<&TaggedItem<T>> {
        self.index.get(content).map(|&position| &self.items[position])
    }

    pub fn get_mut(&mut self, content: &T) -> Option<&mut TaggedItem<T>> {
        let position = *self.index.get(content)?;
        Some(&mut self.items[position])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TaggedItem<T>> {
        self.items.iter()
    }

    pub fn contents(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter().map(TaggedItem::content)
    }

    /// Every item paired with its effective probability under `config`.
    pub fn effective_probabilities<'a>(
        &'a self,
        config: &ModifierConfig,
    ) -> Result<Vec<(&'a TaggedItem<T>, f64)>, PoolError> {
        self.items
            .iter()
            .enumerate()
            .map(|(position, item)| {
                let probability = item.effective_probability(config);
                log::trace!("item {} effective probability {}", position, probability);
                // `!(p >= 0)` also rejects NaN.
                if !(probability >= 0.0) {
                    return Err(PoolError::InvalidProbability {
                        position,
                        probability,
                    });
                }
                Ok((item, probability))
            })
            .collect()
    }

    /// Select an item with a caller-supplied uniform draw in `[0, 1)`.
    #[instrument(skip_all, name = "sample", fields(items = self.items.len()))]
    pub fn sample_item(
        &self,
        config: &ModifierConfig,
        draw: f64,
    ) -> Result<&TaggedItem<T>, PoolError> {
        if !(0.0..1.0).contains(&draw) {
            return Err(PoolError::DrawOutOfRange { draw });
        }

        let weighted = self.effective_probabilities(config)?;

        let mut total = 0.0_f64;
        for (position, &(_, probability)) in weighted.iter().enumerate() {
            total += probability;
            if total.is_infinite() {
                return Err(PoolError::InvalidProbability {
                    position,
                    probability,
                });
            }
        }
        if total <= 0.0 {
            return Err(PoolError::EmptyOrZeroWeightPool {
                items: self.items.len(),
            });
        }

        let target = draw * total;
        let mut cumulative = 0.0_f64;
        for (position, &(item, probability)) in weighted.iter().enumerate() {
            cumulative += probability;
            if target < cumulative {
                log::debug!(
                    "draw {:.6} -> item {} (target {:.6} of {:.6})",
                    draw,
                    position,
                    target,
                    total
                );
                return Ok(item);
            }
        }

        // Positive total, so some item has positive weight.
        let (position, &(item, _)) = weighted
            .iter()
            .enumerate()
            .rev()
            .find(|(_, entry)| entry.1 > 0.0)
            .ok_or(PoolError::EmptyOrZeroWeightPool {
                items: self.items.len(),
            })?;
        log::warn!(
            "Cumulative weight {} never exceeded target {}; falling back to item {}",
            cumulative,
            target,
            position
        );
        Ok(item)
    }

    /// Select an item and report its content and tags.
    pub fn sample(&self, config: &ModifierConfig, draw: f64) -> Result<Sample<'_, T>, PoolError> {
        let item = self.sample_item(config, draw)?;
        Ok(Sample {
            content: item.content(),
            tags: item.tags().map(str::to_string).collect(),
        })
    }

    /// Select an item using a draw from `source`.
    pub fn sample_with<S: UniformSource + ?Sized>(
        &self,
        config: &ModifierConfig,
        source: &mut S,
    ) -> Result<Sample<'_, T>, PoolError> {
        let draw = source.next_uniform();
        self.sample(config, draw)
    }
}

impl<T: Eq + Hash + Clone> Extend<T> for ItemPool<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for content in iter {
            self.add_item(content);
        }
    }
}

impl<T: Eq + Hash + Clone> FromIterator<T> for ItemPool<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut pool = ItemPool::new();
        pool.extend(iter);
        pool
    }
}

impl<'a, T> IntoIterator for &'a ItemPool<T> {
    type Item = &'a TaggedItem<T>;
    type IntoIter = std::slice::Iter<'a, TaggedItem<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifiers::{ProbabilityModifier, SharedModifier};
    use crate::random::FixedDraws;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// A (base 1, "rare") then B (base 3, untagged).
    fn rare_and_common() -> ItemPool<&'static str> {
        let mut pool = ItemPool::new();
        pool.add_item("A").add_tag("rare");
        pool.add_item_with_probability("B", 3.0);
        pool
    }

    #[test]
    fn test_dedup_keeps_first_item() {
        let mut pool = ItemPool::new();
        pool.add_item_with_probability("A", 2.0).add_tag("rare");
        let again = pool.add_item_with_probability("A", 9.0);
        assert_eq!(again.base_probability(), 2.0);
        assert!(again.has_tag("rare"));
        assert_eq!(pool.len(), 1);

        assert!(!pool.insert(TaggedItem::new("A", 5.0)));
        assert!(pool.insert(TaggedItem::new("B", 5.0)));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut pool: ItemPool<u32> = (1..=5).collect();
        let removed = pool.remove(&2).unwrap();
        assert_eq!(*removed.content(), 2);
        assert!(pool.remove(&2).is_none());
        assert_eq!(pool.contents().copied().collect::<Vec<_>>(), vec![1, 3, 4, 5]);

        // Index stays consistent after removal.
        assert_eq!(*pool.get(&5).unwrap().content(), 5);
        pool.get_mut(&4).unwrap().add_tag("x");
        assert!(pool.get(&4).unwrap().has_tag("x"));
        assert!(!pool.contains(&2));
    }

    #[test]
    fn test_clear() {
        let mut pool = rare_and_common();
        pool.clear();
        assert!(pool.is_empty());
        assert!(!pool.contains(&"A"));
        pool.add_item("A");
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_scenario_empty_config() {
        let pool = rare_and_common();
        let config = ModifierConfig::new();

        let probs: Vec<f64> = pool
            .effective_probabilities(&config)
            .unwrap()
            .into_iter()
            .map(|(_, p)| p)
            .collect();
        assert_eq!(probs, vec![1.0, 3.0]);

        assert_eq!(*pool.sample(&config, 0.0).unwrap().content, "A");
        assert_eq!(*pool.sample(&config, 0.2499).unwrap().content, "A");
        assert_eq!(*pool.sample(&config, 0.25).unwrap().content, "B");
        assert_eq!(*pool.sample(&config, 0.99).unwrap().content, "B");
    }

    #[test]
    fn test_scenario_doubled_rare() {
        let pool = rare_and_common();
        let mut config = ModifierConfig::new();
        config.add_modifier("rare", &SharedModifier::new(ProbabilityModifier::scale(2.0)));

        let probs: Vec<f64> = pool
            .effective_probabilities(&config)
            .unwrap()
            .into_iter()
            .map(|(_, p)| p)
            .collect();
        assert_eq!(probs, vec![2.0, 3.0]);

        // A covers [0, 0.4), B covers [0.4, 1).
        assert_eq!(*pool.sample(&config, 0.39).unwrap().content, "A");
        assert_eq!(*pool.sample(&config, 0.4).unwrap().content, "B");
    }

    #[test]
    fn test_sample_reports_tags() {
        let pool = rare_and_common();
        let sample = pool.sample(&ModifierConfig::new(), 0.0).unwrap();
        assert_eq!(sample.tags, vec!["rare".to_string()]);
    }

    #[test]
    fn test_negative_probability_is_rejected() {
        let pool = rare_and_common();
        let mut config = ModifierConfig::new();
        config.add_modifier("rare", &SharedModifier::new(ProbabilityModifier::scale(-1.0)));

        assert_eq!(
            pool.sample(&config, 0.5),
            Err(PoolError::InvalidProbability {
                position: 0,
                probability: -1.0
            })
        );
    }

    #[test]
    fn test_nan_probability_is_rejected() {
        let mut pool = ItemPool::new();
        pool.add_item_with_probability("A", f64::NAN);
        let result = pool.sample_item(&ModifierConfig::new(), 0.5);
        assert!(matches!(
            result,
            Err(PoolError::InvalidProbability { position: 0, .. })
        ));
    }

    #[test]
    fn test_infinite_total_is_rejected() {
        let mut pool = ItemPool::new();
        pool.add_item_with_probability("A", f64::MAX);
        pool.add_item_with_probability("B", f64::MAX);
        let result = pool.sample_item(&ModifierConfig::new(), 0.5);
        assert!(matches!(
            result,
            Err(PoolError::InvalidProbability { position: 1, .. })
        ));
    }

    #[test]
    fn test_zero_probability_is_allowed_but_never_drawn() {
        let mut pool = ItemPool::new();
        pool.add_item_with_probability("zero", 0.0);
        pool.add_item_with_probability("one", 1.0);
        let config = ModifierConfig::new();
        assert_eq!(*pool.sample(&config, 0.0).unwrap().content, "one");
    }

    #[test]
    fn test_empty_pool_fails() {
        let pool: ItemPool<&str> = ItemPool::new();
        assert_eq!(
            pool.sample(&ModifierConfig::new(), 0.5),
            Err(PoolError::EmptyOrZeroWeightPool { items: 0 })
        );
    }

    #[test]
    fn test_zero_weight_pool_fails() {
        let mut pool = ItemPool::new();
        pool.add_item_with_probability("A", 0.0);
        pool.add_item_with_probability("B", 0.0);
        assert_eq!(
            pool.sample(&ModifierConfig::new(), 0.0),
            Err(PoolError::EmptyOrZeroWeightPool { items: 2 })
        );
    }

    #[test]
    fn test_draw_out_of_range() {
        let pool = rare_and_common();
        let config = ModifierConfig::new();
        for draw in [1.0, -0.1, 2.0, f64::NAN] {
            assert!(matches!(
                pool.sample(&config, draw),
                Err(PoolError::DrawOutOfRange { .. })
            ));
        }
    }

    #[test]
    fn test_draw_near_one_skips_zero_weight_tail() {
        let mut pool = ItemPool::new();
        pool.add_item_with_probability("A", 1.0);
        pool.add_item_with_probability("B", 3.0);
        pool.add_item_with_probability("zero", 0.0);

        let item = pool
            .sample_item(&ModifierConfig::new(), 1.0 - f64::EPSILON)
            .unwrap();
        assert_eq!(*item.content(), "B");
    }

    #[test]
    fn test_sample_with_sources() {
        let pool = rare_and_common();
        let config = ModifierConfig::new();

        let mut fixed = FixedDraws::new(vec![0.0, 0.9]);
        assert_eq!(*pool.sample_with(&config, &mut fixed).unwrap().content, "A");
        assert_eq!(*pool.sample_with(&config, &mut fixed).unwrap().content, "B");

        let mut rng = StdRng::seed_from_u64(3);
        assert!(pool.sample_with(&config, &mut rng).is_ok());
    }

    #[test]
    fn test_sampling_is_read_only() {
        let pool = rare_and_common();
        let mut config = ModifierConfig::new();
        let m = SharedModifier::new(ProbabilityModifier::scale(2.0));
        config.add_modifier("rare", &m);

        let _ = pool.sample(&config, 0.5).unwrap();
        assert_eq!(pool.len(), 2);
        assert!(config.contains("rare", &m));
        assert_eq!(m.get(1), 2.0);
    }

    #[test]
    fn test_weight_proportionality() {
        let pool = rare_and_common();
        let config = ModifierConfig::new();
        let mut rng = StdRng::seed_from_u64(0xC0FFEE);

        let draws = 100_000;
        let mut hits_a = 0usize;
        for _ in 0..draws {
            if *pool.sample_with(&config, &mut rng).unwrap().content == "A" {
                hits_a += 1;
            }
        }
        let freq = hits_a as f64 / draws as f64;
        assert!((freq - 0.25).abs() < 0.01, "observed frequency {}", freq);
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_sampling_is_deterministic(
            weights in proptest::collection::vec(0.0..100.0f64, 1..20),
            draw in 0.0..1.0f64
        ) {
            let mut pool = ItemPool::new();
            for (i, w) in weights.iter().enumerate() {
                pool.add_item_with_probability(i, *w);
            }
            let config = ModifierConfig::new();
            let first = pool.sample_item(&config, draw).map(|item| *item.content());
            let second = pool.sample_item(&config, draw).map(|item| *item.content());
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_selected_item_has_positive_weight(
            weights in proptest::collection::vec(0.0..100.0f64, 1..20),
            draw in 0.0..1.0f64
        ) {
            let mut pool = ItemPool::new();
            for (i, w) in weights.iter().enumerate() {
                pool.add_item_with_probability(i, *w);
            }
            match pool.sample_item(&ModifierConfig::new(), draw) {
                Ok(item) => prop_assert!(item.base_probability() > 0.0),
                Err(e) => prop_assert_eq!(e, PoolError::EmptyOrZeroWeightPool { items: weights.len() }),
            }
        }

        #[test]
        fn prop_draw_zero_picks_first_weighted(
            weights in proptest::collection::vec(0.0..100.0f64, 1..20)
        ) {
            let mut pool = ItemPool::new();
            for (i, w) in weights.iter().enumerate() {
                pool.add_item_with_probability(i, *w);
            }
            if let Some(first) = weights.iter().position(|&w| w > 0.0) {
                let item = pool.sample_item(&ModifierConfig::new(), 0.0).unwrap();
                prop_assert_eq!(*item.content(), first);
            }
        }

        #[test]
        fn prop_duplicate_adds_do_not_grow(contents in proptest::collection::vec(0u8..10, 0..50)) {
            let mut pool = ItemPool::new();
            for c in &contents {
                pool.add_item(*c);
            }
            let distinct: std::collections::HashSet<_> = contents.iter().collect();
            prop_assert_eq!(pool.len(), distinct.len());
        }
    }
}
