use crate::config::ModifierConfig;
use crate::item::TaggedItem;
use crate::modifiers::{ProbabilityModifier, SharedModifier};
use crate::pool::ItemPool;
use std::collections::BTreeMap;
use std::hash::Hash;

/// Fluent construction of a pool together with the config to sample it with.
///
/// Named modifiers are created once and shared by every tag that binds them.
pub struct PoolBuilder<T> {
    pool: ItemPool<T>,
    config: ModifierConfig,
    named: BTreeMap<String, SharedModifier>,
}

impl<T: Eq + Hash + Clone> PoolBuilder<T> {
    pub fn new() -> Self {
        Self {
            pool: ItemPool::new(),
            config: ModifierConfig::new(),
            named: BTreeMap::new(),
        }
    }

    pub fn with_item(mut self, content: T, base_probability: f64) -> Self {
        self.pool.add_item_with_probability(content, base_probability);
        self
    }

    pub fn with_tagged_item(mut self, content: T, base_probability: f64, tags: &[&str]) -> Self {
        self.pool
            .insert(TaggedItem::new(content, base_probability).with_tags(tags.iter().copied()));
        self
    }

    /// Define a named modifier. Redefining a name replaces the handle for
    /// later bindings only.
    pub fn with_modifier(mut self, name: &str, modifier: ProbabilityModifier) -> Self {
        self.named
            .insert(name.to_string(), SharedModifier::new(modifier));
        self
    }

    /// Bind a previously defined modifier to `tag`. Unknown names are logged
    /// and skipped.
    pub fn bind(mut self, tag: &str, name: &str) -> Self {
        match self.named.get(name) {
            Some(modifier) => self.config.add_modifier(tag, modifier),
            None => log::warn!("No modifier named '{}' to bind to '{}'", name, tag),
        }
        self
    }

    pub fn modifier(&self, name: &str) -> Option<&SharedModifier> {
        self.named.get(name)
    }

    pub fn build(self) -> (ItemPool<T>, ModifierConfig) {
        (self.pool, self.config)
    }
}

impl<T: Eq + Hash + Clone> Default for PoolBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
