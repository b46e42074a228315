//! Tag-scoped modifier registry.
//!
//! A [`ModifierConfig`] binds tags to sets of [`SharedModifier`] handles. It is
//! the runtime configuration of a sampling call: pools do not store configs,
//! callers pass one per draw and may keep several variants around.

use crate::modifiers::SharedModifier;
use im::{OrdMap, OrdSet};

/// Mapping `tag -> {modifier}`.
///
/// Backed by persistent collections: [`Clone`] is O(1) and the clone's tag
/// sets are independent of the original's. Modifier handles are shared, not
/// copied, so editing a modifier's terms is visible through both.
///
/// A tag whose set becomes empty is dropped, so an absent tag and an empty tag
/// cannot be told apart.
#[derive(Debug, Clone, Default)]
pub struct ModifierConfig {
    modifiers: OrdMap<String, OrdSet<SharedModifier>>,
}

impl ModifierConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `modifier` under `tag`. No-op if already registered there.
    pub fn add_modifier(&mut self, tag: &str, modifier: &SharedModifier) {
        let mut set = self.modifiers.get(tag).cloned().unwrap_or_default();
        if set.insert(modifier.clone()).is_none() {
            log::debug!("Bound {} to tag '{}'", modifier.id(), tag);
        }
        self.modifiers.insert(tag.to_string(), set);
    }

    /// Register one modifier under several tags.
    pub fn add_modifier_to_tags<I, S>(&mut self, modifier: &SharedModifier, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            self.add_modifier(tag.as_ref(), modifier);
        }
    }

    /// Unregister `modifier` from `tag`, pruning the tag if nothing is left.
    pub fn remove_modifier(&mut self, tag: &str, modifier: &SharedModifier) {
        let Some(set) = self.modifiers.get(tag) else {
            return;
        };
        if !set.contains(modifier) {
            return;
        }

        let mut set = set.clone();
        set.remove(modifier);
        log::debug!("Unbound {} from tag '{}'", modifier.id(), tag);
        if set.is_empty() {
            self.modifiers.remove(tag);
        } else {
            self.modifiers.insert(tag.to_string(), set);
        }
    }

    pub fn remove_modifier_from_tags<I, S>(&mut self, modifier: &SharedModifier, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            self.remove_modifier(tag.as_ref(), modifier);
        }
    }

    /// Drop every modifier bound to `tag`.
    pub fn remove_all_modifiers_for(&mut self, tag: &str) {
        if self.modifiers.remove(tag).is_some() {
            log::debug!("Cleared tag '{}'", tag);
        }
    }

    /// Drop every binding.
    pub fn remove_all_modifiers(&mut self) {
        self.modifiers.clear();
    }

    /// Modifiers bound to `tag`, in application order (ascending id).
    ///
    /// Empty for an unknown tag.
    pub fn modifiers(&self, tag: &str) -> impl Iterator<Item = &SharedModifier> + '_ {
        self.modifiers.get(tag).into_iter().flat_map(|set| set.iter())
    }

    pub fn contains(&self, tag: &str, modifier: &SharedModifier) -> bool {
        self.modifiers
            .get(tag)
            .is_some_and(|set| set.contains(modifier))
    }

    pub fn modifier_count(&self, tag: &str) -> usize {
        self.modifiers.get(tag).map_or(0, |set| set.len())
    }

    /// Tags with at least one modifier, sorted.
    pub fn tags(&self) -> impl Iterator<Item = &str> + '_ {
        self.modifiers.keys().map(String::as_str)
    }

    /// Number of tags with at least one modifier.
    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }
}
