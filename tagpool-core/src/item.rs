//! Pool members: a content value, its base probability and its tags.

use crate::config::ModifierConfig;
use std::collections::BTreeSet;

/// A content value with a base probability and a set of tags.
///
/// Content and base probability are fixed at construction; tags can change at
/// any time. Pools identify items by content alone.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedItem<T> {
    content: T,
    base_probability: f64,
    tags: BTreeSet<String>,
}

impl<T> TaggedItem<T> {
    pub fn new(content: T, base_probability: f64) -> Self {
        Self {
            content,
            base_probability,
            tags: BTreeSet::new(),
        }
    }

    pub fn content(&self) -> &T {
        &self.content
    }

    pub fn into_content(self) -> T {
        self.content
    }

    pub fn base_probability(&self) -> f64 {
        self.base_probability
    }

    /// Builder-style tagging.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_tags(tags);
        self
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) -> &mut Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn add_tags<I, S>(&mut self, tags: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Returns whether the tag was present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    /// Removes every listed tag. Returns true if at least one was present.
    pub fn remove_tags<I, S>(&mut self, tags: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tags.into_iter()
            .fold(false, |removed, tag| self.tags.remove(tag.as_ref()) || removed)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Tags in lexicographic order.
    pub fn tags(&self) -> impl Iterator<Item = &str> + '_ {
        self.tags.iter().map(String::as_str)
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    pub fn clear_tags(&mut self) {
        self.tags.clear();
    }

    /// Base probability reshaped by every modifier `config` binds to this
    /// item's tags.
    ///
    /// Composition is not commutative, so the order is fixed: tags in
    /// lexicographic order, and within a tag modifiers by ascending id. Each
    /// modifier replaces the running value with its output.
    pub fn effective_probability(&self, config: &ModifierConfig) -> f64 {
        self.tags
            .iter()
            .flat_map(|tag| config.modifiers(tag))
            .fold(self.base_probability, |value, modifier| modifier.apply(value))
    }
}
