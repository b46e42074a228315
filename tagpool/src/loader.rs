//! Loot table files.
//!
//! A table is a JSON document describing pool items, named modifiers and
//! which tags each modifier is bound to:
//!
//! ```json
//! {
//!   "items": [{"content": "sword", "probability": 1.0, "tags": ["rare"]}],
//!   "modifiers": {"double": {"1": 2.0}},
//!   "bindings": {"rare": ["double"]}
//! }
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tagpool_core::{ItemPool, ModifierConfig, PoolBuilder, ProbabilityModifier, SharedModifier};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableFile {
    #[serde(default)]
    items: Vec<ItemEntry>,
    #[serde(default)]
    modifiers: BTreeMap<String, ProbabilityModifier>,
    #[serde(default)]
    bindings: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ItemEntry {
    content: String,
    #[serde(default = "default_probability")]
    probability: f64,
    #[serde(default)]
    tags: Vec<String>,
}

fn default_probability() -> f64 {
    1.0
}

/// A loaded table: the pool, the config built from its bindings, and the
/// handles of every bound modifier by name (the same handles the config
/// holds).
pub struct LootTable {
    pub pool: ItemPool<String>,
    pub config: ModifierConfig,
    pub modifiers: BTreeMap<String, SharedModifier>,
}

pub fn load_table(path: &Path) -> Result<LootTable> {
    log::info!("Loading loot table from {:?}", path);
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read table file {}", path.display()))?;
    parse_table(&json).with_context(|| format!("Invalid table file {}", path.display()))
}

pub fn parse_table(json: &str) -> Result<LootTable> {
    let file: TableFile = serde_json::from_str(json).context("Failed to parse table JSON")?;

    let mut builder = PoolBuilder::new();
    for (name, modifier) in file.modifiers {
        builder = builder.with_modifier(&name, modifier);
    }

    for (tag, names) in &file.bindings {
        for name in names {
            if builder.modifier(name).is_none() {
                bail!("Tag '{}' is bound to unknown modifier '{}'", tag, name);
            }
            builder = builder.bind(tag, name);
        }
    }

    let seen = file.items.len();
    for entry in file.items {
        let tags: Vec<&str> = entry.tags.iter().map(String::as_str).collect();
        builder = builder.with_tagged_item(entry.content, entry.probability, &tags);
    }

    let modifiers = builder_modifiers(&builder, &file.bindings);
    let (pool, config) = builder.build();
    if pool.len() < seen {
        log::warn!(
            "{} duplicate item entries ignored (first entry wins)",
            seen - pool.len()
        );
    }
    log::info!(
        "Loaded {} items, {} modifiers, {} bound tags",
        pool.len(),
        modifiers.len(),
        config.len()
    );

    Ok(LootTable {
        pool,
        config,
        modifiers,
    })
}

fn builder_modifiers(
    builder: &PoolBuilder<String>,
    bindings: &BTreeMap<String, Vec<String>>,
) -> BTreeMap<String, SharedModifier> {
    bindings
        .values()
        .flatten()
        .filter_map(|name| builder.modifier(name).map(|m| (name.clone(), m.clone())))
        .collect()
}
