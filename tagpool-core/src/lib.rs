//! # Tagged Item Pool Core
//!
//! Weighted random selection over a pool of tagged items whose probabilities
//! are reshaped by swappable, tag-scoped modifiers (loot tables, reward rolls,
//! procedural content picks).
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐   tag -> {modifier}   ┌────────────────┐
//! │ ModifierConfig │──────────────────────▶│    ItemPool    │
//! │ (per call)     │                       │ (TaggedItems)  │
//! └────────────────┘                       └───────┬────────┘
//!                                                  │ effective probabilities
//!  ┌───────────────┐   draw in [0, 1)      ┌───────▼────────┐
//!  │ UniformSource │──────────────────────▶│ cumulative walk│──▶ Sample
//!  └───────────────┘                       └────────────────┘
//! ```
//!
//! ## Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`ProbabilityModifier`] | `p -> Σ (p * m_e) ^ e` reshaping function |
//! | [`SharedModifier`] | Aliased, mutable handle registered in configs |
//! | [`TaggedItem`] | Content + base probability + tags |
//! | [`ModifierConfig`] | Tag → modifier bindings, cheap to clone |
//! | [`ItemPool`] | Content-deduplicated items and weighted sampling |
//! | [`UniformSource`] | Anything that yields a float in `[0, 1)` |
//!
//! ## Determinism
//!
//! Modifier application is order-sensitive, so every order is fixed: tags are
//! visited lexicographically, modifiers of one tag by creation order, and the
//! pool in insertion order. A fixed pool, config and draw always select the
//! same item.
//!
//! Everything here is single-threaded: handles are `Rc`-based and nothing is
//! synchronized.

pub mod config;
pub mod error;
pub mod item;
pub mod modifiers;
pub mod pool;
pub mod random;
pub mod testing;

pub use config::ModifierConfig;
pub use error::PoolError;
pub use item::TaggedItem;
pub use modifiers::{ModifierId, ProbabilityModifier, SharedModifier};
pub use pool::{ItemPool, Sample};
pub use random::{FixedDraws, UniformSource};
pub use testing::PoolBuilder;
