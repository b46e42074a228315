//! Command-line front end for tagged item pools: loads a loot table file and
//! rolls it.

pub mod loader;
pub mod report;

pub use loader::{load_table, parse_table, LootTable};
pub use report::{roll, RollReport, RollRow};
