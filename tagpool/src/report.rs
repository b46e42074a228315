use std::fmt;
use std::hash::Hash;
use tagpool_core::{ItemPool, ModifierConfig, PoolError, UniformSource};

/// Per-item outcome of a batch of rolls.
#[derive(Debug, Clone, PartialEq)]
pub struct RollRow<T> {
    pub content: T,
    pub count: u64,
    pub observed: f64,
    pub expected: f64,
}

/// Observed vs. expected selection frequencies, in pool order.
#[derive(Debug, Clone, PartialEq)]
pub struct RollReport<T> {
    pub rolls: u64,
    pub rows: Vec<RollRow<T>>,
}

/// Draw `rolls` samples from `pool` and tally them.
pub fn roll<T, S>(
    pool: &ItemPool<T>,
    config: &ModifierConfig,
    source: &mut S,
    rolls: u64,
) -> Result<RollReport<T>, PoolError>
where
    T: Eq + Hash + Clone,
    S: UniformSource + ?Sized,
{
    let weighted = pool.effective_probabilities(config)?;
    let total: f64 = weighted.iter().map(|(_, p)| p).sum();

    let mut counts = vec![0u64; weighted.len()];
    for _ in 0..rolls {
        let item = pool.sample_item(config, source.next_uniform())?;
        // Pool order and `weighted` order agree.
        if let Some(slot) = weighted
            .iter()
            .position(|(candidate, _)| candidate.content() == item.content())
        {
            counts[slot] += 1;
        }
    }

    let rows = weighted
        .iter()
        .zip(counts)
        .map(|(&(item, probability), count)| RollRow {
            content: item.content().clone(),
            count,
            observed: if rolls == 0 {
                0.0
            } else {
                count as f64 / rolls as f64
            },
            expected: if total > 0.0 { probability / total } else { 0.0 },
        })
        .collect();

    Ok(RollReport { rolls, rows })
}

impl<T: fmt::Display> fmt::Display for RollReport<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<24} {:>10} {:>10} {:>10}",
            "item", "count", "observed", "expected"
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<24} {:>10} {:>9.2}% {:>9.2}%",
                row.content.to_string(),
                row.count,
                row.observed * 100.0,
                row.expected * 100.0
            )?;
        }
        write!(f, "{} rolls", self.rolls)
    }
}
