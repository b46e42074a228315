use anyhow::Result;
use clap::Parser;
use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};
use std::path::PathBuf;
use tagpool::{load_table, roll};
use tagpool_core::ModifierConfig;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the loot table (JSON)
    table: PathBuf,

    /// Number of rolls to tally
    #[arg(short, long, default_value_t = 1000)]
    rolls: u64,

    /// Seed for reproducible rolls
    #[arg(long)]
    seed: Option<u64>,

    /// Draw from the operating system's secure random source
    #[arg(long, conflicts_with = "seed")]
    secure: bool,

    /// Sample once with this uniform draw in [0, 1) instead of rolling
    #[arg(long, conflicts_with_all = ["seed", "secure"])]
    draw: Option<f64>,

    /// Ignore the table's bindings and sample base probabilities
    #[arg(long)]
    without_modifiers: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = std::str::FromStr::from_str(&args.log_level).unwrap_or(log::LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();

    let table = load_table(&args.table)?;
    let config = if args.without_modifiers {
        log::info!("Sampling without modifiers");
        ModifierConfig::new()
    } else {
        table.config
    };

    if let Some(draw) = args.draw {
        let sample = table.pool.sample(&config, draw)?;
        println!("{} [{}]", sample.content, sample.tags.join(", "));
        return Ok(());
    }

    let mut source: Box<dyn RngCore> = if args.secure {
        Box::new(OsRng)
    } else if let Some(seed) = args.seed {
        Box::new(StdRng::seed_from_u64(seed))
    } else {
        Box::new(StdRng::from_entropy())
    };

    let report = roll(&table.pool, &config, source.as_mut(), args.rolls)?;
    println!("{}", report);

    Ok(())
}
