//! memoctl - run memoized computations from the command line

mod runner;

use anyhow::Result;
use clap::Parser;
use memocache::{CacheConfig, Policy};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Eviction policy (fifo or lru)
    #[arg(short, long, default_value_t = Policy::Lru)]
    policy: Policy,

    /// Cache capacity (number of results)
    #[arg(short, long, default_value_t = 3)]
    capacity: usize,

    /// Run the built-in FIFO and LRU scenarios instead of INPUTS
    #[arg(long)]
    scenarios: bool,

    /// Inputs to square, in call order
    inputs: Vec<u64>,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    if args.scenarios {
        for (title, policy, inputs) in runner::scenarios() {
            let config = CacheConfig::new(3, policy);
            println!("\n{}", title);
            let report = runner::run(config, &inputs)?;
            runner::print_report(&config, &report);
        }
        return Ok(());
    }

    if args.inputs.is_empty() {
        anyhow::bail!("no inputs given (pass numbers or --scenarios)");
    }

    let config = CacheConfig::new(args.capacity, args.policy);
    info!("Memoizing square with {} cache of {} entries", config.policy, config.capacity);

    let report = runner::run(config, &args.inputs)?;
    runner::print_report(&config, &report);

    Ok(())
}
