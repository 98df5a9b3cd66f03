use crate::commands::{PolicyArgs, ReadArgs};
use clap::Args;
use sasrebin::error::RebinError;
use sasrebin::io::read_measurement;
use sasrebin::stats::RebinStats;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Args)]
pub struct StatsArgs {
    /// Input data file to analyze (q, I, dI columns)
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Print the size of every bin
    #[arg(long)]
    pub show_bins: bool,

    #[command(flatten)]
    pub policy: PolicyArgs,

    #[command(flatten)]
    pub read: ReadArgs,
}

pub fn run(args: StatsArgs) -> Result<(), RebinError> {
    let start = Instant::now();
    let policy = args.policy.to_policy()?;
    let options = args.read.to_options()?;

    eprintln!("Loading data from {}...", args.input.display());
    let measurement = read_measurement(&args.input, &options)?;

    let stats = RebinStats::analyze(&policy, measurement.len());
    stats.print_summary();

    let report = stats.generate_report();
    println!("{}", report);

    if args.show_bins {
        println!("Bin sizes: {:?}", policy.bin_sizes(measurement.len()));
    }

    let duration = start.elapsed();
    eprintln!("Analysis completed in {:?}", duration);

    Ok(())
}
