#[cfg(feature = "cli")]
mod commands;

#[cfg(feature = "cli")]
mod cli {
    #[cfg(feature = "dev")]
    use crate::commands::random;
    use crate::commands::{rebin, stats};
    use clap::Parser;
    use sasrebin::error::RebinError;
    use tracing::Level;

    #[derive(Parser)]
    #[command(author, version, about, long_about = None)]
    pub struct Cli {
        /// Print debug messages
        #[arg(short, long, global = true)]
        verbose: bool,

        #[command(subcommand)]
        command: Commands,
    }

    #[derive(clap::Subcommand)]
    enum Commands {
        /// Rebin one or more q/I/dI data files.
        Rebin(rebin::RebinArgs),
        /// Report how a bin policy would reduce a data file.
        Stats(stats::StatsArgs),
        #[cfg(feature = "dev")]
        /// Generate a synthetic scattering curve (only with dev feature)
        Random(random::RandomArgs),
    }

    pub fn run() -> Result<(), RebinError> {
        let cli = Cli::parse();

        let level = if cli.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        };
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();

        match cli.command {
            Commands::Rebin(args) => rebin::run(args),
            Commands::Stats(args) => stats::run(args),
            #[cfg(feature = "dev")]
            Commands::Random(args) => random::run(args),
        }
    }
}

fn main() {
    #[cfg(feature = "cli")]
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("CLI feature not enabled. Please rebuild with --features cli");
        std::process::exit(1);
    }
}
