// bin/commands/mod.rs

#[cfg(all(feature = "cli", feature = "dev"))]
pub mod random;
#[cfg(feature = "cli")]
pub mod rebin;
#[cfg(feature = "cli")]
pub mod stats;

use clap::Args;
use sasrebin::error::RebinError;
use sasrebin::io::{Delimiter, ReadOptions};
use sasrebin::{BinPolicy, PolicyKind};

/// Bin policy options shared by the subcommands.
#[derive(Args, Debug, Clone)]
pub struct PolicyArgs {
    /// Bin policy: fixed-width linear bins or logarithmically growing bins
    #[arg(short, long, value_enum, default_value_t = PolicyKind::Logarithmic)]
    pub policy: PolicyKind,

    /// Bin width (lin) or bin growth factor (log)
    #[arg(short = 'b', long = "bin-param", value_name = "B")]
    pub bin_param: f64,
}

impl PolicyArgs {
    pub fn to_policy(&self) -> Result<BinPolicy, RebinError> {
        BinPolicy::new(self.policy, self.bin_param)
    }
}

/// Input parsing options shared by the subcommands.
#[derive(Args, Debug, Clone)]
pub struct ReadArgs {
    /// Column delimiter. Columns are split on whitespace if not given
    #[arg(short, long)]
    pub delimiter: Option<char>,

    /// Comment character to skip lines starting with this
    #[arg(long, default_value = "#")]
    pub comment: char,

    /// Skip the first non-comment line (a column header)
    #[arg(long)]
    pub skip_header: bool,
}

impl ReadArgs {
    pub fn to_options(&self) -> Result<ReadOptions, RebinError> {
        let delimiter = match self.delimiter {
            None => Delimiter::Whitespace,
            Some(c) => Delimiter::Byte(ascii_byte(c, "delimiter")?),
        };
        Ok(ReadOptions {
            delimiter,
            comment: Some(ascii_byte(self.comment, "comment")?),
            skip_header: self.skip_header,
        })
    }
}

fn ascii_byte(c: char, what: &str) -> Result<u8, RebinError> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(format!("The {} character must be ASCII, got '{}'.", what, c).into())
    }
}
