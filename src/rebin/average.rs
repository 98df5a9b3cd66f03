// rebin/average.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RebinError;

/// How the samples of one bin are reduced to a single value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum AverageMode {
    /// Arithmetic mean, `sum(x_i) / N`. Used for `q` and intensities.
    #[default]
    Simple,
    /// Quadrature mean, `sqrt(sum(x_i^2)) / N`. This is the propagated uncertainty of an
    /// unweighted mean of independent Gaussian errors, so it is used for `dI`.
    Square,
}

impl AverageMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AverageMode::Simple => "simple",
            AverageMode::Square => "square",
        }
    }
}

impl fmt::Display for AverageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AverageMode {
    type Err = RebinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(AverageMode::Simple),
            "square" => Ok(AverageMode::Square),
            other => Err(RebinError::InvalidMode(other.to_string())),
        }
    }
}

/// Running reduction of the samples in the currently open bin.
///
/// The accumulator is a plain value: `add` consumes it and returns the updated state, so the
/// rebinning loop threads it through each step rather than mutating shared state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Accumulator {
    /// Sum of samples (simple) or of squared samples (square).
    sum: f64,
    count: usize,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one sample to the bin.
    #[must_use]
    pub fn add(self, mode: AverageMode, x: f64) -> Self {
        let sum = match mode {
            AverageMode::Simple => self.sum + x,
            AverageMode::Square => self.sum + x * x,
        };
        Self {
            sum,
            count: self.count + 1,
        }
    }

    /// The bin's representative value, or `None` if no sample was added.
    pub fn finalize(self, mode: AverageMode) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        let n = self.count as f64;
        Some(match mode {
            AverageMode::Simple => self.sum / n,
            AverageMode::Square => self.sum.sqrt() / n,
        })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
