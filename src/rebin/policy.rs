// rebin/policy.rs
//
// # Bin Policies
//
// A bin policy decides how many consecutive samples go into each output bin. The rebinning loop
// keeps a real-valued width threshold and closes the open bin as soon as its sample count reaches
// (`>=`) that threshold; the next sample then opens a new bin.
//
//  Linear:       threshold = b for every bin.
//  Logarithmic:  threshold = 1, b, b^2, b^3, ... growing once per closed bin.
//
// Because the count is an integer and the threshold is real, a bin holds ceil(threshold) samples
// (at least one). With b = 2 the logarithmic sizes are 1, 2, 4, 8, ... and with b = 1.5 they are
// 1, 2, 3, 4, 6, 8, 12, ... The last bin takes whatever samples remain, even if that is fewer than
// its threshold.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::error::RebinError;

/// The kind of bin-size policy, without its parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Fixed number of samples per bin.
    #[cfg_attr(feature = "cli", value(name = "lin", alias = "linear"))]
    Linear,
    /// Bin width starts at 1 and is multiplied by a growth factor after each bin.
    #[cfg_attr(feature = "cli", value(name = "log", alias = "logarithmic"))]
    Logarithmic,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::Linear => write!(f, "lin"),
            PolicyKind::Logarithmic => write!(f, "log"),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = RebinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lin" | "linear" => Ok(PolicyKind::Linear),
            "log" | "logarithmic" => Ok(PolicyKind::Logarithmic),
            other => Err(RebinError::InvalidPolicy(other.to_string())),
        }
    }
}

/// A bin-size policy together with its parameter.
///
/// Deserialized policies are validated like [`BinPolicy::new`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", try_from = "RawBinPolicy")]
pub enum BinPolicy {
    /// Every bin closes once it holds `width` samples.
    Linear { width: f64 },
    /// The first bin holds one sample; each following threshold is the previous one times
    /// `factor`.
    Logarithmic { factor: f64 },
}

/// Unvalidated wire form of [`BinPolicy`].
#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum RawBinPolicy {
    Linear { width: f64 },
    Logarithmic { factor: f64 },
}

impl TryFrom<RawBinPolicy> for BinPolicy {
    type Error = RebinError;

    fn try_from(raw: RawBinPolicy) -> Result<Self, Self::Error> {
        match raw {
            RawBinPolicy::Linear { width } => BinPolicy::linear(width),
            RawBinPolicy::Logarithmic { factor } => BinPolicy::logarithmic(factor),
        }
    }
}

impl BinPolicy {
    /// Build a policy from its kind and parameter `b`, which must be finite and positive.
    pub fn new(kind: PolicyKind, b: f64) -> Result<Self, RebinError> {
        if !b.is_finite() || b <= 0.0 {
            return Err(RebinError::InvalidBinParameter(b));
        }
        Ok(match kind {
            PolicyKind::Linear => BinPolicy::Linear { width: b },
            PolicyKind::Logarithmic => BinPolicy::Logarithmic { factor: b },
        })
    }

    pub fn linear(width: f64) -> Result<Self, RebinError> {
        Self::new(PolicyKind::Linear, width)
    }

    pub fn logarithmic(factor: f64) -> Result<Self, RebinError> {
        Self::new(PolicyKind::Logarithmic, factor)
    }

    /// Build a policy from a kind name (`lin`/`linear`, `log`/`logarithmic`).
    pub fn from_name(kind: &str, b: f64) -> Result<Self, RebinError> {
        Self::new(kind.parse()?, b)
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            BinPolicy::Linear { .. } => PolicyKind::Linear,
            BinPolicy::Logarithmic { .. } => PolicyKind::Logarithmic,
        }
    }

    /// The policy parameter `b`: bin width for linear, growth factor for logarithmic.
    pub fn param(&self) -> f64 {
        match *self {
            BinPolicy::Linear { width } => width,
            BinPolicy::Logarithmic { factor } => factor,
        }
    }

    /// Threshold of the first bin.
    pub fn initial_width(&self) -> f64 {
        match *self {
            BinPolicy::Linear { width } => width,
            BinPolicy::Logarithmic { .. } => 1.0,
        }
    }

    /// Threshold of the bin following one that closed at `current`.
    pub fn next_width(&self, current: f64) -> f64 {
        match *self {
            BinPolicy::Linear { .. } => current,
            BinPolicy::Logarithmic { factor } => current * factor,
        }
    }

    /// Partition `len` samples into bins, yielding the index range of each bin in order.
    pub fn partition(&self, len: usize) -> Partition {
        Partition {
            policy: *self,
            width: self.initial_width(),
            pos: 0,
            len,
        }
    }

    /// Number of samples in each bin for an input of `len` samples.
    pub fn bin_sizes(&self, len: usize) -> Vec<usize> {
        self.partition(len).map(|range| range.len()).collect()
    }
}

impl fmt::Display for BinPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (b = {})", self.kind(), self.param())
    }
}

/// Iterator over the index ranges of consecutive bins.
#[derive(Clone, Debug)]
pub struct Partition {
    policy: BinPolicy,
    /// Threshold of the bin that is currently open.
    width: f64,
    pos: usize,
    len: usize,
}

impl Iterator for Partition {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.len {
            return None;
        }
        let start = self.pos;
        let mut count = 0usize;
        while self.pos < self.len {
            // Close only when another sample is waiting; the final bin keeps the remainder.
            if count > 0 && count as f64 >= self.width {
                self.width = self.policy.next_width(self.width);
                break;
            }
            count += 1;
            self.pos += 1;
        }
        Some(start..self.pos)
    }
}
