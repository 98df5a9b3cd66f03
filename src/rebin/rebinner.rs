// rebin/rebinner.rs

use serde::{Deserialize, Serialize};

use super::average::{Accumulator, AverageMode};
use super::policy::{BinPolicy, Partition};
use crate::error::RebinError;

/// Rebin `samples` with `policy`, reducing each bin with `mode`.
///
/// Returns one value per bin in input order. An empty input gives an empty output.
pub fn rebin(samples: &[f64], policy: &BinPolicy, mode: AverageMode) -> Vec<f64> {
    Rebinner::new(*policy, mode).rebin(samples)
}

/// A bin policy paired with the averaging mode of one channel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rebinner {
    pub policy: BinPolicy,
    pub mode: AverageMode,
}

impl Rebinner {
    pub fn new(policy: BinPolicy, mode: AverageMode) -> Self {
        Self { policy, mode }
    }

    /// Build a rebinner from a policy name, its parameter and a mode name, e.g.
    /// `("log", 1.05, "square")`. Fails before any data is touched if a name or `b` is invalid.
    pub fn from_names(kind: &str, b: f64, mode: &str) -> Result<Self, RebinError> {
        let policy = BinPolicy::from_name(kind, b)?;
        let mode = mode.parse()?;
        Ok(Self::new(policy, mode))
    }

    /// Iterate over the bins of `samples` as contiguous sub-slices.
    pub fn bins<'a>(&self, samples: &'a [f64]) -> Bins<'a> {
        Bins {
            samples,
            partition: self.policy.partition(samples.len()),
        }
    }

    pub fn rebin(&self, samples: &[f64]) -> Vec<f64> {
        let mode = self.mode;
        self.bins(samples)
            .filter_map(|bin| {
                bin.iter()
                    .fold(Accumulator::new(), |acc, &x| acc.add(mode, x))
                    .finalize(mode)
            })
            .collect()
    }
}

/// Iterator over the bins of one channel, in input order.
#[derive(Clone, Debug)]
pub struct Bins<'a> {
    samples: &'a [f64],
    partition: Partition,
}

impl<'a> Iterator for Bins<'a> {
    type Item = &'a [f64];

    fn next(&mut self) -> Option<Self::Item> {
        self.partition.next().map(|range| &self.samples[range])
    }
}
