// src/stats.rs

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::rebin::BinPolicy;

/// Statistics about how a bin policy reduces a data set of a given size.
#[derive(Debug, Serialize, Deserialize)]
pub struct RebinStats {
    pub policy: BinPolicy,

    // Overall stats
    pub input_points: usize,
    pub output_points: usize,
    pub kept_percent: f64, // output / input, as a percentage

    pub bin_sizes: SizeDistribution,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SizeDistribution {
    pub min_size: usize,
    pub max_size: usize,
    pub mean_size: f64,
    pub first_size: usize,
    /// Size of the final bin, which may be smaller than its nominal width.
    pub last_size: usize,
}

impl RebinStats {
    /// Analyze the partition `policy` produces for `input_points` samples.
    pub fn analyze(policy: &BinPolicy, input_points: usize) -> Self {
        let sizes = policy.bin_sizes(input_points);

        let mut stats = RebinStats {
            policy: *policy,
            input_points,
            output_points: sizes.len(),
            kept_percent: 0.0,
            bin_sizes: SizeDistribution::default(),
        };

        if let (Some(&first), Some(&last)) = (sizes.first(), sizes.last()) {
            stats.kept_percent = (sizes.len() as f64 / input_points as f64) * 100.0;
            stats.bin_sizes = SizeDistribution {
                min_size: sizes.iter().copied().min().unwrap_or(0),
                max_size: sizes.iter().copied().max().unwrap_or(0),
                mean_size: input_points as f64 / sizes.len() as f64,
                first_size: first,
                last_size: last,
            };
        }

        stats
    }

    /// Generate a detailed report of the reduction.
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("\nRebinning Analysis\n");
        report.push_str("==================\n\n");
        report.push_str(&format!("Policy: {}\n", self.policy));
        report.push_str(&format!("Input points: {}\n", self.input_points));
        report.push_str(&format!("Output points: {}\n", self.output_points));
        report.push_str(&format!("Points kept: {:.2}%\n\n", self.kept_percent));

        report.push_str("Bin Size Distribution:\n");
        report.push_str(&format!("- Min size: {}\n", self.bin_sizes.min_size));
        report.push_str(&format!("- Max size: {}\n", self.bin_sizes.max_size));
        report.push_str(&format!("- Mean size: {:.2}\n", self.bin_sizes.mean_size));
        report.push_str(&format!("- First bin: {}\n", self.bin_sizes.first_size));
        report.push_str(&format!("- Last bin: {}\n", self.bin_sizes.last_size));

        if let BinPolicy::Linear { .. } = self.policy {
            if self.output_points > 1 && self.bin_sizes.last_size < self.bin_sizes.first_size {
                report.push_str("\n- Last bin is partial and carries a larger uncertainty\n");
            }
        }

        report
    }

    /// Print a condensed summary
    pub fn print_summary(&self) {
        println!("\nRebin Stats Summary");
        println!("===================");
        println!("Policy: {}", self.policy);
        println!("{}", self);
        println!("Mean bin size: {:.2}", self.bin_sizes.mean_size);
    }
}

impl fmt::Display for RebinStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} data points rebinned to {} data points",
            self.input_points, self.output_points
        )
    }
}
