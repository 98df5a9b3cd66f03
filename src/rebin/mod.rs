// rebin/mod.rs
mod average;
mod policy;
mod rebinner;

pub use average::{Accumulator, AverageMode};
pub use policy::{BinPolicy, Partition, PolicyKind};
pub use rebinner::{rebin, Bins, Rebinner};
