//! Rebinning of one-dimensional small-angle scattering data.
//!
//! Adjacent samples are grouped into bins, linearly (a fixed number of samples per bin) or
//! logarithmically (bin widths growing by a constant factor), and each bin is replaced by one
//! value. Intensities and `q` are averaged; uncertainties are combined in quadrature.
//!
//! ```
//! use sasrebin::{rebin_measurement, BinPolicy};
//!
//! let q = [0.1, 0.2, 0.3, 0.4];
//! let i = [4.0, 2.0, 3.0, 1.0];
//! let di = [3.0, 4.0, 0.0, 2.0];
//! let policy = BinPolicy::linear(2.0).unwrap();
//!
//! let (_q, i, di) = rebin_measurement(&q, &i, &di, &policy).unwrap();
//! assert_eq!(i, vec![3.0, 2.0]);
//! assert_eq!(di, vec![2.5, 1.0]);
//! ```

pub mod channels;
pub mod error;
#[cfg(feature = "cli")]
pub mod io;
pub mod rebin;
pub mod stats;

pub use channels::{
    rebin2, rebin3, rebin_channels, rebin_measurement, ChannelModes, Measurement,
};
pub use error::RebinError;
pub use rebin::{rebin, Accumulator, AverageMode, BinPolicy, PolicyKind, Rebinner};
pub use stats::RebinStats;

#[cfg(all(test, feature = "cli"))]
pub(crate) mod test_utils;
