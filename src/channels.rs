// channels.rs
//
// Wrappers that apply the same bin policy to several co-indexed channels. Every channel is
// rebinned independently with the same policy, so as long as the inputs have equal length the
// outputs do too. Lengths are checked up front, before any channel is rebinned.

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::RebinError;
use crate::rebin::{AverageMode, BinPolicy, Rebinner};

/// Name of the scattering-vector channel of a measurement.
pub const Q: &str = "q";
/// Name of the intensity channel of a measurement.
pub const INTENSITY: &str = "I";
/// Name of the intensity-uncertainty channel of a measurement.
pub const ERROR: &str = "dI";

/// Averaging mode per named channel.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelModes(IndexMap<String, AverageMode>);

impl ChannelModes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Modes of a SAS measurement: `q` and `I` are averaged, `dI` is propagated in quadrature.
    pub fn measurement() -> Self {
        Self::new()
            .with(Q, AverageMode::Simple)
            .with(INTENSITY, AverageMode::Simple)
            .with(ERROR, AverageMode::Square)
    }

    /// The same mode for every named channel.
    pub fn uniform<I, S>(names: I, mode: AverageMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(|name| (name.into(), mode)).collect())
    }

    pub fn with(mut self, name: impl Into<String>, mode: AverageMode) -> Self {
        self.insert(name, mode);
        self
    }

    /// Set the mode of a channel, returning the previous one if it was configured.
    pub fn insert(&mut self, name: impl Into<String>, mode: AverageMode) -> Option<AverageMode> {
        self.0.insert(name.into(), mode)
    }

    pub fn mode(&self, name: &str) -> Result<AverageMode, RebinError> {
        self.0
            .get(name)
            .copied()
            .ok_or_else(|| RebinError::UnknownChannel(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, AverageMode)> {
        self.0.iter().map(|(name, mode)| (name.as_str(), *mode))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Check that all channels have the same number of samples and return it.
fn check_lengths(channels: &[(&str, &[f64])]) -> Result<usize, RebinError> {
    let Some((_, first)) = channels.first() else {
        return Ok(0);
    };
    let expected = first.len();
    for (name, samples) in &channels[1..] {
        if samples.len() != expected {
            return Err(RebinError::ChannelLengthMismatch {
                channel: name.to_string(),
                expected,
                found: samples.len(),
            });
        }
    }
    Ok(expected)
}

/// Rebin named channels, each with the mode configured for it in `modes`.
///
/// The result keeps the order of `channels`. Channels are rebinned in parallel.
pub fn rebin_channels(
    channels: &[(&str, &[f64])],
    modes: &ChannelModes,
    policy: &BinPolicy,
) -> Result<IndexMap<String, Vec<f64>>, RebinError> {
    check_lengths(channels)?;

    let mut jobs = Vec::with_capacity(channels.len());
    for (i, &(name, samples)) in channels.iter().enumerate() {
        if channels[..i].iter().any(|(other, _)| *other == name) {
            return Err(RebinError::DuplicateChannel(name.to_string()));
        }
        jobs.push((name, samples, Rebinner::new(*policy, modes.mode(name)?)));
    }

    let rebinned: Vec<(String, Vec<f64>)> = jobs
        .into_par_iter()
        .map(|(name, samples, rebinner)| (name.to_string(), rebinner.rebin(samples)))
        .collect();
    Ok(rebinned.into_iter().collect())
}

/// Rebin two co-indexed channels with simple averaging.
pub fn rebin2(
    x1: &[f64],
    x2: &[f64],
    policy: &BinPolicy,
) -> Result<(Vec<f64>, Vec<f64>), RebinError> {
    check_lengths(&[("x1", x1), ("x2", x2)])?;
    let rebinner = Rebinner::new(*policy, AverageMode::Simple);
    Ok(rayon::join(|| rebinner.rebin(x1), || rebinner.rebin(x2)))
}

/// Rebin three co-indexed channels with simple averaging.
pub fn rebin3(
    x1: &[f64],
    x2: &[f64],
    x3: &[f64],
    policy: &BinPolicy,
) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>), RebinError> {
    check_lengths(&[("x1", x1), ("x2", x2), ("x3", x3)])?;
    let rebinner = Rebinner::new(*policy, AverageMode::Simple);
    let (x1_rb, (x2_rb, x3_rb)) = rayon::join(
        || rebinner.rebin(x1),
        || rayon::join(|| rebinner.rebin(x2), || rebinner.rebin(x3)),
    );
    Ok((x1_rb, x2_rb, x3_rb))
}

/// Rebin a SAS measurement: `q` and `intensity` are averaged, `error` is propagated in
/// quadrature (see [`ChannelModes::measurement`]). All three outputs have the same length.
pub fn rebin_measurement(
    q: &[f64],
    intensity: &[f64],
    error: &[f64],
    policy: &BinPolicy,
) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>), RebinError> {
    rebin_triplet(q, intensity, error, &ChannelModes::measurement(), policy)
}

fn rebin_triplet(
    q: &[f64],
    intensity: &[f64],
    error: &[f64],
    modes: &ChannelModes,
    policy: &BinPolicy,
) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>), RebinError> {
    let n = check_lengths(&[(Q, q), (INTENSITY, intensity), (ERROR, error)])?;
    let q_rebinner = Rebinner::new(*policy, modes.mode(Q)?);
    let i_rebinner = Rebinner::new(*policy, modes.mode(INTENSITY)?);
    let e_rebinner = Rebinner::new(*policy, modes.mode(ERROR)?);

    let (q_rb, (i_rb, e_rb)) = rayon::join(
        || q_rebinner.rebin(q),
        || {
            rayon::join(
                || i_rebinner.rebin(intensity),
                || e_rebinner.rebin(error),
            )
        },
    );

    info!(
        input = n,
        output = q_rb.len(),
        "{} data points rebinned to {} data points",
        n,
        q_rb.len()
    );
    Ok((q_rb, i_rb, e_rb))
}

/// One SAS measurement record: scattering vector, intensity and intensity uncertainty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Measurement {
    pub q: Vec<f64>,
    pub intensity: Vec<f64>,
    pub error: Vec<f64>,
}

impl Measurement {
    pub fn new(q: Vec<f64>, intensity: Vec<f64>, error: Vec<f64>) -> Result<Self, RebinError> {
        check_lengths(&[(Q, &q[..]), (INTENSITY, &intensity[..]), (ERROR, &error[..])])?;
        Ok(Self {
            q,
            intensity,
            error,
        })
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            q: Vec::with_capacity(capacity),
            intensity: Vec::with_capacity(capacity),
            error: Vec::with_capacity(capacity),
        }
    }

    /// Append one data point.
    pub fn push(&mut self, q: f64, intensity: f64, error: f64) {
        self.q.push(q);
        self.intensity.push(intensity);
        self.error.push(error);
    }

    pub fn len(&self) -> usize {
        self.q.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }

    /// Iterate over `(q, I, dI)` points.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.q
            .iter()
            .zip(&self.intensity)
            .zip(&self.error)
            .map(|((&q, &i), &e)| (q, i, e))
    }

    pub fn rebin(&self, policy: &BinPolicy) -> Result<Self, RebinError> {
        self.rebin_with(&ChannelModes::measurement(), policy)
    }

    /// Rebin with explicit per-channel modes; `modes` must name `q`, `I` and `dI`.
    pub fn rebin_with(&self, modes: &ChannelModes, policy: &BinPolicy) -> Result<Self, RebinError> {
        let (q, intensity, error) =
            rebin_triplet(&self.q, &self.intensity, &self.error, modes, policy)?;
        Ok(Self {
            q,
            intensity,
            error,
        })
    }
}
