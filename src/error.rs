// error.rs

#[cfg(feature = "cli")]
use indicatif::style::TemplateError;
use std::num::ParseFloatError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RebinError {
    #[error("Invalid bin policy '{0}': expected 'lin' (linear) or 'log' (logarithmic)")]
    InvalidPolicy(String),

    #[error("Invalid averaging mode '{0}': expected 'simple' or 'square'")]
    InvalidMode(String),

    #[error("Invalid bin parameter {0}: must be finite and greater than zero")]
    InvalidBinParameter(f64),

    #[error("Channel {channel} has {found} samples, expected {expected}")]
    ChannelLengthMismatch {
        channel: String,
        expected: usize,
        found: usize,
    },

    #[error("No averaging mode configured for channel '{0}'")]
    UnknownChannel(String),

    #[error("Channel '{0}' given more than once")]
    DuplicateChannel(String),

    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),

    #[error("Parse float error: {0}")]
    ParseFloatError(#[from] ParseFloatError),

    #[error("{0}")]
    StringError(String),

    #[cfg(feature = "cli")]
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[cfg(feature = "cli")]
    #[error("Template error: {0}")]
    TemplateError(#[from] TemplateError),

    #[cfg(feature = "cli")]
    #[error("Glob pattern error: {0}")]
    GlobPatternError(#[from] glob::PatternError),
}

// Add a convenience implementation for &str errors
impl From<&str> for RebinError {
    fn from(error: &str) -> Self {
        RebinError::StringError(error.to_string())
    }
}

impl From<String> for RebinError {
    fn from(error: String) -> Self {
        RebinError::StringError(error)
    }
}

#[cfg(feature = "cli")]
impl From<glob::GlobError> for RebinError {
    fn from(error: glob::GlobError) -> Self {
        RebinError::StringError(format!("Glob error: {}", error))
    }
}
