//! Session options for the bits output

use std::collections::HashMap;
use tracing::error;

/// Samples per line when no `width` option is given
pub const DEFAULT_SAMPLES_PER_LINE: usize = 64;

/// Error type for session setup
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error("Invalid width '{0}'")]
    InvalidWidth(String),

    #[error("No enabled logic channels")]
    NoChannels,
}

/// Describes one recognised option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    pub id: &'static str,
    pub description: &'static str,
    pub default: String,
}

/// Options controlling a bits output session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitsOptions {
    /// Number of samples rendered per line before wrapping
    pub width: usize,
    /// Reject sessions without any enabled logic channel
    pub require_channels: bool,
}

impl Default for BitsOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_SAMPLES_PER_LINE,
            require_channels: false,
        }
    }
}

impl BitsOptions {
    /// Create options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the line width (builder pattern). Zero is rejected.
    pub fn with_width(mut self, width: usize) -> Result<Self, ConfigError> {
        if width == 0 {
            error!("Invalid width.");
            return Err(ConfigError::InvalidWidth(width.to_string()));
        }
        self.width = width;
        Ok(self)
    }

    /// Require at least one enabled logic channel (builder pattern)
    pub fn with_require_channels(mut self, require: bool) -> Self {
        self.require_channels = require;
        self
    }

    /// Build options from string key/value parameters.
    ///
    /// `width` is the only recognised key; anything else is an error.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut options = Self::default();

        for (key, value) in params {
            match key.as_str() {
                "width" => {
                    let width = Self::parse_width(value)?;
                    options = options.with_width(width)?;
                }
                _ => {
                    error!("Unknown parameter '{}'.", key);
                    return Err(ConfigError::UnknownParameter(key.clone()));
                }
            }
        }

        Ok(options)
    }

    /// The table of recognised options with their defaults
    pub fn specs() -> Vec<OptionSpec> {
        vec![OptionSpec {
            id: "width",
            description: "Number of samples per line",
            default: DEFAULT_SAMPLES_PER_LINE.to_string(),
        }]
    }

    fn parse_width(value: &str) -> Result<usize, ConfigError> {
        match value.trim().parse::<usize>() {
            Ok(width) if width >= 1 => Ok(width),
            _ => {
                error!("Invalid width.");
                Err(ConfigError::InvalidWidth(value.to_string()))
            }
        }
    }
}
