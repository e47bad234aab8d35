//! Configuration errors.
//!
//! Everything the config module produces (env loading and validation) is a [`ConfigError`].

use std::fmt;

/// Errors produced when building or validating configuration.
///
/// # Variants
///
/// - **Validation**: Values are inconsistent or out of range (e.g. `n_embd` not divisible by `n_head`).
///   *When*: [`Config::validate`](super::Config::validate) or [`GenerateConfig::validate`](super::GenerateConfig::validate).
///
/// - **EnvVar**: An environment variable is set but unreadable (e.g. invalid Unicode).
///
/// - **Parse**: An environment variable is set but does not parse into the expected type (e.g. `SEED=abc`).
///   *Recovery*: Fix or unset the variable; the message names the key and the bad value.
///
/// - **Missing**: A required setting (the checkpoint path for inference) was not provided.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration validation failed.
    Validation(String),

    /// Failed to read an environment variable.
    EnvVar {
        /// The full environment variable name that was read.
        key: String,
        /// Underlying cause (e.g. NotUnicode).
        message: String,
    },

    /// Environment variable was set but could not be parsed into the expected type.
    Parse {
        /// The full environment variable name.
        key: String,
        /// The raw value that failed to parse.
        value: String,
        /// Human-readable parse reason.
        message: String,
    },

    /// A required setting is absent.
    Missing {
        /// The environment variable that would have provided it.
        key: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Validation(m) => write!(f, "config validation: {m}"),
            ConfigError::EnvVar { key, message } => write!(f, "env var {key}: {message}"),
            ConfigError::Parse {
                key,
                value,
                message,
            } => write!(f, "env var {key}={value:?}: {message}"),
            ConfigError::Missing { key } => write!(f, "missing required setting {key}"),
        }
    }
}

impl std::error::Error for ConfigError {}
