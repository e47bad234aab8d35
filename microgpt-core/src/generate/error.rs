//! Errors produced while sampling from a trained model.

use std::fmt;

use crate::tokenizer::TokenizerError;

/// Errors produced by the generate module.
///
/// - **InvalidTemperature**: temperature is zero, negative or not finite.
/// - **Sampling**: the next-token distribution has no usable weight (all zero, NaN or infinite),
///   which happens when the weights themselves are not finite.
/// - **Tokenizer**: a sampled id could not be decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateError {
    InvalidTemperature(f64),
    Sampling(String),
    Tokenizer(TokenizerError),
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::InvalidTemperature(t) => {
                write!(f, "generate: temperature must be finite and > 0, got {t}")
            }
            GenerateError::Sampling(m) => write!(f, "generate: cannot sample next token: {m}"),
            GenerateError::Tokenizer(_) => write!(f, "generate: cannot decode sample"),
        }
    }
}

impl std::error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenerateError::Tokenizer(e) => Some(e),
            GenerateError::InvalidTemperature(_) | GenerateError::Sampling(_) => None,
        }
    }
}

impl From<TokenizerError> for GenerateError {
    fn from(e: TokenizerError) -> Self {
        GenerateError::Tokenizer(e)
    }
}
