//! Errors produced when building or checking model parameters.

use std::fmt;

/// Errors produced by the model module.
///
/// - **Hyperparams**: dimensions are inconsistent (e.g. `n_embd != n_head * head_dim`).
/// - **InitStd**: the Gaussian init std is negative or not finite.
/// - **MissingMatrix**: a named parameter matrix is absent from a stored state dict.
/// - **Shape**: a stored matrix does not match the shape implied by the hyperparameters.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Hyperparameters are inconsistent.
    Hyperparams(String),

    /// Invalid standard deviation for weight init.
    InitStd(f64),

    /// A required matrix is missing.
    MissingMatrix(String),

    /// A matrix has the wrong shape (ragged rows included).
    Shape {
        /// Matrix name (e.g. `layer0.attn_wq`).
        name: String,
        /// Expected `(rows, cols)`.
        expected: (usize, usize),
        /// Row count found and the length of the first offending row, if any.
        found: (usize, Option<usize>),
    },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Hyperparams(m) => write!(f, "model: invalid hyperparameters: {m}"),
            ModelError::InitStd(std) => write!(f, "model: invalid init std {std}"),
            ModelError::MissingMatrix(name) => write!(f, "model: missing matrix {name:?}"),
            ModelError::Shape {
                name,
                expected,
                found,
            } => {
                write!(
                    f,
                    "model: matrix {name:?} expected {}x{}, found {} rows",
                    expected.0, expected.1, found.0
                )?;
                if let Some(cols) = found.1 {
                    write!(f, " with a row of length {cols}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ModelError {}
