//! Errors produced when saving or loading a checkpoint.

use std::fmt;
use std::path::PathBuf;

use crate::model::ModelError;
use crate::tokenizer::TokenizerError;

/// Errors produced by the checkpoint module.
///
/// # Variants
///
/// - **NotFound**: The checkpoint file does not exist.
///   *Recovery*: Train first with `MICROGPT_SAVE_PATH` set, then point inference at that file.
///
/// - **Io**: Reading, writing or renaming the file failed.
///
/// - **Json**: The document is not valid JSON or does not have the expected keys and types.
///
/// - **Vocab**: The stored vocabulary cannot be rebuilt (missing sentinel, duplicate symbol).
///
/// - **VocabSizeMismatch**: `vocab.vocab_size` disagrees with the number of stored symbols.
///
/// - **Model**: Hyperparameters are inconsistent, or a matrix is missing or misshapen.
#[derive(Debug)]
pub enum CheckpointError {
    /// Checkpoint file is missing.
    NotFound(PathBuf),

    /// I/O error on the checkpoint file.
    Io(std::io::Error),

    /// Malformed document.
    Json(serde_json::Error),

    /// Stored vocabulary is unusable.
    Vocab(TokenizerError),

    /// Declared vocabulary size differs from the symbol list.
    VocabSizeMismatch {
        /// `vocab.vocab_size` as stored.
        declared: usize,
        /// `vocab.chars.len()`.
        actual: usize,
    },

    /// Stored hyperparameters or weights do not fit together.
    Model(ModelError),
}

impl fmt::Display for CheckpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckpointError::NotFound(path) => {
                write!(f, "checkpoint: {} not found", path.display())
            }
            CheckpointError::Io(e) => write!(f, "checkpoint io: {e}"),
            CheckpointError::Json(e) => write!(f, "checkpoint: malformed document: {e}"),
            CheckpointError::Vocab(_) => write!(f, "checkpoint: invalid vocabulary"),
            CheckpointError::VocabSizeMismatch { declared, actual } => write!(
                f,
                "checkpoint: vocab_size is {declared} but {actual} symbols are stored"
            ),
            CheckpointError::Model(_) => write!(f, "checkpoint: weights do not fit the model"),
        }
    }
}

impl std::error::Error for CheckpointError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CheckpointError::Io(e) => Some(e),
            CheckpointError::Json(e) => Some(e),
            CheckpointError::Vocab(e) => Some(e),
            CheckpointError::Model(e) => Some(e),
            CheckpointError::NotFound(_) | CheckpointError::VocabSizeMismatch { .. } => None,
        }
    }
}

impl From<std::io::Error> for CheckpointError {
    fn from(e: std::io::Error) -> Self {
        CheckpointError::Io(e)
    }
}

impl From<serde_json::Error> for CheckpointError {
    fn from(e: serde_json::Error) -> Self {
        CheckpointError::Json(e)
    }
}

impl From<TokenizerError> for CheckpointError {
    fn from(e: TokenizerError) -> Self {
        CheckpointError::Vocab(e)
    }
}

impl From<ModelError> for CheckpointError {
    fn from(e: ModelError) -> Self {
        CheckpointError::Model(e)
    }
}
