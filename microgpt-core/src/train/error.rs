//! Errors produced by a training run.

use std::fmt;

use crate::checkpoint::CheckpointError;
use crate::config::ConfigError;
use crate::data::DataError;
use crate::generate::GenerateError;
use crate::model::ModelError;
use crate::tokenizer::TokenizerError;

/// Errors produced by the train module. Each variant wraps the failing stage; `Display` names
/// the stage and [`source`](std::error::Error::source) carries the cause.
///
/// All of them abort the run: there is no retry and no partial recovery.
#[derive(Debug)]
pub enum TrainError {
    /// Configuration is invalid.
    Config(ConfigError),
    /// Corpus missing, unreadable or empty (fatal before training starts).
    Data(DataError),
    /// A document could not be tokenized.
    Tokenizer(TokenizerError),
    /// Model construction failed.
    Model(ModelError),
    /// Writing the final or best checkpoint failed.
    Checkpoint(CheckpointError),
    /// Preview sampling after training failed.
    Generate(GenerateError),
}

impl fmt::Display for TrainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            TrainError::Config(_) => "configuration",
            TrainError::Data(_) => "loading the corpus",
            TrainError::Tokenizer(_) => "tokenizing a document",
            TrainError::Model(_) => "building the model",
            TrainError::Checkpoint(_) => "saving a checkpoint",
            TrainError::Generate(_) => "sampling the preview",
        };
        write!(f, "train: {stage} failed")
    }
}

impl std::error::Error for TrainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrainError::Config(e) => Some(e),
            TrainError::Data(e) => Some(e),
            TrainError::Tokenizer(e) => Some(e),
            TrainError::Model(e) => Some(e),
            TrainError::Checkpoint(e) => Some(e),
            TrainError::Generate(e) => Some(e),
        }
    }
}

impl From<ConfigError> for TrainError {
    fn from(e: ConfigError) -> Self {
        TrainError::Config(e)
    }
}

impl From<DataError> for TrainError {
    fn from(e: DataError) -> Self {
        TrainError::Data(e)
    }
}

impl From<TokenizerError> for TrainError {
    fn from(e: TokenizerError) -> Self {
        TrainError::Tokenizer(e)
    }
}

impl From<ModelError> for TrainError {
    fn from(e: ModelError) -> Self {
        TrainError::Model(e)
    }
}

impl From<CheckpointError> for TrainError {
    fn from(e: CheckpointError) -> Self {
        TrainError::Checkpoint(e)
    }
}

impl From<GenerateError> for TrainError {
    fn from(e: GenerateError) -> Self {
        TrainError::Generate(e)
    }
}
