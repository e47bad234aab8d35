//! Errors produced when building, encoding or decoding with a tokenizer.
//!
//! All errors from the tokenizer module use [`TokenizerError`].

use std::fmt;

/// Errors produced by the tokenizer module.
///
/// # Variants
///
/// - **UnknownSymbol**: A character was encountered that is not in the vocabulary.
///   *When*: During [`encode`](super::Tokenizer::encode) on text containing a character not seen in the corpus.
///   *Recovery*: Build the tokenizer from a corpus that includes this character.
///
/// - **InvalidId**: A token id is out of range for the vocabulary.
///   *When*: During [`decode`](super::Tokenizer::decode) when an id is not in `[0, vocab_size)`.
///
/// - **MissingSentinel**: A stored vocabulary lacks `<BOS>` or `<EOS>`.
///   *When*: Rebuilding a tokenizer from checkpoint symbols.
///
/// - **DuplicateSymbol**: A stored vocabulary lists the same symbol twice, so ids would be ambiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizerError {
    /// A symbol not in the vocabulary was encountered during encode.
    UnknownSymbol(String),

    /// A token id is out of range during decode.
    InvalidId(usize),

    /// A required sentinel symbol is absent from the vocabulary.
    MissingSentinel(&'static str),

    /// A symbol occurs more than once in a stored vocabulary.
    DuplicateSymbol(String),
}

impl fmt::Display for TokenizerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenizerError::UnknownSymbol(s) => write!(f, "tokenizer: unknown symbol {s:?}"),
            TokenizerError::InvalidId(id) => write!(f, "tokenizer: invalid id {id}"),
            TokenizerError::MissingSentinel(s) => {
                write!(f, "tokenizer: vocabulary has no {s} symbol")
            }
            TokenizerError::DuplicateSymbol(s) => {
                write!(f, "tokenizer: symbol {s:?} appears more than once")
            }
        }
    }
}

impl std::error::Error for TokenizerError {}
