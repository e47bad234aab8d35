//! Tokenization: encode text to token ids and decode back.
//!
//! This module defines the **trait** ([`Tokenizer`]) and **error** ([`TokenizerError`]).
//! The character-level implementation ([`CharTokenizer`]) lives in the `impls` submodule.

mod error;
mod impls;
mod vocab;

pub use error::TokenizerError;
pub use impls::CharTokenizer;
pub use vocab::Vocab;

/// Sentinel that starts every sequence.
pub const BOS_SYMBOL: &str = "<BOS>";
/// Sentinel that ends every training document.
pub const EOS_SYMBOL: &str = "<EOS>";

/// Trait for tokenizers: encode text to ids and decode ids to text.
pub trait Tokenizer {
    /// Encodes a string into a sequence of token ids.
    ///
    /// # Errors
    ///
    /// Returns [`TokenizerError::UnknownSymbol`] if a character is not in the vocabulary.
    fn encode(&self, s: &str) -> Result<Vec<usize>, TokenizerError>;

    /// Decodes a sequence of token ids into a string.
    ///
    /// # Errors
    ///
    /// Returns [`TokenizerError::InvalidId`] if an id is out of range.
    fn decode(&self, ids: &[usize]) -> Result<String, TokenizerError>;

    /// Vocabulary size (number of distinct tokens, sentinels included).
    fn vocab_size(&self) -> usize;

    /// Token id used for beginning-of-sequence.
    fn bos_id(&self) -> usize;

    /// Token id used for end-of-sequence.
    fn eos_id(&self) -> usize;

    /// Encodes a training document as `[BOS] + chars + [EOS]`.
    ///
    /// # Errors
    ///
    /// Same as [`Tokenizer::encode`].
    fn encode_document(&self, doc: &str) -> Result<Vec<usize>, TokenizerError> {
        let mut ids = Vec::with_capacity(doc.len() + 2);
        ids.push(self.bos_id());
        ids.extend(self.encode(doc)?);
        ids.push(self.eos_id());
        Ok(ids)
    }
}
