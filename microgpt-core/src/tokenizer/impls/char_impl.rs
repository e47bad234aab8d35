//! Character-level tokenizer: `<BOS>`, `<EOS>`, then every distinct corpus character in sorted order.

use std::collections::BTreeSet;

use super::super::Vocab;
use super::super::{Tokenizer, TokenizerError, BOS_SYMBOL, EOS_SYMBOL};

/// Character-level tokenizer. Built once from the training corpus and immutable afterwards.
#[derive(Clone, Debug)]
pub struct CharTokenizer {
    vocab: Vocab,
    bos_id: usize,
    eos_id: usize,
}

impl CharTokenizer {
    /// Builds the vocabulary `[<BOS>, <EOS>] + sorted(unique chars)` from the documents.
    #[must_use]
    pub fn from_docs<S: AsRef<str>>(docs: &[S]) -> Self {
        let chars: BTreeSet<char> = docs.iter().flat_map(|d| d.as_ref().chars()).collect();
        CharTokenizer {
            vocab: Vocab::with_sentinels(chars),
            bos_id: 0,
            eos_id: 1,
        }
    }

    /// Rebuilds a tokenizer from stored symbols, keeping their ids.
    ///
    /// # Errors
    ///
    /// - [`TokenizerError::DuplicateSymbol`] when a symbol repeats.
    /// - [`TokenizerError::MissingSentinel`] when `<BOS>` or `<EOS>` is absent.
    pub fn from_symbols(symbols: Vec<String>) -> Result<Self, TokenizerError> {
        let vocab = Vocab::from_symbols(symbols)?;
        let bos_id = vocab
            .id(BOS_SYMBOL)
            .ok_or(TokenizerError::MissingSentinel(BOS_SYMBOL))?;
        let eos_id = vocab
            .id(EOS_SYMBOL)
            .ok_or(TokenizerError::MissingSentinel(EOS_SYMBOL))?;
        Ok(CharTokenizer {
            vocab,
            bos_id,
            eos_id,
        })
    }

    /// Symbols in id order (what gets persisted as the checkpoint vocabulary).
    #[must_use]
    pub fn symbols(&self) -> &[String] {
        self.vocab.symbols()
    }
}

impl Tokenizer for CharTokenizer {
    fn encode(&self, s: &str) -> Result<Vec<usize>, TokenizerError> {
        let mut ids = Vec::with_capacity(s.chars().count());
        for ch in s.chars() {
            let id = self
                .vocab
                .char_id(ch)
                .ok_or_else(|| TokenizerError::UnknownSymbol(ch.to_string()))?;
            ids.push(id);
        }
        Ok(ids)
    }

    fn decode(&self, ids: &[usize]) -> Result<String, TokenizerError> {
        let mut s = String::new();
        for &id in ids {
            let sym = self
                .vocab
                .symbol(id)
                .ok_or(TokenizerError::InvalidId(id))?;
            s.push_str(sym);
        }
        Ok(s)
    }

    fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    fn bos_id(&self) -> usize {
        self.bos_id
    }

    fn eos_id(&self) -> usize {
        self.eos_id
    }
}
