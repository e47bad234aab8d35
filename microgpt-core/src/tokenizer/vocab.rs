//! Id table shared by training and checkpoints: `<BOS>` at 0, `<EOS>` at 1, corpus characters
//! after them.

use std::collections::HashMap;

use super::{TokenizerError, BOS_SYMBOL, EOS_SYMBOL};

/// Symbol table with contiguous ids. Every symbol appears once.
#[derive(Clone, Debug)]
pub struct Vocab {
    symbols: Vec<String>,
    ids: HashMap<String, usize>,
}

impl Vocab {
    /// `[<BOS>, <EOS>]` followed by `chars` in the order given; repeated characters keep their
    /// first id.
    #[must_use]
    pub fn with_sentinels(chars: impl IntoIterator<Item = char>) -> Self {
        let mut vocab = Vocab {
            symbols: Vec::new(),
            ids: HashMap::new(),
        };
        vocab.insert(BOS_SYMBOL.to_owned());
        vocab.insert(EOS_SYMBOL.to_owned());
        for ch in chars {
            vocab.insert(ch.to_string());
        }
        vocab
    }

    /// Takes stored symbols as-is, so ids match the list positions.
    ///
    /// # Errors
    ///
    /// [`TokenizerError::DuplicateSymbol`] on the first repeated symbol.
    pub fn from_symbols(symbols: Vec<String>) -> Result<Self, TokenizerError> {
        let mut ids = HashMap::with_capacity(symbols.len());
        for (id, sym) in symbols.iter().enumerate() {
            if ids.insert(sym.clone(), id).is_some() {
                return Err(TokenizerError::DuplicateSymbol(sym.clone()));
            }
        }
        Ok(Vocab { symbols, ids })
    }

    fn insert(&mut self, sym: String) {
        if !self.ids.contains_key(&sym) {
            self.ids.insert(sym.clone(), self.symbols.len());
            self.symbols.push(sym);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    #[must_use]
    pub fn symbol(&self, id: usize) -> Option<&str> {
        self.symbols.get(id).map(String::as_str)
    }

    #[must_use]
    pub fn id(&self, symbol: &str) -> Option<usize> {
        self.ids.get(symbol).copied()
    }

    /// Id of a single character, without allocating.
    #[must_use]
    pub fn char_id(&self, ch: char) -> Option<usize> {
        let mut buf = [0u8; 4];
        self.id(ch.encode_utf8(&mut buf))
    }

    /// All symbols in id order.
    #[must_use]
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }
}
