//! Corpus types. A [`DataItem`] is one trimmed, non-blank document; a [`Data`] holds at least one.

use std::fmt;

use super::DataError;

/// One training document, e.g. a single name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DataItem(String);

impl DataItem {
    /// # Errors
    ///
    /// - [`DataError::EmptyDataItem`] when `line` is empty or only whitespace.
    pub fn new(line: &str) -> Result<Self, DataError> {
        match line.trim() {
            "" => Err(DataError::EmptyDataItem),
            doc => Ok(DataItem(doc.to_owned())),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters, which is what the tokenizer counts.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl AsRef<str> for DataItem {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<DataItem> for String {
    fn from(item: DataItem) -> Self {
        item.0
    }
}

impl fmt::Display for DataItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The loaded corpus, in file order.
#[derive(Clone, Debug)]
pub struct Data(Vec<DataItem>);

impl Data {
    /// # Errors
    ///
    /// - [`DataError::EmptyFile`] when `items` is empty.
    pub fn from_items(items: Vec<DataItem>) -> Result<Self, DataError> {
        if items.is_empty() {
            return Err(DataError::EmptyFile);
        }
        Ok(Data(items))
    }

    /// One document per line; lines are trimmed and blank ones skipped.
    ///
    /// # Errors
    ///
    /// - [`DataError::EmptyFile`] when no line has content.
    pub fn parse(text: &str) -> Result<Self, DataError> {
        let items = text
            .lines()
            .filter_map(|line| DataItem::new(line).ok())
            .collect();
        Self::from_items(items)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false` once constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn items(&self) -> &[DataItem] {
        &self.0
    }

    /// Character length of the longest document.
    #[must_use]
    pub fn max_char_len(&self) -> usize {
        self.0.iter().map(DataItem::char_len).max().unwrap_or(0)
    }

    /// Consumes the corpus, yielding the documents as owned strings.
    #[must_use]
    pub fn into_documents(self) -> Vec<String> {
        self.0.into_iter().map(String::from).collect()
    }
}
