//! Training corpus loading: one document per line of a UTF-8 text file.
//!
//! This module defines the **trait** ([`DataLoader`]), **models** ([`DataItem`], [`Data`]) and
//! **error** ([`DataError`]). The file-backed implementation is [`PathLoader`].

mod error;
mod impls;
mod types;

pub use error::DataError;
pub use impls::{load_from_path, PathLoader};
pub use types::{Data, DataItem};

/// Trait for loading the training corpus.
pub trait DataLoader {
    /// Loads data. Returns [`Data`] or a [`DataError`].
    fn load(&self) -> Result<Data, DataError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::error::Error as _;
    use std::io::Write;
    use std::path::Path;

    fn corpus_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(f, "{line}").unwrap();
        }
        f.flush().unwrap();
        f
    }

    #[test]
    fn load_trims_lines() {
        let f = corpus_file(&["first", "  second  ", "third"]);
        let data = load_from_path(f.path()).unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data.items()[1].as_str(), "second");
        assert_eq!(data.into_documents(), ["first", "second", "third"]);
    }

    #[test]
    fn load_skips_blank_lines() {
        let f = corpus_file(&["", "अर्जुन", "   ", "भीम", ""]);
        let data = load_from_path(f.path()).unwrap();
        assert_eq!(data.into_documents(), ["अर्जुन", "भीम"]);
    }

    #[test]
    fn load_whitespace_only_file_is_empty() {
        let f = corpus_file(&["   ", ""]);
        assert!(matches!(load_from_path(f.path()), Err(DataError::EmptyFile)));
    }

    #[test]
    fn load_empty_file_is_empty() {
        let f = corpus_file(&[]);
        assert!(matches!(load_from_path(f.path()), Err(DataError::EmptyFile)));
    }

    #[test]
    fn missing_file_is_not_found_with_guidance() {
        let path = Path::new("/nonexistent/microgpt_corpus_never_exists.txt");
        let err = PathLoader::new(path).load().unwrap_err();
        assert!(matches!(&err, DataError::NotFound(p) if p == path));
        assert!(err.to_string().contains("create the dataset"));
        assert!(err.source().is_none());
    }

    #[test]
    fn invalid_utf8_is_io_error() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&[0x61, 0xff, 0xfe, 0x0a]).unwrap();
        f.flush().unwrap();
        let err = load_from_path(f.path()).unwrap_err();
        assert!(matches!(err, DataError::Io(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn data_item_rejects_blank() {
        assert!(matches!(DataItem::new("  "), Err(DataError::EmptyDataItem)));
        assert_eq!(DataItem::new("  x ").unwrap().to_string(), "x");
    }

    #[test]
    fn data_rejects_empty_vec() {
        assert!(matches!(Data::from_items(vec![]), Err(DataError::EmptyFile)));
    }

    #[test]
    fn parse_measures_documents_in_chars() {
        let data = Data::parse("  ab\n\n\tराम\r\nx\n").unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data.items()[1].as_str(), "राम");
        assert_eq!(data.items()[1].char_len(), 3);
        assert_eq!(data.max_char_len(), 3);
        let tokenizer = crate::tokenizer::CharTokenizer::from_docs(data.items());
        assert_eq!(crate::tokenizer::Tokenizer::vocab_size(&tokenizer), 2 + 6);
    }
}
