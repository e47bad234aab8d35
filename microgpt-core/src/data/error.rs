//! Errors produced when loading or validating the training corpus.
//!
//! All errors from the data module use [`DataError`].

use std::fmt;
use std::path::PathBuf;

/// Errors produced by the data loading module.
///
/// # Variants
///
/// - **NotFound**: The corpus file does not exist.
///   *When*: Opening the path in [`PathLoader`](super::PathLoader).
///   *Recovery*: Create the dataset first, one training example (e.g. a name) per line.
///
/// - **Io**: Any other failure reading the file (permission denied, invalid UTF-8, ...).
///
/// - **EmptyFile**: The file was read but contains no non-blank line.
///
/// - **EmptyDataItem**: A [`DataItem`](super::DataItem) was built from a blank string.
#[derive(Debug)]
pub enum DataError {
    /// The corpus file is missing.
    NotFound(PathBuf),

    /// I/O error while reading the input file.
    Io(std::io::Error),

    /// The input file yields no non-empty lines.
    EmptyFile,

    /// A line was empty after trimming.
    EmptyDataItem,
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::NotFound(path) => write!(
                f,
                "data: {} not found; create the dataset first (one training example per line)",
                path.display()
            ),
            DataError::Io(e) => write!(f, "data io: {e}"),
            DataError::EmptyFile => write!(f, "data: input file has no non-empty lines"),
            DataError::EmptyDataItem => write!(f, "data: empty data item"),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Io(e) => Some(e),
            DataError::NotFound(_) | DataError::EmptyFile | DataError::EmptyDataItem => None,
        }
    }
}

impl From<std::io::Error> for DataError {
    fn from(e: std::io::Error) -> Self {
        DataError::Io(e)
    }
}
