//! [`DataLoader`](super::super::DataLoader) that reads a UTF-8 file, one document per line.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use super::super::{Data, DataError, DataLoader};

/// Loads documents from a file path. Lines are trimmed and blank lines are skipped.
#[derive(Clone, Debug)]
pub struct PathLoader<P>(pub P);

impl<P> PathLoader<P>
where
    P: AsRef<Path>,
{
    /// Creates a loader for the given path.
    #[must_use]
    pub fn new(path: P) -> Self {
        PathLoader(path)
    }
}

impl<P> DataLoader for PathLoader<P>
where
    P: AsRef<Path>,
{
    fn load(&self) -> Result<Data, DataError> {
        let path = self.0.as_ref();
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => DataError::NotFound(path.to_path_buf()),
            _ => DataError::Io(e),
        })?;
        let data = Data::parse(&content)?;
        log::debug!(
            "loaded {} documents from {} (longest {} chars)",
            data.len(),
            path.display(),
            data.max_char_len()
        );
        Ok(data)
    }
}

/// Convenience: load data from a path using [`PathLoader`].
///
/// # Errors
///
/// - [`DataError::NotFound`] when the file does not exist.
/// - [`DataError::Io`] when the file cannot be read or is not valid UTF-8.
/// - [`DataError::EmptyFile`] when the file has no non-blank line.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Data, DataError> {
    PathLoader::new(path).load()
}
