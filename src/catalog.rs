//! The persisted catalog: header line plus one encoded record per line.
//!
//! `CatalogFile` owns the on-disk representation and its two operations:
//! an ordered full read and an atomic replace-all. The replace stages the
//! new contents into a sibling temp file and renames it over the catalog
//! path, so readers only ever observe a complete pre- or post-write file
//! and a crash mid-write leaves the previous file intact.

use std::path::{Path, PathBuf};

use crate::codec;
use crate::error::CatalogError;
use crate::record::{Book, HEADER};

/// Handle to the catalog file. All access goes through
/// [`crate::store::CatalogStore`]; no other component opens the path.
#[derive(Debug, Clone)]
pub struct CatalogFile {
    path: PathBuf,
}

impl CatalogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record in file order.
    ///
    /// A missing file is the first-run state and yields an empty catalog;
    /// the header is written lazily by the first [`Self::replace_all`].
    /// A header that does not match the expected schema, or a data line
    /// that fails to decode, aborts the load — no silent partial data.
    pub fn load_all(&self) -> Result<Vec<Book>, CatalogError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents =
            std::fs::read_to_string(&self.path).map_err(|e| CatalogError::Io { source: e })?;

        let mut lines = contents.lines();
        let Some(header) = lines.next() else {
            return Ok(Vec::new());
        };
        if header != HEADER {
            return Err(CatalogError::SchemaMismatch {
                expected: HEADER.to_string(),
                found: header.to_string(),
            });
        }

        let mut books = Vec::new();
        for (i, line) in lines.enumerate() {
            let book = codec::decode(line).map_err(|e| CatalogError::Malformed {
                line: i + 1,
                source: e,
            })?;
            books.push(book);
        }
        tracing::debug!(path = %self.path.display(), records = books.len(), "loaded catalog");
        Ok(books)
    }

    /// Atomically replace the file contents with header + the given records.
    ///
    /// New contents are staged to `<path with .tmp extension>` and renamed
    /// over the catalog path. The rename is the commit point.
    pub fn replace_all(&self, books: &[Book]) -> Result<(), CatalogError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| CatalogError::Io { source: e })?;
            }
        }

        let mut contents = String::with_capacity(HEADER.len() + 1 + books.len() * 64);
        contents.push_str(HEADER);
        contents.push('\n');
        for book in books {
            contents.push_str(&codec::encode(book));
            contents.push('\n');
        }

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, contents).map_err(|e| CatalogError::Io { source: e })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| CatalogError::Io { source: e })?;
        tracing::debug!(path = %self.path.display(), records = books.len(), "persisted catalog");
        Ok(())
    }
}
