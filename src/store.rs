//! The catalog store: CRUD, upsert, and query access over the catalog file.
//!
//! `CatalogStore` is the sole owner of the persisted collection. Every
//! mutating operation runs load → compute → persist as one serialized
//! transaction under an internal write lock, so two concurrent mutations
//! can never each read a stale snapshot and silently discard the other's
//! change. Pure reads take no lock: the catalog file's atomic-rename
//! persistence guarantees they see a complete pre- or post-mutation
//! snapshot.
//!
//! Callers receive owned copies of records, never references into internal
//! state.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogFile;
use crate::error::StoreError;
use crate::query::{self, BookFilter, SortOrder};
use crate::record::Book;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Input fields for `create` and `replace`: every record field except the
/// id. Fields absent from an adapter's input deserialize to empty strings,
/// giving `replace` its full-overwrite PUT semantics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewBook {
    pub title: String,
    pub authors: String,
    pub avg_rating: String,
    pub isbn: String,
    pub isbn13: String,
    pub language_code: String,
    pub num_pages: String,
    pub ratings_count: String,
    pub text_reviews_count: String,
    pub publication_date: String,
    pub publisher: String,
    pub description: String,
    pub category: String,
    pub price: String,
}

impl NewBook {
    fn into_book(self, id: String) -> Book {
        Book {
            id,
            title: self.title,
            authors: self.authors,
            avg_rating: self.avg_rating,
            isbn: self.isbn,
            isbn13: self.isbn13,
            language_code: self.language_code,
            num_pages: self.num_pages,
            ratings_count: self.ratings_count,
            text_reviews_count: self.text_reviews_count,
            publication_date: self.publication_date,
            publisher: self.publisher,
            description: self.description,
            category: self.category,
            price: self.price,
        }
    }

    fn values(&self) -> [&str; 14] {
        [
            &self.title,
            &self.authors,
            &self.avg_rating,
            &self.isbn,
            &self.isbn13,
            &self.language_code,
            &self.num_pages,
            &self.ratings_count,
            &self.text_reviews_count,
            &self.publication_date,
            &self.publisher,
            &self.description,
            &self.category,
            &self.price,
        ]
    }
}

/// Partial update for `update`: only supplied fields are overwritten. The
/// id is not patchable — identity is immutable once assigned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub authors: Option<String>,
    pub avg_rating: Option<String>,
    pub isbn: Option<String>,
    pub isbn13: Option<String>,
    pub language_code: Option<String>,
    pub num_pages: Option<String>,
    pub ratings_count: Option<String>,
    pub text_reviews_count: Option<String>,
    pub publication_date: Option<String>,
    pub publisher: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<String>,
}

impl BookPatch {
    fn apply(&self, book: &mut Book) {
        fn set(target: &mut String, value: &Option<String>) {
            if let Some(v) = value {
                target.clone_from(v);
            }
        }
        set(&mut book.title, &self.title);
        set(&mut book.authors, &self.authors);
        set(&mut book.avg_rating, &self.avg_rating);
        set(&mut book.isbn, &self.isbn);
        set(&mut book.isbn13, &self.isbn13);
        set(&mut book.language_code, &self.language_code);
        set(&mut book.num_pages, &self.num_pages);
        set(&mut book.ratings_count, &self.ratings_count);
        set(&mut book.text_reviews_count, &self.text_reviews_count);
        set(&mut book.publication_date, &self.publication_date);
        set(&mut book.publisher, &self.publisher);
        set(&mut book.description, &self.description);
        set(&mut book.category, &self.category);
        set(&mut book.price, &self.price);
    }

    fn values(&self) -> impl Iterator<Item = &str> {
        [
            &self.title,
            &self.authors,
            &self.avg_rating,
            &self.isbn,
            &self.isbn13,
            &self.language_code,
            &self.num_pages,
            &self.ratings_count,
            &self.text_reviews_count,
            &self.publication_date,
            &self.publisher,
            &self.description,
            &self.category,
            &self.price,
        ]
        .into_iter()
        .filter_map(|v| v.as_deref())
    }
}

/// Whether `replace` stored a new record or overwrote an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Created,
    Replaced,
}

/// In-process API over the catalog file.
pub struct CatalogStore {
    file: CatalogFile,
    /// Held across load → compute → persist for every mutation.
    write_lock: Mutex<()>,
}

impl CatalogStore {
    /// Open a store over the given catalog path.
    ///
    /// Performs an initial load so a schema mismatch or corrupt file
    /// surfaces at startup rather than on the first request. A missing
    /// file is fine: the catalog bootstraps on first write.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let file = CatalogFile::new(path);
        let records = file.load_all()?;
        tracing::info!(
            path = %file.path().display(),
            records = records.len(),
            "opened catalog store"
        );
        Ok(Self {
            file,
            write_lock: Mutex::new(()),
        })
    }

    fn write_guard(&self) -> MutexGuard<'_, ()> {
        // A poisoned lock means a panic mid-mutation; the file itself is
        // still last-known-good thanks to the rename discipline.
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a record with a freshly assigned id.
    pub fn create(&self, input: NewBook) -> StoreResult<Book> {
        validate_fields(input.values())?;
        if input.title.is_empty() {
            return Err(StoreError::Validation {
                message: "title must not be empty".into(),
            });
        }

        let _guard = self.write_guard();
        let mut books = self.file.load_all()?;
        let id = next_id(&books);
        let book = input.into_book(id);
        books.push(book.clone());
        self.file.replace_all(&books)?;
        tracing::info!(id = %book.id, title = %book.title, "created book");
        Ok(book)
    }

    /// Fetch a record by id.
    pub fn get(&self, id: &str) -> StoreResult<Book> {
        let books = self.file.load_all()?;
        books
            .into_iter()
            .find(|b| b.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    /// Filtered, paginated listing in file order.
    ///
    /// Returns the requested page slice plus the total filtered count.
    /// `page` and `page_size` are 1-based; zero is a validation error, and
    /// a page past the end is an empty slice, not an error.
    pub fn list(
        &self,
        filter: &BookFilter,
        page: usize,
        page_size: usize,
    ) -> StoreResult<(Vec<Book>, usize)> {
        if page == 0 || page_size == 0 {
            return Err(StoreError::Validation {
                message: format!("page and page_size must be >= 1, got page={page} page_size={page_size}"),
            });
        }

        let books = self.file.load_all()?;
        let filtered: Vec<Book> = books.into_iter().filter(|b| filter.matches(b)).collect();
        let total = filtered.len();
        let items = filtered
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .collect();
        Ok((items, total))
    }

    /// Full-record upsert keyed by the caller-supplied id.
    ///
    /// An existing record has every field overwritten with the input
    /// (absent fields reset to empty); an absent id creates the record
    /// under that id instead of an auto-generated one.
    pub fn replace(&self, id: &str, input: NewBook) -> StoreResult<(Book, UpsertOutcome)> {
        validate_id(id)?;
        validate_fields(input.values())?;
        if input.title.is_empty() {
            return Err(StoreError::Validation {
                message: "title must not be empty".into(),
            });
        }

        let _guard = self.write_guard();
        let mut books = self.file.load_all()?;
        let book = input.into_book(id.to_string());
        let outcome = match books.iter().position(|b| b.id == id) {
            Some(pos) => {
                books[pos] = book.clone();
                UpsertOutcome::Replaced
            }
            None => {
                books.push(book.clone());
                UpsertOutcome::Created
            }
        };
        self.file.replace_all(&books)?;
        tracing::info!(id = %book.id, ?outcome, "replaced book");
        Ok((book, outcome))
    }

    /// Partial update: only fields present in the patch change.
    ///
    /// Unlike [`Self::replace`], this never creates.
    pub fn update(&self, id: &str, patch: &BookPatch) -> StoreResult<Book> {
        validate_fields(patch.values())?;
        if patch.title.as_deref() == Some("") {
            return Err(StoreError::Validation {
                message: "title must not be empty".into(),
            });
        }

        let _guard = self.write_guard();
        let mut books = self.file.load_all()?;
        let Some(book) = books.iter_mut().find(|b| b.id == id) else {
            return Err(StoreError::NotFound { id: id.to_string() });
        };
        patch.apply(book);
        let updated = book.clone();
        self.file.replace_all(&books)?;
        tracing::debug!(id = %updated.id, "updated book");
        Ok(updated)
    }

    /// Remove a record and persist the reduced collection.
    pub fn delete(&self, id: &str) -> StoreResult<()> {
        let _guard = self.write_guard();
        let mut books = self.file.load_all()?;
        let Some(pos) = books.iter().position(|b| b.id == id) else {
            return Err(StoreError::NotFound { id: id.to_string() });
        };
        books.remove(pos);
        self.file.replace_all(&books)?;
        tracing::info!(id, "deleted book");
        Ok(())
    }

    /// Records published in `[start, end]` inclusive, date-sorted.
    ///
    /// The bounds are calendar dates in `MM/DD/YYYY` form; bounds that do
    /// not parse are a validation error. Stored records whose date fails
    /// to parse are excluded from the result, never fatal.
    pub fn range_query(&self, start: &str, end: &str, order: SortOrder) -> StoreResult<Vec<Book>> {
        let start = query::parse_date(start).ok_or_else(|| StoreError::Validation {
            message: format!("start date \"{start}\" is not in MM/DD/YYYY form"),
        })?;
        let end = query::parse_date(end).ok_or_else(|| StoreError::Validation {
            message: format!("end date \"{end}\" is not in MM/DD/YYYY form"),
        })?;

        let books = self.file.load_all()?;
        Ok(query::range_query(books, start, end, order))
    }
}

/// Highest numeric id plus one, or 1 for an empty catalog.
///
/// Ids that do not parse as integers (possible via `replace` with a
/// caller-supplied id) are ignored by the maximum.
fn next_id(books: &[Book]) -> String {
    books
        .iter()
        .filter_map(|b| b.id.parse::<u64>().ok())
        .max()
        .map_or(1, |max| max + 1)
        .to_string()
}

fn validate_id(id: &str) -> StoreResult<()> {
    if id.is_empty() {
        return Err(StoreError::Validation {
            message: "id must not be empty".into(),
        });
    }
    validate_fields([id])
}

/// Reject values the line-oriented format cannot hold.
fn validate_fields<'a>(values: impl IntoIterator<Item = &'a str>) -> StoreResult<()> {
    for value in values {
        if value.contains('\n') || value.contains('\r') {
            return Err(StoreError::Validation {
                message: "field values must not contain line breaks".into(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store(dir: &TempDir) -> CatalogStore {
        CatalogStore::open(dir.path().join("books.csv")).unwrap()
    }

    fn titled(title: &str) -> NewBook {
        NewBook {
            title: title.into(),
            ..NewBook::default()
        }
    }

    #[test]
    fn create_assigns_sequential_ids() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        assert_eq!(store.create(titled("A")).unwrap().id, "1");
        assert_eq!(store.create(titled("B")).unwrap().id, "2");
        assert_eq!(store.create(titled("C")).unwrap().id, "3");
    }

    #[test]
    fn create_skips_non_numeric_ids_when_assigning() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        store.replace("legacy-7", titled("Old")).unwrap();
        store.replace("41", titled("Mid")).unwrap();
        assert_eq!(store.create(titled("New")).unwrap().id, "42");
    }

    #[test]
    fn create_requires_title() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let err = store.create(NewBook::default()).unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));
    }

    #[test]
    fn line_breaks_in_fields_are_rejected() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let mut input = titled("Multi");
        input.description = "line one\nline two".into();
        assert!(matches!(
            store.create(input).unwrap_err(),
            StoreError::Validation { .. }
        ));

        let book = store.create(titled("Ok")).unwrap();
        let patch = BookPatch {
            publisher: Some("Bad\rPress".into()),
            ..BookPatch::default()
        };
        assert!(matches!(
            store.update(&book.id, &patch).unwrap_err(),
            StoreError::Validation { .. }
        ));
    }

    #[test]
    fn replace_rejects_empty_id() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        assert!(matches!(
            store.replace("", titled("X")).unwrap_err(),
            StoreError::Validation { .. }
        ));
    }

    #[test]
    fn list_rejects_zero_page_or_size() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let filter = BookFilter::default();
        assert!(matches!(
            store.list(&filter, 0, 10).unwrap_err(),
            StoreError::Validation { .. }
        ));
        assert!(matches!(
            store.list(&filter, 1, 0).unwrap_err(),
            StoreError::Validation { .. }
        ));
    }

    #[test]
    fn update_empty_title_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let book = store.create(titled("Keep Me")).unwrap();
        let patch = BookPatch {
            title: Some(String::new()),
            ..BookPatch::default()
        };
        assert!(matches!(
            store.update(&book.id, &patch).unwrap_err(),
            StoreError::Validation { .. }
        ));
    }

    #[test]
    fn next_id_starts_at_one() {
        assert_eq!(next_id(&[]), "1");
    }
}
