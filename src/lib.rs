//! # libris
//!
//! A book catalog persisted in a single flat text file: header line plus
//! one comma-delimited record per line, with atomic replace-on-write.
//!
//! ## Architecture
//!
//! - **Record + codec** (`record`, `codec`): the unified book schema and
//!   the escaping-aware line format
//! - **Catalog file** (`catalog`): ordered full read, stage-and-rename
//!   atomic replace
//! - **Catalog store** (`store`): CRUD / upsert / partial update /
//!   paginated listing with serialized write transactions
//! - **Query engine** (`query`): AND-combined field filters, date-range
//!   filtering, stable date sort
//!
//! ## Library usage
//!
//! ```no_run
//! use libris::query::BookFilter;
//! use libris::store::{CatalogStore, NewBook};
//!
//! let store = CatalogStore::open("books.csv").unwrap();
//! let book = store
//!     .create(NewBook {
//!         title: "Dune".into(),
//!         authors: "Frank Herbert".into(),
//!         publication_date: "06/01/1965".into(),
//!         ..NewBook::default()
//!     })
//!     .unwrap();
//! let (page, total) = store.list(&BookFilter::default(), 1, 20).unwrap();
//! assert_eq!(total, 1);
//! assert_eq!(page[0].id, book.id);
//! ```

pub mod catalog;
pub mod codec;
pub mod config;
pub mod error;
pub mod query;
pub mod record;
pub mod store;
