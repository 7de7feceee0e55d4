//! Diagnostic error types for the libris catalog.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]`
//! derives, providing error codes and help text so callers know what went
//! wrong and how to fix it. Adapters map these onto their own surface:
//! `NotFound` → 404, `Validation` → 400, everything else → 500.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the libris catalog.
///
/// Each variant wraps a subsystem-specific error, preserving the full
/// diagnostic chain (error codes, help text, sources) through to the caller.
#[derive(Debug, Error, Diagnostic)]
pub enum LibrisError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Codec errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum CodecError {
    #[error("wrong field count: expected {expected}, got {actual}")]
    #[diagnostic(
        code(libris::codec::field_count),
        help(
            "Every data line must decode to exactly the header's field count. \
             The line is either truncated, has stray unescaped delimiters, or \
             was written by an incompatible schema version."
        )
    )]
    FieldCount { expected: usize, actual: usize },

    #[error("unterminated quoted field")]
    #[diagnostic(
        code(libris::codec::unterminated_quote),
        help(
            "A quoted field opened with '\"' but the line ended before the \
             closing quote. The file was likely truncated mid-write by an \
             external editor; restore it from a backup."
        )
    )]
    UnterminatedQuote,
}

// ---------------------------------------------------------------------------
// Catalog file errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    #[error("I/O error: {source}")]
    #[diagnostic(
        code(libris::catalog::io),
        help(
            "A filesystem operation on the catalog file failed. Check that \
             the parent directory exists, has correct permissions, and that \
             the disk is not full."
        )
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("catalog header mismatch: expected \"{expected}\", found \"{found}\"")]
    #[diagnostic(
        code(libris::catalog::schema_mismatch),
        help(
            "The file's first line does not name the expected fields in \
             order. The file was written by a different schema version or is \
             not a libris catalog; it is never auto-repaired."
        )
    )]
    SchemaMismatch { expected: String, found: String },

    #[error("malformed record on line {line}")]
    #[diagnostic(
        code(libris::catalog::malformed),
        help(
            "A data line failed to decode. Line numbers count data lines \
             starting at 1, after the header. Fix or remove the offending \
             line; loading stops rather than returning partial data."
        )
    )]
    Malformed {
        line: usize,
        #[source]
        source: CodecError,
    },
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("validation failed: {message}")]
    #[diagnostic(
        code(libris::store::validation),
        help("The input was rejected before any state change. {message}")
    )]
    Validation { message: String },

    #[error("no book with id \"{id}\"")]
    #[diagnostic(
        code(libris::store::not_found),
        help("The id does not reference a live record. List the catalog to see valid ids.")
    )]
    NotFound { id: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Catalog(#[from] CatalogError),
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(libris::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}")]
    #[diagnostic(
        code(libris::config::parse),
        help("Check the TOML syntax in the config file.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(libris::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias for functions returning libris results.
pub type LibrisResult<T> = std::result::Result<T, LibrisError>;
