//! Unified error types for lectern.

use tokio_rusqlite::rusqlite;

/// Unified error type shared by the store, loader, and facade.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid caller-supplied input (empty keys, unknown translation names).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Book key not present in the active translation's index.
    ///
    /// Expected during speculative probing; the loader reports this as an
    /// absent book rather than an error. The facade promotes it to this
    /// variant when a caller asked for the book explicitly.
    #[error("unknown book: {0}")]
    BookUnknown(String),

    /// Chapter number outside the book's chapter range.
    #[error("chapter {chapter} not found in {book}")]
    ChapterNotFound { book: String, chapter: u32 },

    /// Network-level fetch failure (connection error, bad status).
    #[error("content fetch failed: {0}")]
    Http(String),

    /// Fetch timed out.
    #[error("content fetch timed out: {0}")]
    FetchTimeout(String),

    /// A content file decoded but violated the payload shape (for example an
    /// empty chapter list or an empty verse list).
    #[error("malformed book payload: {0}")]
    MalformedPayload(String),

    /// Database operation failed. Callers treat this as "cache unavailable",
    /// never as "chapter does not exist".
    #[error("chapter store error: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("chapter store migration failed: {0}")]
    MigrationFailed(String),

    /// The very first requested chapter could not be loaded. The one
    /// unrecoverable case: the session never becomes interactive.
    #[error("initial chapter load failed: {0}")]
    InitialLoadFailed(String),

    /// Remote record store operation failed (notes, saved verses).
    #[error("record store error: {0}")]
    RecordStore(String),
}

impl Error {
    /// Whether this error means "nothing to show" rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::BookUnknown(_) | Error::ChapterNotFound { .. })
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}
