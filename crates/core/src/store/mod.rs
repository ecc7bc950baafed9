//! SQLite-backed persistent chapter store.
//!
//! This module provides the durable, per-chapter cache behind the loader,
//! with async access via tokio-rusqlite. It supports:
//!
//! - Composite (translation-qualified book, chapter) keys
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Existence checks that skip verse deserialization
//! - Offline verse search over the cached corpus

pub mod chapters;
pub mod connection;
pub mod migrations;

pub use crate::Error;

pub use connection::{ChapterStore, StoreMetrics};
