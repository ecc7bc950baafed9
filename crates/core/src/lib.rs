//! Core types and shared functionality for lectern.
//!
//! This crate provides:
//! - The canon table, translations, and the scripture data model
//! - The SQLite-backed persistent chapter store
//! - Unified error types and layered configuration
//! - The record-store contract consumed by the study features

pub mod canon;
pub mod config;
pub mod error;
pub mod records;
pub mod store;
pub mod types;

pub use canon::Translation;
pub use config::AppConfig;
pub use error::Error;
pub use store::{ChapterStore, StoreMetrics};
pub use types::{BookEntry, BookIndex, BookPayload, Chapter, ChapterKey, Verse, WordAnnotation};
