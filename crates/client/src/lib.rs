//! Client pipeline for lectern.
//!
//! This crate provides the network content source, the book/chapter loader
//! and its cache chain, lexicon-annotation normalization, the chapter fetch
//! facade used by the reading UI, and the progressive preloader.

pub mod annotations;
pub mod cache;
pub mod facade;
pub mod loader;
pub mod scheduler;
pub mod source;

#[cfg(test)]
pub(crate) mod testutil;

pub use cache::BookCache;
pub use facade::ChapterFetcher;
pub use loader::{BibleLoader, LoaderMetrics};
pub use scheduler::{PreloadHandle, PreloadPhase, PreloadProgress, Preloader, background_order};
pub use source::{ContentSource, HttpContentSource};
