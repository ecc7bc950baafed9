//! Contract for the hosted record store behind notes and saved verses.
//!
//! The reading core never implements this. The surrounding CRUD features
//! (notes, themes, saved verses) supply a backend at the application root;
//! the core only defines the query/insert/update/delete surface they consume.

use async_trait::async_trait;
use serde_json::Value;

use crate::Error;

/// Sort direction for a record query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Filter/sort query against one record collection.
#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
    filters: Vec<(String, Value)>,
    order_by: Option<(String, SortOrder)>,
    limit: Option<u32>,
}

impl RecordQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field == value`. Filters combine conjunctively.
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.order_by = Some((field.into(), order));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn filters(&self) -> &[(String, Value)] {
        &self.filters
    }

    pub fn ordering(&self) -> Option<(&str, SortOrder)> {
        self.order_by.as_ref().map(|(f, o)| (f.as_str(), *o))
    }

    pub fn max_results(&self) -> Option<u32> {
        self.limit
    }
}

/// Async CRUD over the remote relational datastore.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a record, returning it with server-assigned fields.
    async fn insert(&self, collection: &str, record: Value) -> Result<Value, Error>;

    /// Apply a partial update to the record with the given id.
    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<Value, Error>;

    /// Delete the record with the given id.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), Error>;

    /// Run a filtered, optionally sorted and bounded query.
    async fn query(&self, collection: &str, query: RecordQuery) -> Result<Vec<Value>, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_builder_accumulates() {
        let query = RecordQuery::new()
            .filter("user_id", "u1")
            .filter("book", "genesis")
            .order_by("created_at", SortOrder::Descending)
            .limit(20);

        assert_eq!(
            query.filters(),
            &[("user_id".to_string(), json!("u1")), ("book".to_string(), json!("genesis"))]
        );
        assert_eq!(query.ordering(), Some(("created_at", SortOrder::Descending)));
        assert_eq!(query.max_results(), Some(20));
    }

    #[test]
    fn test_empty_query() {
        let query = RecordQuery::new();
        assert!(query.filters().is_empty());
        assert!(query.ordering().is_none());
        assert!(query.max_results().is_none());
    }
}
