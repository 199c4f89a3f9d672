use crate::collection::Document;
use crate::common::Value;
use crate::errors::DocmapResult;
use std::ops::Deref;
use std::sync::Arc;

/// Result of an insert operation.
///
/// Carries the identity assigned by the store (the caller-supplied one when
/// present) and, when safe-write acknowledgment was requested, any error the
/// store reported.
#[derive(Clone, Debug)]
pub struct InsertResult {
    identity: Value,
    error: Option<String>,
}

impl InsertResult {
    pub fn new(identity: Value, error: Option<String>) -> Self {
        InsertResult { identity, error }
    }

    /// The identity under which the values were stored.
    pub fn identity(&self) -> &Value {
        &self.identity
    }

    /// The store-reported error, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Options for controlling update operations.
///
/// # Examples
///
/// ```rust,ignore
/// use docmap::collection::{upsert, UpdateOptions};
///
/// // Plain update
/// let options = UpdateOptions::default();
///
/// // Insert a new record if the filter matches nothing
/// let options = upsert();
/// ```
#[derive(Default)]
pub struct UpdateOptions {
    upsert: bool,
}

impl UpdateOptions {
    pub fn new(upsert: bool) -> Self {
        Self { upsert }
    }

    /// Returns whether to insert a new record if no match is found.
    pub fn is_upsert(&self) -> bool {
        self.upsert
    }
}

/// Creates `UpdateOptions` with upsert behavior.
pub fn upsert() -> UpdateOptions {
    UpdateOptions::new(true)
}

/// Trait defining the interface the mapper requires from a collection.
///
/// This is the boundary to the underlying document store: connection
/// management, wire protocol, querying, and indexing all live behind it.
/// Implementations handle one named collection of records.
pub trait CollectionProvider: Send + Sync {
    /// Finds at most one record matching the filter.
    ///
    /// When `fields` is non-empty, only those fields (plus the identity
    /// field) are returned. Returns `Ok(None)` when nothing matches.
    fn find_one(&self, filter: &Document, fields: &[String]) -> DocmapResult<Option<Document>>;

    /// Inserts a values document into the collection.
    ///
    /// When the values carry no identity field, the store assigns one. Under
    /// `safe`, store-side failures are reported in the result; otherwise the
    /// write is fire-and-forget.
    fn insert(&self, values: Document, safe: bool) -> DocmapResult<InsertResult>;

    /// Applies an operation document to records matching the filter.
    ///
    /// The operation document maps operator tokens (`$set`, `$inc`, ...) to
    /// field-path payload maps. Returns `false` when the store reports a
    /// failure; the diagnostic is then available via [last_error].
    ///
    /// [last_error]: CollectionProvider::last_error
    fn update(
        &self,
        filter: &Document,
        operations: &Document,
        options: &UpdateOptions,
    ) -> DocmapResult<bool>;

    /// Removes records matching the filter.
    ///
    /// # Arguments
    ///
    /// * `filter` - The filter to match records
    /// * `just_once` - If true, remove only the first matching record
    fn remove(&self, filter: &Document, just_once: bool) -> DocmapResult<bool>;

    /// Returns the diagnostic message for the most recent failed
    /// `update`/`remove`, if any.
    fn last_error(&self) -> Option<String>;

    /// Returns the name of this collection.
    fn name(&self) -> String;
}

/// A handle to a document collection.
///
/// `Collection` wraps a [CollectionProvider] implementation behind an `Arc`,
/// so handles are cheap to clone and share between mapped documents.
#[derive(Clone)]
pub struct Collection {
    inner: Arc<dyn CollectionProvider>,
}

impl Collection {
    /// Creates a new `Collection` from a provider implementation.
    pub fn new<T: CollectionProvider + 'static>(inner: T) -> Self {
        Collection {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for Collection {
    type Target = Arc<dyn CollectionProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_options_default() {
        let options = UpdateOptions::default();
        assert!(!options.is_upsert());
    }

    #[test]
    fn test_upsert_helper() {
        let options = upsert();
        assert!(options.is_upsert());
    }

    #[test]
    fn test_insert_result() {
        let result = InsertResult::new(Value::from("abc"), None);
        assert_eq!(result.identity(), &Value::from("abc"));
        assert!(result.error().is_none());

        let result = InsertResult::new(Value::Null, Some("duplicate key".to_string()));
        assert_eq!(result.error(), Some("duplicate key"));
    }
}
