//! Documents, identities, and the collection interface boundary.
//!
//! This module provides the wire-level building blocks of the mapper:
//!
//! # Documents
//!
//! A [Document] is a key-value map where keys are strings and values are
//! [crate::common::Value] objects. Documents support nested fields using the
//! `.` separator and serve as records, filters, operator payloads, and
//! compiled operation documents.
//!
//! ```rust,ignore
//! use docmap::doc;
//!
//! let doc = doc! {
//!     name: "Alice",
//!     address: { city: "New York" },
//! };
//! ```
//!
//! # Collections
//!
//! [CollectionProvider] is the boundary to the underlying store. The mapper
//! only requires `find_one`, `insert`, `update`, `remove`, and `last_error`;
//! everything else (connections, cursors, indexing) is the provider's
//! business. [MemoryCollection] is the built-in in-memory provider used by
//! tests and examples.
//!
//! # Identities
//!
//! Each stored record carries a `_id` field. Store-assigned identities are
//! [DocKey] values; caller-assigned identities may be any [crate::common::Value].

#[allow(clippy::module_inception)]
mod collection;
mod doc_key;
mod document;
mod memory;

pub use collection::{upsert, Collection, CollectionProvider, InsertResult, UpdateOptions};
pub use doc_key::DocKey;
pub use document::{normalize, Document};
pub use memory::MemoryCollection;
