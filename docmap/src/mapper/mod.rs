//! Change tracking, operation compilation, and the document lifecycle.
//!
//! # Mapped documents
//!
//! A [MappedDocument] is a tracked view over one stored record. Field
//! assignments and atomic operator calls accumulate separately and compile
//! into a single minimal write on [MappedDocument::save]: a fresh document
//! inserts its changed fields, an existing one folds them into a `set`
//! operator bucket alongside the queued operators.
//!
//! ```rust,ignore
//! use docmap::mapper::MappedDocument;
//!
//! let mut page = MappedDocument::new(collection);
//! page.set("title", "Home")?;
//! page.inc("hits", 1)?;
//! page.save(true)?;
//! ```
//!
//! # Names and models
//!
//! An [AliasMap] translates public field names to storage-canonical ones;
//! the identity alias `id` -> `_id` is always present. Models register
//! construction recipes in a global registry (see [register_model]) so
//! references between documents can materialize their targets by model
//! name.
//!
//! # Parking state
//!
//! [Snapshot] serializes a document's tracked state, including pending
//! writes, so an in-flight edit can park and resume later through
//! [MappedDocumentBuilder::restore].

mod alias;
mod binding;
mod builder;
mod hooks;
mod mapped_document;
mod reference;
mod registry;
mod snapshot;
mod update_ops;

pub use alias::AliasMap;
pub use binding::Model;
pub use builder::MappedDocumentBuilder;
pub use hooks::{LifecycleHooks, NoopHooks, SaveMode};
pub use mapped_document::{Criteria, MappedDocument};
pub use reference::RefSpec;
pub use registry::{factory, is_registered, register_model, ModelFactory};
pub use snapshot::Snapshot;
pub use update_ops::{Operator, UpdateOps};

use parking_lot::Mutex;
use std::sync::Arc;

/// A shared, lockable handle to a mapped document.
///
/// References hand out this shape so an owning document and its caller can
/// both hold the same target; lock it to read or mutate.
pub type SharedDocument = Arc<Mutex<MappedDocument>>;
