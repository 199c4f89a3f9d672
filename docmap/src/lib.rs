//! # Docmap - Document-Object Mapper
//!
//! Docmap is a change-tracking document-object mapper for schemaless
//! document stores. It tracks field mutations against an in-memory view of
//! one stored record and compiles them into the minimal atomic update the
//! store has to apply.
//!
//! ## Key Features
//!
//! - **Change tracking**: Field assignments and atomic operator calls
//!   accumulate separately; a save writes exactly what changed
//! - **Operation compilation**: Operator calls merge and collapse
//!   (`inc` deltas add, a repeated `push` becomes a multi-value append)
//!   before anything hits the wire
//! - **Field aliases**: Public field names translate to short
//!   storage-canonical names, at any nesting depth
//! - **Lazy loading**: A document constructed with just an identity loads
//!   itself on the first field read; fields touched by operators reload
//!   after a save to observe store-computed results
//! - **References**: Documents point at documents of other models through
//!   foreign-key fields, with cascading saves
//! - **Lifecycle hooks**: Validation and enrichment callbacks around load,
//!   save, and delete
//! - **Snapshots**: Tracked state, pending writes included, serializes and
//!   resumes later
//! - **Pluggable storage**: The mapper speaks to any
//!   [collection::CollectionProvider]; an in-memory provider ships built in
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docmap::collection::{Collection, MemoryCollection};
//! use docmap::mapper::MappedDocument;
//!
//! # fn main() -> docmap::errors::DocmapResult<()> {
//! let pages = Collection::new(MemoryCollection::new("pages"));
//!
//! // insert a fresh document
//! let mut page = MappedDocument::new(pages.clone());
//! page.set("title", "Home")?;
//! page.save(true)?;
//!
//! // atomic operators compile into one update
//! page.inc("hits", 1)?.push("tags", "landing");
//! page.save(true)?;
//!
//! // the store computed hits; this read reloads to observe it
//! let hits = page.get("hits")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`collection`] - Documents, identities, and the collection interface
//!   boundary
//! - [`common`] - Values, constants, and shared utilities
//! - [`errors`] - Error types and result definitions
//! - [`mapper`] - Change tracking, operation compilation, and the document
//!   lifecycle

pub mod collection;
pub mod common;
pub mod errors;
pub mod mapper;
