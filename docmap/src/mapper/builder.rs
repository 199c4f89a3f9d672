use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::collection::{Collection, Document};
use crate::common::{Value, SNAPSHOT_VERSION};
use crate::errors::{DocmapError, DocmapResult, ErrorKind};
use crate::mapper::alias::AliasMap;
use crate::mapper::hooks::{LifecycleHooks, NoopHooks};
use crate::mapper::mapped_document::MappedDocument;
use crate::mapper::reference::RefSpec;
use crate::mapper::snapshot::Snapshot;
use crate::mapper::update_ops::UpdateOps;

/// Configures and constructs a [MappedDocument].
///
/// Aliases, references, and hooks are code-side configuration: they belong
/// to the model definition, not to the persisted record, so they are set
/// here once and survive loads and clears.
///
/// # Usage
///
/// ```rust,ignore
/// let post = MappedDocument::builder(posts)
///     .alias("body", "b")
///     .reference("author", "user", "author_id")
///     .hooks(Timestamps)
///     .build();
/// ```
pub struct MappedDocumentBuilder {
    collection: Collection,
    aliases: AliasMap,
    refs: BTreeMap<String, RefSpec>,
    hooks: Arc<dyn LifecycleHooks>,
    identity: Option<Value>,
}

impl MappedDocumentBuilder {
    pub(crate) fn new(collection: Collection) -> Self {
        MappedDocumentBuilder {
            collection,
            aliases: AliasMap::new(),
            refs: BTreeMap::new(),
            hooks: Arc::new(NoopHooks),
            identity: None,
        }
    }

    /// Registers a public-to-canonical field alias.
    pub fn alias(mut self, public: &str, canonical: &str) -> Self {
        self.aliases.insert(public, canonical);
        self
    }

    /// Declares a reference under `name`, targeting the named registered
    /// model through the given foreign-key field.
    pub fn reference(mut self, name: &str, target_model: &str, fk_field: &str) -> Self {
        self.refs
            .insert(name.to_string(), RefSpec::new(target_model, fk_field));
        self
    }

    /// Installs lifecycle hooks, replacing the default no-ops.
    pub fn hooks<T: LifecycleHooks + 'static>(mut self, hooks: T) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    /// Pre-seeds an identity assumed to already exist in the store, for
    /// update-without-load use.
    pub fn identity<T: Into<Value>>(mut self, identity: T) -> Self {
        self.identity = Some(identity.into());
        self
    }

    /// Constructs the mapped document.
    pub fn build(self) -> MappedDocument {
        let mut document = MappedDocument {
            collection: self.collection,
            hooks: self.hooks,
            aliases: self.aliases,
            fields: Document::new(),
            changed: BTreeSet::new(),
            ops: UpdateOps::new(),
            dirty: BTreeSet::new(),
            loaded: false,
            refs: self.refs,
        };
        if let Some(identity) = document_identity(self.identity) {
            document.seed_identity(identity);
        }
        document
    }

    /// Constructs the mapped document from a serialized snapshot, resuming
    /// its tracked state.
    ///
    /// The snapshot supplies the field values, changed set, pending
    /// operations, dirty marks, loaded flag, and aliases; references and
    /// hooks come from this builder, and any builder identity or aliases
    /// are superseded by the snapshot.
    ///
    /// # Errors
    ///
    /// Fails with [ErrorKind::EncodingError] when the snapshot was written
    /// by an incompatible version of this crate.
    pub fn restore(self, snapshot: Snapshot) -> DocmapResult<MappedDocument> {
        if snapshot.version != SNAPSHOT_VERSION {
            log::error!(
                "Cannot restore snapshot version {} (expected {})",
                snapshot.version,
                SNAPSHOT_VERSION
            );
            return Err(DocmapError::new(
                &format!(
                    "Cannot restore snapshot version {} (expected {})",
                    snapshot.version, SNAPSHOT_VERSION
                ),
                ErrorKind::EncodingError,
            ));
        }

        Ok(MappedDocument {
            collection: self.collection,
            hooks: self.hooks,
            aliases: snapshot.aliases,
            fields: snapshot.fields,
            changed: snapshot.changed,
            ops: snapshot.operations,
            dirty: snapshot.dirty,
            loaded: snapshot.loaded,
            refs: self.refs,
        })
    }
}

fn document_identity(identity: Option<Value>) -> Option<Value> {
    identity.filter(|value| !value.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::MemoryCollection;

    #[test]
    fn test_build_with_identity() {
        let document = MappedDocument::builder(Collection::new(MemoryCollection::new("users")))
            .identity("u-1")
            .build();

        assert!(document.has_id());
        assert!(!document.is_changed(None));
        assert!(!document.is_loaded());
    }

    #[test]
    fn test_build_with_null_identity_ignored() {
        let document = MappedDocument::builder(Collection::new(MemoryCollection::new("users")))
            .identity(Value::Null)
            .build();
        assert!(!document.has_id());
    }

    #[test]
    fn test_aliases_apply() {
        let mut document = MappedDocument::builder(Collection::new(MemoryCollection::new("users")))
            .alias("login", "l")
            .build();

        document.set("login", "alice").unwrap();
        assert_eq!(document.to_document(false).get("l"), Value::from("alice"));
    }
}
