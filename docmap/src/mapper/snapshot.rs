use std::collections::BTreeSet;

use crate::collection::Document;
use crate::common::SNAPSHOT_VERSION;
use crate::errors::DocmapResult;
use crate::mapper::alias::AliasMap;
use crate::mapper::mapped_document::MappedDocument;
use crate::mapper::update_ops::UpdateOps;

/// A serializable image of a mapped document's tracked state.
///
/// A snapshot captures field values, the changed set, pending operations,
/// dirty marks, the loaded flag, and the alias map, so an in-flight edit
/// can park (in a job queue, a session store) and resume later through
/// [MappedDocumentBuilder::restore]. References and hooks are code-side
/// configuration and are not captured.
///
/// The version tag guards the wire shape: restore refuses a snapshot
/// written under a different version.
///
/// [MappedDocumentBuilder::restore]: crate::mapper::MappedDocumentBuilder::restore
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct Snapshot {
    pub(crate) version: u32,
    pub(crate) aliases: AliasMap,
    pub(crate) fields: Document,
    pub(crate) changed: BTreeSet<String>,
    pub(crate) operations: UpdateOps,
    pub(crate) loaded: bool,
    pub(crate) dirty: BTreeSet<String>,
}

impl Snapshot {
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Serializes the snapshot as JSON.
    pub fn to_json(&self) -> DocmapResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserializes a snapshot from JSON.
    pub fn from_json(text: &str) -> DocmapResult<Snapshot> {
        Ok(serde_json::from_str(text)?)
    }
}

impl MappedDocument {
    /// Captures the current tracked state as a [Snapshot].
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            aliases: self.aliases.clone(),
            fields: self.fields.clone(),
            changed: self.changed.clone(),
            operations: self.ops.clone(),
            loaded: self.loaded,
            dirty: self.dirty.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{Collection, MemoryCollection};
    use crate::common::Value;
    use crate::errors::ErrorKind;
    use crate::mapper::update_ops::Operator;

    #[test]
    fn test_snapshot_round_trip_resumes_pending_state() {
        let collection = Collection::new(MemoryCollection::new("pages"));

        let mut document = MappedDocument::new(collection.clone());
        document.set("title", "Home").unwrap();
        document.save(true).unwrap();
        document.set("title", "Start").unwrap();
        document.inc("hits", 1).unwrap();

        let parked = document.snapshot().to_json().unwrap();
        drop(document);

        let snapshot = Snapshot::from_json(&parked).unwrap();
        let mut resumed = MappedDocument::builder(collection.clone())
            .restore(snapshot)
            .unwrap();

        assert!(resumed.is_changed(Some("title")));
        assert_eq!(
            resumed.operations().entry(Operator::Inc, "hits"),
            Some(&Value::I32(1))
        );

        resumed.save(true).unwrap();
        assert_eq!(resumed.get("title").unwrap(), Value::from("Start"));
        assert_eq!(resumed.get("hits").unwrap(), Value::I64(1));
    }

    #[test]
    fn test_snapshot_carries_aliases() {
        let mut document = MappedDocument::builder(Collection::new(MemoryCollection::new("users")))
            .alias("login", "l")
            .build();
        document.set("login", "alice").unwrap();

        let snapshot = document.snapshot();
        let resumed = MappedDocument::builder(Collection::new(MemoryCollection::new("users")))
            .restore(snapshot)
            .unwrap();
        assert_eq!(resumed.to_document(true).get("login"), Value::from("alice"));
    }

    #[test]
    fn test_restore_rejects_unknown_version() {
        let document = MappedDocument::new(Collection::new(MemoryCollection::new("users")));
        let mut raw: serde_json::Value =
            serde_json::from_str(&document.snapshot().to_json().unwrap()).unwrap();
        raw["version"] = serde_json::json!(99);

        let snapshot = Snapshot::from_json(&raw.to_string()).unwrap();
        let result = MappedDocument::builder(Collection::new(MemoryCollection::new("users")))
            .restore(snapshot);
        assert!(result.is_err());
        assert_eq!(result.err().unwrap().kind(), &ErrorKind::EncodingError);
    }
}
