use crate::collection::Document;
use crate::common::DOC_ID;
use crate::errors::DocmapResult;
use crate::mapper::mapped_document::{Criteria, MappedDocument};

/// Conversion between a typed struct and the mapped document's field view.
///
/// Implementations speak public field names on both sides: the document
/// handed to [Model::from_document] carries top-level public names, and
/// keys in the document produced by [Model::to_document] resolve through
/// the alias map on the way in.
///
/// # Usage
///
/// ```rust,ignore
/// struct User {
///     name: String,
///     age: i64,
/// }
///
/// impl Model for User {
///     fn model_name() -> &'static str {
///         "user"
///     }
///
///     fn from_document(document: &Document) -> DocmapResult<User> {
///         Ok(User {
///             name: document.get("name").as_str().unwrap_or_default().to_string(),
///             age: document.get("age").as_i64().unwrap_or_default(),
///         })
///     }
///
///     fn to_document(&self) -> DocmapResult<Document> {
///         let mut document = Document::new();
///         document.put("name", self.name.as_str())?;
///         document.put("age", self.age)?;
///         Ok(document)
///     }
/// }
/// ```
pub trait Model: Sized {
    /// The registry identifier of this model.
    fn model_name() -> &'static str;

    /// Builds the typed value from a public-named field view.
    fn from_document(document: &Document) -> DocmapResult<Self>;

    /// Renders the typed value as a public-named document.
    fn to_document(&self) -> DocmapResult<Document>;
}

impl MappedDocument {
    /// Materializes the current fields as a typed model value, lazily
    /// loading first when an identity is present but the document never
    /// loaded.
    pub fn read_as<M: Model>(&mut self) -> DocmapResult<M> {
        if !self.is_loaded() && self.has_id() && !self.changed.contains(DOC_ID) {
            self.load(Criteria::Implied, &[])?;
        }
        M::from_document(&self.to_document(true))
    }

    /// Copies a typed model value in through the tracked accessors, so
    /// every differing field joins the pending write and identical values
    /// stay untracked.
    pub fn write_from<M: Model>(&mut self, model: &M) -> DocmapResult<()> {
        let document = model.to_document()?;
        for (key, value) in document.iter() {
            self.set(key, value.clone())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{Collection, MemoryCollection};

    struct User {
        name: String,
        age: i64,
    }

    impl Model for User {
        fn model_name() -> &'static str {
            "user"
        }

        fn from_document(document: &Document) -> DocmapResult<User> {
            Ok(User {
                name: document.get("name").as_str().unwrap_or_default().to_string(),
                age: document.get("age").as_i64().unwrap_or_default(),
            })
        }

        fn to_document(&self) -> DocmapResult<Document> {
            let mut document = Document::new();
            document.put("name", self.name.as_str())?;
            document.put("age", self.age)?;
            Ok(document)
        }
    }

    #[test]
    fn test_write_save_read_round_trip() {
        let collection = Collection::new(MemoryCollection::new("users"));

        let mut document = MappedDocument::new(collection.clone());
        let alice = User {
            name: "alice".to_string(),
            age: 30,
        };
        document.write_from(&alice).unwrap();
        assert!(document.is_changed(Some("name")));
        document.save(true).unwrap();
        let identity = document.id();

        let mut other = MappedDocument::new(collection);
        other.seed_identity(identity);
        let loaded: User = other.read_as().unwrap();
        assert_eq!(loaded.name, "alice");
        assert_eq!(loaded.age, 30);
    }

    #[test]
    fn test_write_from_skips_identical_values() {
        let mut document = MappedDocument::new(Collection::new(MemoryCollection::new("users")));
        let alice = User {
            name: "alice".to_string(),
            age: 30,
        };
        document.write_from(&alice).unwrap();
        document.save(true).unwrap();

        // unchanged round trip leaves nothing pending
        let same: User = document.read_as().unwrap();
        document.write_from(&same).unwrap();
        assert!(!document.is_changed(None));
    }

    #[test]
    fn test_model_name() {
        assert_eq!(User::model_name(), "user");
    }
}
