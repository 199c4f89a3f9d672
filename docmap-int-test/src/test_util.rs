use docmap::collection::{Collection, MemoryCollection};
use docmap::mapper::{register_model, MappedDocument, ModelFactory};

/// A model factory over a shared in-memory collection.
///
/// The global model registry is shared by every test in a binary, so each
/// test registers its models under names unique to that test; the returned
/// collection handle is the same one the factory captures, letting the test
/// verify stored state directly.
struct MemoryModel {
    model: String,
    collection: Collection,
}

impl ModelFactory for MemoryModel {
    fn model_name(&self) -> String {
        self.model.clone()
    }

    fn create(&self) -> MappedDocument {
        MappedDocument::new(self.collection.clone())
    }
}

/// Registers a plain model over a fresh in-memory collection and returns
/// the collection handle.
pub fn register_memory_model(model: &str, collection: &str) -> Collection {
    let handle = Collection::new(MemoryCollection::new(collection));
    register_model(MemoryModel {
        model: model.to_string(),
        collection: handle.clone(),
    });
    handle
}

/// Creates a fresh in-memory collection handle.
pub fn memory_collection(name: &str) -> Collection {
    Collection::new(MemoryCollection::new(name))
}
