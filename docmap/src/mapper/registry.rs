use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::common::Value;
use crate::errors::{DocmapError, DocmapResult, ErrorKind};
use crate::mapper::{MappedDocument, SharedDocument};

/// Contract for constructing mapped documents of a named model.
///
/// A model factory bundles everything code-side about a model: which
/// collection it persists to, its aliases, references, and hooks. Factories
/// are registered once at startup under an explicit model identifier; the
/// reference resolver and the [factory] entry point look models up by that
/// identifier rather than deriving type names at runtime.
pub trait ModelFactory: Send + Sync {
    /// The identifier this model registers under.
    fn model_name(&self) -> String;

    /// Constructs a fresh, empty mapped document of this model.
    fn create(&self) -> MappedDocument;
}

static REGISTRY: Lazy<DashMap<String, Arc<dyn ModelFactory>>> = Lazy::new(DashMap::new);

/// Registers a model factory, replacing any factory previously registered
/// under the same name.
pub fn register_model<T: ModelFactory + 'static>(factory: T) {
    let name = factory.model_name();
    log::debug!("Registering model '{}'", name);
    REGISTRY.insert(name, Arc::new(factory));
}

/// Returns true when a factory is registered under the name.
pub fn is_registered(model: &str) -> bool {
    REGISTRY.contains_key(model)
}

/// Constructs a mapped document for a registered model.
///
/// When an identity is supplied the document is pre-seeded with it (assumed
/// to exist in the store), enabling update-without-load use: the first field
/// read triggers a lazy load, while operator calls and `save` go straight to
/// an update keyed by that identity.
///
/// # Errors
///
/// Fails with [ErrorKind::ModelNotFound] when no factory is registered under
/// the name.
pub fn factory(model: &str, identity: Option<Value>) -> DocmapResult<SharedDocument> {
    let entry = REGISTRY.get(model).ok_or_else(|| {
        log::error!("No model registered under '{}'", model);
        DocmapError::new(
            &format!("No model registered under '{}'", model),
            ErrorKind::ModelNotFound,
        )
    })?;

    let mut document = entry.create();
    if let Some(identity) = identity {
        if !identity.is_null() {
            document.seed_identity(identity);
        }
    }
    Ok(Arc::new(Mutex::new(document)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{Collection, MemoryCollection};

    struct WidgetFactory;

    impl ModelFactory for WidgetFactory {
        fn model_name(&self) -> String {
            "registry_test_widget".to_string()
        }

        fn create(&self) -> MappedDocument {
            MappedDocument::new(Collection::new(MemoryCollection::new("widgets")))
        }
    }

    #[test]
    fn test_register_and_construct() {
        register_model(WidgetFactory);
        assert!(is_registered("registry_test_widget"));

        let document = factory("registry_test_widget", None).unwrap();
        assert!(!document.lock().has_id());
    }

    #[test]
    fn test_factory_seeds_identity() {
        register_model(WidgetFactory);

        let document =
            factory("registry_test_widget", Some(Value::from("w-1"))).unwrap();
        let mut document = document.lock();
        assert!(document.has_id());
        assert_eq!(document.get("id").unwrap(), Value::from("w-1"));
        // a seeded identity is assumed existing, not a pending change
        assert!(!document.is_changed(None));
    }

    #[test]
    fn test_unknown_model() {
        let result = factory("registry_test_missing", None);
        assert!(result.is_err());
        assert_eq!(result.err().unwrap().kind(), &ErrorKind::ModelNotFound);
    }
}
