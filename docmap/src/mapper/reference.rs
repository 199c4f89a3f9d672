use crate::mapper::SharedDocument;

/// Describes an embedded reference to a document of another model.
///
/// A reference pairs a target model name with the foreign-key field that
/// stores the target's identity in the owning document. The resolved target
/// is cached after first access; the cache is dropped whenever the owning
/// document is cleared, so clones never alias a previously resolved target.
#[derive(Clone)]
pub struct RefSpec {
    target_model: String,
    fk_field: String,
    cached: Option<SharedDocument>,
}

impl RefSpec {
    pub fn new(target_model: &str, fk_field: &str) -> Self {
        RefSpec {
            target_model: target_model.to_string(),
            fk_field: fk_field.to_string(),
            cached: None,
        }
    }

    /// The model name the reference points at.
    pub fn target_model(&self) -> &str {
        &self.target_model
    }

    /// The field holding the referenced document's identity.
    pub fn fk_field(&self) -> &str {
        &self.fk_field
    }

    /// The resolved target, if one has been materialized or assigned.
    pub fn cached(&self) -> Option<SharedDocument> {
        self.cached.clone()
    }

    pub(crate) fn set_cached(&mut self, target: SharedDocument) {
        self.cached = Some(target);
    }

    pub(crate) fn clear_cache(&mut self) {
        self.cached = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_spec_accessors() {
        let spec = RefSpec::new("user", "author_id");
        assert_eq!(spec.target_model(), "user");
        assert_eq!(spec.fk_field(), "author_id");
        assert!(spec.cached().is_none());
    }
}
