use itertools::Itertools;
use std::collections::BTreeMap;

use crate::common::{DOC_ID, FIELD_SEPARATOR, ID_ALIAS};

/// Translates user-facing field names to storage-canonical names.
///
/// An `AliasMap` holds public-name to canonical-name pairs; the identity
/// alias `"id"` -> `"_id"` is always present. Resolution never fails:
/// a name with no alias entry passes through unchanged, treated as already
/// canonical.
///
/// When dot-paths are allowed, each path segment is resolved independently,
/// so aliases apply to nested-document field names at any depth.
#[derive(Clone, Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct AliasMap {
    // public -> canonical
    forward: BTreeMap<String, String>,
    // canonical -> public, last-write-wins
    reverse: BTreeMap<String, String>,
}

impl AliasMap {
    pub fn new() -> Self {
        AliasMap::default()
    }

    /// Registers an alias from a public name to a canonical name.
    ///
    /// The identity alias is fixed; attempts to remap `"id"` are ignored.
    pub fn insert(&mut self, public: &str, canonical: &str) {
        if public == ID_ALIAS {
            log::debug!("Ignoring attempt to remap the fixed identity alias");
            return;
        }
        self.forward.insert(public.to_string(), canonical.to_string());
        self.reverse.insert(canonical.to_string(), public.to_string());
    }

    /// Resolves a user-facing name to its canonical form.
    ///
    /// With `allow_dot_path`, each separator-delimited segment resolves
    /// independently and the result is rejoined.
    pub fn resolve(&self, name: &str, allow_dot_path: bool) -> String {
        if allow_dot_path && name.contains(FIELD_SEPARATOR) {
            name.split(FIELD_SEPARATOR)
                .map(|segment| self.resolve_segment(segment))
                .join(&FIELD_SEPARATOR.to_string())
        } else {
            self.resolve_segment(name).to_string()
        }
    }

    /// Returns the public name for a canonical name, if one is registered.
    pub fn public_name<'a>(&'a self, canonical: &'a str) -> &'a str {
        if canonical == DOC_ID {
            return ID_ALIAS;
        }
        self.reverse.get(canonical).map(String::as_str).unwrap_or(canonical)
    }

    fn resolve_segment<'a>(&'a self, segment: &'a str) -> &'a str {
        if segment == ID_ALIAS {
            return DOC_ID;
        }
        self.forward.get(segment).map(String::as_str).unwrap_or(segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_always_resolves_to_identity_field() {
        let aliases = AliasMap::new();
        assert_eq!(aliases.resolve("id", false), "_id");
        assert_eq!(aliases.resolve("id", true), "_id");
    }

    #[test]
    fn test_unresolvable_names_pass_through() {
        let aliases = AliasMap::new();
        assert_eq!(aliases.resolve("unknown", false), "unknown");
        assert_eq!(aliases.resolve("a.b.c", false), "a.b.c");
    }

    #[test]
    fn test_simple_alias() {
        let mut aliases = AliasMap::new();
        aliases.insert("login", "l");
        assert_eq!(aliases.resolve("login", false), "l");
        assert_eq!(aliases.resolve("login", true), "l");
    }

    #[test]
    fn test_dot_path_resolution() {
        let mut aliases = AliasMap::new();
        aliases.insert("address", "addr");
        aliases.insert("zipcode", "zip");

        assert_eq!(aliases.resolve("address.zipcode", true), "addr.zip");
        // without dot-path allowance the whole name is looked up as one key
        assert_eq!(aliases.resolve("address.zipcode", false), "address.zipcode");
    }

    #[test]
    fn test_id_resolves_at_any_depth() {
        let aliases = AliasMap::new();
        assert_eq!(aliases.resolve("user.id", true), "user._id");
    }

    #[test]
    fn test_remapping_id_is_ignored() {
        let mut aliases = AliasMap::new();
        aliases.insert("id", "custom");
        assert_eq!(aliases.resolve("id", false), "_id");
    }

    #[test]
    fn test_public_name() {
        let mut aliases = AliasMap::new();
        aliases.insert("login", "l");
        assert_eq!(aliases.public_name("l"), "login");
        assert_eq!(aliases.public_name("_id"), "id");
        assert_eq!(aliases.public_name("other"), "other");
    }

    #[test]
    fn test_public_name_collision_last_write_wins() {
        let mut aliases = AliasMap::new();
        aliases.insert("first", "f");
        aliases.insert("second", "f");
        assert_eq!(aliases.public_name("f"), "second");
    }
}
