use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet};

use crate::collection::Document;
use crate::common::{
    Value, FIELD_SEPARATOR, OP_BIT, OP_INC, OP_POP, OP_PULL, OP_PULL_ALL, OP_PUSH, OP_PUSH_ALL,
    OP_SET, OP_UNSET,
};
use crate::errors::{DocmapError, DocmapResult, ErrorKind};

/// The atomic operator kinds understood by the store.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Deserialize, serde::Serialize)]
pub enum Operator {
    Set,
    Unset,
    Inc,
    Push,
    PushAll,
    Pop,
    Pull,
    PullAll,
    Bit,
}

impl Operator {
    /// The operator token in the store's native vocabulary.
    pub fn token(&self) -> &'static str {
        match self {
            Operator::Set => OP_SET,
            Operator::Unset => OP_UNSET,
            Operator::Inc => OP_INC,
            Operator::Push => OP_PUSH,
            Operator::PushAll => OP_PUSH_ALL,
            Operator::Pop => OP_POP,
            Operator::Pull => OP_PULL,
            Operator::PullAll => OP_PULL_ALL,
            Operator::Bit => OP_BIT,
        }
    }
}

/// Accumulates atomic-operator calls into a canonical operation document.
///
/// Buckets are keyed by [Operator] in first-use order; each bucket maps a
/// field path to its operator payload. The merge rules are the heart of the
/// compiler:
///
/// * `set`/`unset`/`bit` are last-write-wins on their slot.
/// * `inc` deltas add together.
/// * A second `push` (or `pull`) for the same field collapses the singular
///   entry into the plural bucket (`pushAll`/`pullAll`) — never the reverse.
/// * `pushAll`/`pullAll` concatenate onto an existing entry.
/// * `pop` and `shift` share one slot per field with a direction flag
///   (`+1` tail, `-1` head); the second call silently overwrites the first.
///
/// Operators express deltas, not final values: repeated identical calls keep
/// accumulating (two `inc(1)` calls compile to `inc(2)`).
#[derive(Clone, Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct UpdateOps {
    buckets: IndexMap<Operator, BTreeMap<String, Value>>,
}

impl UpdateOps {
    pub fn new() -> Self {
        UpdateOps::default()
    }

    /// True when no operator calls have accumulated.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Discards all accumulated operations.
    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Overwrites the `set` slot for the field unconditionally.
    pub fn set(&mut self, field: &str, value: Value) {
        self.bucket(Operator::Set).insert(field.to_string(), value);
    }

    /// Marks the field for removal; the payload is a unit marker the store
    /// turns into its remove-field signal.
    pub fn unset(&mut self, field: &str) {
        self.bucket(Operator::Unset).insert(field.to_string(), Value::I32(1));
    }

    /// Adds an increment delta for the field, merging with any pending delta.
    pub fn inc(&mut self, field: &str, delta: Value) -> DocmapResult<()> {
        if !delta.is_number() {
            log::error!("Increment delta for '{}' is not numeric", field);
            return Err(DocmapError::new(
                &format!("Increment delta for '{}' must be numeric", field),
                ErrorKind::ValidationError,
            ));
        }

        let bucket = self.bucket(Operator::Inc);
        let merged = match bucket.get(field) {
            Some(existing) => existing.numeric_add(&delta).ok_or_else(|| {
                DocmapError::new(
                    &format!("Pending increment for '{}' is not numeric", field),
                    ErrorKind::ValidationError,
                )
            })?,
            None => delta,
        };
        bucket.insert(field.to_string(), merged);
        Ok(())
    }

    /// Appends a single value for the field.
    ///
    /// A second push for the same field collapses into `pushAll` with both
    /// values; if a `pushAll` entry already exists the value appends to it.
    pub fn push(&mut self, field: &str, value: Value) {
        self.push_singular(Operator::Push, Operator::PushAll, field, value);
    }

    /// Appends multiple values for the field, concatenating onto any pending
    /// `pushAll` entry.
    pub fn push_all(&mut self, field: &str, values: Vec<Value>) {
        self.push_plural(Operator::PushAll, field, values);
    }

    /// Removes the last element of the array field (`+1`).
    pub fn pop(&mut self, field: &str) {
        self.bucket(Operator::Pop).insert(field.to_string(), Value::I32(1));
    }

    /// Removes the first element of the array field (`-1`).
    ///
    /// Shares the `pop` slot; calling both `pop` and `shift` on one field
    /// before saving is last-write-wins.
    pub fn shift(&mut self, field: &str) {
        self.bucket(Operator::Pop).insert(field.to_string(), Value::I32(-1));
    }

    /// Removes matching values from the field; mirrors [push] including the
    /// singular-to-plural collapse into `pullAll`.
    ///
    /// [push]: UpdateOps::push
    pub fn pull(&mut self, field: &str, value: Value) {
        self.push_singular(Operator::Pull, Operator::PullAll, field, value);
    }

    /// Removes multiple values from the field; mirrors [push_all].
    ///
    /// [push_all]: UpdateOps::push_all
    pub fn pull_all(&mut self, field: &str, values: Vec<Value>) {
        self.push_plural(Operator::PullAll, field, values);
    }

    /// Overwrites the `bit` slot for the field unconditionally.
    pub fn bit(&mut self, field: &str, value: Value) {
        self.bucket(Operator::Bit).insert(field.to_string(), value);
    }

    /// Returns the payload pending for an operator and field, if any.
    pub fn entry(&self, operator: Operator, field: &str) -> Option<&Value> {
        self.buckets.get(&operator).and_then(|bucket| bucket.get(field))
    }

    /// Top-level field names touched by any pending operator, truncated at
    /// the first path separator.
    pub fn top_level_fields(&self) -> BTreeSet<String> {
        self.buckets
            .values()
            .flat_map(|bucket| bucket.keys())
            .map(|field| {
                field
                    .split(FIELD_SEPARATOR)
                    .next()
                    .unwrap_or(field.as_str())
                    .to_string()
            })
            .collect()
    }

    /// Merges caller-supplied operations over these, bucket by bucket.
    ///
    /// On operator collision the caller's bucket takes precedence wholesale.
    pub fn merge_over(&self, extra: &UpdateOps) -> UpdateOps {
        let mut merged = self.clone();
        for (operator, bucket) in extra.buckets.iter() {
            merged.buckets.insert(*operator, bucket.clone());
        }
        merged
    }

    /// Compiles the accumulated operations into the operation document shape
    /// submitted to the collection interface.
    pub fn to_document(&self) -> Document {
        let mut compiled = Document::new();
        for (operator, bucket) in self.buckets.iter() {
            let mut payload = Document::new();
            for (field, value) in bucket.iter() {
                payload.put_literal(field, value.clone());
            }
            compiled.put_literal(operator.token(), Value::Document(payload));
        }
        compiled
    }

    fn bucket(&mut self, operator: Operator) -> &mut BTreeMap<String, Value> {
        self.buckets.entry(operator).or_default()
    }

    fn push_singular(&mut self, singular: Operator, plural: Operator, field: &str, value: Value) {
        // plural entry present: append to it
        if let Some(Value::Array(values)) =
            self.buckets.get_mut(&plural).and_then(|bucket| bucket.get_mut(field))
        {
            values.push(value);
            return;
        }

        // singular entry present: collapse both values into the plural form
        let pending = self
            .buckets
            .get_mut(&singular)
            .and_then(|bucket| bucket.remove(field));
        if let Some(previous) = pending {
            if let Some(bucket) = self.buckets.get(&singular) {
                if bucket.is_empty() {
                    self.buckets.shift_remove(&singular);
                }
            }
            self.bucket(plural)
                .insert(field.to_string(), Value::Array(vec![previous, value]));
            return;
        }

        self.bucket(singular).insert(field.to_string(), value);
    }

    fn push_plural(&mut self, plural: Operator, field: &str, values: Vec<Value>) {
        if let Some(Value::Array(existing)) =
            self.buckets.get_mut(&plural).and_then(|bucket| bucket.get_mut(field))
        {
            existing.extend(values);
        } else {
            self.bucket(plural).insert(field.to_string(), Value::Array(values));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_collapses_to_push_all() {
        let mut ops = UpdateOps::new();
        ops.push("tags", Value::from("a"));
        ops.push("tags", Value::from("b"));

        assert!(ops.entry(Operator::Push, "tags").is_none());
        assert_eq!(
            ops.entry(Operator::PushAll, "tags"),
            Some(&Value::Array(vec![Value::from("a"), Value::from("b")]))
        );
    }

    #[test]
    fn test_push_appends_to_existing_push_all() {
        let mut ops = UpdateOps::new();
        ops.push_all("tags", vec![Value::from("a")]);
        ops.push("tags", Value::from("b"));

        assert_eq!(
            ops.entry(Operator::PushAll, "tags"),
            Some(&Value::Array(vec![Value::from("a"), Value::from("b")]))
        );
    }

    #[test]
    fn test_push_all_concatenates() {
        let mut ops = UpdateOps::new();
        ops.push_all("tags", vec![Value::from("a")]);
        ops.push_all("tags", vec![Value::from("b"), Value::from("c")]);

        assert_eq!(
            ops.entry(Operator::PushAll, "tags"),
            Some(&Value::Array(vec![
                Value::from("a"),
                Value::from("b"),
                Value::from("c")
            ]))
        );
    }

    #[test]
    fn test_collapse_is_per_field() {
        let mut ops = UpdateOps::new();
        ops.push("tags", Value::from("a"));
        ops.push("roles", Value::from("admin"));
        ops.push("tags", Value::from("b"));

        // roles keeps its singular entry, only tags collapsed
        assert_eq!(ops.entry(Operator::Push, "roles"), Some(&Value::from("admin")));
        assert!(ops.entry(Operator::PushAll, "tags").is_some());
    }

    #[test]
    fn test_inc_merges_deltas() {
        let mut ops = UpdateOps::new();
        ops.inc("hits", Value::I32(2)).unwrap();
        ops.inc("hits", Value::I32(3)).unwrap();

        assert_eq!(ops.entry(Operator::Inc, "hits"), Some(&Value::I64(5)));
    }

    #[test]
    fn test_inc_rejects_non_numeric() {
        let mut ops = UpdateOps::new();
        let result = ops.inc("hits", Value::from("two"));
        assert!(result.is_err());
        assert_eq!(result.err().unwrap().kind(), &ErrorKind::ValidationError);
    }

    #[test]
    fn test_pull_mirrors_push() {
        let mut ops = UpdateOps::new();
        ops.pull("roles", Value::from("admin"));
        ops.pull("roles", Value::from("ops"));

        assert!(ops.entry(Operator::Pull, "roles").is_none());
        assert_eq!(
            ops.entry(Operator::PullAll, "roles"),
            Some(&Value::Array(vec![Value::from("admin"), Value::from("ops")]))
        );
    }

    #[test]
    fn test_set_unset_bit_last_write_wins() {
        let mut ops = UpdateOps::new();
        ops.set("name", Value::from("a"));
        ops.set("name", Value::from("b"));
        assert_eq!(ops.entry(Operator::Set, "name"), Some(&Value::from("b")));

        ops.unset("name");
        assert_eq!(ops.entry(Operator::Unset, "name"), Some(&Value::I32(1)));

        ops.bit("flags", Value::Document(crate::doc! { and: 4 }));
        ops.bit("flags", Value::Document(crate::doc! { or: 2 }));
        assert_eq!(
            ops.entry(Operator::Bit, "flags"),
            Some(&Value::Document(crate::doc! { or: 2 }))
        );
    }

    #[test]
    fn test_pop_and_shift_share_one_slot() {
        let mut ops = UpdateOps::new();
        ops.pop("items");
        assert_eq!(ops.entry(Operator::Pop, "items"), Some(&Value::I32(1)));

        ops.shift("items");
        assert_eq!(ops.entry(Operator::Pop, "items"), Some(&Value::I32(-1)));
    }

    #[test]
    fn test_top_level_fields_truncate_at_separator() {
        let mut ops = UpdateOps::new();
        ops.set("stats.hits", Value::I32(1));
        ops.push("roles", Value::from("admin"));

        let fields = ops.top_level_fields();
        assert!(fields.contains("stats"));
        assert!(fields.contains("roles"));
        assert!(!fields.contains("stats.hits"));
    }

    #[test]
    fn test_merge_over_caller_bucket_wins() {
        let mut ours = UpdateOps::new();
        ours.set("a", Value::I32(1));
        ours.inc("hits", Value::I32(1)).unwrap();

        let mut extra = UpdateOps::new();
        extra.set("b", Value::I32(2));

        let merged = ours.merge_over(&extra);
        // caller's set bucket replaced ours wholesale
        assert!(merged.entry(Operator::Set, "a").is_none());
        assert_eq!(merged.entry(Operator::Set, "b"), Some(&Value::I32(2)));
        // untouched buckets survive
        assert_eq!(merged.entry(Operator::Inc, "hits"), Some(&Value::I32(1)));
    }

    #[test]
    fn test_to_document_uses_operator_tokens() {
        let mut ops = UpdateOps::new();
        ops.set("name", Value::from("Mongo"));
        ops.inc("hits", Value::I32(1)).unwrap();
        ops.set("stats.errors", Value::I32(0));

        let compiled = ops.to_document();
        assert_eq!(compiled.get("$set").as_document().unwrap().get("name"), Value::from("Mongo"));
        assert_eq!(compiled.get("$inc").as_document().unwrap().get("hits"), Value::I32(1));

        // dotted field paths stay literal keys in the payload
        let set_payload = compiled.get("$set");
        let set_payload = set_payload.as_document().unwrap();
        assert!(set_payload.contains_key("stats.errors"));
    }

    #[test]
    fn test_clear() {
        let mut ops = UpdateOps::new();
        ops.set("a", Value::I32(1));
        assert!(!ops.is_empty());
        ops.clear();
        assert!(ops.is_empty());
    }
}
