use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::collection::{upsert, Collection, DocKey, Document, UpdateOptions};
use crate::common::{Value, DOC_ID, FIELD_SEPARATOR};
use crate::errors::{DocmapError, DocmapResult, ErrorKind};
use crate::mapper::alias::AliasMap;
use crate::mapper::builder::MappedDocumentBuilder;
use crate::mapper::hooks::{LifecycleHooks, NoopHooks, SaveMode};
use crate::mapper::reference::RefSpec;
use crate::mapper::registry;
use crate::mapper::update_ops::UpdateOps;
use crate::mapper::SharedDocument;

/// Criteria forms accepted by [MappedDocument::load].
///
/// `Implied` derives the filter from in-memory state: the identity when one
/// is present, otherwise the whole in-memory document. A raw string that
/// begins with `{` is parsed as a JSON filter expression; any other string
/// is treated as an identity value.
#[derive(Clone, Debug)]
pub enum Criteria {
    Implied,
    Id(Value),
    Raw(String),
    Filter(Document),
}

/// A change-tracking view over one stored document.
///
/// A mapped document separates two mutation styles and compiles both into a
/// single minimal write on save:
///
/// * Field assignment through [set] records the new value in memory and
///   marks the field changed; changed fields become insert values or fold
///   into the `set` operator bucket.
/// * Atomic operator calls ([inc], [push], [pull], ...) accumulate in an
///   [UpdateOps] compiler without touching in-memory values, and mark their
///   top-level field dirty.
///
/// The dirty marks survive a save: an operator's effect is computed by the
/// store, so the next read of a dirty field reloads the document to observe
/// the stored result. A field read on a document that has an identity but
/// was never loaded triggers a lazy load first, unless the identity itself
/// is a pending change (a fresh document headed for insert).
///
/// # Usage
///
/// ```rust,ignore
/// let mut page = MappedDocument::new(collection);
/// page.set("title", "Home")?;
/// page.inc("hits", 1)?.push("tags", Value::from("landing"));
/// page.save(true)?;
///
/// // the store computed hits; this read reloads to observe it
/// let hits = page.get("hits")?;
/// ```
///
/// [set]: MappedDocument::set
/// [inc]: MappedDocument::inc
/// [push]: MappedDocument::push
/// [pull]: MappedDocument::pull
pub struct MappedDocument {
    pub(crate) collection: Collection,
    pub(crate) hooks: Arc<dyn LifecycleHooks>,
    pub(crate) aliases: AliasMap,
    pub(crate) fields: Document,
    pub(crate) changed: BTreeSet<String>,
    pub(crate) ops: UpdateOps,
    pub(crate) dirty: BTreeSet<String>,
    pub(crate) loaded: bool,
    pub(crate) refs: BTreeMap<String, RefSpec>,
}

impl MappedDocument {
    /// Creates an empty mapped document over a collection, with no aliases,
    /// no references, and no-op hooks.
    pub fn new(collection: Collection) -> Self {
        MappedDocument {
            collection,
            hooks: Arc::new(NoopHooks),
            aliases: AliasMap::new(),
            fields: Document::new(),
            changed: BTreeSet::new(),
            ops: UpdateOps::new(),
            dirty: BTreeSet::new(),
            loaded: false,
            refs: BTreeMap::new(),
        }
    }

    /// Starts a builder for a document with aliases, references, hooks, or
    /// a pre-seeded identity.
    pub fn builder(collection: Collection) -> MappedDocumentBuilder {
        MappedDocumentBuilder::new(collection)
    }

    /// The collection this document maps to.
    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// True once a load (or an insert) has populated this document from the
    /// store.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The identity value, or [Value::Null] when none is present.
    pub fn id(&self) -> Value {
        self.fields.get(DOC_ID)
    }

    /// True when an identity value is present in memory.
    pub fn has_id(&self) -> bool {
        !self.id().is_null()
    }

    /// The operator calls accumulated since the last save.
    pub fn operations(&self) -> &UpdateOps {
        &self.ops
    }

    /// Returns whether anything is pending: with a field name, true iff that
    /// field is changed or dirty; without one, true iff any assignment or
    /// operator call is pending.
    pub fn is_changed(&self, name: Option<&str>) -> bool {
        match name {
            None => !self.changed.is_empty() || !self.ops.is_empty(),
            Some(name) => {
                let canonical = self.aliases.resolve(name, true);
                self.changed.contains(&canonical) || self.dirty.contains(&canonical)
            }
        }
    }

    /// Reads a field by its public name.
    ///
    /// May round-trip to the store: a dirty field with no operators pending
    /// reloads the document to observe store-computed results, and a
    /// document with an identity that was never loaded loads lazily on the
    /// first read.
    ///
    /// # Errors
    ///
    /// Fails with [ErrorKind::InvalidOperation] when the name designates a
    /// reference; use [reference] for those.
    ///
    /// [reference]: MappedDocument::reference
    pub fn get(&mut self, name: &str) -> DocmapResult<Value> {
        let canonical = self.aliases.resolve(name, false);
        if self.refs.contains_key(&canonical) {
            log::error!("Field '{}' is a reference, not a value", canonical);
            return Err(DocmapError::new(
                &format!(
                    "Field '{}' is a reference; use reference() to resolve it",
                    canonical
                ),
                ErrorKind::InvalidOperation,
            ));
        }

        if canonical == DOC_ID {
            return Ok(self.fields.get(DOC_ID));
        }

        let top = canonical
            .split(FIELD_SEPARATOR)
            .next()
            .unwrap_or(canonical.as_str())
            .to_string();

        if self.loaded && self.ops.is_empty() && self.dirty.contains(&top) {
            // the store computed this field; re-read it
            self.load(Criteria::Implied, &[])?;
        } else if !self.loaded && self.has_id() && !self.changed.contains(DOC_ID) {
            self.load(Criteria::Implied, &[])?;
        }

        Ok(self.fields.get(&canonical))
    }

    /// Assigns a field by its public name, marking it changed.
    ///
    /// Assigning a value equal to the current one is a no-op and leaves the
    /// changed set untouched; numeric equality ignores representation width,
    /// so re-assigning `5i64` over a stored `5i32` changes nothing.
    ///
    /// # Errors
    ///
    /// Fails with [ErrorKind::TypeMismatch] when the name designates a
    /// reference, and with [ErrorKind::InvalidOperation] when assigning the
    /// identity of an already-loaded document.
    pub fn set<T: Into<Value>>(&mut self, name: &str, value: T) -> DocmapResult<()> {
        let canonical = self.aliases.resolve(name, false);
        if self.refs.contains_key(&canonical) {
            log::error!("Field '{}' is a reference, not a value", canonical);
            return Err(DocmapError::new(
                &format!(
                    "Field '{}' is a reference; use assign_reference() to set it",
                    canonical
                ),
                ErrorKind::TypeMismatch,
            ));
        }

        let mut value = value.into();
        if canonical == DOC_ID {
            if self.loaded {
                log::error!("Identity of a loaded document cannot be reassigned");
                return Err(DocmapError::new(
                    "Identity of a loaded document cannot be reassigned",
                    ErrorKind::InvalidOperation,
                ));
            }
            value = coerce_identity(value);
        }

        if self.fields.get(&canonical) == value {
            return Ok(());
        }

        self.fields.put(canonical.as_str(), value)?;
        self.changed.insert(canonical);
        Ok(())
    }

    /// Queues a `set` operator for the field without touching the in-memory
    /// value. Last write wins per field.
    pub fn set_op<T: Into<Value>>(&mut self, name: &str, value: T) -> &mut Self {
        let field = self.aliases.resolve(name, true);
        self.ops.set(&field, value.into());
        self.mark_dirty(&field);
        self
    }

    /// Queues removal of the field.
    pub fn unset(&mut self, name: &str) -> &mut Self {
        let field = self.aliases.resolve(name, true);
        self.ops.unset(&field);
        self.mark_dirty(&field);
        self
    }

    /// Queues an increment; repeated calls merge their deltas.
    ///
    /// # Errors
    ///
    /// Fails with [ErrorKind::ValidationError] for a non-numeric delta.
    pub fn inc<T: Into<Value>>(&mut self, name: &str, delta: T) -> DocmapResult<&mut Self> {
        let field = self.aliases.resolve(name, true);
        self.ops.inc(&field, delta.into())?;
        self.mark_dirty(&field);
        Ok(self)
    }

    /// Queues an append of one value to an array field. A second push for
    /// the same field collapses into a multi-value append.
    pub fn push<T: Into<Value>>(&mut self, name: &str, value: T) -> &mut Self {
        let field = self.aliases.resolve(name, true);
        self.ops.push(&field, value.into());
        self.mark_dirty(&field);
        self
    }

    /// Queues an append of multiple values to an array field.
    pub fn push_all(&mut self, name: &str, values: Vec<Value>) -> &mut Self {
        let field = self.aliases.resolve(name, true);
        self.ops.push_all(&field, values);
        self.mark_dirty(&field);
        self
    }

    /// Queues removal of the last element of an array field.
    pub fn pop(&mut self, name: &str) -> &mut Self {
        let field = self.aliases.resolve(name, true);
        self.ops.pop(&field);
        self.mark_dirty(&field);
        self
    }

    /// Queues removal of the first element of an array field. Shares its
    /// slot with [pop]; the later call wins.
    ///
    /// [pop]: MappedDocument::pop
    pub fn shift(&mut self, name: &str) -> &mut Self {
        let field = self.aliases.resolve(name, true);
        self.ops.shift(&field);
        self.mark_dirty(&field);
        self
    }

    /// Queues removal of matching values from an array field; mirrors
    /// [push] including the collapse of repeated calls.
    ///
    /// [push]: MappedDocument::push
    pub fn pull<T: Into<Value>>(&mut self, name: &str, value: T) -> &mut Self {
        let field = self.aliases.resolve(name, true);
        self.ops.pull(&field, value.into());
        self.mark_dirty(&field);
        self
    }

    /// Queues removal of multiple values from an array field.
    pub fn pull_all(&mut self, name: &str, values: Vec<Value>) -> &mut Self {
        let field = self.aliases.resolve(name, true);
        self.ops.pull_all(&field, values);
        self.mark_dirty(&field);
        self
    }

    /// Queues a bitwise update for the field. Last write wins per field.
    pub fn bit<T: Into<Value>>(&mut self, name: &str, value: T) -> &mut Self {
        let field = self.aliases.resolve(name, true);
        self.ops.bit(&field, value.into());
        self.mark_dirty(&field);
        self
    }

    /// Loads this document from the store.
    ///
    /// On a match: clears all in-memory state, invokes `before_load`,
    /// assigns the loaded values, marks the document loaded, invokes
    /// `after_load`, and returns `true`. On a miss: returns `false` with
    /// state untouched. Projection field names resolve through the alias
    /// map; an empty projection loads the whole record.
    ///
    /// # Errors
    ///
    /// Fails with [ErrorKind::MissingCriteria] when the criteria is
    /// [Criteria::Implied] and neither an identity nor any in-memory field
    /// is available to derive a filter from.
    pub fn load(&mut self, criteria: Criteria, fields: &[String]) -> DocmapResult<bool> {
        let filter = self.build_filter(criteria)?;
        let projection: Vec<String> = fields
            .iter()
            .map(|field| self.aliases.resolve(field, true))
            .collect();

        log::debug!(
            "Loading one document from '{}' with filter {:?}",
            self.collection.name(),
            filter
        );
        let found = self.collection.find_one(&filter, &projection)?;
        let values = match found {
            Some(values) => values,
            None => {
                log::debug!("No document matched in '{}'", self.collection.name());
                return Ok(false);
            }
        };

        let hooks = Arc::clone(&self.hooks);
        self.clear();
        hooks.before_load()?;
        self.fields = values;
        self.loaded = true;
        hooks.after_load(self)?;
        Ok(true)
    }

    /// Persists pending changes, choosing between insert and update.
    ///
    /// The insert path is taken when no identity is present, or when the
    /// identity is itself a pending change; changed fields become the
    /// insert payload, and any queued operators flush as a follow-up update
    /// keyed by the identity the store assigned. Otherwise changed fields
    /// fold into the `set` operator bucket and everything submits as one
    /// update against the identity.
    ///
    /// Cached references save first: an unsaved referenced document is
    /// saved and its new identity propagates into the foreign-key field; a
    /// changed one is simply saved. A failure there aborts this save.
    ///
    /// Both paths clear the changed set and pending operations on success.
    /// Dirty marks are retained, so subsequent reads of operator-touched
    /// fields observe the store-computed results.
    ///
    /// # Errors
    ///
    /// Fails with [ErrorKind::EmptyInsert] when the insert path has nothing
    /// to write, and with [ErrorKind::InsertFailed] or
    /// [ErrorKind::UpdateFailed] when `safe` is set and the store reports
    /// an error.
    pub fn save(&mut self, safe: bool) -> DocmapResult<()> {
        self.cascade_save(safe)?;

        let hooks = Arc::clone(&self.hooks);
        if !self.has_id() || self.changed.contains(DOC_ID) {
            hooks.before_save(SaveMode::Insert, self)?;

            let mut values = Document::new();
            for field in self.changed.iter() {
                values.put(field.as_str(), self.fields.get(field))?;
            }
            if values.is_empty() {
                log::error!("Nothing to insert into '{}'", self.collection.name());
                return Err(DocmapError::new(
                    &format!("Nothing to insert into '{}'", self.collection.name()),
                    ErrorKind::EmptyInsert,
                ));
            }

            log::debug!("Inserting one document into '{}'", self.collection.name());
            let result = self.collection.insert(values, safe)?;
            if safe {
                if let Some(error) = result.error() {
                    log::error!("Insert into '{}' failed: {}", self.collection.name(), error);
                    return Err(DocmapError::new(
                        &format!("Insert into '{}' failed: {}", self.collection.name(), error),
                        ErrorKind::InsertFailed,
                    ));
                }
            }
            if !result.identity().is_null() {
                self.fields.put_literal(DOC_ID, result.identity().clone());
            }
            self.loaded = true;

            // operators queued on a fresh document flush once an identity
            // exists to key them by
            if !self.ops.is_empty() {
                let filter = self.identity_filter()?;
                let operations = self.ops.to_document();
                let applied =
                    self.collection
                        .update(&filter, &operations, &UpdateOptions::default())?;
                if safe && !applied {
                    return Err(self.store_failure("Update", ErrorKind::UpdateFailed));
                }
            }
        } else {
            hooks.before_save(SaveMode::Update, self)?;

            let changed: Vec<String> = self.changed.iter().cloned().collect();
            for field in changed {
                let value = self.fields.get(&field);
                self.ops.set(&field, value);
            }

            if !self.ops.is_empty() {
                let filter = self.identity_filter()?;
                let operations = self.ops.to_document();
                log::debug!(
                    "Updating one document in '{}' with {:?}",
                    self.collection.name(),
                    operations
                );
                let applied =
                    self.collection
                        .update(&filter, &operations, &UpdateOptions::default())?;
                if safe && !applied {
                    return Err(self.store_failure("Update", ErrorKind::UpdateFailed));
                }
            }
        }

        self.changed.clear();
        self.ops.clear();
        hooks.after_save()?;
        Ok(())
    }

    /// Submits pending operations merged with caller-supplied ones as an
    /// upsert, filtered by the entire in-memory document.
    ///
    /// On operator collision the caller's bucket wins wholesale. Tracked
    /// state clears on success; the documents the store may have created or
    /// modified are not read back.
    ///
    /// # Errors
    ///
    /// Fails with [ErrorKind::MissingCriteria] when no in-memory fields
    /// exist to filter by, and with [ErrorKind::UpsertFailed] when the
    /// store reports an error.
    pub fn upsert(&mut self, extra: &UpdateOps) -> DocmapResult<()> {
        if self.fields.is_empty() {
            log::error!("Upsert into '{}' requires criteria fields", self.collection.name());
            return Err(DocmapError::new(
                &format!(
                    "Upsert into '{}' requires criteria fields",
                    self.collection.name()
                ),
                ErrorKind::MissingCriteria,
            ));
        }

        let hooks = Arc::clone(&self.hooks);
        hooks.before_save(SaveMode::Upsert, self)?;

        let merged = self.ops.merge_over(extra);
        let filter = self.fields.clone();
        log::debug!("Upserting one document into '{}'", self.collection.name());
        let applied = self.collection.update(&filter, &merged.to_document(), &upsert())?;
        if !applied {
            return Err(self.store_failure("Upsert", ErrorKind::UpsertFailed));
        }

        self.changed.clear();
        self.ops.clear();
        hooks.after_save()?;
        Ok(())
    }

    /// Deletes the stored document this maps to, then resets all in-memory
    /// state.
    ///
    /// # Errors
    ///
    /// Fails with [ErrorKind::MissingIdentity] when no identity is present
    /// (state is left untouched), and with [ErrorKind::DeleteFailed] when
    /// the store reports an error.
    pub fn delete(&mut self) -> DocmapResult<()> {
        if !self.has_id() {
            log::error!("Delete from '{}' requires an identity", self.collection.name());
            return Err(DocmapError::new(
                &format!("Delete from '{}' requires an identity", self.collection.name()),
                ErrorKind::MissingIdentity,
            ));
        }

        let hooks = Arc::clone(&self.hooks);
        hooks.before_delete()?;

        let filter = self.identity_filter()?;
        log::debug!("Deleting one document from '{}'", self.collection.name());
        let removed = self.collection.remove(&filter, true)?;
        if !removed {
            return Err(self.store_failure("Delete", ErrorKind::DeleteFailed));
        }

        self.clear();
        hooks.after_delete()?;
        Ok(())
    }

    /// Resets all in-memory state: fields, changed set, pending operations,
    /// dirty marks, the loaded flag, and cached reference targets.
    pub fn clear(&mut self) {
        self.fields = Document::new();
        self.changed.clear();
        self.ops.clear();
        self.dirty.clear();
        self.loaded = false;
        for spec in self.refs.values_mut() {
            spec.clear_cache();
        }
    }

    /// Resolves a reference to its target document, constructing it through
    /// the model registry on first access and caching it after.
    ///
    /// The target is seeded with the current foreign-key value when one is
    /// present, so its own first field read lazily loads it.
    ///
    /// # Errors
    ///
    /// Fails with [ErrorKind::InvalidOperation] for an unknown reference
    /// name and with [ErrorKind::ModelNotFound] when the target model is
    /// not registered.
    pub fn reference(&mut self, name: &str) -> DocmapResult<SharedDocument> {
        let canonical = self.aliases.resolve(name, false);
        let (target_model, fk_field) = match self.refs.get(&canonical) {
            Some(spec) => {
                if let Some(cached) = spec.cached() {
                    return Ok(cached);
                }
                (spec.target_model().to_string(), spec.fk_field().to_string())
            }
            None => {
                log::error!("No reference named '{}'", canonical);
                return Err(DocmapError::new(
                    &format!("No reference named '{}'", canonical),
                    ErrorKind::InvalidOperation,
                ));
            }
        };

        let fk_value = self.get(&fk_field)?;
        let identity = if fk_value.is_null() { None } else { Some(fk_value) };
        let target = registry::factory(&target_model, identity)?;
        if let Some(spec) = self.refs.get_mut(&canonical) {
            spec.set_cached(target.clone());
        }
        Ok(target)
    }

    /// Assigns a reference target, caching it and copying its identity (when
    /// it has one) into the foreign-key field as a tracked change.
    ///
    /// A target with no identity yet is still accepted: its identity
    /// propagates when the owning document saves and cascades.
    pub fn assign_reference(&mut self, name: &str, target: SharedDocument) -> DocmapResult<()> {
        let canonical = self.aliases.resolve(name, false);
        let fk_field = match self.refs.get(&canonical) {
            Some(spec) => spec.fk_field().to_string(),
            None => {
                log::error!("No reference named '{}'", canonical);
                return Err(DocmapError::new(
                    &format!("No reference named '{}'", canonical),
                    ErrorKind::InvalidOperation,
                ));
            }
        };

        let identity = target.lock().id();
        if !identity.is_null() {
            self.set(&fk_field, identity)?;
        }
        if let Some(spec) = self.refs.get_mut(&canonical) {
            spec.set_cached(target);
        }
        Ok(())
    }

    /// Copies the in-memory fields out as a plain document. With `aliased`,
    /// top-level canonical names map back to their public names.
    pub fn to_document(&self, aliased: bool) -> Document {
        if !aliased {
            return self.fields.clone();
        }
        let mut out = Document::new();
        for (key, value) in self.fields.iter() {
            out.put_literal(self.aliases.public_name(key), value.clone());
        }
        out
    }

    /// Seeds an identity assumed to already exist in the store.
    ///
    /// The identity lands in the field map without joining the changed set,
    /// so a save takes the update path and a field read lazily loads.
    pub fn seed_identity(&mut self, identity: Value) {
        self.fields.put_literal(DOC_ID, coerce_identity(identity));
    }

    fn mark_dirty(&mut self, field: &str) {
        let top = field
            .split(FIELD_SEPARATOR)
            .next()
            .unwrap_or(field)
            .to_string();
        self.dirty.insert(top);
    }

    fn identity_filter(&self) -> DocmapResult<Document> {
        let identity = self.fields.get(DOC_ID);
        if identity.is_null() {
            log::error!("No identity to filter '{}' by", self.collection.name());
            return Err(DocmapError::new(
                &format!("No identity to filter '{}' by", self.collection.name()),
                ErrorKind::MissingIdentity,
            ));
        }
        let mut filter = Document::new();
        filter.put_literal(DOC_ID, identity);
        Ok(filter)
    }

    fn build_filter(&self, criteria: Criteria) -> DocmapResult<Document> {
        match criteria {
            Criteria::Implied => {
                if self.has_id() {
                    self.identity_filter()
                } else if !self.fields.is_empty() {
                    Ok(self.fields.clone())
                } else {
                    log::error!(
                        "Load from '{}' requires criteria or in-memory state",
                        self.collection.name()
                    );
                    Err(DocmapError::new(
                        &format!(
                            "Load from '{}' requires criteria or in-memory state",
                            self.collection.name()
                        ),
                        ErrorKind::MissingCriteria,
                    ))
                }
            }
            Criteria::Id(value) => {
                let mut filter = Document::new();
                filter.put_literal(DOC_ID, coerce_identity(value));
                Ok(filter)
            }
            Criteria::Raw(text) => {
                if text.trim_start().starts_with('{') {
                    let parsed: serde_json::Value = serde_json::from_str(&text)?;
                    let object = parsed.as_object().ok_or_else(|| {
                        log::error!("Filter expression must be a JSON object");
                        DocmapError::new(
                            "Filter expression must be a JSON object",
                            ErrorKind::ValidationError,
                        )
                    })?;

                    let mut filter = Document::new();
                    for (key, raw) in object {
                        let canonical = self.aliases.resolve(key, true);
                        let mut value = json_value(raw.clone());
                        if canonical == DOC_ID {
                            value = coerce_identity(value);
                        }
                        filter.put_literal(&canonical, value);
                    }
                    Ok(filter)
                } else {
                    let mut filter = Document::new();
                    filter.put_literal(DOC_ID, coerce_identity(Value::String(text)));
                    Ok(filter)
                }
            }
            Criteria::Filter(document) => {
                let mut filter = Document::new();
                for (key, value) in document.iter() {
                    let canonical = self.aliases.resolve(key, true);
                    let mut value = value.clone();
                    if canonical == DOC_ID {
                        value = coerce_identity(value);
                    }
                    filter.put_literal(&canonical, value);
                }
                Ok(filter)
            }
        }
    }

    fn cascade_save(&mut self, safe: bool) -> DocmapResult<()> {
        let names: Vec<String> = self.refs.keys().cloned().collect();
        for name in names {
            let (target, fk_field) = match self.refs.get(&name) {
                Some(spec) => match spec.cached() {
                    Some(target) => (target, spec.fk_field().to_string()),
                    None => continue,
                },
                None => continue,
            };

            let mut guard = target.lock();
            if !guard.has_id() {
                log::debug!("Cascading save into unsaved reference '{}'", name);
                guard.save(safe)?;
                let identity = guard.id();
                drop(guard);
                self.set(&fk_field, identity)?;
            } else if guard.is_changed(None) {
                log::debug!("Cascading save into changed reference '{}'", name);
                guard.save(safe)?;
            }
        }
        Ok(())
    }

    fn store_failure(&self, action: &str, kind: ErrorKind) -> DocmapError {
        let message = format!("{} against '{}' failed", action, self.collection.name());
        log::error!("{}", message);
        match self.collection.last_error() {
            Some(cause) => DocmapError::new_with_cause(
                &message,
                kind,
                DocmapError::new(&cause, ErrorKind::InternalError),
            ),
            None => DocmapError::new(&message, kind),
        }
    }
}

fn coerce_identity(value: Value) -> Value {
    if let Value::String(text) = &value {
        if let Ok(key) = DocKey::parse(text) {
            return Value::Key(key);
        }
    }
    value
}

fn json_value(raw: serde_json::Value) -> Value {
    match raw {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(flag) => Value::Bool(flag),
        serde_json::Value::Number(number) => match number.as_i64() {
            Some(integer) => Value::I64(integer),
            None => Value::F64(number.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(text) => Value::String(text),
        serde_json::Value::Array(items) => {
            Value::Array(items.into_iter().map(json_value).collect())
        }
        serde_json::Value::Object(map) => {
            let mut document = Document::new();
            for (key, value) in map {
                document.put_literal(&key, json_value(value));
            }
            Value::Document(document)
        }
    }
}
