use parking_lot::RwLock;

use crate::collection::{CollectionProvider, DocKey, Document, InsertResult, UpdateOptions};
use crate::common::{
    Value, DOC_ID, OP_BIT, OP_INC, OP_POP, OP_PULL, OP_PULL_ALL, OP_PUSH, OP_PUSH_ALL, OP_SET,
    OP_UNSET,
};
use crate::errors::{DocmapError, DocmapResult, ErrorKind};

/// An in-memory [CollectionProvider] that applies the full atomic-operator
/// vocabulary server-side.
///
/// Records live in process memory; every operator in an update document is
/// applied against the stored record, so a reload after an `$inc` or `$pull`
/// observes the store-computed result exactly as it would against a real
/// backend. Useful as the default backend for tests and examples.
pub struct MemoryCollection {
    name: String,
    records: RwLock<Vec<Document>>,
    last_error: RwLock<Option<String>>,
}

impl MemoryCollection {
    /// Creates a new empty in-memory collection.
    pub fn new(name: &str) -> Self {
        MemoryCollection {
            name: name.to_string(),
            records: RwLock::new(Vec::new()),
            last_error: RwLock::new(None),
        }
    }

    /// Returns the number of stored records.
    pub fn size(&self) -> usize {
        self.records.read().len()
    }

    fn matches(record: &Document, filter: &Document) -> bool {
        filter.iter().all(|(key, expected)| &record.get(key) == expected)
    }

    fn project(record: &Document, fields: &[String]) -> Document {
        if fields.is_empty() {
            return record.clone();
        }

        let mut projected = Document::new();
        let id = record.get(DOC_ID);
        if !id.is_null() {
            let _ = projected.put(DOC_ID, id);
        }
        for field in fields {
            let value = record.get(field);
            if !value.is_null() {
                let _ = projected.put(field.as_str(), value);
            }
        }
        projected
    }

    fn fail(&self, message: String) -> bool {
        log::error!("{}: {}", self.name, message);
        *self.last_error.write() = Some(message);
        false
    }

    fn apply_operations(record: &mut Document, operations: &Document) -> DocmapResult<()> {
        for (token, payload) in operations.iter() {
            let entries = payload.as_document().ok_or_else(|| {
                DocmapError::new(
                    &format!("Operator {} payload must be a document", token),
                    ErrorKind::ValidationError,
                )
            })?;

            for (field, arg) in entries.iter() {
                Self::apply_one(record, token, field, arg)?;
            }
        }
        Ok(())
    }

    fn apply_one(record: &mut Document, token: &str, field: &str, arg: &Value) -> DocmapResult<()> {
        match token {
            OP_SET => record.put(field, arg.clone()),
            OP_UNSET => record.remove(field),
            OP_INC => {
                let current = record.get(field);
                if current.is_null() {
                    record.put(field, arg.clone())
                } else {
                    let sum = current.numeric_add(arg).ok_or_else(|| {
                        DocmapError::new(
                            &format!("Cannot increment non-numeric field '{}'", field),
                            ErrorKind::ValidationError,
                        )
                    })?;
                    record.put(field, sum)
                }
            }
            OP_PUSH => Self::push_values(record, field, std::slice::from_ref(arg)),
            OP_PUSH_ALL => {
                let values = arg.as_array().ok_or_else(|| {
                    DocmapError::new(
                        &format!("$pushAll for '{}' requires an array", field),
                        ErrorKind::ValidationError,
                    )
                })?;
                Self::push_values(record, field, values)
            }
            OP_POP => {
                let mut items = Self::take_array(record, field)?;
                if !items.is_empty() {
                    if arg.as_i64() == Some(-1) {
                        items.remove(0);
                    } else {
                        items.pop();
                    }
                }
                record.put(field, Value::Array(items))
            }
            OP_PULL => {
                let items = Self::take_array(record, field)?;
                let kept: Vec<Value> = items.into_iter().filter(|v| v != arg).collect();
                record.put(field, Value::Array(kept))
            }
            OP_PULL_ALL => {
                let remove = arg.as_array().ok_or_else(|| {
                    DocmapError::new(
                        &format!("$pullAll for '{}' requires an array", field),
                        ErrorKind::ValidationError,
                    )
                })?;
                let items = Self::take_array(record, field)?;
                let kept: Vec<Value> =
                    items.into_iter().filter(|v| !remove.contains(v)).collect();
                record.put(field, Value::Array(kept))
            }
            OP_BIT => {
                let spec = arg.as_document().ok_or_else(|| {
                    DocmapError::new(
                        &format!("$bit for '{}' requires a document payload", field),
                        ErrorKind::ValidationError,
                    )
                })?;
                let mut current = record.get(field).as_i64().ok_or_else(|| {
                    DocmapError::new(
                        &format!("Cannot apply $bit to non-integer field '{}'", field),
                        ErrorKind::ValidationError,
                    )
                })?;
                for (op, operand) in spec.iter() {
                    let operand = operand.as_i64().ok_or_else(|| {
                        DocmapError::new(
                            &format!("$bit operand for '{}' must be an integer", field),
                            ErrorKind::ValidationError,
                        )
                    })?;
                    current = match op.as_str() {
                        "and" => current & operand,
                        "or" => current | operand,
                        "xor" => current ^ operand,
                        other => {
                            return Err(DocmapError::new(
                                &format!("Unknown $bit operation '{}'", other),
                                ErrorKind::ValidationError,
                            ))
                        }
                    };
                }
                record.put(field, Value::I64(current))
            }
            other => Err(DocmapError::new(
                &format!("Unknown operator token '{}'", other),
                ErrorKind::ValidationError,
            )),
        }
    }

    fn push_values(record: &mut Document, field: &str, values: &[Value]) -> DocmapResult<()> {
        let mut items = Self::take_array(record, field)?;
        items.extend(values.iter().cloned());
        record.put(field, Value::Array(items))
    }

    fn take_array(record: &Document, field: &str) -> DocmapResult<Vec<Value>> {
        match record.get(field) {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => Ok(items),
            _ => Err(DocmapError::new(
                &format!("Field '{}' is not an array", field),
                ErrorKind::ValidationError,
            )),
        }
    }
}

impl CollectionProvider for MemoryCollection {
    fn find_one(&self, filter: &Document, fields: &[String]) -> DocmapResult<Option<Document>> {
        let records = self.records.read();
        Ok(records
            .iter()
            .find(|record| Self::matches(record, filter))
            .map(|record| Self::project(record, fields)))
    }

    fn insert(&self, mut values: Document, safe: bool) -> DocmapResult<InsertResult> {
        let identity = match values.get(DOC_ID) {
            Value::Null => {
                let key = Value::Key(DocKey::new());
                values.put(DOC_ID, key.clone())?;
                key
            }
            existing => existing,
        };

        let mut records = self.records.write();
        if records.iter().any(|record| record.get(DOC_ID) == identity) {
            let message = format!("Duplicate identity {} in '{}'", identity, self.name);
            if safe {
                log::error!("{}", message);
            }
            return Ok(InsertResult::new(identity, Some(message)));
        }

        log::debug!("Inserting record {} into '{}'", identity, self.name);
        records.push(values);
        Ok(InsertResult::new(identity, None))
    }

    fn update(
        &self,
        filter: &Document,
        operations: &Document,
        options: &UpdateOptions,
    ) -> DocmapResult<bool> {
        let mut records = self.records.write();
        let position = records.iter().position(|record| Self::matches(record, filter));

        match position {
            Some(index) => {
                let mut updated = records[index].clone();
                match Self::apply_operations(&mut updated, operations) {
                    Ok(()) => {
                        records[index] = updated;
                        Ok(true)
                    }
                    Err(err) => Ok(self.fail(err.message().to_string())),
                }
            }
            None if options.is_upsert() => {
                // seed a new record from the equality pairs of the filter
                let mut record = Document::new();
                for (key, value) in filter.iter() {
                    record.put(key.as_str(), value.clone())?;
                }
                if record.get(DOC_ID).is_null() {
                    record.put(DOC_ID, Value::Key(DocKey::new()))?;
                }
                match Self::apply_operations(&mut record, operations) {
                    Ok(()) => {
                        log::debug!("Upserted new record into '{}'", self.name);
                        records.push(record);
                        Ok(true)
                    }
                    Err(err) => Ok(self.fail(err.message().to_string())),
                }
            }
            None => Ok(true),
        }
    }

    fn remove(&self, filter: &Document, just_once: bool) -> DocmapResult<bool> {
        let mut records = self.records.write();
        if just_once {
            if let Some(index) = records.iter().position(|record| Self::matches(record, filter)) {
                records.remove(index);
            }
        } else {
            records.retain(|record| !Self::matches(record, filter));
        }
        Ok(true)
    }

    fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}
