use smallvec::SmallVec;

use crate::common::{Value, FIELD_SEPARATOR};
use crate::errors::{DocmapError, DocmapResult, ErrorKind};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};

type FieldVec = SmallVec<[String; 8]>;

/// Represents a plain document: the wire shape exchanged with a collection.
///
/// A document is composed of key-value pairs. The key is always a [String]
/// and the value is a [Value]. Documents nest: the key of a nested document
/// field is a [String] separated by `.`, so `doc.get("a.b")` reads inside the
/// embedded document stored under `"a"`.
///
/// The same shape serves four purposes in this crate: persisted records,
/// query filters, operator payloads, and the compiled operation document
/// submitted on update.
#[derive(Clone, Eq, PartialEq, Default, Ord, PartialOrd, serde::Deserialize, serde::Serialize)]
pub struct Document {
    data: BTreeMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Document {
            data: BTreeMap::new(),
        }
    }

    /// Checks if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Associates the specified [Value] with the specified key.
    ///
    /// If the key already exists its value is updated. Keys containing the
    /// field separator address embedded documents, creating intermediate
    /// documents as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the key (or any path segment) is empty.
    pub fn put<'a, T: Into<Value>>(
        &mut self,
        key: impl Into<Cow<'a, str>>,
        value: T,
    ) -> DocmapResult<()> {
        let key = key.into();
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(DocmapError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        let value = value.into();

        if key.contains(FIELD_SEPARATOR) {
            let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
            self.deep_put(&splits, value)
        } else {
            self.data.insert(key.to_string(), value);
            Ok(())
        }
    }

    /// Inserts a key-value pair without path splitting.
    ///
    /// Filters and operator payload maps carry field paths as literal keys
    /// (`{"address.zip": 10001}`), so they must not be expanded into nested
    /// documents the way [put] expands them.
    ///
    /// [put]: Document::put
    pub fn put_literal<T: Into<Value>>(&mut self, key: &str, value: T) {
        self.data.insert(key.to_string(), value.into());
    }

    /// Returns the [Value] associated with the key, or [Value::Null] if this
    /// document contains no mapping for it. Embedded keys are supported.
    pub fn get(&self, key: &str) -> Value {
        match self.data.get(key) {
            Some(value) => value.clone(),
            None => {
                if key.contains(FIELD_SEPARATOR) {
                    self.deep_get(key)
                } else {
                    Value::Null
                }
            }
        }
    }

    /// Removes the key and its value from the document.
    ///
    /// Removing a non-existent key succeeds without error. Embedded keys are
    /// supported; an embedded document left empty by the removal is removed
    /// as well.
    pub fn remove(&mut self, key: &str) -> DocmapResult<()> {
        if key.contains(FIELD_SEPARATOR) {
            let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
            self.deep_remove(&splits)
        } else {
            self.data.remove(key);
            Ok(())
        }
    }

    /// Checks if a top level key exists in the document.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Returns the number of top-level entries in the document.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Merges another document into this one.
    ///
    /// Nested documents merge recursively; any other colliding value is
    /// overwritten by the value from `other`.
    pub fn merge(&mut self, other: &Document) {
        for (key, value) in other.data.iter() {
            match value {
                Value::Document(obj) => {
                    if let Some(Value::Document(nested)) = self.data.get_mut(key) {
                        nested.merge(obj);
                    } else {
                        self.data.insert(key.clone(), value.clone());
                    }
                }
                _ => {
                    self.data.insert(key.clone(), value.clone());
                }
            }
        }
    }

    /// Retrieves all field paths (top level and embedded) in this document.
    pub fn fields(&self) -> Vec<String> {
        self.get_fields_internal("").into_vec()
    }

    /// Converts this document to a [BTreeMap].
    pub fn to_map(&self) -> BTreeMap<String, Value> {
        self.data.clone()
    }

    /// Gets an iterator over the key-value pairs of this document.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    pub(crate) fn to_pretty_json(&self, indent: usize) -> String {
        if self.data.is_empty() {
            return "{}".to_string();
        }

        let mut json_string = String::new();
        json_string.push_str("{\n");
        let indent_str = " ".repeat(indent + 2);
        for (key, value) in self.data.iter() {
            json_string.push_str(&format!(
                "{}\"{}\": {},\n",
                indent_str,
                key,
                value.to_pretty_json(indent + 2)
            ));
        }

        json_string.pop();
        json_string.pop();
        json_string.push_str(&format!("\n{}}}", " ".repeat(indent)));
        json_string
    }

    pub(crate) fn to_debug_string(&self, indent: usize) -> String {
        if self.data.is_empty() {
            return "{}".to_string();
        }

        let mut debug_string = String::new();
        debug_string.push_str("{\n");
        let indent_str = " ".repeat(indent + 2);
        for (key, value) in self.data.iter() {
            debug_string.push_str(&format!(
                "{}\"{}\": {},\n",
                indent_str,
                key,
                value.to_debug_string(indent + 2)
            ));
        }

        debug_string.pop();
        debug_string.pop();
        debug_string.push_str(&format!("\n{}}}", " ".repeat(indent)));
        debug_string
    }

    fn get_fields_internal(&self, prefix: &str) -> FieldVec {
        let mut fields = FieldVec::new();

        for (key, value) in self.data.iter() {
            if key.is_empty() {
                continue;
            }

            let field = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}{}{}", prefix, FIELD_SEPARATOR, key)
            };

            if let Value::Document(doc) = value {
                fields.append(&mut doc.get_fields_internal(&field));
            } else {
                fields.push(field);
            }
        }
        fields
    }

    fn deep_get(&self, key: &str) -> Value {
        let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
        let mut current = self;

        for (index, segment) in splits.iter().enumerate() {
            if index == splits.len() - 1 {
                return current.data.get(*segment).cloned().unwrap_or(Value::Null);
            }
            match current.data.get(*segment) {
                Some(Value::Document(doc)) => current = doc,
                _ => return Value::Null,
            }
        }
        Value::Null
    }

    fn deep_put(&mut self, splits: &[&str], value: Value) -> DocmapResult<()> {
        let key = splits[0];
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(DocmapError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        if splits.len() == 1 {
            self.data.insert(key.to_string(), value);
            Ok(())
        } else if let Some(Value::Document(doc)) = self.data.get_mut(key) {
            doc.deep_put(&splits[1..], value)
        } else {
            // current level value is absent or not a document, start fresh
            let mut nested = Document::new();
            nested.deep_put(&splits[1..], value)?;
            self.data.insert(key.to_string(), Value::Document(nested));
            Ok(())
        }
    }

    fn deep_remove(&mut self, splits: &[&str]) -> DocmapResult<()> {
        let key = splits[0];
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(DocmapError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        if splits.len() == 1 {
            self.data.remove(key);
            return Ok(());
        }

        if let Some(Value::Document(doc)) = self.data.get_mut(key) {
            doc.deep_remove(&splits[1..])?;
            if doc.is_empty() {
                self.data.remove(key);
            }
        }
        Ok(())
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_debug_string(0))
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_pretty_json(0))
    }
}

pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a [Document] with JSON-like syntax.
///
/// # Examples
///
/// ```rust
/// use docmap::doc;
///
/// // Empty document
/// let empty = doc!{};
///
/// // Simple key-value pairs
/// let simple = doc!{
///     name: "Alice",
///     age: 30
/// };
///
/// // Nested documents and arrays
/// let complex = doc!{
///     user: {
///         name: "Charlie",
///         tags: ["admin", "user"]
///     },
///     values: [1, 2, 3]
/// };
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::collection::Document::new()
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let mut doc = $crate::collection::Document::new();
            $(
                doc.put(&$crate::collection::normalize(stringify!($key)), $crate::doc_value!($value))
                .expect(&format!("Failed to put value {} in document", stringify!($value)));
            )*
            doc
        }
    };
}

/// Helper macro to convert values for the doc! macro.
/// Handles nested documents, arrays, and expressions.
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        {
            $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
        }
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}
