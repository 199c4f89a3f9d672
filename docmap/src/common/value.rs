use crate::collection::DocKey;
use crate::collection::Document;
use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};

/// Compare two floats for equality with proper NaN handling.
#[inline]
fn num_eq_float(a: f64, b: f64) -> bool {
    if a.is_nan() && b.is_nan() {
        true
    } else {
        a == b
    }
}

/// Compare two floats with NaN treated as greater than all other values.
#[inline]
fn num_cmp_float(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Represents a [Document] value. It can be a simple value like [Value::I64]
/// or [Value::String], or a complex value like [Value::Document] or
/// [Value::Array].
///
/// Numeric variants compare across widths, so `Value::I32(1)` equals
/// `Value::I64(1)`. This matters for the mapper's no-op-on-identical-write
/// rule: assigning the same number via a different width must still be a
/// no-op.
///
/// Create values using the From trait or the `doc_value!` macro; read them
/// back with the `as_*` accessors, which return `None` when the variant does
/// not match.
#[derive(Clone, Default, serde::Deserialize, serde::Serialize)]
pub enum Value {
    /// Represents a null value.
    #[default]
    Null,
    /// Represents a boolean value.
    Bool(bool),
    /// Represents a signed 32-bit integer value.
    I32(i32),
    /// Represents a signed 64-bit integer value.
    I64(i64),
    /// Represents a 64-bit floating point value.
    F64(f64),
    /// Represents a text value.
    String(String),
    /// Represents an ordered collection of values.
    Array(Vec<Value>),
    /// Represents a nested document.
    Document(Document),
    /// Represents a store-native document identity.
    Key(DocKey),
}

impl Value {
    /// Returns true if this value is [Value::Null].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if this value is a [DocKey] identity.
    pub fn is_key(&self) -> bool {
        matches!(self, Value::Key(_))
    }

    /// Returns true if this value is numeric (integer or float).
    pub fn is_number(&self) -> bool {
        matches!(self, Value::I32(_) | Value::I64(_) | Value::F64(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as an `i64`, widening 32-bit integers.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I32(i) => Some(*i as i64),
            Value::I64(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as an `f64`, converting integer variants.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::I32(i) => Some(*i as f64),
            Value::I64(i) => Some(*i as f64),
            Value::F64(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn as_key(&self) -> Option<&DocKey> {
        match self {
            Value::Key(key) => Some(key),
            _ => None,
        }
    }

    /// Adds two numeric values, used when merging increment deltas.
    ///
    /// Integer + integer stays integral; any float operand promotes the
    /// result to [Value::F64]. Returns `None` when either side is not a
    /// number.
    pub(crate) fn numeric_add(&self, other: &Value) -> Option<Value> {
        match (self, other) {
            (Value::F64(_), _) | (_, Value::F64(_)) => {
                Some(Value::F64(self.as_f64()? + other.as_f64()?))
            }
            _ => Some(Value::I64(self.as_i64()?.wrapping_add(other.as_i64()?))),
        }
    }

    fn variant_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::I32(_) | Value::I64(_) | Value::F64(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Document(_) => 5,
            Value::Key(_) => 6,
        }
    }

    pub(crate) fn to_pretty_json(&self, indent: usize) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::I32(i) => i.to_string(),
            Value::I64(i) => i.to_string(),
            Value::F64(f) => f.to_string(),
            Value::String(s) => format!("\"{}\"", s),
            Value::Array(arr) => {
                let items: Vec<String> =
                    arr.iter().map(|v| v.to_pretty_json(indent)).collect();
                format!("[{}]", items.join(", "))
            }
            Value::Document(doc) => doc.to_pretty_json(indent),
            Value::Key(key) => format!("\"{}\"", key),
        }
    }

    pub(crate) fn to_debug_string(&self, indent: usize) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => format!("bool({})", b),
            Value::I32(i) => format!("i32({})", i),
            Value::I64(i) => format!("i64({})", i),
            Value::F64(f) => format!("f64({})", f),
            Value::String(s) => format!("string(\"{}\")", s),
            Value::Array(arr) => {
                let items: Vec<String> =
                    arr.iter().map(|v| v.to_debug_string(indent)).collect();
                format!("[{}]", items.join(", "))
            }
            Value::Document(doc) => doc.to_debug_string(indent),
            Value::Key(key) => format!("key({})", key),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::F64(a), b) if b.is_number() => num_eq_float(*a, b.as_f64().unwrap_or(f64::NAN)),
            (a, Value::F64(b)) if a.is_number() => num_eq_float(a.as_f64().unwrap_or(f64::NAN), *b),
            (a, b) if a.is_number() && b.is_number() => a.as_i64() == b.as_i64(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Document(a), Value::Document(b)) => a == b,
            (Value::Key(a), Value::Key(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.is_number() && other.is_number() {
            return match (self, other) {
                (Value::F64(_), _) | (_, Value::F64(_)) => num_cmp_float(
                    self.as_f64().unwrap_or(f64::NAN),
                    other.as_f64().unwrap_or(f64::NAN),
                ),
                _ => self.as_i64().cmp(&other.as_i64()),
            };
        }

        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Array(a), Value::Array(b)) => a.cmp(b),
            (Value::Document(a), Value::Document(b)) => a.cmp(b),
            (Value::Key(a), Value::Key(b)) => a.cmp(b),
            _ => self.variant_rank().cmp(&other.variant_rank()),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_pretty_json(0))
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_debug_string(0))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::I32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::I64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<Document> for Value {
    fn from(value: Document) -> Self {
        Value::Document(value)
    }
}

impl From<DocKey> for Value {
    fn from(value: DocKey) -> Self {
        Value::Key(value)
    }
}
