//! Column representations accepted by the repacker.
//!
//! A [`RawColumn`] is either a typed Arrow array or a [`MixedColumn`] of loosely typed
//! values. The mixed form is the generic "object" representation produced by upstream
//! pipelines that have not settled on a type yet; the repacker's job is to turn every
//! one of them into a typed array.

use std::fmt;
use std::mem::size_of;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef};
use arrow::datatypes::DataType;

/// A single loosely typed value.
///
/// Dates are days since the Unix epoch; timestamps are microseconds since the Unix epoch,
/// matching Arrow's `Date32` and `Timestamp(Microsecond, None)`.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Date(i32),
    Timestamp(i64),
}

/// Runtime kind of a [`Value`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKind {
    Int,
    Float,
    Text,
    Bool,
    Date,
    Timestamp,
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Text => "text",
            ValueKind::Bool => "bool",
            ValueKind::Date => "date",
            ValueKind::Timestamp => "datetime",
        }
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Text(_) => ValueKind::Text,
            Value::Bool(_) => ValueKind::Bool,
            Value::Date(_) => ValueKind::Date,
            Value::Timestamp(_) => ValueKind::Timestamp,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Date(v) => write!(f, "{v}"),
            Value::Timestamp(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// A column of loosely typed, optionally null values.
#[derive(Clone, Debug, PartialEq)]
pub struct MixedColumn {
    values: Arc<[Option<Value>]>,
}

impl MixedColumn {
    pub fn new(values: Vec<Option<Value>>) -> Self {
        Self {
            values: values.into(),
        }
    }

    pub fn values(&self) -> &[Option<Value>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    /// Distinct kinds of the non-null values, sorted.
    pub fn kinds(&self) -> Vec<ValueKind> {
        let mut kinds: Vec<ValueKind> = self.values.iter().flatten().map(Value::kind).collect();
        kinds.sort_unstable();
        kinds.dedup();
        kinds
    }

    /// Approximate heap footprint in bytes.
    pub fn memory_size(&self) -> usize {
        let text: usize = self
            .values
            .iter()
            .flatten()
            .map(|v| match v {
                Value::Text(s) => s.capacity(),
                _ => 0,
            })
            .sum();
        self.values.len() * size_of::<Option<Value>>() + text
    }
}

impl<V: Into<Value>> FromIterator<Option<V>> for MixedColumn {
    fn from_iter<I: IntoIterator<Item = Option<V>>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|v| v.map(Into::into)).collect())
    }
}

/// A column as handed to the repacker.
#[derive(Clone, Debug)]
pub enum RawColumn {
    /// A typed Arrow array. `Float64` and string arrays are still candidates for narrowing.
    Array(ArrayRef),
    /// Generic values whose type has not been settled.
    Mixed(MixedColumn),
}

impl RawColumn {
    pub fn len(&self) -> usize {
        match self {
            RawColumn::Array(array) => array.len(),
            RawColumn::Mixed(mixed) => mixed.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_mixed(&self) -> bool {
        matches!(self, RawColumn::Mixed(_))
    }

    /// Arrow type of a typed column; `None` for mixed columns.
    pub fn data_type(&self) -> Option<&DataType> {
        match self {
            RawColumn::Array(array) => Some(array.data_type()),
            RawColumn::Mixed(_) => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            RawColumn::Array(array) => Some(array),
            RawColumn::Mixed(_) => None,
        }
    }

    pub fn into_array(self) -> Option<ArrayRef> {
        match self {
            RawColumn::Array(array) => Some(array),
            RawColumn::Mixed(_) => None,
        }
    }

    /// True when every position is null. Empty columns count as all-null.
    pub fn is_all_null(&self) -> bool {
        match self {
            RawColumn::Array(array) => {
                array.data_type() == &DataType::Null || array.logical_null_count() == array.len()
            }
            RawColumn::Mixed(mixed) => mixed.null_count() == mixed.len(),
        }
    }

    /// Approximate memory footprint in bytes.
    pub fn memory_size(&self) -> usize {
        match self {
            RawColumn::Array(array) => array.get_array_memory_size(),
            RawColumn::Mixed(mixed) => mixed.memory_size(),
        }
    }

    /// Human readable type label, e.g. `Int64` or `Mixed(int, text)`.
    pub fn type_label(&self) -> String {
        match self {
            RawColumn::Array(array) => array.data_type().to_string(),
            RawColumn::Mixed(mixed) => {
                let kinds: Vec<&str> = mixed.kinds().iter().map(ValueKind::name).collect();
                format!("Mixed({})", kinds.join(", "))
            }
        }
    }
}

impl From<ArrayRef> for RawColumn {
    fn from(array: ArrayRef) -> Self {
        RawColumn::Array(array)
    }
}

impl From<MixedColumn> for RawColumn {
    fn from(mixed: MixedColumn) -> Self {
        RawColumn::Mixed(mixed)
    }
}
