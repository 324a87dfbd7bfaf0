//! In-memory table handed to the repacker.
//!
//! A [`Frame`] is an ordered set of uniquely named, equal-length columns plus an optional
//! structural index. The index holds the primary key columns; an empty index is the
//! default positional one.

use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::ArrayRef;
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use repack_compute::RawColumn;
use repack_result::{Error, Result};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::constants::{PRIMARY_KEY_META_KEY, PRIMARY_KEY_SEPARATOR};

/// A column together with its name.
#[derive(Clone, Debug)]
pub struct NamedColumn {
    pub name: String,
    pub column: RawColumn,
}

impl NamedColumn {
    pub fn new(name: impl Into<String>, column: impl Into<RawColumn>) -> Self {
        Self {
            name: name.into(),
            column: column.into(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Frame {
    index: Vec<NamedColumn>,
    columns: Vec<NamedColumn>,
    num_rows: usize,
}

impl Frame {
    /// Build a frame with the default positional index.
    ///
    /// Fails if two columns share a name or the columns differ in length.
    pub fn try_new(columns: Vec<NamedColumn>) -> Result<Self> {
        let num_rows = columns.first().map_or(0, |c| c.column.len());
        let frame = Self {
            index: Vec::new(),
            columns,
            num_rows,
        };
        frame.validate()?;
        Ok(frame)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = FxHashSet::default();
        for named in self.index.iter().chain(&self.columns) {
            if !seen.insert(named.name.as_str()) {
                return Err(Error::InvalidArgumentError(format!(
                    "duplicate column name '{}'",
                    named.name
                )));
            }
            if named.column.len() != self.num_rows {
                return Err(Error::InvalidArgumentError(format!(
                    "column '{}' has {} rows, expected {}",
                    named.name,
                    named.column.len(),
                    self.num_rows
                )));
            }
        }
        Ok(())
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of ordinary (non-index) columns.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[NamedColumn] {
        &self.columns
    }

    pub fn index(&self) -> &[NamedColumn] {
        &self.index
    }

    pub fn index_names(&self) -> Vec<&str> {
        self.index.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_default_index(&self) -> bool {
        self.index.is_empty()
    }

    /// Look a column up by name, searching the index first.
    pub fn column(&self, name: &str) -> Option<&RawColumn> {
        self.index
            .iter()
            .chain(&self.columns)
            .find(|c| c.name == name)
            .map(|c| &c.column)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Move the named columns into the structural index, in the given order.
    ///
    /// Any existing index is first returned to the ordinary columns.
    pub fn set_index<S: AsRef<str>>(self, keys: &[S]) -> Result<Self> {
        let mut frame = self.reset_index();
        let mut index = Vec::with_capacity(keys.len());
        for key in keys {
            let key = key.as_ref();
            let position = frame
                .columns
                .iter()
                .position(|c| c.name == key)
                .ok_or_else(|| {
                    Error::InvalidArgumentError(format!("index column '{key}' not found"))
                })?;
            index.push(frame.columns.remove(position));
        }
        frame.index = index;
        Ok(frame)
    }

    /// Return index columns to the front of the ordinary columns, leaving the default
    /// positional index.
    pub fn reset_index(mut self) -> Self {
        if !self.index.is_empty() {
            let mut columns = std::mem::take(&mut self.index);
            columns.append(&mut self.columns);
            self.columns = columns;
        }
        self
    }

    /// Rename index and ordinary columns. Names missing from `mapping` are kept.
    pub fn rename(mut self, mapping: &FxHashMap<String, String>) -> Result<Self> {
        if mapping.is_empty() {
            return Ok(self);
        }
        for named in self.index.iter_mut().chain(self.columns.iter_mut()) {
            if let Some(new_name) = mapping.get(&named.name) {
                named.name = new_name.clone();
            }
        }
        self.validate()?;
        Ok(self)
    }

    /// Split into `(index, columns)`.
    pub fn into_parts(self) -> (Vec<NamedColumn>, Vec<NamedColumn>) {
        (self.index, self.columns)
    }

    /// Hand the frame to persistence as an Arrow batch.
    ///
    /// Index columns come first and their names are recorded in the schema metadata under
    /// [`PRIMARY_KEY_META_KEY`]. Fails if any column is still mixed.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let mut fields = Vec::with_capacity(self.index.len() + self.columns.len());
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(fields.capacity());
        for named in self.index.iter().chain(&self.columns) {
            let array = named.column.as_array().ok_or_else(|| Error::UnresolvedColumn {
                column: named.name.clone(),
                kinds: named.column.type_label(),
            })?;
            fields.push(Field::new(&named.name, array.data_type().clone(), true));
            arrays.push(Arc::clone(array));
        }

        let mut metadata = HashMap::new();
        if !self.index.is_empty() {
            let separator = PRIMARY_KEY_SEPARATOR.to_string();
            metadata.insert(
                PRIMARY_KEY_META_KEY.to_string(),
                self.index_names().join(&separator),
            );
        }
        let schema = Arc::new(Schema::new_with_metadata(fields, metadata));
        Ok(RecordBatch::try_new(schema, arrays)?)
    }

    /// Build a frame from an Arrow batch.
    ///
    /// `key_columns` become the index; when absent, a [`PRIMARY_KEY_META_KEY`] entry in the
    /// schema metadata is honoured instead.
    pub fn try_from_record_batch(
        batch: &RecordBatch,
        key_columns: Option<&[&str]>,
    ) -> Result<Self> {
        let schema = batch.schema();
        let columns = schema
            .fields()
            .iter()
            .zip(batch.columns())
            .map(|(field, array)| NamedColumn::new(field.name().clone(), Arc::clone(array)))
            .collect();
        let frame = Self {
            index: Vec::new(),
            columns,
            num_rows: batch.num_rows(),
        };
        frame.validate()?;

        let recorded: Option<Vec<&str>> = schema
            .metadata()
            .get(PRIMARY_KEY_META_KEY)
            .filter(|keys| !keys.is_empty())
            .map(|keys| keys.split(PRIMARY_KEY_SEPARATOR).collect());
        match key_columns.map(<[&str]>::to_vec).or(recorded) {
            Some(keys) => frame.set_index(&keys),
            None => Ok(frame),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int64Array, StringArray};
    use repack_compute::{MixedColumn, Value};

    fn sample() -> Frame {
        Frame::try_new(vec![
            NamedColumn::new("id", Arc::new(Int64Array::from(vec![1, 2])) as ArrayRef),
            NamedColumn::new("year", Arc::new(Int64Array::from(vec![2020, 2021])) as ArrayRef),
            NamedColumn::new("name", Arc::new(StringArray::from(vec!["a", "b"])) as ArrayRef),
        ])
        .expect("frame")
    }

    #[test]
    fn rejects_duplicate_names_and_ragged_columns() {
        let dup = Frame::try_new(vec![
            NamedColumn::new("a", Arc::new(Int64Array::from(vec![1])) as ArrayRef),
            NamedColumn::new("a", Arc::new(Int64Array::from(vec![2])) as ArrayRef),
        ]);
        assert!(matches!(dup, Err(Error::InvalidArgumentError(_))));

        let ragged = Frame::try_new(vec![
            NamedColumn::new("a", Arc::new(Int64Array::from(vec![1])) as ArrayRef),
            NamedColumn::new("b", Arc::new(Int64Array::from(vec![1, 2])) as ArrayRef),
        ]);
        assert!(matches!(ragged, Err(Error::InvalidArgumentError(_))));
    }

    #[test]
    fn set_and_reset_index_round_trip() {
        let frame = sample().set_index(&["id", "year"]).expect("index");
        assert_eq!(frame.index_names(), vec!["id", "year"]);
        assert_eq!(frame.column_names(), vec!["name"]);
        assert!(frame.column("year").is_some());

        let frame = frame.reset_index();
        assert!(frame.has_default_index());
        assert_eq!(frame.column_names(), vec!["id", "year", "name"]);
    }

    #[test]
    fn set_index_on_missing_column_fails() {
        assert!(sample().set_index(&["missing"]).is_err());
    }

    #[test]
    fn rename_covers_index_and_rejects_collisions() {
        let frame = sample().set_index(&["id"]).unwrap();
        let mut mapping = FxHashMap::default();
        mapping.insert("id".to_string(), "country_id".to_string());
        let renamed = frame.clone().rename(&mapping).unwrap();
        assert_eq!(renamed.index_names(), vec!["country_id"]);

        mapping.insert("year".to_string(), "name".to_string());
        assert!(frame.rename(&mapping).is_err());
    }

    #[test]
    fn record_batch_round_trip_keeps_primary_key() {
        let frame = sample().set_index(&["id", "year"]).unwrap();
        let batch = frame.to_record_batch().unwrap();
        assert_eq!(
            batch.schema().metadata().get(PRIMARY_KEY_META_KEY),
            Some(&"id,year".to_string())
        );
        assert_eq!(batch.schema().field(0).name(), "id");

        let restored = Frame::try_from_record_batch(&batch, None).unwrap();
        assert_eq!(restored.index_names(), vec!["id", "year"]);
        assert_eq!(restored.column_names(), vec!["name"]);
    }

    #[test]
    fn mixed_columns_cannot_become_batches() {
        let frame = Frame::try_new(vec![NamedColumn::new(
            "loose",
            MixedColumn::new(vec![Some(Value::Int(1)), Some(Value::from("x"))]),
        )])
        .unwrap();
        assert!(matches!(
            frame.to_record_batch(),
            Err(Error::UnresolvedColumn { .. })
        ));
    }
}
