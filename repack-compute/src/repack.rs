use std::sync::Arc;

use arrow::array::ArrayRef;
use arrow::compute::cast_with_options;
use arrow::datatypes::DataType;
use repack_result::{Error, Result};

use crate::column::RawColumn;
use crate::convert::{STRICT_CAST, materialize, mixed_to_bool};
use crate::oracle::Tolerance;
use crate::shrink::{all_null_integers, shrink_floats, shrink_integers};
use crate::strategy::{NarrowingStrategy, dispatch};

/// How a column reached its final representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepackOutcome {
    /// Narrowed by one of the dispatcher's strategies.
    Strategy(NarrowingStrategy),
    /// Integer fast path or float shrink on an already typed array, or a mixed column of
    /// booleans stored as a boolean array.
    Shrunk,
    /// Cast to a caller-supplied type.
    Overridden,
    /// Left as it was: already narrowest, not a numeric/text type, or unresolvable.
    Unchanged,
}

/// Narrow one column, or cast it to `override_type` when one is given.
pub fn repack_column(column: RawColumn, override_type: Option<&DataType>) -> Result<RawColumn> {
    repack_column_with(column, override_type, Tolerance::default()).map(|(column, _)| column)
}

/// [`repack_column`] with an explicit float tolerance, also reporting the outcome.
///
/// Only the override cast can fail. A column that no strategy can narrow comes back
/// unchanged with [`RepackOutcome::Unchanged`]; deciding whether that is acceptable is
/// the caller's business.
pub fn repack_column_with(
    column: RawColumn,
    override_type: Option<&DataType>,
    tolerance: Tolerance,
) -> Result<(RawColumn, RepackOutcome)> {
    if let Some(target) = override_type {
        let cast = cast_override(&column, target)?;
        return Ok((RawColumn::Array(cast), RepackOutcome::Overridden));
    }
    Ok(narrow(column, tolerance))
}

fn narrow(column: RawColumn, tolerance: Tolerance) -> (RawColumn, RepackOutcome) {
    let array = match &column {
        RawColumn::Mixed(mixed) => {
            if let Some(bools) = mixed_to_bool(mixed) {
                return (RawColumn::Array(Arc::new(bools)), RepackOutcome::Shrunk);
            }
            return dispatched(column, tolerance);
        }
        RawColumn::Array(array) => array.clone(),
    };

    let shrunk = match array.data_type() {
        DataType::Null => Ok(all_null_integers(array.len())),
        dt if dt.is_integer() => shrink_integers(&array),
        DataType::Float64 | DataType::Utf8 | DataType::LargeUtf8 => {
            return dispatched(column, tolerance);
        }
        DataType::Float16 | DataType::Float32 => shrink_floats(&array, tolerance),
        _ => return (column, RepackOutcome::Unchanged),
    };

    match shrunk {
        Ok(narrowed) if narrowed.data_type() != array.data_type() => {
            (RawColumn::Array(narrowed), RepackOutcome::Shrunk)
        }
        Ok(_) => (column, RepackOutcome::Unchanged),
        Err(failure) => {
            tracing::trace!(%failure, "typed column kept as is");
            (column, RepackOutcome::Unchanged)
        }
    }
}

fn dispatched(column: RawColumn, tolerance: Tolerance) -> (RawColumn, RepackOutcome) {
    match dispatch(column, tolerance) {
        (column, Some(strategy)) => (column, RepackOutcome::Strategy(strategy)),
        (column, None) => (column, RepackOutcome::Unchanged),
    }
}

/// Cast a column straight to `target`, bypassing all narrowing.
///
/// Mixed columns are first given their most specific typed form (integers, floats,
/// homogeneous dates/datetimes/bools, otherwise text).
pub fn cast_override(column: &RawColumn, target: &DataType) -> Result<ArrayRef> {
    let source = match column {
        RawColumn::Array(array) => array.clone(),
        RawColumn::Mixed(mixed) => materialize(mixed),
    };
    cast_with_options(&source, target, &STRICT_CAST)
        .map_err(|e| Error::cast(format!("{} to {target}: {e}", column.type_label())))
}
