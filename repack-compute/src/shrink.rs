//! Integer and float shrinkers.
//!
//! Both walk the width tables in [`crate::candidates`] and confirm every narrowed array
//! against its source with the equality oracle before handing it back.

use arrow::array::{Array, ArrayRef, new_null_array};
use arrow::compute::cast_with_options;

use crate::candidates::{ALL_NULL_TYPE, FLOATS, narrowest_integer};
use crate::convert::STRICT_CAST;
use crate::oracle::{Tolerance, equal, equal_with, integer_values};
use crate::strategy::StrategyFailure;

/// Placeholder for a column with no values: nullable signed 8-bit, all null.
pub fn all_null_integers(len: usize) -> ArrayRef {
    new_null_array(&ALL_NULL_TYPE, len)
}

fn is_all_null(array: &dyn Array) -> bool {
    array.logical_null_count() == array.len()
}

/// Narrow an integer array to the smallest type holding its `[min, max]` range.
pub fn shrink_integers(array: &ArrayRef) -> Result<ArrayRef, StrategyFailure> {
    const STAGE: &str = "integer_shrink";
    if is_all_null(array.as_ref()) {
        return Ok(all_null_integers(array.len()));
    }

    let values = integer_values(array.as_ref()).ok_or_else(|| {
        StrategyFailure::new(STAGE, format!("{} is not an integer type", array.data_type()))
    })?;
    let (min, max) = values
        .iter()
        .flatten()
        .fold((i128::MAX, i128::MIN), |(lo, hi), v| (lo.min(*v), hi.max(*v)));

    let target = narrowest_integer(min, max).ok_or_else(|| {
        StrategyFailure::new(STAGE, format!("range [{min}, {max}] exceeds signed 64-bit"))
    })?;
    tracing::trace!(min = %min, max = %max, target = %target, "integer range resolved");
    if &target == array.data_type() {
        return Ok(array.clone());
    }

    let narrowed = cast_with_options(array, &target, &STRICT_CAST)
        .map_err(|e| StrategyFailure::new(STAGE, e.to_string()))?;
    if !equal(narrowed.as_ref(), array.as_ref()) {
        return Err(StrategyFailure::new(STAGE, format!("{target} does not round-trip")));
    }
    Ok(narrowed)
}

/// Narrow a float array to the smallest float width that round-trips within `tolerance`.
///
/// An all-null input carries no numeric information and collapses to the integer
/// placeholder instead.
pub fn shrink_floats(array: &ArrayRef, tolerance: Tolerance) -> Result<ArrayRef, StrategyFailure> {
    const STAGE: &str = "float_shrink";
    if is_all_null(array.as_ref()) {
        return Ok(all_null_integers(array.len()));
    }

    let source_width = array.data_type().primitive_width().ok_or_else(|| {
        StrategyFailure::new(STAGE, format!("{} has no fixed width", array.data_type()))
    })?;

    for candidate in FLOATS {
        if usize::from(candidate.byte_width) >= source_width {
            break;
        }
        let target = candidate.data_type();
        match cast_with_options(array, &target, &STRICT_CAST) {
            // The oracle widens the narrowed values back to f64 before comparing.
            Ok(narrowed) if equal_with(narrowed.as_ref(), array.as_ref(), tolerance) => {
                return Ok(narrowed);
            }
            Ok(_) => tracing::trace!(target = %target, "float candidate does not round-trip"),
            Err(e) => tracing::trace!(target = %target, error = %e, "float candidate cast failed"),
        }
    }
    Ok(array.clone())
}
