//! Null-aware, tolerance-aware equality between two numeric arrays.
//!
//! Every narrowing decision is confirmed here before it is accepted. Two arrays are equal
//! when they have the same length and every position matches: both null, both the same
//! integer, or both floats within the [`Tolerance`].

use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    ArrowPrimitiveType, DataType, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type,
    Int64Type, UInt8Type, UInt16Type, UInt32Type, UInt64Type,
};

/// Relative and absolute tolerance for float comparison.
///
/// Two finite floats `a` and `b` are equal when `|a - b| <= atol + rtol * |b|`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerance {
    pub rtol: f64,
    pub atol: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            rtol: 1e-5,
            atol: 1e-8,
        }
    }
}

impl Tolerance {
    /// Exact comparison; only bit-identical values (or two NaNs) are equal.
    pub const EXACT: Tolerance = Tolerance {
        rtol: 0.0,
        atol: 0.0,
    };

    /// Compare two non-null floats. NaN equals NaN; infinities only equal themselves.
    #[inline]
    pub fn is_close(&self, a: f64, b: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return a.is_nan() && b.is_nan();
        }
        if a == b {
            return true;
        }
        if a.is_infinite() || b.is_infinite() {
            return false;
        }
        (a - b).abs() <= self.atol + self.rtol * b.abs()
    }
}

/// Compare two arrays with the default tolerance.
pub fn equal(a: &dyn Array, b: &dyn Array) -> bool {
    equal_with(a, b, Tolerance::default())
}

/// Compare two arrays with an explicit tolerance.
///
/// Integer-typed pairs compare exactly. Any pair involving a float compares as `f64`
/// under `tolerance`. Arrays that are not numeric never compare equal.
pub fn equal_with(a: &dyn Array, b: &dyn Array, tolerance: Tolerance) -> bool {
    if a.len() != b.len() {
        return false;
    }

    if let (Some(left), Some(right)) = (integer_values(a), integer_values(b)) {
        return left == right;
    }

    match (float_values(a), float_values(b)) {
        (Some(left), Some(right)) => left.iter().zip(&right).all(|pair| match pair {
            (None, None) => true,
            (Some(l), Some(r)) => tolerance.is_close(*l, *r),
            _ => false,
        }),
        _ => false,
    }
}

fn collect_integers<T>(array: &dyn Array) -> Vec<Option<i128>>
where
    T: ArrowPrimitiveType,
    T::Native: Into<i128>,
{
    array
        .as_primitive::<T>()
        .iter()
        .map(|v| v.map(Into::into))
        .collect()
}

/// Values of an integer (or untyped all-null) array widened to `i128`.
pub(crate) fn integer_values(array: &dyn Array) -> Option<Vec<Option<i128>>> {
    let values = match array.data_type() {
        DataType::Null => vec![None; array.len()],
        DataType::Int8 => collect_integers::<Int8Type>(array),
        DataType::Int16 => collect_integers::<Int16Type>(array),
        DataType::Int32 => collect_integers::<Int32Type>(array),
        DataType::Int64 => collect_integers::<Int64Type>(array),
        DataType::UInt8 => collect_integers::<UInt8Type>(array),
        DataType::UInt16 => collect_integers::<UInt16Type>(array),
        DataType::UInt32 => collect_integers::<UInt32Type>(array),
        DataType::UInt64 => collect_integers::<UInt64Type>(array),
        _ => return None,
    };
    Some(values)
}

/// Values of any numeric array widened to `f64`.
pub(crate) fn float_values(array: &dyn Array) -> Option<Vec<Option<f64>>> {
    match array.data_type() {
        DataType::Float64 => Some(array.as_primitive::<Float64Type>().iter().collect()),
        DataType::Float32 => Some(
            array
                .as_primitive::<Float32Type>()
                .iter()
                .map(|v| v.map(f64::from))
                .collect(),
        ),
        _ => integer_values(array)
            .map(|ints| ints.into_iter().map(|v| v.map(|i| i as f64)).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float32Array, Float64Array, Int64Array, StringArray, UInt8Array};

    #[test]
    fn length_mismatch_is_not_equal() {
        let a = Int64Array::from(vec![1, 2, 3]);
        let b = Int64Array::from(vec![1, 2]);
        assert!(!equal(&a, &b));
    }

    #[test]
    fn nulls_must_line_up() {
        let a = Float64Array::from(vec![Some(1.0), None, Some(3.0)]);
        let b = Float64Array::from(vec![Some(1.0), None, Some(3.0)]);
        let shifted = Float64Array::from(vec![Some(1.0), Some(3.0), None]);
        assert!(equal(&a, &b));
        assert!(!equal(&a, &shifted));
    }

    #[test]
    fn floats_compare_within_tolerance() {
        let a = Float64Array::from(vec![1.0, 100_000.0]);
        let close = Float64Array::from(vec![1.000_000_001, 100_000.5]);
        let far = Float64Array::from(vec![1.0, 100_002.0]);
        assert!(equal(&a, &close));
        assert!(!equal(&a, &far));
        assert!(!equal_with(&a, &close, Tolerance::EXACT));
    }

    #[test]
    fn nan_equals_nan_and_infinities_match_sign() {
        let a = Float64Array::from(vec![f64::NAN, f64::INFINITY]);
        let b = Float32Array::from(vec![f32::NAN, f32::INFINITY]);
        let flipped = Float64Array::from(vec![f64::NAN, f64::NEG_INFINITY]);
        assert!(equal(&a, &b));
        assert!(!equal(&a, &flipped));
    }

    #[test]
    fn integers_compare_exactly_across_widths() {
        let wide = Int64Array::from(vec![Some(0), None, Some(255)]);
        let narrow = UInt8Array::from(vec![Some(0), None, Some(255)]);
        assert!(equal(&wide, &narrow));

        let truncated = Int64Array::from(vec![Some(0), None, Some(254)]);
        assert!(!equal(&wide, &truncated));
    }

    #[test]
    fn integer_against_float_uses_tolerance() {
        let ints = Int64Array::from(vec![1, 2, 3]);
        let floats = Float64Array::from(vec![1.0, 2.0, 3.0]);
        let fractional = Float64Array::from(vec![1.0, 2.5, 3.0]);
        assert!(equal(&ints, &floats));
        assert!(!equal(&ints, &fractional));
    }

    #[test]
    fn text_is_never_comparable() {
        let a = StringArray::from(vec!["1"]);
        let b = StringArray::from(vec!["1"]);
        assert!(!equal(&a, &b));
    }
}
