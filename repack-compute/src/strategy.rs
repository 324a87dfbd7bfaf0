//! Ordered narrowing strategies for ambiguous columns.
//!
//! An ambiguous column (mixed values, text, or 64-bit floats) is offered to each
//! [`NarrowingStrategy`] in [`NarrowingStrategy::ORDER`]. The first strategy that
//! succeeds decides the column's type. A [`StrategyFailure`] only selects the next
//! strategy; it never leaves this module.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, Date32Array, DictionaryArray, LargeStringArray, PrimitiveArray,
    StringArray, TimestampMicrosecondArray, new_null_array,
};
use arrow::compute::cast_with_options;
use arrow::datatypes::{
    ArrowDictionaryKeyType, ArrowNativeType, DataType, Float64Type, Int8Type, Int16Type,
    Int32Type, Int64Type,
};
use thiserror::Error;

use crate::candidates::dictionary_key_candidate;
use crate::column::{MixedColumn, RawColumn, Value, ValueKind};
use crate::convert::{
    STRICT_CAST, float_array_to_i64, mixed_to_f64, mixed_to_i64, text_to_f64, text_to_i64,
};
use crate::oracle::{Tolerance, equal_with};
use crate::shrink::{shrink_floats, shrink_integers};

/// A single narrowing attempt that could not represent the column.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{stage}: {reason}")]
pub struct StrategyFailure {
    pub stage: &'static str,
    pub reason: String,
}

impl StrategyFailure {
    pub fn new(stage: &'static str, reason: impl Into<String>) -> Self {
        Self {
            stage,
            reason: reason.into(),
        }
    }
}

/// One way of turning an ambiguous column into a typed array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NarrowingStrategy {
    /// Exact 64-bit integers, then the integer shrinker.
    ToInt,
    /// 64-bit floats, then the float shrinker.
    ToFloat,
    /// Dictionary encoding of text, dates or datetimes.
    ToCategory,
}

impl NarrowingStrategy {
    /// Priority order in which strategies are attempted.
    pub const ORDER: [NarrowingStrategy; 3] = [
        NarrowingStrategy::ToInt,
        NarrowingStrategy::ToFloat,
        NarrowingStrategy::ToCategory,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NarrowingStrategy::ToInt => "to_int",
            NarrowingStrategy::ToFloat => "to_float",
            NarrowingStrategy::ToCategory => "to_category",
        }
    }

    pub fn try_apply(
        &self,
        column: &RawColumn,
        tolerance: Tolerance,
    ) -> Result<ArrayRef, StrategyFailure> {
        match self {
            NarrowingStrategy::ToInt => to_int(column, tolerance),
            NarrowingStrategy::ToFloat => to_float(column, tolerance),
            NarrowingStrategy::ToCategory => to_category(column),
        }
    }
}

/// Try every strategy in order; return the column unchanged if none applies.
///
/// Which strategy won is returned alongside the column (`None` when all failed).
pub fn dispatch(column: RawColumn, tolerance: Tolerance) -> (RawColumn, Option<NarrowingStrategy>) {
    for strategy in NarrowingStrategy::ORDER {
        match strategy.try_apply(&column, tolerance) {
            Ok(array) => return (RawColumn::Array(array), Some(strategy)),
            Err(failure) => {
                tracing::trace!(strategy = strategy.name(), %failure, "narrowing attempt rejected");
            }
        }
    }
    (column, None)
}

fn strict_cast(
    array: &ArrayRef,
    to: &DataType,
    stage: &'static str,
) -> Result<ArrayRef, StrategyFailure> {
    cast_with_options(array, to, &STRICT_CAST)
        .map_err(|e| StrategyFailure::new(stage, e.to_string()))
}

fn to_int(column: &RawColumn, tolerance: Tolerance) -> Result<ArrayRef, StrategyFailure> {
    const STAGE: &str = "to_int";
    let (ints, floats): (ArrayRef, ArrayRef) = match column {
        RawColumn::Array(array) => match array.data_type() {
            DataType::Float64 => {
                let ints = float_array_to_i64(array.as_primitive::<Float64Type>(), STAGE)?;
                (Arc::new(ints), Arc::clone(array))
            }
            DataType::Utf8 => {
                let text = array.as_string::<i32>();
                (
                    Arc::new(text_to_i64(text.iter(), STAGE)?),
                    Arc::new(text_to_f64(text.iter(), STAGE)?),
                )
            }
            DataType::LargeUtf8 => {
                let text = array.as_string::<i64>();
                (
                    Arc::new(text_to_i64(text.iter(), STAGE)?),
                    Arc::new(text_to_f64(text.iter(), STAGE)?),
                )
            }
            DataType::Null => (
                new_null_array(&DataType::Int64, array.len()),
                new_null_array(&DataType::Float64, array.len()),
            ),
            dt if dt.is_integer() => (
                strict_cast(array, &DataType::Int64, STAGE)?,
                strict_cast(array, &DataType::Float64, STAGE)?,
            ),
            other => {
                return Err(StrategyFailure::new(STAGE, format!("{other} holds no integers")));
            }
        },
        RawColumn::Mixed(mixed) => (
            Arc::new(mixed_to_i64(mixed, STAGE)?),
            Arc::new(mixed_to_f64(mixed, STAGE)?),
        ),
    };

    if !equal_with(ints.as_ref(), floats.as_ref(), tolerance) {
        return Err(StrategyFailure::new(
            STAGE,
            "integer form differs from the float interpretation",
        ));
    }
    shrink_integers(&ints)
}

fn to_float(column: &RawColumn, tolerance: Tolerance) -> Result<ArrayRef, StrategyFailure> {
    const STAGE: &str = "to_float";
    let floats: ArrayRef = match column {
        RawColumn::Array(array) => match array.data_type() {
            DataType::Float64 => Arc::clone(array),
            DataType::Utf8 => Arc::new(text_to_f64(array.as_string::<i32>().iter(), STAGE)?),
            DataType::LargeUtf8 => Arc::new(text_to_f64(array.as_string::<i64>().iter(), STAGE)?),
            DataType::Null => new_null_array(&DataType::Float64, array.len()),
            dt if dt.is_numeric() => strict_cast(array, &DataType::Float64, STAGE)?,
            other => {
                return Err(StrategyFailure::new(STAGE, format!("{other} holds no numbers")));
            }
        },
        RawColumn::Mixed(mixed) => Arc::new(mixed_to_f64(mixed, STAGE)?),
    };
    shrink_floats(&floats, tolerance)
}

fn to_category(column: &RawColumn) -> Result<ArrayRef, StrategyFailure> {
    const STAGE: &str = "to_category";
    match column {
        RawColumn::Array(array) => match array.data_type() {
            DataType::Utf8 => {
                let (uniques, codes) = encode_sorted(array.as_string::<i32>().iter());
                build_dictionary(&codes, Arc::new(StringArray::from(uniques)))
            }
            DataType::LargeUtf8 => {
                let (uniques, codes) = encode_sorted(array.as_string::<i64>().iter());
                build_dictionary(&codes, Arc::new(LargeStringArray::from(uniques)))
            }
            other => Err(StrategyFailure::new(STAGE, format!("{other} is not categorical"))),
        },
        RawColumn::Mixed(mixed) => mixed_to_category(mixed),
    }
}

/// Dictionary-encode a mixed column whose values are all text, all dates, or all
/// datetimes. Any blend of those kinds is a type conflict.
fn mixed_to_category(mixed: &MixedColumn) -> Result<ArrayRef, StrategyFailure> {
    const STAGE: &str = "to_category";
    let values = mixed.values();
    match mixed.kinds().as_slice() {
        [ValueKind::Text] => {
            let (uniques, codes) = encode_sorted(values.iter().map(|v| match v {
                Some(Value::Text(s)) => Some(s.as_str()),
                _ => None,
            }));
            build_dictionary(&codes, Arc::new(StringArray::from(uniques)))
        }
        [ValueKind::Date] => {
            let (uniques, codes) = encode_sorted(values.iter().map(|v| match v {
                Some(Value::Date(d)) => Some(*d),
                _ => None,
            }));
            build_dictionary(&codes, Arc::new(Date32Array::from(uniques)))
        }
        [ValueKind::Timestamp] => {
            let (uniques, codes) = encode_sorted(values.iter().map(|v| match v {
                Some(Value::Timestamp(t)) => Some(*t),
                _ => None,
            }));
            build_dictionary(&codes, Arc::new(TimestampMicrosecondArray::from(uniques)))
        }
        kinds => {
            let names: Vec<&str> = kinds.iter().map(ValueKind::name).collect();
            Err(StrategyFailure::new(
                STAGE,
                format!("values of kind [{}] do not share one categorical type", names.join(", ")),
            ))
        }
    }
}

/// Sorted unique values plus, per row, the position of the row's value among them.
fn encode_sorted<V, I>(rows: I) -> (Vec<V>, Vec<Option<usize>>)
where
    V: Ord + Copy,
    I: Iterator<Item = Option<V>>,
{
    let rows: Vec<Option<V>> = rows.collect();
    let mut uniques: Vec<V> = rows.iter().flatten().copied().collect();
    uniques.sort_unstable();
    uniques.dedup();
    let codes = rows
        .iter()
        .map(|row| row.and_then(|v| uniques.binary_search(&v).ok()))
        .collect();
    (uniques, codes)
}

fn build_dictionary(
    codes: &[Option<usize>],
    values: ArrayRef,
) -> Result<ArrayRef, StrategyFailure> {
    match dictionary_key_candidate(values.len()).data_type() {
        DataType::Int8 => dictionary_with_keys::<Int8Type>(codes, values),
        DataType::Int16 => dictionary_with_keys::<Int16Type>(codes, values),
        DataType::Int32 => dictionary_with_keys::<Int32Type>(codes, values),
        _ => dictionary_with_keys::<Int64Type>(codes, values),
    }
}

fn dictionary_with_keys<K: ArrowDictionaryKeyType>(
    codes: &[Option<usize>],
    values: ArrayRef,
) -> Result<ArrayRef, StrategyFailure> {
    const STAGE: &str = "to_category";
    let keys = codes
        .iter()
        .map(|code| match code {
            None => Ok(None),
            Some(c) => K::Native::from_usize(*c)
                .map(Some)
                .ok_or_else(|| StrategyFailure::new(STAGE, format!("key {c} overflows"))),
        })
        .collect::<Result<Vec<_>, _>>()?;
    let keys: PrimitiveArray<K> = keys.into_iter().collect();
    let dictionary = DictionaryArray::<K>::try_new(keys, values)
        .map_err(|e| StrategyFailure::new(STAGE, e.to_string()))?;
    Ok(Arc::new(dictionary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int64Array};

    fn text(values: &[Option<&str>]) -> RawColumn {
        RawColumn::Array(Arc::new(StringArray::from(values.to_vec())))
    }

    #[test]
    fn order_is_int_float_category() {
        let names: Vec<&str> = NarrowingStrategy::ORDER.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["to_int", "to_float", "to_category"]);
    }

    #[test]
    fn to_int_accepts_numerals_and_rejects_fractions() {
        let ints = NarrowingStrategy::ToInt
            .try_apply(&text(&[Some("1"), Some("2"), Some("3")]), Tolerance::default())
            .expect("numerals");
        assert_eq!(ints.data_type(), &DataType::UInt8);

        let failure = NarrowingStrategy::ToInt
            .try_apply(&text(&[Some("1"), Some("2.5")]), Tolerance::default())
            .unwrap_err();
        assert_eq!(failure.stage, "to_int");
    }

    #[test]
    fn to_int_rejects_integral_looking_floats_that_are_not_integral() {
        let column = RawColumn::Array(Arc::new(Float64Array::from(vec![1.0, 2.000_001])));
        assert!(
            NarrowingStrategy::ToInt
                .try_apply(&column, Tolerance::default())
                .is_err()
        );
    }

    #[test]
    fn padded_numerals_parse_alike_as_text_or_mixed() {
        let from_text = NarrowingStrategy::ToInt
            .try_apply(&text(&[Some(" 1"), Some("2 "), None]), Tolerance::default())
            .expect("text numerals");
        let mixed = MixedColumn::new(vec![Some(Value::from(" 1")), Some(Value::from("2 ")), None]);
        let from_mixed = NarrowingStrategy::ToInt
            .try_apply(&RawColumn::Mixed(mixed), Tolerance::default())
            .expect("mixed numerals");

        assert_eq!(from_text.data_type(), &DataType::UInt8);
        assert_eq!(from_text.as_ref(), from_mixed.as_ref());

        let floats = NarrowingStrategy::ToFloat
            .try_apply(&text(&[Some(" 0.5"), Some("1.25\t")]), Tolerance::default())
            .expect("padded floats");
        assert_eq!(floats.data_type(), &DataType::Float32);
    }

    #[test]
    fn to_float_rejects_free_text() {
        let column = text(&[Some("1.5"), Some("abc")]);
        assert!(
            NarrowingStrategy::ToFloat
                .try_apply(&column, Tolerance::default())
                .is_err()
        );
    }

    #[test]
    fn category_values_are_sorted_and_keys_narrow() {
        let column = text(&[Some("b"), Some("a"), None, Some("b"), Some("c")]);
        let array = NarrowingStrategy::ToCategory
            .try_apply(&column, Tolerance::default())
            .expect("category");
        assert_eq!(
            array.data_type(),
            &DataType::Dictionary(Box::new(DataType::Int8), Box::new(DataType::Utf8))
        );
        let dict = array.as_dictionary::<Int8Type>();
        let keys: Vec<Option<i8>> = dict.keys().iter().collect();
        assert_eq!(keys, vec![Some(1), Some(0), None, Some(1), Some(2)]);
        let values = dict.values().as_string::<i32>();
        assert_eq!(values.iter().collect::<Vec<_>>(), vec![Some("a"), Some("b"), Some("c")]);
    }

    #[test]
    fn category_rejects_text_blended_with_dates() {
        let mixed = MixedColumn::new(vec![
            Some(Value::from("2020-01-01")),
            Some(Value::Date(18_262)),
        ]);
        let err = NarrowingStrategy::ToCategory
            .try_apply(&RawColumn::Mixed(mixed), Tolerance::default())
            .unwrap_err();
        assert!(err.reason.contains("date"));
    }

    #[test]
    fn category_accepts_homogeneous_dates() {
        let mixed = MixedColumn::new(vec![Some(Value::Date(1)), None, Some(Value::Date(1))]);
        let array = NarrowingStrategy::ToCategory
            .try_apply(&RawColumn::Mixed(mixed), Tolerance::default())
            .expect("dates");
        assert_eq!(
            array.data_type(),
            &DataType::Dictionary(Box::new(DataType::Int8), Box::new(DataType::Date32))
        );
        assert_eq!(array.null_count(), 1);
    }

    #[test]
    fn dispatch_leaves_unresolvable_mixed_columns_alone() {
        let mixed = MixedColumn::new(vec![Some(Value::Int(1)), Some(Value::from("one"))]);
        let (column, strategy) = dispatch(RawColumn::Mixed(mixed), Tolerance::default());
        assert!(column.is_mixed());
        assert_eq!(strategy, None);
    }

    #[test]
    fn dispatch_reports_the_winning_strategy() {
        let column = RawColumn::Array(Arc::new(Float64Array::from(vec![1.0, 2.2, 3.0])));
        let (column, strategy) = dispatch(column, Tolerance::default());
        assert_eq!(strategy, Some(NarrowingStrategy::ToFloat));
        assert_eq!(column.data_type(), Some(&DataType::Float32));

        let ints = RawColumn::Array(Arc::new(Int64Array::from(vec![-5, 5])));
        let (ints, strategy) = dispatch(ints, Tolerance::default());
        assert_eq!(strategy, Some(NarrowingStrategy::ToInt));
        assert_eq!(ints.data_type(), Some(&DataType::Int8));
    }
}
