//! Value-level conversions shared by the narrowing strategies and override casts.

use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, StringArray,
    TimestampMicrosecondArray,
};
use arrow::compute::CastOptions;

use crate::column::{MixedColumn, Value, ValueKind};
use crate::strategy::StrategyFailure;

/// Cast options that turn unrepresentable values into errors instead of nulls.
///
/// Silent nulls would break null-position preservation, so every cast in the repacker
/// uses these.
pub const STRICT_CAST: CastOptions<'static> = CastOptions {
    safe: false,
    format_options: arrow::util::display::FormatOptions::new(),
};

// 2^63 as f64; the first float past i64::MAX.
const I64_UPPER_EXCLUSIVE: f64 = 9_223_372_036_854_775_808.0;

/// Exact float to integer conversion. Fractional, non-finite and out-of-range values fail.
pub(crate) fn exact_i64(value: f64, stage: &'static str) -> Result<i64, StrategyFailure> {
    if value.is_finite()
        && value.fract() == 0.0
        && value >= -I64_UPPER_EXCLUSIVE
        && value < I64_UPPER_EXCLUSIVE
    {
        Ok(value as i64)
    } else {
        Err(StrategyFailure::new(
            stage,
            format!("{value} has no exact 64-bit integer form"),
        ))
    }
}

pub(crate) fn float_array_to_i64(
    array: &Float64Array,
    stage: &'static str,
) -> Result<Int64Array, StrategyFailure> {
    let values = array
        .iter()
        .map(|v| v.map(|f| exact_i64(f, stage)).transpose())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Int64Array::from(values))
}

// Numerals are parsed the same way whether they arrive in a string array or a mixed
// column: surrounding whitespace is ignored, anything else must parse in full.
fn parse_i64(text: &str, stage: &'static str) -> Result<i64, StrategyFailure> {
    text.trim()
        .parse::<i64>()
        .map_err(|e| StrategyFailure::new(stage, format!("'{text}' is not an integer: {e}")))
}

fn parse_f64(text: &str, stage: &'static str) -> Result<f64, StrategyFailure> {
    text.trim()
        .parse::<f64>()
        .map_err(|e| StrategyFailure::new(stage, format!("'{text}' is not a number: {e}")))
}

pub(crate) fn text_to_i64<'a>(
    rows: impl Iterator<Item = Option<&'a str>>,
    stage: &'static str,
) -> Result<Int64Array, StrategyFailure> {
    rows.map(|row| row.map(|s| parse_i64(s, stage)).transpose()).collect()
}

pub(crate) fn text_to_f64<'a>(
    rows: impl Iterator<Item = Option<&'a str>>,
    stage: &'static str,
) -> Result<Float64Array, StrategyFailure> {
    rows.map(|row| row.map(|s| parse_f64(s, stage)).transpose()).collect()
}

/// Boolean form of a mixed column whose values are all booleans.
pub(crate) fn mixed_to_bool(column: &MixedColumn) -> Option<BooleanArray> {
    if column.kinds().as_slice() != [ValueKind::Bool] {
        return None;
    }
    let values = column.values().iter().map(|v| match v {
        Some(Value::Bool(b)) => Some(*b),
        _ => None,
    });
    Some(values.collect())
}

pub(crate) fn mixed_to_i64(
    column: &MixedColumn,
    stage: &'static str,
) -> Result<Int64Array, StrategyFailure> {
    let values = column
        .values()
        .iter()
        .map(|value| match value {
            None => Ok(None),
            Some(Value::Int(v)) => Ok(Some(*v)),
            Some(Value::Float(f)) => exact_i64(*f, stage).map(Some),
            Some(Value::Text(s)) => parse_i64(s, stage).map(Some),
            Some(other) => Err(StrategyFailure::new(
                stage,
                format!("{} value cannot become an integer", other.kind().name()),
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Int64Array::from(values))
}

pub(crate) fn mixed_to_f64(
    column: &MixedColumn,
    stage: &'static str,
) -> Result<Float64Array, StrategyFailure> {
    let values = column
        .values()
        .iter()
        .map(|value| match value {
            None => Ok(None),
            Some(Value::Int(v)) => Ok(Some(*v as f64)),
            Some(Value::Float(f)) => Ok(Some(*f)),
            Some(Value::Text(s)) => parse_f64(s, stage).map(Some),
            Some(other) => Err(StrategyFailure::new(
                stage,
                format!("{} value cannot become a float", other.kind().name()),
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Float64Array::from(values))
}

/// Best-effort typed form of a mixed column, used as the source of an override cast.
///
/// Integers win over floats, homogeneous bools/dates/datetimes keep their type, and
/// anything else is rendered as text.
pub(crate) fn materialize(column: &MixedColumn) -> ArrayRef {
    const STAGE: &str = "materialize";
    if let Ok(ints) = mixed_to_i64(column, STAGE) {
        return Arc::new(ints);
    }
    if let Ok(floats) = mixed_to_f64(column, STAGE) {
        return Arc::new(floats);
    }
    if let Some(bools) = mixed_to_bool(column) {
        return Arc::new(bools);
    }

    let values = column.values();
    match column.kinds().as_slice() {
        [ValueKind::Date] => Arc::new(Date32Array::from(
            values
                .iter()
                .map(|v| match v {
                    Some(Value::Date(d)) => Some(*d),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        [ValueKind::Timestamp] => Arc::new(TimestampMicrosecondArray::from(
            values
                .iter()
                .map(|v| match v {
                    Some(Value::Timestamp(t)) => Some(*t),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        _ => Arc::new(StringArray::from(
            values
                .iter()
                .map(|v| v.as_ref().map(Value::to_string))
                .collect::<Vec<_>>(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;

    #[test]
    fn exact_i64_rejects_fractions_and_overflow() {
        assert_eq!(exact_i64(42.0, "t"), Ok(42));
        assert_eq!(exact_i64(-0.0, "t"), Ok(0));
        assert!(exact_i64(2.5, "t").is_err());
        assert!(exact_i64(f64::NAN, "t").is_err());
        assert!(exact_i64(1e19, "t").is_err());
        assert_eq!(exact_i64(-I64_UPPER_EXCLUSIVE, "t"), Ok(i64::MIN));
    }

    #[test]
    fn mixed_text_numerals_parse_as_integers() {
        let column: MixedColumn = vec![Some("1"), None, Some(" 3 ")].into_iter().collect();
        let ints = mixed_to_i64(&column, "t").expect("integers");
        assert_eq!(ints.iter().collect::<Vec<_>>(), vec![Some(1), None, Some(3)]);

        let fractional: MixedColumn = vec![Some("2.5")].into_iter().collect();
        assert!(mixed_to_i64(&fractional, "t").is_err());
        assert!(mixed_to_f64(&fractional, "t").is_ok());
    }

    #[test]
    fn string_arrays_and_mixed_columns_share_one_numeral_rule() {
        let rows = [Some(" 1"), Some("2\t"), None];
        let from_text = text_to_i64(rows.into_iter(), "t").expect("text");
        let mixed: MixedColumn = rows.into_iter().collect();
        assert_eq!(from_text, mixed_to_i64(&mixed, "t").expect("mixed"));

        assert!(text_to_i64([Some("1 2")].into_iter(), "t").is_err());
        assert!(text_to_f64([Some("")].into_iter(), "t").is_err());
    }

    #[test]
    fn only_pure_boolean_columns_become_booleans() {
        let flags = MixedColumn::new(vec![Some(Value::Bool(true)), None, Some(Value::Bool(false))]);
        let bools = mixed_to_bool(&flags).expect("booleans");
        assert_eq!(bools.iter().collect::<Vec<_>>(), vec![Some(true), None, Some(false)]);
        assert_eq!(materialize(&flags).data_type(), &arrow::datatypes::DataType::Boolean);

        let blended = MixedColumn::new(vec![Some(Value::Bool(true)), Some(Value::Int(1))]);
        assert!(mixed_to_bool(&blended).is_none());
    }

    #[test]
    fn materialize_falls_back_to_text() {
        let column = MixedColumn::new(vec![Some(Value::Int(1)), Some(Value::from("x")), None]);
        let array = materialize(&column);
        let strings = array.as_any().downcast_ref::<StringArray>().expect("text");
        assert_eq!(strings.value(0), "1");
        assert_eq!(strings.value(1), "x");
        assert!(strings.is_null(2));
    }
}
