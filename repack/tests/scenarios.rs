//! End-to-end narrowing scenarios through the public facade.

use std::sync::Arc;

use repack::arrow::array::{Array, ArrayRef, AsArray, Float64Array, Int64Array, StringArray};
use repack::arrow::datatypes::{DataType, UInt8Type};
use repack::{
    Error, Frame, MixedColumn, NamedColumn, RawColumn, RepackOptions, Value, repack_column,
    repack_frame,
};

fn packed(array: ArrayRef) -> ArrayRef {
    repack_column(RawColumn::Array(array), None)
        .expect("repack")
        .into_array()
        .expect("typed column")
}

#[test]
fn small_integers_become_u8() {
    let out = packed(Arc::new(Int64Array::from(vec![1, 2, 3])));
    assert_eq!(out.data_type(), &DataType::UInt8);
    assert_eq!(out.null_count(), 0);
}

#[test]
fn nulls_keep_their_positions() {
    let out = packed(Arc::new(Int64Array::from(vec![Some(1), Some(2), None, Some(3)])));
    let values = out.as_primitive::<UInt8Type>();
    assert_eq!(
        values.iter().collect::<Vec<_>>(),
        vec![Some(1), Some(2), None, Some(3)]
    );
}

#[test]
fn numerals_stored_as_text_become_u8() {
    let out = packed(Arc::new(StringArray::from(vec!["1", "2", "3"])));
    assert_eq!(out.data_type(), &DataType::UInt8);
}

#[test]
fn fractional_floats_narrow_to_f32_within_tolerance() {
    let out = packed(Arc::new(Float64Array::from(vec![1.0, 2.2, 3.0])));
    assert_eq!(out.data_type(), &DataType::Float32);
}

#[test]
fn floats_needing_full_precision_stay_f64() {
    let out = packed(Arc::new(Float64Array::from(vec![0.5, 1.000_000_000_1e-30, 3.0e300])));
    assert_eq!(out.data_type(), &DataType::Float64);
}

#[test]
fn repeated_labels_become_a_dictionary() {
    let labels: Vec<&str> = ["low", "medium", "high"].into_iter().cycle().take(300).collect();
    let out = packed(Arc::new(StringArray::from(labels)));
    assert!(matches!(out.data_type(), DataType::Dictionary(_, value) if **value == DataType::Utf8));
    assert_eq!(out.as_any_dictionary().values().len(), 3);
}

#[test]
fn mixed_numbers_and_numerals_resolve_to_integers() {
    let column = MixedColumn::new(vec![
        Some(Value::Int(10)),
        Some(Value::from("20")),
        None,
        Some(Value::Float(30.0)),
    ]);
    let out = repack_column(column.into(), None).unwrap();
    assert_eq!(out.data_type(), Some(&DataType::UInt8));
}

#[test]
fn composite_key_round_trips_through_a_record_batch() {
    let frame = Frame::try_new(vec![
        NamedColumn::new(
            "id",
            Arc::new(StringArray::from(vec!["7", "7", "8"])) as ArrayRef,
        ),
        NamedColumn::new(
            "year",
            Arc::new(Int64Array::from(vec![1990, 1991, 1990])) as ArrayRef,
        ),
        NamedColumn::new(
            "share",
            Arc::new(Float64Array::from(vec![Some(0.25), None, Some(0.75)])) as ArrayRef,
        ),
    ])
    .unwrap()
    .set_index(&["id", "year"])
    .unwrap();

    let options = RepackOptions::new().with_key_columns(["id", "year"]);
    let repacked = repack_frame(frame, &options).unwrap();
    let batch = repacked.to_record_batch().unwrap();

    let restored = Frame::try_from_record_batch(&batch, None).unwrap();
    assert_eq!(restored.index_names(), vec!["id", "year"]);
    assert_eq!(
        restored.column("year").and_then(RawColumn::data_type),
        Some(&DataType::UInt16)
    );
}

#[test]
fn unrelated_index_is_rejected_before_narrowing() {
    let frame = Frame::try_new(vec![
        NamedColumn::new("row", Arc::new(Int64Array::from(vec![0, 1])) as ArrayRef),
        NamedColumn::new("id", Arc::new(Int64Array::from(vec![5, 6])) as ArrayRef),
        NamedColumn::new("year", Arc::new(Int64Array::from(vec![2000, 2001])) as ArrayRef),
    ])
    .unwrap()
    .set_index(&["row"])
    .unwrap();

    let options = RepackOptions::new().with_key_columns(["id", "year"]);
    assert!(matches!(
        repack_frame(frame, &options),
        Err(Error::Configuration(_))
    ));
}
