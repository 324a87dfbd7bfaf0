//! Repack: automatic columnar dtype narrowing
//!
//! This crate is the entrypoint for the repack workspace. It re-exports the column and
//! frame APIs from the underlying `repack-*` crates.
//!
//! Given a table whose columns carry oversized or ambiguous representations (64-bit
//! floats, loosely typed values, numbers stored as text), repacking picks for every
//! column the smallest Arrow type that keeps each value (floats within a relative
//! tolerance of `1e-5`) and every null position.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use repack::arrow::array::{ArrayRef, StringArray};
//! use repack::arrow::datatypes::DataType;
//! use repack::{RawColumn, repack_column};
//!
//! let numerals: ArrayRef = Arc::new(StringArray::from(vec!["1", "2", "3"]));
//! let packed = repack_column(RawColumn::Array(numerals), None).unwrap();
//! assert_eq!(packed.data_type(), Some(&DataType::UInt8));
//! ```
//!
//! # Architecture
//!
//! - **Column kernels** (`repack-compute`): equality oracle, width tables, integer and
//!   float shrinkers, and the ordered `to_int` / `to_float` / `to_category` strategies.
//! - **Frames** (`repack-table`): named columns, composite primary keys, renames,
//!   per-column overrides and parallel narrowing across columns.
//! - **Errors** (`repack-result`): the shared [`Error`] enum.

pub use arrow;

pub use repack_compute::{
    MixedColumn, NarrowingStrategy, RawColumn, RepackOutcome, StrategyFailure, Tolerance, Value,
    ValueKind, repack_column, repack_column_with,
};
pub use repack_result::{Error, Result};
pub use repack_table::{
    ColumnReport, Frame, NamedColumn, Parallelism, RepackOptions, RepackReport, repack_frame,
    repack_frame_with_report,
};

pub mod oracle {
    //! Null-aware, tolerance-aware array equality.

    pub use repack_compute::oracle::{Tolerance, equal, equal_with};
}

pub mod candidates {
    //! Ordered width tables consulted by the shrinkers.

    pub use repack_compute::candidates::{
        FLOATS, NumericFamily, SIGNED_INTEGERS, UNSIGNED_INTEGERS, WidthCandidate,
        narrowest_integer,
    };
}
