//! Frame-level repacking.
//!
//! A [`Frame`] holds named columns and an optional composite primary key.
//! [`repack_frame`] narrows every column with `repack-compute`, applies per-column type
//! overrides and renames, and guarantees that no column is left in the mixed
//! representation.
//!
//! ```
//! use std::sync::Arc;
//! use arrow::array::{ArrayRef, Float64Array, Int64Array};
//! use arrow::datatypes::DataType;
//! use repack_table::{Frame, NamedColumn, RepackOptions, repack_frame};
//!
//! let frame = Frame::try_new(vec![
//!     NamedColumn::new("id", Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef),
//!     NamedColumn::new("value", Arc::new(Float64Array::from(vec![0.5, 1.5, 2.5])) as ArrayRef),
//! ])
//! .unwrap();
//!
//! let options = RepackOptions::new().with_key_columns(["id"]);
//! let repacked = repack_frame(frame, &options).unwrap();
//!
//! assert_eq!(repacked.index_names(), vec!["id"]);
//! assert_eq!(repacked.column("id").unwrap().data_type(), Some(&DataType::UInt8));
//! assert_eq!(repacked.column("value").unwrap().data_type(), Some(&DataType::Float32));
//! ```

pub mod constants;
mod frame;
mod options;
mod repack;
mod report;

pub use frame::{Frame, NamedColumn};
pub use options::{Parallelism, RepackOptions};
pub use repack::{repack_frame, repack_frame_with_report};
pub use report::{ColumnReport, RepackReport};
