//! Column-level narrowing for the repack workspace.
//!
//! The pieces, leaves first:
//!
//! - [`oracle`]: null-aware, tolerance-aware equality used to confirm every narrowing.
//! - [`candidates`]: the ordered width tables for each numeric family.
//! - [`shrink`]: integer and float shrinkers built on those tables.
//! - [`strategy`]: the ordered `to_int` / `to_float` / `to_category` strategies for
//!   ambiguous columns.
//! - [`repack_column`]: the single-column entry point.

pub mod candidates;
pub mod column;
mod convert;
pub mod oracle;
mod repack;
pub mod shrink;
pub mod strategy;

pub use column::{MixedColumn, RawColumn, Value, ValueKind};
pub use convert::STRICT_CAST;
pub use oracle::{Tolerance, equal, equal_with};
pub use repack::{RepackOutcome, cast_override, repack_column, repack_column_with};
pub use strategy::{NarrowingStrategy, StrategyFailure, dispatch};
