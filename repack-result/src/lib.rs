//! Error types and result definitions for the repack workspace.
//!
//! Every crate in the workspace returns [`Result<T>`] with the shared [`Error`] enum so
//! failures cross crate boundaries with `?` and callers can match on the variant that
//! matters to them.
//!
//! # Error Categories
//!
//! - **Data format errors** ([`Error::Arrow`]): Arrow array or batch construction failures
//! - **User input errors** ([`Error::InvalidArgumentError`]): malformed frames, unknown columns
//! - **Configuration errors** ([`Error::Configuration`]): a frame's index disagrees with
//!   the declared key
//! - **Terminal type errors** ([`Error::UnresolvedColumn`]): mixed data that no strategy could type
//! - **Cast errors** ([`Error::Cast`]): an explicit override the data cannot satisfy

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
