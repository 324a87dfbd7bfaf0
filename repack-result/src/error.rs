use std::fmt;
use thiserror::Error;

/// Unified error type for every repack operation.
///
/// Only failures a caller can act on live here. A single narrowing attempt that cannot
/// represent a column (a failed cast, a width that is too small) is a local event inside
/// the dispatcher and never becomes an [`Error`].
///
/// # Error Handling Strategy
///
/// Errors propagate upward with `?`. [`Error::Configuration`] and
/// [`Error::UnresolvedColumn`] abort a whole frame repack; no partially repacked frame is
/// returned alongside them.
#[derive(Error, Debug)]
pub enum Error {
    /// Arrow library error during columnar data operations.
    ///
    /// This error occurs when:
    /// - Building Arrow arrays or dictionaries from repacked values
    /// - Assembling a `RecordBatch` whose schema does not match its columns
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Invalid user input or API parameter.
    ///
    /// Raised for malformed frames: columns of unequal length, duplicate column names,
    /// or references to columns that do not exist.
    #[error("Invalid argument: {0}")]
    InvalidArgumentError(String),

    /// Caller configuration does not match the frame being repacked.
    ///
    /// The most common cause is a frame that carries a structural index other than the
    /// default positional index or the declared key columns. Repacking is undefined in
    /// that case, so the call fails before any column is touched.
    ///
    /// # Recovery
    ///
    /// Not retried. Fix the key column list (or reset the frame's index) and call again.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A column is still in the generic mixed representation after every narrowing
    /// strategy was tried.
    ///
    /// This is the terminal type error: the column holds genuinely mixed data (for
    /// example integers interleaved with free text) that has no single typed form.
    #[error("column '{column}' still holds mixed values ({kinds}) after repacking")]
    UnresolvedColumn {
        /// Name of the offending column.
        column: String,
        /// Comma-separated list of the value kinds observed in the column.
        kinds: String,
    },

    /// An explicit type override could not be applied to a column.
    #[error("cast error: {0}")]
    Cast(String),
}

impl Error {
    /// Create a cast error from any displayable error.
    ///
    /// # Examples
    ///
    /// ```
    /// use repack_result::Error;
    ///
    /// fn parse_width(input: &str) -> Result<u8, Error> {
    ///     input.parse::<u8>().map_err(Error::cast)
    /// }
    ///
    /// assert_eq!(parse_width("8").unwrap(), 8);
    /// assert!(matches!(parse_width("wide"), Err(Error::Cast(_))));
    /// ```
    #[inline]
    pub fn cast<E: fmt::Display>(err: E) -> Self {
        Error::Cast(err.to_string())
    }

    /// Create a configuration error from any displayable message.
    #[inline]
    pub fn configuration<M: fmt::Display>(msg: M) -> Self {
        Error::Configuration(msg.to_string())
    }

    /// Prefix the message of a cast or argument error with the column it concerns.
    ///
    /// Other variants are returned unchanged.
    ///
    /// ```
    /// use repack_result::Error;
    ///
    /// let err = Error::Cast("bad digit".into()).for_column("price");
    /// assert_eq!(err.to_string(), "cast error: column 'price': bad digit");
    /// ```
    pub fn for_column(self, column: &str) -> Self {
        match self {
            Error::Cast(msg) => Error::Cast(format!("column '{column}': {msg}")),
            Error::InvalidArgumentError(msg) => {
                Error::InvalidArgumentError(format!("column '{column}': {msg}"))
            }
            other => other,
        }
    }
}
