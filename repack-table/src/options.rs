use arrow::datatypes::DataType;
use repack_compute::Tolerance;
use rustc_hash::FxHashMap;

use crate::constants::PARALLEL_COLUMN_THRESHOLD;

/// How the per-column loop of a frame repack is scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Parallelism {
    /// Parallel once the frame has [`PARALLEL_COLUMN_THRESHOLD`] columns or more.
    #[default]
    Auto,
    Sequential,
    /// Always map columns over the rayon pool.
    Parallel,
}

impl Parallelism {
    pub fn is_parallel_for(&self, num_columns: usize) -> bool {
        match self {
            Parallelism::Auto => num_columns >= PARALLEL_COLUMN_THRESHOLD,
            Parallelism::Sequential => false,
            Parallelism::Parallel => true,
        }
    }
}

/// Settings for [`crate::repack_frame`].
///
/// Column names in `overrides` and `key_columns` refer to the frame's names *before*
/// `rename` is applied.
#[derive(Debug, Clone, Default)]
pub struct RepackOptions {
    /// Composite primary key. When set, the frame's index must be empty or exactly this.
    pub key_columns: Option<Vec<String>>,
    /// Old name to new name, applied to every column including keys.
    pub rename: FxHashMap<String, String>,
    /// Columns cast directly to the given type instead of being narrowed.
    pub overrides: FxHashMap<String, DataType>,
    pub parallelism: Parallelism,
    pub tolerance: Tolerance,
}

impl RepackOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key_columns<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_columns = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.rename.insert(from.into(), to.into());
        self
    }

    pub fn with_override(mut self, column: impl Into<String>, data_type: DataType) -> Self {
        self.overrides.insert(column.into(), data_type);
        self
    }

    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Final name of `column` after renaming.
    pub fn renamed<'a>(&'a self, column: &'a str) -> &'a str {
        self.rename.get(column).map_or(column, String::as_str)
    }
}
