#![forbid(unsafe_code)]

/// Schema metadata key under which a frame's primary key columns are recorded.
pub const PRIMARY_KEY_META_KEY: &str = "primary_key";

/// Separator between key column names in [`PRIMARY_KEY_META_KEY`].
pub const PRIMARY_KEY_SEPARATOR: char = ',';

/// Column count from which [`crate::RepackOptions::default`] narrows columns in parallel.
pub const PARALLEL_COLUMN_THRESHOLD: usize = 16;
