use std::sync::{Arc, Once};

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

static TRACING: Once = Once::new();

/// Environment variable read before `RUST_LOG` when picking the test log filter.
pub const TEST_LOG_ENV: &str = "REPACK_TEST_LOG";

/// Filter directives used when neither [`TEST_LOG_ENV`] nor `RUST_LOG` is set.
pub const DEFAULT_TEST_FILTER: &str = "warn,repack_compute=info,repack_table=info";

fn test_filter() -> tracing_subscriber::EnvFilter {
    use tracing_subscriber::EnvFilter;
    [TEST_LOG_ENV, "RUST_LOG"]
        .into_iter()
        .find_map(|var| EnvFilter::try_from_env(var).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_TEST_FILTER))
}

/// Install a test-writer `fmt` subscriber once per test binary.
///
/// Later calls are no-ops, and a subscriber installed by someone else is left alone.
pub fn init_tracing_for_tests() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(test_filter())
            .with_target(false)
            .with_test_writer()
            .try_init();
    });
}

/// With `auto-init`, test binaries that link this crate get tracing before `main`.
#[cfg(feature = "auto-init")]
mod auto {
    #[ctor::ctor]
    fn install_test_tracing() {
        super::init_tracing_for_tests();
    }
}

/// Seeded generators for property-style tests and benchmarks.
pub struct ColumnGen {
    rng: StdRng,
    null_ratio: f64,
}

impl ColumnGen {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            null_ratio: 0.0,
        }
    }

    /// Fraction of generated positions that are null.
    pub fn with_null_ratio(mut self, ratio: f64) -> Self {
        self.null_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    fn is_null(&mut self) -> bool {
        self.null_ratio > 0.0 && self.rng.random_bool(self.null_ratio)
    }

    /// `Int64` values drawn uniformly from `lo..=hi`.
    pub fn ints(&mut self, len: usize, lo: i64, hi: i64) -> ArrayRef {
        let values: Vec<Option<i64>> = (0..len)
            .map(|_| {
                if self.is_null() {
                    None
                } else {
                    Some(self.rng.random_range(lo..=hi))
                }
            })
            .collect();
        Arc::new(Int64Array::from(values))
    }

    /// `Float64` values drawn uniformly from `lo..hi`.
    pub fn floats(&mut self, len: usize, lo: f64, hi: f64) -> ArrayRef {
        let values: Vec<Option<f64>> = (0..len)
            .map(|_| {
                if self.is_null() {
                    None
                } else {
                    Some(self.rng.random_range(lo..hi))
                }
            })
            .collect();
        Arc::new(Float64Array::from(values))
    }

    /// `Utf8` integer numerals drawn uniformly from `lo..=hi`.
    pub fn numerals(&mut self, len: usize, lo: i64, hi: i64) -> ArrayRef {
        let values: Vec<Option<String>> = (0..len)
            .map(|_| {
                if self.is_null() {
                    None
                } else {
                    Some(self.rng.random_range(lo..=hi).to_string())
                }
            })
            .collect();
        Arc::new(StringArray::from(values))
    }

    /// `Utf8` values picked from a fixed set of labels.
    pub fn labels(&mut self, len: usize, labels: &[&str]) -> ArrayRef {
        let values: Vec<Option<&str>> = (0..len)
            .map(|_| {
                if self.is_null() || labels.is_empty() {
                    None
                } else {
                    Some(labels[self.rng.random_range(0..labels.len())])
                }
            })
            .collect();
        Arc::new(StringArray::from(values))
    }
}
