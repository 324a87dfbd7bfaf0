//! Static width tables consulted by the shrinkers.
//!
//! Each numeric family has one ordered table, narrowest first. Precedence between widths
//! is defined here and nowhere else: the integer shrinker, the float shrinker and the
//! dictionary key selection all walk these tables front to back and stop at the first
//! candidate that fits.

use arrow::datatypes::DataType;

/// Numeric family a width candidate belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NumericFamily {
    SignedInt,
    UnsignedInt,
    Float,
}

/// One `(byte width, family)` entry of a candidate table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WidthCandidate {
    pub byte_width: u8,
    pub family: NumericFamily,
}

const fn candidate(byte_width: u8, family: NumericFamily) -> WidthCandidate {
    WidthCandidate { byte_width, family }
}

/// Signed integer widths, narrowest first.
pub const SIGNED_INTEGERS: &[WidthCandidate] = &[
    candidate(1, NumericFamily::SignedInt),
    candidate(2, NumericFamily::SignedInt),
    candidate(4, NumericFamily::SignedInt),
    candidate(8, NumericFamily::SignedInt),
];

/// Unsigned integer widths, narrowest first.
///
/// 64-bit unsigned is absent: non-negative data too wide for `u32` is stored as signed
/// 64-bit so downstream backends without a `u64` type read it identically.
pub const UNSIGNED_INTEGERS: &[WidthCandidate] = &[
    candidate(1, NumericFamily::UnsignedInt),
    candidate(2, NumericFamily::UnsignedInt),
    candidate(4, NumericFamily::UnsignedInt),
];

/// Floating point widths, narrowest first.
pub const FLOATS: &[WidthCandidate] = &[
    candidate(4, NumericFamily::Float),
    candidate(8, NumericFamily::Float),
];

/// Representation used when an integer column carries no values at all.
pub const ALL_NULL_TYPE: DataType = DataType::Int8;

/// Representation used when no narrower integer candidate fits.
pub const WIDEST_INTEGER_TYPE: DataType = DataType::Int64;

impl WidthCandidate {
    /// Arrow type for this candidate.
    pub fn data_type(&self) -> DataType {
        match (self.family, self.byte_width) {
            (NumericFamily::SignedInt, 1) => DataType::Int8,
            (NumericFamily::SignedInt, 2) => DataType::Int16,
            (NumericFamily::SignedInt, 4) => DataType::Int32,
            (NumericFamily::SignedInt, _) => DataType::Int64,
            (NumericFamily::UnsignedInt, 1) => DataType::UInt8,
            (NumericFamily::UnsignedInt, 2) => DataType::UInt16,
            (NumericFamily::UnsignedInt, 4) => DataType::UInt32,
            (NumericFamily::UnsignedInt, _) => DataType::UInt64,
            (NumericFamily::Float, 2) => DataType::Float16,
            (NumericFamily::Float, 4) => DataType::Float32,
            (NumericFamily::Float, _) => DataType::Float64,
        }
    }

    /// Inclusive native range of an integer candidate. `None` for floats.
    pub fn integer_range(&self) -> Option<(i128, i128)> {
        let bits = u32::from(self.byte_width) * 8;
        match self.family {
            NumericFamily::SignedInt => {
                let half = 1i128 << (bits - 1);
                Some((-half, half - 1))
            }
            NumericFamily::UnsignedInt => Some((0, (1i128 << bits) - 1)),
            NumericFamily::Float => None,
        }
    }

    /// True when every integer in `[min, max]` is representable by this candidate.
    pub fn contains(&self, min: i128, max: i128) -> bool {
        match self.integer_range() {
            Some((lo, hi)) => lo <= min && max <= hi,
            None => false,
        }
    }
}

/// Narrowest integer type holding `[min, max]`.
///
/// Negative minimums walk the signed table; non-negative ones walk the unsigned table and
/// fall back to signed 64-bit. Returns `None` only when even the fallback cannot hold the
/// range (values above `i64::MAX`).
pub fn narrowest_integer(min: i128, max: i128) -> Option<DataType> {
    let table = if min < 0 {
        SIGNED_INTEGERS
    } else {
        UNSIGNED_INTEGERS
    };
    if let Some(found) = table.iter().find(|c| c.contains(min, max)) {
        return Some(found.data_type());
    }
    let (lo, hi) = (i128::from(i64::MIN), i128::from(i64::MAX));
    (lo <= min && max <= hi).then_some(WIDEST_INTEGER_TYPE)
}

/// Narrowest signed type able to index `cardinality` distinct dictionary values.
pub fn dictionary_key_candidate(cardinality: usize) -> WidthCandidate {
    let highest = cardinality.saturating_sub(1) as i128;
    SIGNED_INTEGERS
        .iter()
        .copied()
        .find(|c| c.contains(0, highest))
        .unwrap_or(SIGNED_INTEGERS[SIGNED_INTEGERS.len() - 1])
}
