//! Integer square root on the raw magnitude.

use crate::fixed_point::{Fix64, FixedError};

/// Digit-by-digit root extraction over the unsigned raw value.
///
/// Runs in two 32-bit-windowed passes so no intermediate ever needs more
/// than 64 bits: the first pass extracts the upper half of the result bits,
/// then the remainder and partial result are rescaled by 32 bits and the
/// second pass extracts the lower half. When the remainder is too large to
/// survive the rescaling shift without losing a bit, the partial result is
/// folded in first and a half-bit correction applied. A final comparison
/// rounds up by one raw unit if the true remainder exceeds the candidate.
pub(crate) fn sqrt_raw(xl: i64) -> i64 {
    let mut num = xl as u64;
    let mut result = 0u64;

    // start at the highest power of four at or below the input
    let mut bit = 1u64 << 62;
    while bit > num {
        bit >>= 2;
    }

    for pass in 0..2 {
        while bit != 0 {
            if num >= result + bit {
                num -= result + bit;
                result = (result >> 1) + bit;
            } else {
                result >>= 1;
            }
            bit >>= 2;
        }

        if pass == 0 {
            // rescale for the fractional half of the result
            if num > (1u64 << 32) - 1 {
                // the remainder would lose its top bit in the shift
                num -= result;
                num = num.wrapping_shl(32).wrapping_sub(0x8000_0000);
                result = (result << 32) + 0x8000_0000;
            } else {
                num <<= 32;
                result <<= 32;
            }
            bit = 1u64 << 30;
        }
    }

    if num > result {
        result += 1;
    }
    result as i64
}

impl Fix64 {
    /// Square root, or [`FixedError::DomainError`] for negative input.
    ///
    /// Exact for perfect squares; otherwise correct to within one raw unit.
    pub fn try_sqrt(self) -> Result<Fix64, FixedError> {
        if self.raw() < 0 {
            return Err(FixedError::DomainError);
        }
        Ok(Fix64::from_raw(sqrt_raw(self.raw())))
    }
}
