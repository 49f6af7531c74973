use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Fixed-point scalar in Q31.32: sign bit, 31 integer bits, 32 fractional
/// bits stored in one `i64`. Represented value = raw / 2^32.
/// Precision: 2^-32 (~2.3e-10). Range: approximately [-2^31, 2^31).
/// Overflow behavior of the checked operators: saturating (clamping).
pub(crate) const FRACTIONAL_BITS: u32 = 32;
pub(crate) const ONE_RAW: i64 = 1 << FRACTIONAL_BITS;
pub(crate) const FRACTION_MASK: i64 = ONE_RAW - 1;

/// Errors raised by the fallible operations. Overflow is deliberately *not*
/// in this taxonomy: the checked operators saturate instead of failing.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedError {
    #[error("input outside the function's domain")]
    DomainError,
    #[error("division by zero")]
    DivisionByZero,
}

/// Errors from parsing a decimal literal into a [`Fix64`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFixedError {
    #[error("empty decimal literal")]
    Empty,
    #[error("invalid digit in decimal literal")]
    InvalidDigit,
    #[error("integer part outside the Q31.32 range")]
    OutOfRange,
}

/// Deterministic Q31.32 fixed-point number.
///
/// Equality, ordering and hashing are total and defined by the raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fix64 {
    raw: i64,
}

impl Fix64 {
    /// Exact 0.0.
    pub const ZERO: Fix64 = Fix64::from_raw(0);
    /// Exact 1.0 (raw 2^32).
    pub const ONE: Fix64 = Fix64::from_raw(ONE_RAW);
    /// Largest representable value, just under 2^31.
    pub const MAX: Fix64 = Fix64::from_raw(i64::MAX);
    /// Smallest representable value, exactly -2^31.
    pub const MIN: Fix64 = Fix64::from_raw(i64::MIN);
    /// Pi.
    pub const PI: Fix64 = Fix64::from_raw(0x3243F6A88);
    /// Pi / 2.
    pub const PI_OVER_2: Fix64 = Fix64::from_raw(0x1921FB544);
    /// 2 * Pi.
    pub const PI_TIMES_2: Fix64 = Fix64::from_raw(0x6487ED511);
    /// Natural logarithm of 2.
    pub const LN2: Fix64 = Fix64::from_raw(0xB17217F7);
    /// Largest base-2 exponent whose power of two is representable (31).
    pub const LOG2MAX: Fix64 = Fix64::from_raw(0x1F_0000_0000);
    /// Smallest base-2 exponent whose power of two is nonzero (-32).
    pub const LOG2MIN: Fix64 = Fix64::from_raw(-0x20_0000_0000);

    /// Reinterprets a raw Q31.32 integer as a `Fix64`. Exact; the raw `i64`
    /// is the crate's only wire format.
    #[must_use]
    pub const fn from_raw(raw: i64) -> Fix64 {
        Fix64 { raw }
    }

    /// Returns the raw Q31.32 storage value.
    #[must_use]
    pub const fn raw(self) -> i64 {
        self.raw
    }

    /// Converts an integer; raw = n * 2^32.
    ///
    /// No overflow check: for |n| >= 2^31 the raw shift wraps, which is the
    /// caller's responsibility to avoid.
    #[must_use]
    pub const fn from_int(n: i64) -> Fix64 {
        Fix64::from_raw(n.wrapping_shl(FRACTIONAL_BITS))
    }

    /// Truncates to an integer, rounding toward negative infinity
    /// (arithmetic shift of the raw value).
    #[must_use]
    pub const fn to_int(self) -> i64 {
        self.raw >> FRACTIONAL_BITS
    }

    /// Converts an `f64`; raw = round(v * 2^32). Lossy in both directions.
    /// Out-of-range and NaN inputs clamp deterministically (`as` semantics).
    #[must_use]
    pub fn from_f64(v: f64) -> Fix64 {
        Fix64::from_raw((v * ONE_RAW as f64).round() as i64)
    }

    /// Converts an `f32`; raw = round(v * 2^32). Lossy in both directions.
    #[must_use]
    pub fn from_f32(v: f32) -> Fix64 {
        Fix64::from_f64(v as f64)
    }

    /// Converts to `f64`. Lossy for values needing more than 53 bits.
    #[must_use]
    pub fn to_f64(self) -> f64 {
        self.raw as f64 / ONE_RAW as f64
    }

    /// Converts to `f32`. Lossy.
    #[must_use]
    pub fn to_f32(self) -> f32 {
        self.to_f64() as f32
    }

    /// Rounds toward negative infinity by clearing the fractional bits.
    #[must_use]
    pub const fn floor(self) -> Fix64 {
        Fix64::from_raw(self.raw & !FRACTION_MASK)
    }

    /// Rounds toward positive infinity: floor plus one whenever any
    /// fractional bit is set (saturating at `MAX`).
    #[must_use]
    pub fn ceil(self) -> Fix64 {
        if self.raw & FRACTION_MASK != 0 {
            self.floor().saturating_add(Fix64::ONE)
        } else {
            self
        }
    }

    /// Rounds to the nearest integer, ties to even.
    ///
    /// The fractional field decides: below the half-point rounds down, above
    /// rounds up, exactly at it we pick whichever neighbor has an even
    /// integral bit.
    #[must_use]
    pub fn round(self) -> Fix64 {
        let fractional = self.raw & FRACTION_MASK;
        let floored = self.floor();
        if fractional < 0x8000_0000 {
            floored
        } else if fractional > 0x8000_0000 {
            floored.saturating_add(Fix64::ONE)
        } else if floored.raw & ONE_RAW == 0 {
            floored
        } else {
            floored.saturating_add(Fix64::ONE)
        }
    }

    /// Rounds toward zero: floor for non-negative values, floor plus one
    /// for negative values with a fractional part.
    #[must_use]
    pub const fn trunc(self) -> Fix64 {
        if self.raw >= 0 || self.raw & FRACTION_MASK == 0 {
            self.floor()
        } else {
            Fix64::from_raw((self.raw & !FRACTION_MASK) + ONE_RAW)
        }
    }

    /// Splits into truncated integral and fractional parts; the fraction
    /// keeps the sign of the input and `int + fract == self` exactly.
    #[must_use]
    pub const fn int_fract(self) -> (Fix64, Fix64) {
        let int = self.trunc();
        (int, Fix64::from_raw(self.raw - int.raw))
    }

    /// -1, 0 or +1 from the sign of the raw value.
    #[must_use]
    pub const fn signum(self) -> Fix64 {
        if self.raw < 0 {
            Fix64::from_raw(-ONE_RAW)
        } else if self.raw == 0 {
            Fix64::ZERO
        } else {
            Fix64::ONE
        }
    }

    /// Absolute value via branchless sign-mask negation.
    /// `MIN` cannot be negated and saturates to `MAX`.
    #[must_use]
    pub const fn abs(self) -> Fix64 {
        if self.raw == i64::MIN {
            return Fix64::MAX;
        }
        let mask = self.raw >> 63;
        Fix64::from_raw((self.raw + mask) ^ mask)
    }

    /// Absolute value without the `MIN` edge case. Undefined (wraps) for
    /// `MIN`; use [`Fix64::abs`] unless the input range is known.
    #[must_use]
    pub const fn fast_abs(self) -> Fix64 {
        let mask = self.raw >> 63;
        Fix64::from_raw(self.raw.wrapping_add(mask) ^ mask)
    }
}

impl fmt::Display for Fix64 {
    /// Renders as decimal with up to 10 fractional digits, trailing zeros
    /// trimmed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mag = self.raw.unsigned_abs();
        let int_part = mag >> FRACTIONAL_BITS;
        let frac = mag & FRACTION_MASK as u64;

        // scale the 32 fractional bits to 10 decimal digits, round to
        // nearest; the largest fraction rounds to 9_999_999_998, so this
        // never carries into the integer part
        let digits =
            ((frac as u128 * 10_000_000_000u128 + (1u128 << 31)) >> FRACTIONAL_BITS) as u64;

        if self.raw < 0 {
            f.write_str("-")?;
        }
        if digits == 0 {
            write!(f, "{int_part}")
        } else {
            let s = format!("{digits:010}");
            write!(f, "{int_part}.{}", s.trim_end_matches('0'))
        }
    }
}

impl FromStr for Fix64 {
    type Err = ParseFixedError;

    /// Parses a plain decimal literal (`-3.25`, `0.0000000001`) in pure
    /// integer arithmetic, so the conversion keeps more significant digits
    /// than a round-trip through `f64`. Fractional digits beyond the 19th
    /// are below the format's precision and ignored.
    fn from_str(s: &str) -> Result<Fix64, ParseFixedError> {
        let (negative, body) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            Some(_) => (false, s),
            None => return Err(ParseFixedError::Empty),
        };
        if body.is_empty() {
            return Err(ParseFixedError::Empty);
        }

        let (int_text, frac_text) = match body.split_once('.') {
            Some((i, f)) => (i, f),
            None => (body, ""),
        };
        if int_text.is_empty() && frac_text.is_empty() {
            return Err(ParseFixedError::Empty);
        }

        let mut int_part: u64 = 0;
        for b in int_text.bytes() {
            if !b.is_ascii_digit() {
                return Err(ParseFixedError::InvalidDigit);
            }
            int_part = int_part
                .checked_mul(10)
                .and_then(|v| v.checked_add((b - b'0') as u64))
                .ok_or(ParseFixedError::OutOfRange)?;
        }

        // at most 19 fractional digits keeps the scaling inside u128
        let mut frac_num: u128 = 0;
        let mut frac_den: u128 = 1;
        for b in frac_text.bytes().take(19) {
            if !b.is_ascii_digit() {
                return Err(ParseFixedError::InvalidDigit);
            }
            frac_num = frac_num * 10 + (b - b'0') as u128;
            frac_den *= 10;
        }
        for b in frac_text.bytes().skip(19) {
            if !b.is_ascii_digit() {
                return Err(ParseFixedError::InvalidDigit);
            }
        }
        let frac_raw = ((frac_num << FRACTIONAL_BITS) + frac_den / 2) / frac_den;

        let mag = ((int_part as i128) << FRACTIONAL_BITS) + frac_raw as i128;
        let raw = if negative { -mag } else { mag };
        if raw < i64::MIN as i128 || raw > i64::MAX as i128 {
            return Err(ParseFixedError::OutOfRange);
        }
        Ok(Fix64::from_raw(raw as i64))
    }
}
