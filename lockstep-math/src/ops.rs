//! Saturating arithmetic and the unchecked fast variants.
//!
//! The checked operations detect signed overflow manually (multi-word for
//! multiplication) and clamp to [`Fix64::MAX`] / [`Fix64::MIN`] chosen by
//! operand sign. The `wrapping_*` variants skip every check and may produce
//! wrapped bit patterns: they exist for hot paths where operands are known
//! to stay in range.

use std::ops::{
    Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Rem, RemAssign, Sub, SubAssign,
};

use crate::fixed_point::{Fix64, FixedError, ONE_RAW};

/// Accumulates `b` into `a`, recording in `overflow` whether the signed sum
/// wrapped.
fn add_overflow(a: i64, b: i64, overflow: &mut bool) -> i64 {
    let sum = a.wrapping_add(b);
    *overflow |= ((a ^ b ^ sum) & i64::MIN) != 0;
    sum
}

/// Division core. The divisor must be nonzero; callers check.
///
/// Restoring binary long division on the unsigned magnitudes. Each step
/// shifts the remainder up by its leading-zero count so every iteration
/// contributes as many quotient bits as possible, and divisors divisible by
/// 16 are pre-shifted away. A partial quotient that does not fit the
/// remaining bit budget means the true quotient overflows: clamp by sign
/// agreement. The final quotient is rounded to nearest.
pub(crate) fn div_raw(xl: i64, yl: i64) -> i64 {
    debug_assert!(yl != 0);

    let mut remainder = xl.unsigned_abs();
    let mut divider = yl.unsigned_abs();
    let mut quotient = 0u64;
    let mut bit_pos = 64 / 2 + 1;

    // divisor divisible by 2^4: cheap pre-shift
    while divider & 0xF == 0 && bit_pos >= 4 {
        divider >>= 4;
        bit_pos -= 4;
    }

    while remainder != 0 && bit_pos >= 0 {
        let mut shift = remainder.leading_zeros() as i32;
        if shift > bit_pos {
            shift = bit_pos;
        }
        remainder <<= shift;
        bit_pos -= shift;

        let div = remainder / divider;
        remainder %= divider;
        quotient = quotient.wrapping_add(div << bit_pos);

        // quotient bits above the remaining budget cannot be represented
        if div & !(u64::MAX >> bit_pos) != 0 {
            return if (xl ^ yl) >= 0 { i64::MAX } else { i64::MIN };
        }

        remainder <<= 1;
        bit_pos -= 1;
    }

    // round to nearest
    quotient = quotient.wrapping_add(1);
    let mut result = (quotient >> 1) as i64;
    if (xl ^ yl) < 0 {
        result = -result;
    }
    result
}

impl Fix64 {
    /// Adds, clamping to `MAX`/`MIN` on overflow.
    #[must_use]
    pub fn saturating_add(self, rhs: Fix64) -> Fix64 {
        let (x, y) = (self.raw(), rhs.raw());
        let sum = x.wrapping_add(y);
        // same-sign operands with an opposite-sign sum means the sum wrapped
        if (!(x ^ y) & (x ^ sum)) < 0 {
            return if x > 0 { Fix64::MAX } else { Fix64::MIN };
        }
        Fix64::from_raw(sum)
    }

    /// Adds without any overflow check.
    #[must_use]
    pub fn wrapping_add(self, rhs: Fix64) -> Fix64 {
        Fix64::from_raw(self.raw().wrapping_add(rhs.raw()))
    }

    /// Subtracts, clamping to `MIN`/`MAX` on overflow.
    #[must_use]
    pub fn saturating_sub(self, rhs: Fix64) -> Fix64 {
        let (x, y) = (self.raw(), rhs.raw());
        let diff = x.wrapping_sub(y);
        if ((x ^ y) & (x ^ diff)) < 0 {
            return if x < 0 { Fix64::MIN } else { Fix64::MAX };
        }
        Fix64::from_raw(diff)
    }

    /// Subtracts without any overflow check.
    #[must_use]
    pub fn wrapping_sub(self, rhs: Fix64) -> Fix64 {
        Fix64::from_raw(self.raw().wrapping_sub(rhs.raw()))
    }

    /// Negates; `-MIN` is not representable and saturates to `MAX`.
    #[must_use]
    pub const fn saturating_neg(self) -> Fix64 {
        if self.raw() == i64::MIN {
            Fix64::MAX
        } else {
            Fix64::from_raw(-self.raw())
        }
    }

    /// Multiplies, clamping on overflow.
    ///
    /// Both raw operands are split into 32-bit halves and the four partial
    /// products are accumulated with per-step overflow tracking. The unused
    /// top bits of the high*high term and the magnitude relationship of
    /// opposite-sign operands catch the overflows the accumulation alone
    /// misses. Truncates toward negative infinity like the raw shift.
    #[must_use]
    pub fn saturating_mul(self, rhs: Fix64) -> Fix64 {
        let (xl, yl) = (self.raw(), rhs.raw());

        let xlo = xl as u64 & 0xFFFF_FFFF;
        let xhi = xl >> 32;
        let ylo = yl as u64 & 0xFFFF_FFFF;
        let yhi = yl >> 32;

        let lolo = xlo * ylo;
        let lohi = xlo as i64 * yhi;
        let hilo = xhi * ylo as i64;
        let hihi = xhi * yhi;

        let lo_result = (lolo >> 32) as i64;
        let hi_result = hihi << 32;

        let mut overflow = false;
        let mut sum = add_overflow(lo_result, lohi, &mut overflow);
        sum = add_overflow(sum, hilo, &mut overflow);
        sum = add_overflow(sum, hi_result, &mut overflow);

        let op_signs_equal = (xl ^ yl) >= 0;

        // same-sign operands can only produce a non-negative true product;
        // a negative (or carried) sum means it clipped
        if op_signs_equal {
            if sum < 0 || (overflow && xl > 0) {
                return Fix64::MAX;
            }
        } else if sum > 0 {
            return Fix64::MIN;
        }

        // bits of high*high above the 32 usable ones must be pure sign
        let top_carry = hihi >> 32;
        if top_carry != 0 && top_carry != -1 {
            return if op_signs_equal { Fix64::MAX } else { Fix64::MIN };
        }

        // opposite signs: a "result" larger than the negative operand with
        // both magnitudes past one can only come from wraparound
        if !op_signs_equal {
            let (pos_op, neg_op) = if xl > yl { (xl, yl) } else { (yl, xl) };
            if sum > neg_op && neg_op < -ONE_RAW && pos_op > ONE_RAW {
                return Fix64::MIN;
            }
        }

        Fix64::from_raw(sum)
    }

    /// Multiplies without any overflow analysis.
    #[must_use]
    pub fn wrapping_mul(self, rhs: Fix64) -> Fix64 {
        let (xl, yl) = (self.raw(), rhs.raw());

        let xlo = xl as u64 & 0xFFFF_FFFF;
        let xhi = xl >> 32;
        let ylo = yl as u64 & 0xFFFF_FFFF;
        let yhi = yl >> 32;

        let lo = ((xlo * ylo) >> 32) as i64;
        let sum = lo
            .wrapping_add(xlo as i64 * yhi)
            .wrapping_add(xhi * ylo as i64)
            .wrapping_add((xhi * yhi) << 32);
        Fix64::from_raw(sum)
    }

    /// Divides, or fails with [`FixedError::DivisionByZero`] when the
    /// divisor's raw value is zero. Overflowing quotients clamp by operand
    /// sign agreement; the result is rounded to nearest.
    pub fn try_div(self, rhs: Fix64) -> Result<Fix64, FixedError> {
        if rhs.raw() == 0 {
            return Err(FixedError::DivisionByZero);
        }
        Ok(Fix64::from_raw(div_raw(self.raw(), rhs.raw())))
    }

    /// Remainder of the raw division, or [`FixedError::DivisionByZero`].
    ///
    /// `MIN % -1` is the one combination that would trap on two's-complement
    /// hardware; it returns zero instead.
    pub fn try_rem(self, rhs: Fix64) -> Result<Fix64, FixedError> {
        if rhs.raw() == 0 {
            return Err(FixedError::DivisionByZero);
        }
        if self.raw() == i64::MIN && rhs.raw() == -1 {
            return Ok(Fix64::ZERO);
        }
        Ok(Fix64::from_raw(self.raw() % rhs.raw()))
    }

    /// Plain raw remainder without the `MIN % -1` guard.
    ///
    /// # Panics
    ///
    /// Panics on a zero divisor and on `MIN % -1`, exactly like `i64::%`.
    #[must_use]
    pub fn fast_rem(self, rhs: Fix64) -> Fix64 {
        Fix64::from_raw(self.raw() % rhs.raw())
    }
}

impl Add for Fix64 {
    type Output = Fix64;
    fn add(self, rhs: Fix64) -> Fix64 {
        self.saturating_add(rhs)
    }
}

impl AddAssign for Fix64 {
    fn add_assign(&mut self, rhs: Fix64) {
        *self = self.saturating_add(rhs);
    }
}

impl Sub for Fix64 {
    type Output = Fix64;
    fn sub(self, rhs: Fix64) -> Fix64 {
        self.saturating_sub(rhs)
    }
}

impl SubAssign for Fix64 {
    fn sub_assign(&mut self, rhs: Fix64) {
        *self = self.saturating_sub(rhs);
    }
}

impl Mul for Fix64 {
    type Output = Fix64;
    fn mul(self, rhs: Fix64) -> Fix64 {
        self.saturating_mul(rhs)
    }
}

impl MulAssign for Fix64 {
    fn mul_assign(&mut self, rhs: Fix64) {
        *self = self.saturating_mul(rhs);
    }
}

impl Div for Fix64 {
    type Output = Fix64;
    /// # Panics
    ///
    /// Panics on a zero divisor; use [`Fix64::try_div`] to handle it.
    fn div(self, rhs: Fix64) -> Fix64 {
        match self.try_div(rhs) {
            Ok(v) => v,
            Err(_) => panic!("Fix64 division by zero"),
        }
    }
}

impl DivAssign for Fix64 {
    fn div_assign(&mut self, rhs: Fix64) {
        *self = *self / rhs;
    }
}

impl Rem for Fix64 {
    type Output = Fix64;
    /// # Panics
    ///
    /// Panics on a zero divisor; use [`Fix64::try_rem`] to handle it.
    fn rem(self, rhs: Fix64) -> Fix64 {
        match self.try_rem(rhs) {
            Ok(v) => v,
            Err(_) => panic!("Fix64 remainder by zero"),
        }
    }
}

impl RemAssign for Fix64 {
    fn rem_assign(&mut self, rhs: Fix64) {
        *self = *self % rhs;
    }
}

impl Neg for Fix64 {
    type Output = Fix64;
    fn neg(self) -> Fix64 {
        self.saturating_neg()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_saturates_at_bounds() {
        assert_eq!(Fix64::MAX + Fix64::ONE, Fix64::MAX);
        assert_eq!(Fix64::MIN + -Fix64::ONE, Fix64::MIN);
        assert_eq!(Fix64::from_int(2) + Fix64::from_int(3), Fix64::from_int(5));
    }

    #[test]
    fn test_sub_saturates_at_bounds() {
        assert_eq!(Fix64::MIN - Fix64::ONE, Fix64::MIN);
        assert_eq!(Fix64::MAX - -Fix64::ONE, Fix64::MAX);
        assert_eq!(Fix64::from_int(2) - Fix64::from_int(5), Fix64::from_int(-3));
    }

    #[test]
    fn test_neg_min_saturates() {
        assert_eq!(-Fix64::MIN, Fix64::MAX);
        assert_eq!(-Fix64::from_int(7), Fix64::from_int(-7));
    }

    #[test]
    fn test_mul_exact_small_products() {
        let half = Fix64::from_raw(ONE_RAW / 2);
        assert_eq!(half * half, Fix64::from_raw(ONE_RAW / 4));
        assert_eq!(
            Fix64::from_int(-3) * Fix64::from_int(4),
            Fix64::from_int(-12)
        );
    }

    #[test]
    fn test_mul_overflow_clamps_by_sign() {
        let big = Fix64::from_int(1 << 20);
        assert_eq!(big * big, Fix64::MAX);
        assert_eq!(-big * big, Fix64::MIN);
        assert_eq!(big * -big, Fix64::MIN);
        assert_eq!(-big * -big, Fix64::MAX);
    }

    #[test]
    fn test_div_exact_half() {
        let half = Fix64::ONE.try_div(Fix64::from_int(2)).unwrap();
        assert_eq!(half.raw(), 1i64 << 31);
    }

    #[test]
    fn test_div_rounds_to_nearest() {
        // 1/3 rounded to nearest raw unit
        let third = Fix64::ONE.try_div(Fix64::from_int(3)).unwrap();
        let back = third * Fix64::from_int(3);
        assert!((back.to_f64() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_div_overflow_clamps_by_sign() {
        let tiny = Fix64::from_raw(1);
        assert_eq!(Fix64::from_int(1 << 20).try_div(tiny), Ok(Fix64::MAX));
        assert_eq!(Fix64::from_int(-(1 << 20)).try_div(tiny), Ok(Fix64::MIN));
    }

    #[test]
    fn test_div_by_zero_errors() {
        assert_eq!(
            Fix64::ONE.try_div(Fix64::ZERO),
            Err(FixedError::DivisionByZero)
        );
        assert_eq!(
            Fix64::ZERO.try_div(Fix64::ZERO),
            Err(FixedError::DivisionByZero)
        );
    }

    #[test]
    #[should_panic(expected = "division by zero")]
    fn test_div_operator_panics_on_zero() {
        let _ = Fix64::ONE / Fix64::ZERO;
    }

    #[test]
    fn test_rem_guard_for_min_by_negative_one() {
        let minus_one_raw = Fix64::from_raw(-1);
        assert_eq!(Fix64::MIN.try_rem(minus_one_raw), Ok(Fix64::ZERO));
        assert_eq!(
            Fix64::ONE.try_rem(Fix64::ZERO),
            Err(FixedError::DivisionByZero)
        );
        let x: Fix64 = "7.5".parse().unwrap();
        assert_eq!(x % Fix64::from_int(2), "1.5".parse().unwrap());
    }

    #[test]
    fn test_fast_rem_matches_raw_remainder() {
        let x: Fix64 = "7.5".parse().unwrap();
        assert_eq!(x.fast_rem(Fix64::from_int(2)), "1.5".parse().unwrap());
        // sign follows the dividend, like i64::%
        let neg: Fix64 = "-7.5".parse().unwrap();
        assert_eq!(neg.fast_rem(Fix64::from_int(2)), "-1.5".parse().unwrap());
        assert_eq!(x.fast_rem(Fix64::from_int(-2)), "1.5".parse().unwrap());
    }

    #[test]
    fn test_wrapping_variants_match_checked_in_range() {
        let a: Fix64 = "12.25".parse().unwrap();
        let b: Fix64 = "-3.5".parse().unwrap();
        assert_eq!(a.wrapping_add(b), a + b);
        assert_eq!(a.wrapping_sub(b), a - b);
        assert_eq!(a.wrapping_mul(b), a * b);
    }
}
