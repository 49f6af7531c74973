//! Series-evaluated transcendentals: inverse trigonometry, logarithms and
//! powers of two.
//!
//! Internal divisions go through `div_raw` directly when the divisor is
//! provably nonzero; only genuine caller misuse surfaces as [`FixedError`].

use crate::fixed_point::{Fix64, FixedError, FRACTIONAL_BITS, FRACTION_MASK, ONE_RAW};
use crate::ops::div_raw;

/// 0.28 in raw Q31.32, the coefficient in atan2's rational denominator.
const C0P28: Fix64 = Fix64::from_raw(0x47AE147B);

impl Fix64 {
    /// Arctangent via a convergent rational-term series.
    ///
    /// Odd symmetry handles negatives, the identity
    /// `atan(z) = Pi/2 - atan(1/z)` handles |z| > 1, and the series runs up
    /// to 28 terms or until the running term underflows to raw zero.
    #[must_use]
    pub fn atan(self) -> Fix64 {
        if self.raw() == 0 {
            return Fix64::ZERO;
        }

        let neg = self.raw() < 0;
        let mut z = if neg { -self } else { self };

        let two = Fix64::from_int(2);
        let three = Fix64::from_int(3);

        let invert = z > Fix64::ONE;
        if invert {
            z = Fix64::from_raw(div_raw(ONE_RAW, z.raw()));
        }

        let mut result = Fix64::ONE;
        let mut term = Fix64::ONE;

        let z_sq = z * z;
        let z_sq_2 = z_sq * two;
        let z_sq_plus_one = z_sq + Fix64::ONE;
        let z_sq_12 = z_sq_plus_one * two;
        let mut dividend = z_sq_2;
        let mut divisor = z_sq_plus_one * three;

        for _ in 2..30 {
            term = term * Fix64::from_raw(div_raw(dividend.raw(), divisor.raw()));
            result += term;

            dividend += z_sq_2;
            divisor += z_sq_12;

            if term.raw() == 0 {
                break;
            }
        }

        result = Fix64::from_raw(div_raw((result * z).raw(), z_sq_plus_one.raw()));

        if invert {
            result = Fix64::PI_OVER_2 - result;
        }
        if neg {
            result = -result;
        }
        result
    }

    /// Four-quadrant arctangent of `self / x` (self is the y coordinate).
    ///
    /// Exact on the axes; elsewhere one of two rational approximations is
    /// picked on |y/x| vs 1 and the quadrant correction of plus or minus Pi
    /// applied from the operand signs. A saturated approximation
    /// denominator short-circuits to plus or minus Pi/2.
    #[must_use]
    pub fn atan2(self, x: Fix64) -> Fix64 {
        let yl = self.raw();
        let xl = x.raw();

        if xl == 0 {
            return if yl > 0 {
                Fix64::PI_OVER_2
            } else if yl == 0 {
                Fix64::ZERO
            } else {
                -Fix64::PI_OVER_2
            };
        }

        let z = Fix64::from_raw(div_raw(yl, xl));
        let small = C0P28 * z * z;

        if Fix64::ONE + small == Fix64::MAX {
            return if yl < 0 {
                -Fix64::PI_OVER_2
            } else {
                Fix64::PI_OVER_2
            };
        }

        if z.abs() < Fix64::ONE {
            let atan = Fix64::from_raw(div_raw(z.raw(), (Fix64::ONE + small).raw()));
            if xl < 0 {
                if yl < 0 {
                    return atan - Fix64::PI;
                }
                return atan + Fix64::PI;
            }
            atan
        } else {
            let atan =
                Fix64::PI_OVER_2 - Fix64::from_raw(div_raw(z.raw(), (z * z + C0P28).raw()));
            if yl < 0 {
                return atan - Fix64::PI;
            }
            atan
        }
    }

    /// Arccosine, or [`FixedError::DomainError`] outside [-1, 1].
    pub fn try_acos(self) -> Result<Fix64, FixedError> {
        if self < -Fix64::ONE || self > Fix64::ONE {
            return Err(FixedError::DomainError);
        }
        if self.raw() == 0 {
            return Ok(Fix64::PI_OVER_2);
        }

        let root = (Fix64::ONE - self * self).try_sqrt()?;
        let result = Fix64::from_raw(div_raw(root.raw(), self.raw())).atan();
        Ok(if self.raw() < 0 {
            result + Fix64::PI
        } else {
            result
        })
    }

    /// Base-2 logarithm, or [`FixedError::DomainError`] for input <= 0.
    ///
    /// The argument is normalized into [1, 2) by shifting, accumulating the
    /// shift count into the integer bits of the result; 32 squaring rounds
    /// then extract one fractional bit each, with halving weight.
    pub fn try_log2(self) -> Result<Fix64, FixedError> {
        if self.raw() <= 0 {
            return Err(FixedError::DomainError);
        }

        let mut b = 1i64 << (FRACTIONAL_BITS - 1);
        let mut y = 0i64;

        let mut raw_x = self.raw();
        while raw_x < ONE_RAW {
            raw_x <<= 1;
            y -= ONE_RAW;
        }
        while raw_x >= ONE_RAW << 1 {
            raw_x >>= 1;
            y += ONE_RAW;
        }

        let mut z = Fix64::from_raw(raw_x);
        for _ in 0..FRACTIONAL_BITS {
            z = z.wrapping_mul(z);
            if z.raw() >= ONE_RAW << 1 {
                z = Fix64::from_raw(z.raw() >> 1);
                y += b;
            }
            b >>= 1;
        }

        Ok(Fix64::from_raw(y))
    }

    /// Natural logarithm: `log2(x) * ln(2)`.
    pub fn try_ln(self) -> Result<Fix64, FixedError> {
        Ok(self.try_log2()? * Fix64::LN2)
    }

    /// Two raised to this power. Total: never fails.
    ///
    /// The integer part of the exponent becomes a raw shift of the final
    /// result; the fractional part goes through the power series for
    /// `e^(x*ln2)`, summed until the term underflows to raw zero. Negative
    /// exponents use the identity `exp(-x) = 1/exp(x)`; exponent magnitudes
    /// past `LOG2MAX` saturate to `MAX`, or to its reciprocal (two raw
    /// units) for the negative side.
    #[must_use]
    pub fn pow2(self) -> Fix64 {
        let mut x = self;
        if x.raw() == 0 {
            return Fix64::ONE;
        }

        let neg = x.raw() < 0;
        if neg {
            x = -x;
        }

        if x == Fix64::ONE {
            return if neg {
                // exactly one half
                Fix64::from_raw(ONE_RAW >> 1)
            } else {
                Fix64::from_int(2)
            };
        }
        if x >= Fix64::LOG2MAX {
            return if neg {
                Fix64::from_raw(div_raw(ONE_RAW, i64::MAX))
            } else {
                Fix64::MAX
            };
        }
        if x <= Fix64::LOG2MIN {
            return if neg { Fix64::MAX } else { Fix64::ZERO };
        }

        let integer_part = x.floor().to_int() as u32;
        x = Fix64::from_raw(x.raw() & FRACTION_MASK);

        let mut result = Fix64::ONE;
        let mut term = Fix64::ONE;
        let mut i: i64 = 1;
        while term.raw() != 0 {
            term = Fix64::from_raw(div_raw(
                x.wrapping_mul(term).wrapping_mul(Fix64::LN2).raw(),
                Fix64::from_int(i).raw(),
            ));
            result += term;
            i += 1;
        }

        let mut result = Fix64::from_raw(result.raw().wrapping_shl(integer_part));
        if neg {
            result = Fix64::from_raw(div_raw(ONE_RAW, result.raw()));
        }
        result
    }

    /// `self` raised to `exp`, via `pow2(exp * log2(self))`.
    ///
    /// `exp == 0` gives one; a base of one gives one; a zero base gives
    /// zero for non-negative exponents and
    /// [`FixedError::DivisionByZero`] for negative ones; a negative base is
    /// a [`FixedError::DomainError`] (its logarithm does not exist).
    pub fn try_pow(self, exp: Fix64) -> Result<Fix64, FixedError> {
        if self == Fix64::ONE {
            return Ok(Fix64::ONE);
        }
        if exp.raw() == 0 {
            return Ok(Fix64::ONE);
        }
        if self.raw() == 0 {
            if exp.raw() < 0 {
                return Err(FixedError::DivisionByZero);
            }
            return Ok(Fix64::ZERO);
        }

        let log2 = self.try_log2()?;
        Ok((exp * log2).pow2())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atan_reference_points() {
        assert_eq!(Fix64::ZERO.atan(), Fix64::ZERO);
        // atan(1) = Pi/4
        let quarter_pi = Fix64::PI_OVER_2.to_f64() / 2.0;
        assert!((Fix64::ONE.atan().to_f64() - quarter_pi).abs() < 1e-8);
        for v in [-10.0, -2.5, -0.7, 0.3, 1.0, 4.2, 100.0] {
            let got = Fix64::from_f64(v).atan().to_f64();
            assert!(
                (got - v.atan()).abs() < 1e-7,
                "atan({v}) = {got}, want {}",
                v.atan()
            );
        }
    }

    #[test]
    fn test_atan2_axes_exact() {
        let y = Fix64::from_int(3);
        assert_eq!(y.atan2(Fix64::ZERO), Fix64::PI_OVER_2);
        assert_eq!((-y).atan2(Fix64::ZERO), -Fix64::PI_OVER_2);
        assert_eq!(Fix64::ZERO.atan2(Fix64::ZERO), Fix64::ZERO);
    }

    #[test]
    fn test_atan2_quadrants() {
        for (y, x) in [(1.0, 1.0), (1.0, -1.0), (-1.0, -1.0), (-1.0, 1.0), (0.5, 2.0)] {
            let got = Fix64::from_f64(y).atan2(Fix64::from_f64(x)).to_f64();
            let want = y.atan2(x);
            // the rational approximation carries a few 1e-3 of error by design
            assert!(
                (got - want).abs() < 5e-3,
                "atan2({y}, {x}) = {got}, want {want}"
            );
        }
    }

    #[test]
    fn test_atan2_huge_ratio_clips_to_half_pi() {
        // y/x saturates, so the rational denominator clips and the result
        // falls back to the vertical-axis answer
        let y = Fix64::from_int(1_000_000);
        let x = Fix64::from_raw(1);
        assert_eq!(y.atan2(x), Fix64::PI_OVER_2);
        assert_eq!((-y).atan2(x), -Fix64::PI_OVER_2);
    }

    #[test]
    fn test_acos_domain_and_anchors() {
        assert_eq!(Fix64::ZERO.try_acos(), Ok(Fix64::PI_OVER_2));
        assert_eq!(
            Fix64::from_int(2).try_acos(),
            Err(FixedError::DomainError)
        );
        assert_eq!(
            Fix64::from_int(-2).try_acos(),
            Err(FixedError::DomainError)
        );
        let acos_one = Fix64::ONE.try_acos().unwrap().to_f64();
        assert!(acos_one.abs() < 1e-8);
        let acos_neg_one = (-Fix64::ONE).try_acos().unwrap().to_f64();
        assert!((acos_neg_one - std::f64::consts::PI).abs() < 1e-8);
    }

    #[test]
    fn test_log2_powers_of_two_exact() {
        for k in 0..31 {
            let x = Fix64::from_int(1i64 << k);
            assert_eq!(x.try_log2(), Ok(Fix64::from_int(k as i64)), "log2(2^{k})");
        }
        // log2(0.5) = -1 exactly
        let half = Fix64::from_raw(ONE_RAW >> 1);
        assert_eq!(half.try_log2(), Ok(Fix64::from_int(-1)));
    }

    #[test]
    fn test_log2_domain_errors() {
        assert_eq!(Fix64::ZERO.try_log2(), Err(FixedError::DomainError));
        assert_eq!(Fix64::from_int(-3).try_log2(), Err(FixedError::DomainError));
    }

    #[test]
    fn test_ln_of_e() {
        let e = Fix64::from_f64(std::f64::consts::E);
        let got = e.try_ln().unwrap().to_f64();
        assert!((got - 1.0).abs() < 1e-8, "ln(e) = {got}");
    }

    #[test]
    fn test_pow2_integer_exponents_exact() {
        assert_eq!(Fix64::ZERO.pow2(), Fix64::ONE);
        assert_eq!(Fix64::ONE.pow2(), Fix64::from_int(2));
        assert_eq!((-Fix64::ONE).pow2(), Fix64::from_raw(ONE_RAW >> 1));
        assert_eq!(Fix64::from_int(10).pow2(), Fix64::from_int(1024));
    }

    #[test]
    fn test_pow2_saturates_past_range() {
        assert_eq!(Fix64::from_int(40).pow2(), Fix64::MAX);
        // deep-negative exponents go through the reciprocal identity, so
        // the saturated arm lands at 1/MAX (two raw units), not at zero
        assert_eq!(Fix64::from_int(-40).pow2(), Fix64::from_raw(2));
    }

    #[test]
    fn test_pow2_log2_inverse() {
        for v in [0.1, 0.7, 1.0, 2.5, 10.0, 1000.0, 123456.0] {
            let x = Fix64::from_f64(v);
            let back = x.try_log2().unwrap().pow2().to_f64();
            assert!(
                (back - v).abs() / v < 1e-5,
                "pow2(log2({v})) = {back}"
            );
        }
    }

    #[test]
    fn test_pow_special_cases() {
        let b = Fix64::from_f64(3.5);
        assert_eq!(b.try_pow(Fix64::ZERO), Ok(Fix64::ONE));
        assert_eq!(Fix64::ONE.try_pow(b), Ok(Fix64::ONE));
        assert_eq!(Fix64::ZERO.try_pow(b), Ok(Fix64::ZERO));
        assert_eq!(
            Fix64::ZERO.try_pow(-Fix64::ONE),
            Err(FixedError::DivisionByZero)
        );
        assert_eq!(
            Fix64::from_int(-2).try_pow(Fix64::from_int(2)),
            Err(FixedError::DomainError)
        );
    }

    #[test]
    fn test_pow_matches_f64_reference() {
        for (b, e) in [(2.0, 3.0), (9.0, 0.5), (4.0, -1.0), (1.5, 2.5)] {
            let got = Fix64::from_f64(b)
                .try_pow(Fix64::from_f64(e))
                .unwrap()
                .to_f64();
            let want = b.powf(e);
            assert!(
                (got - want).abs() / want.abs() < 1e-4,
                "{b}^{e} = {got}, want {want}"
            );
        }
    }
}
