//! Lookup-table trigonometry: angle reduction plus linear interpolation.
//!
//! The two tables sample sin and tan over [0, Pi/2] at raw precision and
//! are the build-time generator's artifact, materialized once on first use
//! behind `OnceLock`s. After initialization they are read concurrently from
//! any number of threads without locking; no writer exists.

use std::sync::OnceLock;

use crate::fixed_point::Fix64;

/// 2^29 * Pi in raw Q31.32. Reducing modulo this and its 28 halvings
/// approximates reduction modulo 2*Pi with far more effective precision
/// than a single `% PI_TIMES_2`.
const LARGE_PI_RAW: i64 = 7244019458077122842;

/// Table length: floor(raw(Pi/2) >> 15) = 205887 samples.
pub(crate) const LUT_SIZE: usize = (Fix64::PI_OVER_2.raw() >> 15) as usize;

/// (LUT_SIZE - 1) / (Pi/2) as raw Q31.32, rounded to nearest: the factor
/// that maps a reduced angle into table index space.
const LUT_INTERVAL_RAW: i64 = {
    let num = ((LUT_SIZE - 1) as i128) << 64;
    let den = Fix64::PI_OVER_2.raw() as i128;
    ((num + den / 2) / den) as i64
};

fn sin_lut() -> &'static [i64] {
    static LUT: OnceLock<Vec<i64>> = OnceLock::new();
    LUT.get_or_init(|| {
        (0..LUT_SIZE)
            .map(|i| {
                let angle = i as f64 * std::f64::consts::FRAC_PI_2 / (LUT_SIZE - 1) as f64;
                (angle.sin() * (1i64 << 32) as f64).round() as i64
            })
            .collect()
    })
}

fn tan_lut() -> &'static [i64] {
    static LUT: OnceLock<Vec<i64>> = OnceLock::new();
    LUT.get_or_init(|| {
        (0..LUT_SIZE)
            .map(|i| {
                let angle = i as f64 * std::f64::consts::FRAC_PI_2 / (LUT_SIZE - 1) as f64;
                let tan = angle.tan();
                let scaled = tan * (1i64 << 32) as f64;
                // values past the representable range clamp to MAX
                if tan < 0.0 || scaled >= i64::MAX as f64 {
                    i64::MAX
                } else {
                    scaled.round() as i64
                }
            })
            .collect()
    })
}

/// Reduces a raw angle into [0, raw(Pi/2)) and reports the two fold flags:
/// horizontal (source was in [Pi/2, Pi)) and vertical (source was in
/// [Pi, 2*Pi)).
fn clamp_sin_angle(angle: i64) -> (i64, bool, bool) {
    // step (a): 29 halving reductions approximate `angle mod 2*Pi`
    let mut clamped_2pi = angle;
    for i in 0..29 {
        clamped_2pi %= LARGE_PI_RAW >> i;
    }
    if angle < 0 {
        clamped_2pi += Fix64::PI_TIMES_2.raw();
    }

    // step (b): fold [Pi, 2*Pi) onto [0, Pi), flipping vertically
    let flip_vertical = clamped_2pi >= Fix64::PI.raw();
    let mut clamped_pi = clamped_2pi;
    while clamped_pi >= Fix64::PI.raw() {
        clamped_pi -= Fix64::PI.raw();
    }

    // step (c): fold [Pi/2, Pi) onto [0, Pi/2), flipping horizontally
    let flip_horizontal = clamped_pi >= Fix64::PI_OVER_2.raw();
    let mut clamped_pi_over_2 = clamped_pi;
    if clamped_pi_over_2 >= Fix64::PI_OVER_2.raw() {
        clamped_pi_over_2 -= Fix64::PI_OVER_2.raw();
    }

    (clamped_pi_over_2, flip_horizontal, flip_vertical)
}

/// Interpolates `lut` at `angle` (already reduced into [0, Pi/2]),
/// mirroring the table read when `mirror` is set.
fn interpolate(lut: &[i64], angle: Fix64, mirror: bool) -> i64 {
    let raw_index = angle.wrapping_mul(Fix64::from_raw(LUT_INTERVAL_RAW));
    let rounded_index = raw_index.round();
    let index_error = raw_index.wrapping_sub(rounded_index);

    let rounded = rounded_index.to_int();
    let offset = index_error.raw().signum();

    let index = |base: i64| -> usize {
        if mirror {
            (lut.len() as i64 - 1 - base) as usize
        } else {
            base as usize
        }
    };

    let nearest = Fix64::from_raw(lut[index(rounded)]);
    let second_nearest = Fix64::from_raw(lut[index(rounded + offset)]);

    let delta = index_error
        .wrapping_mul(nearest.wrapping_sub(second_nearest).fast_abs())
        .raw();
    // clamped tan entries sit at i64::MAX, so the final add must wrap
    nearest
        .raw()
        .wrapping_add(if mirror { delta.wrapping_neg() } else { delta })
}

impl Fix64 {
    /// Sine of an angle in radians.
    ///
    /// Reduces into [0, Pi/2), scales into table index space and linearly
    /// interpolates between the two nearest samples; accurate to at least
    /// ten decimal places.
    #[must_use]
    pub fn sin(self) -> Fix64 {
        let (clamped, flip_h, flip_v) = clamp_sin_angle(self.raw());
        let interpolated = interpolate(sin_lut(), Fix64::from_raw(clamped), flip_h);
        Fix64::from_raw(if flip_v { -interpolated } else { interpolated })
    }

    /// Sine with direct table indexing and no interpolation: about 4-5
    /// decimal digits of accuracy, roughly twice as fast as [`Fix64::sin`].
    #[must_use]
    pub fn fast_sin(self) -> Fix64 {
        let (clamped, flip_h, flip_v) = clamp_sin_angle(self.raw());

        // the low 15 bits fall away: the table is sampled every 2^15 raw units
        let mut raw_index = (clamped >> 15) as usize;
        if raw_index >= LUT_SIZE {
            raw_index = LUT_SIZE - 1;
        }
        let lut = sin_lut();
        let nearest = if flip_h {
            lut[lut.len() - 1 - raw_index]
        } else {
            lut[raw_index]
        };
        Fix64::from_raw(if flip_v { -nearest } else { nearest })
    }

    /// Cosine of an angle in radians, computed as `sin(x + Pi/2)`.
    ///
    /// Positive angles are pre-adjusted by `-(Pi + Pi/2)` instead (same
    /// point on the circle) so the raw addition cannot overflow.
    #[must_use]
    pub fn cos(self) -> Fix64 {
        let xl = self.raw();
        let raw_angle = xl
            + if xl > 0 {
                -Fix64::PI.raw() - Fix64::PI_OVER_2.raw()
            } else {
                Fix64::PI_OVER_2.raw()
            };
        Fix64::from_raw(raw_angle).sin()
    }

    /// Low-precision cosine; see [`Fix64::fast_sin`].
    #[must_use]
    pub fn fast_cos(self) -> Fix64 {
        let xl = self.raw();
        let raw_angle = xl
            + if xl > 0 {
                -Fix64::PI.raw() - Fix64::PI_OVER_2.raw()
            } else {
                Fix64::PI_OVER_2.raw()
            };
        Fix64::from_raw(raw_angle).fast_sin()
    }

    /// Sine and cosine together as a structured pair.
    #[must_use]
    pub fn sin_cos(self) -> (Fix64, Fix64) {
        (self.sin(), self.cos())
    }

    /// Tangent of an angle in radians.
    ///
    /// Reduction happens modulo Pi (tan's period), folding into [0, Pi/2]
    /// with one flip for the negative domain and one for the upper half;
    /// table values past the representable range were clamped to `MAX` at
    /// generation time, so results near Pi/2 clip rather than wrap.
    #[must_use]
    pub fn tan(self) -> Fix64 {
        let mut clamped = self.raw() % Fix64::PI.raw();
        let mut flip = false;
        if clamped < 0 {
            clamped = -clamped;
            flip = true;
        }
        if clamped > Fix64::PI_OVER_2.raw() {
            flip = !flip;
            clamped = Fix64::PI_OVER_2.raw() - (clamped - Fix64::PI_OVER_2.raw());
        }

        let interpolated = interpolate(tan_lut(), Fix64::from_raw(clamped), false);
        Fix64::from_raw(if flip { -interpolated } else { interpolated })
    }
}
