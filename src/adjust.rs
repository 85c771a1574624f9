//! Corrections applied to a data range before it drives a color map or an
//! axis.
//!
//! Both entry points work on a `[low, high]` pair in place and report whether
//! they changed anything. Neither one fails: a range that cannot be fixed
//! safely is left alone and `false` is returned.

use std::convert::TryFrom;

/// Ranges whose endpoints are further apart than this many ULPs are never
/// touched by [`adjust_range`].
pub const NEAR_EQUAL_ULPS: i32 = 1024;

/// Replacement for a log range that has no positive values at all.
pub const LOG_FALLBACK: [f64; 2] = [1.0e-4, 1.0];

const LOG_LOW_RATIO: f64 = 1.0e-4;

/// Per-width constants and bit casts needed to measure ULP distances.
pub(crate) trait UlpFloat: Copy + PartialOrd {
    /// Signed integer with the same width as the float.
    type Bits: Copy + Into<i128> + TryFrom<i128>;

    /// How far a degenerate range gets widened, in ULPs. Tuned empirically.
    const MIN_DELTA: i128;

    /// Bit pattern of the smallest positive normal value.
    const MIN_NORMAL_BITS: i128;

    const ZERO: Self;

    fn to_signed_bits(self) -> Self::Bits;
    fn from_signed_bits(bits: Self::Bits) -> Self;
    fn is_normal(self) -> bool;
    fn is_finite(self) -> bool;
}

impl UlpFloat for f32 {
    type Bits = i32;

    const MIN_DELTA: i128 = 2048;
    const MIN_NORMAL_BITS: i128 = 8_388_608;
    const ZERO: Self = 0.0;

    #[inline]
    fn to_signed_bits(self) -> i32 {
        self.to_bits() as i32
    }

    #[inline]
    fn from_signed_bits(bits: i32) -> Self {
        f32::from_bits(bits as u32)
    }

    #[inline]
    fn is_normal(self) -> bool {
        f32::is_normal(self)
    }

    #[inline]
    fn is_finite(self) -> bool {
        f32::is_finite(self)
    }
}

impl UlpFloat for f64 {
    type Bits = i64;

    const MIN_DELTA: i128 = 2048;
    const MIN_NORMAL_BITS: i128 = 4_503_599_627_370_496;
    const ZERO: Self = 0.0;

    #[inline]
    fn to_signed_bits(self) -> i64 {
        self.to_bits() as i64
    }

    #[inline]
    fn from_signed_bits(bits: i64) -> Self {
        f64::from_bits(bits as u64)
    }

    #[inline]
    fn is_normal(self) -> bool {
        f64::is_normal(self)
    }

    #[inline]
    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }
}

/// Makes `range` usable on a logarithmic scale.
///
/// A range that is already strictly positive is returned untouched. If
/// nothing in it is positive it becomes [`LOG_FALLBACK`], otherwise the low
/// end is pulled up to `high * 1e-4` (but never above `1.0`).
///
/// `range[0] <= range[1]` is the caller's responsibility.
pub fn adjust_range_for_log(range: &mut [f64; 2]) -> bool {
    debug_assert!(range[0] <= range[1], "inverted range {:?}", range);

    if range[0] > 0.0 && range[1] > 0.0 {
        return false;
    }

    if range[1] <= 0.0 {
        *range = LOG_FALLBACK;
    } else {
        range[0] = (range[1] * LOG_LOW_RATIO).min(1.0);
    }
    true
}

/// Returns true when `range` is degenerate, i.e. its endpoints are within
/// `ulps` units in the last place of each other (in double precision).
///
/// Inverted, zero-spanning and non-finite ranges are never almost equal, and
/// a zero or subnormal low end gets the extra subnormal allowance. Whether a
/// widened range would still be representable plays no part here.
pub fn almost_equal(range: &[f64; 2], ulps: i32) -> bool {
    degenerate_gap(range, i128::from(ulps)).is_some()
}

/// Pushes the high end of a degenerate range outwards so that consumers
/// never divide by a (nearly) zero span.
///
/// Well separated ranges are left alone. When both endpoints fit in an `f32`
/// the widening happens in single precision, which gives a more reasonable
/// perturbation than doing it on doubles. If the single precision result is
/// not representable the range is widened on doubles instead. Only
/// `range[1]` ever changes and it only ever grows.
pub fn adjust_range(range: &mut [f64; 2]) -> bool {
    if !almost_equal(range, NEAR_EQUAL_ULPS) {
        return false;
    }

    if fits_f32(range[0]) && fits_f32(range[1]) {
        let mut narrow = [range[0] as f32, range[1] as f32];
        if widen(&mut narrow, <f32 as UlpFloat>::MIN_DELTA) {
            debug!(
                "widened degenerate range [{}, {}] to high={} in f32",
                range[0], range[1], narrow[1]
            );
            range[1] = f64::from(narrow[1]);
            return true;
        }

        debug!(
            "cannot widen [{}, {}] in f32, falling back to f64",
            range[0], range[1]
        );
    }

    let old_high = range[1];
    let changed = widen(range, <f64 as UlpFloat>::MIN_DELTA);
    if changed {
        debug!(
            "widened degenerate range [{}, {}] to high={} in f64",
            range[0], old_high, range[1]
        );
    }
    changed
}

/// Single precision flavour of [`adjust_range`] without the near-equality
/// gate.
pub fn adjust_range_f32(range: &mut [f32; 2]) -> bool {
    widen(range, <f32 as UlpFloat>::MIN_DELTA)
}

fn fits_f32(v: f64) -> bool {
    let max = f64::from(f32::MAX);
    v > -max && v < max
}

// -0.0 has the most negative bit pattern, which would wreck the delta.
fn canonical<T: UlpFloat>(v: T) -> T {
    if v == T::ZERO {
        T::ZERO
    } else {
        v
    }
}

/// Bit pattern of the low end and the threshold in effect, if `range` is
/// closer than `ulps` (plus the subnormal allowance).
fn degenerate_gap<T: UlpFloat>(range: &[T; 2], ulps: i128) -> Option<(i128, i128)> {
    let [low, high] = *range;

    if !low.is_finite() || !high.is_finite() {
        return None;
    }

    if high < low {
        return None;
    }

    // Bit patterns are ordered the other way round for negative values, so
    // differencing across zero is meaningless.
    if low < T::ZERO && high > T::ZERO {
        return None;
    }

    let low_bits: i128 = canonical(low).to_signed_bits().into();
    let high_bits: i128 = canonical(high).to_signed_bits().into();

    // Subnormals are packed much tighter near zero.
    let min_delta = if low.is_normal() {
        ulps
    } else {
        T::MIN_NORMAL_BITS + ulps
    };

    let delta = (high_bits - low_bits).abs();
    if delta >= min_delta {
        return None;
    }

    Some((low_bits, min_delta))
}

fn widen<T: UlpFloat>(range: &mut [T; 2], ulps: i128) -> bool {
    let (low_bits, min_delta) = match degenerate_gap(range, ulps) {
        Some(gap) => gap,
        None => return false,
    };

    let widened = if low_bits < 0 {
        low_bits - min_delta
    } else {
        low_bits + min_delta
    };

    let bits = match <T::Bits as TryFrom<i128>>::try_from(widened) {
        Ok(bits) => bits,
        Err(_) => return false,
    };

    let new_high = T::from_signed_bits(bits);
    if !new_high.is_finite() {
        return false;
    }

    range[1] = new_high;
    true
}
