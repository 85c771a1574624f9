use crate::adjust::{adjust_range, adjust_range_for_log};

/// How samples are mapped onto `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Linear,
    Log,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarRange {
    low: f64,
    high: f64,
}

impl ScalarRange {
    pub const fn zero() -> Self {
        Self {
            low: 0.0,
            high: 0.0,
        }
    }

    pub const fn empty() -> Self {
        Self {
            low: std::f64::INFINITY,
            high: std::f64::NEG_INFINITY,
        }
    }

    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Range of the finite values in `values`, NaNs and infinities are
    /// skipped.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut range = Self::empty();
        for v in values.into_iter().filter(|v| v.is_finite()) {
            range.expand(v);
        }
        range
    }

    pub fn expand(&mut self, v: f64) {
        self.low = self.low.min(v);
        self.high = self.high.max(v);
    }

    pub fn is_empty(&self) -> bool {
        self.high < self.low
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn span(&self) -> f64 {
        self.high - self.low
    }

    pub fn t(self, v: f64) -> f64 {
        unit((v - self.low) / (self.high - self.low))
    }

    /// Like `t` but in log space. Non-positive samples map to 0.
    pub fn t_log(self, v: f64) -> f64 {
        if v <= 0.0 {
            return 0.0;
        }

        let low = self.low.ln();
        unit((v.ln() - low) / (self.high.ln() - low))
    }

    pub fn normalize(self, v: f64, scale: Scale) -> f64 {
        match scale {
            Scale::Linear => self.t(v),
            Scale::Log => self.t_log(v),
        }
    }

    /// Returns a copy that is safe to normalize against on a linear scale and
    /// whether it differs from `self`.
    pub fn adjusted(self) -> (Self, bool) {
        let (base, was_empty) = self.non_empty();

        let mut bounds = [base.low, base.high];
        let changed = adjust_range(&mut bounds);

        (Self::new(bounds[0], bounds[1]), changed || was_empty)
    }

    /// Same as `adjusted` for a log scale. The range is made positive first
    /// and then widened, so a constant positive field still gets a span.
    pub fn adjusted_for_log(self) -> (Self, bool) {
        let (base, was_empty) = self.non_empty();

        let mut bounds = [base.low, base.high];
        let made_positive = adjust_range_for_log(&mut bounds);
        let widened = adjust_range(&mut bounds);

        (
            Self::new(bounds[0], bounds[1]),
            made_positive || widened || was_empty,
        )
    }

    pub fn prepared(self, scale: Scale) -> (Self, bool) {
        match scale {
            Scale::Linear => self.adjusted(),
            Scale::Log => self.adjusted_for_log(),
        }
    }

    fn non_empty(self) -> (Self, bool) {
        if self.is_empty() {
            warn!("empty range, falling back to [0, 0]");
            (Self::zero(), true)
        } else {
            (self, false)
        }
    }
}

fn unit(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::prelude::*;

    #[test]
    fn test_expand() {
        let mut range = ScalarRange::empty();
        assert!(range.is_empty());

        range.expand(3.0);
        assert_eq!(range, ScalarRange::new(3.0, 3.0));
        assert!(!range.is_empty());

        range.expand(-1.0);
        range.expand(2.0);
        assert_eq!(range, ScalarRange::new(-1.0, 3.0));
        assert_eq!(range.span(), 4.0);
    }

    #[test]
    fn test_from_values_skips_non_finite() {
        let range = ScalarRange::from_values(vec![f64::NAN, 2.0, f64::INFINITY, -4.0]);
        assert_eq!(range, ScalarRange::new(-4.0, 2.0));

        assert!(ScalarRange::from_values(vec![f64::NAN]).is_empty());
    }

    #[test]
    fn test_t() {
        let range = ScalarRange::new(10.0, 20.0);
        approx::assert_abs_diff_eq!(range.t(10.0), 0.0);
        approx::assert_abs_diff_eq!(range.t(15.0), 0.5);
        approx::assert_abs_diff_eq!(range.t(20.0), 1.0);

        // clamped
        assert_eq!(range.t(0.0), 0.0);
        assert_eq!(range.t(100.0), 1.0);
    }

    #[test]
    fn test_t_log() {
        let range = ScalarRange::new(1.0, 100.0);
        approx::assert_abs_diff_eq!(range.t_log(1.0), 0.0);
        approx::assert_abs_diff_eq!(range.t_log(10.0), 0.5, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(range.t_log(100.0), 1.0, epsilon = 1e-12);
        assert_eq!(range.t_log(0.0), 0.0);
        assert_eq!(range.t_log(-5.0), 0.0);
    }

    #[test]
    fn test_degenerate_range_without_adjusting_is_nan_free() {
        let range = ScalarRange::new(1.0, 1.0);
        assert_eq!(range.t(1.0), 0.0);
    }

    #[test]
    fn test_adjusted_constant_range() {
        let (range, changed) = ScalarRange::new(1.0, 1.0).adjusted();
        assert!(changed);
        assert_eq!(range.low(), 1.0);
        assert!(range.span() > 0.0);
    }

    #[test]
    fn test_adjusted_constant_range_outside_f32_normals() {
        for &v in &[-1e-40, 3.4028e38, -1e-310] {
            let (range, changed) = ScalarRange::new(v, v).adjusted();
            assert!(changed, "{}", v);
            assert_eq!(range.low(), v);
            assert!(range.span() > 0.0, "{:?}", range);
        }
    }

    #[test]
    fn test_adjusted_separated_range_untouched() {
        let original = ScalarRange::new(-3.0, 8.0);
        assert_eq!(original.adjusted(), (original, false));
        assert_eq!(original.prepared(Scale::Linear), (original, false));
    }

    #[test]
    fn test_adjusted_empty_range() {
        let (range, changed) = ScalarRange::empty().adjusted();
        assert!(changed);
        assert_eq!(range.low(), 0.0);
        assert!(range.high() > 0.0);
    }

    #[test]
    fn test_adjusted_for_log() {
        let (range, changed) = ScalarRange::new(-2.0, -1.0).adjusted_for_log();
        assert!(changed);
        assert_eq!(range, ScalarRange::new(1.0e-4, 1.0));

        let (range, changed) = ScalarRange::new(5.0, 5.0).adjusted_for_log();
        assert!(changed);
        assert_eq!(range.low(), 5.0);
        assert!(range.high().ln() > range.low().ln());

        let original = ScalarRange::new(0.5, 7.0);
        assert_eq!(original.prepared(Scale::Log), (original, false));
    }

    #[test]
    fn test_prepared_ranges_normalize_into_unit_interval() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2000 {
            let v: f64 = rng.gen_range(-1e6..1e6);
            let values = [v, v, f64::from_bits(v.to_bits() + rng.gen_range(0..8))];
            let range = ScalarRange::from_values(values.iter().copied());

            for &scale in &[Scale::Linear, Scale::Log] {
                let (prepared, _) = range.prepared(scale);
                assert!(prepared.span() > 0.0, "{:?} {:?}", range, scale);
                for &x in &values {
                    let n = prepared.normalize(x, scale);
                    assert!((0.0..=1.0).contains(&n), "{} -> {}", x, n);
                }
            }
        }
    }
}
