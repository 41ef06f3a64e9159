//! ## mqfeat-features::normalize
//! Scalar normalizers mapping raw feature values into `[0, 1]`.
//!
//! All arithmetic is `f32` so results match the inference-side consumer bit
//! for bit. NaN inputs map to 0.

/// `(value - lo) / (hi - lo)` clamped to `[0, 1]`; 0 for an empty range.
#[inline]
pub fn minmax(value: f32, lo: f32, hi: f32) -> f32 {
    if hi <= lo || value.is_nan() {
        return 0.0;
    }
    ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
}

/// `ln(value + 1) / ln(max + 1)`, capped at 1.
///
/// Zero for non-positive values and for a non-positive `max`.
#[inline]
pub fn log_ratio(value: f32, max: f32) -> f32 {
    if value.is_nan() || max.is_nan() || value <= 0.0 || max <= 0.0 {
        return 0.0;
    }
    ((value + 1.0).ln() / (max + 1.0).ln()).min(1.0)
}

#[inline]
pub fn flag(value: f32) -> f32 {
    if value == 0.0 || value.is_nan() {
        0.0
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn minmax_endpoints() {
        assert_eq!(minmax(1.0, 1.0, 14.0), 0.0);
        assert_eq!(minmax(14.0, 1.0, 14.0), 1.0);
        assert_eq!(minmax(1.0, 0.0, 5.0), 0.2);
        assert_eq!(minmax(20.0, 0.0, 5.0), 1.0);
        assert_eq!(minmax(-3.0, 0.0, 5.0), 0.0);
    }

    #[test]
    fn minmax_empty_range_is_zero() {
        assert_eq!(minmax(3.0, 5.0, 5.0), 0.0);
        assert_eq!(minmax(3.0, 6.0, 5.0), 0.0);
    }

    #[test]
    fn log_ratio_reference_points() {
        assert_eq!(log_ratio(0.0, 65535.0), 0.0);
        assert_eq!(log_ratio(-1.0, 65535.0), 0.0);
        assert_eq!(log_ratio(65535.0, 65535.0), 1.0);
        assert_eq!(log_ratio(1e9, 100.0), 1.0);
        assert_eq!(log_ratio(10.0, 0.0), 0.0);
        let one = log_ratio(1.0, 10_000.0);
        assert!((one - 2f32.ln() / 10_001f32.ln()).abs() < f32::EPSILON);
    }

    #[test]
    fn flag_is_binary() {
        assert_eq!(flag(0.0), 0.0);
        assert_eq!(flag(1.0), 1.0);
        assert_eq!(flag(3.0), 1.0);
    }

    #[test]
    fn nan_maps_to_zero() {
        assert_eq!(minmax(f32::NAN, 0.0, 1.0), 0.0);
        assert_eq!(log_ratio(f32::NAN, 100.0), 0.0);
        assert_eq!(flag(f32::NAN), 0.0);
    }

    proptest! {
        #[test]
        fn minmax_is_bounded(v in any::<f32>(), lo in -1e6f32..1e6, hi in -1e6f32..1e6) {
            let n = minmax(v, lo, hi);
            prop_assert!((0.0..=1.0).contains(&n));
        }

        #[test]
        fn log_ratio_is_bounded(v in any::<f32>(), max in any::<f32>()) {
            let n = log_ratio(v, max);
            prop_assert!((0.0..=1.0).contains(&n));
        }

        #[test]
        fn minmax_hits_both_endpoints(lo in -1e6f32..1e6, width in 1e-3f32..1e6) {
            let hi = lo + width;
            prop_assume!(hi > lo);
            prop_assert_eq!(minmax(lo, lo, hi), 0.0);
            prop_assert_eq!(minmax(hi, lo, hi), 1.0);
        }

        #[test]
        fn minmax_empty_range_is_zero_for_any_value(
            v in any::<f32>(),
            hi in -1e6f32..1e6,
            below in 0f32..1e6,
        ) {
            prop_assert_eq!(minmax(v, hi + below, hi), 0.0);
        }

        #[test]
        fn log_ratio_spans_zero_to_one(max in 1e-3f32..1e9) {
            prop_assert_eq!(log_ratio(0.0, max), 0.0);
            prop_assert_eq!(log_ratio(max, max), 1.0);
        }

        #[test]
        fn log_ratio_is_monotone(a in 0f32..1e8, b in 0f32..1e8, max in 1f32..3e8) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(log_ratio(lo, max) <= log_ratio(hi, max));
        }
    }
}
