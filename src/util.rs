//! Scalar helpers shared by the generator, physics and renderer

use crate::config::{SEGMENT_LENGTH, TOTAL_SEGMENTS};

/// Wrap `value + increment` into `[0, max)`
///
/// Works for any sign or magnitude of `increment`. A non-positive `max`
/// collapses everything to zero.
pub fn loop_increase(value: f32, increment: f32, max: f32) -> f32 {
    if !(max > 0.0) {
        return 0.0;
    }
    let r = (value + increment).rem_euclid(max);
    // rem_euclid can round up to exactly `max` for tiny negative inputs
    if r >= max || !r.is_finite() {
        0.0
    } else {
        r
    }
}

/// Segment index containing track position `z`, always in `[0, TOTAL_SEGMENTS)`
pub fn find_segment_index(z: f32) -> usize {
    segment_index_in(z, TOTAL_SEGMENTS)
}

/// Same as `find_segment_index` for an arbitrary segment count
pub fn segment_index_in(z: f32, count: usize) -> usize {
    if count == 0 || !z.is_finite() {
        return 0;
    }
    let raw = (z / SEGMENT_LENGTH).floor() as i64;
    raw.rem_euclid(count as i64) as usize
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Quadratic ease in
pub fn ease_in(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t * t
}

/// Cosine ease in/out
pub fn ease_in_out(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * (-(t * std::f32::consts::PI).cos() / 2.0 + 0.5)
}

/// Exponential fog amount for normalized distance `d` (0 = no fog)
pub fn exp_fog(d: f32, density: f32) -> f32 {
    1.0 - (1.0 / (d * d * density).exp()).clamp(0.0, 1.0)
}

/// 1D interval overlap; `x`/`w` are centre and full width
pub fn overlaps(x1: f32, w1: f32, x2: f32, w2: f32) -> bool {
    let half = (w1 + w2) / 2.0;
    let min1 = x1 - half;
    let max1 = x1 + half;
    !(max1 < x2 || min1 > x2)
}

/// Multiply-per-tick factor scaled to an arbitrary delta
pub fn per_tick(factor: f32, dt: f32) -> f32 {
    factor.powf(dt * crate::config::REFERENCE_FPS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TRACK_LENGTH;

    #[test]
    fn test_loop_increase_stays_in_range() {
        let cases = [
            (0.0, 5.0, 10.0),
            (9.0, 3.0, 10.0),
            (1.0, -3.0, 10.0),
            (0.0, -1e-7, 10.0),
            (5.0, 1e6, 7.0),
            (5.0, -1e6, 7.0),
            (0.0, 0.0, 10.0),
        ];
        for (v, inc, max) in cases {
            let r = loop_increase(v, inc, max);
            assert!(r >= 0.0 && r < max, "{} + {} mod {} = {}", v, inc, max, r);
        }
        assert_eq!(loop_increase(3.0, 4.0, 0.0), 0.0);
    }

    #[test]
    fn test_loop_increase_wraps() {
        assert!((loop_increase(9.0, 3.0, 10.0) - 2.0).abs() < 1e-5);
        assert!((loop_increase(1.0, -3.0, 10.0) - 8.0).abs() < 1e-5);
    }

    #[test]
    fn test_segment_index_wraparound() {
        let positions = [0.0, 1.0, 199.9, 200.0, 12345.6, TRACK_LENGTH - 1.0, -1.0, -5000.0];
        for p in positions {
            let base = find_segment_index(p);
            assert!(base < TOTAL_SEGMENTS);
            for k in [-3.0_f32, -1.0, 1.0, 2.0] {
                let shifted = find_segment_index(p + k * TRACK_LENGTH);
                assert_eq!(base, shifted, "p={} k={}", p, k);
            }
        }
        assert_eq!(find_segment_index(-1.0), TOTAL_SEGMENTS - 1);
        assert_eq!(find_segment_index(f32::NAN), 0);
    }

    #[test]
    fn test_fog_monotonic() {
        for density in [0.0, 1.0, 5.0] {
            assert_eq!(exp_fog(0.0, density), 0.0);
            let mut prev = 0.0;
            for i in 0..=100 {
                let f = exp_fog(i as f32 / 100.0, density);
                assert!(f >= prev);
                assert!((0.0..=1.0).contains(&f));
                prev = f;
            }
        }
    }

    #[test]
    fn test_easing_endpoints() {
        assert_eq!(ease_in(2.0, 6.0, 0.0), 2.0);
        assert_eq!(ease_in(2.0, 6.0, 1.0), 6.0);
        assert!((ease_in_out(0.0, 10.0, 0.5) - 5.0).abs() < 1e-4);
        assert!((ease_in_out(0.0, 10.0, 1.0) - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_overlap() {
        assert!(overlaps(0.0, 0.15, 0.1, 0.15));
        assert!(!overlaps(0.0, 0.15, 0.5, 0.15));
    }
}
