use glam::Vec2;

/// Unit vector along `v`, or zero when `v` has no usable direction.
#[inline]
pub fn normalize_or_zero(v: Vec2) -> Vec2 {
    let length_sq = v.length_squared();
    if length_sq > f32::EPSILON && length_sq.is_finite() {
        v / length_sq.sqrt()
    } else {
        Vec2::ZERO
    }
}

/// Unit vector for an orientation in radians, zero pointing along +x.
#[inline]
pub fn orientation_to_vector(orientation: f32) -> Vec2 {
    Vec2::new(orientation.cos(), orientation.sin())
}

/// Maps `value` into `[-half_extent, half_extent)`, as if both edges were glued together.
#[inline]
pub fn wrap_component(value: f32, half_extent: f32) -> f32 {
    let wrapped = (value + half_extent).rem_euclid(2. * half_extent) - half_extent;
    // rem_euclid rounds up to the divisor for tiny negative inputs
    if wrapped >= half_extent {
        -half_extent
    } else {
        wrapped
    }
}

/// Wrapped cell coordinate for an unbounded one, always in `0..count`.
#[inline]
pub fn wrap_index(value: i64, count: usize) -> usize {
    value.rem_euclid(count as i64) as usize
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::Vec2;
    use rstest::rstest;

    use super::{normalize_or_zero, orientation_to_vector, wrap_component, wrap_index};

    macro_rules! assert_eqf32 {
        ($x:expr, $y:expr) => {
            assert_relative_eq!($x, $y, epsilon = 1e-3_f32)
        };
    }

    #[test]
    fn normalizes_regular_vectors() {
        let n = normalize_or_zero(Vec2::new(3., 4.));
        assert_eqf32!(n.x, 0.6);
        assert_eqf32!(n.y, 0.8);
    }

    #[test]
    fn zero_and_nan_normalize_to_zero() {
        assert_eq!(normalize_or_zero(Vec2::ZERO), Vec2::ZERO);
        assert_eq!(normalize_or_zero(Vec2::new(f32::NAN, 1.)), Vec2::ZERO);
    }

    #[test]
    fn orientation_quarter_turn() {
        let v = orientation_to_vector(std::f32::consts::FRAC_PI_2);
        assert_eqf32!(v.x, 0.);
        assert_eqf32!(v.y, 1.);
    }

    #[rstest]
    #[case(0., 0.)]
    #[case(99., 99.)]
    #[case(100., -100.)]
    #[case(101.5, -98.5)]
    #[case(-100., -100.)]
    #[case(-100.5, 99.5)]
    #[case(350., -50.)]
    fn wraps_into_world(#[case] value: f32, #[case] expected: f32) {
        assert_eqf32!(wrap_component(value, 100.), expected);
    }

    #[test]
    fn wrapping_never_reaches_the_upper_edge() {
        for value in [-100.000_01_f32, -100.000_001, -300.000_01, 100.] {
            let wrapped = wrap_component(value, 100.);
            assert!((-100. ..100.).contains(&wrapped), "{value} -> {wrapped}");
        }
    }

    #[rstest]
    #[case(-1, 24)]
    #[case(25, 0)]
    #[case(-26, 24)]
    #[case(7, 7)]
    fn wraps_cell_indices(#[case] value: i64, #[case] expected: usize) {
        assert_eq!(wrap_index(value, 25), expected);
    }
}
