//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Wrap an angle into the range [-pi, pi].
///
/// The wrap is idempotent, applying it to an already wrapped angle gives the
/// same angle back.
pub fn wrap_to_pi<T>(angle: T) -> T
where
    T: Float + std::ops::Rem,
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap();
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    rem_euclid(angle + pi_t, tau_t) - pi_t
}

/// Wrap an angle into the range [0, 2pi).
pub fn wrap_to_2pi<T>(angle: T) -> T
where
    T: Float + std::ops::Rem,
{
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    rem_euclid(angle, tau_t)
}

/// Normalise a vector, returning the zero vector if its length is zero.
///
/// Zero-length inputs must never raise or produce NaN, they short-circuit to
/// the zero vector so that downstream steering maths stays finite.
pub fn safe_normalise(vector: &Vector2<f64>) -> Vector2<f64> {
    let norm = vector.norm();

    if norm > 0.0 {
        vector / norm
    } else {
        Vector2::zeros()
    }
}

/// Apply polynomial coefficients to a value
///
/// Coefficients are given highest order first, so `[a, b, c]` evaluates
/// `a*value^2 + b*value + c`.
pub fn poly_val<T>(value: &T, coeffs: &[T]) -> T
where
    T: Float + std::ops::Mul + std::ops::Add + std::ops::AddAssign,
{
    let mut res = T::from(0).unwrap();

    for i in 0..(coeffs.len() as i32) {
        res += value.powi(coeffs.len() as i32 - 1 - i) * coeffs[i as usize];
    }

    res
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
/// This result is not an element of the function's codomain, but it is the
/// closest floating point number in the real numbers and thus fulfills the
/// property `self == self.div_euclid(rhs) * rhs + self.rem_euclid(rhs)`
/// approximatively.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float + std::ops::Mul + std::ops::Add + std::ops::Sub + std::ops::Rem,
{
    let r = lhs % rhs;
    if r < T::from(0.0).unwrap() {
        r + rhs.abs()
    } else {
        r
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const PI: f64 = std::f64::consts::PI;
    const TAU: f64 = std::f64::consts::TAU;

    #[test]
    fn test_wrap_to_pi() {
        assert!((wrap_to_pi(0f64)).abs() < 1e-12);
        assert!((wrap_to_pi(TAU) - 0f64).abs() < 1e-12);
        assert!((wrap_to_pi(PI + 0.5) - (-PI + 0.5)).abs() < 1e-12);
        assert!((wrap_to_pi(-PI - 0.5) - (PI - 0.5)).abs() < 1e-12);
        assert!((wrap_to_pi(3f64 * PI) - (-PI)).abs() < 1e-12);

        // Idempotence, and the result never exceeds pi in magnitude
        for i in -100..100 {
            let angle = (i as f64) * 0.1;
            let wrapped = wrap_to_pi(angle);
            assert!(wrapped.abs() <= PI);
            assert!((wrap_to_pi(wrapped) - wrapped).abs() < 1e-12);
        }
    }

    #[test]
    fn test_wrap_to_2pi() {
        assert!((wrap_to_2pi(-0.5) - (TAU - 0.5)).abs() < 1e-12);
        assert!((wrap_to_2pi(TAU + 0.5) - 0.5).abs() < 1e-12);

        for i in -100..100 {
            let wrapped = wrap_to_2pi((i as f64) * 0.1);
            assert!(wrapped >= 0.0 && wrapped < TAU);
        }
    }

    #[test]
    fn test_safe_normalise() {
        let zero = safe_normalise(&Vector2::zeros());
        assert_eq!(zero, Vector2::zeros());

        let unit = safe_normalise(&Vector2::new(3.0, 4.0));
        assert!((unit.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_poly_val() {
        // 2x^2 + 3x + 4 at x = 2
        assert_eq!(poly_val(&2f64, &[2.0, 3.0, 4.0]), 18.0);
    }
}
