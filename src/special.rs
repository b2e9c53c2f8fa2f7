//! Special functions backing window generation.

use num_traits::Float;

/// Modified Bessel functions of the first kind.
pub trait Bessel {
    /// Modified Bessel function of the first kind, order zero.
    fn i0(self) -> Self;
}

impl Bessel for f32 {
    fn i0(self) -> Self {
        i0_series(self)
    }
}

impl Bessel for f64 {
    fn i0(self) -> Self {
        i0_series(self)
    }
}

/// Power series `sum_k (x^2/4)^k / (k!)^2`, terminated once a term no longer
/// changes the partial sum at the type's precision.
fn i0_series<F>(x: F) -> F
where
    F: Float,
{
    let four = F::from(4.0).unwrap();
    let q = x * x / four;
    let mut term = F::one();
    let mut sum = F::one();
    for k in 1..200 {
        let k = F::from(k).unwrap();
        term = term * q / (k * k);
        sum = sum + term;
        if term < sum * F::epsilon() {
            break;
        }
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::Bessel;
    use approx::assert_abs_diff_eq;

    #[test]
    fn i0_matches_reference_values() {
        // scipy.special.i0 reference points.
        assert_abs_diff_eq!(0.0f64.i0(), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(1.0f64.i0(), 1.2660658777520084, epsilon = 1e-12);
        assert_abs_diff_eq!(2.5f64.i0(), 3.2898391440501231, epsilon = 1e-12);
        assert_abs_diff_eq!(5.0f64.i0(), 27.239871823604442, epsilon = 1e-10);
    }

    #[test]
    fn i0_is_even() {
        assert_abs_diff_eq!((-3.0f64).i0(), 3.0f64.i0(), epsilon = 1e-12);
    }
}
