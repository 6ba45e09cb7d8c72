//! Trait definitions
use rand::Rng;

/// A source of uniform random numbers.
///
/// Everything random in the restaurant is derived from single uniform draws,
/// so this is the only capability a caller needs to inject. Every
/// [`rand::Rng`] is a `RandomSource`.
///
/// # Example
///
/// ```
/// use pyp::traits::RandomSource;
///
/// let mut rng = rand::thread_rng();
/// let u = rng.uniform_unit();
/// assert!((0.0..1.0).contains(&u));
///
/// // A choice with zero weight on the second option always picks the first
/// assert!(rng.weighted_choice(1.0, 0.0));
/// ```
pub trait RandomSource {
    /// A draw from the uniform distribution on [0, 1)
    fn uniform_unit(&mut self) -> f64;

    /// Returns `true` with probability `w_a / (w_a + w_b)`.
    ///
    /// Both weights must be non-negative and at least one of them positive.
    fn weighted_choice(&mut self, w_a: f64, w_b: f64) -> bool {
        debug_assert!(w_a >= 0.0 && w_b >= 0.0 && w_a + w_b > 0.0);
        self.uniform_unit() * (w_a + w_b) < w_a
    }
}

impl<R: Rng + ?Sized> RandomSource for R {
    #[inline]
    fn uniform_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Has a normalized density function
pub trait HasDensity<X> {
    /// Probability density function
    fn f(&self, x: &X) -> f64 {
        self.ln_f(x).exp()
    }

    /// Log probability density function
    fn ln_f(&self, x: &X) -> f64;
}

/// Identifies the support of the distribution
pub trait Support<X> {
    /// Returns `true` if `x` is in the support of the distribution
    fn supports(&self, x: &X) -> bool;
}

/// Continuous distributions. The density vanishes outside the support.
pub trait ContinuousDistr<X>: HasDensity<X> + Support<X> {
    /// The value of the Probability Density Function (PDF) at `x`
    fn pdf(&self, x: &X) -> f64 {
        self.ln_pdf(x).exp()
    }

    /// The value of the log Probability Density Function (PDF) at `x`.
    ///
    /// Returns `-∞` outside the support.
    fn ln_pdf(&self, x: &X) -> f64 {
        if self.supports(x) {
            self.ln_f(x)
        } else {
            f64::NEG_INFINITY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(f64);

    impl RandomSource for Fixed {
        fn uniform_unit(&mut self) -> f64 {
            self.0
        }
    }

    #[test]
    fn weighted_choice_splits_unit_interval_by_weight() {
        assert!(Fixed(0.0).weighted_choice(1.0, 3.0));
        assert!(Fixed(0.24).weighted_choice(1.0, 3.0));
        assert!(!Fixed(0.25).weighted_choice(1.0, 3.0));
        assert!(!Fixed(0.99).weighted_choice(1.0, 3.0));
    }

    #[test]
    fn weighted_choice_never_picks_zero_weight() {
        assert!(!Fixed(0.0).weighted_choice(0.0, 1.0));
        assert!(Fixed(0.999_999).weighted_choice(1.0, 0.0));
    }

    #[test]
    fn rng_uniform_unit_in_range() {
        let mut rng = rand::thread_rng();
        assert!((0..1_000)
            .map(|_| rng.uniform_unit())
            .all(|u| (0.0..1.0).contains(&u)));
    }
}
