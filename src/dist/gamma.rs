//! Gamma hyperprior over x in (0, ∞)
use crate::traits::*;
use special::Gamma as _;
use std::fmt;
use std::sync::OnceLock;

/// [Gamma distribution](https://en.wikipedia.org/wiki/Gamma_distribution)
/// G(α, β) with shape α and rate β.
///
/// The restaurant evaluates it at the shifted strength, s + d, which is
/// positive whenever the hyperparameters are valid.
///
/// ```math
///             β^α
/// f(x|α, β) = ----  x^(α-1) e^(-βx)
///             Γ(α)
/// ```
#[derive(Debug, Clone)]
pub struct Gamma {
    shape: f64,
    rate: f64,
    // α ln(β) - ln Γ(α), the part of ln f that does not depend on x
    ln_norm: OnceLock<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GammaError {
    /// Shape parameter is less than or equal to zero
    ShapeTooLow { shape: f64 },
    /// Shape parameter is infinite or NaN
    ShapeNotFinite { shape: f64 },
    /// Rate parameter is less than or equal to zero
    RateTooLow { rate: f64 },
    /// Rate parameter is infinite or NaN
    RateNotFinite { rate: f64 },
}

impl Gamma {
    /// Create a Gamma with shape α and rate β.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use pyp::dist::Gamma;
    /// assert!(Gamma::new(1.0, 1.0).is_ok());
    /// assert!(Gamma::new(0.0, 1.0).is_err());
    /// assert!(Gamma::new(1.0, f64::NAN).is_err());
    /// ```
    pub fn new(shape: f64, rate: f64) -> Result<Self, GammaError> {
        if !shape.is_finite() {
            return Err(GammaError::ShapeNotFinite { shape });
        }
        if !rate.is_finite() {
            return Err(GammaError::RateNotFinite { rate });
        }
        if shape <= 0.0 {
            Err(GammaError::ShapeTooLow { shape })
        } else if rate <= 0.0 {
            Err(GammaError::RateTooLow { rate })
        } else {
            Ok(Gamma {
                shape,
                rate,
                ln_norm: OnceLock::new(),
            })
        }
    }

    #[inline]
    pub fn shape(&self) -> f64 {
        self.shape
    }

    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    fn ln_norm(&self) -> f64 {
        *self.ln_norm.get_or_init(|| {
            self.shape.mul_add(self.rate.ln(), -self.shape.ln_gamma().0)
        })
    }
}

impl PartialEq for Gamma {
    fn eq(&self, other: &Gamma) -> bool {
        self.shape == other.shape && self.rate == other.rate
    }
}

impl HasDensity<f64> for Gamma {
    fn ln_f(&self, x: &f64) -> f64 {
        (self.shape - 1.0).mul_add(x.ln(), -self.rate * x) + self.ln_norm()
    }
}

impl Support<f64> for Gamma {
    fn supports(&self, x: &f64) -> bool {
        x.is_finite() && *x > 0.0
    }
}

impl ContinuousDistr<f64> for Gamma {}

impl std::error::Error for GammaError {}

impl fmt::Display for GammaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeTooLow { shape } => {
                write!(f, "shape ({}) must be greater than zero", shape)
            }
            Self::ShapeNotFinite { shape } => {
                write!(f, "non-finite shape: {}", shape)
            }
            Self::RateTooLow { rate } => {
                write!(f, "rate ({}) must be greater than zero", rate)
            }
            Self::RateNotFinite { rate } => {
                write!(f, "non-finite rate: {}", rate)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1E-12;

    #[test]
    fn new_keeps_parameters() {
        let gam = Gamma::new(1.0, 2.0).unwrap();
        assert::close(gam.shape(), 1.0, TOL);
        assert::close(gam.rate(), 2.0, TOL);
    }

    #[test]
    fn new_should_reject_bad_params() {
        assert_eq!(
            Gamma::new(-1.0, 1.0),
            Err(GammaError::ShapeTooLow { shape: -1.0 })
        );
        assert_eq!(
            Gamma::new(1.0, 0.0),
            Err(GammaError::RateTooLow { rate: 0.0 })
        );
        assert_eq!(
            Gamma::new(f64::INFINITY, 1.0),
            Err(GammaError::ShapeNotFinite {
                shape: f64::INFINITY
            })
        );
        assert!(Gamma::new(1.0, f64::NAN).is_err());
    }

    #[test]
    fn ln_pdf_near_zero() {
        let gam = Gamma::new(1.2, 3.4).unwrap();
        assert::close(gam.ln_pdf(&0.1_f64), 0.753_387_589_351_045_6, TOL);
    }

    #[test]
    fn ln_pdf_far_tail() {
        let gam = Gamma::new(1.2, 3.4).unwrap();
        assert::close(gam.ln_pdf(&100.0_f64), -337.525_061_354_852_54, TOL);
    }

    #[test]
    fn ln_pdf_at_mean() {
        let gam = Gamma::new(1.2, 3.4).unwrap();
        assert::close(
            gam.ln_pdf(&0.352_941_176_470_588_26_f64),
            0.145_613_832_984_222_48,
            TOL,
        );
    }

    #[test]
    fn ln_pdf_exponential_special_case() {
        // G(1, λ) is Exponential(λ)
        let gam = Gamma::new(1.0, 2.0).unwrap();
        assert::close(gam.ln_pdf(&0.5), 2.0_f64.ln() - 1.0, TOL);
    }

    #[test]
    fn ln_pdf_outside_support_is_neg_infinity() {
        let gam = Gamma::new(1.2, 3.4).unwrap();
        assert_eq!(gam.ln_pdf(&0.0), f64::NEG_INFINITY);
        assert_eq!(gam.ln_pdf(&-1.0), f64::NEG_INFINITY);
        assert_eq!(gam.ln_pdf(&f64::INFINITY), f64::NEG_INFINITY);
    }

    #[test]
    fn equality_ignores_cache() {
        let a = Gamma::new(2.0, 3.0).unwrap();
        let b = a.clone();
        let _ = a.ln_pdf(&1.0);
        assert_eq!(a, b);
    }
}
