//! Beta hyperprior over x in (0, 1)
use crate::traits::*;
use special::Beta as _;
use std::fmt;
use std::sync::OnceLock;

/// [Beta distribution](https://en.wikipedia.org/wiki/Beta_distribution),
/// Beta(α, β) over x in (0, 1). Used as the prior on the discount.
///
/// # Example
///
/// ```
/// use pyp::prelude::*;
///
/// let beta = Beta::new(2.0, 3.0).unwrap();
/// assert!((beta.pdf(&0.5) - 1.5).abs() < 1E-12);
///
/// // zero density outside (0, 1)
/// assert_eq!(beta.pdf(&1.0), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct Beta {
    alpha: f64,
    beta: f64,
    // ln B(α, β)
    ln_beta_ab: OnceLock<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BetaError {
    /// The alpha parameter is less than or equal to zero
    AlphaTooLow { alpha: f64 },
    /// The alpha parameter is infinite or NaN
    AlphaNotFinite { alpha: f64 },
    /// The beta parameter is less than or equal to zero
    BetaTooLow { beta: f64 },
    /// The beta parameter is infinite or NaN
    BetaNotFinite { beta: f64 },
}

impl Beta {
    /// Create a Beta with shape parameters α and β.
    pub fn new(alpha: f64, beta: f64) -> Result<Self, BetaError> {
        if !alpha.is_finite() {
            Err(BetaError::AlphaNotFinite { alpha })
        } else if alpha <= 0.0 {
            Err(BetaError::AlphaTooLow { alpha })
        } else if !beta.is_finite() {
            Err(BetaError::BetaNotFinite { beta })
        } else if beta <= 0.0 {
            Err(BetaError::BetaTooLow { beta })
        } else {
            Ok(Beta {
                alpha,
                beta,
                ln_beta_ab: OnceLock::new(),
            })
        }
    }

    /// Flat prior over (0, 1).
    ///
    /// ```rust
    /// # use pyp::dist::Beta;
    /// assert_eq!(Beta::uniform(), Beta::new(1.0, 1.0).unwrap());
    /// ```
    pub fn uniform() -> Self {
        Beta {
            alpha: 1.0,
            beta: 1.0,
            ln_beta_ab: OnceLock::new(),
        }
    }

    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    #[inline]
    pub fn beta(&self) -> f64 {
        self.beta
    }

    fn ln_beta_ab(&self) -> f64 {
        *self.ln_beta_ab.get_or_init(|| self.alpha.ln_beta(self.beta))
    }
}

impl PartialEq for Beta {
    fn eq(&self, other: &Beta) -> bool {
        self.alpha == other.alpha && self.beta == other.beta
    }
}

impl HasDensity<f64> for Beta {
    fn ln_f(&self, x: &f64) -> f64 {
        let ln_x = x.ln();
        let ln_1mx = (-x).ln_1p();
        (self.alpha - 1.0).mul_add(ln_x, (self.beta - 1.0) * ln_1mx)
            - self.ln_beta_ab()
    }
}

impl Support<f64> for Beta {
    fn supports(&self, x: &f64) -> bool {
        0.0 < *x && *x < 1.0
    }
}

impl ContinuousDistr<f64> for Beta {}

impl std::error::Error for BetaError {}

impl fmt::Display for BetaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlphaTooLow { alpha } => {
                write!(f, "alpha ({}) must be greater than zero", alpha)
            }
            Self::AlphaNotFinite { alpha } => {
                write!(f, "non-finite alpha: {}", alpha)
            }
            Self::BetaTooLow { beta } => {
                write!(f, "beta ({}) must be greater than zero", beta)
            }
            Self::BetaNotFinite { beta } => {
                write!(f, "non-finite beta: {}", beta)
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
        let beta = Beta::new(1.0, 2.0).unwrap();
        assert::close(beta.alpha(), 1.0, TOL);
        assert::close(beta.beta(), 2.0, TOL);
    }

    #[test]
    fn new_should_reject_bad_params() {
        assert_eq!(
            Beta::new(0.0, 1.0),
            Err(BetaError::AlphaTooLow { alpha: 0.0 })
        );
        assert_eq!(
            Beta::new(1.0, -2.0),
            Err(BetaError::BetaTooLow { beta: -2.0 })
        );
        assert!(Beta::new(f64::NAN, 1.0).is_err());
        assert!(Beta::new(1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn uniform_ln_pdf_is_zero() {
        let beta = Beta::uniform();
        assert::close(beta.ln_pdf(&0.2), 0.0, TOL);
        assert::close(beta.ln_pdf(&0.9), 0.0, TOL);
    }

    #[test]
    fn ln_pdf_half_half_at_midpoint() {
        // Beta(1/2, 1/2) at 1/2 is 2/π
        let beta = Beta::new(0.5, 0.5).unwrap();
        assert::close(beta.ln_pdf(&0.5), -0.451_582_705_289_454_8, TOL);
    }

    #[test]
    fn ln_pdf() {
        let beta = Beta::new(2.0, 3.0).unwrap();
        assert::close(beta.ln_pdf(&0.5), 1.5_f64.ln(), TOL);
    }

    #[test]
    fn ln_pdf_outside_support_is_neg_infinity() {
        let beta = Beta::new(2.0, 3.0).unwrap();
        assert_eq!(beta.ln_pdf(&0.0), f64::NEG_INFINITY);
        assert_eq!(beta.ln_pdf(&1.0), f64::NEG_INFINITY);
        assert_eq!(beta.ln_pdf(&-0.5), f64::NEG_INFINITY);
    }
}
