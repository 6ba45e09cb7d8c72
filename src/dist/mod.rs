//! Hyperprior distributions
mod beta;
mod gamma;

pub use beta::{Beta, BetaError};
pub use gamma::{Gamma, GammaError};
