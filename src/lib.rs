//! Pitman-Yor restaurant seating.
//!
//! Provides the two-parameter (discount, strength) Chinese Restaurant Process
//! bookkeeping used inside nonparametric Bayesian models such as hierarchical
//! Pitman-Yor language models. Observation likelihoods are assumed to be
//! degenerate: a customer either eats the dish drawn from the base
//! distribution or it does not.
//!
//! # Example
//!
//! ```
//! use pyp::prelude::*;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::SmallRng::seed_from_u64(1337);
//! let mut crp: Restaurant<&str> = Restaurant::new(0.5, 1.0).unwrap();
//!
//! // The first customer of a dish always opens a table
//! assert_eq!(crp.increment("a", 0.1, &mut rng), 1);
//! crp.increment("b", 0.1, &mut rng);
//! crp.increment("a", 0.1, &mut rng);
//!
//! assert_eq!(crp.n_customers(), 3);
//! assert_eq!(crp.n_customers_of(&"a"), 2);
//!
//! let p_a = crp.prob(&"a", 0.1);
//! let p_c = crp.prob(&"c", 0.1);
//! assert!(p_a > p_c);
//! ```
pub mod dist;
pub mod misc;
pub mod prelude;
pub mod process;
pub mod traits;

#[cfg(test)]
mod test;
