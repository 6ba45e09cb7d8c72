//! Sampling utilities
mod slice;

pub use slice::*;
