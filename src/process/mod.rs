//! Seating processes
pub mod crp;
pub mod histogram;

pub use crp::{ResampleConfig, Restaurant, RestaurantError};
pub use histogram::{Bins, TableHistogram};
