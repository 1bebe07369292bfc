//! Steady-state and absorption solvers.
//!
//! Three entry points, all operating on the filled-in column-stochastic
//! matrix of a [`crate::chain::Chain`]:
//!
//! - [`absorbing`]: exact absorption probabilities via the fundamental
//!   matrix, generic over the weight field (numeric and symbolic).
//! - [`iterative`]: approximate distributions by power iteration, numeric
//!   only.
//! - [`stationary`]: exact stationary distributions via a linear solve,
//!   generic over the weight field.

pub mod absorbing;
pub mod iterative;
mod linear;
pub mod stationary;

pub use absorbing::AbsorptionProbabilities;
pub use iterative::{StartDistribution, SteadyStateOptions};
