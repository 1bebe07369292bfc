//! Approximate distributions by power iteration, for numeric chains.
//!
//! Repeatedly applies the filled-in column-stochastic matrix to a start
//! distribution until two successive applications differ by less than a
//! Euclidean-norm threshold. For ergodic chains this converges to the
//! stationary distribution; for absorbing chains it converges to the
//! absorption distribution of the start. Periodic chains without self-loops
//! can oscillate forever, which is why the loop also carries a hard
//! iteration cap; keeping the diagonal fill-in (any state with outgoing
//! probability below 1) is enough to guarantee convergence.

use std::{collections::HashMap, fmt, hash::Hash};

use crate::{
    chain::{Chain, StateId},
    error::Result,
    Error,
};

/// Default Euclidean-norm convergence threshold.
pub const DEFAULT_THRESHOLD: f64 = 1e-9;

/// Default hard cap on matrix applications.
pub const DEFAULT_MAX_ITERATIONS: usize = 100_000;

/// Where the iteration starts.
#[derive(Debug, Clone)]
pub enum StartDistribution {
    /// Equal probability on every state.
    Uniform,
    /// All probability on a single state.
    State(StateId),
    /// An explicit distribution; its values must sum to 1.
    Explicit(HashMap<StateId, f64>),
}

/// Tuning knobs for [`Chain::steady_state_with`].
#[derive(Debug, Clone, Copy)]
pub struct SteadyStateOptions {
    /// Convergence threshold on the norm of successive differences.
    pub threshold: f64,
    /// Hard cap on iterations, as a safety net against periodic chains.
    pub max_iterations: usize,
}

impl Default for SteadyStateOptions {
    fn default() -> Self {
        SteadyStateOptions {
            threshold: DEFAULT_THRESHOLD,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl<L> Chain<f64, L>
where
    L: Eq + Hash + Clone + fmt::Debug,
{
    /// The limiting distribution reached from `start`, with default
    /// options.
    ///
    /// # Errors
    ///
    /// See [`Chain::steady_state_with`].
    pub fn steady_state(&self, start: StartDistribution) -> Result<HashMap<StateId, f64>> {
        self.steady_state_with(start, SteadyStateOptions::default())
    }

    /// The limiting distribution reached from `start`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStartDistribution`] if an explicit start
    /// does not sum to 1, [`Error::UnknownState`] for foreign state ids,
    /// [`Error::OverflowProbability`] for malformed weights, and
    /// [`Error::NoConvergence`] when the iteration cap is reached.
    pub fn steady_state_with(
        &self,
        start: StartDistribution,
        options: SteadyStateOptions,
    ) -> Result<HashMap<StateId, f64>> {
        if self.is_empty() {
            return Ok(HashMap::new());
        }

        let matrix = self.stochastic_matrix()?;
        let mut pi = self.start_vector(start)?;

        for _ in 0..options.max_iterations {
            // Two applications per check, so period-2 oscillation shows up
            // as a non-shrinking difference instead of a false fixpoint.
            let once = apply(&matrix, &pi);
            let twice = apply(&matrix, &once);
            let diff = euclidean_distance(&twice, &once);
            pi = twice;
            if diff < options.threshold {
                return Ok(self
                    .states()
                    .map(|state| (state, pi[state.index()]))
                    .collect());
            }
        }

        Err(Error::NoConvergence {
            max_iterations: options.max_iterations,
        })
    }

    fn start_vector(&self, start: StartDistribution) -> Result<Vec<f64>> {
        let n = self.len();
        match start {
            StartDistribution::Uniform => Ok(vec![1.0 / n as f64; n]),
            StartDistribution::State(state) => {
                if state.index() >= n {
                    return Err(Error::UnknownState {
                        index: state.index(),
                        size: n,
                    });
                }
                let mut pi = vec![0.0; n];
                pi[state.index()] = 1.0;
                Ok(pi)
            }
            StartDistribution::Explicit(distribution) => {
                let mut pi = vec![0.0; n];
                let mut sum = 0.0;
                for (state, probability) in distribution {
                    if state.index() >= n {
                        return Err(Error::UnknownState {
                            index: state.index(),
                            size: n,
                        });
                    }
                    pi[state.index()] = probability;
                    sum += probability;
                }
                if (sum - 1.0).abs() > 1e-9 {
                    return Err(Error::InvalidStartDistribution { sum });
                }
                Ok(pi)
            }
        }
    }
}

fn apply(matrix: &[Vec<f64>], pi: &[f64]) -> Vec<f64> {
    matrix
        .iter()
        .map(|row| row.iter().zip(pi).map(|(weight, p)| weight * p).sum())
        .collect()
}

fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
