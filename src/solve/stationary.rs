//! Exact stationary distributions by direct linear solve.
//!
//! Solves π = P·π together with the normalization Σπ = 1. For a
//! column-stochastic P every column of (P − I) sums to zero, so the rows of
//! the system are linearly dependent and one of them can be replaced by the
//! normalization equation without losing information. Generic over the
//! weight field, this doubles as the symbolic steady-state entry point: on
//! a symbolic chain the result is a closed-form expression per state.

use std::{collections::HashMap, fmt, hash::Hash};

use crate::{
    chain::{Chain, StateId},
    error::Result,
    field::Field,
    solve::linear,
};

impl<W, L> Chain<W, L>
where
    W: Field,
    L: Eq + Hash + Clone + fmt::Debug,
{
    /// The unique stationary distribution of the chain, solved exactly.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OverflowProbability`] for malformed weights
    /// and [`crate::Error::SingularSystem`] when the stationary
    /// distribution is not unique (for instance on a chain with several
    /// absorbing states).
    pub fn stationary_distribution(&self) -> Result<HashMap<StateId, W>> {
        if self.is_empty() {
            return Ok(HashMap::new());
        }

        let matrix = self.stochastic_matrix()?;
        let n = self.len();

        // (P - I), with the last row traded for the normalization row.
        let mut system = vec![vec![W::zero(); n]; n];
        for row in 0..n - 1 {
            for col in 0..n {
                system[row][col] = if row == col {
                    matrix[row][col].sub(&W::one())
                } else {
                    matrix[row][col].clone()
                };
            }
        }
        for col in 0..n {
            system[n - 1][col] = W::one();
        }

        let mut rhs = vec![vec![W::zero()]; n];
        rhs[n - 1][0] = W::one();

        let solution = linear::solve_systems(system, rhs)?;
        Ok(self
            .states()
            .map(|state| (state, solution[state.index()][0].clone()))
            .collect())
    }
}
