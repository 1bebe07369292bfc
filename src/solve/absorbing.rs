//! Exact absorption probabilities via the fundamental matrix.
//!
//! States are first classified by a fixed-point closure: absorbing states
//! have no outgoing weight; a state is transient once it carries positive
//! weight to an already-classified state. A chain where any state stays
//! unclassified is not a valid absorbing chain and the analysis refuses it.
//!
//! With transient states permuted to the front, the filled-in matrix
//! partitions into Q (transient to transient) and R (transient to
//! absorbing). The fundamental matrix N = (I − Q)⁻¹ counts expected visits,
//! and B = R·N gives, per transient start, the probability of ending in
//! each absorbing state.

use std::{collections::HashMap, fmt, hash::Hash};

use crate::{
    chain::{Chain, StateId},
    error::Result,
    field::Field,
    solve::linear,
    Error,
};

/// The absorbing/transient split of a valid absorbing chain.
///
/// Both lists are sorted by state creation order.
#[derive(Debug, Clone)]
pub struct Classification {
    pub absorbing: Vec<StateId>,
    pub transient: Vec<StateId>,
}

/// Absorption probabilities for every transient start state.
#[derive(Debug, Clone)]
pub struct AbsorptionProbabilities<W> {
    by_start: HashMap<StateId, HashMap<StateId, W>>,
}

impl<W: Field> AbsorptionProbabilities<W> {
    /// The probability of eventually being absorbed into `target` when
    /// starting from the transient state `start`. Zero for pairs the
    /// analysis did not produce.
    pub fn probability(&self, start: StateId, target: StateId) -> W {
        self.by_start
            .get(&start)
            .and_then(|targets| targets.get(&target))
            .cloned()
            .unwrap_or_else(W::zero)
    }

    /// The full absorption distribution for `start`, if it is transient.
    pub fn from_start(&self, start: StateId) -> Option<&HashMap<StateId, W>> {
        self.by_start.get(&start)
    }

    /// Iterate over all transient start states.
    pub fn starts(&self) -> impl Iterator<Item = StateId> + '_ {
        self.by_start.keys().copied()
    }
}

impl<W, L> Chain<W, L>
where
    W: Field,
    L: Eq + Hash + Clone + fmt::Debug,
{
    /// Classify every state as absorbing or transient.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AbsorbingAnalysis`] if some states remain
    /// unclassified after the closure, i.e. the chain is not a valid
    /// absorbing chain.
    pub fn classify_states(&self) -> Result<Classification> {
        let absorbing = self.end_states();
        let mut classified = vec![false; self.len()];
        for &state in &absorbing {
            classified[state.index()] = true;
        }

        // Fixed point: a state is transient once it has positive weight to
        // any already-classified state.
        let mut transient = Vec::new();
        loop {
            let mut progressed = false;
            for state in self.states() {
                if classified[state.index()] {
                    continue;
                }
                let escapes = self
                    .outgoing(state)
                    .iter()
                    .any(|(to, _)| classified[to.index()]);
                if escapes {
                    classified[state.index()] = true;
                    transient.push(state);
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }

        let unclassified = classified.iter().filter(|&&done| !done).count();
        if unclassified > 0 || absorbing.is_empty() {
            return Err(Error::AbsorbingAnalysis { unclassified });
        }

        transient.sort();
        Ok(Classification {
            absorbing,
            transient,
        })
    }

    /// Whether this chain is a valid absorbing chain: at least one
    /// absorbing state, reachable from every other state.
    pub fn is_absorbing(&self) -> bool {
        !self.is_empty() && self.classify_states().is_ok()
    }

    /// Compute exact absorption probabilities for every transient state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AbsorbingAnalysis`] for chains that are not valid
    /// absorbing chains, [`Error::OverflowProbability`] for malformed
    /// weights, and [`Error::SingularSystem`] if (I − Q) cannot be
    /// inverted, which does not occur for well-formed absorbing chains.
    pub fn absorbing_probabilities(&self) -> Result<AbsorptionProbabilities<W>> {
        let Classification {
            absorbing,
            transient,
        } = self.classify_states()?;
        let matrix = self.stochastic_matrix()?;

        let t = transient.len();

        // I - Q over the transient block, matrix[to][from] convention.
        let mut i_minus_q = vec![vec![W::zero(); t]; t];
        for (row, &to) in transient.iter().enumerate() {
            for (col, &from) in transient.iter().enumerate() {
                let q = &matrix[to.index()][from.index()];
                i_minus_q[row][col] = if row == col {
                    W::one().sub(q)
                } else {
                    W::zero().sub(q)
                };
            }
        }

        let fundamental = linear::solve_systems(i_minus_q, linear::identity(t))?;

        // B = R · N, giving absorption probabilities per transient column.
        let mut by_start: HashMap<StateId, HashMap<StateId, W>> = HashMap::new();
        for (col, &start) in transient.iter().enumerate() {
            let targets = by_start.entry(start).or_default();
            for &target in &absorbing {
                let mut probability = W::zero();
                for (k, &via) in transient.iter().enumerate() {
                    let r = &matrix[target.index()][via.index()];
                    probability = probability.add(&r.mul(&fundamental[k][col]));
                }
                targets.insert(target, probability);
            }
        }

        Ok(AbsorptionProbabilities { by_start })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The coin-flip chain: from `empty` a fair flip lands in `h`
    /// (absorbing) or `t`; from `t` another flip lands in `tt` (absorbing)
    /// or back in `h`.
    fn coin_chain() -> (Chain<f64, &'static str>, [StateId; 4]) {
        let mut chain = Chain::new();
        let empty = chain.new_labeled_state("empty").unwrap();
        let h = chain.new_labeled_state("h").unwrap();
        let t = chain.new_labeled_state("t").unwrap();
        let tt = chain.new_labeled_state("tt").unwrap();
        chain.set_transition(empty, h, 0.5).unwrap();
        chain.set_transition(empty, t, 0.5).unwrap();
        chain.set_transition(t, tt, 0.5).unwrap();
        chain.set_transition(t, h, 0.5).unwrap();
        (chain, [empty, h, t, tt])
    }

    #[test]
    fn classification_splits_absorbing_and_transient() {
        let (chain, [empty, h, t, tt]) = coin_chain();
        let classes = chain.classify_states().unwrap();
        assert_eq!(classes.absorbing, vec![h, tt]);
        assert_eq!(classes.transient, vec![empty, t]);
    }

    #[test]
    fn deep_chains_classify_through_the_closure() {
        let mut chain: Chain<f64, &str> = Chain::new();
        let empty = chain.new_labeled_state("empty").unwrap();
        let h = chain.new_labeled_state("h").unwrap();
        let ht = chain.new_labeled_state("ht").unwrap();
        let hth = chain.new_labeled_state("hth").unwrap();
        chain.set_transition(empty, h, 0.5).unwrap();
        chain.set_transition(h, ht, 0.5).unwrap();
        chain.set_transition(ht, hth, 0.5).unwrap();
        chain.set_transition(ht, empty, 0.5).unwrap();
        assert!(chain.is_absorbing());
    }

    #[test]
    fn cyclic_chain_without_absorbing_states_is_rejected() {
        let mut chain: Chain<f64, &str> = Chain::new();
        let one = chain.new_labeled_state("one").unwrap();
        let two = chain.new_labeled_state("two").unwrap();
        chain.set_transition(one, two, 0.5).unwrap();
        chain.set_transition(two, one, 0.5).unwrap();

        assert!(!chain.is_absorbing());
        let err = chain.absorbing_probabilities().unwrap_err();
        assert!(matches!(err, Error::AbsorbingAnalysis { .. }));
    }

    #[test]
    fn coin_chain_absorption_probabilities() {
        let (chain, [empty, h, t, tt]) = coin_chain();
        let probabilities = chain.absorbing_probabilities().unwrap();

        assert!((probabilities.probability(empty, h) - 0.75).abs() < 1e-12);
        assert!((probabilities.probability(empty, tt) - 0.25).abs() < 1e-12);
        assert!((probabilities.probability(t, h) - 0.5).abs() < 1e-12);
        assert!((probabilities.probability(t, tt) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn absorption_distribution_sums_to_one_per_start() {
        let (chain, _) = coin_chain();
        let probabilities = chain.absorbing_probabilities().unwrap();
        for start in probabilities.starts() {
            let total: f64 = probabilities
                .from_start(start)
                .unwrap()
                .values()
                .sum();
            assert!((total - 1.0).abs() < 1e-9);
        }
    }
}
