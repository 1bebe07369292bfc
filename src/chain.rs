//! The weighted state graph underlying every match model.
//!
//! A [`Chain`] owns a set of states, an optional label per state, and a
//! sparse set of transition weights between distinct states. States are
//! handed out as opaque [`StateId`]s whose integer index is assigned in
//! creation order and never reused. The dense column-stochastic matrix the
//! solvers need is materialized once at solve time by
//! [`Chain::stochastic_matrix`]; until then construction is a pure
//! declare-states-then-fill-weights affair with no matrix resizing.
//!
//! Matrix convention: `matrix[to][from]` holds the weight of the transition
//! from `from` to `to` (column-source, row-destination). Self-transitions
//! are implicit: the diagonal is the complement of each column's outgoing
//! sum, so every column of the materialized matrix sums to exactly 1.

use std::{
    collections::HashMap,
    fmt,
    hash::Hash,
};

use crate::{error::Result, field::Field, Error};

/// Relative tolerance for the outgoing-probability overflow check.
pub const STOCHASTIC_TOLERANCE: f64 = 1e-12;

/// An opaque handle to a state within a single [`Chain`].
///
/// Ids are plain creation-order indices and are only meaningful for the
/// chain that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(usize);

impl StateId {
    /// The stable creation-order index of this state.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A finite-state graph with weighted transitions.
///
/// Generic over the weight type `W` (numeric `f64` or symbolic
/// [`crate::symbolic::Expr`]) and the label type `L` used for lookup.
#[derive(Debug, Clone)]
pub struct Chain<W, L> {
    /// Label per state, in creation order. Anonymous states hold `None`.
    labels: Vec<Option<L>>,
    /// Reverse lookup from label to state.
    by_label: HashMap<L, StateId>,
    /// Sparse transition weights, keyed (from, to). The diagonal is never
    /// stored.
    weights: HashMap<(StateId, StateId), W>,
}

impl<W, L> Default for Chain<W, L> {
    fn default() -> Self {
        Chain {
            labels: Vec::new(),
            by_label: HashMap::new(),
            weights: HashMap::new(),
        }
    }
}

impl<W, L> Chain<W, L>
where
    W: Field,
    L: Eq + Hash + Clone + fmt::Debug,
{
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of states.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the chain has no states.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Allocate a new anonymous state.
    pub fn new_state(&mut self) -> StateId {
        let id = StateId(self.labels.len());
        self.labels.push(None);
        id
    }

    /// Allocate a new state registered under `label`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateLabel`] if the label is already taken.
    pub fn new_labeled_state(&mut self, label: L) -> Result<StateId> {
        if self.by_label.contains_key(&label) {
            return Err(Error::DuplicateLabel {
                label: format!("{label:?}"),
            });
        }
        let id = StateId(self.labels.len());
        self.labels.push(Some(label.clone()));
        self.by_label.insert(label, id);
        Ok(id)
    }

    /// Look up a state by label. Absence is not an error.
    pub fn state(&self, label: &L) -> Option<StateId> {
        self.by_label.get(label).copied()
    }

    /// The label of a state, if it has one.
    pub fn label_of(&self, state: StateId) -> Option<&L> {
        self.labels.get(state.0).and_then(|label| label.as_ref())
    }

    /// Iterate over all states in creation order.
    pub fn states(&self) -> impl Iterator<Item = StateId> {
        (0..self.labels.len()).map(StateId)
    }

    fn check_member(&self, state: StateId) -> Result<()> {
        if state.0 < self.labels.len() {
            Ok(())
        } else {
            Err(Error::UnknownState {
                index: state.0,
                size: self.labels.len(),
            })
        }
    }

    /// Set the transition weight from `from` to `to`.
    ///
    /// Numeric weights are validated to lie in [0, 1] immediately; opaque
    /// symbolic weights are only validated at solve time. The combined
    /// outgoing probability of a state is likewise checked lazily, when the
    /// stochastic matrix is materialized, so that states can be filled in
    /// incrementally in any order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SelfTransition`] if `from == to`,
    /// [`Error::UnknownState`] for ids from another chain, and
    /// [`Error::WeightOutOfRange`] for numeric weights outside [0, 1].
    pub fn set_transition(&mut self, from: StateId, to: StateId, weight: W) -> Result<()> {
        self.check_member(from)?;
        self.check_member(to)?;
        if from == to {
            return Err(Error::SelfTransition);
        }
        if let Some(value) = weight.as_literal() {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::WeightOutOfRange { weight: value });
            }
        }
        self.weights.insert((from, to), weight);
        Ok(())
    }

    /// The stored transition weight from `from` to `to` (zero if never set).
    ///
    /// # Errors
    ///
    /// Returns [`Error::SelfTransition`] for the diagonal, which is
    /// implicit and only exists in the materialized matrix, and
    /// [`Error::UnknownState`] for foreign ids.
    pub fn transition(&self, from: StateId, to: StateId) -> Result<W> {
        self.check_member(from)?;
        self.check_member(to)?;
        if from == to {
            return Err(Error::SelfTransition);
        }
        Ok(self
            .weights
            .get(&(from, to))
            .cloned()
            .unwrap_or_else(W::zero))
    }

    /// Iterate over the explicitly set transitions as `(from, to, weight)`.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, StateId, &W)> + '_ {
        self.weights
            .iter()
            .map(|(&(from, to), weight)| (from, to, weight))
    }

    /// The non-self outgoing weights of `state` as `(to, weight)` pairs.
    pub(crate) fn outgoing(&self, state: StateId) -> Vec<(StateId, W)> {
        self.weights
            .iter()
            .filter(|(&(from, _), weight)| from == state && !weight.is_zero())
            .map(|(&(_, to), weight)| (to, weight.clone()))
            .collect()
    }

    /// States with no outgoing weight: once entered, never left.
    pub fn end_states(&self) -> Vec<StateId> {
        self.states()
            .filter(|&state| self.outgoing(state).is_empty())
            .collect()
    }

    /// Materialize the dense column-stochastic matrix.
    ///
    /// Each state's implicit self-transition is placed on the diagonal as
    /// the complement of its outgoing sum, so every column sums to exactly
    /// 1.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OverflowProbability`] if the outgoing weights of
    /// any state with a literal sum exceed 1 beyond
    /// [`STOCHASTIC_TOLERANCE`].
    pub fn stochastic_matrix(&self) -> Result<Vec<Vec<W>>> {
        let n = self.len();
        let mut matrix = vec![vec![W::zero(); n]; n];
        for (&(from, to), weight) in &self.weights {
            matrix[to.0][from.0] = weight.clone();
        }
        for from in 0..n {
            let outgoing = crate::field::sum((0..n).filter(|&to| to != from).map(|to| &matrix[to][from]));
            if let Some(sum) = outgoing.as_literal() {
                if sum > 1.0 + STOCHASTIC_TOLERANCE {
                    return Err(Error::OverflowProbability { state: from, sum });
                }
            }
            matrix[from][from] = W::one().sub(&outgoing);
        }
        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_are_indexed_in_creation_order() {
        let mut chain: Chain<f64, &str> = Chain::new();
        let first = chain.new_state();
        let second = chain.new_state();
        assert_eq!(first.index(), 0);
        assert_eq!(second.index(), 1);
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn labels_resolve_to_their_state() {
        let mut chain: Chain<f64, &str> = Chain::new();
        let state = chain.new_labeled_state("start").unwrap();
        assert_eq!(chain.state(&"start"), Some(state));
        assert_eq!(chain.label_of(state), Some(&"start"));
    }

    #[test]
    fn missing_label_is_none_not_an_error() {
        let chain: Chain<f64, &str> = Chain::new();
        assert_eq!(chain.state(&"absent"), None);
    }

    #[test]
    fn duplicate_label_is_rejected() {
        let mut chain: Chain<f64, &str> = Chain::new();
        chain.new_labeled_state("start").unwrap();
        let err = chain.new_labeled_state("start").unwrap_err();
        assert!(matches!(err, Error::DuplicateLabel { .. }));
    }

    #[test]
    fn transition_defaults_to_zero() {
        let mut chain: Chain<f64, &str> = Chain::new();
        let a = chain.new_state();
        let b = chain.new_state();
        assert_eq!(chain.transition(a, b).unwrap(), 0.0);

        chain.set_transition(a, b, 0.5).unwrap();
        assert_eq!(chain.transition(a, b).unwrap(), 0.5);
        assert_eq!(chain.transition(b, a).unwrap(), 0.0);
    }

    #[test]
    fn transitions_iterates_the_set_edges() {
        let mut chain: Chain<f64, &str> = Chain::new();
        let a = chain.new_state();
        let b = chain.new_state();
        let c = chain.new_state();
        chain.set_transition(a, b, 0.25).unwrap();
        chain.set_transition(b, c, 0.5).unwrap();

        let mut edges: Vec<(StateId, StateId, f64)> = chain
            .transitions()
            .map(|(from, to, weight)| (from, to, *weight))
            .collect();
        edges.sort_by_key(|&(from, to, _)| (from, to));
        assert_eq!(edges, vec![(a, b, 0.25), (b, c, 0.5)]);
    }

    #[test]
    fn self_transitions_are_rejected() {
        let mut chain: Chain<f64, &str> = Chain::new();
        let a = chain.new_state();
        assert!(matches!(
            chain.set_transition(a, a, 0.5),
            Err(Error::SelfTransition)
        ));
        assert!(matches!(chain.transition(a, a), Err(Error::SelfTransition)));
    }

    #[test]
    fn numeric_weights_outside_unit_interval_are_rejected() {
        let mut chain: Chain<f64, &str> = Chain::new();
        let a = chain.new_state();
        let b = chain.new_state();
        assert!(matches!(
            chain.set_transition(a, b, 1.5),
            Err(Error::WeightOutOfRange { .. })
        ));
        assert!(matches!(
            chain.set_transition(a, b, -0.1),
            Err(Error::WeightOutOfRange { .. })
        ));
    }

    #[test]
    fn foreign_state_ids_are_rejected() {
        let mut chain: Chain<f64, &str> = Chain::new();
        let a = chain.new_state();

        let mut other: Chain<f64, &str> = Chain::new();
        other.new_state();
        let foreign = other.new_state();

        assert!(matches!(
            chain.set_transition(a, foreign, 0.5),
            Err(Error::UnknownState { .. })
        ));
    }

    #[test]
    fn stochastic_matrix_fills_diagonal_to_column_sum_one() {
        let mut chain: Chain<f64, &str> = Chain::new();
        let city = chain.new_state();
        let suburb = chain.new_state();
        chain.set_transition(city, suburb, 0.4).unwrap();
        chain.set_transition(suburb, city, 0.3).unwrap();

        let matrix = chain.stochastic_matrix().unwrap();
        assert_eq!(matrix[suburb.index()][city.index()], 0.4);
        assert_eq!(matrix[city.index()][city.index()], 0.6);
        assert_eq!(matrix[suburb.index()][suburb.index()], 0.7);
        for from in 0..2 {
            let column: f64 = (0..2).map(|to| matrix[to][from]).sum();
            assert!((column - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn overflowing_outgoing_probability_is_rejected_at_solve_time() {
        let mut chain: Chain<f64, &str> = Chain::new();
        let a = chain.new_state();
        let b = chain.new_state();
        let c = chain.new_state();
        chain.set_transition(a, b, 0.7).unwrap();
        chain.set_transition(a, c, 0.7).unwrap();

        let err = chain.stochastic_matrix().unwrap_err();
        assert!(matches!(err, Error::OverflowProbability { state: 0, .. }));
    }

    #[test]
    fn end_states_have_no_outgoing_weight() {
        let mut chain: Chain<f64, &str> = Chain::new();
        let start = chain.new_labeled_state("start").unwrap();
        let end1 = chain.new_labeled_state("end1").unwrap();
        let end2 = chain.new_labeled_state("end2").unwrap();
        chain.set_transition(start, end1, 0.5).unwrap();
        chain.set_transition(start, end2, 0.5).unwrap();

        let ends = chain.end_states();
        assert_eq!(ends.len(), 2);
        assert!(ends.contains(&end1));
        assert!(ends.contains(&end2));
    }
}
