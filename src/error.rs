//! Error types for the cuechain crate

use thiserror::Error;

/// Main error type for the cuechain crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("state label {label} is already registered in this chain")]
    DuplicateLabel { label: String },

    #[error("self-transitions are implicit and cannot be set or read directly")]
    SelfTransition,

    #[error("transition weight {weight} is outside [0, 1]")]
    WeightOutOfRange { weight: f64 },

    #[error("state index {index} is not part of this chain (chain has {size} states)")]
    UnknownState { index: usize, size: usize },

    #[error("outgoing probabilities from state {state} sum to {sum}, which exceeds 1")]
    OverflowProbability { state: usize, sum: f64 },

    #[error("chain is not a valid absorbing chain: {unclassified} state(s) are neither absorbing nor transient")]
    AbsorbingAnalysis { unclassified: usize },

    #[error("linear system is singular: no usable pivot in column {column}")]
    SingularSystem { column: usize },

    #[error("start distribution sums to {sum}, expected exactly 1")]
    InvalidStartDistribution { sum: f64 },

    #[error("iterative solver did not converge within {max_iterations} iterations")]
    NoConvergence { max_iterations: usize },

    #[error("roster has {len} players, but teams alternate so the count must be even")]
    OddRoster { len: usize },

    #[error("winning team indicator must be 0 or 1, but was {value}")]
    InvalidWinningTeam { value: usize },

    #[error("ordering enumeration supports rosters of 2 or 4 players, got {len}")]
    UnsupportedRosterSize { len: usize },

    #[error("ordering index {index} is out of range: a {len}-player roster has {count} orderings")]
    OrderingOutOfRange {
        index: usize,
        len: usize,
        count: usize,
    },

    #[error("player probabilities sink={sink}, foul_end={foul_end} must each lie in [0, 1] and sum to at most 1")]
    PlayerProbability { sink: f64, foul_end: f64 },

    #[error("balls per team must be at least 1")]
    InvalidBallCount,

    #[error("symbol '{name}' has no bound value")]
    UnboundSymbol { name: String },

    #[error("division by zero while evaluating a symbolic expression")]
    DivisionByZero,
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;
