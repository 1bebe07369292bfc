//! Absorbing-Markov-chain analysis of alternating-shot cue-sports matches
//!
//! This crate provides:
//! - A generic weighted state graph with numeric or exact-symbolic weights
//! - Steady-state and absorption solvers (power iteration and the
//!   fundamental-matrix method), guaranteed to agree across backends
//! - Match chain construction from per-player sink/foul probabilities
//! - An ordering-aware evaluator that averages over the turn orderings
//!   consistent with what a match record declares
//!
//! The evaluator is the call surface for an outer Bayesian inference
//! harness: `evaluate(players, winning_team, order, foul_end)` is pure and
//! stateless, so independent calls may run concurrently without locking.

pub mod chain;
pub mod error;
pub mod field;
pub mod pool;
pub mod solve;
pub mod symbolic;
pub mod types;

pub use chain::{Chain, StateId};
pub use error::{Error, Result};
pub use field::Field;
pub use pool::{
    build_match_chain, evaluate, evaluate_params, Match, MatchLabel, OrderingMode, ParamValue,
    Player, PlayerParams, ShotWeights,
};
pub use solve::{AbsorptionProbabilities, StartDistribution, SteadyStateOptions};
pub use symbolic::Expr;
pub use types::{Team, DEFAULT_BALLS_PER_TEAM};
