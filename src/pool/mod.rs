//! The cue-sports match model: players, match descriptors, chain
//! construction, ordering enumeration, and the win-probability evaluator.

pub mod builder;
pub mod evaluator;
pub mod ordering;

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{error::Result, types::Team, types::DEFAULT_BALLS_PER_TEAM, Error};

pub use builder::{build_match_chain, MatchLabel, ShotWeights};
pub use evaluator::{evaluate, evaluate_params};
pub use ordering::{interleave, ordering_count, reorder};

/// A participant's per-turn outcome probabilities.
///
/// The three per-turn outcomes are mutually exclusive: sink, foul-end, and
/// miss (the complement of the other two).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    sink: f64,
    foul_end: f64,
}

impl Player {
    /// Create a player from validated per-turn probabilities.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlayerProbability`] unless both probabilities lie
    /// in [0, 1] and sum to at most 1.
    pub fn new(sink: f64, foul_end: f64) -> Result<Self> {
        let valid = (0.0..=1.0).contains(&sink)
            && (0.0..=1.0).contains(&foul_end)
            && sink + foul_end <= 1.0;
        if valid {
            Ok(Player { sink, foul_end })
        } else {
            Err(Error::PlayerProbability { sink, foul_end })
        }
    }

    /// A player who never ends the match by foul.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlayerProbability`] if `sink` is outside [0, 1].
    pub fn with_sink(sink: f64) -> Result<Self> {
        Player::new(sink, 0.0)
    }

    /// Probability of sinking a ball on a turn.
    pub fn sink(&self) -> f64 {
        self.sink
    }

    /// Probability of ending the match by foul on a turn.
    pub fn foul_end(&self) -> f64 {
        self.foul_end
    }

    /// Probability of missing: the complement of the other two outcomes.
    pub fn miss(&self) -> f64 {
        1.0 - self.sink - self.foul_end
    }
}

/// A probability that is either a literal or an opaque handle resolving to
/// the currently sampled value.
///
/// The outer inference harness re-samples player parameters between
/// evaluation calls; handles let it hand the evaluator a view of the live
/// value. Resolution happens exactly once per evaluation, before any graph
/// is built.
#[derive(Clone)]
pub enum ParamValue {
    Literal(f64),
    Handle(Arc<dyn Fn() -> f64 + Send + Sync>),
}

impl ParamValue {
    /// The current concrete value.
    pub fn resolve(&self) -> f64 {
        match self {
            ParamValue::Literal(value) => *value,
            ParamValue::Handle(handle) => handle(),
        }
    }
}

impl fmt::Debug for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            ParamValue::Handle(_) => f.write_str("Handle(..)"),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Literal(value)
    }
}

/// A player parameter bundle whose probabilities may still be handles.
#[derive(Debug, Clone)]
pub struct PlayerParams {
    pub sink: ParamValue,
    pub foul_end: ParamValue,
}

impl PlayerParams {
    /// Resolve both handles into a validated [`Player`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlayerProbability`] if the resolved values are not
    /// valid per-turn probabilities.
    pub fn resolve(&self) -> Result<Player> {
        Player::new(self.sink.resolve(), self.foul_end.resolve())
    }
}

/// How much is known about the real-world turn sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderingMode {
    /// Nothing beyond team membership is known.
    Unordered,
    /// The alternation pattern is known up to who shot first.
    Partial,
    /// The roster order is the actual shot order.
    Total,
}

/// A match descriptor: roster, observed winner, and ordering knowledge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub players: Vec<Player>,
    pub winning_team: Team,
    pub order: OrderingMode,
    /// Whether the recorded match ended on a foul.
    pub foul_end: bool,
    #[serde(default = "default_balls_per_team")]
    pub balls_per_team: usize,
}

fn default_balls_per_team() -> usize {
    DEFAULT_BALLS_PER_TEAM
}

impl Match {
    /// Create a match descriptor.
    ///
    /// A two-player roster carries at least partial ordering knowledge (the
    /// only unknown is who broke), so `Unordered` is normalized to
    /// `Partial` in that case.
    pub fn new(
        players: Vec<Player>,
        winning_team: Team,
        order: OrderingMode,
        foul_end: bool,
    ) -> Self {
        let order = if order == OrderingMode::Unordered && players.len() == 2 {
            OrderingMode::Partial
        } else {
            order
        };
        Match {
            players,
            winning_team,
            order,
            foul_end,
            balls_per_team: DEFAULT_BALLS_PER_TEAM,
        }
    }

    /// Build a match from separate winner and loser lineups.
    ///
    /// The winners are interleaved at even roster indices, so the winning
    /// team is team A by construction.
    pub fn from_teams(
        winners: &[Player],
        losers: &[Player],
        order: OrderingMode,
        foul_end: bool,
    ) -> Self {
        Match::new(interleave(winners, losers), Team::A, order, foul_end)
    }

    /// Override the number of object balls per team.
    pub fn with_balls_per_team(mut self, balls_per_team: usize) -> Self {
        self.balls_per_team = balls_per_team;
        self
    }

    /// The probability that the recorded winning team wins this match.
    ///
    /// # Errors
    ///
    /// See [`evaluator::evaluate`].
    pub fn win_probability(&self) -> Result<f64> {
        evaluator::evaluate_match(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_probabilities_are_validated() {
        assert!(Player::new(0.5, 0.25).is_ok());
        assert!(Player::new(1.0, 0.0).is_ok());
        assert!(matches!(
            Player::new(0.75, 0.5),
            Err(Error::PlayerProbability { .. })
        ));
        assert!(matches!(
            Player::new(-0.1, 0.0),
            Err(Error::PlayerProbability { .. })
        ));
        assert!(matches!(
            Player::new(0.5, 1.1),
            Err(Error::PlayerProbability { .. })
        ));
    }

    #[test]
    fn miss_is_the_complement() {
        let player = Player::new(0.6, 0.1).unwrap();
        assert!((player.miss() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn two_player_unordered_normalizes_to_partial() {
        let players = vec![
            Player::with_sink(0.5).unwrap(),
            Player::with_sink(0.5).unwrap(),
        ];
        let m = Match::new(players, Team::A, OrderingMode::Unordered, false);
        assert_eq!(m.order, OrderingMode::Partial);
    }

    #[test]
    fn four_player_unordered_stays_unordered() {
        let players = vec![Player::with_sink(0.5).unwrap(); 4];
        let m = Match::new(players, Team::A, OrderingMode::Unordered, false);
        assert_eq!(m.order, OrderingMode::Unordered);
    }

    #[test]
    fn handles_resolve_at_call_time() {
        let live = Arc::new(std::sync::atomic::AtomicU64::new(0.25f64.to_bits()));
        let reader = Arc::clone(&live);
        let params = PlayerParams {
            sink: ParamValue::Handle(Arc::new(move || {
                f64::from_bits(reader.load(std::sync::atomic::Ordering::Relaxed))
            })),
            foul_end: ParamValue::Literal(0.0),
        };

        assert_eq!(params.resolve().unwrap().sink(), 0.25);
        live.store(0.75f64.to_bits(), std::sync::atomic::Ordering::Relaxed);
        assert_eq!(params.resolve().unwrap().sink(), 0.75);
    }

    #[test]
    fn match_descriptor_serde_round_trip() {
        let m = Match::new(
            vec![
                Player::new(0.5, 0.1).unwrap(),
                Player::new(0.75, 0.0).unwrap(),
            ],
            Team::B,
            OrderingMode::Total,
            true,
        );
        let json = serde_json::to_string(&m).unwrap();
        let back: Match = serde_json::from_str(&json).unwrap();
        assert_eq!(back.players, m.players);
        assert_eq!(back.winning_team, Team::B);
        assert_eq!(back.order, OrderingMode::Total);
        assert!(back.foul_end);
        assert_eq!(back.balls_per_team, DEFAULT_BALLS_PER_TEAM);
    }
}
