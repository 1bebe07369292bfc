//! Construction of the match chain.
//!
//! A turn state exists for every combination of active player and remaining
//! ball counts; absorbing states record who won and at what configuration.
//! All states are created before any transition is set, so the shape of the
//! chain never depends on the order in which transitions are filled in.
//!
//! Per turn, exactly one of three things happens:
//!
//! - **miss** (`1 − sink − foul_end`): play passes to the next player with
//!   the ball counts unchanged;
//! - **sink** (`sink`): the shooter's own team count drops by one and the
//!   same player shoots again, or, with the count already at zero, the
//!   shooter's team wins;
//! - **foul-end** (`foul_end`): the match ends immediately in the opposing
//!   team's favor at the current ball counts.

use serde::{Deserialize, Serialize};

use crate::{
    chain::{Chain, StateId},
    error::Result,
    field::Field,
    pool::Player,
    symbolic::Expr,
    types::Team,
    Error,
};

/// The label of a state in the match chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchLabel {
    /// It is `player`'s turn with the given balls remaining per team.
    Turn {
        player: usize,
        balls_a: usize,
        balls_b: usize,
    },
    /// `team` cleared its balls; the loser had `opponent_balls` left.
    Win { team: Team, opponent_balls: usize },
    /// `team` won because the opponent fouled at this configuration.
    FoulWin {
        team: Team,
        balls_a: usize,
        balls_b: usize,
    },
}

/// A player's turn-outcome weights in the chain's weight field.
#[derive(Debug, Clone)]
pub struct ShotWeights<W> {
    pub sink: W,
    pub foul_end: W,
}

impl<W: Field> ShotWeights<W> {
    fn miss(&self) -> W {
        W::one().sub(&self.sink).sub(&self.foul_end)
    }
}

impl From<&Player> for ShotWeights<f64> {
    fn from(player: &Player) -> Self {
        ShotWeights {
            sink: player.sink(),
            foul_end: player.foul_end(),
        }
    }
}

impl ShotWeights<Expr> {
    /// Symbolic weights named after the player's roster position
    /// (`sink_0`, `foul_0`, ...).
    pub fn symbolic(roster_index: usize) -> Self {
        ShotWeights {
            sink: Expr::symbol(&format!("sink_{roster_index}")),
            foul_end: Expr::symbol(&format!("foul_{roster_index}")),
        }
    }
}

/// Build the match chain for an alternating roster.
///
/// Returns the chain together with the canonical match start: player 0's
/// turn with both teams at full balls.
///
/// # Errors
///
/// Returns [`Error::OddRoster`] unless the roster interleaves two
/// equal-sized teams, [`Error::InvalidBallCount`] for a zero ball count,
/// and [`Error::WeightOutOfRange`] if a player's numeric outcome weights
/// are not probabilities.
pub fn build_match_chain<W: Field>(
    shots: &[ShotWeights<W>],
    balls_per_team: usize,
) -> Result<(Chain<W, MatchLabel>, StateId)> {
    if shots.is_empty() || shots.len() % 2 != 0 {
        return Err(Error::OddRoster { len: shots.len() });
    }
    if balls_per_team == 0 {
        return Err(Error::InvalidBallCount);
    }

    let n = shots.len();
    let mut chain = Chain::new();

    // Phase one: declare every state.
    for player in 0..n {
        for balls_a in 0..balls_per_team {
            for balls_b in 0..balls_per_team {
                chain.new_labeled_state(MatchLabel::Turn {
                    player,
                    balls_a,
                    balls_b,
                })?;
            }
        }
    }
    for team in [Team::A, Team::B] {
        for opponent_balls in 0..balls_per_team {
            chain.new_labeled_state(MatchLabel::Win {
                team,
                opponent_balls,
            })?;
        }
    }
    for team in [Team::A, Team::B] {
        for balls_a in 0..balls_per_team {
            for balls_b in 0..balls_per_team {
                chain.new_labeled_state(MatchLabel::FoulWin {
                    team,
                    balls_a,
                    balls_b,
                })?;
            }
        }
    }

    // Phase two: fill in the turn transitions.
    for player in 0..n {
        let team = Team::of_player(player);
        let shot = &shots[player];
        for balls_a in 0..balls_per_team {
            for balls_b in 0..balls_per_team {
                let turn = lookup(
                    &chain,
                    MatchLabel::Turn {
                        player,
                        balls_a,
                        balls_b,
                    },
                );

                let next_turn = lookup(
                    &chain,
                    MatchLabel::Turn {
                        player: (player + 1) % n,
                        balls_a,
                        balls_b,
                    },
                );
                chain.set_transition(turn, next_turn, shot.miss())?;

                let (own, opponent_balls) = match team {
                    Team::A => (balls_a, balls_b),
                    Team::B => (balls_b, balls_a),
                };
                let sink_target = if own > 0 {
                    let (balls_a, balls_b) = match team {
                        Team::A => (balls_a - 1, balls_b),
                        Team::B => (balls_a, balls_b - 1),
                    };
                    lookup(
                        &chain,
                        MatchLabel::Turn {
                            player,
                            balls_a,
                            balls_b,
                        },
                    )
                } else {
                    lookup(
                        &chain,
                        MatchLabel::Win {
                            team,
                            opponent_balls,
                        },
                    )
                };
                chain.set_transition(turn, sink_target, shot.sink.clone())?;

                let foul_target = lookup(
                    &chain,
                    MatchLabel::FoulWin {
                        team: team.opponent(),
                        balls_a,
                        balls_b,
                    },
                );
                chain.set_transition(turn, foul_target, shot.foul_end.clone())?;
            }
        }
    }

    let start = lookup(
        &chain,
        MatchLabel::Turn {
            player: 0,
            balls_a: balls_per_team - 1,
            balls_b: balls_per_team - 1,
        },
    );
    Ok((chain, start))
}

/// Fetch a state declared in phase one.
fn lookup<W: Field>(chain: &Chain<W, MatchLabel>, label: MatchLabel) -> StateId {
    debug_assert!(chain.state(&label).is_some(), "state {label:?} not declared");
    chain
        .state(&label)
        .unwrap_or_else(|| unreachable!("all match states are declared before transitions"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shots(probabilities: &[(f64, f64)]) -> Vec<ShotWeights<f64>> {
        probabilities
            .iter()
            .map(|&(sink, foul_end)| ShotWeights { sink, foul_end })
            .collect()
    }

    #[test]
    fn odd_roster_is_rejected() {
        let err = build_match_chain(&shots(&[(0.5, 0.0)]), 8).unwrap_err();
        assert!(matches!(err, Error::OddRoster { len: 1 }));
    }

    #[test]
    fn empty_roster_is_rejected() {
        let err = build_match_chain::<f64>(&[], 8).unwrap_err();
        assert!(matches!(err, Error::OddRoster { len: 0 }));
    }

    #[test]
    fn zero_balls_is_rejected() {
        let err = build_match_chain(&shots(&[(0.5, 0.0), (0.5, 0.0)]), 0).unwrap_err();
        assert!(matches!(err, Error::InvalidBallCount));
    }

    #[test]
    fn state_count_covers_every_configuration() {
        // n·B² turn states, 2·B win states, 2·B² foul-win states.
        let (chain, _) = build_match_chain(&shots(&[(0.5, 0.0), (0.5, 0.0)]), 3).unwrap();
        assert_eq!(chain.len(), 2 * 9 + 2 * 3 + 2 * 9);
    }

    #[test]
    fn start_is_player_zero_at_full_balls() {
        let (chain, start) = build_match_chain(&shots(&[(0.5, 0.0), (0.5, 0.0)]), 3).unwrap();
        assert_eq!(
            chain.label_of(start),
            Some(&MatchLabel::Turn {
                player: 0,
                balls_a: 2,
                balls_b: 2,
            })
        );
    }

    #[test]
    fn miss_passes_play_with_ball_counts_unchanged() {
        let (chain, start) = build_match_chain(&shots(&[(0.6, 0.1), (0.5, 0.0)]), 2).unwrap();
        let next = chain
            .state(&MatchLabel::Turn {
                player: 1,
                balls_a: 1,
                balls_b: 1,
            })
            .unwrap();
        assert!((chain.transition(start, next).unwrap() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn sink_keeps_the_same_player_shooting() {
        let (chain, start) = build_match_chain(&shots(&[(0.6, 0.1), (0.5, 0.0)]), 2).unwrap();
        let again = chain
            .state(&MatchLabel::Turn {
                player: 0,
                balls_a: 0,
                balls_b: 1,
            })
            .unwrap();
        assert!((chain.transition(start, again).unwrap() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn sink_at_zero_balls_wins_for_the_shooters_team() {
        let (chain, _) = build_match_chain(&shots(&[(0.6, 0.1), (0.5, 0.0)]), 2).unwrap();
        let last_ball = chain
            .state(&MatchLabel::Turn {
                player: 0,
                balls_a: 0,
                balls_b: 1,
            })
            .unwrap();
        let win = chain
            .state(&MatchLabel::Win {
                team: Team::A,
                opponent_balls: 1,
            })
            .unwrap();
        assert!((chain.transition(last_ball, win).unwrap() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn foul_ends_in_the_opponents_favor_at_current_counts() {
        let (chain, start) = build_match_chain(&shots(&[(0.6, 0.1), (0.5, 0.0)]), 2).unwrap();
        let foul_win = chain
            .state(&MatchLabel::FoulWin {
                team: Team::B,
                balls_a: 1,
                balls_b: 1,
            })
            .unwrap();
        assert!((chain.transition(start, foul_win).unwrap() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn win_states_are_absorbing() {
        let (chain, _) = build_match_chain(&shots(&[(0.6, 0.1), (0.5, 0.0)]), 2).unwrap();
        assert!(chain.is_absorbing());
        let win = chain
            .state(&MatchLabel::Win {
                team: Team::A,
                opponent_balls: 0,
            })
            .unwrap();
        assert!(chain.end_states().contains(&win));
    }

    #[test]
    fn symbolic_chain_builds_with_named_parameters() {
        let shots = vec![ShotWeights::<Expr>::symbolic(0), ShotWeights::<Expr>::symbolic(1)];
        let (chain, start) = build_match_chain(&shots, 1).unwrap();
        let win = chain
            .state(&MatchLabel::Win {
                team: Team::A,
                opponent_balls: 0,
            })
            .unwrap();
        assert_eq!(
            chain.transition(start, win).unwrap(),
            Expr::symbol("sink_0")
        );
    }
}
