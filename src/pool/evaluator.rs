//! The ordering-aware win-probability evaluator.
//!
//! For each turn ordering in scope the evaluator rebuilds the match chain,
//! computes exact absorption probabilities from the match start, and sums
//! the mass on the designated winning team's absorbing states: its win
//! states, or its foul-win states when the recorded match ended on a foul.
//! The result is the arithmetic mean over the orderings.

use crate::{
    chain::{Chain, StateId},
    error::Result,
    pool::{
        builder::{build_match_chain, MatchLabel, ShotWeights},
        ordering::orderings,
        Match, OrderingMode, Player, PlayerParams,
    },
    types::Team,
};

/// Evaluate the harness-facing call: win probability of the team indicated
/// by `winning_team` (0 or 1), under the declared ordering knowledge.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidWinningTeam`] for an indicator outside
/// {0, 1}, [`crate::Error::OddRoster`] for an odd roster, and
/// [`crate::Error::UnsupportedRosterSize`] when ordering enumeration is
/// requested for a roster larger than four players.
pub fn evaluate(
    players: &[Player],
    winning_team: usize,
    order: OrderingMode,
    foul_end: bool,
) -> Result<f64> {
    let descriptor = Match::new(
        players.to_vec(),
        Team::from_index(winning_team)?,
        order,
        foul_end,
    );
    evaluate_match(&descriptor)
}

/// As [`evaluate`], but resolving handle-bearing player parameters first.
///
/// Handles are dereferenced exactly once, before any chain is built, so a
/// concurrently re-sampling harness still sees one consistent snapshot per
/// evaluation.
///
/// # Errors
///
/// As [`evaluate`], plus [`crate::Error::PlayerProbability`] if a resolved
/// bundle is not a valid probability pair.
pub fn evaluate_params(
    params: &[PlayerParams],
    winning_team: usize,
    order: OrderingMode,
    foul_end: bool,
) -> Result<f64> {
    let players = params
        .iter()
        .map(PlayerParams::resolve)
        .collect::<Result<Vec<_>>>()?;
    evaluate(&players, winning_team, order, foul_end)
}

/// Evaluate a full match descriptor.
pub(crate) fn evaluate_match(descriptor: &Match) -> Result<f64> {
    match descriptor.order {
        OrderingMode::Total => evaluate_total(
            &descriptor.players,
            descriptor.winning_team,
            descriptor.balls_per_team,
            descriptor.foul_end,
        ),
        OrderingMode::Partial | OrderingMode::Unordered => {
            let partial = descriptor.order == OrderingMode::Partial;
            let mut total = 0.0;
            let scope = orderings(&descriptor.players, partial)?;
            let count = scope.len();
            for (roster, flip) in scope {
                let team = if flip {
                    descriptor.winning_team.opponent()
                } else {
                    descriptor.winning_team
                };
                total += evaluate_total(
                    &roster,
                    team,
                    descriptor.balls_per_team,
                    descriptor.foul_end,
                )?;
            }
            Ok(total / count as f64)
        }
    }
}

/// Win probability for one fully determined roster order.
fn evaluate_total(
    players: &[Player],
    winning_team: Team,
    balls_per_team: usize,
    foul_end: bool,
) -> Result<f64> {
    let shots: Vec<ShotWeights<f64>> = players.iter().map(ShotWeights::from).collect();
    let (chain, start) = build_match_chain(&shots, balls_per_team)?;
    let probabilities = chain.absorbing_probabilities()?;

    let mut won = 0.0;
    for state in winning_states(&chain, winning_team, foul_end) {
        won += probabilities.probability(start, state);
    }
    Ok(won)
}

/// The absorbing states that count as the designated team winning.
fn winning_states<'a>(
    chain: &'a Chain<f64, MatchLabel>,
    team: Team,
    foul_end: bool,
) -> impl Iterator<Item = StateId> + 'a {
    chain.states().filter(move |&state| {
        match chain.label_of(state) {
            Some(MatchLabel::Win { team: winner, .. }) => !foul_end && *winner == team,
            Some(MatchLabel::FoulWin { team: winner, .. }) => foul_end && *winner == team,
            _ => false,
        }
    })
}
