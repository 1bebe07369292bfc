//! Shared domain types for match modeling.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{error::Result, Error};

/// Default number of object balls per team (eight-ball).
pub const DEFAULT_BALLS_PER_TEAM: usize = 8;

/// One of the two sides of a match.
///
/// Rosters interleave the teams: players at even indices shoot for team A,
/// players at odd indices for team B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    A,
    B,
}

impl Team {
    /// The team a winning-team indicator refers to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWinningTeam`] for any value other than 0
    /// or 1.
    pub fn from_index(value: usize) -> Result<Self> {
        match value {
            0 => Ok(Team::A),
            1 => Ok(Team::B),
            _ => Err(Error::InvalidWinningTeam { value }),
        }
    }

    /// The team of the player at `roster_index` (parity convention).
    pub fn of_player(roster_index: usize) -> Self {
        if roster_index % 2 == 0 { Team::A } else { Team::B }
    }

    /// The other team.
    pub fn opponent(&self) -> Self {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
        }
    }

    /// The 0/1 indicator for this team.
    pub fn index(&self) -> usize {
        match self {
            Team::A => 0,
            Team::B => 1,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::A => write!(f, "A"),
            Team::B => write!(f, "B"),
        }
    }
}
