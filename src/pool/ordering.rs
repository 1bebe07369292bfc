//! Enumeration of the turn orderings consistent with what is known.
//!
//! With teams interleaved at even/odd roster indices, the structurally
//! distinct orderings are rotations of the roster plus, for 2v2 matches, a
//! mirrored pairing (the second team's players swapped) with its own
//! rotations: 2 orderings for 2 players, 8 for 4. Rotating by an odd
//! offset moves the odd-indexed team into the even seats, so odd ordering
//! indices flip which physical team plays the "team A" role.

use crate::{error::Result, Error};

/// The number of structurally distinct orderings of a roster.
///
/// # Errors
///
/// Returns [`Error::OddRoster`] for odd rosters and
/// [`Error::UnsupportedRosterSize`] for rosters other than 2 or 4 players.
pub fn ordering_count(len: usize) -> Result<usize> {
    if len % 2 != 0 {
        return Err(Error::OddRoster { len });
    }
    match len {
        2 => Ok(2),
        4 => Ok(8),
        _ => Err(Error::UnsupportedRosterSize { len }),
    }
}

/// The `index`-th reordering of `roster`.
///
/// Returns the reordered roster and whether the winning-team indicator must
/// be flipped (true exactly for odd `index`).
///
/// # Errors
///
/// As [`ordering_count`], plus [`Error::OrderingOutOfRange`] if `index` is
/// not below the ordering count.
pub fn reorder<T: Clone>(roster: &[T], index: usize) -> Result<(Vec<T>, bool)> {
    let len = roster.len();
    let count = ordering_count(len)?;
    if index >= count {
        return Err(Error::OrderingOutOfRange { index, len, count });
    }

    let (base, rotation) = if index < len {
        (roster.to_vec(), index)
    } else {
        // Mirrored pairing: the two odd-seat players trade places.
        let mut mirrored = roster.to_vec();
        mirrored.swap(1, 3);
        (mirrored, index - len)
    };

    let reordered = base
        .iter()
        .cycle()
        .skip(rotation)
        .take(len)
        .cloned()
        .collect();
    Ok((reordered, index % 2 == 1))
}

/// All orderings of `roster` in scope: every index below the count for a
/// fully unknown order, or the rotations only (the first `len` indices)
/// when the alternation pattern is partially known.
///
/// # Errors
///
/// As [`ordering_count`].
pub fn orderings<T: Clone>(roster: &[T], partial: bool) -> Result<Vec<(Vec<T>, bool)>> {
    let count = if partial {
        ordering_count(roster.len())?.min(roster.len())
    } else {
        ordering_count(roster.len())?
    };
    (0..count).map(|index| reorder(roster, index)).collect()
}

/// Interleave two lineups, first list at even indices.
///
/// Uneven lengths are tolerated; leftover players keep their relative
/// order at the tail.
pub fn interleave<T: Clone>(first: &[T], second: &[T]) -> Vec<T> {
    let mut result = Vec::with_capacity(first.len() + second.len());
    let longest = first.len().max(second.len());
    for i in 0..longest {
        if let Some(item) = first.get(i) {
            result.push(item.clone());
        }
        if let Some(item) = second.get(i) {
            result.push(item.clone());
        }
    }
    result
}
