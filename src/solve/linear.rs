//! Gauss-Jordan elimination over an arbitrary weight field.
//!
//! One implementation serves both solver backends: with `f64` weights it
//! performs ordinary partial pivoting by magnitude; with symbolic weights
//! it prefers literal pivots where available and otherwise takes the first
//! structurally non-zero entry, on the assumption that a surviving symbolic
//! expression is non-zero for generic parameter values.

use crate::{error::Result, field::Field, Error};

/// Pivots smaller than this in magnitude are treated as zero.
const PIVOT_TOLERANCE: f64 = 1e-12;

/// Solve `A · X = B` for `X`, where `a` is square (n x n) and `rhs` holds
/// one or more right-hand-side columns as an n x m matrix.
///
/// Both inputs are consumed; the returned matrix has the shape of `rhs`.
///
/// # Errors
///
/// Returns [`Error::SingularSystem`] if no usable pivot exists in some
/// column.
pub(crate) fn solve_systems<W: Field>(
    mut a: Vec<Vec<W>>,
    mut rhs: Vec<Vec<W>>,
) -> Result<Vec<Vec<W>>> {
    let n = a.len();
    debug_assert!(a.iter().all(|row| row.len() == n));
    debug_assert_eq!(rhs.len(), n);

    for col in 0..n {
        let pivot_row = select_pivot(&a, col).ok_or(Error::SingularSystem { column: col })?;
        if pivot_row != col {
            a.swap(col, pivot_row);
            rhs.swap(col, pivot_row);
        }

        // Normalize the pivot row so the pivot becomes 1.
        let pivot = a[col][col].clone();
        for value in a[col].iter_mut() {
            *value = value.div(&pivot);
        }
        for value in rhs[col].iter_mut() {
            *value = value.div(&pivot);
        }

        // Eliminate the pivot column from every other row.
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[row][col].clone();
            if factor.is_zero() {
                continue;
            }
            for j in 0..a[row].len() {
                let scaled = factor.mul(&a[col][j]);
                a[row][j] = a[row][j].sub(&scaled);
            }
            for j in 0..rhs[row].len() {
                let scaled = factor.mul(&rhs[col][j]);
                rhs[row][j] = rhs[row][j].sub(&scaled);
            }
        }
    }

    Ok(rhs)
}

/// Build an n x n identity matrix over `W`.
pub(crate) fn identity<W: Field>(n: usize) -> Vec<Vec<W>> {
    let mut matrix = vec![vec![W::zero(); n]; n];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[i] = W::one();
    }
    matrix
}

/// Pick the row at or below `col` whose entry in `col` should pivot.
///
/// Literal entries compete by magnitude; a symbolic (non-literal) entry is
/// used only when no literal entry is large enough.
fn select_pivot<W: Field>(a: &[Vec<W>], col: usize) -> Option<usize> {
    let n = a.len();
    let mut best_literal: Option<(usize, f64)> = None;
    let mut first_symbolic: Option<usize> = None;

    for row in col..n {
        let entry = &a[row][col];
        match entry.as_literal() {
            Some(value) => {
                let magnitude = value.abs();
                if magnitude > PIVOT_TOLERANCE
                    && best_literal.map_or(true, |(_, best)| magnitude > best)
                {
                    best_literal = Some((row, magnitude));
                }
            }
            None => {
                if first_symbolic.is_none() && !entry.is_zero() {
                    first_symbolic = Some(row);
                }
            }
        }
    }

    best_literal.map(|(row, _)| row).or(first_symbolic)
}
