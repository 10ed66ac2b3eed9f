//! Normal-equations preprocessing for general systems.
//!
//! Transforms an arbitrary (possibly rectangular, non-symmetric) system
//! `A x = b` into `(AᵗA) x = Aᵗb`, which is symmetric by construction and
//! positive definite iff `A` has full column rank, making it solvable by CG.
//! Rank deficiency is not detected here; a singular product matrix surfaces
//! downstream as a breakdown in the iteration.

use crate::core::traits::MatTransVec;
use crate::error::SolveError;
use crate::solver::{CgSolver, IterativeSolver};
use crate::utils::convergence::{Convergence, SolveStats};
use faer::Mat;
use num_traits::Float;

/// Form the normal equations: `(AᵗA, Aᵗb)` from `A (m×n)` and `b (m)`.
///
/// Pure transformation, no side effects. `b` must have length `a.nrows()`.
pub fn normal_equations<T: Float>(a: &Mat<T>, b: &[T]) -> Result<(Mat<T>, Vec<T>), SolveError> {
    if b.len() != a.nrows() {
        return Err(SolveError::DimensionMismatch {
            context: "right-hand side b",
            expected: a.nrows(),
            found: b.len(),
        });
    }
    let (m, n) = (a.nrows(), a.ncols());
    let a0 = Mat::from_fn(n, n, |i, j| {
        let mut acc = T::zero();
        for k in 0..m {
            acc = acc + a[(k, i)] * a[(k, j)];
        }
        acc
    });
    let mut b0 = vec![T::zero(); n];
    a.mattransvec(&b.to_vec(), &mut b0);
    Ok((a0, b0))
}

/// Solve a general (possibly rectangular) system in the least-squares sense:
/// form the normal equations and run CG from a zero initial guess.
///
/// Returns the solution vector alongside the CG iteration stats.
pub fn solve_normal<T>(
    a: &Mat<T>,
    b: &[T],
    conv: Convergence<T>,
) -> Result<(Vec<T>, SolveStats<T>), SolveError>
where
    T: Float + Send + Sync,
{
    let (a0, b0) = normal_equations(a, b)?;
    let mut x = vec![T::zero(); a.ncols()];
    let mut solver = CgSolver { conv };
    let stats = solver.solve(&a0, &b0, &mut x)?;
    Ok((x, stats))
}
