//! Krylov solver interfaces and shared iteration plumbing.

use crate::core::traits::{MatShape, MatVec};
use crate::error::SolveError;
use crate::utils::convergence::SolveStats;
use num_traits::Float;

/// Common interface for the iterative solvers.
pub trait IterativeSolver<M, V> {
    type Error;
    type Scalar: Copy + PartialOrd;

    /// Solve A·x = b, taking `x` as the initial guess and writing the final
    /// iterate back into it. Returns iteration stats (including convergence
    /// info). Non-convergence within the iteration cap is not an error;
    /// dimension mismatches and breakdowns are.
    fn solve(
        &mut self,
        a: &M,
        b: &V,
        x: &mut V,
    ) -> Result<SolveStats<<Self as IterativeSolver<M, V>>::Scalar>, Self::Error>;
}

/// Precondition check run before any state is touched: operand lengths must
/// match the operator's dimensions, and the two-sided methods additionally
/// require a square operator.
pub(crate) fn check_dims<M: MatShape>(
    a: &M,
    b_len: usize,
    x_len: usize,
    require_square: bool,
) -> Result<(), SolveError> {
    if require_square && a.nrows() != a.ncols() {
        return Err(SolveError::NonSquareOperator {
            nrows: a.nrows(),
            ncols: a.ncols(),
        });
    }
    if b_len != a.nrows() {
        return Err(SolveError::DimensionMismatch {
            context: "right-hand side b",
            expected: a.nrows(),
            found: b_len,
        });
    }
    if x_len != a.ncols() {
        return Err(SolveError::DimensionMismatch {
            context: "initial guess x",
            expected: a.ncols(),
            found: x_len,
        });
    }
    Ok(())
}

/// Checked division for the iteration scalars. A denominator within machine
/// epsilon of zero is a breakdown, reported instead of propagating NaN/Inf.
pub(crate) fn checked_div<T: Float>(
    num: T,
    den: T,
    denominator: &'static str,
) -> Result<T, SolveError> {
    if den.abs() <= T::epsilon() {
        return Err(SolveError::Breakdown {
            denominator,
            value: den.to_f64().unwrap_or(f64::NAN),
        });
    }
    Ok(num / den)
}

/// Initial residual r = b - A x.
pub(crate) fn initial_residual<M, V, T>(a: &M, b: &V, x: &V) -> V
where
    M: MatVec<V>,
    V: AsRef<[T]> + From<Vec<T>>,
    T: Float,
{
    let mut ax = V::from(vec![T::zero(); b.as_ref().len()]);
    a.matvec(x, &mut ax);
    let r = b
        .as_ref()
        .iter()
        .zip(ax.as_ref())
        .map(|(&bi, &axi)| bi - axi)
        .collect::<Vec<_>>();
    V::from(r)
}

pub mod cg;
pub use cg::CgSolver;

pub mod bicg;
pub use bicg::BicgSolver;

pub mod cgs;
pub use cgs::CgsSolver;

pub mod bicgstab;
pub use bicgstab::BiCgStabSolver;
