//! Conjugate Gradient (unpreconditioned) per Saad §6.1.
//!
//! Requires a symmetric positive definite operator for its convergence
//! guarantee; non-SPD input degrades to possibly non-convergent iteration
//! rather than a hard failure. General systems go through the
//! normal-equations preprocessor first (see `utils::normal`).

use crate::core::traits::{InnerProduct, MatShape, MatVec};
use crate::error::SolveError;
use crate::solver::{check_dims, checked_div, initial_residual, IterativeSolver};
use crate::utils::convergence::{Convergence, ErrorMeasure, IterationCap, SolveStats};
use num_traits::Float;

pub struct CgSolver<T> {
    pub conv: Convergence<T>,
}

impl<T: Float> CgSolver<T> {
    pub fn new(tol: T, cap: IterationCap) -> Self {
        Self { conv: Convergence { tol, cap } }
    }
}

impl<M, V, T> IterativeSolver<M, V> for CgSolver<T>
where
    M: MatVec<V> + MatShape,
    (): InnerProduct<V, Scalar = T>,
    V: AsMut<[T]> + AsRef<[T]> + From<Vec<T>> + Clone,
    T: Float,
{
    type Error = SolveError;
    type Scalar = T;

    fn solve(&mut self, a: &M, b: &V, x: &mut V) -> Result<SolveStats<T>, SolveError> {
        check_dims(a, b.as_ref().len(), x.as_ref().len(), true)?;
        let n = a.ncols();
        let ip = ();
        let mut xk = x.as_ref().to_vec();

        let mut r = initial_residual(a, b, &*x);
        let mut p = r.clone();
        // err = r^T r, the squared residual norm; the convergence test
        // compares it directly, so the tolerance is on the squared scale.
        let mut err = ip.dot(&r, &r);

        let mut i = 0;
        let converged = loop {
            if self.conv.converged(ErrorMeasure::SquaredNorm(err)) {
                break true;
            }
            if self.conv.cap_reached(i) {
                break false;
            }
            let mut ap = V::from(vec![T::zero(); n]);
            a.matvec(&p, &mut ap);
            let alpha = checked_div(err, ip.dot(&p, &ap), "p^T A p")?;
            for (xj, &pj) in xk.iter_mut().zip(p.as_ref()) {
                *xj = *xj + alpha * pj;
            }
            // Residual is advanced incrementally, never recomputed from b;
            // accumulated rounding is accepted, as in the classical method.
            for (rj, &apj) in r.as_mut().iter_mut().zip(ap.as_ref()) {
                *rj = *rj - alpha * apj;
            }
            let new_err = ip.dot(&r, &r);
            let beta = checked_div(new_err, err, "r^T r")?;
            for (pj, &rj) in p.as_mut().iter_mut().zip(r.as_ref()) {
                *pj = rj + beta * *pj;
            }
            err = new_err;
            i += 1;
        };

        *x = V::from(xk);
        Ok(SolveStats { iterations: i, final_error: err, converged })
    }
}
