//! Conjugate Gradient Squared (CGS) solver per Saad §7.2.
//!
//! Transpose-free variant of BiCG: the initial residual `r0` is held fixed
//! as the bi-orthogonality anchor and the residual polynomial is squared.
//! This avoids `Aᵗ` products at the cost of amplified rounding error on
//! ill-conditioned systems, a known property of the method.

use crate::core::traits::{InnerProduct, MatShape, MatVec};
use crate::error::SolveError;
use crate::solver::{check_dims, checked_div, initial_residual, IterativeSolver};
use crate::utils::convergence::{Convergence, ErrorMeasure, IterationCap, SolveStats};
use num_traits::Float;

pub struct CgsSolver<T> {
    pub conv: Convergence<T>,
}

impl<T: Float> CgsSolver<T> {
    pub fn new(tol: T, cap: IterationCap) -> Self {
        Self { conv: Convergence { tol, cap } }
    }
}

impl<M, V, T> IterativeSolver<M, V> for CgsSolver<T>
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
        // Fixed shadow residual, the bi-orthogonality anchor.
        let r0 = r.clone();
        let mut p = r.clone();
        let mut u = r.clone();
        // err starts as r^T r and becomes the bilinear r0^T r after the
        // first step; the test compares its magnitude directly, so the
        // tolerance is on the squared scale.
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
            let alpha = checked_div(err, ip.dot(&r0, &ap), "r0^T A p")?;
            // q = u - alpha * Ap
            let q = V::from(
                u.as_ref()
                    .iter()
                    .zip(ap.as_ref())
                    .map(|(&uj, &apj)| uj - alpha * apj)
                    .collect::<Vec<_>>(),
            );
            // upq = u + q
            let upq = V::from(
                u.as_ref()
                    .iter()
                    .zip(q.as_ref())
                    .map(|(&uj, &qj)| uj + qj)
                    .collect::<Vec<_>>(),
            );
            for (xj, &uqj) in xk.iter_mut().zip(upq.as_ref()) {
                *xj = *xj + alpha * uqj;
            }
            // r = r - alpha * A(u + q)
            let mut aupq = V::from(vec![T::zero(); n]);
            a.matvec(&upq, &mut aupq);
            for (rj, &wj) in r.as_mut().iter_mut().zip(aupq.as_ref()) {
                *rj = *rj - alpha * wj;
            }
            let new_err = ip.dot(&r0, &r);
            let beta = checked_div(new_err, err, "r0^T r")?;
            // u = r + beta * q
            for ((uj, &rj), &qj) in u.as_mut().iter_mut().zip(r.as_ref()).zip(q.as_ref()) {
                *uj = rj + beta * qj;
            }
            // p = u + beta * (q + beta * p)
            for ((pj, &uj), &qj) in p.as_mut().iter_mut().zip(u.as_ref()).zip(q.as_ref()) {
                *pj = uj + beta * (qj + beta * *pj);
            }
            err = new_err;
            i += 1;
        };

        *x = V::from(xk);
        Ok(SolveStats { iterations: i, final_error: err, converged })
    }
}
