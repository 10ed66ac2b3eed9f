//! BiCGStab solver per Saad §7.4.2.
//!
//! Stabilized transpose-free variant of BiCG. Unlike the other three
//! methods, the convergence test monitors the residual vector's norm
//! directly; the recurrence itself still tracks the bilinear `r0ᵗr`. The
//! stabilization scalar `omega` divides by `(A s)ᵗ(A s)`, a true norm, so it
//! is only undefined when `s` is near zero, i.e. at convergence; that case
//! exits as converged before `omega` is formed.

use crate::core::traits::{InnerProduct, MatShape, MatVec};
use crate::error::SolveError;
use crate::solver::{check_dims, checked_div, initial_residual, IterativeSolver};
use crate::utils::convergence::{Convergence, ErrorMeasure, IterationCap, SolveStats};
use num_traits::Float;

pub struct BiCgStabSolver<T> {
    pub conv: Convergence<T>,
}

impl<T: Float> BiCgStabSolver<T> {
    pub fn new(tol: T, cap: IterationCap) -> Self {
        Self { conv: Convergence { tol, cap } }
    }
}

impl<M, V, T> IterativeSolver<M, V> for BiCgStabSolver<T>
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
        // Fixed shadow residual.
        let r0 = r.clone();
        let mut p = r.clone();
        // Bilinear r0^T r driving the recurrence; equals r^T r initially.
        let mut err = ip.dot(&r, &r);
        let mut res_norm = err.abs().sqrt();

        let mut i = 0;
        let converged = loop {
            if self.conv.converged(ErrorMeasure::Norm(res_norm)) {
                break true;
            }
            if self.conv.cap_reached(i) {
                break false;
            }
            let mut ap = V::from(vec![T::zero(); n]);
            a.matvec(&p, &mut ap);
            let alpha = checked_div(err, ip.dot(&r0, &ap), "r0^T A p")?;
            // s = r - alpha * Ap
            let s = V::from(
                r.as_ref()
                    .iter()
                    .zip(ap.as_ref())
                    .map(|(&rj, &apj)| rj - alpha * apj)
                    .collect::<Vec<_>>(),
            );
            let s_norm = ip.norm(&s);
            if self.conv.converged(ErrorMeasure::Norm(s_norm)) {
                // Half-step already within tolerance; omega would divide by
                // a vanishing norm here.
                for (xj, &pj) in xk.iter_mut().zip(p.as_ref()) {
                    *xj = *xj + alpha * pj;
                }
                res_norm = s_norm;
                i += 1;
                break true;
            }
            let mut as_ = V::from(vec![T::zero(); n]);
            a.matvec(&s, &mut as_);
            let omega = checked_div(ip.dot(&s, &as_), ip.dot(&as_, &as_), "(A s)^T A s")?;
            // x = x + alpha * p + omega * s
            for ((xj, &pj), &sj) in xk.iter_mut().zip(p.as_ref()).zip(s.as_ref()) {
                *xj = *xj + alpha * pj + omega * sj;
            }
            // r = s - omega * As
            for ((rj, &sj), &asj) in r.as_mut().iter_mut().zip(s.as_ref()).zip(as_.as_ref()) {
                *rj = sj - omega * asj;
            }
            let new_err = ip.dot(&r0, &r);
            // The loop condition monitors ‖r‖, not the bilinear err, so err
            // can vanish while the residual is still large; both factors of
            // beta are therefore checked.
            let beta = checked_div(alpha, omega, "omega")?
                * checked_div(new_err, err, "r0^T r")?;
            // p = r + beta * (p - omega * Ap)
            for ((pj, &rj), &apj) in p.as_mut().iter_mut().zip(r.as_ref()).zip(ap.as_ref()) {
                *pj = rj + beta * (*pj - omega * apj);
            }
            err = new_err;
            res_norm = ip.norm(&r);
            i += 1;
        };

        *x = V::from(xk);
        Ok(SolveStats { iterations: i, final_error: res_norm, converged })
    }
}
