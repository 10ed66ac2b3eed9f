//! Biconjugate Gradient (BiCG) solver per Saad §7.3.
//!
//! Two-sided method for general square systems: alongside the primal
//! iterate it advances a dual iterate against Aᵗ, so the operator must
//! provide both `A v` and `Aᵗ v` products. The monitored error `qᵗr` is a
//! bilinear form, not a norm; it can vanish or change sign without
//! convergence, which surfaces as a breakdown rather than a silent NaN.

use crate::core::traits::{InnerProduct, MatShape, MatTransVec, MatVec};
use crate::error::SolveError;
use crate::solver::{check_dims, checked_div, initial_residual, IterativeSolver};
use crate::utils::convergence::{Convergence, ErrorMeasure, IterationCap, SolveStats};
use num_traits::Float;

pub struct BicgSolver<T> {
    pub conv: Convergence<T>,
}

impl<T: Float> BicgSolver<T> {
    pub fn new(tol: T, cap: IterationCap) -> Self {
        Self { conv: Convergence { tol, cap } }
    }
}

impl<M, V, T> IterativeSolver<M, V> for BicgSolver<T>
where
    M: MatVec<V> + MatTransVec<V> + MatShape,
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
        // Dual iterate, advanced alongside x against the transposed operator.
        let mut yk = xk.clone();

        // r = b - A x, q = b - A^T x (dual residual)
        let mut r = initial_residual(a, b, &*x);
        let mut q = {
            let mut atx = V::from(vec![T::zero(); n]);
            a.mattransvec(x, &mut atx);
            let q = b
                .as_ref()
                .iter()
                .zip(atx.as_ref())
                .map(|(&bi, &ati)| bi - ati)
                .collect::<Vec<_>>();
            V::from(q)
        };
        let mut p = r.clone();
        let mut s = q.clone();
        // err = q^T r, a bilinear form; its absolute value is the
        // convergence signal.
        let mut err = ip.dot(&q, &r);

        let mut i = 0;
        let converged = loop {
            if self.conv.converged(ErrorMeasure::Bilinear(err)) {
                break true;
            }
            if self.conv.cap_reached(i) {
                break false;
            }
            let mut ap = V::from(vec![T::zero(); n]);
            a.matvec(&p, &mut ap);
            let alpha = checked_div(err, ip.dot(&s, &ap), "s^T A p")?;
            for (xj, &pj) in xk.iter_mut().zip(p.as_ref()) {
                *xj = *xj + alpha * pj;
            }
            for (yj, &sj) in yk.iter_mut().zip(s.as_ref()) {
                *yj = *yj + alpha * sj;
            }
            let mut ats = V::from(vec![T::zero(); n]);
            a.mattransvec(&s, &mut ats);
            for (rj, &apj) in r.as_mut().iter_mut().zip(ap.as_ref()) {
                *rj = *rj - alpha * apj;
            }
            for (qj, &atj) in q.as_mut().iter_mut().zip(ats.as_ref()) {
                *qj = *qj - alpha * atj;
            }
            let new_err = ip.dot(&q, &r);
            let beta = checked_div(new_err, err, "q^T r")?;
            for (pj, &rj) in p.as_mut().iter_mut().zip(r.as_ref()) {
                *pj = rj + beta * *pj;
            }
            for (sj, &qj) in s.as_mut().iter_mut().zip(q.as_ref()) {
                *sj = qj + beta * *sj;
            }
            err = new_err;
            i += 1;
        };

        *x = V::from(xk);
        Ok(SolveStats { iterations: i, final_error: err, converged })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::{MatShape, MatTransVec, MatVec};

    #[derive(Clone)]
    struct DenseMat {
        data: Vec<Vec<f64>>,
    }
    impl MatVec<Vec<f64>> for DenseMat {
        fn matvec(&self, x: &Vec<f64>, y: &mut Vec<f64>) {
            for (i, row) in self.data.iter().enumerate() {
                y[i] = row.iter().zip(x.iter()).map(|(a, b)| a * b).sum();
            }
        }
    }
    impl MatTransVec<Vec<f64>> for DenseMat {
        fn mattransvec(&self, x: &Vec<f64>, y: &mut Vec<f64>) {
            for j in 0..self.data[0].len() {
                y[j] = self.data.iter().zip(x.iter()).map(|(row, xi)| row[j] * xi).sum();
            }
        }
    }
    impl MatShape for DenseMat {
        fn nrows(&self) -> usize {
            self.data.len()
        }
        fn ncols(&self) -> usize {
            self.data[0].len()
        }
    }

    #[test]
    fn bicg_solves_diagonally_dominant_nonsym() {
        // A = [[10,2,1],[1,12,-3],[2,1,9]], x_true = [1,2,3]
        let a = DenseMat {
            data: vec![
                vec![10.0, 2.0, 1.0],
                vec![1.0, 12.0, -3.0],
                vec![2.0, 1.0, 9.0],
            ],
        };
        let x_true = vec![1.0, 2.0, 3.0];
        let b = {
            let mut b = vec![0.0; 3];
            a.matvec(&x_true, &mut b);
            b
        };
        let mut x = vec![0.0; 3];
        let mut solver = BicgSolver::new(1e-12, IterationCap::limited(200).unwrap());
        let stats = solver.solve(&a, &b, &mut x).unwrap();
        let tol = 1e-5;
        for (xi, ei) in x.iter().zip(x_true.iter()) {
            assert!((xi - ei).abs() < tol, "xi = {}, expected = {}", xi, ei);
        }
        assert!(stats.converged, "BiCG did not converge: {:?}", stats);
    }

    #[test]
    fn bicg_rejects_nonsquare_operator() {
        let a = DenseMat { data: vec![vec![1.0, 0.0, 1.0], vec![0.0, 1.0, 1.0]] };
        let b = vec![1.0, 2.0];
        let mut x = vec![0.0, 0.0, 0.0];
        let mut solver = BicgSolver::new(1e-8, IterationCap::limited(10).unwrap());
        let err = solver.solve(&a, &b, &mut x).unwrap_err();
        assert!(matches!(err, SolveError::NonSquareOperator { .. }));
    }

    #[test]
    fn bicg_counter_stops_at_cap() {
        // Cap below what the system needs: the cap, not the tolerance,
        // ends the run.
        let a = DenseMat {
            data: vec![
                vec![10.0, 2.0, 1.0],
                vec![1.0, 12.0, -3.0],
                vec![2.0, 1.0, 9.0],
            ],
        };
        let b = vec![13.0, 14.0, 15.0];
        let mut x = vec![0.0; 3];
        let mut solver = BicgSolver::new(1e-14, IterationCap::limited(2).unwrap());
        let stats = solver.solve(&a, &b, &mut x).unwrap();
        assert!(!stats.converged);
        assert_eq!(stats.iterations, 2);
    }
}
