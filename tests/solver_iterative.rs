//! Tests for the CG-family iterative solvers against direct solves on
//! random matrices.
//!
//! Verifies that CG matches a direct LU solve on SPD systems, that the
//! non-symmetric methods (BiCG, CGS, BiCGSTAB) agree with each other and
//! with a direct solve on diagonally dominant systems, and that the
//! iteration-count bookkeeping behaves.

use approx::assert_abs_diff_eq;
use conjgrad::solver::{BiCgStabSolver, BicgSolver, CgSolver, CgsSolver, IterativeSolver};
use conjgrad::utils::convergence::IterationCap;
use faer::linalg::solvers::SolveCore;
use faer::Mat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random symmetric positive definite matrix `A = Mᵀ M + I` and random
/// right-hand side `b`.
fn random_spd(n: usize, rng: &mut StdRng) -> (Mat<f64>, Vec<f64>) {
    let data: Vec<f64> = (0..n * n).map(|_| rng.r#gen()).collect();
    let m = Mat::from_fn(n, n, |i, j| data[j * n + i]);
    let m_t = m.transpose();
    // Diagonal shift keeps the spectrum tight enough for n-step termination.
    let shift = Mat::from_fn(n, n, |i, j| if i == j { n as f64 } else { 0.0 });
    let a = &m_t * &m + shift;
    let b: Vec<f64> = (0..n).map(|_| rng.r#gen()).collect();
    (a, b)
}

/// Random diagonally dominant non-symmetric matrix and right-hand side.
fn random_diag_dominant(n: usize, rng: &mut StdRng) -> (Mat<f64>, Vec<f64>) {
    let data: Vec<f64> = (0..n * n).map(|_| rng.r#gen()).collect();
    let a = Mat::from_fn(n, n, |i, j| {
        let v = data[j * n + i];
        if i == j { v + n as f64 } else { v }
    });
    let b: Vec<f64> = (0..n).map(|_| rng.r#gen()).collect();
    (a, b)
}

fn direct_solve(a: &Mat<f64>, b: &[f64]) -> Vec<f64> {
    let n = b.len();
    let mut x = b.to_vec();
    let lus = faer::linalg::solvers::FullPivLu::new(a.as_ref());
    let x_mat = faer::MatMut::from_column_major_slice_mut(&mut x, n, 1);
    lus.solve_in_place_with_conj(faer::Conj::No, x_mat);
    x
}

#[test]
fn cg_vs_direct_on_spd() {
    let mut rng = StdRng::seed_from_u64(7);
    let n = 10;
    let (a, b) = random_spd(n, &mut rng);
    let mut x_cg = vec![0.0; n];
    // CG's tolerance is on the squared-norm scale: 1e-16 stops at ‖r‖ ≤ 1e-8.
    let mut solver = CgSolver::new(1e-16, IterationCap::limited(1000).unwrap());
    let stats = solver.solve(&a, &b, &mut x_cg).unwrap();
    assert!(stats.converged);
    let x_direct = direct_solve(&a, &b);
    for i in 0..n {
        assert_abs_diff_eq!(x_cg[i], x_direct[i], epsilon = 1e-6);
    }
}

#[test]
fn cg_terminates_within_n_iterations_on_small_spd() {
    // In exact arithmetic CG converges in at most n steps; allow a little
    // slack for rounding.
    let mut rng = StdRng::seed_from_u64(11);
    for n in [4usize, 6, 8, 10] {
        let (a, b) = random_spd(n, &mut rng);
        let mut x = vec![0.0; n];
        let mut solver = CgSolver::new(1e-16, IterationCap::limited(100).unwrap());
        let stats = solver.solve(&a, &b, &mut x).unwrap();
        assert!(stats.converged, "CG did not converge for n = {}", n);
        assert!(
            stats.iterations <= n + 2,
            "n = {}: took {} iterations",
            n,
            stats.iterations
        );
    }
}

#[test]
fn nonsymmetric_methods_agree_with_direct_solve() {
    let mut rng = StdRng::seed_from_u64(23);
    let n = 10;
    let (a, b) = random_diag_dominant(n, &mut rng);
    let x_direct = direct_solve(&a, &b);
    let cap = IterationCap::limited(1000).unwrap();

    let mut x_bicg = vec![0.0; n];
    let stats = BicgSolver::new(1e-12, cap).solve(&a, &b, &mut x_bicg).unwrap();
    assert!(stats.converged, "BiCG did not converge: {:?}", stats);

    let mut x_cgs = vec![0.0; n];
    let stats = CgsSolver::new(1e-10, cap).solve(&a, &b, &mut x_cgs).unwrap();
    assert!(stats.converged, "CGS did not converge: {:?}", stats);

    let mut x_bicgstab = vec![0.0; n];
    let stats = BiCgStabSolver::new(1e-8, cap).solve(&a, &b, &mut x_bicgstab).unwrap();
    assert!(stats.converged, "BiCGSTAB did not converge: {:?}", stats);

    for i in 0..n {
        assert_abs_diff_eq!(x_bicg[i], x_direct[i], epsilon = 1e-5);
        assert_abs_diff_eq!(x_cgs[i], x_direct[i], epsilon = 1e-5);
        assert_abs_diff_eq!(x_bicgstab[i], x_direct[i], epsilon = 1e-5);
        assert_abs_diff_eq!(x_bicg[i], x_cgs[i], epsilon = 1e-5);
        assert_abs_diff_eq!(x_cgs[i], x_bicgstab[i], epsilon = 1e-5);
    }
}

#[test]
fn cap_exhaustion_returns_best_available_iterate() {
    let mut rng = StdRng::seed_from_u64(31);
    let n = 10;
    let (a, b) = random_spd(n, &mut rng);
    let mut x = vec![0.0; n];
    let cap = 3;
    let mut solver = CgSolver::new(1e-14, IterationCap::limited(cap).unwrap());
    let stats = solver.solve(&a, &b, &mut x).unwrap();
    assert!(!stats.converged);
    assert_eq!(stats.iterations, cap);
    // The partial iterate is still an improvement over the zero guess.
    let mut ax = vec![0.0; n];
    use conjgrad::core::traits::MatVec;
    a.matvec(&x, &mut ax);
    let res: f64 = b.iter().zip(&ax).map(|(bi, axi)| (bi - axi) * (bi - axi)).sum::<f64>().sqrt();
    let res0: f64 = b.iter().map(|bi| bi * bi).sum::<f64>().sqrt();
    assert!(res < res0, "residual did not decrease: {} vs {}", res, res0);
}

#[test]
fn concurrent_solves_share_a_read_only_operator() {
    // Each solve owns its state exclusively; a shared operator reference is
    // safe across threads.
    let mut rng = StdRng::seed_from_u64(41);
    let n = 8;
    let (a, b) = random_spd(n, &mut rng);
    let x_direct = direct_solve(&a, &b);
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let (a, b) = (&a, &b);
                s.spawn(move || {
                    let mut x = vec![0.0; n];
                    let mut solver = CgSolver::new(1e-16, IterationCap::limited(500).unwrap());
                    let stats = solver.solve(a, b, &mut x).unwrap();
                    assert!(stats.converged);
                    x
                })
            })
            .collect();
        for h in handles {
            let x = h.join().unwrap();
            for i in 0..n {
                assert_abs_diff_eq!(x[i], x_direct[i], epsilon = 1e-7);
            }
        }
    });
}
