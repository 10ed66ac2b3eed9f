//! conjgrad: conjugate-gradient family Krylov solvers over Faer
//!
//! This crate provides the four classical CG-family iterative methods for
//! dense linear systems — Conjugate Gradient (CG), Biconjugate Gradient
//! (BiCG), Conjugate Gradient Squared (CGS), and Biconjugate Gradient
//! Stabilized (BiCGSTAB) — plus the normal-equations preprocessing that
//! makes rectangular or non-symmetric systems solvable by CG.
//!
//! Each solve is synchronous and owns its state exclusively; independent
//! solves may run on separate threads sharing a read-only operator.

pub mod core;
pub mod error;
pub mod solver;
pub mod utils;

// Re-exports for convenience
pub use self::core::*;
pub use self::error::*;
pub use self::solver::*;
pub use self::utils::*;

// Re-export SolveStats at the crate root for convenience
pub use self::utils::convergence::SolveStats;
