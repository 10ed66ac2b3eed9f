//! Shared convergence policy and normal-equations preprocessing.

pub mod convergence;
pub mod normal;

pub use convergence::{Convergence, ErrorMeasure, IterationCap, SolveStats, DEFAULT_TOL};
pub use normal::{normal_equations, solve_normal};
