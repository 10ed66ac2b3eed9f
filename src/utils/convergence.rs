//! Convergence tracking & tolerance checks for the iterative solvers.

use num_traits::Float;
use std::num::NonZeroUsize;

/// Default tolerance shared by all four methods, matching the classical
/// reference value. Callers convert it to their scalar type explicitly;
/// there are no per-method defaults.
pub const DEFAULT_TOL: f64 = 1e-8;

/// Iteration cap. Zero is not a valid cap: an uncapped run is requested
/// explicitly via `Unlimited`, never by overloading `0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IterationCap {
    Limited(NonZeroUsize),
    Unlimited,
}

impl IterationCap {
    /// Cap at `n` iterations. Returns `None` for `n == 0`.
    pub fn limited(n: usize) -> Option<Self> {
        NonZeroUsize::new(n).map(Self::Limited)
    }

    /// Whether `i` completed iterations exhaust the cap.
    pub fn reached(&self, i: usize) -> bool {
        match self {
            Self::Limited(cap) => i >= cap.get(),
            Self::Unlimited => false,
        }
    }
}

/// The scalar quantity a method monitors for convergence, together with the
/// normalization applied before comparing against the tolerance.
///
/// The choice is per method and not cosmetic: CG and CGS compare the squared
/// residual norm itself, so their tolerance sits on the squared scale — a
/// square-root factor tighter than a norm-based convention.
#[derive(Clone, Copy, Debug)]
pub enum ErrorMeasure<T> {
    /// Squared residual norm `rᵗr` (CG, CGS); its magnitude is compared
    /// directly, without taking a square root. CGS carries a bilinear `r0ᵗr`
    /// after the first step, hence the magnitude.
    SquaredNorm(T),
    /// Bilinear product `qᵗr` (BiCG); may be negative, compared via its
    /// absolute value.
    Bilinear(T),
    /// Residual norm `‖r‖₂` (BiCGSTAB); compared directly.
    Norm(T),
}

impl<T: Float> ErrorMeasure<T> {
    /// The non-negative quantity actually compared against the tolerance.
    pub fn magnitude(&self) -> T {
        match *self {
            Self::SquaredNorm(e) => e.abs(),
            Self::Bilinear(e) => e.abs(),
            Self::Norm(n) => n,
        }
    }
}

/// Stopping criteria shared by all methods.
#[derive(Clone, Copy, Debug)]
pub struct Convergence<T> {
    pub tol: T,
    pub cap: IterationCap,
}

impl<T: Float> Convergence<T> {
    pub fn new(tol: T, cap: IterationCap) -> Self {
        Self { tol, cap }
    }

    /// True once the monitored quantity is within tolerance.
    pub fn converged(&self, measure: ErrorMeasure<T>) -> bool {
        measure.magnitude() <= self.tol
    }

    /// True once `i` completed iterations exhaust the cap.
    pub fn cap_reached(&self, i: usize) -> bool {
        self.cap.reached(i)
    }
}

/// Outcome of a solve: iteration count, the final value of the method's
/// error measure (squared residual norm for CG/CGS, bilinear `qᵗr` for BiCG,
/// residual norm for BiCGSTAB), and whether the tolerance was met.
///
/// `converged == false` with `iterations` equal to the cap means the cap was
/// exhausted; the returned iterate is the best available approximation.
#[derive(Clone, Debug)]
pub struct SolveStats<T> {
    pub iterations: usize,
    pub final_error: T,
    pub converged: bool,
}
