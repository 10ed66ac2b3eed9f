use thiserror::Error;

// Unified error type for conjgrad

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("dimension mismatch: {context} expects length {expected}, got {found}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("operator must be square, got {nrows}x{ncols}")]
    NonSquareOperator { nrows: usize, ncols: usize },
    #[error("breakdown: denominator {denominator} = {value:e} is numerically zero")]
    Breakdown {
        denominator: &'static str,
        value: f64,
    },
}
