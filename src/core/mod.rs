//! Core linear-algebra traits and their Faer/Vec implementations.

pub mod traits;
pub mod wrappers;

pub use traits::*;
