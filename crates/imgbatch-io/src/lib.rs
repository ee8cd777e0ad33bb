#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the io module.
pub mod error;

/// High-level read and write functions for image batches.
pub mod functional;

/// JSON metadata stored next to a matrix file.
pub mod metadata;

pub use crate::error::IoError;
