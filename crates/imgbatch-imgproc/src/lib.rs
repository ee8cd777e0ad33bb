#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// batch kernels and the batch execution driver.
pub mod batch;

/// rectangular cutout module.
pub mod cutout;

/// Error types for the kernels.
pub mod error;

/// utilities for interpolation.
pub mod interpolation;

/// module containing parallelization utilities.
pub mod parallel;

/// named kernel parameters.
pub mod params;

/// image geometric transformations module.
pub mod warp;

pub use crate::error::KernelError;
