#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// batch of linearized images stored in a single matrix.
pub mod batch;

/// Error types for the image module.
pub mod error;

/// compressed sparse row representation of an image batch.
pub mod sparse;

pub use crate::batch::{ImageBatch, ImageSize};
pub use crate::error::ImageError;
pub use crate::sparse::SparseImageBatch;
