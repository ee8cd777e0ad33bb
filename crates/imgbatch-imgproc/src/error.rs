use imgbatch_image::{ImageError, ImageSize};

use crate::cutout::Region;
use crate::parallel::ParallelError;

/// An error type for the kernels and the batch driver.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum KernelError {
    /// The cutout region is not fully contained in the image.
    #[error("Region {region} is outside of the image bounds {size}")]
    InvalidRegion {
        /// The offending region.
        region: Region,
        /// The size of the images of the batch.
        size: ImageSize,
    },

    /// The requested output size has a non-positive dimension or too many pixels.
    #[error("Invalid output size: width {0}, height {1}")]
    InvalidOutputSize(f64, f64),

    /// The length of the pixel data does not match the declared image size.
    #[error("Data length ({0}) does not match the declared image size ({1})")]
    ShapeMismatch(usize, usize),

    /// The image size of the batch is not the size the kernel was built for.
    #[error("Batch image size {0} does not match the kernel input size {1}")]
    ImageSizeMismatch(ImageSize, ImageSize),

    /// The affine map cannot be inverted.
    #[error("Affine map is singular (determinant {0})")]
    SingularTransform(f64),

    /// The batch call was cancelled before all rows were processed.
    #[error("Batch execution was cancelled")]
    Cancelled,

    /// The execution mode could not be set up.
    #[error(transparent)]
    Parallel(#[from] ParallelError),

    /// Error from the image batch.
    #[error(transparent)]
    Image(#[from] ImageError),
}
