use crate::batch::ImageSize;

/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when the data length does not match the declared batch shape.
    #[error("Data length ({0}) does not match the declared shape ({1})")]
    ShapeMismatch(usize, usize),

    /// Error when the sparse layout is not a valid CSR structure.
    #[error("Invalid sparse layout: {0}")]
    InvalidSparseLayout(String),

    /// Error when an image index is out of bounds.
    #[error("Image index {0} is out of bounds for a batch of {1} images")]
    IndexOutOfBounds(usize, usize),

    /// Error when a pixel index is out of bounds.
    #[error("Pixel index ({0}, {1}) is out of bounds ({2}, {3})")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when the number of values of a batch does not fit in `usize`.
    #[error("A batch of {1} images of {0} overflows the addressable size")]
    SizeOverflow(ImageSize, usize),

    /// Error when the pixel data cannot be casted.
    #[error("Failed to cast image data")]
    CastError,
}
