//! Named kernel parameters.
//!
//! The parameter sets mirror the named arguments accepted by the batch kernels and can be
//! deserialized from any serde format. Affine coefficients are given as the forward map,
//! from input to output coordinates, and are inverted once into the sampling map used
//! by the kernel.

use serde::{Deserialize, Serialize};

use imgbatch_image::ImageSize;

use crate::cutout::Region;
use crate::error::KernelError;
use crate::warp::AffineMap;

/// Parameters of the cutout kernel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CutoutParams {
    /// Height of the input images.
    pub s_rows: usize,
    /// Width of the input images.
    pub s_cols: usize,
    /// 1-based column of the top-left corner.
    pub x: usize,
    /// 1-based row of the top-left corner.
    pub y: usize,
    /// Width of the region.
    pub w: usize,
    /// Height of the region.
    pub h: usize,
    /// Value written inside the region.
    #[serde(alias = "fill_value")]
    pub fill_color: f64,
}

impl CutoutParams {
    /// The declared size of the input images.
    pub fn image_size(&self) -> ImageSize {
        ImageSize::from_rows_cols(self.s_rows, self.s_cols)
    }

    /// The region to overwrite.
    pub fn region(&self) -> Region {
        Region::new(self.x, self.y, self.w, self.h)
    }
}

/// Parameters of the affine transform kernel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformParams {
    /// Height of the input images.
    pub s_rows: usize,
    /// Width of the input images.
    pub s_cols: usize,
    /// Forward coefficient `a`.
    pub a: f64,
    /// Forward coefficient `b`.
    pub b: f64,
    /// Forward coefficient `c`.
    pub c: f64,
    /// Forward coefficient `d`.
    pub d: f64,
    /// Forward coefficient `e`.
    pub e: f64,
    /// Forward coefficient `f`.
    pub f: f64,
    /// Width of the output images, truncated to an integer.
    pub out_w: f64,
    /// Height of the output images, truncated to an integer.
    pub out_h: f64,
    /// Value of output pixels without a source.
    #[serde(alias = "fill_color", default)]
    pub fill_value: f64,
}

impl TransformParams {
    /// The declared size of the input images.
    pub fn image_size(&self) -> ImageSize {
        ImageSize::from_rows_cols(self.s_rows, self.s_cols)
    }

    /// The forward map from input to output coordinates.
    pub fn forward_map(&self) -> AffineMap {
        AffineMap::new(self.a, self.b, self.c, self.d, self.e, self.f)
    }

    /// The sampling map from output to input coordinates.
    ///
    /// # Errors
    ///
    /// [`KernelError::SingularTransform`] if the forward map cannot be inverted.
    pub fn sampling_map(&self) -> Result<AffineMap, KernelError> {
        AffineMap::from_forward(self.a, self.b, self.c, self.d, self.e, self.f)
    }

    /// The size of the output images.
    pub fn output_size(&self) -> Result<ImageSize, KernelError> {
        output_size(self.out_w, self.out_h)
    }
}

/// Convert a real output size into an integer pixel grid, truncating towards zero.
///
/// # Errors
///
/// [`KernelError::InvalidOutputSize`] if a truncated dimension is not positive, a
/// dimension is not finite, or the number of pixels does not fit in `usize`.
///
/// # Example
///
/// ```
/// use imgbatch_image::ImageSize;
/// use imgbatch_imgproc::params::output_size;
///
/// assert_eq!(output_size(500.0, 135.0 * 1.2).unwrap(), ImageSize { width: 500, height: 162 });
/// assert!(output_size(0.9, 10.0).is_err());
/// ```
pub fn output_size(out_w: f64, out_h: f64) -> Result<ImageSize, KernelError> {
    let (w, h) = (out_w.trunc(), out_h.trunc());
    let max = usize::MAX as f64;
    if !(w.is_finite() && h.is_finite()) || w < 1.0 || h < 1.0 || w >= max || h >= max {
        return Err(KernelError::InvalidOutputSize(out_w, out_h));
    }

    let size = ImageSize {
        width: w as usize,
        height: h as usize,
    };
    if size.checked_num_pixels().is_none() {
        return Err(KernelError::InvalidOutputSize(out_w, out_h));
    }

    Ok(size)
}
