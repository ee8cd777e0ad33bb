//! Kernels applied to every image of a batch.
//!
//! A [`RowKernel`] is a validated, immutable kernel invocation that maps one linearized
//! input image to one linearized output image. [`apply_kernel`] runs it once per row of
//! an [`ImageBatch`] with the execution mode of an [`ExecutionContext`] and reassembles
//! the rows in order.
//!
//! # Examples
//!
//! ```
//! use imgbatch_image::{ImageBatch, ImageSize};
//! use imgbatch_imgproc::batch::cutout_batch;
//! use imgbatch_imgproc::cutout::Region;
//! use imgbatch_imgproc::parallel::ExecutionContext;
//!
//! let size = ImageSize::from_rows_cols(2, 2);
//! let batch = ImageBatch::new(size, 2, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
//!
//! let ctx = ExecutionContext::default();
//! let out = cutout_batch(&batch, &Region::new(1, 1, 1, 1), 0, &ctx).unwrap();
//!
//! assert_eq!(out.as_slice(), &[0, 2, 3, 4, 0, 6, 7, 8]);
//! ```

use std::time::Instant;

use num_traits::{NumCast, Zero};

use imgbatch_image::{ImageBatch, ImageError, ImageSize, SparseImageBatch};

use crate::cutout::{fill_rect, PixelRect, Region};
use crate::error::KernelError;
use crate::parallel::{par_map_rows, ExecutionContext};
use crate::params::{CutoutParams, TransformParams};
use crate::warp::{check_output_size, warp_affine_linearized, AffineMap};

/// A kernel applied independently to every row of a batch.
pub trait RowKernel<T>: Sync {
    /// The size of the images the kernel reads.
    fn input_size(&self) -> ImageSize;

    /// The size of the images the kernel writes.
    fn output_size(&self) -> ImageSize;

    /// Compute one output row from one input row.
    fn apply_row(&self, src: &[T], dst: &mut [T]) -> Result<(), KernelError>;
}

/// The cutout kernel with a validated region.
#[derive(Clone, Debug, PartialEq)]
pub struct CutoutKernel<T> {
    size: ImageSize,
    rect: PixelRect,
    fill: T,
}

impl<T> CutoutKernel<T> {
    /// Create a cutout kernel for images of the given size.
    ///
    /// # Errors
    ///
    /// [`KernelError::InvalidRegion`] if the region is not inside the image.
    pub fn new(size: ImageSize, region: &Region, fill: T) -> Result<Self, KernelError> {
        let rect = region.to_pixel_rect(size)?;
        Ok(Self { size, rect, fill })
    }
}

impl<T: Copy + Sync> RowKernel<T> for CutoutKernel<T> {
    fn input_size(&self) -> ImageSize {
        self.size
    }

    fn output_size(&self) -> ImageSize {
        self.size
    }

    fn apply_row(&self, src: &[T], dst: &mut [T]) -> Result<(), KernelError> {
        if src.len() != self.size.num_pixels() {
            return Err(KernelError::ShapeMismatch(src.len(), self.size.num_pixels()));
        }
        if dst.len() != src.len() {
            return Err(KernelError::ShapeMismatch(dst.len(), src.len()));
        }
        dst.copy_from_slice(src);
        fill_rect(dst, self.size.width, &self.rect, self.fill);
        Ok(())
    }
}

/// The affine transform kernel with a sampling map and a validated output size.
#[derive(Clone, Debug, PartialEq)]
pub struct AffineKernel<T> {
    src_size: ImageSize,
    dst_size: ImageSize,
    map: AffineMap,
    fill: T,
}

impl<T> AffineKernel<T> {
    /// Create an affine kernel.
    ///
    /// # Arguments
    ///
    /// * `src_size` - The size of the input images.
    /// * `map` - The sampling map from output to input coordinates.
    /// * `dst_size` - The size of the output images.
    /// * `fill` - The value of output pixels without a source.
    ///
    /// # Errors
    ///
    /// [`KernelError::InvalidOutputSize`] if a dimension of `dst_size` is zero or its
    /// number of pixels overflows `usize`.
    pub fn new(
        src_size: ImageSize,
        map: AffineMap,
        dst_size: ImageSize,
        fill: T,
    ) -> Result<Self, KernelError> {
        check_output_size(dst_size)?;

        Ok(Self {
            src_size,
            dst_size,
            map,
            fill,
        })
    }
}

impl<T: Copy + Sync> RowKernel<T> for AffineKernel<T> {
    fn input_size(&self) -> ImageSize {
        self.src_size
    }

    fn output_size(&self) -> ImageSize {
        self.dst_size
    }

    fn apply_row(&self, src: &[T], dst: &mut [T]) -> Result<(), KernelError> {
        warp_affine_linearized(src, self.src_size, dst, self.dst_size, &self.map, self.fill)
    }
}

/// Apply a kernel to every image of a batch.
///
/// # Arguments
///
/// * `batch` - The input batch, its image size must equal `kernel.input_size()`.
/// * `kernel` - The kernel to apply.
/// * `ctx` - The execution settings.
///
/// # Returns
///
/// A batch with the same number of images, of size `kernel.output_size()`. Output row
/// `i` is computed from input row `i` only.
///
/// # Errors
///
/// [`KernelError::ImageSizeMismatch`] if the batch does not have the kernel input size,
/// [`ImageError::SizeOverflow`] if the output batch is not addressable, or the first row
/// failure, cancellation or execution setup error. No partial batch is returned.
pub fn apply_kernel<T, K>(
    batch: &ImageBatch<T>,
    kernel: &K,
    ctx: &ExecutionContext,
) -> Result<ImageBatch<T>, KernelError>
where
    T: Copy + Default + Send + Sync,
    K: RowKernel<T>,
{
    let (src_size, dst_size) = (kernel.input_size(), kernel.output_size());
    if batch.image_size() != src_size {
        return Err(KernelError::ImageSizeMismatch(batch.image_size(), src_size));
    }

    let num_images = batch.num_images();
    let dst_len = dst_size
        .checked_batch_len(num_images)
        .ok_or(ImageError::SizeOverflow(dst_size, num_images))?;
    let mut dst = vec![T::default(); dst_len];

    let start = Instant::now();
    par_map_rows(
        batch.as_slice(),
        src_size.num_pixels(),
        &mut dst,
        dst_size.num_pixels(),
        ctx,
        |src_row, dst_row| kernel.apply_row(src_row, dst_row),
    )?;
    log::debug!(
        "applied kernel to {} images ({} -> {}) with {:?} in {:?}",
        num_images,
        src_size,
        dst_size,
        ctx.mode,
        start.elapsed()
    );

    Ok(ImageBatch::new(dst_size, num_images, dst)?)
}

/// Apply a kernel to every image of a sparse batch.
///
/// The batch is expanded to its dense form first; the output is dense.
pub fn apply_kernel_sparse<T, K>(
    batch: &SparseImageBatch<T>,
    kernel: &K,
    ctx: &ExecutionContext,
) -> Result<ImageBatch<T>, KernelError>
where
    T: Copy + Default + Zero + Send + Sync,
    K: RowKernel<T>,
{
    apply_kernel(&batch.to_dense(), kernel, ctx)
}

/// Overwrite a region of every image of a batch.
pub fn cutout_batch<T>(
    batch: &ImageBatch<T>,
    region: &Region,
    fill: T,
    ctx: &ExecutionContext,
) -> Result<ImageBatch<T>, KernelError>
where
    T: Copy + Default + Send + Sync,
{
    let kernel = CutoutKernel::new(batch.image_size(), region, fill)?;
    apply_kernel(batch, &kernel, ctx)
}

/// Resample every image of a batch through an affine sampling map.
pub fn transform_batch<T>(
    batch: &ImageBatch<T>,
    map: &AffineMap,
    out_size: ImageSize,
    fill: T,
    ctx: &ExecutionContext,
) -> Result<ImageBatch<T>, KernelError>
where
    T: Copy + Default + Send + Sync,
{
    let kernel = AffineKernel::new(batch.image_size(), *map, out_size, fill)?;
    apply_kernel(batch, &kernel, ctx)
}

fn cast_fill<T: NumCast>(fill: f64) -> Result<T, KernelError> {
    Ok(<T as NumCast>::from(fill).ok_or(ImageError::CastError)?)
}

/// Apply the cutout kernel described by named parameters.
///
/// The batch must have the declared `s_rows x s_cols` image size.
pub fn cutout_batch_with_params<T>(
    batch: &ImageBatch<T>,
    params: &CutoutParams,
    ctx: &ExecutionContext,
) -> Result<ImageBatch<T>, KernelError>
where
    T: Copy + Default + NumCast + Send + Sync,
{
    let kernel = CutoutKernel::new(
        params.image_size(),
        &params.region(),
        cast_fill(params.fill_color)?,
    )?;
    apply_kernel(batch, &kernel, ctx)
}

/// Apply the affine transform kernel described by named parameters.
///
/// The coefficients of `params` are the forward map; it is inverted once before any row
/// is processed.
pub fn transform_batch_with_params<T>(
    batch: &ImageBatch<T>,
    params: &TransformParams,
    ctx: &ExecutionContext,
) -> Result<ImageBatch<T>, KernelError>
where
    T: Copy + Default + NumCast + Send + Sync,
{
    let kernel = AffineKernel::new(
        params.image_size(),
        params.sampling_map()?,
        params.output_size()?,
        cast_fill(params.fill_value)?,
    )?;
    apply_kernel(batch, &kernel, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::ExecutionContext;

    fn contexts() -> Vec<ExecutionContext> {
        vec![
            ExecutionContext::serial(),
            ExecutionContext::default(),
            ExecutionContext::partitioned(1),
            ExecutionContext::partitioned(3),
        ]
    }

    #[test]
    fn cutout_batch_3x3() -> Result<(), KernelError> {
        let size = ImageSize::from_rows_cols(3, 3);
        let batch = ImageBatch::new(size, 1, (1..=9).map(|x| x as f64).collect())?;

        for ctx in contexts() {
            let out = cutout_batch(&batch, &Region::new(2, 2, 1, 1), 0.0, &ctx)?;
            assert_eq!(out.image_size(), size);
            assert_eq!(
                out.as_slice(),
                &[1.0, 2.0, 3.0, 4.0, 0.0, 6.0, 7.0, 8.0, 9.0]
            );
        }
        Ok(())
    }

    #[test]
    fn transform_batch_with_params_translation() -> Result<(), KernelError> {
        let params = TransformParams {
            s_rows: 2,
            s_cols: 2,
            a: 1.0,
            b: 0.0,
            c: 1.0,
            d: 0.0,
            e: 1.0,
            f: 0.0,
            out_w: 2.0,
            out_h: 2.0,
            fill_value: -1.0,
        };
        let batch = ImageBatch::new(
            params.image_size(),
            2,
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
        )?;

        for ctx in contexts() {
            let out = transform_batch_with_params(&batch, &params, &ctx)?;
            assert_eq!(
                out.as_slice(),
                &[-1.0, 1.0, -1.0, 3.0, -1.0, 5.0, -1.0, 7.0]
            );
        }
        Ok(())
    }

    #[test]
    fn transform_batch_new_row_width() -> Result<(), KernelError> {
        let size = ImageSize::from_rows_cols(2, 2);
        let batch = ImageBatch::new(size, 3, (0..12).collect::<Vec<i32>>())?;
        let out_size = ImageSize::from_rows_cols(1, 3);

        let ctx = ExecutionContext::partitioned(2);
        let out = transform_batch(&batch, &AffineMap::identity(), out_size, -1, &ctx)?;

        assert_eq!(out.num_images(), 3);
        assert_eq!(out.row_len(), 3);
        assert_eq!(out.as_slice(), &[0, 1, -1, 4, 5, -1, 8, 9, -1]);
        Ok(())
    }

    #[test]
    fn cutout_batch_with_params_u8() -> Result<(), KernelError> {
        let params = CutoutParams {
            s_rows: 2,
            s_cols: 2,
            x: 2,
            y: 1,
            w: 1,
            h: 2,
            fill_color: 200.0,
        };
        let batch = ImageBatch::new(params.image_size(), 1, vec![1u8, 2, 3, 4])?;

        let out = cutout_batch_with_params(&batch, &params, &ExecutionContext::default())?;
        assert_eq!(out.as_slice(), &[1u8, 200, 3, 200]);

        let params = CutoutParams {
            fill_color: -1.0,
            ..params
        };
        let res = cutout_batch_with_params(&batch, &params, &ExecutionContext::default());
        assert_eq!(res, Err(KernelError::Image(ImageError::CastError)));
        Ok(())
    }

    #[test]
    fn batch_declared_shape_mismatch() -> Result<(), KernelError> {
        let batch = ImageBatch::new(ImageSize::from_rows_cols(2, 3), 1, vec![0.0; 6])?;
        let params = CutoutParams {
            s_rows: 3,
            s_cols: 3,
            x: 1,
            y: 1,
            w: 1,
            h: 1,
            fill_color: 0.0,
        };

        let res = cutout_batch_with_params(&batch, &params, &ExecutionContext::default());
        assert_eq!(
            res,
            Err(KernelError::ImageSizeMismatch(
                ImageSize::from_rows_cols(2, 3),
                ImageSize::from_rows_cols(3, 3)
            ))
        );

        // same number of pixels, different shape
        let params = CutoutParams {
            s_rows: 3,
            s_cols: 2,
            ..params
        };
        let res = cutout_batch_with_params(&batch, &params, &ExecutionContext::default());
        assert_eq!(
            res,
            Err(KernelError::ImageSizeMismatch(
                ImageSize::from_rows_cols(2, 3),
                ImageSize::from_rows_cols(3, 2)
            ))
        );
        Ok(())
    }

    #[test]
    fn batch_invalid_parameters_fail_before_rows() -> Result<(), KernelError> {
        let size = ImageSize::from_rows_cols(2, 2);
        let batch = ImageBatch::new(size, 2, vec![0.0; 8])?;
        let ctx = ExecutionContext::default();

        let res = cutout_batch(&batch, &Region::new(2, 2, 2, 1), 1.0, &ctx);
        assert!(matches!(res, Err(KernelError::InvalidRegion { .. })));

        let out_size = ImageSize::from_rows_cols(2, 0);
        let res = transform_batch(&batch, &AffineMap::identity(), out_size, 1.0, &ctx);
        assert_eq!(res, Err(KernelError::InvalidOutputSize(0.0, 2.0)));

        let out_size = ImageSize::from_rows_cols(2, usize::MAX);
        let res = transform_batch(&batch, &AffineMap::identity(), out_size, 1.0, &ctx);
        assert_eq!(
            res,
            Err(KernelError::InvalidOutputSize(usize::MAX as f64, 2.0))
        );
        Ok(())
    }

    #[test]
    fn transform_batch_with_params_oversized_output() -> Result<(), KernelError> {
        let params = TransformParams {
            s_rows: 2,
            s_cols: 2,
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 0.0,
            e: 1.0,
            f: 0.0,
            out_w: 4294967296.0,
            out_h: 4294967296.0,
            fill_value: 0.0,
        };
        let batch = ImageBatch::new(params.image_size(), 1, vec![1.0, 2.0, 3.0, 4.0])?;

        for ctx in contexts() {
            let res = transform_batch_with_params(&batch, &params, &ctx);
            assert_eq!(
                res,
                Err(KernelError::InvalidOutputSize(4294967296.0, 4294967296.0))
            );
        }
        Ok(())
    }

    #[test]
    fn sparse_and_dense_agree() -> Result<(), KernelError> {
        let size = ImageSize::from_rows_cols(3, 3);
        let dense = ImageBatch::new(
            size,
            2,
            vec![
                0.0, 5.0, 0.0, 0.0, 0.0, 7.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 0.0,
                9.0,
            ],
        )?;
        let sparse = SparseImageBatch::from_dense(&dense);
        let kernel = CutoutKernel::new(size, &Region::new(1, 2, 2, 2), 4.0)?;

        for ctx in contexts() {
            assert_eq!(
                apply_kernel_sparse(&sparse, &kernel, &ctx)?,
                apply_kernel(&dense, &kernel, &ctx)?
            );
        }
        Ok(())
    }

    #[test]
    fn empty_batch() -> Result<(), KernelError> {
        let size = ImageSize::from_rows_cols(2, 2);
        let batch = ImageBatch::<f64>::new(size, 0, vec![])?;

        let ctx = ExecutionContext::partitioned(4);
        let out = transform_batch(&batch, &AffineMap::identity(), size, 0.0, &ctx)?;
        assert!(out.is_empty());
        assert_eq!(out.image_size(), size);
        Ok(())
    }
}
