use serde::{Deserialize, Serialize};

use imgbatch_image::ImageSize;

use crate::error::KernelError;

/// A rectangular region of an image in 1-based pixel coordinates.
///
/// `x` and `y` are the column and row of the top-left corner, `w` and `h` the width and
/// height of the region in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    /// Column of the top-left corner, starting at 1.
    pub x: usize,
    /// Row of the top-left corner, starting at 1.
    pub y: usize,
    /// Width of the region in pixels.
    pub w: usize,
    /// Height of the region in pixels.
    pub h: usize,
}

impl Region {
    /// Create a new region.
    pub fn new(x: usize, y: usize, w: usize, h: usize) -> Self {
        Self { x, y, w, h }
    }

    /// Returns true if the region covers no pixel.
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Validate the region against an image size and convert it to zero-based pixel bounds.
    ///
    /// An empty region is always valid and yields an empty rectangle.
    ///
    /// # Errors
    ///
    /// [`KernelError::InvalidRegion`] if a non-empty region is not fully inside the image.
    pub fn to_pixel_rect(&self, size: ImageSize) -> Result<PixelRect, KernelError> {
        if self.is_empty() {
            return Ok(PixelRect::default());
        }

        let invalid = || KernelError::InvalidRegion {
            region: *self,
            size,
        };

        if self.x == 0 || self.y == 0 {
            return Err(invalid());
        }

        let col_start = self.x - 1;
        let row_start = self.y - 1;
        let col_end = col_start.checked_add(self.w).ok_or_else(invalid)?;
        let row_end = row_start.checked_add(self.h).ok_or_else(invalid)?;

        if col_end > size.width || row_end > size.height {
            return Err(invalid());
        }

        Ok(PixelRect {
            row_start,
            row_end,
            col_start,
            col_end,
        })
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Region {{ x: {}, y: {}, w: {}, h: {} }}",
            self.x, self.y, self.w, self.h
        )
    }
}

/// Zero-based half-open pixel bounds `[row_start, row_end) x [col_start, col_end)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PixelRect {
    /// First row inside the rectangle.
    pub row_start: usize,
    /// One past the last row inside the rectangle.
    pub row_end: usize,
    /// First column inside the rectangle.
    pub col_start: usize,
    /// One past the last column inside the rectangle.
    pub col_end: usize,
}

impl PixelRect {
    /// Returns true if the pixel `(row, col)` lies inside the rectangle.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.row_start..self.row_end).contains(&row)
            && (self.col_start..self.col_end).contains(&col)
    }

    /// Returns true if the rectangle covers no pixel.
    pub fn is_empty(&self) -> bool {
        self.row_start >= self.row_end || self.col_start >= self.col_end
    }
}

/// Fill an already validated rectangle of a linearized image.
pub(crate) fn fill_rect<T: Copy>(dst: &mut [T], cols: usize, rect: &PixelRect, fill: T) {
    if rect.is_empty() {
        return;
    }
    for row in rect.row_start..rect.row_end {
        let offset = row * cols;
        dst[offset + rect.col_start..offset + rect.col_end].fill(fill);
    }
}

/// Overwrite a rectangular region of a linearized image with a fill value.
///
/// # Arguments
///
/// * `src` - The source image, `size.num_pixels()` values in row-major order.
/// * `dst` - The destination image with the same length as `src`.
/// * `size` - The size of the image.
/// * `region` - The 1-based region to overwrite.
/// * `fill` - The value written inside the region.
///
/// # Errors
///
/// The region is validated before any pixel is written, so on error `dst` is untouched.
///
/// # Examples
///
/// ```
/// use imgbatch_image::ImageSize;
/// use imgbatch_imgproc::cutout::{cutout_linearized, Region};
///
/// let src = [1, 2, 3, 4, 5, 6, 7, 8, 9];
/// let mut dst = [0; 9];
///
/// let size = ImageSize::from_rows_cols(3, 3);
/// cutout_linearized(&src, &mut dst, size, &Region::new(2, 2, 1, 1), 0).unwrap();
///
/// assert_eq!(dst, [1, 2, 3, 4, 0, 6, 7, 8, 9]);
/// ```
pub fn cutout_linearized<T: Copy>(
    src: &[T],
    dst: &mut [T],
    size: ImageSize,
    region: &Region,
    fill: T,
) -> Result<(), KernelError> {
    if src.len() != size.num_pixels() {
        return Err(KernelError::ShapeMismatch(src.len(), size.num_pixels()));
    }
    if dst.len() != size.num_pixels() {
        return Err(KernelError::ShapeMismatch(dst.len(), size.num_pixels()));
    }

    let rect = region.to_pixel_rect(size)?;

    dst.copy_from_slice(src);
    fill_rect(dst, size.width, &rect, fill);

    Ok(())
}

/// Overwrite a rectangular region of a linearized image and return the result.
///
/// See [`cutout_linearized`].
pub fn cutout<T: Copy>(
    image: &[T],
    region: &Region,
    fill: T,
    size: ImageSize,
) -> Result<Vec<T>, KernelError> {
    let mut dst = image.to_vec();
    cutout_linearized(image, &mut dst, size, region, fill)?;
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::{cutout, cutout_linearized, PixelRect, Region};
    use crate::KernelError;
    use imgbatch_image::ImageSize;

    #[test]
    fn cutout_center_pixel() -> Result<(), KernelError> {
        let size = ImageSize::from_rows_cols(3, 3);
        let image = (1..=9).map(|x| x as f64).collect::<Vec<_>>();

        let out = cutout(&image, &Region::new(2, 2, 1, 1), 0.0, size)?;

        assert_eq!(out, vec![1.0, 2.0, 3.0, 4.0, 0.0, 6.0, 7.0, 8.0, 9.0]);
        Ok(())
    }

    #[test]
    fn cutout_whole_image() -> Result<(), KernelError> {
        let size = ImageSize::from_rows_cols(2, 3);
        let image = vec![1u8, 2, 3, 4, 5, 6];

        let out = cutout(&image, &Region::new(1, 1, 3, 2), 7, size)?;

        assert_eq!(out, vec![7u8; 6]);
        Ok(())
    }

    #[test]
    fn cutout_non_square_region() -> Result<(), KernelError> {
        let size = ImageSize::from_rows_cols(3, 4);
        #[rustfmt::skip]
        let image = vec![
            1, 2, 3, 4,
            5, 6, 7, 8,
            9, 10, 11, 12,
        ];

        let out = cutout(&image, &Region::new(2, 2, 3, 2), -1, size)?;

        #[rustfmt::skip]
        let expected = vec![
            1, 2, 3, 4,
            5, -1, -1, -1,
            9, -1, -1, -1,
        ];
        assert_eq!(out, expected);
        Ok(())
    }

    #[test]
    fn cutout_empty_region_is_identity() -> Result<(), KernelError> {
        let size = ImageSize::from_rows_cols(2, 2);
        let image = vec![1.0, 2.0, 3.0, 4.0];

        assert_eq!(cutout(&image, &Region::new(1, 1, 0, 2), 9.0, size)?, image);
        assert_eq!(cutout(&image, &Region::new(2, 1, 1, 0), 9.0, size)?, image);
        Ok(())
    }

    #[test]
    fn cutout_is_idempotent() -> Result<(), KernelError> {
        let size = ImageSize::from_rows_cols(4, 5);
        let image = (0..20).map(|x| x as f32).collect::<Vec<_>>();
        let region = Region::new(2, 3, 3, 2);

        let once = cutout(&image, &region, 255.0, size)?;
        let twice = cutout(&once, &region, 255.0, size)?;

        assert_eq!(once, twice);
        Ok(())
    }

    #[test]
    fn cutout_fill_not_clamped() -> Result<(), KernelError> {
        let size = ImageSize::from_rows_cols(1, 2);
        let out = cutout(&[10.0, 20.0], &Region::new(1, 1, 1, 1), -300.5, size)?;
        assert_eq!(out, vec![-300.5, 20.0]);
        Ok(())
    }

    #[test]
    fn cutout_invalid_region() {
        let size = ImageSize::from_rows_cols(3, 3);
        let image = vec![0.0; 9];

        for region in [
            Region::new(0, 1, 1, 1),
            Region::new(1, 0, 1, 1),
            Region::new(3, 1, 2, 1),
            Region::new(1, 3, 1, 2),
            Region::new(4, 4, 1, 1),
            Region::new(1, 1, usize::MAX, 1),
        ] {
            let res = cutout(&image, &region, 1.0, size);
            assert_eq!(res, Err(KernelError::InvalidRegion { region, size }));
        }
    }

    #[test]
    fn cutout_error_leaves_dst_untouched() {
        let size = ImageSize::from_rows_cols(2, 3);
        let src = [1, 2, 3, 4, 5, 6];
        let mut dst = [-1; 6];

        let region = Region::new(2, 1, 3, 1);
        let res = cutout_linearized(&src, &mut dst, size, &region, 0);
        assert_eq!(res, Err(KernelError::InvalidRegion { region, size }));
        assert_eq!(dst, [-1; 6]);

        let res = cutout_linearized(&src[..4], &mut dst, size, &Region::new(1, 1, 1, 1), 0);
        assert_eq!(res, Err(KernelError::ShapeMismatch(4, 6)));
        assert_eq!(dst, [-1; 6]);
    }

    #[test]
    fn cutout_shape_mismatch() {
        let size = ImageSize::from_rows_cols(2, 2);
        let res = cutout(&[1.0, 2.0, 3.0], &Region::new(1, 1, 1, 1), 0.0, size);
        assert_eq!(res, Err(KernelError::ShapeMismatch(3, 4)));
    }

    #[test]
    fn pixel_rect_contains() -> Result<(), KernelError> {
        let rect = Region::new(2, 3, 2, 1).to_pixel_rect(ImageSize::from_rows_cols(4, 4))?;

        assert_eq!(
            rect,
            PixelRect {
                row_start: 2,
                row_end: 3,
                col_start: 1,
                col_end: 3,
            }
        );
        assert!(rect.contains(2, 1));
        assert!(rect.contains(2, 2));
        assert!(!rect.contains(2, 3));
        assert!(!rect.contains(1, 1));
        Ok(())
    }
}
