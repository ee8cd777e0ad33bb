use serde::{Deserialize, Serialize};

use imgbatch_image::ImageSize;

use crate::error::KernelError;
use crate::interpolation::nearest_pixel;

/// A 2D affine map with six coefficients.
///
/// The map sends a point `(x, y)` to
///
/// ```text
/// x' = a * x + b * y + c
/// y' = d * x + e * y + f
/// ```
///
/// When given to [`warp_affine_linearized`] the map is read as the sampling map, from
/// 1-based output coordinates to 1-based input coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AffineMap {
    /// Coefficient of `x` in `x'`.
    pub a: f64,
    /// Coefficient of `y` in `x'`.
    pub b: f64,
    /// Translation of `x'`.
    pub c: f64,
    /// Coefficient of `x` in `y'`.
    pub d: f64,
    /// Coefficient of `y` in `y'`.
    pub e: f64,
    /// Translation of `y'`.
    pub f: f64,
}

impl Default for AffineMap {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<[f64; 6]> for AffineMap {
    fn from(m: [f64; 6]) -> Self {
        Self::new(m[0], m[1], m[2], m[3], m[4], m[5])
    }
}

impl From<AffineMap> for [f64; 6] {
    fn from(m: AffineMap) -> Self {
        [m.a, m.b, m.c, m.d, m.e, m.f]
    }
}

impl AffineMap {
    /// Create a map from its coefficients.
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// The sampling map of a forward map from input to output coordinates.
    ///
    /// # Errors
    ///
    /// [`KernelError::SingularTransform`] if the forward map cannot be inverted.
    ///
    /// # Example
    ///
    /// ```
    /// use imgbatch_imgproc::warp::AffineMap;
    ///
    /// let m = AffineMap::from_forward(1.0, 0.0, 1.0, 0.0, 1.0, 0.0).unwrap();
    /// assert_eq!(m, AffineMap::translation(-1.0, 0.0));
    /// ```
    pub fn from_forward(
        a: f64,
        b: f64,
        c: f64,
        d: f64,
        e: f64,
        f: f64,
    ) -> Result<Self, KernelError> {
        Self::new(a, b, c, d, e, f).inverse()
    }

    /// The identity map.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0)
    }

    /// A pure translation by `(tx, ty)`.
    pub fn translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, tx, 0.0, 1.0, ty)
    }

    /// Returns a rotation map around a center point.
    ///
    /// The map is defined as:
    ///
    /// | alpha  beta  tx |
    /// | -beta  alpha ty |
    ///
    /// where:
    ///
    /// alpha = scale * cos(angle)
    /// beta = scale * sin(angle)
    /// tx = (1 - alpha) * center.x - beta * center.y
    /// ty = beta * center.x + (1 - alpha) * center.y
    ///
    /// # Arguments
    ///
    /// * `center` - The center point of the rotation.
    /// * `angle` - The angle of rotation in degrees.
    /// * `scale` - The scale factor.
    pub fn rotation(center: (f64, f64), angle: f64, scale: f64) -> Self {
        let angle = angle.to_radians();
        let alpha = scale * angle.cos();
        let beta = scale * angle.sin();

        let tx = (1.0 - alpha) * center.0 - beta * center.1;
        let ty = beta * center.0 + (1.0 - alpha) * center.1;

        Self::new(alpha, beta, tx, -beta, alpha, ty)
    }

    /// The determinant of the linear part.
    pub fn determinant(&self) -> f64 {
        self.a * self.e - self.b * self.d
    }

    /// Applies the map to a point.
    #[inline]
    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        let u = self.a * x + self.b * y + self.c;
        let v = self.d * x + self.e * y + self.f;
        (u, v)
    }

    /// Inverts the map.
    ///
    /// # Errors
    ///
    /// [`KernelError::SingularTransform`] if the determinant is zero or not finite.
    ///
    /// # Example
    ///
    /// ```
    /// use imgbatch_imgproc::warp::AffineMap;
    ///
    /// let m = AffineMap::translation(2.0, -1.0);
    /// assert_eq!(m.inverse().unwrap(), AffineMap::translation(-2.0, 1.0));
    /// ```
    pub fn inverse(&self) -> Result<Self, KernelError> {
        let determinant = self.determinant();
        if determinant == 0.0 || !determinant.is_finite() {
            return Err(KernelError::SingularTransform(determinant));
        }
        let inv_determinant = 1.0 / determinant;

        let a = self.e * inv_determinant;
        let b = -self.b * inv_determinant;
        let d = -self.d * inv_determinant;
        let e = self.a * inv_determinant;
        let c = -(a * self.c + b * self.f);
        let f = -(d * self.c + e * self.f);

        Ok(Self::new(a, b, c, d, e, f))
    }
}

/// Checks that an output size has a positive width and height and returns its number of
/// pixels.
pub(crate) fn check_output_size(size: ImageSize) -> Result<usize, KernelError> {
    match size.checked_num_pixels() {
        Some(num_pixels) if num_pixels > 0 => Ok(num_pixels),
        _ => Err(KernelError::InvalidOutputSize(
            size.width as f64,
            size.height as f64,
        )),
    }
}

/// Resamples a linearized image through an affine sampling map.
///
/// Every output pixel `(out_row, out_col)` is looked up at
/// `map.transform_point(out_col + 1, out_row + 1)` in the source image, rounded to the
/// nearest pixel. Lookups outside of `[1, width] x [1, height]` produce `fill`.
///
/// # Arguments
///
/// * `src` - The source image, `src_size.num_pixels()` values in row-major order.
/// * `src_size` - The size of the source image.
/// * `dst` - The destination image, `dst_size.num_pixels()` values.
/// * `dst_size` - The size of the destination image.
/// * `map` - The map from output coordinates to input coordinates.
/// * `fill` - The value of output pixels without a source.
///
/// # Example
///
/// ```
/// use imgbatch_image::ImageSize;
/// use imgbatch_imgproc::warp::{warp_affine_linearized, AffineMap};
///
/// let size = ImageSize::from_rows_cols(2, 2);
/// let src = [1.0, 2.0, 3.0, 4.0];
/// let mut dst = [0.0; 4];
///
/// warp_affine_linearized(&src, size, &mut dst, size, &AffineMap::identity(), -1.0).unwrap();
///
/// assert_eq!(dst, src);
/// ```
pub fn warp_affine_linearized<T: Copy>(
    src: &[T],
    src_size: ImageSize,
    dst: &mut [T],
    dst_size: ImageSize,
    map: &AffineMap,
    fill: T,
) -> Result<(), KernelError> {
    let dst_len = check_output_size(dst_size)?;
    if src.len() != src_size.num_pixels() {
        return Err(KernelError::ShapeMismatch(src.len(), src_size.num_pixels()));
    }
    if dst.len() != dst_len {
        return Err(KernelError::ShapeMismatch(dst.len(), dst_len));
    }

    let (src_cols, src_rows) = (src_size.width, src_size.height);

    dst.chunks_exact_mut(dst_size.width)
        .enumerate()
        .for_each(|(out_row, dst_row)| {
            let out_y = (out_row + 1) as f64;
            dst_row
                .iter_mut()
                .enumerate()
                .for_each(|(out_col, dst_pixel)| {
                    let (u, v) = map.transform_point((out_col + 1) as f64, out_y);
                    *dst_pixel = nearest_pixel(src, src_cols, src_rows, u, v).unwrap_or(fill);
                });
        });

    Ok(())
}

/// Resamples a linearized image through an affine sampling map into a new image.
///
/// See [`warp_affine_linearized`].
pub fn transform<T: Copy>(
    image: &[T],
    map: &AffineMap,
    out_size: ImageSize,
    fill: T,
    size: ImageSize,
) -> Result<Vec<T>, KernelError> {
    let mut dst = vec![fill; check_output_size(out_size)?];
    warp_affine_linearized(image, size, &mut dst, out_size, map, fill)?;
    Ok(dst)
}
