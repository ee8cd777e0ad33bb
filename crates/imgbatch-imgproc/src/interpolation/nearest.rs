/// Round to the nearest integer, breaking ties towards positive infinity.
///
/// `2.5` rounds to `3.0` and `-2.5` rounds to `-2.0`.
///
/// # Example
///
/// ```
/// use imgbatch_imgproc::interpolation::round_half_up;
///
/// assert_eq!(round_half_up(2.5), 3.0);
/// assert_eq!(round_half_up(-2.5), -2.0);
/// assert_eq!(round_half_up(2.49), 2.0);
/// ```
#[inline]
pub fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Map a 1-based real coordinate to the zero-based index of the nearest pixel.
///
/// # Arguments
///
/// * `v` - The coordinate, where `1.0` is the centre of the first pixel.
/// * `len` - The number of pixels along the axis.
///
/// # Returns
///
/// The zero-based index if the rounded coordinate lies in `[1, len]`, `None` otherwise.
/// Non-finite coordinates are never in range.
#[inline]
pub fn nearest_index(v: f64, len: usize) -> Option<usize> {
    let r = round_half_up(v);
    // NaN fails both comparisons
    if r >= 1.0 && r <= len as f64 {
        Some(r as usize - 1)
    } else {
        None
    }
}

/// Kernel for nearest neighbor sampling of a linearized image.
///
/// # Arguments
///
/// * `image` - The linearized source image.
/// * `cols` - The number of columns of the source image.
/// * `rows` - The number of rows of the source image.
/// * `u` - The 1-based x coordinate to sample.
/// * `v` - The 1-based y coordinate to sample.
///
/// # Returns
///
/// The source pixel, or `None` if the coordinate falls outside of the image.
#[inline]
pub fn nearest_pixel<T: Copy>(image: &[T], cols: usize, rows: usize, u: f64, v: f64) -> Option<T> {
    let iu = nearest_index(u, cols)?;
    let iv = nearest_index(v, rows)?;
    image.get(iv * cols + iu).copied()
}

#[cfg(test)]
mod tests {
    use super::{nearest_index, nearest_pixel, round_half_up};

    #[test]
    fn round_half_up_ties() {
        assert_eq!(round_half_up(0.5), 1.0);
        assert_eq!(round_half_up(1.5), 2.0);
        assert_eq!(round_half_up(-0.5), 0.0);
        assert_eq!(round_half_up(-1.5), -1.0);
        assert_eq!(round_half_up(3.0), 3.0);
        assert_eq!(round_half_up(2.999), 3.0);
    }

    #[test]
    fn nearest_index_bounds() {
        assert_eq!(nearest_index(1.0, 3), Some(0));
        assert_eq!(nearest_index(0.5, 3), Some(0));
        assert_eq!(nearest_index(0.49, 3), None);
        assert_eq!(nearest_index(3.49, 3), Some(2));
        assert_eq!(nearest_index(3.5, 3), None);
        assert_eq!(nearest_index(-10.0, 3), None);
        assert_eq!(nearest_index(1.0, 0), None);
        assert_eq!(nearest_index(f64::NAN, 3), None);
        assert_eq!(nearest_index(f64::INFINITY, 3), None);
    }

    #[test]
    fn nearest_pixel_sampling() {
        #[rustfmt::skip]
        let image = [
            1, 2, 3,
            4, 5, 6,
        ];
        assert_eq!(nearest_pixel(&image, 3, 2, 1.0, 1.0), Some(1));
        assert_eq!(nearest_pixel(&image, 3, 2, 2.6, 1.7), Some(6));
        assert_eq!(nearest_pixel(&image, 3, 2, 2.0, 2.5), None);
    }
}
