use serde::{Deserialize, Serialize};

use crate::error::ImageError;

/// Image size in pixels
///
/// A struct to represent the size of one image of a batch in pixels. The width is the
/// number of columns (`s_cols`) and the height the number of rows (`s_rows`).
///
/// # Examples
///
/// ```
/// use imgbatch_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// assert_eq!(image_size.num_pixels(), 200);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl ImageSize {
    /// Create an image size from a number of rows and columns.
    pub fn from_rows_cols(s_rows: usize, s_cols: usize) -> Self {
        Self {
            width: s_cols,
            height: s_rows,
        }
    }

    /// The number of pixels of one linearized image, saturating at `usize::MAX`.
    pub fn num_pixels(&self) -> usize {
        self.width.saturating_mul(self.height)
    }

    /// The number of pixels of one linearized image, or `None` if it overflows `usize`.
    pub fn checked_num_pixels(&self) -> Option<usize> {
        self.width.checked_mul(self.height)
    }

    /// The number of values of `num_images` linearized images, or `None` on overflow.
    pub fn checked_batch_len(&self, num_images: usize) -> Option<usize> {
        self.checked_num_pixels()?.checked_mul(num_images)
    }

    /// Returns true if the image holds no pixel.
    pub fn is_empty(&self) -> bool {
        self.num_pixels() == 0
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

/// A batch of linearized images.
///
/// The batch is a matrix where each row is one image flattened in row-major order, so
/// that pixel `(r, c)` of an image lives at column `r * width + c`. The image size is
/// batch-wide metadata shared by every row.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBatch<T> {
    data: Vec<T>,
    num_images: usize,
    image_size: ImageSize,
}

impl<T> ImageBatch<T> {
    /// Create a new batch from contiguous pixel data.
    ///
    /// # Arguments
    ///
    /// * `image_size` - The size of every image in the batch.
    /// * `num_images` - The number of images (matrix rows).
    /// * `data` - The pixel data, one linearized image after the other.
    ///
    /// # Errors
    ///
    /// If the length of the data does not match `num_images * image_size.num_pixels()`,
    /// or that product overflows `usize`.
    ///
    /// # Examples
    ///
    /// ```
    /// use imgbatch_image::{ImageBatch, ImageSize};
    ///
    /// let batch = ImageBatch::new(
    ///     ImageSize { width: 2, height: 2 },
    ///     2,
    ///     vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
    /// ).unwrap();
    ///
    /// assert_eq!(batch.num_images(), 2);
    /// assert_eq!(batch.row(1), Some(&[5.0, 6.0, 7.0, 8.0][..]));
    /// ```
    pub fn new(image_size: ImageSize, num_images: usize, data: Vec<T>) -> Result<Self, ImageError> {
        let expected = image_size
            .checked_batch_len(num_images)
            .ok_or(ImageError::SizeOverflow(image_size, num_images))?;
        if data.len() != expected {
            return Err(ImageError::ShapeMismatch(data.len(), expected));
        }

        Ok(Self {
            data,
            num_images,
            image_size,
        })
    }

    /// Create a batch from a raw matrix and a declared image size.
    ///
    /// The matrix must have `cols == image_size.num_pixels()` columns.
    pub fn from_matrix(
        data: Vec<T>,
        rows: usize,
        cols: usize,
        image_size: ImageSize,
    ) -> Result<Self, ImageError> {
        let num_pixels = image_size
            .checked_num_pixels()
            .ok_or(ImageError::SizeOverflow(image_size, rows))?;
        if cols != num_pixels {
            return Err(ImageError::ShapeMismatch(cols, num_pixels));
        }
        let expected = cols
            .checked_mul(rows)
            .ok_or(ImageError::SizeOverflow(image_size, rows))?;
        if data.len() != expected {
            return Err(ImageError::ShapeMismatch(data.len(), expected));
        }

        Self::new(image_size, rows, data)
    }

    /// Create a batch from one vector per image.
    pub fn from_rows(image_size: ImageSize, rows: Vec<Vec<T>>) -> Result<Self, ImageError> {
        let num_images = rows.len();
        let len = image_size
            .checked_batch_len(num_images)
            .ok_or(ImageError::SizeOverflow(image_size, num_images))?;
        let mut data = Vec::with_capacity(len);
        for row in rows {
            if row.len() != image_size.num_pixels() {
                return Err(ImageError::ShapeMismatch(
                    row.len(),
                    image_size.num_pixels(),
                ));
            }
            data.extend(row);
        }

        Self::new(image_size, num_images, data)
    }

    /// Create a batch with every pixel set to the same value.
    ///
    /// # Panics
    ///
    /// If the number of values of the batch overflows `usize`.
    pub fn from_size_val(image_size: ImageSize, num_images: usize, val: T) -> Self
    where
        T: Clone,
    {
        Self {
            data: vec![val; num_images * image_size.num_pixels()],
            num_images,
            image_size,
        }
    }

    /// Get the size of every image in the batch.
    pub fn image_size(&self) -> ImageSize {
        self.image_size
    }

    /// Get the number of images (matrix rows).
    pub fn num_images(&self) -> usize {
        self.num_images
    }

    /// Get the length of one linearized image (matrix columns).
    pub fn row_len(&self) -> usize {
        self.image_size.num_pixels()
    }

    /// Returns true if the batch holds no image.
    pub fn is_empty(&self) -> bool {
        self.num_images == 0
    }

    /// Get the pixel data of the whole batch.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get the mutable pixel data of the whole batch.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the batch and return the pixel data.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Get one linearized image.
    pub fn row(&self, index: usize) -> Option<&[T]> {
        if index >= self.num_images {
            return None;
        }
        let len = self.row_len();
        Some(&self.data[index * len..(index + 1) * len])
    }

    /// Iterate over the linearized images in order.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        (0..self.num_images).filter_map(move |i| self.row(i))
    }

    /// Get the pixel at `(row, col)` (zero-based) of image `index`.
    pub fn get(&self, index: usize, row: usize, col: usize) -> Result<&T, ImageError> {
        let image = self
            .row(index)
            .ok_or(ImageError::IndexOutOfBounds(index, self.num_images))?;
        if row >= self.image_size.height || col >= self.image_size.width {
            return Err(ImageError::PixelIndexOutOfBounds(
                col,
                row,
                self.image_size.width,
                self.image_size.height,
            ));
        }

        Ok(&image[row * self.image_size.width + col])
    }

    /// Reinterpret the rows of the batch with a different image size.
    ///
    /// The number of pixels must stay the same.
    pub fn reshape(self, image_size: ImageSize) -> Result<Self, ImageError> {
        if image_size.num_pixels() != self.row_len() {
            return Err(ImageError::ShapeMismatch(
                self.row_len(),
                image_size.num_pixels(),
            ));
        }

        Ok(Self { image_size, ..self })
    }

    /// Cast the pixel data of the batch to a different type.
    pub fn cast<U>(&self) -> Result<ImageBatch<U>, ImageError>
    where
        U: num_traits::NumCast,
        T: num_traits::NumCast + Copy,
    {
        let casted_data = self
            .data
            .iter()
            .map(|&x| <U as num_traits::NumCast>::from(x).ok_or(ImageError::CastError))
            .collect::<Result<Vec<U>, ImageError>>()?;

        ImageBatch::new(self.image_size, self.num_images, casted_data)
    }
}
