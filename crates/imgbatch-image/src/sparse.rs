use num_traits::Zero;

use crate::batch::{ImageBatch, ImageSize};
use crate::error::ImageError;

/// A batch of linearized images in compressed sparse row (CSR) layout.
///
/// Row `i` stores its non-zero pixels in `values[indptr[i]..indptr[i + 1]]` at the
/// columns `indices[indptr[i]..indptr[i + 1]]`. Pixels not stored are zero.
#[derive(Clone, Debug, PartialEq)]
pub struct SparseImageBatch<T> {
    indptr: Vec<usize>,
    indices: Vec<usize>,
    values: Vec<T>,
    image_size: ImageSize,
}

impl<T> SparseImageBatch<T> {
    /// Create a sparse batch from its CSR arrays.
    ///
    /// # Errors
    ///
    /// If `indptr` is not monotonic, does not start at zero, does not end at the number of
    /// stored values, or if a column index is out of the image or not strictly increasing
    /// within a row. If the dense form of the batch would overflow `usize`.
    pub fn new(
        image_size: ImageSize,
        indptr: Vec<usize>,
        indices: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self, ImageError> {
        if indptr.first() != Some(&0) {
            return Err(ImageError::InvalidSparseLayout(
                "indptr must start at zero".to_string(),
            ));
        }
        if indices.len() != values.len() {
            return Err(ImageError::InvalidSparseLayout(format!(
                "{} indices for {} values",
                indices.len(),
                values.len()
            )));
        }
        if indptr.last() != Some(&values.len()) {
            return Err(ImageError::InvalidSparseLayout(format!(
                "indptr must end at {}",
                values.len()
            )));
        }

        let num_images = indptr.len().saturating_sub(1);
        if image_size.checked_batch_len(num_images).is_none() {
            return Err(ImageError::SizeOverflow(image_size, num_images));
        }

        let cols = image_size.num_pixels();
        for (i, bounds) in indptr.windows(2).enumerate() {
            if bounds[0] > bounds[1] || bounds[1] > indices.len() {
                return Err(ImageError::InvalidSparseLayout(format!(
                    "indptr is not monotonic at row {i}"
                )));
            }
            let row = &indices[bounds[0]..bounds[1]];
            if row.iter().any(|&c| c >= cols) {
                return Err(ImageError::InvalidSparseLayout(format!(
                    "column index out of bounds in row {i}"
                )));
            }
            if row.windows(2).any(|w| w[0] >= w[1]) {
                return Err(ImageError::InvalidSparseLayout(format!(
                    "column indices are not sorted in row {i}"
                )));
            }
        }

        Ok(Self {
            indptr,
            indices,
            values,
            image_size,
        })
    }

    /// Build a sparse batch keeping only the non-zero pixels of a dense batch.
    pub fn from_dense(batch: &ImageBatch<T>) -> Self
    where
        T: Zero + Copy,
    {
        let mut indptr = Vec::with_capacity(batch.num_images() + 1);
        let mut indices = Vec::new();
        let mut values = Vec::new();

        indptr.push(0);
        for row in batch.rows() {
            for (col, &val) in row.iter().enumerate() {
                if !val.is_zero() {
                    indices.push(col);
                    values.push(val);
                }
            }
            indptr.push(values.len());
        }

        Self {
            indptr,
            indices,
            values,
            image_size: batch.image_size(),
        }
    }

    /// Expand the batch into its dense form.
    pub fn to_dense(&self) -> ImageBatch<T>
    where
        T: Zero + Copy,
    {
        let row_len = self.image_size.num_pixels();
        let mut batch = ImageBatch::from_size_val(self.image_size, self.num_images(), T::zero());

        let data = batch.as_slice_mut();
        for (i, bounds) in self.indptr.windows(2).enumerate() {
            let offset = i * row_len;
            for k in bounds[0]..bounds[1] {
                data[offset + self.indices[k]] = self.values[k];
            }
        }

        batch
    }

    /// Get the size of every image in the batch.
    pub fn image_size(&self) -> ImageSize {
        self.image_size
    }

    /// Get the number of images (matrix rows).
    pub fn num_images(&self) -> usize {
        self.indptr.len() - 1
    }

    /// Get the number of stored pixels.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Fraction of pixels that are stored.
    pub fn density(&self) -> f64 {
        let total = self.num_images() * self.image_size.num_pixels();
        if total == 0 {
            return 0.0;
        }
        self.nnz() as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::SparseImageBatch;
    use crate::{ImageBatch, ImageError, ImageSize};

    #[test]
    fn sparse_to_dense() -> Result<(), ImageError> {
        let size = ImageSize::from_rows_cols(2, 2);
        let sparse =
            SparseImageBatch::new(size, vec![0, 1, 3], vec![2, 0, 3], vec![5.0, 1.0, 7.0])?;

        assert_eq!(sparse.num_images(), 2);
        assert_eq!(sparse.nnz(), 3);

        let dense = sparse.to_dense();
        assert_eq!(dense.as_slice(), &[0.0, 0.0, 5.0, 0.0, 1.0, 0.0, 0.0, 7.0]);

        Ok(())
    }

    #[test]
    fn sparse_from_dense() -> Result<(), ImageError> {
        let size = ImageSize::from_rows_cols(1, 3);
        let dense = ImageBatch::new(size, 2, vec![0u8, 3, 0, 9, 0, 0])?;
        let sparse = SparseImageBatch::from_dense(&dense);

        assert_eq!(sparse.nnz(), 2);
        assert!((sparse.density() - 2.0 / 6.0).abs() < 1e-12);
        assert_eq!(sparse.to_dense(), dense);

        Ok(())
    }

    #[test]
    fn sparse_invalid_layout() {
        let size = ImageSize::from_rows_cols(1, 2);

        let res = SparseImageBatch::new(size, vec![1, 1], vec![0], vec![1.0]);
        assert!(matches!(res, Err(ImageError::InvalidSparseLayout(_))));

        let res = SparseImageBatch::new(size, vec![0, 1], vec![2], vec![1.0]);
        assert!(matches!(res, Err(ImageError::InvalidSparseLayout(_))));

        let res = SparseImageBatch::new(size, vec![0, 2], vec![1, 0], vec![1.0, 2.0]);
        assert!(matches!(res, Err(ImageError::InvalidSparseLayout(_))));

        let huge = ImageSize::from_rows_cols(usize::MAX, 2);
        let res = SparseImageBatch::new(huge, vec![0, 0], vec![], Vec::<f64>::new());
        assert_eq!(res, Err(ImageError::SizeOverflow(huge, 1)));

        let res = SparseImageBatch::new(size, vec![0, 2, 1], vec![0, 1], vec![1.0, 2.0]);
        assert!(matches!(res, Err(ImageError::InvalidSparseLayout(_))));
    }
}
