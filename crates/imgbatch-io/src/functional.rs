use std::path::Path;

use imgbatch_image::{ImageBatch, ImageSize};

use crate::error::IoError;
use crate::metadata::{read_metadata, write_metadata, BatchMetadata};

/// Reads a batch of linearized images from a CSV matrix.
///
/// The file has no header and one image per line. The image size is taken, in order,
/// from `image_size`, from the `.mtd` metadata file next to the matrix, or defaults to a
/// single row of pixels.
///
/// # Arguments
///
/// * `file_path` - The path to the CSV file.
/// * `image_size` - The declared size of every image, if known.
///
/// # Returns
///
/// A batch with one image per CSV line.
///
/// # Errors
///
/// If the file cannot be read, a cell is not a number, the lines have different
/// lengths, or the declared image size does not match the number of columns.
pub fn read_batch_csv(
    file_path: impl AsRef<Path>,
    image_size: Option<ImageSize>,
) -> Result<ImageBatch<f64>, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let metadata = read_metadata(file_path)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(file_path)?;

    let mut data = Vec::new();
    let mut num_rows = 0;
    let mut num_cols = None;

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let cols = *num_cols.get_or_insert(record.len());
        if record.len() != cols {
            return Err(IoError::RaggedRow(row, record.len(), cols));
        }

        for (col, field) in record.iter().enumerate() {
            let value = field.parse::<f64>().map_err(|_| IoError::ParseValue {
                row,
                col,
                value: field.to_string(),
            })?;
            data.push(value);
        }
        num_rows += 1;
    }

    if let Some(metadata) = &metadata {
        let cols = num_cols.unwrap_or(metadata.cols);
        if metadata.rows != num_rows || metadata.cols != cols {
            return Err(IoError::MetadataMismatch(
                format!("{}x{}", metadata.rows, metadata.cols),
                format!("{}x{}", num_rows, cols),
            ));
        }
    }

    let num_cols = num_cols
        .or(metadata.as_ref().map(|m| m.cols))
        .or(image_size.map(|s| s.num_pixels()))
        .unwrap_or(0);

    let image_size = image_size
        .or(metadata.as_ref().map(BatchMetadata::image_size))
        .unwrap_or(ImageSize::from_rows_cols(1, num_cols));

    log::debug!(
        "read {} images of {} from {}",
        num_rows,
        image_size,
        file_path.display()
    );

    Ok(ImageBatch::from_matrix(data, num_rows, num_cols, image_size)?)
}

/// Writes a batch of linearized images to a CSV matrix with its `.mtd` metadata file.
///
/// # Arguments
///
/// * `file_path` - The path to the CSV file.
/// * `batch` - The batch to write, one image per line.
pub fn write_batch_csv<T: ToString>(
    file_path: impl AsRef<Path>,
    batch: &ImageBatch<T>,
) -> Result<(), IoError> {
    let file_path = file_path.as_ref();

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(file_path)?;

    for row in batch.rows() {
        writer.write_record(row.iter().map(ToString::to_string))?;
    }
    writer.flush()?;

    write_metadata(
        file_path,
        &BatchMetadata::csv(batch.num_images(), batch.image_size()),
    )?;

    log::debug!(
        "wrote {} images of {} to {}",
        batch.num_images(),
        batch.image_size(),
        file_path.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{read_batch_csv, write_batch_csv};
    use crate::error::IoError;
    use imgbatch_image::{ImageBatch, ImageError, ImageSize};

    #[test]
    fn read_without_metadata() -> Result<(), IoError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("A.csv");
        std::fs::write(&path, "1,2,3,4\n5, 6 ,7,8.5\n")?;

        let batch = read_batch_csv(&path, None)?;
        assert_eq!(batch.num_images(), 2);
        assert_eq!(batch.image_size(), ImageSize::from_rows_cols(1, 4));
        assert_eq!(batch.row(1), Some(&[5.0, 6.0, 7.0, 8.5][..]));

        let batch = read_batch_csv(&path, Some(ImageSize::from_rows_cols(2, 2)))?;
        assert_eq!(batch.image_size(), ImageSize::from_rows_cols(2, 2));
        Ok(())
    }

    #[test]
    fn write_then_read_uses_metadata() -> Result<(), IoError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("B.csv");
        let batch = ImageBatch::new(
            ImageSize::from_rows_cols(2, 3),
            2,
            vec![0.5, 1.0, -2.0, 255.0, 128.25, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        )?;

        write_batch_csv(&path, &batch)?;
        assert!(dir.path().join("B.csv.mtd").exists());

        let read = read_batch_csv(&path, None)?;
        assert_eq!(read, batch);
        Ok(())
    }

    #[test]
    fn read_errors() -> Result<(), IoError> {
        let dir = tempfile::tempdir()?;

        let missing = dir.path().join("missing.csv");
        assert!(matches!(
            read_batch_csv(&missing, None),
            Err(IoError::FileDoesNotExist(_))
        ));

        let ragged = dir.path().join("ragged.csv");
        std::fs::write(&ragged, "1,2,3\n4,5\n")?;
        assert!(matches!(
            read_batch_csv(&ragged, None),
            Err(IoError::RaggedRow(1, 2, 3))
        ));

        let text = dir.path().join("text.csv");
        std::fs::write(&text, "1,x\n")?;
        assert!(matches!(
            read_batch_csv(&text, None),
            Err(IoError::ParseValue { row: 0, col: 1, .. })
        ));

        let shape = dir.path().join("shape.csv");
        std::fs::write(&shape, "1,2,3\n")?;
        assert!(matches!(
            read_batch_csv(&shape, Some(ImageSize::from_rows_cols(2, 2))),
            Err(IoError::ImageCreationError(ImageError::ShapeMismatch(3, 4)))
        ));
        Ok(())
    }

    #[test]
    fn read_metadata_mismatch() -> Result<(), IoError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("C.csv");
        let batch = ImageBatch::from_size_val(ImageSize::from_rows_cols(2, 2), 3, 1.0f64);
        write_batch_csv(&path, &batch)?;

        // overwrite the matrix, keeping the stale metadata
        std::fs::write(&path, "1,2,3,4\n")?;
        assert!(matches!(
            read_batch_csv(&path, None),
            Err(IoError::MetadataMismatch(..))
        ));
        Ok(())
    }
}
