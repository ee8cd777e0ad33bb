use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use imgbatch_image::ImageSize;

use crate::error::IoError;

/// Metadata describing a matrix of linearized images.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchMetadata {
    /// Number of matrix rows (images).
    pub rows: usize,
    /// Number of matrix columns (pixels per image).
    pub cols: usize,
    /// Height of every image.
    pub s_rows: usize,
    /// Width of every image.
    pub s_cols: usize,
    /// Storage format of the matrix file.
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "csv".to_string()
}

impl BatchMetadata {
    /// Describe a CSV matrix of `rows` images of the given size.
    pub fn csv(rows: usize, image_size: ImageSize) -> Self {
        Self {
            rows,
            cols: image_size.num_pixels(),
            s_rows: image_size.height,
            s_cols: image_size.width,
            format: default_format(),
        }
    }

    /// The declared image size.
    pub fn image_size(&self) -> ImageSize {
        ImageSize::from_rows_cols(self.s_rows, self.s_cols)
    }
}

/// The path of the metadata file of a matrix file: the matrix path with `.mtd` appended.
pub fn sidecar_path(file_path: impl AsRef<Path>) -> PathBuf {
    let mut path = file_path.as_ref().as_os_str().to_owned();
    path.push(".mtd");
    PathBuf::from(path)
}

/// Read the metadata of a matrix file, if present.
pub fn read_metadata(file_path: impl AsRef<Path>) -> Result<Option<BatchMetadata>, IoError> {
    let path = sidecar_path(file_path);
    if !path.exists() {
        return Ok(None);
    }

    let file = std::fs::File::open(&path)?;
    let metadata = serde_json::from_reader(std::io::BufReader::new(file))?;
    Ok(Some(metadata))
}

/// Write the metadata of a matrix file.
pub fn write_metadata(
    file_path: impl AsRef<Path>,
    metadata: &BatchMetadata,
) -> Result<(), IoError> {
    let file = std::fs::File::create(sidecar_path(file_path))?;
    let mut writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, metadata)?;
    writer.flush()?;
    Ok(())
}
