/// An error type for the io module.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// Error when the file does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(std::path::PathBuf),

    /// Error to open or write the file.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// Error from the CSV reader or writer.
    #[error("Failed to read or write CSV. {0}")]
    Csv(#[from] csv::Error),

    /// Error when a matrix cell is not a number.
    #[error("Failed to parse value {value:?} at row {row}, column {col}")]
    ParseValue {
        /// Zero-based row of the cell.
        row: usize,
        /// Zero-based column of the cell.
        col: usize,
        /// The text of the cell.
        value: String,
    },

    /// Error when a row has a different number of columns than the first one.
    #[error("Row {0} has {1} columns, expected {2}")]
    RaggedRow(usize, usize, usize),

    /// Error to read or write the metadata file.
    #[error("Invalid metadata. {0}")]
    Metadata(#[from] serde_json::Error),

    /// Error when the metadata disagrees with the matrix.
    #[error("Metadata declares {0} but the matrix has {1}")]
    MetadataMismatch(String, String),

    /// Error to create the image batch.
    #[error("Failed to create image batch. {0}")]
    ImageCreationError(#[from] imgbatch_image::ImageError),
}
