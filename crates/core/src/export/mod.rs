//! Export of retrieved results as CSV.

mod writer;

pub use writer::{export_file_name, export_to_dir, write_csv, FIXED_HEADERS};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to create {path}: {source}")]
    Create {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to flush output: {0}")]
    Io(#[from] std::io::Error),
}
