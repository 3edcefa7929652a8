//! Import of identifier sheets.
//!
//! Each CSV file is one sheet: header row first (cell A1 must read `UIN`),
//! then A = UIN, B = nationality, C = passport number, D.. extra columns
//! carried through to the export.

mod reader;
mod validate;

pub use reader::{import_file, import_reader};
pub use validate::{IdentifierValidator, NricValidator};

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to read {file} line {line}: {source}")]
    Read {
        file: String,
        line: u64,
        #[source]
        source: csv::Error,
    },
}

/// Row counters, accumulated across every imported file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    /// Rows with a UIN or a nationality.
    pub total_read: usize,
    pub invalid: usize,
    pub duplicate: usize,
}
