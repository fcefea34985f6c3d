//! Benchmark records produced by the auto-tuners and the reader for their result files.

mod parameter;
mod reader;
mod record;


pub use parameter::Parameter;
pub use reader::{read_records, RecordReader};
pub use record::{BenchmarkRecord, COLUMNS};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read input")]
    Read(#[from] std::io::Error),
    #[error("line {line}: expected {expected} fields but found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: invalid value '{value}' for {column}")]
    InvalidField {
        line: usize,
        column: &'static str,
        value: String,
    },
    #[error("'{0}' is not a tuning parameter, use one of nrThreadsD0, nrThreadsD1, nrItemsD0, nrItemsD1")]
    UnknownParameter(String),
}
