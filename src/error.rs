//! Error types for mobi-meta operations.

use thiserror::Error;

/// Errors that can occur while decoding a MOBI container.
///
/// A missing EXTH table or a missing cover record is not an error; those
/// lookups return `Ok(None)`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid MOBI: {0}")]
    InvalidContainer(String),

    #[error("read of {len} bytes at offset {offset} exceeds source length {source_len}")]
    OutOfRange { offset: u64, len: u64, source_len: u64 },

    #[error("PDB record index {index} out of bounds ({count} records)")]
    RecordIndex { index: u64, count: u16 },
}

pub type Result<T> = std::result::Result<T, Error>;
