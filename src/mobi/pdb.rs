//! PDB (Palm Database) container layout.
//!
//! The PDB header is 78 bytes followed by the record info list: one 8-byte
//! entry per record holding the record's absolute data offset (u32) and four
//! bytes of attributes/unique ID that are ignored here.

use std::ops::Range;

use log::trace;

use crate::error::{Error, Result};
use crate::io::{ByteSource, read_u16, read_u32};

/// Type/Creator signature of a MOBI book.
pub const BOOKMOBI_MAGIC: &[u8; 8] = b"BOOKMOBI";
/// Absolute offset of the Type/Creator signature.
pub const BOOKMOBI_OFFSET: u64 = 60;
/// Absolute offset of the u16 record count.
pub const RECORD_COUNT_OFFSET: u64 = 76;
/// Absolute offset of the first record info entry.
pub const RECORD_TABLE_OFFSET: u64 = 78;
/// Size of one record info entry.
pub const RECORD_ENTRY_SIZE: u64 = 8;

const DATABASE_NAME_LEN: usize = 32;

/// Returns true when bytes 60..68 carry the `BOOKMOBI` signature.
pub fn is_bookmobi(source: &dyn ByteSource) -> Result<bool> {
    let ident = source.read_at(BOOKMOBI_OFFSET, BOOKMOBI_MAGIC.len())?;
    Ok(ident == BOOKMOBI_MAGIC)
}

/// Absolute file offset where record `index` begins.
///
/// The index is not checked against the record count: callers keep it in
/// `0..record_count`. Past the table this returns whatever bytes follow it,
/// or [`Error::OutOfRange`] at the end of the source. Use
/// [`record_offset_checked`] when the index comes from untrusted input.
pub fn record_offset(source: &dyn ByteSource, index: u64) -> Result<u64> {
    let entry = index
        .checked_mul(RECORD_ENTRY_SIZE)
        .and_then(|rel| rel.checked_add(RECORD_TABLE_OFFSET))
        .ok_or(Error::OutOfRange {
            offset: u64::MAX,
            len: 4,
            source_len: source.len(),
        })?;
    let offset = u64::from(read_u32(source, entry)?);
    trace!("PDB record {index} starts at {offset}");
    Ok(offset)
}

/// Like [`record_offset`], but rejects indices beyond the declared count.
pub fn record_offset_checked(source: &dyn ByteSource, index: u64) -> Result<u64> {
    let count = record_count(source)?;
    if index >= u64::from(count) {
        return Err(Error::RecordIndex { index, count });
    }
    record_offset(source, index)
}

/// Number of records declared in the PDB header.
pub fn record_count(source: &dyn ByteSource) -> Result<u16> {
    read_u16(source, RECORD_COUNT_OFFSET)
}

/// Database name from bytes 0-31 (NUL-terminated).
pub fn database_name(source: &dyn ByteSource) -> Result<Vec<u8>> {
    let mut name = source.read_at(0, DATABASE_NAME_LEN)?;
    if let Some(end) = name.iter().position(|&b| b == 0) {
        name.truncate(end);
    }
    Ok(name)
}

/// Byte range of record `index`.
///
/// PDB records carry no length field; a record ends where the next one
/// begins. Records must be stored contiguously in ascending offset order.
pub fn record_range(source: &dyn ByteSource, index: u64) -> Result<Range<u64>> {
    let start = record_offset(source, index)?;
    let end = record_offset(source, index + 1)?;
    if end < start {
        return Err(Error::InvalidContainer(format!(
            "PDB record {} starts at {end}, before record {index} at {start}",
            index + 1
        )));
    }
    Ok(start..end)
}
