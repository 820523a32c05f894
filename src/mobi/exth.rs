//! EXTH (extended header) metadata records.
//!
//! The table follows the MOBI header inside record zero:
//!
//! ```text
//! "EXTH" | header length (u32) | record count (u32) | records...
//! record: type (u32) | total length incl. these 8 bytes (u32) | payload
//! ```

use log::debug;

use crate::error::{Error, Result};
use crate::io::{ByteSource, expect_magic, read_u32};

pub const EXTH_MAGIC: &[u8; 4] = b"EXTH";

const TABLE_HEADER_LEN: u64 = 12;
const RECORD_HEADER_LEN: u64 = 8;

/// Well-known EXTH record types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExthType {
    Author,
    Publisher,
    Imprint,
    Description,
    Isbn,
    Subject,
    PublishedAt,
    Review,
    Contributor,
    Rights,
    SubjectCode,
    Type,
    Source,
    Asin,
    Version,
    Adult,
    /// Cover image, as an index relative to the first image record.
    CoverOffset,
    /// Thumbnail image, relative like `CoverOffset`.
    ThumbOffset,
}

impl ExthType {
    pub const ALL: [ExthType; 18] = [
        ExthType::Author,
        ExthType::Publisher,
        ExthType::Imprint,
        ExthType::Description,
        ExthType::Isbn,
        ExthType::Subject,
        ExthType::PublishedAt,
        ExthType::Review,
        ExthType::Contributor,
        ExthType::Rights,
        ExthType::SubjectCode,
        ExthType::Type,
        ExthType::Source,
        ExthType::Asin,
        ExthType::Version,
        ExthType::Adult,
        ExthType::CoverOffset,
        ExthType::ThumbOffset,
    ];

    pub const fn code(self) -> u32 {
        match self {
            ExthType::Author => 100,
            ExthType::Publisher => 101,
            ExthType::Imprint => 102,
            ExthType::Description => 103,
            ExthType::Isbn => 104,
            ExthType::Subject => 105,
            ExthType::PublishedAt => 106,
            ExthType::Review => 107,
            ExthType::Contributor => 108,
            ExthType::Rights => 109,
            ExthType::SubjectCode => 110,
            ExthType::Type => 111,
            ExthType::Source => 112,
            ExthType::Asin => 113,
            ExthType::Version => 114,
            ExthType::Adult => 117,
            ExthType::CoverOffset => 201,
            ExthType::ThumbOffset => 202,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.code() == code)
    }

    pub const fn name(self) -> &'static str {
        match self {
            ExthType::Author => "author",
            ExthType::Publisher => "publisher",
            ExthType::Imprint => "imprint",
            ExthType::Description => "description",
            ExthType::Isbn => "isbn",
            ExthType::Subject => "subject",
            ExthType::PublishedAt => "published_at",
            ExthType::Review => "review",
            ExthType::Contributor => "contributor",
            ExthType::Rights => "rights",
            ExthType::SubjectCode => "subject_code",
            ExthType::Type => "type",
            ExthType::Source => "source",
            ExthType::Asin => "asin",
            ExthType::Version => "version",
            ExthType::Adult => "adult",
            ExthType::CoverOffset => "coveroffset",
            ExthType::ThumbOffset => "thumboffset",
        }
    }
}

/// One type-tagged EXTH record with its raw payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ExthRecord {
    pub kind: u32,
    pub data: Vec<u8>,
}

/// Decoded EXTH table, records kept in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExthTable {
    pub header_length: u32,
    pub records: Vec<ExthRecord>,
}

impl ExthTable {
    /// A table with no records, for books without EXTH.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Reads the whole table at an absolute offset.
    pub fn read(source: &dyn ByteSource, offset: u64) -> Result<Self> {
        expect_magic(source, offset, EXTH_MAGIC)?;
        let header_length = read_u32(source, offset + 4)?;
        let count = read_u32(source, offset + 8)?;
        debug!("EXTH table at {offset}: {count} records");

        let mut records = Vec::new();
        let mut pos = offset + TABLE_HEADER_LEN;
        for i in 0..count {
            let (kind, len) = read_record_header(source, pos, i)?;
            let data = source.read_at(pos + RECORD_HEADER_LEN, len)?;
            records.push(ExthRecord { kind, data });
            pos += RECORD_HEADER_LEN + len as u64;
        }

        Ok(Self {
            header_length,
            records,
        })
    }

    /// Payload of the first record of type `kind`.
    pub fn lookup(&self, kind: u32) -> Option<&[u8]> {
        self.lookup_all(kind).next()
    }

    /// Payloads of every record of type `kind`, in table order.
    pub fn lookup_all(&self, kind: u32) -> impl Iterator<Item = &[u8]> {
        self.records
            .iter()
            .filter(move |r| r.kind == kind)
            .map(|r| r.data.as_slice())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Scans the table at `offset` for the first record of type `kind`
/// without keeping the others.
pub fn find_record(source: &dyn ByteSource, offset: u64, kind: u32) -> Result<Option<Vec<u8>>> {
    expect_magic(source, offset, EXTH_MAGIC)?;
    let count = read_u32(source, offset + 8)?;

    let mut pos = offset + TABLE_HEADER_LEN;
    for i in 0..count {
        let (found, len) = read_record_header(source, pos, i)?;
        if found == kind {
            return source.read_at(pos + RECORD_HEADER_LEN, len).map(Some);
        }
        pos += RECORD_HEADER_LEN + len as u64;
    }
    Ok(None)
}

/// Returns the record type and payload length.
fn read_record_header(source: &dyn ByteSource, pos: u64, index: u32) -> Result<(u32, usize)> {
    let kind = read_u32(source, pos)?;
    let total = read_u32(source, pos + 4)?;
    let len = total.checked_sub(RECORD_HEADER_LEN as u32).ok_or_else(|| {
        Error::InvalidContainer(format!(
            "EXTH record {index} (type {kind}) declares length {total}, shorter than its header"
        ))
    })?;
    Ok((kind, len as usize))
}
