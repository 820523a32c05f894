use log::debug;

use crate::error::Result;
use crate::io::{ByteSource, read_u32};

/// Sentinel for "no record" in MOBI index fields.
pub const NULL_INDEX: u32 = 0xFFFFFFFF;

/// Size of the PalmDOC header at the start of record zero.
pub const PALMDOC_HEADER_LEN: u64 = 16;

/// Record-zero offsets of the MOBI header fields the cover path reads raw.
pub const MOBI_MAGIC: &[u8; 4] = b"MOBI";
pub const MOBI_HEADER_OFFSET: u64 = 16;
pub const MOBI_HEADER_LENGTH_OFFSET: u64 = 20;
pub const FIRST_IMAGE_INDEX_OFFSET: u64 = 108;
pub const EXTH_FLAGS_OFFSET: u64 = 128;

/// Bit in `exth_flags` announcing an EXTH table.
pub const EXTH_FLAG: u32 = 0x40;

// Field offsets relative to the start of the MOBI header (record zero + 16).
const IDENTIFIER: usize = 0;
const HEADER_LENGTH: usize = 4;
const MOBI_TYPE: usize = 8;
const TEXT_ENCODING: usize = 12;
const UNIQUE_ID: usize = 16;
const FILE_VERSION: usize = 20;
const FIRST_NON_BOOK_INDEX: usize = 64;
const FULL_NAME_OFFSET: usize = 68;
const FULL_NAME_LENGTH: usize = 72;
const LOCALE: usize = 76;
const MIN_VERSION: usize = 88;
const FIRST_IMAGE_INDEX: usize = 92;
const EXTH_FLAGS: usize = 112;

/// PalmDOC header (first 16 bytes of record zero).
#[derive(Debug, Clone, PartialEq)]
pub struct PalmDocHeader {
    pub compression: Compression,
    pub text_length: u32,
    pub record_count: u16,
    pub record_size: u16,
    pub encryption: u16,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Compression {
    None,
    PalmDoc,
    Huffman,
    Unknown(u16),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Encoding {
    Cp1252,
    Utf8,
    Unknown(u32),
}

impl PalmDocHeader {
    pub fn parse(data: &[u8; 16]) -> Self {
        let compression = match u16::from_be_bytes([data[0], data[1]]) {
            1 => Compression::None,
            2 => Compression::PalmDoc,
            0x4448 => Compression::Huffman, // "DH"
            n => Compression::Unknown(n),
        };

        Self {
            compression,
            text_length: u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
            record_count: u16::from_be_bytes([data[8], data[9]]),
            record_size: u16::from_be_bytes([data[10], data[11]]),
            encryption: u16::from_be_bytes([data[12], data[13]]),
        }
    }

    /// Reads the header from the start of record zero.
    pub fn read(source: &dyn ByteSource, record0: u64) -> Result<Self> {
        let bytes = source.read_at(record0, PALMDOC_HEADER_LEN as usize)?;
        let mut data = [0u8; 16];
        data.copy_from_slice(&bytes);
        Ok(Self::parse(&data))
    }
}

/// MOBI header (record zero, from byte 16).
///
/// Only the leading fields are decoded. Later format revisions append fields
/// and grow `header_length`; anything past the recognised fields is skipped,
/// and fields beyond a short header keep their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct MobiHeader {
    pub identifier: [u8; 4],
    pub header_length: u32,
    pub mobi_type: u32,
    pub encoding: Encoding,
    pub unique_id: u32,
    pub file_version: u32,
    pub first_non_book_index: u32,
    /// Offset of the title within record zero.
    pub full_name_offset: u32,
    pub full_name_length: u32,
    pub locale: u32,
    pub min_version: u32,
    pub first_image_index: u32,
    pub exth_flags: u32,
}

impl MobiHeader {
    /// Parses the header from its own bytes (record zero from offset 16).
    pub fn parse(data: &[u8]) -> Self {
        let field = |pos: usize| -> Option<u32> {
            data.get(pos..pos + 4)
                .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        };

        let mut identifier = [0u8; 4];
        if let Some(ident) = data.get(IDENTIFIER..IDENTIFIER + 4) {
            identifier.copy_from_slice(ident);
        }

        let encoding = match field(TEXT_ENCODING).unwrap_or(1252) {
            1252 => Encoding::Cp1252,
            65001 => Encoding::Utf8,
            n => Encoding::Unknown(n),
        };

        Self {
            identifier,
            header_length: field(HEADER_LENGTH).unwrap_or(0),
            mobi_type: field(MOBI_TYPE).unwrap_or(0),
            encoding,
            unique_id: field(UNIQUE_ID).unwrap_or(0),
            file_version: field(FILE_VERSION).unwrap_or(1),
            first_non_book_index: field(FIRST_NON_BOOK_INDEX).unwrap_or(NULL_INDEX),
            full_name_offset: field(FULL_NAME_OFFSET).unwrap_or(0),
            full_name_length: field(FULL_NAME_LENGTH).unwrap_or(0),
            locale: field(LOCALE).unwrap_or(0),
            min_version: field(MIN_VERSION).unwrap_or(0),
            first_image_index: field(FIRST_IMAGE_INDEX).unwrap_or(NULL_INDEX),
            exth_flags: field(EXTH_FLAGS).unwrap_or(0),
        }
    }

    /// Reads the header using its self-declared length.
    ///
    /// The declared length counts from the `MOBI` identifier, so at least the
    /// identifier and length field are always read.
    pub fn read(source: &dyn ByteSource, record0: u64) -> Result<Self> {
        let start = record0 + MOBI_HEADER_OFFSET;
        let header_length = read_u32(source, record0 + MOBI_HEADER_LENGTH_OFFSET)?;
        let len = (header_length as usize).max(HEADER_LENGTH + 4);
        debug!("MOBI header at {start}, {header_length} bytes declared");

        let data = source.read_at(start, len)?;
        Ok(Self::parse(&data))
    }

    pub fn has_exth(&self) -> bool {
        self.exth_flags & EXTH_FLAG != 0
    }

    /// Record-zero offset of the EXTH table that follows this header.
    pub fn exth_offset(&self) -> u64 {
        MOBI_HEADER_OFFSET + u64::from(self.header_length)
    }
}
