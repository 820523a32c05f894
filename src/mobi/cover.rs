//! Cover and thumbnail image resolution.
//!
//! The image location is re-derived from raw offsets rather than from the
//! decoded [`MobiHeader`](super::MobiHeader), so a cover can be pulled out
//! of any `BOOKMOBI` source without building [`Metadata`](super::Metadata)
//! first.

use std::ops::Range;

use log::debug;

use super::exth::{EXTH_MAGIC, ExthType, find_record};
use super::headers::{
    EXTH_FLAG, EXTH_FLAGS_OFFSET, FIRST_IMAGE_INDEX_OFFSET, MOBI_HEADER_LENGTH_OFFSET,
    MOBI_HEADER_OFFSET, MOBI_MAGIC, NULL_INDEX,
};
use super::pdb::record_offset;
use crate::error::{Error, Result};
use crate::io::{ByteSource, expect_magic, read_u32};

/// Byte range of the cover image, or `None` if the book declares none.
///
/// A cover record holding `0xFFFFFFFF` (the format's "no index" marker) is
/// also `None` rather than an out-of-range record lookup.
pub fn cover_range(source: &dyn ByteSource) -> Result<Option<Range<u64>>> {
    image_range(source, ExthType::CoverOffset)
}

/// Byte range of the thumbnail image, or `None` if the book declares none.
///
/// `0xFFFFFFFF` is treated as no thumbnail, as in [`cover_range`].
pub fn thumbnail_range(source: &dyn ByteSource) -> Result<Option<Range<u64>>> {
    image_range(source, ExthType::ThumbOffset)
}

/// Cover image bytes.
pub fn extract_cover(source: &dyn ByteSource) -> Result<Option<Vec<u8>>> {
    read_range(source, cover_range(source)?)
}

/// Thumbnail image bytes.
pub fn extract_thumbnail(source: &dyn ByteSource) -> Result<Option<Vec<u8>>> {
    read_range(source, thumbnail_range(source)?)
}

fn read_range(source: &dyn ByteSource, range: Option<Range<u64>>) -> Result<Option<Vec<u8>>> {
    let Some(range) = range else {
        return Ok(None);
    };
    let len = usize::try_from(range.end - range.start).map_err(|_| Error::OutOfRange {
        offset: range.start,
        len: range.end - range.start,
        source_len: source.len(),
    })?;
    source.read_at(range.start, len).map(Some)
}

/// Resolves the image whose relative index is stored in EXTH record `kind`.
fn image_range(source: &dyn ByteSource, kind: ExthType) -> Result<Option<Range<u64>>> {
    let first_record_offset = record_offset(source, 0)?;
    let mobi_header_offset = first_record_offset + MOBI_HEADER_OFFSET;
    expect_magic(source, mobi_header_offset, MOBI_MAGIC)?;

    let mobi_header_length = read_u32(source, first_record_offset + MOBI_HEADER_LENGTH_OFFSET)?;
    let first_image_index = read_u32(source, first_record_offset + FIRST_IMAGE_INDEX_OFFSET)?;
    let exth_flags = read_u32(source, first_record_offset + EXTH_FLAGS_OFFSET)?;
    if exth_flags & EXTH_FLAG == 0 {
        debug!("no EXTH flag (flags {exth_flags:#x}), no {}", kind.name());
        return Ok(None);
    }

    let exth_offset = mobi_header_offset + u64::from(mobi_header_length);
    expect_magic(source, exth_offset, EXTH_MAGIC)?;

    let Some(payload) = find_record(source, exth_offset, kind.code())? else {
        debug!("EXTH at {exth_offset} has no {} record", kind.name());
        return Ok(None);
    };
    let relative = relative_index(&payload, kind)?;
    if relative == NULL_INDEX {
        return Ok(None);
    }

    // A relative index of 0 is the first image record itself.
    let index = u64::from(first_image_index) + u64::from(relative);
    let start = record_offset(source, index)?;
    let end = record_offset(source, index + 1)?;
    debug!("{} is PDB record {index} at {start}..{end}", kind.name());

    if end < start {
        return Err(Error::InvalidContainer(format!(
            "PDB record {} starts at {end}, before image record {index} at {start}",
            index + 1
        )));
    }
    Ok(Some(start..end))
}

fn relative_index(payload: &[u8], kind: ExthType) -> Result<u32> {
    match payload {
        [a, b, c, d, ..] => Ok(u32::from_be_bytes([*a, *b, *c, *d])),
        _ => Err(Error::InvalidContainer(format!(
            "EXTH {} record holds {} bytes, expected a 4-byte index",
            kind.name(),
            payload.len()
        ))),
    }
}

/// Detect image type from magic bytes.
pub fn detect_image_type(data: &[u8]) -> Option<&'static str> {
    if data.len() < 4 {
        return None;
    }

    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if data.starts_with(b"\x89PNG") {
        Some("image/png")
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if data.starts_with(b"BM") {
        Some("image/bmp")
    } else {
        None
    }
}

/// File extension for a media type returned by [`detect_image_type`].
pub fn extension_for(media_type: &str) -> &'static str {
    match media_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/bmp" => "bmp",
        _ => "bin",
    }
}
