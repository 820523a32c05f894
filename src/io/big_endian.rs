//! Fixed-width big-endian field readers.
//!
//! Every multi-byte integer in a PDB/MOBI container is big-endian; there is
//! no little-endian variant of the format.

use bstr::ByteSlice;

use super::ByteSource;
use crate::error::{Error, Result};

/// Reads an unsigned 32-bit big-endian integer at an absolute offset.
pub fn read_u32(source: &dyn ByteSource, offset: u64) -> Result<u32> {
    let bytes = source.read_at(offset, 4)?;
    Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Reads an unsigned 16-bit big-endian integer at an absolute offset.
pub fn read_u16(source: &dyn ByteSource, offset: u64) -> Result<u16> {
    let bytes = source.read_at(offset, 2)?;
    Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
}

/// Checks that `magic` appears verbatim at `offset`.
pub fn expect_magic(source: &dyn ByteSource, offset: u64, magic: &[u8]) -> Result<()> {
    let found = source.read_at(offset, magic.len())?;
    if found != magic {
        return Err(Error::InvalidContainer(format!(
            "magic string `{}` not found at offset {offset} (found `{}`)",
            magic.as_bstr(),
            found.as_bstr(),
        )));
    }
    Ok(())
}
