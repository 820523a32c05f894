//! MOBI container decoding: PDB record table, PalmDOC/MOBI headers, EXTH
//! records and cover resolution.

mod cover;
mod exth;
mod headers;
mod metadata;
pub mod pdb;

pub use cover::{
    cover_range, detect_image_type, extension_for, extract_cover, extract_thumbnail,
    thumbnail_range,
};
pub use exth::{EXTH_MAGIC, ExthRecord, ExthTable, ExthType, find_record};
pub use headers::{Compression, Encoding, MobiHeader, NULL_INDEX, PalmDocHeader};
pub use metadata::Metadata;
