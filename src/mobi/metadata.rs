//! Decoded metadata of one MOBI container.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use log::debug;

use super::cover;
use super::exth::{EXTH_MAGIC, ExthTable, ExthType};
use super::headers::{Encoding, MobiHeader, PalmDocHeader};
use super::pdb;
use crate::error::{Error, Result};
use crate::io::{ByteSource, FileSource, MemorySource};

/// Headers, EXTH table and title of a validated `BOOKMOBI` container.
///
/// Only [`Metadata::decode`] (and the constructors built on it) produce a
/// value, and only after the `BOOKMOBI` signature has been checked. Nothing
/// is mutated afterwards, so a `Metadata` can be shared across threads.
pub struct Metadata {
    source: Arc<dyn ByteSource>,
    record0: u64,
    palm_doc_header: PalmDocHeader,
    mobi_header: MobiHeader,
    exth: ExthTable,
    title: OnceLock<Vec<u8>>,
}

/// Generates one accessor per well-known EXTH type.
macro_rules! exth_accessors {
    ($($(#[$doc:meta])* $name:ident => $ty:ident,)*) => {
        $(
            $(#[$doc])*
            pub fn $name(&self) -> Option<&[u8]> {
                self.exth(ExthType::$ty)
            }
        )*
    };
}

impl Metadata {
    /// Decodes the headers of a MOBI container.
    ///
    /// Fails with [`Error::InvalidContainer`] unless bytes 60..68 read
    /// `BOOKMOBI`; that is the only structural check made here.
    pub fn decode(source: Arc<dyn ByteSource>) -> Result<Self> {
        if !pdb::is_bookmobi(source.as_ref())? {
            return Err(Error::InvalidContainer(
                "the supplied file is not in a valid mobi format".to_string(),
            ));
        }

        let record0 = pdb::record_offset(source.as_ref(), 0)?;
        debug!("record zero at {record0}");

        let palm_doc_header = PalmDocHeader::read(source.as_ref(), record0)?;
        let mobi_header = MobiHeader::read(source.as_ref(), record0)?;
        let exth = read_exth(source.as_ref(), record0, &mobi_header)?;

        Ok(Self {
            source,
            record0,
            palm_doc_header,
            mobi_header,
            exth,
            title: OnceLock::new(),
        })
    }

    /// Opens and decodes a MOBI file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let source = FileSource::open(path)?;
        Self::decode(Arc::new(source))
    }

    /// Decodes a MOBI container held in memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::decode(Arc::new(MemorySource::new(data)))
    }

    /// Raw title bytes from record zero.
    ///
    /// Read once from `full_name_offset`/`full_name_length` and cached.
    pub fn title(&self) -> Result<&[u8]> {
        if let Some(title) = self.title.get() {
            return Ok(title.as_slice());
        }
        let offset = self.record0 + u64::from(self.mobi_header.full_name_offset);
        let bytes = self
            .source
            .read_at(offset, self.mobi_header.full_name_length as usize)?;
        Ok(self.title.get_or_init(|| bytes).as_slice())
    }

    /// Title decoded with the book's text encoding.
    pub fn title_string(&self) -> Result<String> {
        let title = self.title()?;
        let encoding = match self.mobi_header.encoding {
            Encoding::Utf8 => encoding_rs::UTF_8,
            _ => encoding_rs::WINDOWS_1252,
        };
        let (text, _) = encoding.decode_without_bom_handling(title);
        Ok(text.into_owned())
    }

    /// Payload of the first EXTH record with numeric type `kind`.
    pub fn exth_lookup(&self, kind: u32) -> Option<&[u8]> {
        self.exth.lookup(kind)
    }

    pub fn exth(&self, kind: ExthType) -> Option<&[u8]> {
        self.exth.lookup(kind.code())
    }

    exth_accessors! {
        author => Author,
        publisher => Publisher,
        imprint => Imprint,
        description => Description,
        isbn => Isbn,
        subject => Subject,
        published_at => PublishedAt,
        review => Review,
        contributor => Contributor,
        rights => Rights,
        subject_code => SubjectCode,
        /// EXTH record 111 ("type").
        book_type => Type,
        source => Source,
        asin => Asin,
        version => Version,
        adult => Adult,
        /// Raw cover index payload; see [`Metadata::extract_cover`].
        cover_offset => CoverOffset,
        thumb_offset => ThumbOffset,
    }

    /// Cover image bytes, or `None` when the book has no cover record.
    pub fn extract_cover(&self) -> Result<Option<Vec<u8>>> {
        cover::extract_cover(self.source.as_ref())
    }

    pub fn extract_thumbnail(&self) -> Result<Option<Vec<u8>>> {
        cover::extract_thumbnail(self.source.as_ref())
    }

    pub fn cover_range(&self) -> Result<Option<std::ops::Range<u64>>> {
        cover::cover_range(self.source.as_ref())
    }

    /// Writes the cover image to `path`.
    ///
    /// Returns `false` without touching the filesystem when there is no cover.
    pub fn save_cover(&self, path: impl AsRef<Path>) -> Result<bool> {
        match self.extract_cover()? {
            Some(image) => {
                std::fs::write(path, image)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn palm_doc_header(&self) -> &PalmDocHeader {
        &self.palm_doc_header
    }

    pub fn mobi_header(&self) -> &MobiHeader {
        &self.mobi_header
    }

    pub fn exth_table(&self) -> &ExthTable {
        &self.exth
    }

    /// The underlying byte source.
    pub fn data(&self) -> &dyn ByteSource {
        self.source.as_ref()
    }

    /// Absolute offset of record zero.
    pub fn record_zero_offset(&self) -> u64 {
        self.record0
    }

    pub fn record_count(&self) -> Result<u16> {
        pdb::record_count(self.source.as_ref())
    }

    pub fn database_name(&self) -> Result<Vec<u8>> {
        pdb::database_name(self.source.as_ref())
    }
}

impl std::fmt::Debug for Metadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metadata")
            .field("record0", &self.record0)
            .field("palm_doc_header", &self.palm_doc_header)
            .field("mobi_header", &self.mobi_header)
            .field("exth", &self.exth)
            .finish_non_exhaustive()
    }
}

/// The EXTH table is only read when the header flags one; a flagged table
/// whose bytes are readable but lack the `EXTH` magic is treated as absent.
/// A table location past the end of the source is an error.
fn read_exth(source: &dyn ByteSource, record0: u64, header: &MobiHeader) -> Result<ExthTable> {
    if !header.has_exth() {
        return Ok(ExthTable::empty());
    }
    let offset = record0 + header.exth_offset();
    let magic = source.read_at(offset, EXTH_MAGIC.len())?;
    if magic != EXTH_MAGIC {
        debug!("EXTH flag set but no table at {offset}");
        return Ok(ExthTable::empty());
    }
    ExthTable::read(source, offset)
}
