//! # mobi-meta
//!
//! Reads structural metadata from MOBI ebooks without rendering them: the
//! PalmDOC and MOBI headers, EXTH records, the title and the embedded cover.
//!
//! ## Quick Start
//!
//! ```no_run
//! use mobi_meta::Metadata;
//!
//! let meta = Metadata::open("book.mobi").unwrap();
//! println!("{}", meta.title_string().unwrap());
//! if let Some(author) = meta.author() {
//!     println!("by {}", String::from_utf8_lossy(author));
//! }
//! meta.save_cover("cover.jpg").unwrap();
//! ```
//!
//! ## Byte sources
//!
//! Decoding works over any [`ByteSource`]; [`FileSource`] reads a file with
//! positional reads and [`MemorySource`] wraps an owned buffer. Reads past the
//! end fail with [`Error::OutOfRange`] rather than being truncated.
//!
//! ```
//! use std::sync::Arc;
//! use mobi_meta::{Error, Metadata, MemorySource};
//!
//! let not_a_book = Arc::new(MemorySource::new(vec![0u8; 128]));
//! assert!(matches!(Metadata::decode(not_a_book), Err(Error::InvalidContainer(_))));
//! ```

pub mod error;
pub mod io;
pub mod mobi;

pub use error::{Error, Result};
pub use io::{ByteSource, FileSource, MemorySource};
pub use mobi::{ExthRecord, ExthTable, ExthType, Metadata, MobiHeader, PalmDocHeader};
