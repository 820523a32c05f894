//! Random-access byte reading and big-endian field decoding.

mod big_endian;
mod byte_source;

pub use big_endian::{expect_magic, read_u16, read_u32};
pub use byte_source::{ByteSource, FileSource, MemorySource};
