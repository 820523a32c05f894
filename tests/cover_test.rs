mod common;

use common::{BookBuilder, GIF, JPEG, PNG, record_offset};
use mobi_meta::mobi::{self, NULL_INDEX, detect_image_type};
use mobi_meta::{Error, MemorySource, Metadata};
use proptest::prelude::*;
use tempfile::TempDir;

fn illustrated() -> BookBuilder {
    BookBuilder::new("Illustrated")
        .text_records(3)
        .image(PNG)
        .image(JPEG)
        .image(GIF)
}

#[test]
fn test_extract_cover() {
    let builder = illustrated().cover(1);
    let data = builder.build();
    let meta = Metadata::from_bytes(data.clone()).unwrap();

    let cover = meta.extract_cover().unwrap().expect("cover should be present");
    assert_eq!(cover, JPEG);
    assert_eq!(detect_image_type(&cover), Some("image/jpeg"));

    let index = builder.first_image_index() as usize + 1;
    let range = meta.cover_range().unwrap().unwrap();
    assert_eq!(range.start as usize, record_offset(&data, index));
    assert_eq!(range.end as usize, record_offset(&data, index + 1));
}

#[test]
fn test_cover_offset_zero_is_first_image() {
    let meta = Metadata::from_bytes(illustrated().cover(0).build()).unwrap();
    assert_eq!(meta.extract_cover().unwrap().as_deref(), Some(PNG));
}

#[test]
fn test_extract_thumbnail() {
    let meta = Metadata::from_bytes(illustrated().cover(1).thumbnail(2).build()).unwrap();
    assert_eq!(meta.extract_cover().unwrap().as_deref(), Some(JPEG));
    assert_eq!(meta.extract_thumbnail().unwrap().as_deref(), Some(GIF));
}

#[test]
fn test_no_cover_record() {
    let meta = Metadata::from_bytes(illustrated().exth_record(100, b"Author").build()).unwrap();
    assert_eq!(meta.extract_cover().unwrap(), None);
    assert_eq!(meta.cover_range().unwrap(), None);
    assert_eq!(meta.extract_thumbnail().unwrap(), None);
}

#[test]
fn test_exth_flag_clear_means_no_cover() {
    let mut builder = illustrated().cover(1);
    builder.exth_flag = false;
    let meta = Metadata::from_bytes(builder.build()).unwrap();
    assert_eq!(meta.extract_cover().unwrap(), None);
}

#[test]
fn test_book_without_exth() {
    let meta = Metadata::from_bytes(illustrated().without_exth().build()).unwrap();
    assert_eq!(meta.extract_cover().unwrap(), None);
}

#[test]
fn test_null_cover_index_is_absent() {
    let meta = Metadata::from_bytes(illustrated().cover(NULL_INDEX).build()).unwrap();
    assert_eq!(meta.extract_cover().unwrap(), None);
}

#[test]
fn test_missing_mobi_magic() {
    let mut data = illustrated().cover(1).build();
    let record0 = record_offset(&data, 0);
    data[record0 + 16..record0 + 20].copy_from_slice(b"XXXX");

    // Decoding does not look at the MOBI magic; the cover path does.
    let meta = Metadata::from_bytes(data).unwrap();
    assert!(matches!(
        meta.extract_cover(),
        Err(Error::InvalidContainer(_))
    ));
}

#[test]
fn test_missing_exth_magic_with_flag() {
    let mut builder = illustrated();
    builder.write_exth = false;
    let meta = Metadata::from_bytes(builder.build()).unwrap();

    assert!(meta.exth_table().is_empty());
    assert!(matches!(
        meta.extract_cover(),
        Err(Error::InvalidContainer(_))
    ));
}

#[test]
fn test_short_cover_payload() {
    let meta = Metadata::from_bytes(illustrated().exth_record(201, &[0, 1]).build()).unwrap();
    assert!(matches!(
        meta.extract_cover(),
        Err(Error::InvalidContainer(_))
    ));
}

#[test]
fn test_cover_index_past_record_table() {
    let meta = Metadata::from_bytes(illustrated().cover(100_000).build()).unwrap();
    assert!(matches!(
        meta.extract_cover(),
        Err(Error::OutOfRange { .. })
    ));
}

#[test]
fn test_cover_from_raw_source() {
    let source = MemorySource::new(illustrated().cover(2).build());
    assert_eq!(mobi::extract_cover(&source).unwrap().as_deref(), Some(GIF));
}

#[test]
fn test_save_cover() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("cover.jpg");

    let meta = Metadata::from_bytes(illustrated().cover(1).build()).unwrap();
    assert!(meta.save_cover(&path).unwrap());
    assert_eq!(std::fs::read(&path).unwrap(), JPEG);
}

#[test]
fn test_save_cover_without_cover_writes_nothing() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("cover.jpg");

    let meta = Metadata::from_bytes(illustrated().build()).unwrap();
    assert!(!meta.save_cover(&path).unwrap());
    assert!(!path.exists());
}

proptest! {
    #[test]
    fn prop_cover_is_gap_between_records(
        text_records in 0usize..4,
        images in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..64), 1..6),
        pick in any::<prop::sample::Index>(),
    ) {
        let relative = pick.index(images.len());
        let mut builder = BookBuilder::new("Gallery").text_records(text_records);
        for image in &images {
            builder = builder.image(image);
        }
        let builder = builder.cover(relative as u32);
        let data = builder.build();

        let index = builder.first_image_index() as usize + relative;
        let start = record_offset(&data, index);
        let end = record_offset(&data, index + 1);

        let cover = mobi::extract_cover(&MemorySource::new(data.clone())).unwrap().unwrap();
        prop_assert_eq!(cover.len(), end - start);
        prop_assert_eq!(&cover[..], &data[start..end]);
        prop_assert_eq!(&cover, &images[relative]);
    }
}
