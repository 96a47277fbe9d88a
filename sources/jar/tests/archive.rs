use std::io::Write;

use anyhow::Result;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use jar::{parse_archive, ArchiveError};

/// Smallest well-formed class: a pool holding `Utf8 "Hello"` and a `Class`
/// entry pointing at it, no superclass, no members.
fn hello_class() -> Vec<u8> {
    let mut out = Vec::new();
    out.extend(0xCAFE_BABE_u32.to_be_bytes());
    out.extend(0_u16.to_be_bytes());
    out.extend(61_u16.to_be_bytes());

    out.extend(3_u16.to_be_bytes()); // two entries + 1
    out.push(1); // Utf8
    out.extend(5_u16.to_be_bytes());
    out.extend(b"Hello");
    out.push(7); // Class
    out.extend(1_u16.to_be_bytes());

    out.extend(0x0021_u16.to_be_bytes()); // PUBLIC | SUPER
    out.extend(2_u16.to_be_bytes()); // this
    out.extend(0_u16.to_be_bytes()); // no super
    out.extend(0_u16.to_be_bytes()); // interfaces
    out.extend(0_u16.to_be_bytes()); // fields
    out.extend(0_u16.to_be_bytes()); // methods
    out.extend(0_u16.to_be_bytes()); // attributes
    out
}

struct Entry {
    name: String,
    compression: u16,
    payload: Vec<u8>,
    decompressed_size: u32,
}

#[derive(Default)]
struct ArchiveBuilder {
    entries: Vec<Entry>,
    comment: Vec<u8>,
}

impl ArchiveBuilder {
    fn new() -> Self {
        Self::default()
    }

    fn stored(mut self, name: &str, data: &[u8]) -> Self {
        self.entries.push(Entry {
            name: name.to_string(),
            compression: 0,
            payload: data.to_vec(),
            decompressed_size: data.len() as u32,
        });
        self
    }

    fn deflated(mut self, name: &str, data: &[u8]) -> Self {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();

        self.entries.push(Entry {
            name: name.to_string(),
            compression: 8,
            payload: encoder.finish().unwrap(),
            decompressed_size: data.len() as u32,
        });
        self
    }

    fn with_method(mut self, compression: u16) -> Self {
        self.entries.last_mut().unwrap().compression = compression;
        self
    }

    fn comment(mut self, comment: &[u8]) -> Self {
        self.comment = comment.to_vec();
        self
    }

    fn build(self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut offsets = Vec::new();

        for entry in &self.entries {
            offsets.push(out.len() as u32);

            out.extend(0x0403_4B50_u32.to_le_bytes());
            out.extend(20_u16.to_le_bytes()); // version
            out.extend(0_u16.to_le_bytes()); // flag
            out.extend(entry.compression.to_le_bytes());
            out.extend(0_u16.to_le_bytes()); // time
            out.extend(0_u16.to_le_bytes()); // date
            out.extend(0_u32.to_le_bytes()); // crc, unchecked
            out.extend((entry.payload.len() as u32).to_le_bytes());
            out.extend(entry.decompressed_size.to_le_bytes());
            out.extend((entry.name.len() as u16).to_le_bytes());
            out.extend(0_u16.to_le_bytes()); // extra
            out.extend(entry.name.as_bytes());
            out.extend(&entry.payload);
        }

        let directory_offset = out.len() as u32;
        for (entry, offset) in self.entries.iter().zip(&offsets) {
            out.extend(0x0201_4B50_u32.to_le_bytes());
            out.extend(20_u16.to_le_bytes()); // made by
            out.extend(20_u16.to_le_bytes()); // version
            out.extend(0_u16.to_le_bytes()); // flag
            out.extend(entry.compression.to_le_bytes());
            out.extend(0_u16.to_le_bytes()); // time
            out.extend(0_u16.to_le_bytes()); // date
            out.extend(0_u32.to_le_bytes()); // crc
            out.extend((entry.payload.len() as u32).to_le_bytes());
            out.extend(entry.decompressed_size.to_le_bytes());
            out.extend((entry.name.len() as u16).to_le_bytes());
            out.extend(0_u16.to_le_bytes()); // extra
            out.extend(0_u16.to_le_bytes()); // comment
            out.extend(0_u16.to_le_bytes()); // disk
            out.extend(0_u16.to_le_bytes()); // internal attrs
            out.extend(0_u32.to_le_bytes()); // external attrs
            out.extend(offset.to_le_bytes());
            out.extend(entry.name.as_bytes());
        }
        let directory_size = out.len() as u32 - directory_offset;

        out.extend(0x0605_4B50_u32.to_le_bytes());
        out.extend(0_u16.to_le_bytes()); // disks
        out.extend(0_u16.to_le_bytes()); // start disk
        out.extend((self.entries.len() as u16).to_le_bytes());
        out.extend((self.entries.len() as u16).to_le_bytes());
        out.extend(directory_size.to_le_bytes());
        out.extend(directory_offset.to_le_bytes());
        out.extend((self.comment.len() as u16).to_le_bytes());
        out.extend(&self.comment);

        out
    }
}

#[test]
fn an_empty_archive_yields_no_classes() -> Result<()> {
    let archive = ArchiveBuilder::new().build();
    assert_eq!(archive.len(), 22);

    let classes = parse_archive(&archive)?;
    assert!(classes.is_empty());
    Ok(())
}

#[test]
fn it_reads_stored_entries_verbatim() -> Result<()> {
    let archive = ArchiveBuilder::new()
        .stored("Hello.class", &hello_class())
        .build();

    let classes = parse_archive(&archive)?;
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].name()?, "Hello");
    assert_eq!(classes[0].super_name()?, "");
    Ok(())
}

#[test]
fn it_inflates_deflated_entries() -> Result<()> {
    let archive = ArchiveBuilder::new()
        .deflated("Hello.class", &hello_class())
        .build();

    let classes = parse_archive(&archive)?;
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].name()?, "Hello");
    Ok(())
}

#[test]
fn it_rejects_garbage_without_an_end_record() {
    let garbage = vec![0xFF; 1024];

    let err = parse_archive(&garbage).unwrap_err();
    assert!(matches!(
        err,
        ArchiveError::BadMagic { found: 0xFFFF_FFFF }
    ));
}

#[test]
fn it_rejects_undersized_files() {
    let err = parse_archive(&[0x50, 0x4B]).unwrap_err();
    assert!(matches!(err, ArchiveError::TooSmall { len: 2 }));
}

#[test]
fn it_finds_the_end_record_behind_a_comment() -> Result<()> {
    let archive = ArchiveBuilder::new()
        .stored("Hello.class", &hello_class())
        .comment(b"built by a test, not a build system")
        .build();

    let classes = parse_archive(&archive)?;
    assert_eq!(classes.len(), 1);
    Ok(())
}

#[test]
fn it_skips_entries_that_are_not_classes() -> Result<()> {
    let archive = ArchiveBuilder::new()
        .stored("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n")
        .stored("Hello.class", &hello_class())
        .build();

    let classes = parse_archive(&archive)?;
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].name()?, "Hello");
    Ok(())
}

#[test]
fn it_skips_unsupported_compression_methods() -> Result<()> {
    let archive = ArchiveBuilder::new()
        .stored("Weird.class", &hello_class())
        .with_method(97) // WavPack, of all things
        .stored("Hello.class", &hello_class())
        .build();

    let classes = parse_archive(&archive)?;
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].name()?, "Hello");
    Ok(())
}

#[test]
fn a_truncated_directory_keeps_earlier_classes() -> Result<()> {
    let mut archive = ArchiveBuilder::new()
        .stored("Hello.class", &hello_class())
        .stored("Later.class", &hello_class())
        .build();

    // Corrupt the second central record's magic. The walk must stop there
    // and still hand back the first class.
    let directory_offset = archive
        .windows(4)
        .position(|w| w == 0x0201_4B50_u32.to_le_bytes())
        .unwrap();
    let second_record = directory_offset + 46 + "Hello.class".len();
    archive[second_record] = 0x00;

    let classes = parse_archive(&archive)?;
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].name()?, "Hello");
    Ok(())
}

#[test]
fn it_skips_entries_that_fail_to_parse() -> Result<()> {
    let archive = ArchiveBuilder::new()
        .stored("Broken.class", &[0xDE, 0xAD, 0xBE, 0xEF, 0, 0])
        .stored("Hello.class", &hello_class())
        .build();

    let classes = parse_archive(&archive)?;
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].name()?, "Hello");
    Ok(())
}

#[test]
fn it_loads_bare_class_files_from_disk() -> Result<()> {
    let path = std::env::temp_dir().join("jar-loader-test-Hello.class");
    std::fs::write(&path, hello_class())?;

    let classes = jar::load(&path)?;
    std::fs::remove_file(&path).ok();

    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].name()?, "Hello");
    Ok(())
}
