//! The three ZIP records the walk touches, read field by field in wire
//! order. Everything on this wire is little-endian.

use support::ByteReader;

use crate::error::ArchiveError;

pub const LOCAL_MAGIC: u32 = 0x0403_4B50;
pub const CENTRAL_MAGIC: u32 = 0x0201_4B50;
pub const END_MAGIC: u32 = 0x0605_4B50;

pub const LOCAL_HEADER_SIZE: usize = 30;
pub const CENTRAL_RECORD_SIZE: usize = 46;
pub const END_RECORD_SIZE: usize = 22;

/// End record plus the largest comment it can carry. The end record is
/// never further from the file end than this.
pub const END_SEARCH_WINDOW: usize = END_RECORD_SIZE + u16::MAX as usize;

pub mod method {
    pub const STORED: u16 = 0;
    pub const DEFLATE: u16 = 8;
}

fn expect_magic(reader: &mut ByteReader, expected: u32) -> Result<(), ArchiveError> {
    let found = reader.read_u32_le()?;
    if found != expected {
        return Err(ArchiveError::BadRecordMagic { expected, found });
    }
    Ok(())
}

#[derive(Debug)]
pub struct LocalHeader {
    pub version: u16,
    pub flag: u16,
    pub compression: u16,
    pub mod_time: u16,
    pub mod_date: u16,
    pub crc: u32,
    pub compressed_size: u32,
    pub decompressed_size: u32,
    pub name: String,
    pub extra_length: u16,
}

impl LocalHeader {
    pub fn parse_at(reader: &mut ByteReader, pos: usize) -> Result<Self, ArchiveError> {
        reader.seek(pos)?;
        expect_magic(reader, LOCAL_MAGIC)?;

        let version = reader.read_u16_le()?;
        let flag = reader.read_u16_le()?;
        let compression = reader.read_u16_le()?;
        let mod_time = reader.read_u16_le()?;
        let mod_date = reader.read_u16_le()?;
        let crc = reader.read_u32_le()?;
        let compressed_size = reader.read_u32_le()?;
        let decompressed_size = reader.read_u32_le()?;
        let name_length = reader.read_u16_le()?;
        let extra_length = reader.read_u16_le()?;

        let name = String::from_utf8_lossy(&reader.read_bytes(name_length.into())?).into_owned();

        Ok(Self {
            version,
            flag,
            compression,
            mod_time,
            mod_date,
            crc,
            compressed_size,
            decompressed_size,
            name,
            extra_length,
        })
    }

    /// Distance from the header's first byte to the entry payload.
    pub fn size(&self) -> usize {
        LOCAL_HEADER_SIZE + self.name.len() + self.extra_length as usize
    }
}

#[derive(Debug)]
pub struct CentralRecord {
    pub made_by: u16,
    pub version: u16,
    pub flag: u16,
    pub compression: u16,
    pub mod_time: u16,
    pub mod_date: u16,
    pub crc: u32,
    pub compressed_size: u32,
    pub decompressed_size: u32,
    pub name_length: u16,
    pub extra_length: u16,
    pub comment_length: u16,
    pub disk: u16,
    pub internal_attributes: u16,
    pub external_attributes: u32,
    pub local_offset: u32,
}

impl CentralRecord {
    pub fn parse_at(reader: &mut ByteReader, pos: usize) -> Result<Self, ArchiveError> {
        reader.seek(pos)?;
        expect_magic(reader, CENTRAL_MAGIC)?;

        Ok(Self {
            made_by: reader.read_u16_le()?,
            version: reader.read_u16_le()?,
            flag: reader.read_u16_le()?,
            compression: reader.read_u16_le()?,
            mod_time: reader.read_u16_le()?,
            mod_date: reader.read_u16_le()?,
            crc: reader.read_u32_le()?,
            compressed_size: reader.read_u32_le()?,
            decompressed_size: reader.read_u32_le()?,
            name_length: reader.read_u16_le()?,
            extra_length: reader.read_u16_le()?,
            comment_length: reader.read_u16_le()?,
            disk: reader.read_u16_le()?,
            internal_attributes: reader.read_u16_le()?,
            external_attributes: reader.read_u32_le()?,
            local_offset: reader.read_u32_le()?,
        })
    }

    /// Full on-disk footprint, variable suffix included.
    pub fn size(&self) -> usize {
        CENTRAL_RECORD_SIZE
            + self.name_length as usize
            + self.extra_length as usize
            + self.comment_length as usize
    }
}

#[derive(Debug)]
pub struct EndOfCentralDirectory {
    pub disk_count: u16,
    pub start_disk: u16,
    pub disk_records: u16,
    pub total_records: u16,
    pub directory_size: u32,
    pub directory_offset: u32,
    pub comment_length: u16,
}

impl EndOfCentralDirectory {
    pub fn parse_at(reader: &mut ByteReader, pos: usize) -> Result<Self, ArchiveError> {
        reader.seek(pos)?;
        expect_magic(reader, END_MAGIC)?;

        Ok(Self {
            disk_count: reader.read_u16_le()?,
            start_disk: reader.read_u16_le()?,
            disk_records: reader.read_u16_le()?,
            total_records: reader.read_u16_le()?,
            directory_size: reader.read_u32_le()?,
            directory_offset: reader.read_u32_le()?,
            comment_length: reader.read_u16_le()?,
        })
    }
}
