use std::fs;
use std::io::Read;
use std::path::Path;

use flate2::bufread::DeflateDecoder;
use parse::classfile::ClassFile;
use parse::parser::Parser;
use support::ByteReader;
use tracing::{debug, warn};

use crate::error::ArchiveError;
use crate::records::{
    method, CentralRecord, EndOfCentralDirectory, LocalHeader, END_MAGIC, END_RECORD_SIZE,
    END_SEARCH_WINDOW,
};

/// Load every class a `.jar` or `.class` file carries.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<ClassFile>, ArchiveError> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;

    if path.extension().is_some_and(|ext| ext == "class") {
        debug!("loading bare class {}", path.display());
        return Ok(vec![Parser::new(&bytes).parse()?]);
    }

    debug!("loading archive {}", path.display());
    parse_archive(&bytes)
}

/// Walk an in-memory archive and parse every `.class` member.
///
/// The walk is best effort. A malformed central or local record means the
/// archive is truncated from that point on, so iteration stops and whatever
/// parsed before it is returned. Individual entries that fail to inflate or
/// parse are skipped.
pub fn parse_archive(data: &[u8]) -> Result<Vec<ClassFile>, ArchiveError> {
    if data.len() < END_RECORD_SIZE {
        return Err(ArchiveError::TooSmall { len: data.len() });
    }

    let mut reader = ByteReader::from_slice(data);
    let end_pos = find_end_record(&mut reader)?;
    let end = EndOfCentralDirectory::parse_at(&mut reader, end_pos)?;

    let mut classes = Vec::new();
    let mut cursor = end.directory_offset as usize;

    for index in 0..end.total_records {
        let record = match CentralRecord::parse_at(&mut reader, cursor) {
            Ok(record) => record,
            Err(err) => {
                warn!("directory truncated at record {index}: {err}");
                break;
            }
        };
        cursor += record.size();

        let local = match LocalHeader::parse_at(&mut reader, record.local_offset as usize) {
            Ok(local) => local,
            Err(err) => {
                warn!("no local header behind record {index}: {err}");
                break;
            }
        };

        if record.compressed_size == 0 || record.decompressed_size == 0 {
            debug!("skipping empty entry {}", local.name);
            continue;
        }

        if !local.name.ends_with(".class") {
            debug!("skipping non-class entry {}", local.name);
            continue;
        }

        let payload_pos = record.local_offset as usize + local.size();
        let payload = match extract(&mut reader, &record, payload_pos) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("could not extract {}: {err}", local.name);
                continue;
            }
        };

        match Parser::new(&payload).parse() {
            Ok(class) => classes.push(class),
            Err(err) => warn!("could not parse {}: {err}", local.name),
        }
    }

    Ok(classes)
}

/// Find the end record by scanning backward over the trailing window.
/// Archives are allowed a comment of up to 65 535 bytes behind it, so the
/// record is rarely, but not always, flush with the end of the file.
fn find_end_record(reader: &mut ByteReader) -> Result<usize, ArchiveError> {
    let window_len = reader.len().min(END_SEARCH_WINDOW);
    let window_base = reader.len() - window_len;
    let window = reader.read_bytes_from_end(window_len)?;

    let magic = END_MAGIC.to_le_bytes();
    for offset in (0..=window_len - END_RECORD_SIZE).rev() {
        if window[offset..offset + 4] == magic {
            return Ok(window_base + offset);
        }
    }

    let tail: [u8; 4] = window[window_len - 4..].try_into().unwrap();
    Err(ArchiveError::BadMagic {
        found: u32::from_le_bytes(tail),
    })
}

fn extract(
    reader: &mut ByteReader,
    record: &CentralRecord,
    payload_pos: usize,
) -> Result<Vec<u8>, ArchiveError> {
    match record.compression {
        method::STORED => Ok(reader
            .read_bytes_at(payload_pos, record.decompressed_size as usize)?
            .to_vec()),
        method::DEFLATE => {
            let compressed = reader.read_bytes_at(payload_pos, record.compressed_size as usize)?;

            let mut inflated = Vec::with_capacity(record.decompressed_size as usize);
            DeflateDecoder::new(&compressed[..]).read_to_end(&mut inflated)?;

            if inflated.len() != record.decompressed_size as usize {
                return Err(ArchiveError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!(
                        "inflated to {} bytes, record declares {}",
                        inflated.len(),
                        record.decompressed_size
                    ),
                )));
            }

            Ok(inflated)
        }
        other => Err(ArchiveError::Io(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            format!("compression method {other}"),
        ))),
    }
}
