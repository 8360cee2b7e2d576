//! Raw zip records.
//!
//! The rewriter copies local headers and central directory records byte for
//! byte and only patches CRC, sizes and offsets, so every other field (times,
//! attributes, versions, extra fields, comments) survives untouched.
//!
//! Only the classic 32-bit format is handled; zip64 and multi-disk archives
//! are refused.

use crate::error::{Error, Result};

pub const LOCAL_HEADER_SIG: u32 = 0x0403_4b50;
pub const CENTRAL_HEADER_SIG: u32 = 0x0201_4b50;
pub const END_OF_CENTRAL_DIR_SIG: u32 = 0x0605_4b50;
pub const ZIP64_LOCATOR_SIG: u32 = 0x0706_4b50;
pub const DATA_DESCRIPTOR_SIG: u32 = 0x0807_4b50;

const LOCAL_HEADER_LEN: usize = 30;
const CENTRAL_HEADER_LEN: usize = 46;
const END_RECORD_LEN: usize = 22;
const ZIP64_LOCATOR_LEN: usize = 20;

/// General purpose flag: entry is encrypted.
pub const FLAG_ENCRYPTED: u16 = 1;
/// General purpose flag: CRC and sizes follow the data in a descriptor.
pub const FLAG_DATA_DESCRIPTOR: u16 = 1 << 3;

pub const METHOD_STORED: u16 = 0;
pub const METHOD_DEFLATED: u16 = 8;

fn read_u16(b: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([b[at], b[at + 1]])
}

fn read_u32(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

fn write_u16(b: &mut [u8], at: usize, v: u16) {
    b[at..at + 2].copy_from_slice(&v.to_le_bytes());
}

fn write_u32(b: &mut [u8], at: usize, v: u32) {
    b[at..at + 4].copy_from_slice(&v.to_le_bytes());
}

fn invalid(msg: impl Into<String>) -> Error {
    Error::InvalidArchive(msg.into())
}

fn slice(data: &[u8], at: usize, len: usize) -> Result<&[u8]> {
    at.checked_add(len)
        .and_then(|end| data.get(at..end))
        .ok_or_else(|| invalid(format!("record at offset {at} runs past end of file")))
}

/// CRC and sizes of an entry's stored data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataInfo {
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
}

/// End of central directory record, including the archive comment.
#[derive(Debug)]
pub struct EndRecord<'a> {
    raw: &'a [u8],
    /// Offset of the record within the file.
    pub position: usize,
    pub entries: u16,
    pub directory_size: u32,
    pub directory_offset: u32,
}

impl<'a> EndRecord<'a> {
    /// Locate the last end record whose comment reaches exactly to the end
    /// of the file.
    pub fn find(data: &'a [u8]) -> Result<Self> {
        if data.len() < END_RECORD_LEN {
            return Err(invalid("file too short for a zip archive"));
        }
        let last = data.len() - END_RECORD_LEN;
        let first = last.saturating_sub(u16::MAX as usize);

        let position = (first..=last)
            .rev()
            .find(|&pos| {
                read_u32(data, pos) == END_OF_CENTRAL_DIR_SIG
                    && pos + END_RECORD_LEN + read_u16(data, pos + 20) as usize == data.len()
            })
            .ok_or_else(|| invalid("end of central directory not found"))?;

        let raw = &data[position..];
        let disk = read_u16(raw, 4);
        let directory_disk = read_u16(raw, 6);
        let disk_entries = read_u16(raw, 8);
        let entries = read_u16(raw, 10);
        let directory_size = read_u32(raw, 12);
        let directory_offset = read_u32(raw, 16);

        if disk != 0 || directory_disk != 0 || disk_entries != entries {
            return Err(Error::UnsupportedArchive(
                "multi-disk archives are not supported".into(),
            ));
        }
        let has_locator = position >= ZIP64_LOCATOR_LEN
            && read_u32(data, position - ZIP64_LOCATOR_LEN) == ZIP64_LOCATOR_SIG;
        if has_locator
            || entries == u16::MAX
            || directory_size == u32::MAX
            || directory_offset == u32::MAX
        {
            return Err(Error::UnsupportedArchive(
                "zip64 archives are not supported".into(),
            ));
        }

        Ok(Self {
            raw,
            position,
            entries,
            directory_size,
            directory_offset,
        })
    }

    /// Number of bytes before the archive proper (self-extractor stubs and
    /// the like). Offsets stored in the records are relative to this.
    pub fn prefix_len(&self) -> Result<usize> {
        let end = self.directory_offset as usize + self.directory_size as usize;
        self.position
            .checked_sub(end)
            .ok_or_else(|| invalid("central directory overlaps its end record"))
    }

    /// Re-encode with a new directory location, keeping the comment.
    pub fn encode(&self, entries: u16, directory_size: u32, directory_offset: u32) -> Vec<u8> {
        let mut out = self.raw.to_vec();
        write_u16(&mut out, 8, entries);
        write_u16(&mut out, 10, entries);
        write_u32(&mut out, 12, directory_size);
        write_u32(&mut out, 16, directory_offset);
        out
    }
}

/// Central directory file header.
#[derive(Debug)]
pub struct CentralRecord<'a> {
    raw: &'a [u8],
    pub flags: u16,
    pub method: u16,
    pub data: DataInfo,
    pub local_offset: u32,
    pub name: &'a [u8],
}

impl<'a> CentralRecord<'a> {
    pub fn parse(data: &'a [u8], at: usize) -> Result<Self> {
        let fixed = slice(data, at, CENTRAL_HEADER_LEN)?;
        if read_u32(fixed, 0) != CENTRAL_HEADER_SIG {
            return Err(invalid(format!("bad central header signature at offset {at}")));
        }
        let name_len = read_u16(fixed, 28) as usize;
        let extra_len = read_u16(fixed, 30) as usize;
        let comment_len = read_u16(fixed, 32) as usize;
        let raw = slice(data, at, CENTRAL_HEADER_LEN + name_len + extra_len + comment_len)?;

        let record = Self {
            raw,
            flags: read_u16(raw, 8),
            method: read_u16(raw, 10),
            data: DataInfo {
                crc32: read_u32(raw, 16),
                compressed_size: read_u32(raw, 20),
                uncompressed_size: read_u32(raw, 24),
            },
            local_offset: read_u32(raw, 42),
            name: &raw[CENTRAL_HEADER_LEN..CENTRAL_HEADER_LEN + name_len],
        };

        if record.data.compressed_size == u32::MAX
            || record.data.uncompressed_size == u32::MAX
            || record.local_offset == u32::MAX
            || read_u16(raw, 34) == u16::MAX
        {
            return Err(Error::UnsupportedArchive(format!(
                "zip64 entry {:?} is not supported",
                record.display_name()
            )));
        }
        Ok(record)
    }

    /// Length of the whole record including variable fields.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn display_name(&self) -> String {
        String::from_utf8_lossy(self.name).into_owned()
    }

    pub fn is_encrypted(&self) -> bool {
        self.flags & FLAG_ENCRYPTED != 0
    }

    /// Copy of the record pointing at `local_offset`, with new data fields
    /// when the payload changed.
    pub fn encode(&self, data: Option<DataInfo>, local_offset: u32) -> Vec<u8> {
        let mut out = self.raw.to_vec();
        if let Some(data) = data {
            write_u32(&mut out, 16, data.crc32);
            write_u32(&mut out, 20, data.compressed_size);
            write_u32(&mut out, 24, data.uncompressed_size);
        }
        write_u32(&mut out, 42, local_offset);
        out
    }
}

/// Local file header.
#[derive(Debug)]
pub struct LocalHeader<'a> {
    raw: &'a [u8],
    pub flags: u16,
}

impl<'a> LocalHeader<'a> {
    pub fn parse(data: &'a [u8], at: usize) -> Result<Self> {
        let fixed = slice(data, at, LOCAL_HEADER_LEN)?;
        if read_u32(fixed, 0) != LOCAL_HEADER_SIG {
            return Err(invalid(format!("bad local header signature at offset {at}")));
        }
        let name_len = read_u16(fixed, 26) as usize;
        let extra_len = read_u16(fixed, 28) as usize;
        let raw = slice(data, at, LOCAL_HEADER_LEN + name_len + extra_len)?;
        Ok(Self {
            raw,
            flags: read_u16(raw, 6),
        })
    }

    /// Header length; the entry's data starts right after it.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// CRC and sizes follow the data instead of living in this header.
    pub fn has_data_descriptor(&self) -> bool {
        self.flags & FLAG_DATA_DESCRIPTOR != 0
    }

    /// Copy of the header for a new payload.
    ///
    /// With a data descriptor the header's CRC and size fields are left as
    /// they were (conventionally zero) and the descriptor carries the values.
    pub fn encode(&self, data: DataInfo) -> Vec<u8> {
        let mut out = self.raw.to_vec();
        if !self.has_data_descriptor() {
            write_u32(&mut out, 14, data.crc32);
            write_u32(&mut out, 18, data.compressed_size);
            write_u32(&mut out, 22, data.uncompressed_size);
        }
        out
    }
}

/// Data descriptor following an entry's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataDescriptor {
    /// The optional signature was present.
    pub signed: bool,
}

impl DataDescriptor {
    /// Inspect the descriptor at `at`, expected to carry `data`.
    ///
    /// The signature is optional, so a leading word equal to it could also
    /// be a CRC; the CRC taken from the central directory settles which.
    pub fn parse(data: &[u8], at: usize, expected: &DataInfo) -> Result<Self> {
        let word = read_u32(slice(data, at, 12)?, 0);
        let signed = word == DATA_DESCRIPTOR_SIG
            && (expected.crc32 != DATA_DESCRIPTOR_SIG
                || data
                    .get(at + 4..at + 8)
                    .is_some_and(|b| read_u32(b, 0) == expected.crc32));
        slice(data, at, Self { signed }.len())?;
        Ok(Self { signed })
    }

    pub fn len(&self) -> usize {
        if self.signed { 16 } else { 12 }
    }

    pub fn encode(&self, data: DataInfo) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        if self.signed {
            out.extend_from_slice(&DATA_DESCRIPTOR_SIG.to_le_bytes());
        }
        out.extend_from_slice(&data.crc32.to_le_bytes());
        out.extend_from_slice(&data.compressed_size.to_le_bytes());
        out.extend_from_slice(&data.uncompressed_size.to_le_bytes());
        out
    }
}

/// Central directory of an archive, in stored order.
#[derive(Debug)]
pub struct Directory<'a> {
    pub end: EndRecord<'a>,
    /// Bytes preceding the first local header offset.
    pub prefix_len: usize,
    pub records: Vec<CentralRecord<'a>>,
}

impl<'a> Directory<'a> {
    pub fn read(data: &'a [u8]) -> Result<Self> {
        let end = EndRecord::find(data)?;
        let prefix_len = end.prefix_len()?;

        let mut records = Vec::with_capacity(end.entries as usize);
        let mut at = prefix_len + end.directory_offset as usize;
        for _ in 0..end.entries {
            let record = CentralRecord::parse(data, at)?;
            at += record.len();
            records.push(record);
        }

        Ok(Self {
            end,
            prefix_len,
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Local header + data + central record + end record for one stored entry.
    fn single_entry(name: &str, payload: &[u8], comment: &[u8]) -> Vec<u8> {
        let mut crc = flate2::Crc::new();
        crc.update(payload);
        let crc = crc.sum();
        let size = payload.len() as u32;

        let mut out = Vec::new();
        out.extend_from_slice(&LOCAL_HEADER_SIG.to_le_bytes());
        out.extend_from_slice(&[20, 0, 0, 0, 0, 0, 0, 0, 0x21, 0]);
        out.extend_from_slice(&crc.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(payload);

        let directory_offset = out.len() as u32;
        out.extend_from_slice(&CENTRAL_HEADER_SIG.to_le_bytes());
        out.extend_from_slice(&[20, 3, 20, 0, 0, 0, 0, 0, 0, 0, 0x21, 0]);
        out.extend_from_slice(&crc.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&[0; 12]);
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(name.as_bytes());
        let directory_size = out.len() as u32 - directory_offset;

        out.extend_from_slice(&END_OF_CENTRAL_DIR_SIG.to_le_bytes());
        out.extend_from_slice(&[0, 0, 0, 0, 1, 0, 1, 0]);
        out.extend_from_slice(&directory_size.to_le_bytes());
        out.extend_from_slice(&directory_offset.to_le_bytes());
        out.extend_from_slice(&(comment.len() as u16).to_le_bytes());
        out.extend_from_slice(comment);
        out
    }

    #[test]
    fn test_read_directory() {
        let data = single_entry("mimetype", b"application/epub+zip", b"");
        let dir = Directory::read(&data).unwrap();
        assert_eq!(dir.prefix_len, 0);
        assert_eq!(dir.records.len(), 1);

        let record = &dir.records[0];
        assert_eq!(record.name, b"mimetype");
        assert_eq!(record.method, METHOD_STORED);
        assert_eq!(record.data.uncompressed_size, 20);
        assert_eq!(record.local_offset, 0);

        let local = LocalHeader::parse(&data, 0).unwrap();
        assert_eq!(local.len(), 30 + 8);
        assert_eq!(&data[local.len()..local.len() + 20], b"application/epub+zip");
    }

    #[test]
    fn test_comment_containing_signature() {
        // A signature inside the comment whose own comment length does not
        // reach the end of the file is not an end record
        let mut comment = END_OF_CENTRAL_DIR_SIG.to_le_bytes().to_vec();
        comment.extend_from_slice(&[0; 16]);
        comment.extend_from_slice(&9u16.to_le_bytes());
        let data = single_entry("a.txt", b"abc", &comment);
        let end = EndRecord::find(&data).unwrap();
        assert_eq!(end.position, data.len() - 22 - comment.len());
        assert_eq!(end.entries, 1);
    }

    #[test]
    fn test_prefix_is_measured() {
        let mut data = b"#!stub\n".to_vec();
        data.extend(single_entry("a.txt", b"abc", b""));
        let dir = Directory::read(&data).unwrap();
        assert_eq!(dir.prefix_len, 7);
        assert!(LocalHeader::parse(&data, dir.prefix_len).is_ok());
    }

    #[test]
    fn test_end_record_encode_keeps_comment() {
        let data = single_entry("a.txt", b"abc", b"hello");
        let end = EndRecord::find(&data).unwrap();
        let encoded = end.encode(1, 0x10, 0x20);
        assert_eq!(encoded.len(), 22 + 5);
        assert!(encoded.ends_with(b"hello"));
        assert_eq!(read_u32(&encoded, 12), 0x10);
        assert_eq!(read_u32(&encoded, 16), 0x20);
    }

    #[test]
    fn test_central_encode_patches_only_data_and_offset() {
        let data = single_entry("a.txt", b"abc", b"");
        let dir = Directory::read(&data).unwrap();
        let record = &dir.records[0];
        let info = DataInfo {
            crc32: 1,
            compressed_size: 2,
            uncompressed_size: 3,
        };
        let encoded = record.encode(Some(info), 99);
        assert_eq!(encoded.len(), record.len());
        assert_eq!(read_u32(&encoded, 16), 1);
        assert_eq!(read_u32(&encoded, 20), 2);
        assert_eq!(read_u32(&encoded, 24), 3);
        assert_eq!(read_u32(&encoded, 42), 99);
        assert_eq!(&encoded[..16], &record.raw[..16]);
        assert_eq!(&encoded[28..42], &record.raw[28..42]);
        assert_eq!(&encoded[46..], &record.raw[46..]);
    }

    #[test]
    fn test_descriptor_signature_detection() {
        let info = DataInfo {
            crc32: 0xAABB_CCDD,
            compressed_size: 3,
            uncompressed_size: 3,
        };
        let signed = DataDescriptor { signed: true }.encode(info);
        assert_eq!(signed.len(), 16);
        assert_eq!(DataDescriptor::parse(&signed, 0, &info).unwrap().len(), 16);

        let unsigned = DataDescriptor { signed: false }.encode(info);
        assert_eq!(DataDescriptor::parse(&unsigned, 0, &info).unwrap().len(), 12);
    }

    #[test]
    fn test_rejects_garbage_and_zip64() {
        assert!(matches!(
            Directory::read(b"not a zip at all, not even close"),
            Err(Error::InvalidArchive(_))
        ));

        let mut data = single_entry("a.txt", b"abc", b"");
        let end = data.len() - 22;
        data[end + 10..end + 12].copy_from_slice(&u16::MAX.to_le_bytes());
        data[end + 8..end + 10].copy_from_slice(&u16::MAX.to_le_bytes());
        assert!(matches!(
            EndRecord::find(&data),
            Err(Error::UnsupportedArchive(_))
        ));
    }

    #[test]
    fn test_truncated_directory() {
        let data = single_entry("a.txt", b"abc", b"");
        let end = EndRecord::find(&data).unwrap();
        let mut bad = data.clone();
        let pos = end.position;
        // Point the directory past the end of the file
        bad[pos + 16..pos + 20].copy_from_slice(&(data.len() as u32).to_le_bytes());
        assert!(Directory::read(&bad).is_err());
    }
}
