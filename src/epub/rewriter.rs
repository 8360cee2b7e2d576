//! Whole-container rewriting.
//!
//! Entries are visited in central directory order. HTML-family entries are
//! decompressed, rewritten and recompressed with their original method; the
//! local header, data descriptor and central record around the new payload
//! are the original bytes with CRC, sizes and offset patched. Everything else
//! is copied as a raw byte span, so names, timestamps, attributes, versions,
//! extra fields, comments and the archive comment all survive untouched.

use std::io::{Cursor, Read, Write};

use flate2::Compression;
use flate2::write::DeflateEncoder;
use tracing::{debug, info, warn};
use zip::ZipArchive;

use super::records::{
    CentralRecord, DataDescriptor, DataInfo, Directory, LocalHeader, METHOD_DEFLATED,
    METHOD_STORED,
};
use crate::error::{Error, Result};
use crate::rewriter::RewriteReport;
use crate::transform::{DocumentRewriter, Outcome};

/// Extensions (compared case-insensitively) of entries that get rewritten.
pub const HTML_EXTENSIONS: &[&str] = &["xhtml", "html", "htm"];

/// Whether an entry name carries an HTML-family extension.
///
/// ```
/// use speedread::epub::is_html_entry;
///
/// assert!(is_html_entry("OEBPS/Text/chapter01.XHTML"));
/// assert!(!is_html_entry("OEBPS/Styles/style.css"));
/// assert!(!is_html_entry("html"));
/// ```
pub fn is_html_entry(name: &str) -> bool {
    let name = name.as_bytes();
    HTML_EXTENSIONS.iter().any(|ext| {
        let ext = ext.as_bytes();
        name.len() > ext.len()
            && name[name.len() - ext.len() - 1] == b'.'
            && name[name.len() - ext.len()..].eq_ignore_ascii_case(ext)
    })
}

/// What happened to a single entry.
enum Action {
    Rewritten(Vec<u8>, DataInfo),
    Unchanged,
    Skipped,
}

/// Rewrites every HTML-family entry of a zip container.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveRewriter<'r> {
    documents: DocumentRewriter<'r>,
    compression: Compression,
}

impl<'r> ArchiveRewriter<'r> {
    pub fn new(documents: DocumentRewriter<'r>) -> Self {
        Self {
            documents,
            compression: Compression::default(),
        }
    }

    /// Deflate level for rewritten entries that were deflated in the source.
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Rewrite a whole container held in memory.
    ///
    /// Either the complete new container is returned or an error is; there
    /// is no partial output. Bytes preceding the archive proper (a
    /// self-extractor stub) are not carried over.
    pub fn rewrite(&self, data: &[u8]) -> Result<(Vec<u8>, RewriteReport)> {
        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let directory = Directory::read(data)?;
        if archive.len() != directory.records.len() {
            return Err(Error::UnsupportedArchive(format!(
                "central directory lists {} entries but only {} have distinct names",
                directory.records.len(),
                archive.len()
            )));
        }

        let mut out = Vec::with_capacity(data.len());
        let mut central = Vec::with_capacity(directory.end.directory_size as usize);
        let mut report = RewriteReport {
            entries: directory.records.len(),
            ..RewriteReport::default()
        };

        for (index, record) in directory.records.iter().enumerate() {
            let start = directory.prefix_len + record.local_offset as usize;
            let local = LocalHeader::parse(data, start)?;
            let data_start = start + local.len();
            let data_end = data_start
                .checked_add(record.data.compressed_size as usize)
                .filter(|&end| end <= data.len())
                .ok_or_else(|| {
                    Error::InvalidArchive(format!(
                        "data of {:?} runs past end of file",
                        record.display_name()
                    ))
                })?;
            let descriptor = if local.has_data_descriptor() {
                Some(DataDescriptor::parse(data, data_end, &record.data)?)
            } else {
                None
            };
            let entry_end = data_end + descriptor.map_or(0, |d| d.len());

            let offset = to_u32(out.len(), record)?;
            match self.rewrite_entry(&mut archive, index, record)? {
                Action::Rewritten(payload, info) => {
                    out.extend_from_slice(&local.encode(info));
                    out.extend_from_slice(&payload);
                    if let Some(descriptor) = descriptor {
                        out.extend_from_slice(&descriptor.encode(info));
                    }
                    central.extend_from_slice(&record.encode(Some(info), offset));
                    report.rewritten += 1;
                }
                action => {
                    out.extend_from_slice(&data[start..entry_end]);
                    central.extend_from_slice(&record.encode(None, offset));
                    match action {
                        Action::Skipped => report.skipped += 1,
                        _ => report.unchanged += 1,
                    }
                }
            }
        }

        let directory_offset = u32::try_from(out.len())
            .map_err(|_| Error::EntryTooLarge("central directory offset exceeds 4 GiB".into()))?;
        let directory_size = u32::try_from(central.len())
            .map_err(|_| Error::EntryTooLarge("central directory exceeds 4 GiB".into()))?;
        out.extend_from_slice(&central);
        out.extend_from_slice(&directory.end.encode(
            directory.end.entries,
            directory_size,
            directory_offset,
        ));

        info!(
            mode = %self.documents.mode(),
            entries = report.entries,
            rewritten = report.rewritten,
            unchanged = report.unchanged,
            skipped = report.skipped,
            "archive rewritten"
        );
        Ok((out, report))
    }

    fn rewrite_entry(
        &self,
        archive: &mut ZipArchive<Cursor<&[u8]>>,
        index: usize,
        record: &CentralRecord<'_>,
    ) -> Result<Action> {
        let name = record.display_name();
        if !is_html_entry(&name) {
            return Ok(Action::Unchanged);
        }
        if record.is_encrypted() {
            warn!(entry = %name, "encrypted entry, copying through");
            return Ok(Action::Skipped);
        }
        if record.method != METHOD_STORED && record.method != METHOD_DEFLATED {
            warn!(entry = %name, method = record.method, "unsupported compression method, copying through");
            return Ok(Action::Skipped);
        }

        let source = match read_entry(archive, index, record) {
            Ok(source) => source,
            Err(err) => {
                warn!(entry = %name, %err, "unreadable entry, copying through");
                return Ok(Action::Skipped);
            }
        };

        match self.documents.rewrite_html(&source) {
            Outcome::Rewritten(bytes) => {
                let (payload, info) = self.pack(&bytes, record)?;
                debug!(
                    entry = %name,
                    before = source.len(),
                    after = bytes.len(),
                    "rewritten"
                );
                Ok(Action::Rewritten(payload, info))
            }
            Outcome::NoBody => {
                debug!(entry = %name, "no body, copying through");
                Ok(Action::Unchanged)
            }
            Outcome::AlreadyProcessed => {
                debug!(entry = %name, "already processed, copying through");
                Ok(Action::Unchanged)
            }
            Outcome::UnsupportedEncoding(encoding) => {
                warn!(entry = %name, encoding, "encoding cannot be written back, copying through");
                Ok(Action::Skipped)
            }
        }
    }

    /// Compress a new payload with the entry's original method.
    fn pack(&self, bytes: &[u8], record: &CentralRecord<'_>) -> Result<(Vec<u8>, DataInfo)> {
        let mut crc = flate2::Crc::new();
        crc.update(bytes);

        let payload = if record.method == METHOD_DEFLATED {
            let mut encoder = DeflateEncoder::new(Vec::new(), self.compression);
            encoder.write_all(bytes)?;
            encoder.finish()?
        } else {
            bytes.to_vec()
        };

        let info = DataInfo {
            crc32: crc.sum(),
            compressed_size: to_u32(payload.len(), record)?,
            uncompressed_size: to_u32(bytes.len(), record)?,
        };
        Ok((payload, info))
    }
}

/// Decompress an entry, checking that the zip crate's index lines up with
/// the raw central record.
fn read_entry(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    index: usize,
    record: &CentralRecord<'_>,
) -> Result<Vec<u8>> {
    let mut file = archive.by_index(index)?;
    if file.name_raw() != record.name {
        return Err(Error::InvalidArchive(format!(
            "entry {index} is {:?} in the central directory but {:?} in the index",
            record.display_name(),
            file.name()
        )));
    }
    let mut buf = Vec::with_capacity(record.data.uncompressed_size as usize);
    file.read_to_end(&mut buf)?;
    Ok(buf)
}

fn to_u32(len: usize, record: &CentralRecord<'_>) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        Error::EntryTooLarge(format!(
            "{:?} does not fit a 32-bit zip archive",
            record.display_name()
        ))
    })
}
