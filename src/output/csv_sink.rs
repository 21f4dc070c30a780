use crate::output::record::{Record, OUTPUT_FIELDS};
use crate::{ConfigError, HarvestError};
use encoding_rs::Encoding;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Append-only CSV file of harvested records
///
/// Rows are serialized as UTF-8 by the `csv` writer and transcoded to the
/// configured encoding before they reach the file. Every row is flushed
/// as soon as it is written.
pub struct OutputSink {
    file: File,
    encoding: &'static Encoding,
    rows_written: u64,
}

impl OutputSink {
    /// Opens `path` for appending, writing the header row first if the file is new
    ///
    /// # Arguments
    ///
    /// * `path` - The CSV file
    /// * `encoding_label` - Any WHATWG encoding label ("utf8", "cp1251", ...)
    pub fn open(path: &Path, encoding_label: &str) -> crate::Result<Self> {
        let encoding = resolve_encoding(encoding_label)?;

        if Self::ensure_header(path, encoding)? {
            tracing::info!("Created {} with header row", path.display());
        }

        let file = OpenOptions::new().append(true).open(path)?;

        Ok(Self {
            file,
            encoding,
            rows_written: 0,
        })
    }

    /// Creates `path` with the header row if it does not exist yet
    ///
    /// An existing file is left untouched, whatever it contains. A new
    /// UTF-16 file starts with a byte order mark.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The file was created
    /// * `Ok(false)` - The file already existed
    pub fn ensure_header(path: &Path, encoding: &'static Encoding) -> crate::Result<bool> {
        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        if let Some(bom) = utf16_bom(encoding) {
            file.write_all(bom)?;
        }
        file.write_all(&encode_row(OUTPUT_FIELDS, encoding)?)?;
        file.flush()?;
        Ok(true)
    }

    /// Appends one record as a row and flushes it to disk
    pub fn append_row(&mut self, record: &Record) -> crate::Result<()> {
        let bytes = encode_row(&record.to_row(), self.encoding)?;
        self.file.write_all(&bytes)?;
        self.file.flush()?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Rows appended through this sink
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }
}

/// Looks up an output encoding by label
///
/// Labels that `encoding_rs` cannot encode into (the `replacement`
/// encoding) are rejected rather than silently written as UTF-8.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding, ConfigError> {
    let encoding = Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| ConfigError::UnknownEncoding(label.to_string()))?;

    if utf16_bom(encoding).is_none() && encoding.output_encoding() != encoding {
        return Err(ConfigError::UnknownEncoding(label.to_string()));
    }

    Ok(encoding)
}

fn utf16_bom(encoding: &'static Encoding) -> Option<&'static [u8]> {
    if encoding == encoding_rs::UTF_16LE {
        Some(&[0xFF, 0xFE])
    } else if encoding == encoding_rs::UTF_16BE {
        Some(&[0xFE, 0xFF])
    } else {
        None
    }
}

/// Serializes one CSV row (with terminator) in the target encoding
///
/// Characters the encoding cannot represent are written as HTML numeric
/// character references.
fn encode_row(fields: &[&str], encoding: &'static Encoding) -> crate::Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(fields)?;
    let utf8 = writer.into_inner().map_err(|e| e.into_error())?;

    if encoding == encoding_rs::UTF_8 {
        return Ok(utf8);
    }

    let text = String::from_utf8(utf8)
        .map_err(|e| HarvestError::Io(std::io::Error::new(ErrorKind::InvalidData, e)))?;

    // encoding_rs only decodes UTF-16
    if encoding == encoding_rs::UTF_16LE {
        return Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect());
    }
    if encoding == encoding_rs::UTF_16BE {
        return Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect());
    }

    let (bytes, _, _) = encoding.encode(&text);
    Ok(bytes.into_owned())
}
