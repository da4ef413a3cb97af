//! gzip member header parsing and writing (RFC 1952 Section 2.3).
//!
//! The fixed 10-byte header is followed by optional fields selected by the
//! flag byte: an extra field, a null-terminated filename, a null-terminated
//! comment and a 16-bit header CRC. Reproducible output is the default:
//! `mtime` is 0 and the OS byte is 255 ("unknown") unless the caller sets
//! them explicitly.

use gzkit_core::error::{GzKitError, Result};
use gzkit_core::Crc32;
use std::io::{self, Read, Write};
use std::time::{SystemTime, UNIX_EPOCH};

/// gzip magic bytes.
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// gzip compression method: DEFLATE.
pub const CM_DEFLATE: u8 = 8;

/// OS byte for "unknown", the portable default.
pub const OS_UNKNOWN: u8 = 255;

/// gzip header flags.
pub mod flags {
    /// Text file hint.
    pub const FTEXT: u8 = 0x01;
    /// Header CRC present.
    pub const FHCRC: u8 = 0x02;
    /// Extra field present.
    pub const FEXTRA: u8 = 0x04;
    /// Original filename present.
    pub const FNAME: u8 = 0x08;
    /// Comment present.
    pub const FCOMMENT: u8 = 0x10;
    /// Reserved bits, must be zero.
    pub const RESERVED: u8 = 0xE0;
}

/// gzip member header.
///
/// On write, the FEXTRA/FNAME/FCOMMENT flag bits are derived from the
/// optional fields, so setting `filename` is enough to emit it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GzipHeader {
    /// Compression method (8 for DEFLATE).
    pub method: u8,
    /// FTEXT and FHCRC flag bits; field presence bits are derived.
    pub flags: u8,
    /// Modification time (Unix timestamp, 0 = none).
    pub mtime: u32,
    /// Extra flags (2 = best compression, 4 = fastest).
    pub xfl: u8,
    /// Operating system byte.
    pub os: u8,
    /// Extra field payload (without the XLEN prefix).
    pub extra: Option<Vec<u8>>,
    /// Original filename.
    pub filename: Option<String>,
    /// Comment.
    pub comment: Option<String>,
    /// Header CRC16 as read from the stream, if FHCRC was set.
    pub header_crc: Option<u16>,
}

impl Default for GzipHeader {
    fn default() -> Self {
        Self {
            method: CM_DEFLATE,
            flags: 0,
            mtime: 0,
            xfl: 0,
            os: OS_UNKNOWN,
            extra: None,
            filename: None,
            comment: None,
            header_crc: None,
        }
    }
}

impl GzipHeader {
    /// Create a header with the portable defaults (mtime 0, OS 255).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a header carrying the original filename.
    pub fn with_filename(filename: &str) -> Self {
        Self {
            filename: Some(filename.to_string()),
            ..Self::default()
        }
    }

    /// Set an explicit modification time.
    pub fn with_mtime(mut self, mtime: u32) -> Self {
        self.mtime = mtime;
        self
    }

    /// Set the modification time to now. Output is then no longer
    /// reproducible across invocations.
    pub fn with_mtime_now(mut self) -> Self {
        self.mtime = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);
        self
    }

    /// Request a header CRC16 on write.
    pub fn with_header_crc(mut self) -> Self {
        self.flags |= flags::FHCRC;
        self
    }

    /// The flag byte as it will appear on the wire.
    fn effective_flags(&self) -> u8 {
        let mut flags = self.flags & (flags::FTEXT | flags::FHCRC);
        if self.extra.is_some() {
            flags |= flags::FEXTRA;
        }
        if self.filename.is_some() {
            flags |= flags::FNAME;
        }
        if self.comment.is_some() {
            flags |= flags::FCOMMENT;
        }
        flags
    }

    /// Serialize the header, including the CRC16 when requested.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let flags = self.effective_flags();
        let mut buf = Vec::with_capacity(10);

        buf.extend_from_slice(&GZIP_MAGIC);
        buf.push(self.method);
        buf.push(flags);
        buf.extend_from_slice(&self.mtime.to_le_bytes());
        buf.push(self.xfl);
        buf.push(self.os);

        if let Some(ref extra) = self.extra {
            if extra.len() > u16::MAX as usize {
                return Err(GzKitError::invalid_header("Extra field exceeds 65535 bytes"));
            }
            buf.extend_from_slice(&(extra.len() as u16).to_le_bytes());
            buf.extend_from_slice(extra);
        }

        if let Some(ref filename) = self.filename {
            Self::push_null_terminated(&mut buf, filename, "filename")?;
        }
        if let Some(ref comment) = self.comment {
            Self::push_null_terminated(&mut buf, comment, "comment")?;
        }

        if flags & flags::FHCRC != 0 {
            let crc16 = (Crc32::compute(&buf) & 0xFFFF) as u16;
            buf.extend_from_slice(&crc16.to_le_bytes());
        }

        Ok(buf)
    }

    /// Write the header to a writer.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.to_bytes()?)?;
        Ok(())
    }

    /// Read and validate a gzip header.
    ///
    /// Rejects bad magic, non-DEFLATE methods and nonzero reserved flag
    /// bits; when FHCRC is present the stored CRC16 is verified against
    /// the bytes actually read.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut fixed = [0u8; 10];
        read_exact_or_eof(reader, &mut fixed)?;

        if fixed[0..2] != GZIP_MAGIC {
            return Err(GzKitError::invalid_magic(
                GZIP_MAGIC.to_vec(),
                fixed[0..2].to_vec(),
            ));
        }

        let method = fixed[2];
        if method != CM_DEFLATE {
            return Err(GzKitError::unsupported_method(method));
        }

        let flags = fixed[3];
        if flags & flags::RESERVED != 0 {
            return Err(GzKitError::invalid_header(format!(
                "Reserved flag bits set: {:#04x}",
                flags
            )));
        }

        let mtime = u32::from_le_bytes([fixed[4], fixed[5], fixed[6], fixed[7]]);
        let xfl = fixed[8];
        let os = fixed[9];

        // Everything read so far is covered by the header CRC.
        let mut raw = fixed.to_vec();

        let extra = if flags & flags::FEXTRA != 0 {
            let mut xlen_buf = [0u8; 2];
            read_exact_or_eof(reader, &mut xlen_buf)?;
            raw.extend_from_slice(&xlen_buf);

            let xlen = u16::from_le_bytes(xlen_buf) as usize;
            let mut extra = vec![0u8; xlen];
            read_exact_or_eof(reader, &mut extra)?;
            raw.extend_from_slice(&extra);
            Some(extra)
        } else {
            None
        };

        let filename = if flags & flags::FNAME != 0 {
            Some(Self::read_null_terminated(reader, &mut raw)?)
        } else {
            None
        };

        let comment = if flags & flags::FCOMMENT != 0 {
            Some(Self::read_null_terminated(reader, &mut raw)?)
        } else {
            None
        };

        let header_crc = if flags & flags::FHCRC != 0 {
            let mut crc_buf = [0u8; 2];
            read_exact_or_eof(reader, &mut crc_buf)?;
            let stored = u16::from_le_bytes(crc_buf);
            let computed = (Crc32::compute(&raw) & 0xFFFF) as u16;
            if stored != computed {
                return Err(GzKitError::crc_mismatch(stored as u32, computed as u32));
            }
            Some(stored)
        } else {
            None
        };

        Ok(Self {
            method,
            flags,
            mtime,
            xfl,
            os,
            extra,
            filename,
            comment,
            header_crc,
        })
    }

    fn push_null_terminated(buf: &mut Vec<u8>, value: &str, what: &str) -> Result<()> {
        if value.as_bytes().contains(&0) {
            return Err(GzKitError::invalid_header(format!(
                "gzip {} must not contain NUL bytes",
                what
            )));
        }
        buf.extend_from_slice(value.as_bytes());
        buf.push(0);
        Ok(())
    }

    /// Read a null-terminated string, appending the raw bytes to `raw`.
    fn read_null_terminated<R: Read>(reader: &mut R, raw: &mut Vec<u8>) -> Result<String> {
        let mut bytes = Vec::new();
        let mut buf = [0u8; 1];

        loop {
            read_exact_or_eof(reader, &mut buf)?;
            raw.push(buf[0]);
            if buf[0] == 0 {
                break;
            }
            bytes.push(buf[0]);
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// `read_exact` that reports truncation as a format error instead of I/O.
pub(crate) fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            GzKitError::unexpected_eof(buf.len())
        } else {
            e.into()
        }
    })
}
