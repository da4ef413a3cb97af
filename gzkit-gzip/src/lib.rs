//! # GzKit Gzip
//!
//! gzip container format support (RFC 1952) on top of the DEFLATE codec in
//! `gzkit-deflate`.
//!
//! A gzip member is a 10-byte header (plus optional fields), a raw DEFLATE
//! stream and an 8-byte trailer holding the CRC-32 and the length modulo
//! 2^32 of the uncompressed data. Both checks are verified on decompression.
//!
//! ## Reproducible output
//!
//! By default the header carries mtime 0 and OS byte 255, so compressing
//! the same bytes at the same level yields identical output on every
//! platform and every run. Timestamps and filenames are opt-in via
//! [`GzipHeader`].
//!
//! ## Example
//!
//! ```rust
//! use gzkit_gzip as gzip;
//!
//! let data = b"Hello, World!";
//! let compressed = gzip::compress(data, 6).unwrap();
//!
//! let mut reader = std::io::Cursor::new(compressed);
//! let decompressed = gzip::decompress(&mut reader).unwrap();
//! assert_eq!(decompressed, data);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod header;

pub use header::{flags, GzipHeader, CM_DEFLATE, GZIP_MAGIC, OS_UNKNOWN};

use gzkit_core::error::{GzKitError, Result};
use gzkit_core::{BitReader, Crc32};
use gzkit_deflate::{deflate, Inflater};
use std::io::{Read, Write};

/// Size of the CRC-32 + ISIZE trailer.
const TRAILER_SIZE: usize = 8;

/// gzip reader that parses the header eagerly and decompresses on demand.
pub struct GzipReader<R: Read> {
    /// Underlying reader, positioned after the header.
    reader: R,
    /// Parsed header.
    header: GzipHeader,
}

impl<R: Read> GzipReader<R> {
    /// Create a reader; parses and validates the member header.
    pub fn new(mut reader: R) -> Result<Self> {
        let header = GzipHeader::read(&mut reader)?;
        Ok(Self { reader, header })
    }

    /// Get the parsed header.
    pub fn header(&self) -> &GzipHeader {
        &self.header
    }

    /// Decompress the member and verify the trailer.
    ///
    /// A CRC-32 mismatch and an ISIZE mismatch are reported as distinct
    /// checksum errors; everything structural surfaces as a format error.
    /// The trailer must follow the DEFLATE stream immediately; a member
    /// with unconsumed bytes in between is rejected.
    pub fn decompress(&mut self) -> Result<Vec<u8>> {
        let mut compressed = Vec::new();
        self.reader.read_to_end(&mut compressed)?;

        if compressed.len() < TRAILER_SIZE {
            return Err(GzKitError::unexpected_eof(TRAILER_SIZE));
        }

        let (deflate_data, trailer) = compressed.split_at(compressed.len() - TRAILER_SIZE);
        let expected_crc = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
        let expected_size = u32::from_le_bytes([trailer[4], trailer[5], trailer[6], trailer[7]]);

        let mut bit_reader = BitReader::new(deflate_data);
        let decompressed = Inflater::new().inflate(&mut bit_reader)?;

        bit_reader.align_to_byte();
        let consumed = (bit_reader.bit_position() / 8) as usize;
        if consumed < deflate_data.len() {
            return Err(GzKitError::corrupted(
                consumed as u64,
                format!(
                    "{} unconsumed bytes between the DEFLATE stream and the trailer",
                    deflate_data.len() - consumed
                ),
            ));
        }

        let actual_crc = Crc32::compute(&decompressed);
        if actual_crc != expected_crc {
            return Err(GzKitError::crc_mismatch(expected_crc, actual_crc));
        }

        let actual_size = decompressed.len() as u32;
        if actual_size != expected_size {
            return Err(GzKitError::length_mismatch(expected_size, actual_size));
        }

        Ok(decompressed)
    }
}

/// gzip writer producing complete members.
pub struct GzipWriter {
    /// Header to emit.
    header: GzipHeader,
    /// Compression level (0-9).
    level: u8,
}

impl GzipWriter {
    /// Create a writer with the portable default header and level 6.
    pub fn new() -> Self {
        Self {
            header: GzipHeader::new(),
            level: 6,
        }
    }

    /// Create a writer with a specific header.
    pub fn with_header(header: GzipHeader) -> Self {
        Self { header, level: 6 }
    }

    /// Set the compression level (0-9) and the matching XFL hint.
    pub fn level(mut self, level: u8) -> Self {
        self.level = level.min(9);
        self.header.xfl = match self.level {
            0..=1 => 4, // Fastest
            9 => 2,     // Maximum compression
            _ => 0,
        };
        self
    }

    /// Compress data into a complete gzip member.
    pub fn compress<W: Write>(&self, data: &[u8], writer: &mut W) -> Result<()> {
        self.header.write(writer)?;

        let compressed = deflate(data, self.level)?;
        writer.write_all(&compressed)?;

        let crc = Crc32::compute(data);
        writer.write_all(&crc.to_le_bytes())?;
        // ISIZE is the input length modulo 2^32.
        writer.write_all(&(data.len() as u32).to_le_bytes())?;

        Ok(())
    }

    /// Compress data and return the member as a Vec.
    pub fn compress_to_vec(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.compress(data, &mut output)?;
        Ok(output)
    }
}

impl Default for GzipWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Compress data to gzip format with reproducible header defaults.
pub fn compress(data: &[u8], level: u8) -> Result<Vec<u8>> {
    GzipWriter::new().level(level).compress_to_vec(data)
}

/// Compress data to gzip format, recording the original filename.
pub fn compress_with_filename(data: &[u8], filename: &str, level: u8) -> Result<Vec<u8>> {
    let header = GzipHeader::with_filename(filename);
    GzipWriter::with_header(header)
        .level(level)
        .compress_to_vec(data)
}

/// Decompress a gzip member, verifying CRC-32 and ISIZE.
pub fn decompress<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut gzip_reader = GzipReader::new(reader)?;
    gzip_reader.decompress()
}
