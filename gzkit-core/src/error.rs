//! Error types for gzkit operations.
//!
//! A single error enum covers both layers of the codec. Every variant falls
//! into one of four classes (see [`ErrorClass`]):
//!
//! - **Format**: the input is not a structurally valid gzip/deflate stream
//!   (bad magic, invalid block type, malformed Huffman table, dangling
//!   back-reference, truncation).
//! - **Checksum**: the stream is structurally valid but its trailer does not
//!   match the recomputed CRC-32 or length, i.e. the data is damaged.
//! - **Unsupported**: outside what this implementation handles (compression
//!   method other than 8, input too large for the encoder to index).
//! - **Io**: an error from the underlying reader or writer.
//!
//! The distinction matters to callers: format-class means "this is not a
//! gzip stream", checksum-class means "this is a damaged gzip stream".
//! All errors are recoverable result values; nothing here aborts.

use std::io;
use thiserror::Error;

/// Coarse classification of a [`GzKitError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Structurally invalid gzip/deflate input.
    Format,
    /// Trailer checksum or length does not match the decompressed data.
    Checksum,
    /// Valid stream using a feature this implementation does not support.
    Unsupported,
    /// Underlying I/O failure.
    Io,
}

/// The main error type for gzkit operations.
#[derive(Debug, Error)]
pub enum GzKitError {
    /// I/O error from underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid magic number in the stream header.
    #[error("Invalid magic number: expected {expected:02x?}, found {found:02x?}")]
    InvalidMagic {
        /// Expected magic bytes.
        expected: Vec<u8>,
        /// Actual magic bytes found.
        found: Vec<u8>,
    },

    /// Unsupported compression method in the gzip header.
    #[error("Unsupported compression method: {method} (only 8 = deflate)")]
    UnsupportedMethod {
        /// The CM byte from the header.
        method: u8,
    },

    /// Input larger than the encoder can index.
    #[error("Input of {size} bytes exceeds the supported maximum of {max} bytes")]
    InputTooLarge {
        /// Length of the rejected input.
        size: usize,
        /// Largest input length the encoder accepts.
        max: usize,
    },

    /// Invalid header field.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// Reserved deflate block type (BTYPE = 3).
    #[error("Invalid deflate block type: {btype}")]
    InvalidBlockType {
        /// The two-bit block type value.
        btype: u8,
    },

    /// Invalid Huffman code encountered during decompression.
    #[error("Invalid Huffman code at bit position {bit_position}")]
    InvalidHuffmanCode {
        /// Bit position where the invalid code was found.
        bit_position: u64,
    },

    /// Corrupted data in the compressed stream.
    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptedData {
        /// Byte offset where corruption was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// Back-reference pointing before the start of the output.
    #[error("Invalid back-reference distance: {distance} exceeds history size {history_size}")]
    InvalidDistance {
        /// The invalid distance value.
        distance: usize,
        /// Bytes of history available at that point.
        history_size: usize,
    },

    /// Unexpected end of the compressed stream.
    #[error("Unexpected end of stream: expected {expected} more bytes")]
    UnexpectedEof {
        /// Number of bytes that were expected but not available.
        expected: usize,
    },

    /// Trailer CRC-32 does not match the decompressed data.
    #[error("CRC mismatch: expected {expected:#010x}, computed {computed:#010x}")]
    CrcMismatch {
        /// CRC value stored in the trailer.
        expected: u32,
        /// CRC recomputed from the decompressed data.
        computed: u32,
    },

    /// Trailer ISIZE does not match the decompressed length modulo 2^32.
    #[error("Length mismatch: trailer says {expected}, decompressed {actual}")]
    LengthMismatch {
        /// ISIZE value stored in the trailer.
        expected: u32,
        /// Actual decompressed length modulo 2^32.
        actual: u32,
    },
}

/// Result type alias for gzkit operations.
pub type Result<T> = std::result::Result<T, GzKitError>;

impl GzKitError {
    /// Classify this error per the codec's error taxonomy.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Io(_) => ErrorClass::Io,
            Self::UnsupportedMethod { .. } | Self::InputTooLarge { .. } => ErrorClass::Unsupported,
            Self::CrcMismatch { .. } | Self::LengthMismatch { .. } => ErrorClass::Checksum,
            _ => ErrorClass::Format,
        }
    }

    /// Create an invalid magic error.
    pub fn invalid_magic(expected: impl Into<Vec<u8>>, found: impl Into<Vec<u8>>) -> Self {
        Self::InvalidMagic {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an unsupported method error.
    pub fn unsupported_method(method: u8) -> Self {
        Self::UnsupportedMethod { method }
    }

    /// Create an oversized input error.
    pub fn input_too_large(size: usize, max: usize) -> Self {
        Self::InputTooLarge { size, max }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create an invalid Huffman code error.
    pub fn invalid_huffman(bit_position: u64) -> Self {
        Self::InvalidHuffmanCode { bit_position }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }

    /// Create an invalid distance error.
    pub fn invalid_distance(distance: usize, history_size: usize) -> Self {
        Self::InvalidDistance {
            distance,
            history_size,
        }
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof(expected: usize) -> Self {
        Self::UnexpectedEof { expected }
    }

    /// Create a CRC mismatch error.
    pub fn crc_mismatch(expected: u32, computed: u32) -> Self {
        Self::CrcMismatch { expected, computed }
    }

    /// Create a trailer length mismatch error.
    pub fn length_mismatch(expected: u32, actual: u32) -> Self {
        Self::LengthMismatch { expected, actual }
    }
}
