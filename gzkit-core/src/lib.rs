//! # gzkit Core
//!
//! Core components for the gzkit codec.
//!
//! This crate provides the building blocks the DEFLATE engine and the gzip
//! container are assembled from:
//!
//! - [`bitstream`]: LSB-first bit-level I/O for variable-length codes
//! - [`crc`]: CRC-32 (ISO 3309) for the gzip trailer
//! - [`window`]: 32 KB sliding history for LZ77 back-references
//! - [`traits`]: streaming compressor/decompressor traits
//! - [`error`]: error types with the format/checksum/unsupported taxonomy
//!
//! ## Architecture
//!
//! gzkit is a small layered stack:
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │ L3: Container (gzkit-gzip)                     │
//! │     RFC 1952 header/trailer framing            │
//! ├────────────────────────────────────────────────┤
//! │ L2: Codec (gzkit-deflate)                      │
//! │     RFC 1951 LZ77 + Huffman                    │
//! ├────────────────────────────────────────────────┤
//! │ L1: Primitives (this crate)                    │
//! │     BitReader/BitWriter, OutputWindow, CRC-32  │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is a pure in-memory transform: no I/O beyond the caller's
//! reader/writer, no global state, no environment-dependent behavior.
//!
//! ## Example
//!
//! ```rust
//! use gzkit_core::bitstream::BitReader;
//! use gzkit_core::crc::Crc32;
//! use std::io::Cursor;
//!
//! let data = vec![0xAB, 0xCD];
//! let mut reader = BitReader::new(Cursor::new(data));
//! let bits = reader.read_bits(12).unwrap();
//! assert_eq!(bits, 0xDAB);
//!
//! assert_eq!(Crc32::compute(b"Hello, World!"), 0xEC4AC3D0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod crc;
pub mod error;
pub mod traits;
pub mod window;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter};
pub use crc::Crc32;
pub use error::{ErrorClass, GzKitError, Result};
pub use traits::{
    CompressStatus, CompressionLevel, Compressor, DecompressStatus, Decompressor, FlushMode,
};
pub use window::{DEFLATE_WINDOW_SIZE, OutputWindow};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::{BitReader, BitWriter};
    pub use crate::crc::Crc32;
    pub use crate::error::{ErrorClass, GzKitError, Result};
    pub use crate::traits::{CompressionLevel, Compressor, Decompressor, FlushMode};
    pub use crate::window::OutputWindow;
}
