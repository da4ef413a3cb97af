//! Bit-level I/O for variable-length codes.
//!
//! DEFLATE packs bits LSB-first: the first bit written lands in the least
//! significant bit of the first byte. Huffman codes are written with their
//! most significant code bit first, which is why encoders pre-reverse code
//! words before handing them to [`BitWriter::write_bits`].
//!
//! # Example
//!
//! ```
//! use gzkit_core::bitstream::{BitReader, BitWriter};
//! use std::io::Cursor;
//!
//! let mut output = Vec::new();
//! {
//!     let mut writer = BitWriter::new(&mut output);
//!     writer.write_bits(0b101, 3).unwrap();
//!     writer.write_bits(0b1100, 4).unwrap();
//!     writer.flush().unwrap();
//! }
//!
//! let mut reader = BitReader::new(Cursor::new(&output));
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(4).unwrap(), 0b1100);
//! ```

use crate::error::{GzKitError, Result};
use std::io::{Read, Write};

/// A bit-level reader over any [`Read`] implementation.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    reader: R,
    /// Pending bits, LSB-first.
    bit_buf: u64,
    /// Number of valid bits in `bit_buf`.
    bit_count: u8,
    /// Total bits consumed, for error reporting.
    position: u64,
}

impl<R: Read> BitReader<R> {
    /// Create a new `BitReader` wrapping the given reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            bit_buf: 0,
            bit_count: 0,
            position: 0,
        }
    }

    /// Consume this reader and return the underlying one.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Total number of bits consumed so far.
    pub fn bit_position(&self) -> u64 {
        self.position
    }

    /// Pull bytes from the underlying reader until at least `count` bits
    /// are buffered.
    fn refill(&mut self, count: u8) -> Result<()> {
        debug_assert!(count <= 56, "refill limited to 56 bits");
        while self.bit_count < count {
            let mut byte = [0u8; 1];
            let n = self.reader.read(&mut byte)?;
            if n == 0 {
                let missing = (count - self.bit_count).div_ceil(8) as usize;
                return Err(GzKitError::unexpected_eof(missing));
            }
            self.bit_buf |= (byte[0] as u64) << self.bit_count;
            self.bit_count += 8;
        }
        Ok(())
    }

    /// Read up to 32 bits, returned with the first bit read in the LSB.
    #[inline]
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        debug_assert!(count <= 32, "Cannot read more than 32 bits at once");
        if count == 0 {
            return Ok(0);
        }

        self.refill(count)?;

        let mask = (1u64 << count).wrapping_sub(1);
        let bits = (self.bit_buf & mask) as u32;
        self.bit_buf >>= count;
        self.bit_count -= count;
        self.position += count as u64;
        Ok(bits)
    }

    /// Read a single bit.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? != 0)
    }

    /// Discard partial bits so the next read starts on a byte boundary.
    pub fn align_to_byte(&mut self) {
        let partial = self.bit_count % 8;
        if partial > 0 {
            self.bit_buf >>= partial;
            self.bit_count -= partial;
            self.position += partial as u64;
        }
    }

    /// Read whole bytes. The reader must be byte-aligned.
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        debug_assert!(self.bit_count % 8 == 0, "read_bytes requires alignment");

        // Drain buffered bytes first.
        let mut filled = 0;
        while self.bit_count >= 8 && filled < buf.len() {
            buf[filled] = (self.bit_buf & 0xFF) as u8;
            self.bit_buf >>= 8;
            self.bit_count -= 8;
            self.position += 8;
            filled += 1;
        }

        if filled < buf.len() {
            self.reader
                .read_exact(&mut buf[filled..])
                .map_err(|e| match e.kind() {
                    std::io::ErrorKind::UnexpectedEof => {
                        GzKitError::unexpected_eof(buf.len() - filled)
                    }
                    _ => e.into(),
                })?;
            self.position += ((buf.len() - filled) * 8) as u64;
        }

        Ok(())
    }
}

/// A bit-level writer over any [`Write`] implementation.
///
/// Bits accumulate in an internal buffer; complete bytes are forwarded to
/// the underlying writer. Call [`flush`](BitWriter::flush) when done to pad
/// and emit the final partial byte.
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    writer: W,
    /// Pending bits, LSB-first.
    bit_buf: u64,
    /// Number of valid bits in `bit_buf`.
    bit_count: u8,
    /// Total bits written.
    written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Create a new `BitWriter` wrapping the given writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            bit_buf: 0,
            bit_count: 0,
            written: 0,
        }
    }

    /// Total number of bits written so far.
    pub fn bits_written(&self) -> u64 {
        self.written
    }

    /// Emit all complete bytes held in the buffer.
    #[inline]
    fn drain_bytes(&mut self) -> Result<()> {
        while self.bit_count >= 8 {
            let byte = (self.bit_buf & 0xFF) as u8;
            self.writer.write_all(&[byte])?;
            self.bit_buf >>= 8;
            self.bit_count -= 8;
        }
        Ok(())
    }

    /// Write up to 32 bits, LSB-first.
    #[inline]
    pub fn write_bits(&mut self, value: u32, count: u8) -> Result<()> {
        debug_assert!(count <= 32, "Cannot write more than 32 bits at once");
        if count == 0 {
            return Ok(());
        }

        let mask = if count == 32 {
            u32::MAX
        } else {
            (1u32 << count) - 1
        };
        self.bit_buf |= ((value & mask) as u64) << self.bit_count;
        self.bit_count += count;
        self.written += count as u64;
        self.drain_bytes()
    }

    /// Write a single bit.
    #[inline]
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.write_bits(bit as u32, 1)
    }

    /// Pad with zero bits to the next byte boundary.
    pub fn align_to_byte(&mut self) -> Result<()> {
        let partial = self.bit_count % 8;
        if partial > 0 {
            self.write_bits(0, 8 - partial)?;
        }
        Ok(())
    }

    /// Write whole bytes. The writer must be byte-aligned.
    pub fn write_bytes(&mut self, buf: &[u8]) -> Result<()> {
        debug_assert!(self.bit_count % 8 == 0, "write_bytes requires alignment");
        self.drain_bytes()?;
        self.writer.write_all(buf)?;
        self.written += (buf.len() * 8) as u64;
        Ok(())
    }

    /// Pad the final partial byte with zeros and flush the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.align_to_byte()?;
        self.drain_bytes()?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> Drop for BitWriter<W> {
    fn drop(&mut self) {
        // Best-effort flush on drop.
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_lsb_first() {
        // 0b10110101 = 0xB5
        let mut reader = BitReader::new(Cursor::new(vec![0xB5]));
        assert!(reader.read_bit().unwrap());
        assert!(!reader.read_bit().unwrap());
        assert!(reader.read_bit().unwrap());
        assert!(!reader.read_bit().unwrap());
        assert!(reader.read_bit().unwrap());
        assert!(reader.read_bit().unwrap());
        assert!(!reader.read_bit().unwrap());
        assert!(reader.read_bit().unwrap());
    }

    #[test]
    fn test_read_across_byte_boundary() {
        let mut reader = BitReader::new(Cursor::new(vec![0xFF, 0x00]));
        assert_eq!(reader.read_bits(4).unwrap(), 0xF);
        assert_eq!(reader.read_bits(8).unwrap(), 0x0F);
        assert_eq!(reader.read_bits(4).unwrap(), 0x0);
    }

    #[test]
    fn test_read_past_end_errors() {
        let mut reader = BitReader::new(Cursor::new(vec![0xAA]));
        assert_eq!(reader.read_bits(8).unwrap(), 0xAA);
        assert!(reader.read_bits(1).is_err());
    }

    #[test]
    fn test_write_bits() {
        let mut output = Vec::new();
        {
            let mut writer = BitWriter::new(&mut output);
            writer.write_bits(0b101, 3).unwrap();
            writer.write_bits(0b11001, 5).unwrap();
            writer.flush().unwrap();
        }
        // 11001_101 = 0xCD
        assert_eq!(output, vec![0xCD]);
    }

    #[test]
    fn test_write_read_roundtrip() {
        let mut output = Vec::new();
        {
            let mut writer = BitWriter::new(&mut output);
            writer.write_bits(0b101, 3).unwrap();
            writer.write_bits(0b1111, 4).unwrap();
            writer.write_bits(0b10, 2).unwrap();
            writer.write_bits(0b110011, 6).unwrap();
            writer.flush().unwrap();
        }

        let mut reader = BitReader::new(Cursor::new(&output));
        assert_eq!(reader.read_bits(3).unwrap(), 0b101);
        assert_eq!(reader.read_bits(4).unwrap(), 0b1111);
        assert_eq!(reader.read_bits(2).unwrap(), 0b10);
        assert_eq!(reader.read_bits(6).unwrap(), 0b110011);
    }

    #[test]
    fn test_align_to_byte() {
        let mut reader = BitReader::new(Cursor::new(vec![0xFF, 0xAA]));
        reader.read_bits(3).unwrap();
        reader.align_to_byte();
        assert_eq!(reader.bit_position(), 8);
        assert_eq!(reader.read_bits(8).unwrap(), 0xAA);
    }

    #[test]
    fn test_aligned_byte_io() {
        let mut output = Vec::new();
        {
            let mut writer = BitWriter::new(&mut output);
            writer.write_bits(0b1, 1).unwrap();
            writer.align_to_byte().unwrap();
            writer.write_bytes(&[0x12, 0x34]).unwrap();
            writer.flush().unwrap();
        }
        assert_eq!(output, vec![0x01, 0x12, 0x34]);

        let mut reader = BitReader::new(Cursor::new(&output));
        assert!(reader.read_bit().unwrap());
        reader.align_to_byte();
        let mut buf = [0u8; 2];
        reader.read_bytes(&mut buf).unwrap();
        assert_eq!(buf, [0x12, 0x34]);
    }
}
