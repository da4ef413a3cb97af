//! DEFLATE decompression (RFC 1951).
//!
//! Supports all three block types:
//! - Type 0: Stored (uncompressed)
//! - Type 1: Fixed Huffman codes
//! - Type 2: Dynamic Huffman codes
//!
//! Malformed input is rejected with a format error rather than truncated
//! output: reserved block types, LEN/NLEN mismatches, over-subscribed code
//! lengths, out-of-range symbols and back-references past the start of the
//! output all fail decoding.

use crate::huffman::HuffmanTree;
use crate::tables::{
    decode_distance, decode_length, fixed_distance_lengths, fixed_litlen_lengths,
    CODE_LENGTH_ORDER, DISTANCE_EXTRA_BITS, LENGTH_EXTRA_BITS,
};
use gzkit_core::error::{GzKitError, Result};
use gzkit_core::traits::{DecompressStatus, Decompressor};
use gzkit_core::{BitReader, OutputWindow};
use std::io::Read;

/// DEFLATE decompressor.
#[derive(Debug)]
pub struct Inflater {
    /// Decoded output plus the 32 KiB match history.
    window: OutputWindow,
    /// Whether the final block has been decoded.
    final_block: bool,
    /// Whether decompression is complete.
    finished: bool,
    /// Input buffered across streaming calls.
    pending: Vec<u8>,
    /// Decoded bytes not yet handed to the caller.
    outbuf: Vec<u8>,
    /// Read cursor into `outbuf`.
    out_pos: usize,
    /// Whether the pending input decoded successfully.
    decoded: bool,
}

impl Inflater {
    /// Create a new DEFLATE decompressor.
    pub fn new() -> Self {
        Self {
            window: OutputWindow::deflate(),
            final_block: false,
            finished: false,
            pending: Vec::new(),
            outbuf: Vec::new(),
            out_pos: 0,
            decoded: false,
        }
    }

    /// Reset the decompressor.
    pub fn reset(&mut self) {
        self.window.clear();
        self.final_block = false;
        self.finished = false;
        self.pending.clear();
        self.outbuf.clear();
        self.out_pos = 0;
        self.decoded = false;
    }

    /// Decompress a complete stream from a reader.
    pub fn inflate_reader<R: Read>(&mut self, reader: &mut R) -> Result<Vec<u8>> {
        let mut bit_reader = BitReader::new(reader);
        self.inflate(&mut bit_reader)
    }

    /// Decompress a complete stream from a bit reader.
    pub fn inflate<R: Read>(&mut self, reader: &mut BitReader<R>) -> Result<Vec<u8>> {
        while !self.final_block {
            self.inflate_block(reader)?;
        }

        self.finished = true;
        Ok(self.window.output().to_vec())
    }

    /// Decompress a single block.
    fn inflate_block<R: Read>(&mut self, reader: &mut BitReader<R>) -> Result<()> {
        let bfinal = reader.read_bit()?;
        let btype = reader.read_bits(2)?;

        self.final_block = bfinal;

        match btype {
            0 => self.inflate_stored(reader),
            1 => self.inflate_fixed(reader),
            2 => self.inflate_dynamic(reader),
            _ => Err(GzKitError::InvalidBlockType { btype: btype as u8 }),
        }
    }

    /// Decompress a stored (uncompressed) block.
    fn inflate_stored<R: Read>(&mut self, reader: &mut BitReader<R>) -> Result<()> {
        reader.align_to_byte();

        let len = reader.read_bits(16)? as u16;
        let nlen = reader.read_bits(16)? as u16;

        if len != !nlen {
            return Err(GzKitError::corrupted(
                reader.bit_position() / 8,
                format!("LEN/NLEN mismatch: {} vs {}", len, !nlen),
            ));
        }

        let mut buf = vec![0u8; len as usize];
        reader.read_bytes(&mut buf)?;
        self.window.write_literals(&buf);

        Ok(())
    }

    /// Decompress a block with fixed Huffman codes.
    fn inflate_fixed<R: Read>(&mut self, reader: &mut BitReader<R>) -> Result<()> {
        let litlen_tree = HuffmanTree::from_code_lengths(&fixed_litlen_lengths())?;
        let dist_tree = HuffmanTree::from_code_lengths(&fixed_distance_lengths())?;

        self.inflate_huffman(reader, &litlen_tree, &dist_tree)
    }

    /// Decompress a block with dynamic Huffman codes.
    fn inflate_dynamic<R: Read>(&mut self, reader: &mut BitReader<R>) -> Result<()> {
        let hlit = reader.read_bits(5)? as usize + 257;
        let hdist = reader.read_bits(5)? as usize + 1;
        let hclen = reader.read_bits(4)? as usize + 4;

        if hlit > 286 {
            return Err(GzKitError::invalid_header(format!(
                "HLIT {} exceeds 286 literal/length codes",
                hlit
            )));
        }

        let mut code_length_lengths = [0u8; 19];
        for &sym in &CODE_LENGTH_ORDER[..hclen] {
            code_length_lengths[sym] = reader.read_bits(3)? as u8;
        }
        let code_length_tree = HuffmanTree::from_code_lengths(&code_length_lengths)?;

        let all_lengths = Self::read_code_lengths(reader, &code_length_tree, hlit + hdist)?;

        let litlen_tree = HuffmanTree::from_code_lengths(&all_lengths[..hlit])?;
        let dist_tree = HuffmanTree::from_code_lengths(&all_lengths[hlit..])?;

        self.inflate_huffman(reader, &litlen_tree, &dist_tree)
    }

    /// Read the RLE-compressed code lengths of a dynamic header.
    fn read_code_lengths<R: Read>(
        reader: &mut BitReader<R>,
        code_length_tree: &HuffmanTree,
        total: usize,
    ) -> Result<Vec<u8>> {
        let mut lengths = vec![0u8; total];
        let mut i = 0;

        while i < total {
            let code = code_length_tree.decode(reader)?;

            let (value, repeat) = match code {
                0..=15 => (code as u8, 1),
                16 => {
                    if i == 0 {
                        return Err(GzKitError::corrupted(
                            reader.bit_position() / 8,
                            "Repeat code 16 with no previous length",
                        ));
                    }
                    (lengths[i - 1], reader.read_bits(2)? as usize + 3)
                }
                17 => (0, reader.read_bits(3)? as usize + 3),
                18 => (0, reader.read_bits(7)? as usize + 11),
                _ => return Err(GzKitError::invalid_huffman(reader.bit_position())),
            };

            if i + repeat > total {
                return Err(GzKitError::corrupted(
                    reader.bit_position() / 8,
                    "Code length repeat overruns the table",
                ));
            }
            lengths[i..i + repeat].fill(value);
            i += repeat;
        }

        Ok(lengths)
    }

    /// Decode literal/length and distance codes until end of block.
    fn inflate_huffman<R: Read>(
        &mut self,
        reader: &mut BitReader<R>,
        litlen_tree: &HuffmanTree,
        dist_tree: &HuffmanTree,
    ) -> Result<()> {
        loop {
            let code = litlen_tree.decode(reader)?;

            if code < 256 {
                self.window.write_literal(code as u8);
            } else if code == 256 {
                break;
            } else if code <= 285 {
                let extra_bits = LENGTH_EXTRA_BITS[(code - 257) as usize];
                let extra = reader.read_bits(extra_bits)? as u16;
                let length = decode_length(code, extra);

                let dist_code = dist_tree.decode(reader)?;
                if dist_code >= 30 {
                    return Err(GzKitError::corrupted(
                        reader.bit_position() / 8,
                        format!("Invalid distance code: {}", dist_code),
                    ));
                }
                let dist_extra_bits = DISTANCE_EXTRA_BITS[dist_code as usize];
                let dist_extra = reader.read_bits(dist_extra_bits)? as u16;
                let distance = decode_distance(dist_code, dist_extra);

                self.window.copy_match(distance as usize, length as usize)?;
            } else {
                return Err(GzKitError::corrupted(
                    reader.bit_position() / 8,
                    format!("Invalid literal/length code: {}", code),
                ));
            }
        }

        Ok(())
    }

    /// Get the decompressed output.
    pub fn output(&self) -> &[u8] {
        self.window.output()
    }

    /// Take ownership of the decompressed output.
    pub fn into_output(self) -> Vec<u8> {
        self.window.into_output()
    }
}

impl Default for Inflater {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompressor for Inflater {
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(usize, usize, DecompressStatus)> {
        if self.finished && self.out_pos == self.outbuf.len() {
            return Ok((0, 0, DecompressStatus::Done));
        }

        self.pending.extend_from_slice(input);
        let consumed = input.len();

        if !self.decoded {
            let mut probe = Inflater::new();
            match probe.inflate_reader(&mut self.pending.as_slice()) {
                Ok(bytes) => {
                    self.outbuf = bytes;
                    self.decoded = true;
                }
                // The buffered prefix ended mid-stream; wait for more input.
                Err(GzKitError::UnexpectedEof { .. }) => {
                    return Ok((consumed, 0, DecompressStatus::NeedsInput));
                }
                Err(e) => return Err(e),
            }
        }

        let remaining = &self.outbuf[self.out_pos..];
        let to_copy = remaining.len().min(output.len());
        output[..to_copy].copy_from_slice(&remaining[..to_copy]);
        self.out_pos += to_copy;

        if self.out_pos == self.outbuf.len() {
            self.finished = true;
            Ok((consumed, to_copy, DecompressStatus::Done))
        } else {
            Ok((consumed, to_copy, DecompressStatus::NeedsOutput))
        }
    }

    fn reset(&mut self) {
        Inflater::reset(self);
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Decompress a complete DEFLATE stream.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut inflater = Inflater::new();
    inflater.inflate_reader(&mut &data[..])
}
