//! DEFLATE compression (RFC 1951).
//!
//! The encoder tokenizes the whole input with LZ77, then emits it as a
//! single block whose type is chosen by exact bit cost:
//!
//! 1. compute the exact size of a fixed-Huffman block and of a dynamic
//!    block (including its full header),
//! 2. a dynamic block is used only when strictly smaller than fixed,
//! 3. stored blocks win only when strictly smaller than both.
//!
//! Level 0 always stores, and empty input becomes a single final stored
//! block with LEN=0. Because every choice is an exact comparison with a
//! strict tie-break, the output bytes are a pure function of (input, level).

use crate::huffman::{canonical_codes, HuffmanBuilder};
use crate::lz77::{Lz77Encoder, Lz77Token};
use crate::tables::{
    distance_to_code, fixed_distance_lengths, fixed_litlen_lengths, length_to_code,
    CODE_LENGTH_ORDER,
};
use gzkit_core::error::{GzKitError, Result};
use gzkit_core::traits::{CompressStatus, Compressor, FlushMode};
use gzkit_core::BitWriter;
use std::io::Write;

/// Largest payload of a single stored block.
const MAX_STORED_BLOCK: usize = 65535;

/// Largest input the encoder accepts in one stream.
///
/// The LZ77 match finder indexes positions as `i32`; larger inputs are
/// rejected with an unsupported-class error rather than compressed with a
/// silently degraded match search.
pub const MAX_INPUT_SIZE: usize = i32::MAX as usize;

fn check_input_size(len: usize) -> Result<()> {
    if len > MAX_INPUT_SIZE {
        return Err(GzKitError::input_too_large(len, MAX_INPUT_SIZE));
    }
    Ok(())
}

/// DEFLATE compressor.
#[derive(Debug)]
pub struct Deflater {
    /// LZ77 tokenizer.
    lz77: Lz77Encoder,
    /// Compression level (0-9).
    level: u8,
    /// Input buffered until the stream is finished.
    pending: Vec<u8>,
    /// Encoded stream not yet handed to the caller.
    outbuf: Vec<u8>,
    /// Read cursor into `outbuf`.
    out_pos: usize,
    /// Whether the pending input has been encoded.
    encoded: bool,
    /// Whether compression is finished.
    finished: bool,
}

impl Deflater {
    /// Create a new DEFLATE compressor with the specified level (0-9).
    pub fn new(level: u8) -> Self {
        Self {
            lz77: Lz77Encoder::with_level(level),
            level: level.min(9),
            pending: Vec::new(),
            outbuf: Vec::new(),
            out_pos: 0,
            encoded: false,
            finished: false,
        }
    }

    /// Reset the compressor.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.outbuf.clear();
        self.out_pos = 0;
        self.encoded = false;
        self.finished = false;
    }

    /// Compress `data` as one complete DEFLATE stream.
    ///
    /// Inputs longer than [`MAX_INPUT_SIZE`] are rejected.
    pub fn deflate<W: Write>(&mut self, data: &[u8], writer: &mut W) -> Result<()> {
        let mut bit_writer = BitWriter::new(writer);
        self.encode_stream(data, &mut bit_writer)?;
        bit_writer.flush()?;
        self.finished = true;
        Ok(())
    }

    /// Compress data to a Vec.
    pub fn compress_to_vec(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.deflate(data, &mut output)?;
        Ok(output)
    }

    fn encode_stream<W: Write>(&self, data: &[u8], writer: &mut BitWriter<W>) -> Result<()> {
        check_input_size(data.len())?;

        if self.level == 0 || data.is_empty() {
            return Self::write_stored_blocks(data, writer);
        }

        let tokens = self.lz77.tokenize(data);
        let fixed_bits = Self::fixed_cost(&tokens);
        let plan = DynamicPlan::build(&tokens);
        let compressed_bits = fixed_bits.min(plan.total_bits());

        if Self::stored_cost(data.len()) < compressed_bits {
            Self::write_stored_blocks(data, writer)
        } else if plan.total_bits() < fixed_bits {
            Self::write_dynamic_block(writer, &tokens, &plan)
        } else {
            Self::write_fixed_block(writer, &tokens)
        }
    }

    /// Exact size in bits of the stored encoding, assuming the stream starts
    /// byte-aligned (each stored header consumes 3 bits plus 5 padding).
    fn stored_cost(len: usize) -> usize {
        let blocks = len.div_ceil(MAX_STORED_BLOCK).max(1);
        blocks * 40 + len * 8
    }

    /// Exact size in bits of a single fixed-Huffman block.
    fn fixed_cost(tokens: &[Lz77Token]) -> usize {
        let litlen_lengths = fixed_litlen_lengths();
        let mut bits = 3;

        for token in tokens {
            match token {
                Lz77Token::Literal(byte) => {
                    bits += litlen_lengths[*byte as usize] as usize;
                }
                Lz77Token::Match { length, distance } => {
                    let (len_code, len_extra_bits, _) = length_to_code(*length);
                    bits += litlen_lengths[len_code as usize] as usize + len_extra_bits as usize;

                    let (_, dist_extra_bits, _) = distance_to_code(*distance);
                    bits += 5 + dist_extra_bits as usize;
                }
            }
        }
        bits + litlen_lengths[256] as usize
    }

    /// Write the input as stored blocks; empty input becomes one final
    /// LEN=0 block.
    fn write_stored_blocks<W: Write>(data: &[u8], writer: &mut BitWriter<W>) -> Result<()> {
        let mut chunks = data.chunks(MAX_STORED_BLOCK).peekable();
        if chunks.peek().is_none() {
            return Self::write_stored_chunk(&[], true, writer);
        }

        while let Some(chunk) = chunks.next() {
            Self::write_stored_chunk(chunk, chunks.peek().is_none(), writer)?;
        }
        Ok(())
    }

    fn write_stored_chunk<W: Write>(
        chunk: &[u8],
        is_final: bool,
        writer: &mut BitWriter<W>,
    ) -> Result<()> {
        writer.write_bit(is_final)?;
        writer.write_bits(0b00, 2)?; // BTYPE=00 (stored)
        writer.align_to_byte()?;

        let len = chunk.len() as u16;
        writer.write_bits(len as u32, 16)?;
        writer.write_bits(!len as u32, 16)?;
        writer.write_bytes(chunk)?;
        Ok(())
    }

    /// Write a final block using fixed Huffman codes.
    fn write_fixed_block<W: Write>(writer: &mut BitWriter<W>, tokens: &[Lz77Token]) -> Result<()> {
        writer.write_bit(true)?;
        writer.write_bits(0b01, 2)?; // BTYPE=01 (fixed Huffman)

        let litlen_codes = canonical_codes(&fixed_litlen_lengths());
        let dist_codes = canonical_codes(&fixed_distance_lengths());
        Self::write_tokens(writer, tokens, &litlen_codes, &dist_codes)
    }

    /// Write a final block using dynamic Huffman codes.
    fn write_dynamic_block<W: Write>(
        writer: &mut BitWriter<W>,
        tokens: &[Lz77Token],
        plan: &DynamicPlan,
    ) -> Result<()> {
        writer.write_bit(true)?;
        writer.write_bits(0b10, 2)?; // BTYPE=10 (dynamic Huffman)

        writer.write_bits(plan.hlit as u32 - 257, 5)?;
        writer.write_bits(plan.hdist as u32 - 1, 5)?;
        writer.write_bits(plan.hclen as u32 - 4, 4)?;

        for &sym in &CODE_LENGTH_ORDER[..plan.hclen] {
            writer.write_bits(plan.codelen_lengths[sym] as u32, 3)?;
        }

        let codelen_codes = canonical_codes(&plan.codelen_lengths);
        for &(sym, extra, extra_bits) in &plan.rle {
            let (code, len) = codelen_codes[sym as usize];
            writer.write_bits(code, len)?;
            if extra_bits > 0 {
                writer.write_bits(extra as u32, extra_bits)?;
            }
        }

        let litlen_codes = canonical_codes(&plan.litlen_lengths);
        let dist_codes = canonical_codes(&plan.dist_lengths);
        Self::write_tokens(writer, tokens, &litlen_codes, &dist_codes)
    }

    /// Emit the token stream followed by the end-of-block code.
    fn write_tokens<W: Write>(
        writer: &mut BitWriter<W>,
        tokens: &[Lz77Token],
        litlen_codes: &[(u32, u8)],
        dist_codes: &[(u32, u8)],
    ) -> Result<()> {
        for token in tokens {
            match token {
                Lz77Token::Literal(byte) => {
                    let (code, len) = litlen_codes[*byte as usize];
                    writer.write_bits(code, len)?;
                }
                Lz77Token::Match { length, distance } => {
                    let (len_code, len_extra_bits, len_extra) = length_to_code(*length);
                    let (code, len) = litlen_codes[len_code as usize];
                    writer.write_bits(code, len)?;
                    if len_extra_bits > 0 {
                        writer.write_bits(len_extra as u32, len_extra_bits)?;
                    }

                    let (dist_code, dist_extra_bits, dist_extra) = distance_to_code(*distance);
                    let (dcode, dlen) = dist_codes[dist_code as usize];
                    writer.write_bits(dcode, dlen)?;
                    if dist_extra_bits > 0 {
                        writer.write_bits(dist_extra as u32, dist_extra_bits)?;
                    }
                }
            }
        }

        let (code, len) = litlen_codes[256];
        writer.write_bits(code, len)
    }
}

impl Default for Deflater {
    fn default() -> Self {
        Self::new(6)
    }
}

impl Compressor for Deflater {
    fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, CompressStatus)> {
        if self.finished {
            return Ok((0, 0, CompressStatus::Done));
        }

        self.pending.extend_from_slice(input);
        let consumed = input.len();

        if !matches!(flush, FlushMode::Finish) {
            return Ok((consumed, 0, CompressStatus::NeedsInput));
        }

        if !self.encoded {
            let data = std::mem::take(&mut self.pending);
            let mut buffer = Vec::new();
            {
                let mut bit_writer = BitWriter::new(&mut buffer);
                self.encode_stream(&data, &mut bit_writer)?;
                bit_writer.flush()?;
            }
            self.outbuf = buffer;
            self.encoded = true;
        }

        let remaining = &self.outbuf[self.out_pos..];
        let to_copy = remaining.len().min(output.len());
        output[..to_copy].copy_from_slice(&remaining[..to_copy]);
        self.out_pos += to_copy;

        if self.out_pos == self.outbuf.len() {
            self.finished = true;
            Ok((consumed, to_copy, CompressStatus::Done))
        } else {
            Ok((consumed, to_copy, CompressStatus::NeedsOutput))
        }
    }

    fn reset(&mut self) {
        Deflater::reset(self);
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Fully materialized dynamic-block encoding: code lengths for all three
/// alphabets, the RLE-compressed length stream, and the exact bit cost.
#[derive(Debug)]
struct DynamicPlan {
    litlen_lengths: Vec<u8>,
    dist_lengths: Vec<u8>,
    codelen_lengths: Vec<u8>,
    /// (symbol, extra value, extra bit count) triples for the header.
    rle: Vec<(u8, u8, u8)>,
    /// Literal/length codes transmitted (>= 257).
    hlit: usize,
    /// Distance codes transmitted (>= 1).
    hdist: usize,
    /// Code length code lengths transmitted (>= 4).
    hclen: usize,
    header_bits: usize,
    data_bits: usize,
}

impl DynamicPlan {
    fn build(tokens: &[Lz77Token]) -> Self {
        let (litlen_freq, dist_freq) = Self::count_frequencies(tokens);

        let mut litlen_builder = HuffmanBuilder::new(286, 15);
        for (sym, &freq) in litlen_freq.iter().enumerate() {
            litlen_builder.add_count(sym as u16, freq);
        }
        let litlen_lengths = litlen_builder.build_lengths();

        let mut dist_builder = HuffmanBuilder::new(30, 15);
        for (sym, &freq) in dist_freq.iter().enumerate() {
            dist_builder.add_count(sym as u16, freq);
        }
        let dist_lengths = dist_builder.build_lengths();

        let hlit = Self::last_used(&litlen_lengths, 257);
        let hdist = Self::last_used(&dist_lengths, 1);

        let mut combined = Vec::with_capacity(hlit + hdist);
        combined.extend_from_slice(&litlen_lengths[..hlit]);
        combined.extend_from_slice(&dist_lengths[..hdist]);
        let (rle, codelen_freq) = Self::rle_encode_lengths(&combined);

        let mut codelen_builder = HuffmanBuilder::new(19, 7);
        for (sym, &freq) in codelen_freq.iter().enumerate() {
            codelen_builder.add_count(sym as u16, freq);
        }
        let codelen_lengths = codelen_builder.build_lengths();
        let hclen = Self::find_hclen(&codelen_lengths);

        let header_bits = 3
            + 5
            + 5
            + 4
            + hclen * 3
            + rle
                .iter()
                .map(|&(sym, _, extra_bits)| {
                    codelen_lengths[sym as usize] as usize + extra_bits as usize
                })
                .sum::<usize>();

        let mut data_bits = 0usize;
        for token in tokens {
            match token {
                Lz77Token::Literal(byte) => {
                    data_bits += litlen_lengths[*byte as usize] as usize;
                }
                Lz77Token::Match { length, distance } => {
                    let (len_code, len_extra_bits, _) = length_to_code(*length);
                    data_bits +=
                        litlen_lengths[len_code as usize] as usize + len_extra_bits as usize;

                    let (dist_code, dist_extra_bits, _) = distance_to_code(*distance);
                    data_bits +=
                        dist_lengths[dist_code as usize] as usize + dist_extra_bits as usize;
                }
            }
        }
        data_bits += litlen_lengths[256] as usize;

        Self {
            litlen_lengths,
            dist_lengths,
            codelen_lengths,
            rle,
            hlit,
            hdist,
            hclen,
            header_bits,
            data_bits,
        }
    }

    fn total_bits(&self) -> usize {
        self.header_bits + self.data_bits
    }

    /// Count symbol frequencies, including the mandatory end-of-block code.
    fn count_frequencies(tokens: &[Lz77Token]) -> ([u32; 286], [u32; 30]) {
        let mut litlen_freq = [0u32; 286];
        let mut dist_freq = [0u32; 30];

        for token in tokens {
            match token {
                Lz77Token::Literal(byte) => {
                    litlen_freq[*byte as usize] += 1;
                }
                Lz77Token::Match { length, distance } => {
                    let (len_code, _, _) = length_to_code(*length);
                    litlen_freq[len_code as usize] += 1;

                    let (dist_code, _, _) = distance_to_code(*distance);
                    dist_freq[dist_code as usize] += 1;
                }
            }
        }
        litlen_freq[256] += 1;

        (litlen_freq, dist_freq)
    }

    /// Number of leading code lengths that must be transmitted.
    fn last_used(lengths: &[u8], min: usize) -> usize {
        lengths
            .iter()
            .rposition(|&len| len > 0)
            .map_or(min, |i| (i + 1).max(min))
    }

    /// Number of code length code lengths transmitted, in permuted order.
    fn find_hclen(codelen_lengths: &[u8]) -> usize {
        CODE_LENGTH_ORDER
            .iter()
            .rposition(|&sym| codelen_lengths[sym] != 0)
            .map_or(4, |i| (i + 1).max(4))
    }

    /// Run-length encode code lengths with symbols 16, 17 and 18
    /// (RFC 1951 Section 3.2.7).
    fn rle_encode_lengths(lengths: &[u8]) -> (Vec<(u8, u8, u8)>, [u32; 19]) {
        let mut symbols = Vec::new();
        let mut freqs = [0u32; 19];
        let mut emit = |sym: u8, extra: u8, extra_bits: u8| {
            symbols.push((sym, extra, extra_bits));
            freqs[sym as usize] += 1;
        };

        let mut i = 0;
        while i < lengths.len() {
            let len = lengths[i];
            let mut run = lengths[i..].iter().take_while(|&&l| l == len).count();
            i += run;

            if len == 0 {
                while run > 0 {
                    if run >= 11 {
                        let n = run.min(138);
                        emit(18, (n - 11) as u8, 7);
                        run -= n;
                    } else if run >= 3 {
                        emit(17, (run - 3) as u8, 3);
                        run = 0;
                    } else {
                        emit(0, 0, 0);
                        run -= 1;
                    }
                }
            } else {
                emit(len, 0, 0);
                run -= 1;
                while run > 0 {
                    if run >= 3 {
                        let n = run.min(6);
                        emit(16, (n - 3) as u8, 2);
                        run -= n;
                    } else {
                        emit(len, 0, 0);
                        run -= 1;
                    }
                }
            }
        }

        (symbols, freqs)
    }
}

/// Compress data using DEFLATE.
///
/// Inputs longer than [`MAX_INPUT_SIZE`] are rejected.
pub fn deflate(data: &[u8], level: u8) -> Result<Vec<u8>> {
    let mut deflater = Deflater::new(level);
    deflater.compress_to_vec(data)
}
