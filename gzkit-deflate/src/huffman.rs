//! Canonical Huffman coding for DEFLATE.
//!
//! DEFLATE uses canonical codes: only the bit length per symbol is
//! transmitted, and codes of equal length are assigned consecutive values in
//! symbol order (RFC 1951 Section 3.2.2). That convention makes the decoder
//! table a pure function of the lengths, and it is also what makes the
//! encoder deterministic once the lengths themselves are chosen
//! deterministically.
//!
//! # Alphabets
//!
//! - **Literal/Length**: 0-285 (0-255 literals, 256 end-of-block, 257-285 lengths)
//! - **Distance**: 0-29
//! - **Code Length**: 0-18 (used to compress dynamic block headers)

use gzkit_core::BitReader;
use gzkit_core::error::{GzKitError, Result};
use std::collections::BinaryHeap;
use std::io::Read;

/// Maximum code length in DEFLATE (15 bits).
pub const MAX_CODE_LENGTH: usize = 15;

/// Size of the literal/length alphabet.
pub const LITLEN_ALPHABET_SIZE: usize = 286;

/// Size of the distance alphabet.
pub const DISTANCE_ALPHABET_SIZE: usize = 30;

/// Size of the code length alphabet.
pub const CODELEN_ALPHABET_SIZE: usize = 19;

/// End of block symbol.
pub const END_OF_BLOCK: u16 = 256;

/// A canonical Huffman decoding table.
///
/// Stores the per-length code counts and the symbols in canonical order;
/// decoding walks the lengths bit by bit, which is compact and needs no
/// code-value table at all.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    /// Number of codes of each length (index 0 unused).
    counts: [u16; MAX_CODE_LENGTH + 1],
    /// Symbols sorted by (code length, symbol value).
    symbols: Vec<u16>,
    /// Longest code length present, 0 for an empty table.
    max_length: u8,
}

impl HuffmanTree {
    /// Build a decoding table from per-symbol code lengths.
    ///
    /// A length of 0 means the symbol does not occur. Fails when a length
    /// exceeds 15 or when the lengths over-subscribe the code space
    /// (a prefix-free violation).
    pub fn from_code_lengths(code_lengths: &[u8]) -> Result<Self> {
        let mut counts = [0u16; MAX_CODE_LENGTH + 1];
        let mut max_length = 0u8;

        for &len in code_lengths {
            if len as usize > MAX_CODE_LENGTH {
                return Err(GzKitError::invalid_header(format!(
                    "Code length {} exceeds maximum {}",
                    len, MAX_CODE_LENGTH
                )));
            }
            if len > 0 {
                counts[len as usize] += 1;
                max_length = max_length.max(len);
            }
        }

        if max_length == 0 {
            // No symbols at all. Valid as a placeholder (e.g. an unused
            // distance table); any decode attempt fails.
            return Ok(Self {
                counts,
                symbols: Vec::new(),
                max_length: 0,
            });
        }

        // Reject over-subscribed length sets: the running count of unused
        // codes must never go negative.
        let mut available = 1i32;
        for len in 1..=MAX_CODE_LENGTH {
            available = (available << 1) - counts[len] as i32;
            if available < 0 {
                return Err(GzKitError::invalid_header(
                    "Over-subscribed Huffman code lengths",
                ));
            }
        }

        // Offset of the first symbol of each length within `symbols`.
        let mut offsets = [0usize; MAX_CODE_LENGTH + 2];
        for len in 1..=MAX_CODE_LENGTH {
            offsets[len + 1] = offsets[len] + counts[len] as usize;
        }

        let mut symbols = vec![0u16; offsets[MAX_CODE_LENGTH + 1]];
        for (symbol, &len) in code_lengths.iter().enumerate() {
            if len > 0 {
                symbols[offsets[len as usize]] = symbol as u16;
                offsets[len as usize] += 1;
            }
        }

        Ok(Self {
            counts,
            symbols,
            max_length,
        })
    }

    /// Decode one symbol from the bit stream.
    ///
    /// Codes are transmitted most significant bit first, so each stream bit
    /// is appended as the new LSB of the running code value and compared
    /// against the canonical range for that length.
    pub fn decode<R: Read>(&self, reader: &mut BitReader<R>) -> Result<u16> {
        let mut code = 0u32;
        let mut first = 0u32;
        let mut index = 0usize;

        for len in 1..=self.max_length as usize {
            code |= reader.read_bits(1)?;
            let count = self.counts[len] as u32;
            if code < first + count {
                return Ok(self.symbols[index + (code - first) as usize]);
            }
            index += count as usize;
            first = (first + count) << 1;
            code <<= 1;
        }

        Err(GzKitError::invalid_huffman(reader.bit_position()))
    }

    /// Longest code length in this table, 0 when empty.
    pub fn max_code_length(&self) -> u8 {
        self.max_length
    }
}

/// Compute canonical code words from code lengths, pre-reversed for
/// LSB-first emission.
///
/// Returns `(code, length)` per symbol; unused symbols get `(0, 0)`.
pub fn canonical_codes(lengths: &[u8]) -> Vec<(u32, u8)> {
    let mut bl_count = [0u32; MAX_CODE_LENGTH + 1];
    for &len in lengths {
        bl_count[len as usize] += 1;
    }
    bl_count[0] = 0;

    let mut next_code = [0u32; MAX_CODE_LENGTH + 1];
    let mut code = 0u32;
    for bits in 1..=MAX_CODE_LENGTH {
        code = (code + bl_count[bits - 1]) << 1;
        next_code[bits] = code;
    }

    lengths
        .iter()
        .map(|&len| {
            if len == 0 {
                (0, 0)
            } else {
                let code = next_code[len as usize];
                next_code[len as usize] += 1;
                (reverse_bits(code, len), len)
            }
        })
        .collect()
}

/// Reverse the low `length` bits of `value`.
pub(crate) fn reverse_bits(mut value: u32, length: u8) -> u32 {
    let mut reversed = 0u32;
    for _ in 0..length {
        reversed = (reversed << 1) | (value & 1);
        value >>= 1;
    }
    reversed
}

/// Builds length-limited Huffman code lengths from symbol frequencies.
///
/// The construction is fully deterministic: heap entries are ordered by
/// `(frequency, node id)` where leaves take their symbol index as id and
/// internal nodes take larger ids in creation order, so equal frequencies
/// always merge in the same order. When the tree exceeds the length limit,
/// the deepest under-limit codes are lengthened until the lengths satisfy
/// the Kraft inequality again.
#[derive(Debug)]
pub struct HuffmanBuilder {
    frequencies: Vec<u32>,
    max_length: u8,
}

impl HuffmanBuilder {
    /// Create a builder for an alphabet of the given size.
    pub fn new(alphabet_size: usize, max_length: u8) -> Self {
        debug_assert!(max_length as usize <= MAX_CODE_LENGTH);
        Self {
            frequencies: vec![0; alphabet_size],
            max_length,
        }
    }

    /// Record `count` occurrences of a symbol.
    pub fn add_count(&mut self, symbol: u16, count: u32) {
        if (symbol as usize) < self.frequencies.len() {
            self.frequencies[symbol as usize] += count;
        }
    }

    /// Compute the code length for every symbol; 0 for unused symbols.
    pub fn build_lengths(&self) -> Vec<u8> {
        let n = self.frequencies.len();
        let mut lengths = vec![0u8; n];

        let used: Vec<usize> = (0..n).filter(|&i| self.frequencies[i] > 0).collect();
        match used.len() {
            0 => return lengths,
            1 => {
                // A single symbol still needs one bit on the wire.
                lengths[used[0]] = 1;
                return lengths;
            }
            _ => {}
        }

        let depths = self.tree_depths(&used);
        for (&symbol, &depth) in used.iter().zip(depths.iter()) {
            lengths[symbol] = depth.min(self.max_length as u32) as u8;
        }
        self.repair_kraft(&mut lengths, &used);

        lengths
    }

    /// Unrestricted Huffman depth per used symbol, via deterministic
    /// pairwise merging.
    fn tree_depths(&self, used: &[usize]) -> Vec<u32> {
        // Node layout: 0..used.len() are leaves, the rest internals.
        let mut parent: Vec<Option<usize>> = vec![None; used.len()];
        let mut heap: BinaryHeap<std::cmp::Reverse<(u64, usize)>> = used
            .iter()
            .enumerate()
            .map(|(node, &sym)| std::cmp::Reverse((self.frequencies[sym] as u64, node)))
            .collect();

        let mut next_node = used.len();
        while heap.len() > 1 {
            let std::cmp::Reverse((freq_a, a)) = heap.pop().expect("heap has >1 entry");
            let std::cmp::Reverse((freq_b, b)) = heap.pop().expect("heap has >1 entry");
            parent.push(None);
            parent[a] = Some(next_node);
            parent[b] = Some(next_node);
            heap.push(std::cmp::Reverse((freq_a + freq_b, next_node)));
            next_node += 1;
        }

        (0..used.len())
            .map(|leaf| {
                let mut depth = 0;
                let mut node = leaf;
                while let Some(p) = parent[node] {
                    depth += 1;
                    node = p;
                }
                depth
            })
            .collect()
    }

    /// Restore the Kraft inequality after clamping lengths to the limit.
    ///
    /// Lengthening the deepest under-limit code costs the least code space,
    /// so that candidate is chosen each round; ties resolve to the highest
    /// symbol index.
    fn repair_kraft(&self, lengths: &mut [u8], used: &[usize]) {
        let limit = self.max_length as u32;
        let budget = 1u64 << limit;

        loop {
            let kraft: u64 = used
                .iter()
                .map(|&sym| 1u64 << (limit - lengths[sym] as u32))
                .sum();
            if kraft <= budget {
                return;
            }

            let candidate = used
                .iter()
                .copied()
                .filter(|&sym| (lengths[sym] as u32) < limit)
                .max_by_key(|&sym| (lengths[sym], sym))
                .expect("some code must be below the length limit");
            lengths[candidate] += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_decode_simple_tree() {
        // Lengths A=1, B=2, C=2 give canonical codes A=0, B=10, C=11.
        let tree = HuffmanTree::from_code_lengths(&[1, 2, 2]).unwrap();

        // A B C A, codes MSB-first, packed LSB-first: 0 01 11 0 -> 0b00011010
        let mut reader = BitReader::new(Cursor::new(vec![0b00011010u8]));
        assert_eq!(tree.decode(&mut reader).unwrap(), 0);
        assert_eq!(tree.decode(&mut reader).unwrap(), 1);
        assert_eq!(tree.decode(&mut reader).unwrap(), 2);
        assert_eq!(tree.decode(&mut reader).unwrap(), 0);
    }

    #[test]
    fn test_oversubscribed_lengths_rejected() {
        // Three codes of length 1 cannot coexist.
        assert!(HuffmanTree::from_code_lengths(&[1, 1, 1]).is_err());
    }

    #[test]
    fn test_length_above_15_rejected() {
        assert!(HuffmanTree::from_code_lengths(&[16]).is_err());
    }

    #[test]
    fn test_empty_tree_decodes_nothing() {
        let tree = HuffmanTree::from_code_lengths(&[0, 0, 0, 0]).unwrap();
        assert_eq!(tree.max_code_length(), 0);
        let mut reader = BitReader::new(Cursor::new(vec![0u8]));
        assert!(tree.decode(&mut reader).is_err());
    }

    #[test]
    fn test_canonical_codes_rfc_example() {
        // RFC 1951 3.2.2 example: lengths (3,3,3,3,3,2,4,4) yield codes
        // 010 011 100 101 110 00 1110 1111 (MSB-first).
        let lengths = [3u8, 3, 3, 3, 3, 2, 4, 4];
        let codes = canonical_codes(&lengths);
        let expected_msb: [u32; 8] = [0b010, 0b011, 0b100, 0b101, 0b110, 0b00, 0b1110, 0b1111];
        for (i, &(code, len)) in codes.iter().enumerate() {
            assert_eq!(len, lengths[i]);
            assert_eq!(code, reverse_bits(expected_msb[i], len), "symbol {}", i);
        }
    }

    #[test]
    fn test_builder_respects_frequencies() {
        let mut builder = HuffmanBuilder::new(4, 15);
        builder.add_count(0, 100);
        builder.add_count(1, 50);
        builder.add_count(2, 25);
        builder.add_count(3, 25);

        let lengths = builder.build_lengths();
        assert!(lengths.iter().all(|&l| l > 0));
        assert!(lengths[0] <= lengths[1]);
        assert!(lengths[1] <= lengths[2]);
    }

    #[test]
    fn test_builder_single_symbol() {
        let mut builder = HuffmanBuilder::new(10, 15);
        builder.add_count(7, 42);
        let lengths = builder.build_lengths();
        assert_eq!(lengths[7], 1);
        assert_eq!(lengths.iter().filter(|&&l| l > 0).count(), 1);
    }

    #[test]
    fn test_builder_lengths_are_kraft_valid() {
        // Fibonacci-like frequencies force a deep tree; with the limit the
        // result must still be a feasible prefix code.
        let mut builder = HuffmanBuilder::new(20, 7);
        let mut a = 1u32;
        let mut b = 1u32;
        for sym in 0..20u16 {
            builder.add_count(sym, a);
            let next = a + b;
            a = b;
            b = next;
        }

        let lengths = builder.build_lengths();
        assert!(lengths.iter().all(|&l| l > 0 && l <= 7));
        let kraft: u64 = lengths.iter().map(|&l| 1u64 << (7 - l as u32)).sum();
        assert!(kraft <= 1 << 7, "Kraft sum {} over budget", kraft);
        // And the decoder must accept them.
        assert!(HuffmanTree::from_code_lengths(&lengths).is_ok());
    }

    #[test]
    fn test_builder_is_deterministic() {
        let build = || {
            let mut builder = HuffmanBuilder::new(8, 15);
            for sym in 0..8u16 {
                builder.add_count(sym, 10); // all-equal frequencies
            }
            builder.build_lengths()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_builder_roundtrips_through_tree() {
        let mut builder = HuffmanBuilder::new(6, 15);
        for (sym, freq) in [(0u16, 5u32), (1, 9), (2, 12), (3, 13), (4, 16), (5, 45)] {
            builder.add_count(sym, freq);
        }
        let lengths = builder.build_lengths();
        let codes = canonical_codes(&lengths);
        let tree = HuffmanTree::from_code_lengths(&lengths).unwrap();

        // Encode each symbol, then decode it back.
        for sym in 0..6u16 {
            let (code, len) = codes[sym as usize];
            let mut buf = Vec::new();
            {
                let mut writer = gzkit_core::BitWriter::new(&mut buf);
                writer.write_bits(code, len).unwrap();
                writer.flush().unwrap();
            }
            let mut reader = BitReader::new(Cursor::new(buf));
            assert_eq!(tree.decode(&mut reader).unwrap(), sym);
        }
    }
}
