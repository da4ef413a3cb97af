//! LZ77 back-reference search for DEFLATE.
//!
//! Repeated byte sequences are replaced by (length, distance) pairs pointing
//! back into the previous 32 KiB of input. Candidate positions are found
//! through a hash table over 3-byte prefixes with per-position chains.
//!
//! # Determinism
//!
//! Token output depends only on the input bytes and the compression level:
//! hashing is done in `u32` arithmetic so the result does not vary with the
//! platform word size, chains are walked most-recent-first, and a candidate
//! replaces the current best only when it is strictly longer. Together these
//! rules mean equal-length matches always resolve to the smallest distance.

/// Maximum back-reference distance (32 KiB).
pub const WINDOW_SIZE: usize = 32768;

/// Minimum match length.
pub const MIN_MATCH: usize = 3;

/// Maximum match length.
pub const MAX_MATCH: usize = 258;

/// Size of the hash table (power of 2).
const HASH_SIZE: usize = 32768;

/// Hash mask.
const HASH_MASK: u32 = (HASH_SIZE - 1) as u32;

/// Deepest chain walk, used by level 9.
const MAX_CHAIN_LENGTH: usize = 4096;

/// A token produced by the back-reference search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lz77Token {
    /// A literal byte.
    Literal(u8),
    /// A back-reference to previously seen data.
    Match {
        /// Number of bytes to copy (3-258).
        length: u16,
        /// Distance back into the window (1-32768).
        distance: u16,
    },
}

/// LZ77 encoder producing a token stream from a complete input buffer.
#[derive(Debug)]
pub struct Lz77Encoder {
    /// Chain positions examined per search.
    max_chain: usize,
    /// Shortest match worth emitting at this level.
    min_match: usize,
    /// Defer a match when the next position matches longer.
    lazy_match: bool,
}

impl Lz77Encoder {
    /// Create an encoder with default settings (level 6).
    pub fn new() -> Self {
        Self::with_level(6)
    }

    /// Create an encoder tuned for the given compression level (0-9).
    pub fn with_level(level: u8) -> Self {
        let level = level.min(9);

        let (max_chain, min_match, lazy_match) = match level {
            0 => (0, MAX_MATCH + 1, false), // Store only
            1 => (4, 4, false),
            2 => (8, 4, false),
            3 => (16, 4, false),
            4 => (32, 4, false),
            5 => (64, 4, true),
            6 => (128, 4, true),
            7 => (256, 3, true),
            8 => (1024, 3, true),
            9 => (MAX_CHAIN_LENGTH, 3, true),
            _ => unreachable!(),
        };

        Self {
            max_chain,
            min_match,
            lazy_match,
        }
    }

    /// Tokenize an input buffer.
    ///
    /// Chain positions are indexed as `i32`, so inputs must not exceed
    /// `i32::MAX` bytes; [`Deflater`](crate::Deflater) rejects longer inputs
    /// before tokenizing.
    pub fn tokenize(&self, input: &[u8]) -> Vec<Lz77Token> {
        debug_assert!(input.len() <= i32::MAX as usize, "input too large to index");

        if self.max_chain == 0 || input.len() < MIN_MATCH {
            return input.iter().map(|&b| Lz77Token::Literal(b)).collect();
        }

        let mut tokens = Vec::with_capacity(input.len() / 2);
        let mut table = ChainTable::new(input);
        let mut pos = 0;

        while pos < input.len() {
            table.insert_to(pos);

            if let Some((length, distance)) = table.longest_match(pos, self.max_chain, self.min_match) {
                let mut take = true;

                // Lazy matching: defer by one byte when the next position
                // starts a strictly longer match.
                if self.lazy_match && (length as usize) < MAX_MATCH && pos + 1 < input.len() {
                    table.insert_to(pos + 1);
                    if let Some((next_len, _)) =
                        table.longest_match(pos + 1, self.max_chain, self.min_match)
                    {
                        if next_len > length {
                            take = false;
                        }
                    }
                }

                if take {
                    tokens.push(Lz77Token::Match { length, distance });
                    table.insert_to(pos + length as usize);
                    pos += length as usize;
                    continue;
                }
            }

            tokens.push(Lz77Token::Literal(input[pos]));
            pos += 1;
        }

        tokens
    }

    /// Tokenize in one call with a fresh encoder.
    pub fn tokenize_all(input: &[u8], level: u8) -> Vec<Lz77Token> {
        Self::with_level(level).tokenize(input)
    }
}

impl Default for Lz77Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash-chain index over absolute input positions.
///
/// `head[h]` holds the most recent position whose 3-byte prefix hashes to
/// `h`, and `prev[p]` the previous position on the same chain; -1 terminates.
/// Positions are inserted exactly once, in order, via the `next_insert`
/// cursor.
struct ChainTable<'a> {
    input: &'a [u8],
    head: Vec<i32>,
    prev: Vec<i32>,
    /// First position not yet inserted.
    next_insert: usize,
    /// First position without a full 3-byte prefix.
    hash_end: usize,
}

impl<'a> ChainTable<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            head: vec![-1; HASH_SIZE],
            prev: vec![-1; input.len()],
            next_insert: 0,
            hash_end: input.len() - (MIN_MATCH - 1),
        }
    }

    /// Hash the 3 bytes at a position. All-`u32` so the value is identical
    /// on every platform.
    #[inline(always)]
    fn hash_at(&self, pos: usize) -> usize {
        let h = (self.input[pos] as u32).wrapping_mul(506832829)
            ^ ((self.input[pos + 1] as u32).wrapping_mul(2654435761) << 8)
            ^ ((self.input[pos + 2] as u32).wrapping_mul(374761393) << 16);
        ((h ^ (h >> 15)) & HASH_MASK) as usize
    }

    /// Insert every position below `limit` that is not yet in the table.
    fn insert_to(&mut self, limit: usize) {
        let limit = limit.min(self.hash_end);
        while self.next_insert < limit {
            let pos = self.next_insert;
            let h = self.hash_at(pos);
            self.prev[pos] = self.head[h];
            self.head[h] = pos as i32;
            self.next_insert += 1;
        }
    }

    /// Find the longest match at `pos`, walking at most `max_chain`
    /// candidates. Only matches of at least `min_accept` bytes qualify.
    fn longest_match(&self, pos: usize, max_chain: usize, min_accept: usize) -> Option<(u16, u16)> {
        let max_len = (self.input.len() - pos).min(MAX_MATCH);
        let threshold = min_accept.max(MIN_MATCH);
        if pos >= self.hash_end || max_len < threshold {
            return None;
        }

        let mut candidate = self.head[self.hash_at(pos)];
        let mut best_len = 0usize;
        let mut best_dist = 0usize;
        let mut chain = 0usize;

        while candidate >= 0 && chain < max_chain {
            let cpos = candidate as usize;
            let dist = pos - cpos;
            // Chains run newest to oldest, so everything past the window is
            // out of reach too.
            if dist > WINDOW_SIZE {
                break;
            }

            // Quick rejection: a longer match must agree at offset best_len.
            if best_len == 0 || self.input[cpos + best_len] == self.input[pos + best_len] {
                let len = self.match_length(cpos, pos, max_len);
                if len > best_len {
                    best_len = len;
                    best_dist = dist;
                    if len == max_len {
                        break;
                    }
                }
            }

            candidate = self.prev[cpos];
            chain += 1;
        }

        if best_len >= threshold {
            Some((best_len as u16, best_dist as u16))
        } else {
            None
        }
    }

    /// Count matching bytes between two positions, up to `max_len`.
    #[inline]
    fn match_length(&self, cpos: usize, pos: usize, max_len: usize) -> usize {
        self.input[cpos..cpos + max_len]
            .iter()
            .zip(&self.input[pos..pos + max_len])
            .take_while(|(a, b)| a == b)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct(tokens: &[Lz77Token]) -> Vec<u8> {
        let mut output = Vec::new();
        for token in tokens {
            match token {
                Lz77Token::Literal(b) => output.push(*b),
                Lz77Token::Match { length, distance } => {
                    for _ in 0..*length {
                        let pos = output.len() - *distance as usize;
                        output.push(output[pos]);
                    }
                }
            }
        }
        output
    }

    #[test]
    fn test_literals_only() {
        let tokens = Lz77Encoder::tokenize_all(b"abcdefgh", 6);
        assert!(tokens.iter().all(|t| matches!(t, Lz77Token::Literal(_))));
        assert_eq!(tokens.len(), 8);
    }

    #[test]
    fn test_simple_match() {
        let tokens = Lz77Encoder::tokenize_all(b"abcdabcdabcd", 6);
        assert!(
            tokens.iter().any(|t| matches!(t, Lz77Token::Match { .. })),
            "Should find at least one match"
        );
        assert_eq!(reconstruct(&tokens), b"abcdabcdabcd");
    }

    #[test]
    fn test_repeated_char_uses_overlapping_match() {
        let tokens = Lz77Encoder::tokenize_all(&[b'a'; 300], 6);
        assert_eq!(reconstruct(&tokens), vec![b'a'; 300]);
        // Runs compress to a literal plus distance-1 matches.
        assert!(tokens.len() <= 3, "expected few tokens, got {}", tokens.len());
        assert!(tokens
            .iter()
            .any(|t| matches!(t, Lz77Token::Match { distance: 1, .. })));
    }

    #[test]
    fn test_equal_length_prefers_smallest_distance() {
        // "abcd" appears at 0, 5 and 10; the reference from 10 must point at
        // the copy at 5 (distance 5), not the one at 0 (distance 10).
        let input = b"abcd abcd abcd";
        let tokens = Lz77Encoder::tokenize_all(input, 9);
        assert_eq!(reconstruct(&tokens), input);
        for token in &tokens {
            if let Lz77Token::Match { distance, .. } = token {
                assert_eq!(*distance, 5);
            }
        }
    }

    #[test]
    fn test_max_match_length_capped() {
        let tokens = Lz77Encoder::tokenize_all(&[0u8; 4096], 9);
        for token in &tokens {
            if let Lz77Token::Match { length, .. } = token {
                assert!((*length as usize) <= MAX_MATCH);
            }
        }
        assert_eq!(reconstruct(&tokens), vec![0u8; 4096]);
    }

    #[test]
    fn test_level_0_store() {
        let tokens = Lz77Encoder::tokenize_all(b"test data test data", 0);
        assert!(tokens.iter().all(|t| matches!(t, Lz77Token::Literal(_))));
    }

    #[test]
    fn test_distance_never_exceeds_window() {
        // Repeat a marker just past the window so the only in-range matches
        // are short or absent; distances must stay within 32 KiB.
        let mut input = vec![0x55u8; WINDOW_SIZE + 64];
        input[0] = b'X';
        input[WINDOW_SIZE + 10] = b'X';
        let tokens = Lz77Encoder::tokenize_all(&input, 9);
        assert_eq!(reconstruct(&tokens), input);
        for token in &tokens {
            if let Lz77Token::Match { distance, .. } = token {
                assert!((*distance as usize) <= WINDOW_SIZE);
            }
        }
    }

    #[test]
    fn test_tokenize_is_deterministic() {
        let input: Vec<u8> = (0..2048u32).map(|i| (i * 31 % 251) as u8).collect();
        for level in [1, 4, 6, 9] {
            let a = Lz77Encoder::tokenize_all(&input, level);
            let b = Lz77Encoder::tokenize_all(&input, level);
            assert_eq!(a, b, "level {} not deterministic", level);
        }
    }

    #[test]
    fn test_roundtrip_all_levels() {
        let input = b"the quick brown fox jumps over the lazy dog, the quick brown fox";
        for level in 0..=9 {
            let tokens = Lz77Encoder::tokenize_all(input, level);
            assert_eq!(reconstruct(&tokens), input, "level {}", level);
        }
    }
}
