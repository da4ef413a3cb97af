//! Sliding-window output buffer for LZ77 decompression.
//!
//! DEFLATE back-references may reach up to 32 KB into the already-decoded
//! output. [`OutputWindow`] keeps that history in a power-of-two ring while
//! also accumulating the full decompressed output, so decompression never
//! re-scans the output vector for match copies.

use crate::error::{GzKitError, Result};

/// Window size for DEFLATE (32 KB).
pub const DEFLATE_WINDOW_SIZE: usize = 32768;

/// Decompression history ring plus accumulated output.
#[derive(Debug)]
pub struct OutputWindow {
    /// Ring of the most recent `capacity` bytes.
    ring: Vec<u8>,
    /// Next write position in the ring.
    pos: usize,
    /// Number of valid history bytes, up to `capacity`.
    filled: usize,
    /// Power-of-two modulo mask.
    mask: usize,
    /// Accumulated decompressed output.
    output: Vec<u8>,
}

impl OutputWindow {
    /// Create a window with the given history capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or not a power of two.
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity > 0 && capacity.is_power_of_two(),
            "Window capacity must be a power of 2, got {}",
            capacity
        );
        Self {
            ring: vec![0; capacity],
            pos: 0,
            filled: 0,
            mask: capacity - 1,
            output: Vec::new(),
        }
    }

    /// Create a 32 KB window sized for DEFLATE.
    pub fn deflate() -> Self {
        Self::new(DEFLATE_WINDOW_SIZE)
    }

    /// Number of history bytes currently available for back-references.
    pub fn history_len(&self) -> usize {
        self.filled
    }

    /// Append a literal byte.
    #[inline]
    pub fn write_literal(&mut self, byte: u8) {
        self.ring[self.pos] = byte;
        self.pos = (self.pos + 1) & self.mask;
        if self.filled < self.ring.len() {
            self.filled += 1;
        }
        self.output.push(byte);
    }

    /// Append a run of literal bytes.
    pub fn write_literals(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.write_literal(byte);
        }
    }

    /// Copy `length` bytes starting `distance` bytes back in the output.
    ///
    /// `length` may exceed `distance`; the copy then repeats the most
    /// recent bytes, which is how DEFLATE encodes runs.
    pub fn copy_match(&mut self, distance: usize, length: usize) -> Result<()> {
        if distance == 0 || distance > self.filled {
            return Err(GzKitError::invalid_distance(distance, self.filled));
        }

        self.output.reserve(length);
        let mut src = (self.pos.wrapping_sub(distance)) & self.mask;
        for _ in 0..length {
            let byte = self.ring[src];
            self.ring[self.pos] = byte;
            self.pos = (self.pos + 1) & self.mask;
            if self.filled < self.ring.len() {
                self.filled += 1;
            }
            self.output.push(byte);
            src = (src + 1) & self.mask;
        }
        Ok(())
    }

    /// The decompressed output so far.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Consume the window and return the decompressed output.
    pub fn into_output(self) -> Vec<u8> {
        self.output
    }

    /// Reset history and output.
    pub fn clear(&mut self) {
        self.ring.fill(0);
        self.pos = 0;
        self.filled = 0;
        self.output.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals_accumulate() {
        let mut window = OutputWindow::new(32);
        window.write_literals(b"Hello");
        assert_eq!(window.output(), b"Hello");
        assert_eq!(window.history_len(), 5);
    }

    #[test]
    fn test_copy_match() {
        let mut window = OutputWindow::new(32);
        window.write_literals(b"Hello");
        window.copy_match(5, 5).unwrap();
        assert_eq!(window.output(), b"HelloHello");
    }

    #[test]
    fn test_copy_overlapping_match() {
        // length > distance repeats the tail: "AB" + (2, 6) -> "ABABABAB"
        let mut window = OutputWindow::new(32);
        window.write_literals(b"AB");
        window.copy_match(2, 6).unwrap();
        assert_eq!(window.output(), b"ABABABAB");
    }

    #[test]
    fn test_single_byte_run() {
        let mut window = OutputWindow::new(32);
        window.write_literal(b'X');
        window.copy_match(1, 5).unwrap();
        assert_eq!(window.output(), b"XXXXXX");
    }

    #[test]
    fn test_invalid_distance_rejected() {
        let mut window = OutputWindow::new(32);
        window.write_literals(b"AB");
        assert!(window.copy_match(0, 1).is_err());
        assert!(window.copy_match(3, 1).is_err());
    }

    #[test]
    fn test_history_wraps_but_output_grows() {
        let mut window = OutputWindow::new(8);
        window.write_literals(b"ABCDEFGHIJKL");
        assert_eq!(window.history_len(), 8);
        assert_eq!(window.output().len(), 12);
        // Distance 8 reaches the oldest retained byte ('E').
        window.copy_match(8, 1).unwrap();
        assert_eq!(window.output().last(), Some(&b'E'));
        // Distance 9 is gone.
        assert!(window.copy_match(9, 1).is_err());
    }

    #[test]
    #[should_panic(expected = "power of 2")]
    fn test_non_power_of_two_panics() {
        let _ = OutputWindow::new(100);
    }
}
