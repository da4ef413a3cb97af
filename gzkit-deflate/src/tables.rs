//! RFC 1951 symbol tables: length/distance codes and the fixed Huffman code
//! lengths.
//!
//! Length codes 257-285 and distance codes 0-29 each map a range of values
//! to a base plus a fixed number of extra bits; the tables below are the
//! ones printed in RFC 1951 Section 3.2.5.

/// Length code base values for codes 257-285.
pub const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];

/// Number of extra bits for length codes 257-285.
pub const LENGTH_EXTRA_BITS: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

/// Distance code base values for codes 0-29.
pub const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

/// Number of extra bits for distance codes 0-29.
pub const DISTANCE_EXTRA_BITS: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// Transmission order of code length code lengths in a dynamic block header
/// (RFC 1951 Section 3.2.7).
pub const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Fixed literal/length code lengths (RFC 1951 Section 3.2.6).
///
/// - Symbols 0-143: 8 bits
/// - Symbols 144-255: 9 bits
/// - Symbols 256-279: 7 bits
/// - Symbols 280-287: 8 bits
pub const fn fixed_litlen_lengths() -> [u8; 288] {
    let mut lengths = [0u8; 288];
    let mut i = 0;
    while i < 288 {
        lengths[i] = match i {
            0..=143 => 8,
            144..=255 => 9,
            256..=279 => 7,
            _ => 8,
        };
        i += 1;
    }
    lengths
}

/// Fixed distance code lengths: all 30 codes use 5 bits.
pub const fn fixed_distance_lengths() -> [u8; 30] {
    [5u8; 30]
}

/// Map a match length (3-258) to (length code, extra bits, extra value).
pub fn length_to_code(length: u16) -> (u16, u8, u16) {
    debug_assert!(
        (3..=258).contains(&length),
        "Length out of range: {}",
        length
    );

    // Last code whose base does not exceed the length.
    let mut idx = LENGTH_BASE.len() - 1;
    while LENGTH_BASE[idx] > length {
        idx -= 1;
    }

    let extra_bits = LENGTH_EXTRA_BITS[idx];
    let extra_value = length - LENGTH_BASE[idx];
    ((idx + 257) as u16, extra_bits, extra_value)
}

/// Map a match distance (1-32768) to (distance code, extra bits, extra value).
pub fn distance_to_code(distance: u16) -> (u16, u8, u16) {
    debug_assert!(distance >= 1, "Distance out of range: {}", distance);

    let mut idx = DISTANCE_BASE.len() - 1;
    while DISTANCE_BASE[idx] > distance {
        idx -= 1;
    }

    let extra_bits = DISTANCE_EXTRA_BITS[idx];
    let extra_value = distance - DISTANCE_BASE[idx];
    (idx as u16, extra_bits, extra_value)
}

/// Decode a length from a length code (257-285) and its extra bits.
pub fn decode_length(code: u16, extra: u16) -> u16 {
    debug_assert!((257..=285).contains(&code), "Invalid length code: {}", code);
    LENGTH_BASE[(code - 257) as usize] + extra
}

/// Decode a distance from a distance code (0-29) and its extra bits.
pub fn decode_distance(code: u16, extra: u16) -> u16 {
    debug_assert!(code < 30, "Invalid distance code: {}", code);
    DISTANCE_BASE[code as usize] + extra
}
