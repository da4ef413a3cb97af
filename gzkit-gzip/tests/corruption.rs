//! Bit-flip corruption coverage.
//!
//! Flipping any single bit of a gzip member must never silently yield
//! different data: either decompression fails with a format, checksum or
//! unsupported-feature error, or it succeeds with the original bytes
//! (possible when the flip lands in DEFLATE padding bits).

use gzkit_core::error::ErrorClass;
use gzkit_gzip::{compress, decompress};
use std::io::Cursor;

fn assert_no_silent_corruption(original: &[u8], member: &[u8]) {
    for byte_idx in 0..member.len() {
        for bit in 0..8 {
            let mut corrupted = member.to_vec();
            corrupted[byte_idx] ^= 1 << bit;

            match decompress(&mut Cursor::new(&corrupted)) {
                Ok(output) => assert_eq!(
                    output, original,
                    "flip at byte {} bit {} changed the output",
                    byte_idx, bit
                ),
                Err(e) => {
                    let class = e.class();
                    assert!(
                        matches!(
                            class,
                            ErrorClass::Format | ErrorClass::Checksum | ErrorClass::Unsupported
                        ),
                        "flip at byte {} bit {} gave unexpected class {:?}: {}",
                        byte_idx,
                        bit,
                        class,
                        e
                    );
                }
            }
        }
    }
}

#[test]
fn test_every_bit_flip_on_text_member() {
    let original = b"The quick brown fox jumps over the lazy dog";
    let member = compress(original, 6).unwrap();
    assert_no_silent_corruption(original, &member);
}

#[test]
fn test_every_bit_flip_on_compressible_member() {
    let original: Vec<u8> = b"abcabcabc".iter().cycle().take(400).copied().collect();
    let member = compress(&original, 9).unwrap();
    assert_no_silent_corruption(&original, &member);
}

#[test]
fn test_every_bit_flip_on_stored_member() {
    let original = b"stored!";
    let member = compress(original, 0).unwrap();
    assert_no_silent_corruption(original, &member);
}

#[test]
fn test_trailer_crc_flips_are_checksum_errors() {
    let original = b"trailer integrity";
    let member = compress(original, 6).unwrap();
    let crc_start = member.len() - 8;

    for byte_idx in crc_start..crc_start + 4 {
        for bit in 0..8 {
            let mut corrupted = member.clone();
            corrupted[byte_idx] ^= 1 << bit;
            let err = decompress(&mut Cursor::new(&corrupted)).unwrap_err();
            assert_eq!(err.class(), ErrorClass::Checksum);
        }
    }
}

#[test]
fn test_truncation_at_every_length_fails() {
    let member = compress(b"truncate me at every possible point", 6).unwrap();
    for len in 0..member.len() {
        let err = decompress(&mut Cursor::new(&member[..len])).unwrap_err();
        assert!(
            matches!(err.class(), ErrorClass::Format | ErrorClass::Checksum),
            "truncation to {} bytes gave {:?}",
            len,
            err.class()
        );
    }
}
