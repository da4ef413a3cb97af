//! Byte-exact output vectors.
//!
//! These are the level-6 gzip members for a handful of inputs with the
//! portable header defaults (mtime 0, OS 255). The same vectors are also
//! checked through a base64 layer, matching how reproducible archives are
//! commonly diffed in configuration files and test fixtures.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use gzkit_gzip::{compress, decompress};
use std::io::Cursor;

struct Vector {
    input: &'static [u8],
    member: &'static [u8],
    base64: &'static str,
}

const VECTORS: &[Vector] = &[
    Vector {
        input: b"",
        member: &[
            0x1F, 0x8B, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, // header
            0x01, 0x00, 0x00, 0xFF, 0xFF, // empty final stored block
            0x00, 0x00, 0x00, 0x00, // CRC-32 of nothing
            0x00, 0x00, 0x00, 0x00, // ISIZE 0
        ],
        base64: "H4sIAAAAAAAA/wEAAP//AAAAAAAAAAA=",
    },
    Vector {
        input: b".",
        member: &[
            0x1F, 0x8B, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, // header
            0xD3, 0x03, 0x00, // fixed block: literal '.', end of block
            0x42, 0xE2, 0xD4, 0x0E, // CRC-32
            0x01, 0x00, 0x00, 0x00, // ISIZE 1
        ],
        base64: "H4sIAAAAAAAA/9MDAELi1A4BAAAA",
    },
    Vector {
        input: b"hello world",
        member: &[
            0x1F, 0x8B, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, // header
            0xCB, 0x48, 0xCD, 0xC9, 0xC9, 0x57, 0x28, 0xCF, 0x2F, 0xCA, 0x49, 0x01,
            0x00, // fixed block, all literals
            0x85, 0x11, 0x4A, 0x0D, // CRC-32
            0x0B, 0x00, 0x00, 0x00, // ISIZE 11
        ],
        base64: "H4sIAAAAAAAA/8tIzcnJVyjPL8pJAQCFEUoNCwAAAA==",
    },
];

#[test]
fn test_exact_member_bytes() {
    for vector in VECTORS {
        let compressed = compress(vector.input, 6).unwrap();
        assert_eq!(
            compressed,
            vector.member,
            "member bytes differ for input {:?}",
            String::from_utf8_lossy(vector.input)
        );
    }
}

#[test]
fn test_base64_representation() {
    for vector in VECTORS {
        let compressed = compress(vector.input, 6).unwrap();
        assert_eq!(STANDARD.encode(&compressed), vector.base64);
    }
}

#[test]
fn test_vectors_decode_back() {
    for vector in VECTORS {
        let member = STANDARD.decode(vector.base64).unwrap();
        let decompressed = decompress(&mut Cursor::new(member)).unwrap();
        assert_eq!(decompressed, vector.input);
    }
}

#[test]
fn test_foreign_member_with_timestamp_and_os() {
    // zlib-produced member for "hello world": mtime set, OS byte 3 (Unix).
    // Header metadata must not affect decompression.
    let mut member = compress(b"hello world", 6).unwrap();
    member[4..8].copy_from_slice(&1_700_000_000u32.to_le_bytes());
    member[9] = 0x03;

    let decompressed = decompress(&mut Cursor::new(member)).unwrap();
    assert_eq!(decompressed, b"hello world");
}
