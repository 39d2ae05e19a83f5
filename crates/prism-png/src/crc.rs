/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! CRC-32 as used by PNG chunks.
//!
//! Polynomial `0xEDB88320`, seeded with all ones and finalized by a
//! bitwise not. The byte table is built at compile time.

const fn make_crc_table() -> [u32; 256] {
    let mut table = [0_u32; 256];
    let mut n = 0;

    while n < 256 {
        let mut c = n as u32;
        let mut k = 0;

        while k < 8 {
            c = if c & 1 != 0 {
                0xEDB8_8320 ^ (c >> 1)
            } else {
                c >> 1
            };
            k += 1;
        }
        table[n] = c;
        n += 1;
    }
    table
}

static CRC_TABLE: [u32; 256] = make_crc_table();

/// Feed `bytes` into a running crc value.
///
/// Start with `u32::MAX` and finish with a bitwise not, or use
/// [`crc32`] when hashing a single contiguous buffer.
pub fn crc32_update(crc: u32, bytes: &[u8]) -> u32 {
    let mut c = crc;

    for byte in bytes {
        c = CRC_TABLE[usize::from((c as u8) ^ byte)] ^ (c >> 8);
    }
    c
}

/// CRC-32 of one contiguous buffer.
pub fn crc32(bytes: &[u8]) -> u32 {
    !crc32_update(u32::MAX, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vectors() {
        // well known reference value for the nine ascii digits
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
        assert_eq!(crc32(b""), 0);
        // CRC of "IEND" as found in every PNG file
        assert_eq!(crc32(b"IEND"), 0xAE42_6082);
    }

    #[test]
    fn incremental_matches_oneshot() {
        let data = b"IHDRsome chunk payload";
        let oneshot = crc32(data);
        let split = !crc32_update(crc32_update(u32::MAX, b"IHDR"), b"some chunk payload");

        assert_eq!(oneshot, split);
    }
}
