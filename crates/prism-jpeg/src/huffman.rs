/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Canonical Huffman tables for the entropy coded segment.
//!
//! A table is built from the sixteen code-length counts and the
//! symbol list of a DHT segment. Decoding peeks [`FAST_BITS`] bits
//! into an acceleration table first; codes longer than that fall back
//! to the canonical `maxcode`/`delta` walk.
#![allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]

use crate::errors::DecodeErrors;

/// How many bits the accelerated lookup consumes at once.
pub(crate) const FAST_BITS: usize = 9;

/// A built Huffman table.
pub(crate) struct HuffmanTable {
    /// Accelerated lookup: the top [`FAST_BITS`] bits of the stream
    /// index this table, whose entry is the symbol's position, or 255
    /// when the code is longer than [`FAST_BITS`].
    pub(crate) fast:    [u8; 1 << FAST_BITS],
    /// Canonical code of every symbol, indexed by symbol position.
    pub(crate) code:    [u16; 256],
    /// Symbols in order of increasing code length.
    pub(crate) values:  [u8; 256],
    /// Code length of every symbol position; one extra slot holds the
    /// zero terminator of the build loop.
    pub(crate) size:    [u8; 257],
    /// Largest code of each length, pre-shifted to a 16 bit window.
    pub(crate) maxcode: [u32; 18],
    /// Offset from a code of length `l` to its symbol position.
    pub(crate) delta:   [i32; 17]
}

impl Default for HuffmanTable {
    fn default() -> Self {
        HuffmanTable {
            // 255 flags a code the acceleration table cannot resolve
            fast:    [255; 1 << FAST_BITS],
            code:    [0; 256],
            values:  [0; 256],
            size:    [0; 257],
            maxcode: [0; 18],
            delta:   [0; 17]
        }
    }
}

impl HuffmanTable {
    /// Build a table from the DHT code-length histogram and symbol
    /// list.
    pub fn new(counts: &[u8; 16], values: [u8; 256]) -> Result<HuffmanTable, DecodeErrors> {
        let mut table = HuffmanTable {
            values,
            ..HuffmanTable::default()
        };
        table.build(counts)?;
        Ok(table)
    }

    /// Generate code sizes, canonical codes and the acceleration
    /// table, per the table construction procedure of the standard.
    fn build(&mut self, counts: &[u8; 16]) -> Result<(), DecodeErrors> {
        // expand the histogram into one size per symbol position
        let mut k = 0;

        for i in 0..16 {
            for _ in 0..counts[i] {
                if k >= 256 {
                    return Err(DecodeErrors::HuffmanDecode(
                        "Huffman table with more than 256 symbols".to_string()
                    ));
                }
                self.size[k] = (i + 1) as u8;
                k += 1;
            }
        }
        self.size[k] = 0;

        // assign consecutive codes within each length
        let mut code = 0_u32;
        let mut pos = 0;

        for length in 1..=16_usize {
            // offset from a code of this length to its symbol position
            self.delta[length] = pos as i32 - code as i32;

            while usize::from(self.size[pos]) == length {
                self.code[pos] = code as u16;
                code += 1;
                pos += 1;
            }

            if code > (1 << length) {
                return Err(DecodeErrors::HuffmanDecode(
                    "Bad Huffman code lengths, table overflows".to_string()
                ));
            }

            // largest code of this length, pre-shifted so decoding can
            // compare against a 16 bit stream window directly
            self.maxcode[length] = code << (16 - length);
            code <<= 1;
        }
        self.maxcode[17] = u32::MAX;

        // acceleration table for codes short enough to resolve in one
        // peek
        for i in 0..pos {
            let length = usize::from(self.size[i]);

            if length <= FAST_BITS {
                let start = (usize::from(self.code[i])) << (FAST_BITS - length);
                let count = 1 << (FAST_BITS - length);

                for j in 0..count {
                    self.fast[start + j] = i as u8;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_codes_are_assigned_in_order() {
        // two codes of length one and two is impossible; one code of
        // length 1, two of length 2 is the canonical {0, 10, 11}
        let mut counts = [0_u8; 16];
        counts[0] = 1;
        counts[1] = 2;

        let mut values = [0_u8; 256];
        values[..3].copy_from_slice(&[7, 8, 9]);

        let table = HuffmanTable::new(&counts, values).unwrap();

        assert_eq!(table.code[0], 0b0);
        assert_eq!(table.code[1], 0b10);
        assert_eq!(table.code[2], 0b11);

        // every one of the 1 << FAST_BITS entries resolves for such a
        // short table
        assert!(table.fast.iter().all(|f| *f != 255));
    }

    #[test]
    fn overfull_table_is_rejected() {
        // six codes of length two cannot exist
        let mut counts = [0_u8; 16];
        counts[1] = 6;

        assert!(HuffmanTable::new(&counts, [0; 256]).is_err());
    }
}
