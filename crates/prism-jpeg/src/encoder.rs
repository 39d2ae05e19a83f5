/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The baseline JPEG encoder.
//!
//! Emits a sequential DCT stream with three YCbCr components in
//! 4:2:0 sampling: luma at 2×2, both chroma components at 1×1. The
//! quantization tables are the Annex K defaults scaled by the caller's
//! quality, entropy coding uses the Annex K default Huffman tables.
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use std::f32::consts::{FRAC_1_SQRT_2, PI};

use log::trace;
use prism_core::bytestream::ByteWriter;
use prism_core::image::Image;
use prism_core::pixel::YCbCr8;

use crate::misc::{UN_ZIGZAG, ZIGZAG};

/// Annex K table K.1, the default luminance quantization table,
/// in natural raster order.
#[rustfmt::skip]
const LUMA_QUANT_TABLE: [i32; 64] = [
    16, 11, 10, 16,  24,  40,  51,  61,
    12, 12, 14, 19,  26,  58,  60,  55,
    14, 13, 16, 24,  40,  57,  69,  56,
    14, 17, 22, 29,  51,  87,  80,  62,
    18, 22, 37, 56,  68, 109, 103,  77,
    24, 35, 55, 64,  81, 104, 113,  92,
    49, 64, 78, 87, 103, 121, 120, 101,
    72, 92, 95, 98, 112, 100, 103,  99,
];

/// Annex K table K.2, the default chrominance quantization table,
/// in natural raster order.
#[rustfmt::skip]
const CHROMA_QUANT_TABLE: [i32; 64] = [
    17, 18, 24, 47, 99, 99, 99, 99,
    18, 21, 26, 66, 99, 99, 99, 99,
    24, 26, 56, 99, 99, 99, 99, 99,
    47, 66, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
];

// Annex K default Huffman specifications: sixteen code length counts
// followed by the symbols in code order.

const DC_LUMA_BITS: [u8; 16] = [0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0];
const DC_LUMA_VALUES: [u8; 12] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

const DC_CHROMA_BITS: [u8; 16] = [0, 3, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0];
const DC_CHROMA_VALUES: [u8; 12] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

const AC_LUMA_BITS: [u8; 16] = [0, 2, 1, 3, 3, 2, 4, 3, 5, 5, 4, 4, 0, 0, 1, 0x7d];
#[rustfmt::skip]
const AC_LUMA_VALUES: [u8; 162] = [
    0x01, 0x02, 0x03, 0x00, 0x04, 0x11, 0x05, 0x12,
    0x21, 0x31, 0x41, 0x06, 0x13, 0x51, 0x61, 0x07,
    0x22, 0x71, 0x14, 0x32, 0x81, 0x91, 0xa1, 0x08,
    0x23, 0x42, 0xb1, 0xc1, 0x15, 0x52, 0xd1, 0xf0,
    0x24, 0x33, 0x62, 0x72, 0x82, 0x09, 0x0a, 0x16,
    0x17, 0x18, 0x19, 0x1a, 0x25, 0x26, 0x27, 0x28,
    0x29, 0x2a, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39,
    0x3a, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49,
    0x4a, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59,
    0x5a, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69,
    0x6a, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79,
    0x7a, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89,
    0x8a, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98,
    0x99, 0x9a, 0xa2, 0xa3, 0xa4, 0xa5, 0xa6, 0xa7,
    0xa8, 0xa9, 0xaa, 0xb2, 0xb3, 0xb4, 0xb5, 0xb6,
    0xb7, 0xb8, 0xb9, 0xba, 0xc2, 0xc3, 0xc4, 0xc5,
    0xc6, 0xc7, 0xc8, 0xc9, 0xca, 0xd2, 0xd3, 0xd4,
    0xd5, 0xd6, 0xd7, 0xd8, 0xd9, 0xda, 0xe1, 0xe2,
    0xe3, 0xe4, 0xe5, 0xe6, 0xe7, 0xe8, 0xe9, 0xea,
    0xf1, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, 0xf8,
    0xf9, 0xfa,
];

const AC_CHROMA_BITS: [u8; 16] = [0, 2, 1, 2, 4, 4, 3, 4, 7, 5, 4, 4, 0, 1, 2, 0x77];
#[rustfmt::skip]
const AC_CHROMA_VALUES: [u8; 162] = [
    0x00, 0x01, 0x02, 0x03, 0x11, 0x04, 0x05, 0x21,
    0x31, 0x06, 0x12, 0x41, 0x51, 0x07, 0x61, 0x71,
    0x13, 0x22, 0x32, 0x81, 0x08, 0x14, 0x42, 0x91,
    0xa1, 0xb1, 0xc1, 0x09, 0x23, 0x33, 0x52, 0xf0,
    0x15, 0x62, 0x72, 0xd1, 0x0a, 0x16, 0x24, 0x34,
    0xe1, 0x25, 0xf1, 0x17, 0x18, 0x19, 0x1a, 0x26,
    0x27, 0x28, 0x29, 0x2a, 0x35, 0x36, 0x37, 0x38,
    0x39, 0x3a, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48,
    0x49, 0x4a, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58,
    0x59, 0x5a, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68,
    0x69, 0x6a, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78,
    0x79, 0x7a, 0x82, 0x83, 0x84, 0x85, 0x86, 0x87,
    0x88, 0x89, 0x8a, 0x92, 0x93, 0x94, 0x95, 0x96,
    0x97, 0x98, 0x99, 0x9a, 0xa2, 0xa3, 0xa4, 0xa5,
    0xa6, 0xa7, 0xa8, 0xa9, 0xaa, 0xb2, 0xb3, 0xb4,
    0xb5, 0xb6, 0xb7, 0xb8, 0xb9, 0xba, 0xc2, 0xc3,
    0xc4, 0xc5, 0xc6, 0xc7, 0xc8, 0xc9, 0xca, 0xd2,
    0xd3, 0xd4, 0xd5, 0xd6, 0xd7, 0xd8, 0xd9, 0xda,
    0xe2, 0xe3, 0xe4, 0xe5, 0xe6, 0xe7, 0xe8, 0xe9,
    0xea, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, 0xf8,
    0xf9, 0xfa,
];

/// Codes and code sizes per symbol, derived from an Annex K table
/// specification.
struct HuffmanEncodingTable {
    codes: [u16; 256],
    sizes: [u8; 256]
}

impl HuffmanEncodingTable {
    fn build(bits: &[u8; 16], values: &[u8]) -> HuffmanEncodingTable {
        let mut table = HuffmanEncodingTable {
            codes: [0; 256],
            sizes: [0; 256]
        };

        let mut code = 0_u16;
        let mut k = 0;

        for length in 1..=16_u8 {
            for _ in 0..bits[usize::from(length) - 1] {
                let symbol = usize::from(values[k]);

                table.codes[symbol] = code;
                table.sizes[symbol] = length;

                code += 1;
                k += 1;
            }
            code <<= 1;
        }
        table
    }
}

/// An MSB first bit sink that performs the 0xFF -> 0xFF00 byte
/// stuffing of entropy coded segments.
struct BitWriter {
    out:    Vec<u8>,
    buffer: u32,
    count:  u8
}

impl BitWriter {
    fn new(out: Vec<u8>) -> BitWriter {
        BitWriter {
            out,
            buffer: 0,
            count: 0
        }
    }

    fn put_bits(&mut self, bits: u32, count: u8) {
        if count == 0 {
            return;
        }
        self.buffer = (self.buffer << count) | (bits & ((1 << count) - 1));
        self.count += count;

        while self.count >= 8 {
            let byte = (self.buffer >> (self.count - 8)) as u8;
            self.out.push(byte);

            if byte == 0xff {
                // stuff a zero so the byte cannot read as a marker
                self.out.push(0x00);
            }
            self.count -= 8;
        }
        self.buffer &= (1 << self.count) - 1;
    }

    fn put_symbol(&mut self, table: &HuffmanEncodingTable, symbol: usize) {
        self.put_bits(u32::from(table.codes[symbol]), table.sizes[symbol]);
    }

    /// Fill the trailing partial byte with one bits.
    fn pad_to_byte(&mut self) {
        if self.count > 0 {
            let pad = 8 - self.count;
            self.put_bits((1 << pad) - 1, pad);
        }
    }

    fn into_inner(self) -> Vec<u8> {
        self.out
    }
}

/// A baseline JPEG encoder over a borrowed YCbCr image.
///
/// ```
/// use prism_core::image::Image;
/// use prism_core::pixel::{YCbCr, YCbCr8};
/// use prism_jpeg::JpegEncoder;
///
/// let image: Image<YCbCr8> = Image::from_fn(16, 16, |_, _| YCbCr([128, 128, 128]));
/// let bytes = JpegEncoder::new(&image, 90).encode();
/// assert_eq!(&bytes[..2], &[0xff, 0xd8]);
/// ```
pub struct JpegEncoder<'a> {
    image:   &'a Image<YCbCr8>,
    quality: u8
}

impl<'a> JpegEncoder<'a> {
    /// Create an encoder writing at the given quality, `1..=100`.
    ///
    /// # Panics
    /// If either image dimension is zero or exceeds 65535.
    pub fn new(image: &'a Image<YCbCr8>, quality: u8) -> JpegEncoder<'a> {
        let (width, height) = image.dimensions();

        assert!(
            (1..=65535).contains(&width) && (1..=65535).contains(&height),
            "cannot encode a {width}x{height} image"
        );

        JpegEncoder { image, quality }
    }

    /// Encode the image, returning the complete JPEG byte stream.
    pub fn encode(&self) -> Vec<u8> {
        let (width, height) = self.image.dimensions();

        let luma_qt = scale_quant_table(&LUMA_QUANT_TABLE, self.quality);
        let chroma_qt = scale_quant_table(&CHROMA_QUANT_TABLE, self.quality);

        let dc_luma = HuffmanEncodingTable::build(&DC_LUMA_BITS, &DC_LUMA_VALUES);
        let ac_luma = HuffmanEncodingTable::build(&AC_LUMA_BITS, &AC_LUMA_VALUES);
        let dc_chroma = HuffmanEncodingTable::build(&DC_CHROMA_BITS, &DC_CHROMA_VALUES);
        let ac_chroma = HuffmanEncodingTable::build(&AC_CHROMA_BITS, &AC_CHROMA_VALUES);

        let mut writer = ByteWriter::with_capacity(width * height / 4 + 1024);

        self.write_headers(&mut writer, &luma_qt, &chroma_qt);

        // entropy coded segment
        let cosine = cosine_table();
        let mut bits = BitWriter::new(writer.into_inner());
        let mut dc_pred = [0_i32; 3];

        let mcus_x = (width + 15) / 16;
        let mcus_y = (height + 15) / 16;

        trace!("Encoding {} x {} MCUs at quality {}", mcus_x, mcus_y, self.quality);

        for mcu_y in 0..mcus_y {
            for mcu_x in 0..mcus_x {
                let x0 = mcu_x * 16;
                let y0 = mcu_y * 16;

                // four luma data units, row major inside the MCU
                for by in 0..2 {
                    for bx in 0..2 {
                        let block = self.extract_luma_block(x0 + bx * 8, y0 + by * 8);

                        encode_block(
                            &mut bits,
                            &block,
                            &cosine,
                            &luma_qt,
                            &dc_luma,
                            &ac_luma,
                            &mut dc_pred[0]
                        );
                    }
                }

                // one data unit per chroma component, each sample
                // averaging the 2x2 source block beneath it
                for channel in 1..3 {
                    let block = self.extract_chroma_block(channel, x0, y0);

                    encode_block(
                        &mut bits,
                        &block,
                        &cosine,
                        &chroma_qt,
                        &dc_chroma,
                        &ac_chroma,
                        &mut dc_pred[channel]
                    );
                }
            }
        }

        bits.pad_to_byte();

        let mut out = bits.into_inner();
        out.extend_from_slice(&[0xff, 0xd9]);
        out
    }

    fn write_headers(&self, writer: &mut ByteWriter, luma_qt: &[i32; 64], chroma_qt: &[i32; 64]) {
        let (width, height) = self.image.dimensions();

        // SOI
        writer.write_u16_be(0xffd8);

        // JFIF APP0, version 1.1, no density information
        writer.write_u16_be(0xffe0);
        writer.write_u16_be(16);
        writer.write_all(b"JFIF\0");
        writer.write_u8(1);
        writer.write_u8(1);
        writer.write_u8(0);
        writer.write_u16_be(1);
        writer.write_u16_be(1);
        writer.write_u8(0);
        writer.write_u8(0);

        write_dqt(writer, 0, luma_qt);
        write_dqt(writer, 1, chroma_qt);

        // SOF0: luma sampled 2x2, chroma 1x1 against it
        writer.write_u16_be(0xffc0);
        writer.write_u16_be(8 + 3 * 3);
        writer.write_u8(8);
        writer.write_u16_be(height as u16);
        writer.write_u16_be(width as u16);
        writer.write_u8(3);
        for (id, sampling, qt) in [(1, 0x22, 0), (2, 0x11, 1), (3, 0x11, 1)] {
            writer.write_u8(id);
            writer.write_u8(sampling);
            writer.write_u8(qt);
        }

        write_dht(writer, 0x00, &DC_LUMA_BITS, &DC_LUMA_VALUES);
        write_dht(writer, 0x10, &AC_LUMA_BITS, &AC_LUMA_VALUES);
        write_dht(writer, 0x01, &DC_CHROMA_BITS, &DC_CHROMA_VALUES);
        write_dht(writer, 0x11, &AC_CHROMA_BITS, &AC_CHROMA_VALUES);

        // SOS: component/table assignments then the fixed baseline
        // spectral parameters
        writer.write_u16_be(0xffda);
        writer.write_u16_be(6 + 2 * 3);
        writer.write_u8(3);
        for (id, tables) in [(1, 0x00), (2, 0x11), (3, 0x11)] {
            writer.write_u8(id);
            writer.write_u8(tables);
        }
        writer.write_u8(0);
        writer.write_u8(63);
        writer.write_u8(0);
    }

    /// Copy one 8×8 luma block, replicating edge pixels where the
    /// block hangs past the image.
    fn extract_luma_block(&self, x0: usize, y0: usize) -> [f32; 64] {
        let (width, height) = self.image.dimensions();
        let raw = self.image.as_raw();

        let mut block = [0_f32; 64];

        for j in 0..8 {
            let sy = (y0 + j).min(height - 1);

            for i in 0..8 {
                let sx = (x0 + i).min(width - 1);

                block[j * 8 + i] = f32::from(raw[(sy * width + sx) * 3]) - 128.0;
            }
        }
        block
    }

    /// Copy one 8×8 chroma block covering a whole 16×16 MCU; each
    /// output sample averages the 2×2 source block beneath it, edge
    /// pixels replicated.
    fn extract_chroma_block(&self, channel: usize, x0: usize, y0: usize) -> [f32; 64] {
        let (width, height) = self.image.dimensions();
        let raw = self.image.as_raw();

        let mut block = [0_f32; 64];

        for j in 0..8 {
            for i in 0..8 {
                let mut sum = 0_u32;

                for dj in 0..2 {
                    for di in 0..2 {
                        let sx = (x0 + i * 2 + di).min(width - 1);
                        let sy = (y0 + j * 2 + dj).min(height - 1);

                        sum += u32::from(raw[(sy * width + sx) * 3 + channel]);
                    }
                }
                block[j * 8 + i] = (sum as f32) / 4.0 - 128.0;
            }
        }
        block
    }
}

/// Scale an Annex K base table by the quality setting, clamping each
/// entry into `1..=255`.
fn scale_quant_table(base: &[i32; 64], quality: u8) -> [i32; 64] {
    let quality = i32::from(quality.clamp(1, 100));

    let scale = if quality < 50 {
        5000 / quality
    } else {
        200 - 2 * quality
    };

    let mut table = [0_i32; 64];

    for (out, entry) in table.iter_mut().zip(base.iter()) {
        *out = ((entry * scale + 50) / 100).clamp(1, 255);
    }
    table
}

fn write_dqt(writer: &mut ByteWriter, destination: u8, table: &[i32; 64]) {
    writer.write_u16_be(0xffdb);
    writer.write_u16_be(2 + 1 + 64);
    // 8-bit precision, destination in the low nibble
    writer.write_u8(destination);

    for k in 0..64 {
        writer.write_u8(table[UN_ZIGZAG[k]] as u8);
    }
}

fn write_dht(writer: &mut ByteWriter, class_destination: u8, bits: &[u8; 16], values: &[u8]) {
    writer.write_u16_be(0xffc4);
    writer.write_u16_be(2 + 1 + 16 + values.len() as u16);
    writer.write_u8(class_destination);
    writer.write_all(bits);
    writer.write_all(values);
}

/// Cosine basis `cos((2x + 1) u π / 16)` used by both DCT passes.
fn cosine_table() -> [[f32; 8]; 8] {
    let mut table = [[0_f32; 8]; 8];

    for (x, row) in table.iter_mut().enumerate() {
        for (u, value) in row.iter_mut().enumerate() {
            *value = ((2 * x + 1) as f32 * u as f32 * PI / 16.0).cos();
        }
    }
    table
}

/// Separable forward DCT of one level shifted block, rounded to
/// integer coefficients.
fn forward_dct(samples: &[f32; 64], cosine: &[[f32; 8]; 8]) -> [i32; 64] {
    let normalize = |u: usize| if u == 0 { FRAC_1_SQRT_2 } else { 1.0 };

    // rows
    let mut tmp = [0_f32; 64];

    for y in 0..8 {
        for u in 0..8 {
            let mut sum = 0.0;

            for x in 0..8 {
                sum += samples[y * 8 + x] * cosine[x][u];
            }
            tmp[y * 8 + u] = sum * 0.5 * normalize(u);
        }
    }

    // columns
    let mut out = [0_i32; 64];

    for u in 0..8 {
        for v in 0..8 {
            let mut sum = 0.0;

            for y in 0..8 {
                sum += tmp[y * 8 + u] * cosine[y][v];
            }
            out[v * 8 + u] = (sum * 0.5 * normalize(v)).round() as i32;
        }
    }
    out
}

/// The magnitude category of a coefficient and its appended bits.
#[inline]
fn magnitude(value: i32) -> (usize, u32) {
    let size = (32 - value.unsigned_abs().leading_zeros()) as usize;

    let bits = if value >= 0 {
        value as u32
    } else {
        // negative values append the low bits of value - 1
        (value - 1) as u32 & ((1 << size) - 1)
    };

    (size, bits)
}

/// Transform, quantize and entropy code one data unit.
fn encode_block(
    bits: &mut BitWriter, block: &[f32; 64], cosine: &[[f32; 8]; 8], qt: &[i32; 64],
    dc_table: &HuffmanEncodingTable, ac_table: &HuffmanEncodingTable, dc_pred: &mut i32
) {
    let dct = forward_dct(block, cosine);

    // quantize, scattering straight into zig-zag order
    let mut coeffs = [0_i32; 64];

    for natural in 0..64 {
        coeffs[ZIGZAG[natural]] = round_div(dct[natural], qt[natural]);
    }

    // DC is coded as the difference against the running predictor
    let diff = coeffs[0] - *dc_pred;
    *dc_pred = coeffs[0];

    let (size, value_bits) = magnitude(diff);
    bits.put_symbol(dc_table, size);
    bits.put_bits(value_bits, size as u8);

    // AC: (run of zeros, category) symbols with the value bits
    // appended; 0xF0 stands for sixteen zeros, 0x00 ends the block
    let mut run = 0_usize;

    for &coeff in &coeffs[1..] {
        if coeff == 0 {
            run += 1;
            continue;
        }

        while run >= 16 {
            bits.put_symbol(ac_table, 0xf0);
            run -= 16;
        }

        let (size, value_bits) = magnitude(coeff);
        bits.put_symbol(ac_table, (run << 4) | size);
        bits.put_bits(value_bits, size as u8);

        run = 0;
    }

    if run > 0 {
        bits.put_symbol(ac_table, 0x00);
    }
}

/// Round-half-up division used during quantization, symmetric around
/// zero.
#[inline]
fn round_div(value: i32, divisor: i32) -> i32 {
    if value >= 0 {
        (value + divisor / 2) / divisor
    } else {
        -((-value + divisor / 2) / divisor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_scaling_matches_the_formula() {
        // quality 50 is the base table itself
        assert_eq!(scale_quant_table(&LUMA_QUANT_TABLE, 50), LUMA_QUANT_TABLE);

        // quality 100 collapses every entry to 1
        assert!(scale_quant_table(&LUMA_QUANT_TABLE, 100)
            .iter()
            .all(|v| *v == 1));

        // low qualities scale up and clamp at 255
        let coarse = scale_quant_table(&LUMA_QUANT_TABLE, 10);
        assert!(coarse.iter().all(|v| (1..=255).contains(v)));
        assert_eq!(coarse[63], 255);
    }

    #[test]
    fn dct_of_flat_block_is_dc_only() {
        let cosine = cosine_table();
        let block = [37.0_f32; 64];

        let dct = forward_dct(&block, &cosine);

        // DC carries 8x the mean, every AC coefficient vanishes
        assert_eq!(dct[0], 37 * 8);
        assert!(dct[1..].iter().all(|c| *c == 0));
    }

    #[test]
    fn magnitude_categories() {
        assert_eq!(magnitude(0), (0, 0));
        assert_eq!(magnitude(1), (1, 1));
        assert_eq!(magnitude(-1), (1, 0));
        assert_eq!(magnitude(5), (3, 5));
        // -5 appends the low three bits of -6
        assert_eq!(magnitude(-5), (3, 0b010));
        assert_eq!(magnitude(255), (8, 255));
    }

    #[test]
    fn bit_writer_stuffs_ff_bytes() {
        let mut writer = BitWriter::new(Vec::new());

        writer.put_bits(0xff, 8);
        writer.put_bits(0x01, 8);

        assert_eq!(writer.into_inner(), vec![0xff, 0x00, 0x01]);
    }

    #[test]
    fn bit_writer_pads_with_ones() {
        let mut writer = BitWriter::new(Vec::new());

        writer.put_bits(0b0, 1);
        writer.pad_to_byte();

        assert_eq!(writer.into_inner(), vec![0b0111_1111]);
    }
}
