/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The PNG encoder.
//!
//! Writes 8-bit greyscale, RGB and RGBA images as non-interlaced
//! streams with filter type zero on every scanline and a single
//! zlib-compressed IDAT chunk.
use prism_core::bytestream::ByteWriter;
use prism_core::image::Image;
use prism_core::pixel::{Pixel, RGB8, RGBA8, Y8};

use crate::constants::PNG_SIGNATURE;
use crate::crc::crc32_update;

/// Pixel types the encoder accepts, tied to their IHDR color type.
pub trait PngEncodable: Pixel<Subpixel = u8> {
    /// The color type byte written to IHDR.
    const COLOR_TYPE: u8;
}

impl PngEncodable for Y8 {
    const COLOR_TYPE: u8 = 0;
}

impl PngEncodable for RGB8 {
    const COLOR_TYPE: u8 = 2;
}

impl PngEncodable for RGBA8 {
    const COLOR_TYPE: u8 = 6;
}

/// A PNG encoder over a borrowed image.
pub struct PngEncoder<'a, P: PngEncodable> {
    image: &'a Image<P>
}

impl<'a, P: PngEncodable> PngEncoder<'a, P> {
    pub fn new(image: &'a Image<P>) -> PngEncoder<'a, P> {
        PngEncoder { image }
    }

    /// Encode the image, returning the complete PNG byte stream.
    pub fn encode(&self) -> Vec<u8> {
        let (width, height) = self.image.dimensions();
        let data = self.image.as_raw();
        let scanline_bytes = width * P::CHANNELS;

        let mut writer = ByteWriter::with_capacity(data.len() / 2 + 128);

        writer.write_u64_be(PNG_SIGNATURE);

        // IHDR: dimensions, depth 8, color type, compression 0,
        // filter method 0, no interlace
        let mut ihdr = ByteWriter::with_capacity(13);
        ihdr.write_u32_be(width as u32);
        ihdr.write_u32_be(height as u32);
        ihdr.write_u8(8);
        ihdr.write_u8(P::COLOR_TYPE);
        ihdr.write_u8(0);
        ihdr.write_u8(0);
        ihdr.write_u8(0);

        write_chunk(&mut writer, b"IHDR", &ihdr.into_inner());

        // every scanline gets a filter-zero byte before compression
        let mut filtered = Vec::with_capacity((scanline_bytes + 1) * height);

        for scanline in data.chunks_exact(scanline_bytes) {
            filtered.push(0);
            filtered.extend_from_slice(scanline);
        }

        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&filtered, 6);

        write_chunk(&mut writer, b"IDAT", &compressed);
        write_chunk(&mut writer, b"IEND", &[]);

        writer.into_inner()
    }
}

/// Write one chunk: length, type, payload and the CRC over
/// type || payload.
fn write_chunk(writer: &mut ByteWriter, chunk_type: &[u8; 4], data: &[u8]) {
    writer.write_u32_be(data.len() as u32);
    writer.write_all(chunk_type);
    writer.write_all(data);

    let crc = !crc32_update(crc32_update(u32::MAX, chunk_type), data);
    writer.write_u32_be(crc);
}

#[cfg(test)]
mod tests {
    use prism_core::pixel::Luma;

    use super::*;
    use crate::PngDecoder;

    #[test]
    fn encoded_stream_decodes_back() {
        let image: Image<Y8> = Image::from_fn(40, 10, |x, y| Luma([(x * y) as u8]));

        let bytes = PngEncoder::new(&image).encode();
        assert_eq!(&bytes[0..4], &[137, 80, 78, 71]);

        let decoded = PngDecoder::new(&bytes).decode().unwrap();
        match decoded {
            prism_core::dynamic::DynamicImage::Luma8(back) => assert_eq!(back, image),
            other => panic!("wrong pixel type {other:?}")
        }
    }
}
