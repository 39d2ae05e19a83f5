/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Encode → decode identity for every pixel type the encoder
//! supports.
use nanorand::Rng;
use prism_core::dynamic::DynamicImage;
use prism_core::image::Image;
use prism_core::pixel::{Luma, Rgb, Rgba, Y8, RGB8, RGBA8};
use prism_png::{PngDecoder, PngEncoder};

#[test]
fn single_rgb_pixel_round_trips() {
    let image: Image<RGB8> = Image::from_fn(1, 1, |_, _| Rgb([10, 20, 30]));

    let bytes = PngEncoder::new(&image).encode();

    // emitted stream starts with the eight byte signature
    assert_eq!(&bytes[..8], &[137, 80, 78, 71, 13, 10, 26, 10]);

    match PngDecoder::new(&bytes).decode().unwrap() {
        DynamicImage::Rgb8(back) => {
            assert_eq!(back.pixel_at(0, 0), Rgb([10, 20, 30]));
        }
        other => panic!("expected RGB8 output, got {other:?}")
    }
}

#[test]
fn random_luma_round_trips() {
    let mut rng = nanorand::WyRand::new_seed(0x5eed);

    let image: Image<Y8> = Image::from_fn(63, 41, |_, _| Luma([rng.generate::<u8>()]));
    let bytes = PngEncoder::new(&image).encode();

    match PngDecoder::new(&bytes).decode().unwrap() {
        DynamicImage::Luma8(back) => assert_eq!(back, image),
        other => panic!("expected Y8 output, got {other:?}")
    }
}

#[test]
fn random_rgb_round_trips() {
    let mut rng = nanorand::WyRand::new_seed(0xbeef);

    let image: Image<RGB8> = Image::from_fn(40, 29, |_, _| {
        Rgb([rng.generate(), rng.generate(), rng.generate()])
    });
    let bytes = PngEncoder::new(&image).encode();

    match PngDecoder::new(&bytes).decode().unwrap() {
        DynamicImage::Rgb8(back) => assert_eq!(back, image),
        other => panic!("expected RGB8 output, got {other:?}")
    }
}

#[test]
fn random_rgba_round_trips() {
    let mut rng = nanorand::WyRand::new_seed(0xabcd);

    let image: Image<RGBA8> = Image::from_fn(17, 33, |_, _| {
        Rgba([
            rng.generate(),
            rng.generate(),
            rng.generate(),
            rng.generate()
        ])
    });
    let bytes = PngEncoder::new(&image).encode();

    match PngDecoder::new(&bytes).decode().unwrap() {
        DynamicImage::Rgba8(back) => assert_eq!(back, image),
        other => panic!("expected RGBA8 output, got {other:?}")
    }
}

#[test]
fn every_chunk_crc_in_encoder_output_validates() {
    let image: Image<Y8> = Image::from_fn(16, 16, |x, y| Luma([(x ^ y) as u8]));
    let bytes = PngEncoder::new(&image).encode();

    // walk the chunk stream by hand, checking each crc with a
    // bitwise reference implementation
    let mut pos = 8;

    while pos < bytes.len() {
        let length = u32::from_be_bytes(bytes[pos..pos + 4].try_into().unwrap()) as usize;
        let crc_offset = pos + 8 + length;

        let stored =
            u32::from_be_bytes(bytes[crc_offset..crc_offset + 4].try_into().unwrap());
        let computed = reference_crc(&bytes[pos + 4..crc_offset]);

        assert_eq!(stored, computed, "chunk at offset {pos}");

        pos = crc_offset + 4;
    }
}

/// Bit-at-a-time CRC-32, the definition straight out of the standard.
fn reference_crc(data: &[u8]) -> u32 {
    let mut crc = u32::MAX;

    for byte in data {
        crc ^= u32::from(*byte);

        for _ in 0..8 {
            crc = if crc & 1 != 0 {
                0xEDB8_8320 ^ (crc >> 1)
            } else {
                crc >> 1
            };
        }
    }
    !crc
}
