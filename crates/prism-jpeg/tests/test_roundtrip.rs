/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Encoder → decoder round trips and their quality dependent error
//! bounds.
use prism_core::dynamic::DynamicImage;
use prism_core::image::Image;
use prism_core::pixel::{YCbCr, YCbCr8};
use prism_jpeg::{JpegDecoder, JpegEncoder};

fn decode_ycbcr(bytes: &[u8]) -> Image<YCbCr8> {
    match JpegDecoder::new(bytes).decode().unwrap() {
        DynamicImage::YCbCr8(image) => image,
        other => panic!("expected YCbCr8 output, got {other:?}")
    }
}

/// Largest luma deviation the round trip may introduce at a given
/// quality.
fn luma_tolerance(quality: u8) -> i32 {
    (100 - i32::from(quality)) / 3 + 1
}

#[test]
fn uniform_grey_image_survives_at_quality_75() {
    let image: Image<YCbCr8> = Image::from_fn(16, 16, |_, _| YCbCr([128, 128, 128]));

    let bytes = JpegEncoder::new(&image, 75).encode();

    assert_eq!(&bytes[..2], &[0xff, 0xd8]);
    assert_eq!(&bytes[bytes.len() - 2..], &[0xff, 0xd9]);

    let back = decode_ycbcr(&bytes);
    assert_eq!(back.dimensions(), (16, 16));

    for pixel in back.pixels() {
        let y = i32::from(pixel.0[0]);
        assert!((126..=130).contains(&y), "luma {y} too far from 128");
    }
}

#[test]
fn smooth_gradient_round_trips_within_tolerance() {
    for quality in [50_u8, 75, 90, 95] {
        let image: Image<YCbCr8> = Image::from_fn(32, 32, |x, y| {
            let luma = (x * 6 + y * 2) as u8;
            YCbCr([luma, 128, 128])
        });

        let bytes = JpegEncoder::new(&image, quality).encode();
        let back = decode_ycbcr(&bytes);

        let tolerance = luma_tolerance(quality);

        for y in 0..32 {
            for x in 0..32 {
                let original = i32::from(image.pixel_at(x, y).0[0]);
                let decoded = i32::from(back.pixel_at(x, y).0[0]);

                assert!(
                    (original - decoded).abs() <= tolerance,
                    "quality {quality}: ({x},{y}) {original} vs {decoded}"
                );
            }
        }
    }
}

#[test]
fn odd_dimensions_encode_with_edge_replication() {
    // 13x11 forces partial MCUs on both axes
    let image: Image<YCbCr8> = Image::from_fn(13, 11, |x, y| {
        YCbCr([(x * 9 + y * 8) as u8, 128, 128])
    });

    let bytes = JpegEncoder::new(&image, 90).encode();
    let back = decode_ycbcr(&bytes);

    assert_eq!(back.dimensions(), (13, 11));

    let tolerance = luma_tolerance(90);
    for y in 0..11 {
        for x in 0..13 {
            let original = i32::from(image.pixel_at(x, y).0[0]);
            let decoded = i32::from(back.pixel_at(x, y).0[0]);
            assert!((original - decoded).abs() <= tolerance);
        }
    }
}

#[test]
fn chroma_survives_coarsely() {
    // constant strong chroma; 4:2:0 averaging of a constant is exact,
    // quantization error stays small
    let image: Image<YCbCr8> = Image::from_fn(16, 16, |_, _| YCbCr([100, 90, 160]));

    let bytes = JpegEncoder::new(&image, 90).encode();
    let back = decode_ycbcr(&bytes);

    for pixel in back.pixels() {
        assert!((i32::from(pixel.0[1]) - 90).abs() <= 4);
        assert!((i32::from(pixel.0[2]) - 160).abs() <= 4);
    }
}
