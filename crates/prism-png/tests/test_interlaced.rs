/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Adam7 de-interlacing against hand-assembled pass data.
use prism_core::dynamic::DynamicImage;
use prism_png::PngDecoder;

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

const X_START: [usize; 7] = [0, 4, 0, 2, 0, 1, 0];
const Y_START: [usize; 7] = [0, 0, 4, 0, 2, 0, 1];
const X_STEP: [usize; 7] = [8, 8, 4, 4, 2, 2, 1];
const Y_STEP: [usize; 7] = [8, 8, 8, 4, 4, 2, 2];

fn crc(data: &[u8]) -> u32 {
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

fn chunk(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();

    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(payload);

    let mut hashed = kind.to_vec();
    hashed.extend_from_slice(payload);
    out.extend_from_slice(&crc(&hashed).to_be_bytes());

    out
}

/// Serialize an 8-bit greyscale raster into the seven Adam7 pass
/// streams, each scanline filter zero.
fn interlace(pixels: &[u8], width: usize, height: usize) -> (Vec<u8>, Vec<usize>) {
    let mut raw = Vec::new();
    let mut pass_counts = Vec::new();

    for p in 0..7 {
        let pass_w = (width.saturating_sub(X_START[p]) + X_STEP[p] - 1) / X_STEP[p];
        let pass_h = (height.saturating_sub(Y_START[p]) + Y_STEP[p] - 1) / Y_STEP[p];

        pass_counts.push(pass_w * pass_h);

        if pass_w == 0 || pass_h == 0 {
            continue;
        }

        for j in 0..pass_h {
            raw.push(0); // filter byte

            for i in 0..pass_w {
                let x = X_START[p] + i * X_STEP[p];
                let y = Y_START[p] + j * Y_STEP[p];

                raw.push(pixels[y * width + x]);
            }
        }
    }
    (raw, pass_counts)
}

fn interlaced_grey_png(pixels: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&(width as u32).to_be_bytes());
    payload.extend_from_slice(&(height as u32).to_be_bytes());
    payload.extend_from_slice(&[8, 0, 0, 0, 1]); // depth 8, grey, Adam7

    let (raw, _) = interlace(pixels, width, height);
    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&raw, 6);

    let mut file = SIGNATURE.to_vec();
    file.extend_from_slice(&chunk(b"IHDR", &payload));
    file.extend_from_slice(&chunk(b"IDAT", &compressed));
    file.extend_from_slice(&chunk(b"IEND", &[]));
    file
}

fn decode_grey(file: &[u8]) -> Vec<u8> {
    match PngDecoder::new(file).decode().unwrap() {
        DynamicImage::Luma8(image) => image.into_raw(),
        other => panic!("expected Y8 output, got {other:?}")
    }
}

#[test]
fn eight_by_eight_passes_cover_every_pixel_once() {
    let pixels: Vec<u8> = (0..64).collect();

    // the textbook pass sizes for an 8x8 grid
    let (_, counts) = interlace(&pixels, 8, 8);
    assert_eq!(counts, vec![1, 1, 2, 4, 8, 16, 32]);
    assert_eq!(counts.iter().sum::<usize>(), 64);

    let file = interlaced_grey_png(&pixels, 8, 8);
    assert_eq!(decode_grey(&file), pixels);
}

#[test]
fn odd_dimensions_deinterlace_correctly() {
    // non multiples of eight leave some passes ragged or empty
    for (width, height) in [(1, 1), (3, 2), (5, 9), (13, 7), (16, 17)] {
        let pixels: Vec<u8> = (0..width * height).map(|v| (v * 7 % 251) as u8).collect();

        let file = interlaced_grey_png(&pixels, width, height);
        assert_eq!(
            decode_grey(&file),
            pixels,
            "mismatch at {width}x{height}"
        );
    }
}

#[test]
fn interlaced_matches_sequential_decode() {
    let width = 12;
    let height = 10;
    let pixels: Vec<u8> = (0..width * height).map(|v| (v * 31 % 256) as u8).collect();

    // sequential flavour of the same raster
    let mut payload = Vec::new();
    payload.extend_from_slice(&(width as u32).to_be_bytes());
    payload.extend_from_slice(&(height as u32).to_be_bytes());
    payload.extend_from_slice(&[8, 0, 0, 0, 0]);

    let mut raw = Vec::new();
    for row in pixels.chunks_exact(width) {
        raw.push(0);
        raw.extend_from_slice(row);
    }
    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&raw, 6);

    let mut sequential = SIGNATURE.to_vec();
    sequential.extend_from_slice(&chunk(b"IHDR", &payload));
    sequential.extend_from_slice(&chunk(b"IDAT", &compressed));
    sequential.extend_from_slice(&chunk(b"IEND", &[]));

    let interlaced = interlaced_grey_png(&pixels, width, height);

    assert_eq!(decode_grey(&sequential), decode_grey(&interlaced));
}
