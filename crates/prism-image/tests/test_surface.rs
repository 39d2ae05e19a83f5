/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! End-to-end flows through the format-agnostic surface.
use prism_core::dynamic::DynamicImage;
use prism_core::image::Image;
use prism_core::pixel::{Luma, Rgb, YCbCr, Y8, RGB8, RGBA8, YCbCr8};
use prism_image::{
    decode, decode_png_as, encode_jpeg, encode_png, ImageErrors, ImageFormat
};

#[test]
fn png_bytes_are_sniffed_and_decoded() {
    let image: Image<RGB8> = Image::from_fn(5, 4, |x, y| Rgb([x as u8, y as u8, 7]));
    let bytes = encode_png(&image);

    assert_eq!(ImageFormat::guess_format(&bytes), ImageFormat::Png);

    match decode(&bytes).unwrap() {
        DynamicImage::Rgb8(back) => assert_eq!(back, image),
        other => panic!("expected RGB8 output, got {other:?}")
    }
}

#[test]
fn jpeg_bytes_are_sniffed_and_decoded() {
    let image: Image<YCbCr8> = Image::from_fn(16, 16, |_, _| YCbCr([200, 128, 128]));
    let bytes = encode_jpeg(&image, 85);

    assert_eq!(ImageFormat::guess_format(&bytes), ImageFormat::Jpeg);

    match decode(&bytes).unwrap() {
        DynamicImage::YCbCr8(back) => {
            assert_eq!(back.dimensions(), (16, 16));
            for pixel in back.pixels() {
                assert!((i32::from(pixel.0[0]) - 200).abs() <= 4);
            }
        }
        other => panic!("expected YCbCr8 output, got {other:?}")
    }
}

#[test]
fn typed_decoding_promotes_along_the_dag() {
    let image: Image<Y8> = Image::from_fn(3, 3, |x, _| Luma([x as u8 * 90]));
    let bytes = encode_png(&image);

    // greyscale file read as RGBA: every channel replicated, opaque
    let rgba = decode_png_as::<RGBA8>(&bytes).unwrap();
    assert_eq!(rgba.pixel_at(2, 0).0, [180, 180, 180, 255]);

    // identity request works too
    let grey = decode_png_as::<Y8>(&bytes).unwrap();
    assert_eq!(grey, image);
}

#[test]
fn narrowing_requests_are_refused() {
    let image: Image<RGB8> = Image::from_fn(2, 2, |_, _| Rgb([1, 2, 3]));
    let bytes = encode_png(&image);

    match decode_png_as::<Y8>(&bytes) {
        Err(ImageErrors::IncompatiblePromotion(_, _)) => {}
        other => panic!("expected IncompatiblePromotion, got {other:?}")
    }
}

#[test]
fn unknown_formats_are_refused() {
    match decode(b"GIF89a trailing data") {
        Err(ImageErrors::UnknownFormat) => {}
        other => panic!("expected UnknownFormat, got {other:?}")
    }
}
