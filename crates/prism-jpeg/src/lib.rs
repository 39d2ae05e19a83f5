/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A baseline JPEG decoder and encoder.
//!
//! The decoder handles baseline sequential DCT streams with Huffman
//! coding: 8-bit samples, chroma sub-sampling with whole number
//! ratios, and restart intervals. Greyscale files decode to
//! `Image<Y8>`, three component files to `Image<YCbCr8>`; progressive
//! and arithmetic coded files are rejected.
//!
//! The encoder writes three component 4:2:0 streams at a caller
//! chosen quality using the default Annex K quantization and Huffman
//! tables.
//!
//! # Decoding
//! ```no_run
//! use prism_jpeg::JpegDecoder;
//!
//! let data = std::fs::read("image.jpg").unwrap();
//! let mut decoder = JpegDecoder::new(&data);
//! let image = decoder.decode().unwrap();
//! println!("{} x {}", image.width(), image.height());
//! ```
//!
//! # Encoding
//! ```
//! use prism_core::image::Image;
//! use prism_core::pixel::{YCbCr, YCbCr8};
//! use prism_jpeg::JpegEncoder;
//!
//! let image: Image<YCbCr8> = Image::from_fn(32, 32, |_, _| YCbCr([90, 128, 128]));
//! let bytes = JpegEncoder::new(&image, 80).encode();
//! ```
pub use decoder::{ImageInfo, JpegDecoder};
pub use encoder::JpegEncoder;
pub use errors::{DecodeErrors, UnsupportedSchemes};
pub use misc::SOFMarkers;

mod bitstream;
mod components;
mod decoder;
mod encoder;
pub mod errors;
mod headers;
mod huffman;
mod idct;
mod marker;
mod misc;
