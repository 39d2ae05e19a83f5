/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The format-agnostic surface of the prism codecs.
//!
//! This crate stitches the per-format decoders together behind one
//! entry point: hand [`decode`] a byte stream and get back a
//! [`DynamicImage`](prism_core::dynamic::DynamicImage) regardless of
//! which supported format the bytes turn out to be.
//!
//! ```no_run
//! let bytes = std::fs::read("image.png").unwrap();
//! let image = prism_image::decode(&bytes).unwrap();
//!
//! println!("{:?}, {} x {}", image.colorspace(), image.width(), image.height());
//! ```
//!
//! Typed decoding and the per-format encoders are re-exported next to
//! it, see [`decode_png_as`], [`encode_png`] and [`encode_jpeg`].
pub use codecs::{
    decode, decode_jpeg, decode_png, decode_png_as, decode_with_options, encode_jpeg, encode_png,
    ImageFormat
};
pub use errors::ImageErrors;
// the core types callers need to work with results
pub use prism_core::dynamic::{DynamicImage, FromDynamic};
pub use prism_core::image::Image;
pub use prism_core::options::DecoderOptions;
pub use prism_core::pixel;

mod codecs;
mod errors;
