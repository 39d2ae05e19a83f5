/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A PNG decoder and encoder.
//!
//! The decoder handles every standard color type at bit depths
//! 1, 2, 4, 8 and 16, both sequential and Adam7 interlaced streams,
//! and validates chunk CRCs. Samples below eight bits are widened to
//! eight during decoding and 16-bit samples are folded down to eight,
//! so decoded images always carry `u8` components.
//!
//! The encoder writes 8-bit greyscale, RGB and RGBA images with no
//! interlacing and filter type zero on every scanline.
//!
//! # Decoding
//! ```no_run
//! use prism_png::PngDecoder;
//!
//! let data = &[];
//! let image = PngDecoder::new(data).decode().unwrap();
//! println!("{} x {}", image.width(), image.height());
//! ```
//!
//! # Encoding
//! ```
//! use prism_core::image::Image;
//! use prism_core::pixel::{Rgb, RGB8};
//! use prism_png::PngEncoder;
//!
//! let image: Image<RGB8> = Image::from_fn(4, 4, |x, _| Rgb([x as u8, 0, 0]));
//! let bytes = PngEncoder::new(&image).encode();
//! ```
pub use decoder::{PngDecoder, PngInfo};
pub use encoder::{PngEncodable, PngEncoder};
pub use enums::{FilterMethod, InterlaceMethod, PngColor};

mod constants;
mod crc;
mod decoder;
mod encoder;
mod enums;
pub mod error;
mod filters;
mod headers;
