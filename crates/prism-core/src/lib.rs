/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Core primitives shared by the prism image codecs.
//!
//! This crate carries the pieces every format crate needs:
//!
//! - A statically typed pixel model ([`Luma`](pixel::Luma),
//!   [`Rgb`](pixel::Rgb), [`Rgba`](pixel::Rgba), [`YCbCr`](pixel::YCbCr)
//!   and their aliases) together with lossless promotion along a fixed
//!   DAG and lossy RGB↔YCbCr conversion.
//! - [`Image<P>`](image::Image), a width × height raster over a flat
//!   interleaved component buffer, and [`DynamicImage`](dynamic::DynamicImage),
//!   the tagged union decoders return when the pixel type is only known
//!   at runtime.
//! - Endian-aware byte readers and writers used by the wire-format
//!   parsers.
//! - [`DecoderOptions`](options::DecoderOptions), the knobs shared by
//!   all decoders (dimension limits, strictness, checksum confirmation).
//!
//! No decoding lives here, see the `prism-png` and `prism-jpeg` crates
//! for the formats themselves.
pub mod bit_depth;
pub mod bytestream;
pub mod colorspace;
pub mod dynamic;
pub mod image;
pub mod options;
pub mod pixel;
