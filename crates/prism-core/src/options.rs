/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Global decoder options
//!
//! Shared knobs honored by every decoder in the family. The options
//! use a builder pattern, each setter consumes the options and returns
//! a modified copy.
//!
//! ```
//! use prism_core::options::DecoderOptions;
//!
//! let options = DecoderOptions::default()
//!     .set_strict_mode(true)
//!     .set_max_width(1 << 12);
//! assert!(options.strict_mode());
//! ```

/// The largest width/height accepted by default.
///
/// Keeps a hostile header from making us allocate the moon. Callers
/// with genuinely huge images can raise the limits.
const DEFAULT_MAX_DIMENSIONS: usize = 1 << 17;

/// Decoder options respected by all decoders in the prism family.
#[derive(Copy, Clone, Debug)]
pub struct DecoderOptions {
    max_width:             usize,
    max_height:            usize,
    strict_mode:           bool,
    png_confirm_crc:       bool,
    inflate_confirm_adler: bool
}

impl Default for DecoderOptions {
    fn default() -> Self {
        DecoderOptions {
            max_width:             DEFAULT_MAX_DIMENSIONS,
            max_height:            DEFAULT_MAX_DIMENSIONS,
            strict_mode:           false,
            png_confirm_crc:       true,
            inflate_confirm_adler: true
        }
    }
}

impl DecoderOptions {
    /// Maximum image width the decoder will accept.
    pub const fn max_width(&self) -> usize {
        self.max_width
    }

    /// Maximum image height the decoder will accept.
    pub const fn max_height(&self) -> usize {
        self.max_height
    }

    /// Whether decoders should error out on streams that are
    /// decodable but not conformant, e.g. extra bytes between
    /// segments.
    pub const fn strict_mode(&self) -> bool {
        self.strict_mode
    }

    /// Whether the PNG decoder verifies chunk CRCs.
    pub const fn png_confirm_crc(&self) -> bool {
        self.png_confirm_crc
    }

    /// Whether the zlib stream's Adler-32 checksum is verified.
    pub const fn inflate_confirm_adler(&self) -> bool {
        self.inflate_confirm_adler
    }

    pub fn set_max_width(mut self, width: usize) -> Self {
        self.max_width = width;
        self
    }

    pub fn set_max_height(mut self, height: usize) -> Self {
        self.max_height = height;
        self
    }

    pub fn set_strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    pub fn set_confirm_crc(mut self, confirm: bool) -> Self {
        self.png_confirm_crc = confirm;
        self
    }

    pub fn set_confirm_adler(mut self, confirm: bool) -> Self {
        self.inflate_confirm_adler = confirm;
        self
    }
}
