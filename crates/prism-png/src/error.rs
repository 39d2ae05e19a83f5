/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Errors possible during PNG decoding
use std::fmt::{Debug, Display, Formatter};

use prism_core::bytestream::ByteStreamError;
use zune_inflate::errors::InflateDecodeErrors;

/// All errors the PNG decoder can report.
///
/// Decoding either yields a fully decoded image or exactly one of
/// these identifying the earliest violation; there are no partial
/// results.
pub enum PngErrors {
    /// The stream does not begin with the eight byte PNG signature.
    BadSignature,
    /// A chunk CRC did not match, `(stored, calculated)`.
    BadCrc(u32, u32),
    /// A scanline carried a filter byte outside `0..=4`.
    BadFilter(u8),
    /// The image is indexed but no PLTE chunk was seen.
    EmptyPalette,
    /// The concatenated IDAT payload could not be inflated.
    ZlibDecodeErrors(InflateDecodeErrors),
    GenericStatic(&'static str),
    Generic(String)
}

impl Debug for PngErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadSignature => writeln!(f, "Bad PNG signature, not a png"),
            Self::BadCrc(expected, found) => {
                writeln!(
                    f,
                    "Bad CRC, stored CRC is {expected:08x} but the calculated CRC is {found:08x}"
                )
            }
            Self::BadFilter(filter) => {
                writeln!(f, "Unknown scanline filter {filter}, expected 0..=4")
            }
            Self::EmptyPalette => {
                writeln!(f, "Indexed color type with no PLTE chunk present")
            }
            Self::ZlibDecodeErrors(err) => {
                writeln!(f, "Error inflating IDAT stream: {err:?}")
            }
            Self::GenericStatic(val) => writeln!(f, "{val}"),
            Self::Generic(val) => writeln!(f, "{val}")
        }
    }
}

impl Display for PngErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for PngErrors {}

impl From<&'static str> for PngErrors {
    fn from(val: &'static str) -> Self {
        Self::GenericStatic(val)
    }
}

impl From<String> for PngErrors {
    fn from(val: String) -> Self {
        Self::Generic(val)
    }
}

impl From<ByteStreamError> for PngErrors {
    fn from(val: ByteStreamError) -> Self {
        Self::Generic(format!("Truncated stream: {val}"))
    }
}

impl From<InflateDecodeErrors> for PngErrors {
    fn from(val: InflateDecodeErrors) -> Self {
        Self::ZlibDecodeErrors(val)
    }
}
