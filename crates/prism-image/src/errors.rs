/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The umbrella error type of the codec surface.
use std::fmt::{Debug, Display, Formatter};

use prism_core::colorspace::ColorSpace;
use prism_jpeg::DecodeErrors;
use prism_png::error::PngErrors;

/// Anything that can go wrong while decoding or converting an image
/// through the format-agnostic surface.
pub enum ImageErrors {
    /// The PNG decoder reported an error.
    PngDecodeErrors(PngErrors),
    /// The JPEG decoder reported an error.
    JpegDecodeErrors(DecodeErrors),
    /// The byte stream matches no supported format signature.
    UnknownFormat,
    /// A caller asked for a pixel type the decoded image cannot reach
    /// without losing information, `(stored, requested)`.
    IncompatiblePromotion(ColorSpace, ColorSpace)
}

impl Debug for ImageErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PngDecodeErrors(err) => writeln!(f, "PNG decoding failed: {err:?}"),
            Self::JpegDecodeErrors(err) => writeln!(f, "JPEG decoding failed: {err:?}"),
            Self::UnknownFormat => {
                writeln!(f, "The stream does not start with a known image signature")
            }
            Self::IncompatiblePromotion(stored, requested) => {
                writeln!(
                    f,
                    "Cannot losslessly promote a {stored:?} image into {requested:?} pixels"
                )
            }
        }
    }
}

impl Display for ImageErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for ImageErrors {}

impl From<PngErrors> for ImageErrors {
    fn from(err: PngErrors) -> Self {
        ImageErrors::PngDecodeErrors(err)
    }
}

impl From<DecodeErrors> for ImageErrors {
    fn from(err: DecodeErrors) -> Self {
        ImageErrors::JpegDecodeErrors(err)
    }
}
