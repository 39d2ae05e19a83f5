/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Errors possible during JPEG decoding
use std::fmt::{Debug, Display, Formatter};

use prism_core::bytestream::ByteStreamError;

/// All errors the JPEG decoder can report.
#[allow(clippy::module_name_repetitions, clippy::upper_case_acronyms)]
pub enum DecodeErrors {
    /// The stream does not begin with the SOI marker.
    IllegalMagicBytes(u16),
    /// A structural violation: a bad segment length, a marker in a
    /// state where it is not allowed, or similar.
    Format(String),
    /// [`Format`](Self::Format) carrying a static message.
    FormatStatic(&'static str),
    /// Problems with the Huffman tables or the Huffman coded stream.
    HuffmanDecode(String),
    /// Quantization table problems.
    DqtError(String),
    /// Start of frame problems.
    SofError(String),
    /// Start of scan problems.
    SosError(String),
    /// Errors decoding a minimum coded unit, e.g. AC coefficients
    /// overrunning position 63.
    MCUError(String),
    /// A restart marker was expected but absent.
    MissingRestart(String),
    /// The frame carries a component count the decoder cannot
    /// produce pixels for; only 1 and 3 are supported.
    UnsupportedComponents(u8),
    /// The image uses an encoding scheme this decoder does not
    /// implement.
    Unsupported(UnsupportedSchemes),
    /// The stream ended before all required data was read.
    ExhaustedData,
    /// Image width or height is zero.
    ZeroError
}

impl Debug for DecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IllegalMagicBytes(bytes) => {
                write!(f, "Error parsing image, illegal start bytes {bytes:#06x}")
            }
            Self::Format(reason) => write!(f, "{reason}"),
            Self::FormatStatic(reason) => write!(f, "{reason}"),
            Self::HuffmanDecode(reason) => {
                write!(f, "Error decoding huffman values: {reason}")
            }
            Self::DqtError(reason) => write!(f, "Error parsing DQT segment: {reason}"),
            Self::SofError(reason) => write!(f, "Error parsing SOF segment: {reason}"),
            Self::SosError(reason) => write!(f, "Error parsing SOS segment: {reason}"),
            Self::MCUError(reason) => write!(f, "Error decoding MCUs: {reason}"),
            Self::MissingRestart(reason) => write!(f, "{reason}"),
            Self::UnsupportedComponents(components) => {
                write!(
                    f,
                    "{components} image components cannot be decoded, only 1 and 3 are supported"
                )
            }
            Self::Unsupported(scheme) => write!(f, "{scheme:?}"),
            Self::ExhaustedData => write!(f, "Stream ended before all required data was read"),
            Self::ZeroError => write!(f, "Image width or height is set to zero, cannot continue")
        }
    }
}

impl Display for DecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for DecodeErrors {}

impl From<ByteStreamError> for DecodeErrors {
    fn from(_: ByteStreamError) -> Self {
        DecodeErrors::ExhaustedData
    }
}

/// Encoding schemes a conforming file may use that this decoder
/// does not implement.
#[derive(Eq, PartialEq, Copy, Clone)]
pub enum UnsupportedSchemes {
    /// SOF1, extended sequential DCT, Huffman coding
    ExtendedSequentialHuffman,
    /// SOF2, progressive DCT, Huffman coding
    ProgressiveDctHuffman,
    /// SOF3, lossless sequential, Huffman coding
    LosslessHuffman,
    /// SOF9, extended sequential DCT, arithmetic coding
    ExtendedSequentialDctArithmetic,
    /// SOF10, progressive DCT, arithmetic coding
    ProgressiveDctArithmetic,
    /// SOF11, lossless sequential, arithmetic coding
    LosslessArithmetic
}

impl Debug for UnsupportedSchemes {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExtendedSequentialHuffman => {
                write!(f, "The library cannot decode images encoded with extended sequential Huffman coding")
            }
            Self::ProgressiveDctHuffman => {
                write!(f, "The library cannot decode progressive Huffman encoded images")
            }
            Self::LosslessHuffman => {
                write!(f, "The library cannot decode lossless Huffman encoded images")
            }
            Self::ExtendedSequentialDctArithmetic => {
                write!(f, "The library cannot decode images encoded with extended sequential arithmetic coding")
            }
            Self::ProgressiveDctArithmetic => {
                write!(f, "The library cannot decode images encoded with progressive arithmetic coding")
            }
            Self::LosslessArithmetic => {
                write!(f, "The library cannot decode images encoded with lossless arithmetic coding")
            }
        }
    }
}

impl UnsupportedSchemes {
    /// Classify the `n` of an `SOFn` marker.
    #[must_use]
    pub fn from_sof(sof: u8) -> Option<UnsupportedSchemes> {
        match sof {
            1 => Some(Self::ExtendedSequentialHuffman),
            2 => Some(Self::ProgressiveDctHuffman),
            3 => Some(Self::LosslessHuffman),
            9 => Some(Self::ExtendedSequentialDctArithmetic),
            10 => Some(Self::ProgressiveDctArithmetic),
            11 => Some(Self::LosslessArithmetic),
            _ => None
        }
    }
}
