/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! JPEG marker codes.
//!
//! Every marker is the byte `0xFF` followed by one of these codes.
//! Codes `0xD0..=0xD7` are the restart markers, `0xE0..=0xEF` the
//! application segments.

/// A recognized marker code.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Marker {
    /// Start of image
    SOI,
    /// End of image
    EOI,
    /// Start of frame, the argument being the frame type `n` of
    /// `SOFn`. Only `SOF(0)`, baseline sequential DCT, is decodable.
    SOF(u8),
    /// Define Huffman tables
    DHT,
    /// Define quantization tables
    DQT,
    /// Define restart interval
    DRI,
    /// Start of scan
    SOS,
    /// Restart marker `RSTm`, `m` cycling 0..=7
    RST(u8),
    /// Application segment `APPn`
    APP(u8),
    /// Comment
    COM,
    /// Define arithmetic coding conditioning
    DAC,
    /// Define number of lines
    DNL,
    /// Reserved `JPGn` extension
    JPG(u8)
}

impl Marker {
    /// Map a marker code byte to its marker, `None` for bytes that
    /// are not assigned (or are `0x00`/`0xFF`, which are never
    /// markers).
    pub fn from_u8(value: u8) -> Option<Marker> {
        match value {
            0xd8 => Some(Marker::SOI),
            0xd9 => Some(Marker::EOI),
            0xc0..=0xc3 | 0xc5..=0xc7 | 0xc9..=0xcb | 0xcd..=0xcf => {
                Some(Marker::SOF(value - 0xc0))
            }
            0xc4 => Some(Marker::DHT),
            0xc8 => Some(Marker::JPG(value)),
            0xcc => Some(Marker::DAC),
            0xd0..=0xd7 => Some(Marker::RST(value - 0xd0)),
            0xda => Some(Marker::SOS),
            0xdb => Some(Marker::DQT),
            0xdc => Some(Marker::DNL),
            0xdd => Some(Marker::DRI),
            0xe0..=0xef => Some(Marker::APP(value - 0xe0)),
            0xf0..=0xfd => Some(Marker::JPG(value)),
            0xfe => Some(Marker::COM),
            _ => None
        }
    }
}
