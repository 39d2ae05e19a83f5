/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A single image component (color channel) and its decode state.
use crate::errors::DecodeErrors;

/// One frame component: its sampling factors, table assignments and
/// the decoded plane at component resolution.
pub(crate) struct Component {
    /// Component identifier from the frame header, usually 1 for Y,
    /// 2 for Cb and 3 for Cr.
    pub id:                  u8,
    /// Horizontal sampling factor, 1..=4.
    pub horizontal_sample:   usize,
    /// Vertical sampling factor, 1..=4.
    pub vertical_sample:     usize,
    /// Which quantization table destination this component reads.
    pub quantization_table_number: u8,
    /// The resolved quantization table in natural raster order.
    pub quantization_table:  [i32; 64],
    /// DC Huffman table destination selected by the scan header.
    pub dc_huff_table:       usize,
    /// AC Huffman table destination selected by the scan header.
    pub ac_huff_table:       usize,
    /// Running DC predictor, reset at restart markers.
    pub dc_pred:             i32,
    /// Width of `plane` in samples, padded up to whole MCUs.
    pub width_stride:        usize,
    /// Decoded samples at component resolution.
    pub plane:               Vec<u8>
}

impl Component {
    /// Build a component from the three bytes of a frame header
    /// entry.
    pub fn from(values: [u8; 3], pos: u8) -> Result<Component, DecodeErrors> {
        // second byte carries horizontal sample in the top nibble,
        // vertical in the bottom
        let horizontal_sample = usize::from(values[1] >> 4);
        let vertical_sample = usize::from(values[1] & 0x0f);
        let quantization_table_number = values[2];

        if !(1..=4).contains(&horizontal_sample) || !(1..=4).contains(&vertical_sample) {
            return Err(DecodeErrors::SofError(format!(
                "Bad sampling factors ({horizontal_sample}, {vertical_sample}) for component {pos}, expected 1..=4"
            )));
        }

        if quantization_table_number > 3 {
            return Err(DecodeErrors::SofError(format!(
                "Quantization table {quantization_table_number} for component {pos} out of range, expected 0..=3"
            )));
        }

        Ok(Component {
            id: values[0],
            horizontal_sample,
            vertical_sample,
            quantization_table_number,
            quantization_table: [0; 64],
            dc_huff_table: 0,
            ac_huff_table: 0,
            dc_pred: 0,
            width_stride: 0,
            plane: Vec::new()
        })
    }
}
