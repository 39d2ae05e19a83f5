/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Parsing of individual PNG chunks.
use log::info;

use crate::decoder::{PngChunk, PngDecoder};
use crate::enums::{FilterMethod, InterlaceMethod, PngColor};
use crate::error::PngErrors;

impl<'a> PngDecoder<'a> {
    pub(crate) fn parse_ihdr(&mut self, chunk: PngChunk) -> Result<(), PngErrors> {
        if self.seen_hdr {
            return Err(PngErrors::GenericStatic("Multiple IHDR, corrupt PNG"));
        }

        if chunk.length != 13 {
            return Err(PngErrors::GenericStatic("Bad IHDR length"));
        }

        self.png_info.width = self.stream.get_u32_be() as usize;
        self.png_info.height = self.stream.get_u32_be() as usize;

        if self.png_info.width == 0 || self.png_info.height == 0 {
            return Err(PngErrors::GenericStatic("Width or height cannot be zero"));
        }

        if self.png_info.width > self.options.max_width() {
            return Err(PngErrors::Generic(format!(
                "Image width {}, larger than maximum configured width {}, aborting",
                self.png_info.width,
                self.options.max_width()
            )));
        }

        if self.png_info.height > self.options.max_height() {
            return Err(PngErrors::Generic(format!(
                "Image height {}, larger than maximum configured height {}, aborting",
                self.png_info.height,
                self.options.max_height()
            )));
        }

        self.png_info.depth = self.stream.get_u8();
        let color = self.stream.get_u8();

        if let Some(img_color) = PngColor::from_int(color) {
            self.png_info.color = img_color;
        } else {
            return Err(PngErrors::Generic(format!("Unknown color value {color}")));
        }
        self.png_info.component = self.png_info.color.num_components();

        // verify the (color type, bit depth) pair against the allowed
        // matrix before anything downstream trusts it
        if !self.png_info.color.supports_depth(self.png_info.depth) {
            return Err(PngErrors::Generic(format!(
                "Bit depth {} is not allowed for color type {:?}",
                self.png_info.depth, self.png_info.color
            )));
        }

        if self.stream.get_u8() != 0 {
            return Err(PngErrors::GenericStatic("Unknown compression method"));
        }

        let filter_method = self.stream.get_u8();

        if let Some(method) = FilterMethod::from_int(filter_method) {
            self.png_info.filter_method = method;
        } else {
            return Err(PngErrors::Generic(format!(
                "Unknown filter method {filter_method}"
            )));
        }

        let interlace_method = self.stream.get_u8();

        if let Some(method) = InterlaceMethod::from_int(interlace_method) {
            self.png_info.interlace_method = method;
        } else {
            return Err(PngErrors::Generic(format!(
                "Unknown interlace method {interlace_method}"
            )));
        }

        // skip crc
        self.stream.skip(4);

        info!("Width: {}", self.png_info.width);
        info!("Height: {}", self.png_info.height);
        info!("Color type: {:?}", self.png_info.color);
        info!("Depth: {:?}", self.png_info.depth);
        info!("Interlace: {:?}", self.png_info.interlace_method);

        self.seen_hdr = true;

        Ok(())
    }

    pub(crate) fn parse_plte(&mut self, chunk: PngChunk) -> Result<(), PngErrors> {
        if chunk.length % 3 != 0 || chunk.length > 256 * 3 {
            return Err(PngErrors::GenericStatic("Invalid PLTE length, corrupt PNG"));
        }

        // indices beyond the entries actually present read as black
        self.palette.resize(256, [0_u8; 3]);

        for entry in self.palette.iter_mut().take(chunk.length / 3) {
            entry[0] = self.stream.get_u8();
            entry[1] = self.stream.get_u8();
            entry[2] = self.stream.get_u8();
        }

        // skip crc
        self.stream.skip(4);
        self.seen_ptle = true;

        Ok(())
    }

    pub(crate) fn parse_idat(&mut self, png_chunk: PngChunk) -> Result<(), PngErrors> {
        // collect the IDAT payload; all payloads concatenate into one
        // zlib stream which is inflated after IEND
        let idat_stream = self.stream.get_as_ref(png_chunk.length)?;

        self.idat_chunks.extend_from_slice(idat_stream);

        // skip crc
        self.stream.skip(4);

        Ok(())
    }

    pub(crate) fn parse_gama(&mut self, chunk: PngChunk) -> Result<(), PngErrors> {
        if chunk.length != 4 {
            if self.options.strict_mode() {
                return Err(PngErrors::Generic(format!(
                    "Gama chunk length is not 4 but {}",
                    chunk.length
                )));
            }
            self.stream.skip(chunk.length + 4);
            return Ok(());
        }

        // stored as gamma * 100000; metadata only, pixels are not touched
        self.gamma = self.stream.get_u32_be() as f32 / 100_000.0;
        self.seen_gamma = true;

        // skip crc
        self.stream.skip(4);

        Ok(())
    }
}
