/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The PNG decoder.
//!
//! Decoding walks the chunk stream once, validating CRCs and
//! collecting IDAT payloads, inflates the concatenated zlib stream,
//! then reconstructs scanline filters and widens samples into the
//! typed output image.
use log::info;
use prism_core::bit_depth::BitDepth;
use prism_core::bytestream::ByteReader;
use prism_core::colorspace::ColorSpace;
use prism_core::dynamic::DynamicImage;
use prism_core::image::Image;
use prism_core::options::DecoderOptions;
use prism_core::pixel::{RGB8, RGBA8, Y8, YA8};
use zune_inflate::DeflateOptions;

use crate::constants::{
    ADAM7_X_START, ADAM7_X_STEP, ADAM7_Y_START, ADAM7_Y_STEP, PNG_SIGNATURE
};
use crate::crc::crc32;
use crate::enums::{FilterMethod, InterlaceMethod, PngChunkType, PngColor};
use crate::error::PngErrors;
use crate::filters::{
    handle_avg, handle_avg_first, handle_paeth, handle_paeth_first, handle_sub, handle_up
};

/// Widening factors for sub-byte samples: a sample of depth `d`
/// multiplied by `DEPTH_SCALE_TABLE[d]` lands on `n * 255 / (2^d - 1)`.
const DEPTH_SCALE_TABLE: [u8; 9] = [0, 0xff, 0x55, 0, 0x11, 0, 0, 0, 0x01];

/// One parsed chunk header.
#[derive(Copy, Clone)]
pub(crate) struct PngChunk {
    pub length:     usize,
    pub chunk_type: PngChunkType,
    pub chunk:      [u8; 4],
    pub crc:        u32
}

/// Image properties read from the IHDR chunk.
#[derive(Default, Debug, Copy, Clone)]
pub struct PngInfo {
    pub width:            usize,
    pub height:           usize,
    pub depth:            u8,
    pub color:            PngColor,
    pub component:        u8,
    pub filter_method:    FilterMethod,
    pub interlace_method: InterlaceMethod
}

/// A PNG decoder instance.
///
/// Feed it the whole file, then either probe headers with
/// [`decode_headers`](PngDecoder::decode_headers) or decode pixels
/// with [`decode`](PngDecoder::decode).
///
/// # Note
/// Samples below eight bits are widened to eight and 16-bit samples
/// are folded down to eight (`v * 255 / 65535`), so decoded images
/// always carry one byte per component.
pub struct PngDecoder<'a> {
    pub(crate) stream:       ByteReader<'a>,
    pub(crate) options:      DecoderOptions,
    pub(crate) png_info:     PngInfo,
    pub(crate) palette:      Vec<[u8; 3]>,
    pub(crate) idat_chunks:  Vec<u8>,
    pub(crate) gamma:        f32,
    pub(crate) seen_gamma:   bool,
    pub(crate) seen_hdr:     bool,
    pub(crate) seen_ptle:    bool,
    pub(crate) seen_headers: bool
}

impl<'a> PngDecoder<'a> {
    pub fn new(data: &'a [u8]) -> PngDecoder<'a> {
        PngDecoder::new_with_options(data, DecoderOptions::default())
    }

    pub fn new_with_options(data: &'a [u8], options: DecoderOptions) -> PngDecoder<'a> {
        PngDecoder {
            stream: ByteReader::new(data),
            options,
            png_info: PngInfo::default(),
            palette: Vec::new(),
            idat_chunks: Vec::with_capacity(37),
            gamma: 0.0,
            seen_gamma: false,
            seen_hdr: false,
            seen_ptle: false,
            seen_headers: false
        }
    }

    /// Image dimensions, or `None` before headers have been decoded.
    pub const fn dimensions(&self) -> Option<(usize, usize)> {
        if !self.seen_hdr {
            return None;
        }
        Some((self.png_info.width, self.png_info.height))
    }

    /// Bit depth of the decoded output.
    pub const fn depth(&self) -> Option<BitDepth> {
        if !self.seen_hdr {
            return None;
        }
        // everything narrows or widens to eight on the way out
        Some(BitDepth::Eight)
    }

    /// Gamma from a gAMA chunk if one was present.
    pub const fn gamma(&self) -> Option<f32> {
        if self.seen_gamma {
            Some(self.gamma)
        } else {
            None
        }
    }

    /// Colorspace of the image [`decode`](PngDecoder::decode) will
    /// produce, or `None` before headers have been decoded.
    pub fn colorspace(&self) -> Option<ColorSpace> {
        if !self.seen_hdr {
            return None;
        }
        match self.png_info.color {
            // indexed images expand through the palette
            PngColor::Palette | PngColor::RGB => Some(ColorSpace::RGB),
            PngColor::Luma => Some(ColorSpace::Luma),
            PngColor::LumaA => Some(ColorSpace::LumaA),
            PngColor::RGBA => Some(ColorSpace::RGBA),
            PngColor::Unknown => unreachable!()
        }
    }

    /// Header information, or `None` before headers have been decoded.
    pub const fn info(&self) -> Option<PngInfo> {
        if !self.seen_hdr {
            return None;
        }
        Some(self.png_info)
    }

    fn read_chunk_header(&mut self) -> Result<PngChunk, PngErrors> {
        // chunk layout is length - type - [payload] - crc
        let chunk_length = self.stream.get_u32_be_err()? as usize;
        let chunk_type_int = self.stream.get_u32_be_err()?.to_be_bytes();

        let chunk_type = match &chunk_type_int {
            b"IHDR" => PngChunkType::IHDR,
            b"PLTE" => PngChunkType::PLTE,
            b"IDAT" => PngChunkType::IDAT,
            b"IEND" => PngChunkType::IEND,
            b"gAMA" => PngChunkType::gAMA,
            _ => PngChunkType::unkn
        };

        if !self.stream.has(chunk_length + 4 /*crc bytes*/) {
            return Err(PngErrors::Generic(format!(
                "Not enough bytes for chunk {:?}, bytes requested are {}, but bytes present are {}",
                chunk_type,
                chunk_length + 4,
                self.stream.remaining()
            )));
        }

        let mut crc_bytes = [0; 4];
        crc_bytes.copy_from_slice(self.stream.peek_at(chunk_length, 4)?);

        let crc = u32::from_be_bytes(crc_bytes);

        if self.options.png_confirm_crc() {
            // the crc covers the chunk type and payload, go back and
            // point at the type bytes
            self.stream.rewind(4);

            let bytes = self.stream.peek_at(0, chunk_length + 4)?;
            let calculated = crc32(bytes);

            if crc != calculated {
                return Err(PngErrors::BadCrc(crc, calculated));
            }
            // the parsers expect the cursor at the payload start
            self.stream.skip(4);
        }

        Ok(PngChunk {
            length: chunk_length,
            chunk_type,
            chunk: chunk_type_int,
            crc
        })
    }

    /// Walk the chunk stream up to and including IEND, collecting
    /// header state and IDAT payloads.
    ///
    /// Anything after IEND is ignored.
    pub fn decode_headers(&mut self) -> Result<(), PngErrors> {
        let signature = self.stream.get_u64_be_err()?;

        if signature != PNG_SIGNATURE {
            return Err(PngErrors::BadSignature);
        }

        if self.stream.peek_at(4, 4)? != b"IHDR" {
            return Err(PngErrors::GenericStatic("First chunk not IHDR, corrupt PNG"));
        }

        loop {
            let header = self.read_chunk_header()?;

            match header.chunk_type {
                PngChunkType::IHDR => self.parse_ihdr(header)?,
                PngChunkType::PLTE => self.parse_plte(header)?,
                PngChunkType::IDAT => self.parse_idat(header)?,
                PngChunkType::gAMA => self.parse_gama(header)?,
                PngChunkType::IEND => break,
                PngChunkType::unkn => {
                    // ancillary chunk we don't understand; its crc
                    // already checked out, so skip payload + crc
                    info!(
                        "Skipping chunk {} with crc 0x{:08x}",
                        core::str::from_utf8(&header.chunk).unwrap_or("????"),
                        header.crc
                    );
                    self.stream.skip(header.length + 4);
                }
            }
        }
        self.seen_headers = true;
        Ok(())
    }

    /// Decode the image, returning pixels wrapped in the narrowest
    /// pixel type that losslessly represents the file.
    ///
    /// Greyscale files map to `Y8`, greyscale with alpha to `YA8`,
    /// RGB to `RGB8`, RGBA to `RGBA8` and indexed files expand
    /// through their palette into `RGB8`.
    pub fn decode(&mut self) -> Result<DynamicImage, PngErrors> {
        if !self.seen_headers {
            self.decode_headers()?;
        }

        let info = self.png_info;
        let deflate_data = self.inflate()?;

        // done with the compressed stream, reclaim the memory
        self.idat_chunks = Vec::new();

        let in_n = usize::from(info.component);
        let mut samples = vec![0_u8; info.width * info.height * in_n];

        match info.interlace_method {
            InterlaceMethod::Standard => {
                self.decode_pass(
                    &deflate_data,
                    info.width,
                    info.height,
                    (0, 1),
                    (0, 1),
                    &mut samples
                )?;
            }
            InterlaceMethod::Adam7 => {
                let mut offset = 0;

                for p in 0..7 {
                    let pass_w = info
                        .width
                        .saturating_sub(ADAM7_X_START[p])
                        .saturating_add(ADAM7_X_STEP[p] - 1)
                        / ADAM7_X_STEP[p];
                    let pass_h = info
                        .height
                        .saturating_sub(ADAM7_Y_START[p])
                        .saturating_add(ADAM7_Y_STEP[p] - 1)
                        / ADAM7_Y_STEP[p];

                    if pass_w == 0 || pass_h == 0 {
                        continue;
                    }

                    offset += self.decode_pass(
                        &deflate_data[offset..],
                        pass_w,
                        pass_h,
                        (ADAM7_X_START[p], ADAM7_X_STEP[p]),
                        (ADAM7_Y_START[p], ADAM7_Y_STEP[p]),
                        &mut samples
                    )?;
                }
            }
            InterlaceMethod::Unknown => unreachable!()
        }

        let (width, height) = (info.width, info.height);

        let image = match info.color {
            PngColor::Luma => DynamicImage::Luma8(Image::<Y8>::from_raw(width, height, samples)),
            PngColor::LumaA => {
                DynamicImage::LumaA8(Image::<YA8>::from_raw(width, height, samples))
            }
            PngColor::RGB => DynamicImage::Rgb8(Image::<RGB8>::from_raw(width, height, samples)),
            PngColor::RGBA => {
                DynamicImage::Rgba8(Image::<RGBA8>::from_raw(width, height, samples))
            }
            PngColor::Palette => {
                if !self.seen_ptle || self.palette.is_empty() {
                    return Err(PngErrors::EmptyPalette);
                }
                let mut rgb = Vec::with_capacity(width * height * 3);

                for index in &samples {
                    rgb.extend_from_slice(&self.palette[usize::from(*index)]);
                }
                DynamicImage::Rgb8(Image::<RGB8>::from_raw(width, height, rgb))
            }
            PngColor::Unknown => unreachable!()
        };

        Ok(image)
    }

    /// Reconstruct the scanline filters of one (de)interlacing pass
    /// and scatter its samples into `samples`.
    ///
    /// `(x_start, x_step)` and `(y_start, y_step)` place pass pixel
    /// `(i, j)` at image position
    /// `(x_start + i * x_step, y_start + j * y_step)`; the sequential
    /// case is a single pass with zero starts and unit steps.
    ///
    /// Returns the number of bytes of `raw` the pass consumed.
    fn decode_pass(
        &self, raw: &[u8], pass_w: usize, pass_h: usize, (x_start, x_step): (usize, usize),
        (y_start, y_step): (usize, usize), samples: &mut [u8]
    ) -> Result<usize, PngErrors> {
        let info = &self.png_info;
        let in_n = usize::from(info.component);
        let depth = usize::from(info.depth);

        let scanline_bytes = (depth * in_n * pass_w + 7) / 8;
        // distance between a byte and the matching byte of the pixel
        // to its left; sub-byte depths filter at whole byte distance
        let stride = ((depth / 8) * in_n).max(1);
        let row_len = scanline_bytes + 1;

        if raw.len() < row_len * pass_h {
            return Err(PngErrors::Generic(format!(
                "Not enough pixel data, expected {} bytes but found {}",
                row_len * pass_h,
                raw.len()
            )));
        }

        let mut prev = vec![0_u8; scanline_bytes];
        let mut cur = vec![0_u8; scanline_bytes];

        for j in 0..pass_h {
            let row = &raw[j * row_len..(j + 1) * row_len];

            let filter_byte = row[0];
            let raw_row = &row[1..];

            let mut filter =
                FilterMethod::from_int(filter_byte).ok_or(PngErrors::BadFilter(filter_byte))?;

            if j == 0 {
                // the first scanline of every pass has no row above,
                // swap in the specialised filters that read it as zero
                filter = match filter {
                    FilterMethod::Paeth => FilterMethod::PaethFirst,
                    FilterMethod::Average => FilterMethod::AvgFirst,
                    // up with a zero row above is a plain copy
                    FilterMethod::Up => FilterMethod::None,
                    other => other
                };
            }

            match filter {
                FilterMethod::None => cur.copy_from_slice(raw_row),
                FilterMethod::Sub => handle_sub(raw_row, &mut cur, stride),
                FilterMethod::Up => handle_up(&prev, raw_row, &mut cur),
                FilterMethod::Average => handle_avg(&prev, raw_row, &mut cur, stride),
                FilterMethod::Paeth => handle_paeth(&prev, raw_row, &mut cur, stride),
                FilterMethod::PaethFirst => handle_paeth_first(raw_row, &mut cur, stride),
                FilterMethod::AvgFirst => handle_avg_first(raw_row, &mut cur, stride),
                FilterMethod::Unknown => unreachable!()
            }

            self.write_row(&cur, pass_w, y_start + j * y_step, (x_start, x_step), samples);

            core::mem::swap(&mut prev, &mut cur);
        }

        Ok(row_len * pass_h)
    }

    /// Widen the samples of one reconstructed scanline and write them
    /// to their image positions.
    fn write_row(
        &self, row: &[u8], pass_w: usize, y: usize, (x_start, x_step): (usize, usize),
        samples: &mut [u8]
    ) {
        let info = &self.png_info;
        let in_n = usize::from(info.component);
        let width = info.width;

        match usize::from(info.depth) {
            8 => {
                for i in 0..pass_w {
                    let x = x_start + i * x_step;
                    let dst = (y * width + x) * in_n;

                    samples[dst..dst + in_n].copy_from_slice(&row[i * in_n..(i + 1) * in_n]);
                }
            }
            16 => {
                // sixteen bit samples fold to eight; with
                // 65535 = 257 * 255 the fold is exact integer math
                for i in 0..pass_w {
                    let x = x_start + i * x_step;
                    let dst = (y * width + x) * in_n;

                    for k in 0..in_n {
                        let offset = (i * in_n + k) * 2;
                        let v = u16::from_be_bytes([row[offset], row[offset + 1]]);

                        samples[dst + k] = ((u32::from(v) * 255) / 65535) as u8;
                    }
                }
            }
            depth => {
                // 1, 2 and 4 bit samples; only greyscale and indexed
                // images can get here so there is one sample per pixel.
                // Greyscale levels widen to n * 255/(2^d - 1), palette
                // indices must stay untouched.
                let scale = if info.color == PngColor::Palette {
                    1
                } else {
                    DEPTH_SCALE_TABLE[depth]
                };
                let mask = (1_u16 << depth) as u8 - 1;

                for i in 0..pass_w {
                    let bit = i * depth;
                    let shift = 8 - depth - (bit % 8);
                    let value = (row[bit / 8] >> shift) & mask;

                    let x = x_start + i * x_step;
                    samples[y * width + x] = value * scale;
                }
            }
        }
    }

    /// Inflate the concatenated IDAT payloads.
    fn inflate(&self) -> Result<Vec<u8>, PngErrors> {
        // a zlib stream is at least a two byte header plus the four
        // byte adler checksum
        if self.idat_chunks.len() < 6 {
            return Err(PngErrors::GenericStatic(
                "IDAT stream too short to be a zlib stream"
            ));
        }

        let info = &self.png_info;
        let depth_scale = if info.depth == 16 { 2 } else { 1 };

        // deflate won't tell us the decompressed size upfront, so hint
        // the full raster plus one filter byte per line and cap it
        // there to keep hostile streams from ballooning
        let size_hint =
            (info.width + 1) * info.height * depth_scale * usize::from(info.component);

        let option = DeflateOptions::default()
            .set_size_hint(size_hint)
            .set_limit(size_hint + 4 * info.height)
            .set_confirm_checksum(self.options.inflate_confirm_adler());

        let mut decoder = zune_inflate::DeflateDecoder::new_with_options(&self.idat_chunks, option);

        decoder.decode_zlib().map_err(PngErrors::ZlibDecodeErrors)
    }
}
