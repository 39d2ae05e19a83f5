/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The baseline JPEG decoder.
//!
//! Decoding runs in two phases: a marker walk that collects tables
//! and frame/scan headers, then the MCU loop that entropy decodes,
//! de-quantizes and inverse transforms every data unit into per
//! component planes. Sub-sampled components are brought up to image
//! resolution by nearest neighbour replication during assembly.
use log::{error, trace, warn};
use prism_core::bytestream::ByteReader;
use prism_core::colorspace::ColorSpace;
use prism_core::dynamic::DynamicImage;
use prism_core::image::Image;
use prism_core::options::DecoderOptions;
use prism_core::pixel::{Y8, YCbCr8};

use crate::bitstream::BitStream;
use crate::components::Component;
use crate::errors::{DecodeErrors, UnsupportedSchemes};
use crate::headers::{parse_dqt, parse_huffman, parse_sos, parse_start_of_frame};
use crate::huffman::HuffmanTable;
use crate::idct::idct_block;
use crate::marker::Marker;
use crate::misc::SOFMarkers;

/// Maximum table destinations and scan components.
pub(crate) const MAX_COMPONENTS: usize = 4;

/// Information from the frame header.
#[derive(Default, Clone, Eq, PartialEq, Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct ImageInfo {
    /// Width of the image, at most 65535.
    pub width:      u16,
    /// Height of the image, at most 65535.
    pub height:     u16,
    /// Number of frame components.
    pub components: u8,
    /// The frame type as declared by its start of frame marker.
    pub sof:        SOFMarkers
}

/// A baseline JPEG decoder instance.
///
/// Feed it the whole file, then either probe headers with
/// [`decode_headers`](JpegDecoder::decode_headers) or decode pixels
/// with [`decode`](JpegDecoder::decode). Greyscale files produce
/// `Image<Y8>`, three component files `Image<YCbCr8>`.
pub struct JpegDecoder<'a> {
    pub(crate) info:              ImageInfo,
    pub(crate) qt_tables:         [Option<[i32; 64]>; MAX_COMPONENTS],
    pub(crate) dc_huffman_tables: [Option<HuffmanTable>; MAX_COMPONENTS],
    pub(crate) ac_huffman_tables: [Option<HuffmanTable>; MAX_COMPONENTS],
    pub(crate) components:        Vec<Component>,
    /// Largest horizontal sampling factor of all components.
    pub(crate) h_max:             usize,
    /// Largest vertical sampling factor of all components.
    pub(crate) v_max:             usize,
    /// MCUs per row.
    pub(crate) mcu_x:             usize,
    /// MCU rows.
    pub(crate) mcu_y:             usize,
    /// MCUs between restart markers, zero when restarts are unused.
    pub(crate) restart_interval:  usize,
    /// Scan order: position `i` holds the component index of the
    /// `i`th scan component.
    pub(crate) z_order:           [usize; MAX_COMPONENTS],
    pub(crate) seen_sof:          bool,
    pub(crate) headers_decoded:   bool,
    pub(crate) options:           DecoderOptions,
    pub(crate) stream:            ByteReader<'a>
}

impl<'a> JpegDecoder<'a> {
    pub fn new(data: &'a [u8]) -> JpegDecoder<'a> {
        JpegDecoder::new_with_options(data, DecoderOptions::default())
    }

    pub fn new_with_options(data: &'a [u8], options: DecoderOptions) -> JpegDecoder<'a> {
        JpegDecoder {
            info: ImageInfo::default(),
            qt_tables: [None; MAX_COMPONENTS],
            dc_huffman_tables: [None, None, None, None],
            ac_huffman_tables: [None, None, None, None],
            components: Vec::new(),
            h_max: 1,
            v_max: 1,
            mcu_x: 0,
            mcu_y: 0,
            restart_interval: 0,
            z_order: [0; MAX_COMPONENTS],
            seen_sof: false,
            headers_decoded: false,
            options,
            stream: ByteReader::new(data)
        }
    }

    /// Image width, zero before headers have been decoded.
    #[must_use]
    pub fn width(&self) -> u16 {
        self.info.width
    }

    /// Image height, zero before headers have been decoded.
    #[must_use]
    pub fn height(&self) -> u16 {
        self.info.height
    }

    /// Frame information, `None` before headers have been decoded.
    #[must_use]
    pub fn info(&self) -> Option<ImageInfo> {
        if !self.headers_decoded {
            return None;
        }
        Some(self.info.clone())
    }

    /// Colorspace [`decode`](JpegDecoder::decode) will produce, or
    /// `None` before headers have been decoded.
    #[must_use]
    pub fn colorspace(&self) -> Option<ColorSpace> {
        if !self.headers_decoded {
            return None;
        }
        match self.info.components {
            1 => Some(ColorSpace::Luma),
            3 => Some(ColorSpace::YCbCr),
            _ => Some(ColorSpace::Unknown)
        }
    }

    /// Parse markers up to and including the start of scan, leaving
    /// the stream at the first entropy coded byte.
    pub fn decode_headers(&mut self) -> Result<(), DecodeErrors> {
        if self.headers_decoded {
            warn!("Headers already decoded");
            return Ok(());
        }

        let magic_bytes = self.stream.get_u16_be_err()?;

        if magic_bytes != 0xffd8 {
            return Err(DecodeErrors::IllegalMagicBytes(magic_bytes));
        }

        let mut last_byte = 0;
        let mut bytes_before_marker = 0;

        loop {
            let m = self.stream.get_u8_err()?;

            if last_byte == 0xff {
                if let Some(marker) = Marker::from_u8(m) {
                    if bytes_before_marker > 3 {
                        if self.options.strict_mode() {
                            return Err(DecodeErrors::FormatStatic(
                                "[strict-mode]: Extra bytes between headers"
                            ));
                        }
                        error!(
                            "Extra bytes {} before marker 0xFF{:X}",
                            bytes_before_marker - 3,
                            m
                        );
                    }
                    bytes_before_marker = 0;

                    self.parse_marker_inner(marker)?;

                    if marker == Marker::SOS {
                        self.headers_decoded = true;
                        return Ok(());
                    }

                    last_byte = 0;
                    continue;
                }
            }

            last_byte = m;
            bytes_before_marker += 1;
        }
    }

    pub(crate) fn parse_marker_inner(&mut self, marker: Marker) -> Result<(), DecodeErrors> {
        match marker {
            Marker::SOF(0) => {
                trace!("Baseline sequential DCT frame");
                parse_start_of_frame(SOFMarkers::BaselineDct, self)?;
            }
            Marker::SOF(v) => {
                // recognized structurally, but decoding them is out of
                // scope for a baseline decoder
                if let Some(scheme) = UnsupportedSchemes::from_sof(v) {
                    return Err(DecodeErrors::Unsupported(scheme));
                }
                return Err(DecodeErrors::Format(format!(
                    "Unsupported start of frame marker SOF{v}"
                )));
            }
            Marker::DQT => parse_dqt(self)?,
            Marker::DHT => parse_huffman(self)?,
            Marker::SOS => parse_sos(self)?,
            Marker::DRI => {
                trace!("DRI marker present");

                if self.stream.get_u16_be_err()? != 4 {
                    return Err(DecodeErrors::FormatStatic("Bad DRI length, corrupt JPEG"));
                }
                self.restart_interval = usize::from(self.stream.get_u16_be_err()?);
            }
            Marker::EOI => {
                return Err(DecodeErrors::FormatStatic("Premature end of image"));
            }
            Marker::DAC | Marker::DNL => {
                return Err(DecodeErrors::Format(format!(
                    "Cannot parse marker {marker:?}, not supported"
                )));
            }
            Marker::SOI | Marker::RST(_) => {
                return Err(DecodeErrors::Format(format!(
                    "Marker {marker:?} found where it is not allowed"
                )));
            }
            Marker::APP(_) | Marker::COM | Marker::JPG(_) => {
                // skippable segments we carry no state for
                let length = self.stream.get_u16_be_err()?;

                if length < 2 {
                    return Err(DecodeErrors::Format(format!(
                        "Found a marker with invalid length {length}"
                    )));
                }
                trace!("Skipping {} bytes of {marker:?}", length - 2);
                self.stream.skip(usize::from(length) - 2);
            }
        }
        Ok(())
    }

    /// Decode the image.
    ///
    /// One component frames produce greyscale images, three component
    /// frames YCbCr; anything else is refused.
    pub fn decode(&mut self) -> Result<DynamicImage, DecodeErrors> {
        if !self.headers_decoded {
            self.decode_headers()?;
        }

        match self.info.components {
            1 | 3 => {}
            n => return Err(DecodeErrors::UnsupportedComponents(n))
        }

        self.setup_mcu_params()?;
        self.decode_mcu_baseline()?;

        Ok(self.assemble_image())
    }

    /// Fix up sampling factors, size the MCU grid and allocate the
    /// component planes.
    fn setup_mcu_params(&mut self) -> Result<(), DecodeErrors> {
        // a single component scan is never interleaved; its declared
        // sampling factors are ignored and treated as (1, 1)
        if self.components.len() == 1 {
            self.components[0].horizontal_sample = 1;
            self.components[0].vertical_sample = 1;
        }

        let h_max = self
            .components
            .iter()
            .map(|c| c.horizontal_sample)
            .max()
            .unwrap();
        let v_max = self
            .components
            .iter()
            .map(|c| c.vertical_sample)
            .max()
            .unwrap();

        for component in &self.components {
            // replication upsampling needs whole number ratios
            if h_max % component.horizontal_sample != 0 || v_max % component.vertical_sample != 0 {
                return Err(DecodeErrors::Format(format!(
                    "Cannot up-sample component {} with factors ({}, {}) against maximums ({h_max}, {v_max})",
                    component.id, component.horizontal_sample, component.vertical_sample
                )));
            }
        }

        self.h_max = h_max;
        self.v_max = v_max;

        let width = usize::from(self.info.width);
        let height = usize::from(self.info.height);

        self.mcu_x = (width + 8 * h_max - 1) / (8 * h_max);
        self.mcu_y = (height + 8 * v_max - 1) / (8 * v_max);

        trace!("MCU grid: {} x {}", self.mcu_x, self.mcu_y);

        for component in &mut self.components {
            component.width_stride = self.mcu_x * component.horizontal_sample * 8;

            let plane_height = self.mcu_y * component.vertical_sample * 8;
            component.plane = vec![0; component.width_stride * plane_height];

            component.quantization_table = self.qt_tables
                [usize::from(component.quantization_table_number)]
            .ok_or_else(|| {
                DecodeErrors::DqtError(format!(
                    "No quantization table {} defined for component {}",
                    component.quantization_table_number, component.id
                ))
            })?;

            if self.dc_huffman_tables[component.dc_huff_table % MAX_COMPONENTS].is_none() {
                return Err(DecodeErrors::HuffmanDecode(format!(
                    "No DC table for component {}",
                    component.id
                )));
            }
            if self.ac_huffman_tables[component.ac_huff_table % MAX_COMPONENTS].is_none() {
                return Err(DecodeErrors::HuffmanDecode(format!(
                    "No AC table for component {}",
                    component.id
                )));
            }
        }

        Ok(())
    }

    /// The main decode loop: every MCU in raster order, per MCU the
    /// scan components in scan order, per component its data units in
    /// row major order.
    fn decode_mcu_baseline(&mut self) -> Result<(), DecodeErrors> {
        let mut stream = BitStream::new();
        let mut tmp = [0_i32; 64];

        let total_mcus = self.mcu_x * self.mcu_y;
        let mcus_per_row = self.mcu_x;
        let scan_len = self.components.len();

        let mut todo = if self.restart_interval == 0 {
            usize::MAX
        } else {
            self.restart_interval
        };
        let mut expected_rst: u8 = 0;

        for mcu in 0..total_mcus {
            let mcu_col = mcu % mcus_per_row;
            let mcu_row = mcu / mcus_per_row;

            for scan_idx in 0..scan_len {
                let k = self.z_order[scan_idx];

                let component = &mut self.components[k];

                let dc_table = self.dc_huffman_tables[component.dc_huff_table % MAX_COMPONENTS]
                    .as_ref()
                    .ok_or(DecodeErrors::FormatStatic("DC table not found"))?;
                let ac_table = self.ac_huffman_tables[component.ac_huff_table % MAX_COMPONENTS]
                    .as_ref()
                    .ok_or(DecodeErrors::FormatStatic("AC table not found"))?;

                let stride = component.width_stride;

                for v_samp in 0..component.vertical_sample {
                    for h_samp in 0..component.horizontal_sample {
                        tmp.fill(0);

                        stream.decode_block(
                            &mut self.stream,
                            dc_table,
                            ac_table,
                            &component.quantization_table,
                            &mut tmp,
                            &mut component.dc_pred
                        )?;

                        let block_x = mcu_col * component.horizontal_sample + h_samp;
                        let block_y = mcu_row * component.vertical_sample + v_samp;
                        let offset = block_y * 8 * stride + block_x * 8;

                        idct_block(&mut tmp, &mut component.plane[offset..], stride);
                    }
                }
            }

            // either the input ran dry with no marker, or a
            // terminating marker drained the buffer while data units
            // were still owed
            if mcu + 1 < total_mcus && stream.terminated() {
                error!("Premature end of stream after {} MCUs", mcu + 1);
                return Err(DecodeErrors::ExhaustedData);
            }

            if self.restart_interval != 0 {
                todo -= 1;

                if todo == 0 {
                    todo = self.restart_interval;

                    if mcu + 1 < total_mcus {
                        self.handle_restart(&mut stream, &mut expected_rst)?;
                    }
                }
            }
        }

        trace!("Finished decoding {total_mcus} MCUs");

        Ok(())
    }

    /// Re-synchronize at a restart boundary: byte align, consume the
    /// RST marker and zero every DC predictor.
    fn handle_restart(
        &mut self, stream: &mut BitStream, expected: &mut u8
    ) -> Result<(), DecodeErrors> {
        match stream.read_marker(&mut self.stream) {
            Some(Marker::RST(m)) => {
                if m != *expected {
                    // tolerated; the count, not the index, drives
                    // re-synchronization
                    warn!("Restart marker index {m} where {expected} was expected");
                }
                *expected = (m + 1) & 7;

                stream.reset();

                for component in &mut self.components {
                    component.dc_pred = 0;
                }
                Ok(())
            }
            other => Err(DecodeErrors::MissingRestart(format!(
                "Expected a restart marker after {} MCUs, found {other:?}",
                self.restart_interval
            )))
        }
    }

    /// Interleave the component planes into the output image,
    /// replicating sub-sampled components to image resolution.
    fn assemble_image(&mut self) -> DynamicImage {
        let width = usize::from(self.info.width);
        let height = usize::from(self.info.height);

        if self.components.len() == 1 {
            let component = &self.components[0];
            let mut data = Vec::with_capacity(width * height);

            for y in 0..height {
                let row = &component.plane[y * component.width_stride..];
                data.extend_from_slice(&row[..width]);
            }

            return DynamicImage::Luma8(Image::<Y8>::from_raw(width, height, data));
        }

        let mut data = Vec::with_capacity(width * height * 3);

        for y in 0..height {
            for x in 0..width {
                for component in &self.components {
                    // nearest neighbour: image position scaled down by
                    // the component's sampling ratio
                    let cx = x * component.horizontal_sample / self.h_max;
                    let cy = y * component.vertical_sample / self.v_max;

                    data.push(component.plane[cy * component.width_stride + cx]);
                }
            }
        }

        DynamicImage::YCbCr8(Image::<YCbCr8>::from_raw(width, height, data))
    }
}
