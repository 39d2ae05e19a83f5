/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Parsing of JPEG marker segments.
use log::trace;

use crate::components::Component;
use crate::decoder::{JpegDecoder, MAX_COMPONENTS};
use crate::errors::DecodeErrors;
use crate::huffman::HuffmanTable;
use crate::misc::{SOFMarkers, UN_ZIGZAG};

/// **B.2.4.2 Huffman table-specification syntax**
pub(crate) fn parse_huffman(decoder: &mut JpegDecoder) -> Result<(), DecodeErrors> {
    let mut dht_length =
        i32::from(decoder.stream.get_u16_be_err()?.checked_sub(2).ok_or(
            DecodeErrors::FormatStatic("Invalid Huffman length in image")
        )?);

    // a single DHT segment may hold several tables
    while dht_length > 16 {
        let ht_info = decoder.stream.get_u8_err()?;

        // top nibble: 0 = DC table, 1 = AC table
        let dc_or_ac = (ht_info >> 4) & 0xf;
        // bottom nibble: destination slot
        let index = usize::from(ht_info & 0xf);

        if index >= MAX_COMPONENTS {
            return Err(DecodeErrors::HuffmanDecode(format!(
                "Invalid DHT destination {index}, expected between 0 and 3"
            )));
        }

        if dc_or_ac > 1 {
            return Err(DecodeErrors::HuffmanDecode(format!(
                "Invalid DHT class {dc_or_ac}, should be 0 or 1"
            )));
        }

        let mut counts = [0_u8; 16];
        decoder.stream.read_exact(&mut counts)?;

        dht_length -= 1 + 16;

        let symbols_sum: i32 = counts.iter().map(|f| i32::from(*f)).sum();

        if symbols_sum > 256 {
            return Err(DecodeErrors::FormatStatic(
                "Huffman table with excessive number of symbols in DHT"
            ));
        }
        if symbols_sum > dht_length {
            return Err(DecodeErrors::HuffmanDecode(format!(
                "Huffman table of {symbols_sum} symbols overruns the DHT segment, {dht_length} bytes remain"
            )));
        }
        dht_length -= symbols_sum;

        let mut symbols = [0_u8; 256];
        decoder
            .stream
            .read_exact(&mut symbols[..symbols_sum as usize])?;

        trace!(
            "DHT: {} table, destination {index}, {symbols_sum} symbols",
            if dc_or_ac == 0 { "DC" } else { "AC" }
        );

        let table = HuffmanTable::new(&counts, symbols)?;

        if dc_or_ac == 0 {
            decoder.dc_huffman_tables[index] = Some(table);
        } else {
            decoder.ac_huffman_tables[index] = Some(table);
        }
    }

    if dht_length > 0 {
        return Err(DecodeErrors::FormatStatic("Bogus Huffman table definition"));
    }

    Ok(())
}

/// **B.2.4.1 Quantization table-specification syntax**
pub(crate) fn parse_dqt(decoder: &mut JpegDecoder) -> Result<(), DecodeErrors> {
    let mut qt_length =
        decoder
            .stream
            .get_u16_be_err()?
            .checked_sub(2)
            .ok_or(DecodeErrors::FormatStatic(
                "Invalid DQT length, should be greater than 2"
            ))?;

    // a single DQT segment may hold several tables
    while qt_length > 0 {
        let qt_info = decoder.stream.get_u8_err()?;

        // top nibble: 0 = 8-bit entries, 1 = 16-bit entries
        let precision = usize::from(qt_info >> 4);
        let table_position = usize::from(qt_info & 0x0f);

        let table_bytes = 64 * (precision + 1);

        if (table_bytes + 1) as u16 > qt_length {
            return Err(DecodeErrors::DqtError(format!(
                "Too short DQT segment, {qt_length} bytes left but the table needs {}",
                table_bytes + 1
            )));
        }

        let table = match precision {
            0 => {
                let mut values = [0_u8; 64];
                decoder.stream.read_exact(&mut values)?;

                un_zig_zag(&values)
            }
            1 => {
                let mut values = [0_u16; 64];

                for value in values.iter_mut() {
                    *value = decoder.stream.get_u16_be_err()?;
                }
                un_zig_zag(&values)
            }
            _ => {
                return Err(DecodeErrors::DqtError(format!(
                    "Expected DQT precision of 0 or 1, found {precision}"
                )));
            }
        };

        qt_length -= (table_bytes as u16) + 1;

        if table_position >= MAX_COMPONENTS {
            return Err(DecodeErrors::DqtError(format!(
                "Too large DQT destination {table_position}, expected between 0 and 3"
            )));
        }

        trace!("DQT: assigning table {table_position} with precision {precision}");
        decoder.qt_tables[table_position] = Some(table);
    }

    Ok(())
}

/// **B.2.2 Frame header syntax**
pub(crate) fn parse_start_of_frame(
    sof: SOFMarkers, decoder: &mut JpegDecoder
) -> Result<(), DecodeErrors> {
    if decoder.seen_sof {
        return Err(DecodeErrors::SofError(
            "Two start of frame markers".to_string()
        ));
    }

    let length = decoder.stream.get_u16_be_err()?;

    // 12 and 16 bit sample precision is extended sequential, not
    // baseline
    let precision = decoder.stream.get_u8_err()?;

    if precision != 8 {
        return Err(DecodeErrors::SofError(format!(
            "Only 8-bit sample precision is supported, image has {precision} bits"
        )));
    }

    let img_height = decoder.stream.get_u16_be_err()?;
    let img_width = decoder.stream.get_u16_be_err()?;

    trace!("Image width  :{img_width}");
    trace!("Image height :{img_height}");

    if img_width == 0 || img_height == 0 {
        return Err(DecodeErrors::ZeroError);
    }

    if usize::from(img_width) > decoder.options.max_width() {
        return Err(DecodeErrors::Format(format!(
            "Image width {img_width} greater than width limit {}",
            decoder.options.max_width()
        )));
    }

    if usize::from(img_height) > decoder.options.max_height() {
        return Err(DecodeErrors::Format(format!(
            "Image height {img_height} greater than height limit {}",
            decoder.options.max_height()
        )));
    }

    let num_components = decoder.stream.get_u8_err()?;

    if num_components == 0 {
        return Err(DecodeErrors::SofError(
            "Number of components cannot be zero".to_string()
        ));
    }

    let expected = 8 + 3 * u16::from(num_components);

    if length != expected {
        return Err(DecodeErrors::SofError(format!(
            "Frame header length should be {expected}, found {length}"
        )));
    }

    let mut components = Vec::with_capacity(usize::from(num_components));

    for pos in 0..num_components {
        let mut entry = [0_u8; 3];
        decoder.stream.read_exact(&mut entry)?;

        components.push(Component::from(entry, pos)?);
    }

    decoder.info.width = img_width;
    decoder.info.height = img_height;
    decoder.info.components = num_components;
    decoder.info.sof = sof;

    decoder.components = components;
    decoder.seen_sof = true;

    Ok(())
}

/// **B.2.3 Scan header syntax**
pub(crate) fn parse_sos(decoder: &mut JpegDecoder) -> Result<(), DecodeErrors> {
    if !decoder.seen_sof {
        return Err(DecodeErrors::SosError(
            "Start of scan before start of frame, corrupt jpeg".to_string()
        ));
    }

    let ls = usize::from(decoder.stream.get_u16_be_err()?);
    let ns = decoder.stream.get_u8_err()?;

    if ls != 6 + 2 * usize::from(ns) {
        return Err(DecodeErrors::SosError(format!(
            "Bad SOS length {ls}, corrupt jpeg"
        )));
    }

    if !(1..=4).contains(&ns) {
        return Err(DecodeErrors::SosError(format!(
            "Invalid number of scan components {ns}, expected 1..=4"
        )));
    }

    // a baseline frame is decodable only when one scan interleaves
    // every frame component
    if ns != decoder.info.components {
        return Err(DecodeErrors::SosError(format!(
            "Scan carries {ns} components but the frame has {}, multi-scan baseline images are not supported",
            decoder.info.components
        )));
    }

    for scan_pos in 0..usize::from(ns) {
        let id = decoder.stream.get_u8_err()?;
        // top nibble DC table destination, bottom nibble AC
        let tables = decoder.stream.get_u8_err()?;

        let component_pos = decoder
            .components
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| {
                DecodeErrors::SosError(format!(
                    "Scan component id {id} does not match any frame component"
                ))
            })?;

        let component = &mut decoder.components[component_pos];

        component.dc_huff_table = usize::from((tables >> 4) & 0xf);
        component.ac_huff_table = usize::from(tables & 0xf);

        // scan order of components, the MCU loop follows this
        decoder.z_order[scan_pos] = component_pos;

        trace!(
            "SOS: component {id} uses DC table {} and AC table {}",
            component.dc_huff_table,
            component.ac_huff_table
        );
    }

    // spectral selection and successive approximation are fixed for
    // baseline scans
    let spec_start = decoder.stream.get_u8_err()?;
    let spec_end = decoder.stream.get_u8_err()?;
    let approx = decoder.stream.get_u8_err()?;

    if spec_start != 0 || spec_end != 63 || approx != 0 {
        return Err(DecodeErrors::SosError(format!(
            "Bad baseline scan parameters Ss={spec_start} Se={spec_end} AhAl={approx}, expected 0, 63, 0"
        )));
    }

    Ok(())
}

/// Bring a stored zig-zag ordered table into natural raster order.
fn un_zig_zag<T>(values: &[T]) -> [i32; 64]
where
    T: Copy,
    i32: From<T>
{
    let mut output = [0_i32; 64];

    for i in 0..64 {
        output[UN_ZIGZAG[i]] = i32::from(values[i]);
    }

    output
}
