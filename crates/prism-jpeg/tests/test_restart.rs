/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Restart interval handling on hand-assembled streams.
use prism_core::dynamic::DynamicImage;
use prism_jpeg::{DecodeErrors, JpegDecoder};

mod common;
use common::{grey_headers, put_flat_block, BitSink};

/// A 16x8 greyscale image is two MCUs wide at (1, 1) sampling.
fn two_mcu_stream(restart_interval: Option<u16>, with_rst: bool) -> Vec<u8> {
    let mut file = grey_headers(16, 8, restart_interval);

    let mut sink = BitSink::default();
    put_flat_block(&mut sink);
    sink.pad();

    if with_rst {
        file.extend_from_slice(&sink.out);
        file.extend_from_slice(&[0xff, 0xd0]); // RST0
        let mut second = BitSink::default();
        put_flat_block(&mut second);
        second.pad();
        file.extend_from_slice(&second.out);
    } else if restart_interval.is_some() {
        // drop the marker, splice the second MCU in byte aligned
        file.extend_from_slice(&sink.out);
        let mut second = BitSink::default();
        put_flat_block(&mut second);
        second.pad();
        file.extend_from_slice(&second.out);
    } else {
        // no restart: both MCUs share one continuous bit stream
        let mut sink = BitSink::default();
        put_flat_block(&mut sink);
        put_flat_block(&mut sink);
        sink.pad();
        file.extend_from_slice(&sink.out);
    }

    file.extend_from_slice(&[0xff, 0xd9]); // EOI
    file
}

fn decode_grey(file: &[u8]) -> Vec<u8> {
    match JpegDecoder::new(file).decode().unwrap() {
        DynamicImage::Luma8(image) => image.into_raw(),
        other => panic!("expected Y8 output, got {other:?}")
    }
}

#[test]
fn restart_marker_resynchronizes_the_stream() {
    let with_dri = two_mcu_stream(Some(1), true);
    let pixels = decode_grey(&with_dri);

    // flat blocks on a unit quantization table decode to mid grey
    assert_eq!(pixels.len(), 16 * 8);
    assert!(pixels.iter().all(|p| *p == 128));
}

#[test]
fn missing_restart_marker_is_an_error() {
    let broken = two_mcu_stream(Some(1), false);

    match JpegDecoder::new(&broken).decode() {
        Err(DecodeErrors::MissingRestart(_)) => {}
        other => panic!("expected MissingRestart, got {other:?}")
    }
}

#[test]
fn restarted_stream_decodes_like_a_continuous_one() {
    let with_dri = two_mcu_stream(Some(1), true);
    let without_dri = two_mcu_stream(None, false);

    assert_eq!(decode_grey(&with_dri), decode_grey(&without_dri));
}

#[test]
fn mismatched_restart_index_is_tolerated() {
    // same stream but with RST3 where RST0 is expected; the count
    // drives re-sync, the index only warns
    let mut file = two_mcu_stream(Some(1), true);

    let rst_pos = file
        .windows(2)
        .position(|w| w == [0xff, 0xd0])
        .expect("restart marker present");
    file[rst_pos + 1] = 0xd3;

    let pixels = decode_grey(&file);
    assert!(pixels.iter().all(|p| *p == 128));
}
