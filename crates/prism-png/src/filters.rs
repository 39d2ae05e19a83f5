/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Scanline filter reconstruction.
//!
//! Each function undoes one filter type over a whole scanline.
//! `raw` is the filtered wire data (without its leading filter byte),
//! `prev_row` the already reconstructed scanline above, `current` the
//! destination, and `stride` the byte distance between a byte and its
//! left neighbour (`max(1, samples_per_pixel * bytes_per_sample)`).
//!
//! All additions are modulo 256. The first scanline of a pass has no
//! row above it and uses the `*_first` variants where the predictor
//! degenerates.

pub fn handle_sub(raw: &[u8], current: &mut [u8], stride: usize) {
    if raw.len() < stride || current.len() < stride {
        return;
    }
    // leftmost bytes have no left neighbour
    current[..stride].copy_from_slice(&raw[..stride]);

    let end = current.len().min(raw.len());

    for i in stride..end {
        let a = current[i - stride];
        current[i] = raw[i].wrapping_add(a);
    }
}

pub fn handle_up(prev_row: &[u8], raw: &[u8], current: &mut [u8]) {
    for ((filt, recon), up) in raw.iter().zip(current.iter_mut()).zip(prev_row) {
        *recon = (*filt).wrapping_add(*up);
    }
}

pub fn handle_avg(prev_row: &[u8], raw: &[u8], current: &mut [u8], stride: usize) {
    if raw.len() < stride || current.len() < stride {
        return;
    }
    for i in 0..stride {
        current[i] = raw[i].wrapping_add(prev_row[i] >> 1);
    }

    let end = current.len().min(raw.len()).min(prev_row.len());

    for i in stride..end {
        let a = current[i - stride];
        let b = prev_row[i];

        // overflow free average of two u8 values, from the stanford
        // bit hacks page; keeps the arithmetic in eight bits
        let avg = (a & b) + ((a ^ b) >> 1);

        current[i] = raw[i].wrapping_add(avg);
    }
}

/// Average filter on the first scanline of a pass, the row above
/// reads as zero so the predictor is half the left neighbour.
pub fn handle_avg_first(raw: &[u8], current: &mut [u8], stride: usize) {
    if raw.len() < stride || current.len() < stride {
        return;
    }
    current[..stride].copy_from_slice(&raw[..stride]);

    let end = current.len().min(raw.len());

    for i in stride..end {
        let avg = current[i - stride] >> 1;
        current[i] = raw[i].wrapping_add(avg);
    }
}

pub fn handle_paeth(prev_row: &[u8], raw: &[u8], current: &mut [u8], stride: usize) {
    if raw.len() < stride || current.len() < stride {
        return;
    }
    for i in 0..stride {
        current[i] = raw[i].wrapping_add(paeth(0, prev_row[i], 0));
    }

    let end = current.len().min(raw.len()).min(prev_row.len());

    for i in stride..end {
        let predictor = paeth(current[i - stride], prev_row[i], prev_row[i - stride]);
        current[i] = raw[i].wrapping_add(predictor);
    }
}

/// Paeth filter on the first scanline of a pass; with the row above
/// reading as zero the predictor collapses to the left neighbour.
pub fn handle_paeth_first(raw: &[u8], current: &mut [u8], stride: usize) {
    if raw.len() < stride || current.len() < stride {
        return;
    }
    current[..stride].copy_from_slice(&raw[..stride]);

    let end = current.len().min(raw.len());

    for i in stride..end {
        let predictor = paeth(current[i - stride], 0, 0);
        current[i] = raw[i].wrapping_add(predictor);
    }
}

/// The Paeth predictor, choosing whichever of left, above and
/// above-left lies closest to `a + b - c`, ties broken in that order.
///
/// With `p = a + b - c` the three distances fold to
/// `|p - a| = |b - c|`, `|p - b| = |a - c|` and `|p - c| = |p - c|`,
/// so the estimate itself never needs to be materialized.
#[inline(always)]
pub fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let (ia, ib, ic) = (i32::from(a), i32::from(b), i32::from(c));

    let pa = (ib - ic).abs();
    let pb = (ia - ic).abs();
    let pc = (ia + ib - 2 * ic).abs();

    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The predictor exactly as the standard spells it.
    fn paeth_reference(a: u8, b: u8, c: u8) -> u8 {
        let p = i32::from(a) + i32::from(b) - i32::from(c);
        let pa = (p - i32::from(a)).abs();
        let pb = (p - i32::from(b)).abs();
        let pc = (p - i32::from(c)).abs();

        if pa <= pb && pa <= pc {
            a
        } else if pb <= pc {
            b
        } else {
            c
        }
    }

    #[test]
    fn paeth_matches_reference_exhaustively() {
        for a in 0..=255_u8 {
            for b in 0..=255_u8 {
                for c in 0..=255_u8 {
                    assert_eq!(
                        paeth(a, b, c),
                        paeth_reference(a, b, c),
                        "mismatch at a={a} b={b} c={c}"
                    );
                }
            }
        }
    }

    #[test]
    fn sub_accumulates_left_neighbour() {
        let raw = [1_u8, 1, 1, 1, 1, 1];
        let mut current = [0_u8; 6];

        handle_sub(&raw, &mut current, 1);
        assert_eq!(current, [1, 2, 3, 4, 5, 6]);

        // with a three byte pixel each channel accumulates separately
        let mut current = [0_u8; 6];
        handle_sub(&raw, &mut current, 3);
        assert_eq!(current, [1, 1, 1, 2, 2, 2]);
    }

    #[test]
    fn up_adds_previous_row() {
        let prev = [10_u8, 20, 30];
        let raw = [1_u8, 2, 3];
        let mut current = [0_u8; 3];

        handle_up(&prev, &raw, &mut current);
        assert_eq!(current, [11, 22, 33]);
    }

    #[test]
    fn average_widens_before_halving() {
        // a + b would overflow u8; the filter must not wrap
        let prev = [255_u8, 255];
        let raw = [0_u8, 0];
        let mut current = [0_u8; 2];

        handle_avg(&prev, &raw, &mut current, 1);
        // first byte: floor((0 + 255)/2) = 127, second:
        // floor((127 + 255)/2) = 191
        assert_eq!(current, [127, 191]);
    }
}
