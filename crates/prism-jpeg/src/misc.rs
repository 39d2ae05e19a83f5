//! Small shared tables and types.

/// Maps a coefficient's position in the zig-zag stream to its
/// position in natural raster order.
#[rustfmt::skip]
pub const UN_ZIGZAG: [usize; 64] = [
    0,  1,  8,  16, 9,  2,  3,  10,
    17, 24, 32, 25, 18, 11, 4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13, 6,  7,  14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// Maps a coefficient's natural raster position to its position in
/// the zig-zag stream; the inverse permutation of [`UN_ZIGZAG`].
#[rustfmt::skip]
pub const ZIGZAG: [usize; 64] = [
    0,  1,  5,  6,  14, 15, 27, 28,
    2,  4,  7,  13, 16, 26, 29, 42,
    3,  8,  12, 17, 25, 30, 41, 43,
    9,  11, 18, 24, 31, 40, 44, 53,
    10, 19, 23, 32, 39, 45, 52, 54,
    20, 22, 33, 38, 46, 51, 55, 60,
    21, 34, 37, 47, 50, 56, 59, 61,
    35, 36, 48, 49, 57, 58, 62, 63,
];

/// Frame types distinguished by their start of frame marker.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
#[allow(clippy::upper_case_acronyms)]
pub enum SOFMarkers {
    /// Baseline sequential DCT with Huffman coding, the one frame
    /// type this crate decodes.
    BaselineDct,
    ExtendedSequentialHuffman,
    ProgressiveDctHuffman,
    LosslessHuffman,
    ExtendedSequentialDctArithmetic,
    ProgressiveDctArithmetic,
    LosslessArithmetic
}

impl Default for SOFMarkers {
    fn default() -> Self {
        Self::BaselineDct
    }
}

impl SOFMarkers {
    pub fn is_progressive(self) -> bool {
        matches!(
            self,
            Self::ProgressiveDctHuffman | Self::ProgressiveDctArithmetic
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zig_zag_tables_are_inverse_permutations() {
        for i in 0..64 {
            assert_eq!(ZIGZAG[UN_ZIGZAG[i]], i);
            assert_eq!(UN_ZIGZAG[ZIGZAG[i]], i);
        }
    }

    #[test]
    fn zig_zag_round_trips_any_block() {
        let block: Vec<i32> = (0..64).map(|v| v * 3 - 32).collect();

        // scatter into zig-zag order then gather back
        let mut stream = [0_i32; 64];
        for i in 0..64 {
            stream[ZIGZAG[i]] = block[i];
        }

        let mut natural = [0_i32; 64];
        for i in 0..64 {
            natural[UN_ZIGZAG[i]] = stream[i];
        }
        assert_eq!(&natural[..], &block[..]);
    }
}
