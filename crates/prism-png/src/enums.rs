#![allow(clippy::upper_case_acronyms, non_camel_case_types)]

/// Chunk types the decoder distinguishes.
///
/// Everything else parses as `unkn` and is skipped after its CRC has
/// been verified.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PngChunkType {
    IHDR,
    PLTE,
    IDAT,
    IEND,
    gAMA,
    unkn
}

/// Scanline filter types, one byte ahead of every encoded scanline.
///
/// `PaethFirst` and `AvgFirst` are not wire values; the first scanline
/// of a pass has no row above it, and these variants mark that the
/// previous row reads as zero.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FilterMethod {
    None,
    Sub,
    Up,
    Average,
    Paeth,
    PaethFirst,
    AvgFirst,
    Unknown
}

impl FilterMethod {
    pub fn from_int(int: u8) -> Option<FilterMethod> {
        match int {
            0 => Some(FilterMethod::None),
            1 => Some(FilterMethod::Sub),
            2 => Some(FilterMethod::Up),
            3 => Some(FilterMethod::Average),
            4 => Some(FilterMethod::Paeth),
            _ => None
        }
    }
}

impl Default for FilterMethod {
    fn default() -> Self {
        FilterMethod::Unknown
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InterlaceMethod {
    Standard,
    Adam7,
    Unknown
}

impl Default for InterlaceMethod {
    fn default() -> Self {
        Self::Unknown
    }
}

impl InterlaceMethod {
    pub fn from_int(int: u8) -> Option<InterlaceMethod> {
        match int {
            0 => Some(Self::Standard),
            1 => Some(Self::Adam7),
            _ => None
        }
    }
}

/// Color type field of the IHDR chunk.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PngColor {
    Luma,
    Palette,
    LumaA,
    RGB,
    RGBA,
    Unknown
}

impl Default for PngColor {
    fn default() -> Self {
        Self::Unknown
    }
}

impl PngColor {
    /// Samples one pixel of this color type occupies on the wire.
    ///
    /// Indexed images carry one palette index per pixel.
    pub(crate) fn num_components(self) -> u8 {
        match self {
            PngColor::Luma | PngColor::Palette => 1,
            PngColor::LumaA => 2,
            PngColor::RGB => 3,
            PngColor::RGBA => 4,
            PngColor::Unknown => unreachable!()
        }
    }

    /// True if `depth` is a legal bit depth for this color type,
    /// per the (color type, bit depth) matrix of the standard.
    pub(crate) fn supports_depth(self, depth: u8) -> bool {
        match self {
            PngColor::Luma => matches!(depth, 1 | 2 | 4 | 8 | 16),
            PngColor::Palette => matches!(depth, 1 | 2 | 4 | 8),
            PngColor::LumaA | PngColor::RGB | PngColor::RGBA => matches!(depth, 8 | 16),
            PngColor::Unknown => false
        }
    }

    pub(crate) fn from_int(int: u8) -> Option<PngColor> {
        match int {
            0 => Some(Self::Luma),
            2 => Some(Self::RGB),
            3 => Some(Self::Palette),
            4 => Some(Self::LumaA),
            6 => Some(Self::RGBA),
            _ => None
        }
    }
}
