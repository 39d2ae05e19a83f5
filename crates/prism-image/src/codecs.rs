/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Format sniffing and the format-agnostic entry points.
use log::trace;
use prism_core::dynamic::{DynamicImage, FromDynamic};
use prism_core::image::Image;
use prism_core::options::DecoderOptions;
use prism_core::pixel::YCbCr8;
use prism_jpeg::{JpegDecoder, JpegEncoder};
use prism_png::{PngDecoder, PngEncodable, PngEncoder};

use crate::errors::ImageErrors;

/// All image formats the surface can recognize.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ImageFormat {
    Png,
    Jpeg,
    /// Anything without a known signature.
    Unknown
}

impl ImageFormat {
    /// Sniff the format from the leading magic bytes.
    pub fn guess_format(bytes: &[u8]) -> ImageFormat {
        if bytes.starts_with(&[137, 80, 78, 71, 13, 10, 26, 10]) {
            return ImageFormat::Png;
        }
        if bytes.starts_with(&[0xff, 0xd8, 0xff]) {
            return ImageFormat::Jpeg;
        }
        ImageFormat::Unknown
    }
}

/// Decode a byte stream whose format is discovered from its
/// signature.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ImageErrors> {
    decode_with_options(bytes, DecoderOptions::default())
}

/// [`decode`] with explicit decoder options.
pub fn decode_with_options(
    bytes: &[u8], options: DecoderOptions
) -> Result<DynamicImage, ImageErrors> {
    let format = ImageFormat::guess_format(bytes);
    trace!("Sniffed image format {format:?}");

    match format {
        ImageFormat::Png => Ok(PngDecoder::new_with_options(bytes, options).decode()?),
        ImageFormat::Jpeg => Ok(JpegDecoder::new_with_options(bytes, options).decode()?),
        ImageFormat::Unknown => Err(ImageErrors::UnknownFormat)
    }
}

/// Decode a PNG stream.
pub fn decode_png(bytes: &[u8]) -> Result<DynamicImage, ImageErrors> {
    Ok(PngDecoder::new(bytes).decode()?)
}

/// Decode a PNG stream into a statically requested pixel type.
///
/// Succeeds only when the stored pixel type can be promoted
/// losslessly into `P`; asking an RGB file for greyscale fails with
/// [`ImageErrors::IncompatiblePromotion`].
pub fn decode_png_as<P: FromDynamic>(bytes: &[u8]) -> Result<Image<P>, ImageErrors> {
    let image = PngDecoder::new(bytes).decode()?;
    let stored = image.colorspace();

    P::from_dynamic(image).ok_or(ImageErrors::IncompatiblePromotion(stored, P::COLORSPACE))
}

/// Encode an 8-bit greyscale, RGB or RGBA image as a PNG stream.
pub fn encode_png<P: PngEncodable>(image: &Image<P>) -> Vec<u8> {
    PngEncoder::new(image).encode()
}

/// Decode a JPEG stream.
pub fn decode_jpeg(bytes: &[u8]) -> Result<DynamicImage, ImageErrors> {
    Ok(JpegDecoder::new(bytes).decode()?)
}

/// Encode a YCbCr image as a baseline 4:2:0 JPEG stream at the given
/// quality.
pub fn encode_jpeg(image: &Image<YCbCr8>, quality: u8) -> Vec<u8> {
    JpegEncoder::new(image, quality).encode()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffing_magic_bytes() {
        assert_eq!(
            ImageFormat::guess_format(&[137, 80, 78, 71, 13, 10, 26, 10, 0]),
            ImageFormat::Png
        );
        assert_eq!(
            ImageFormat::guess_format(&[0xff, 0xd8, 0xff, 0xe0]),
            ImageFormat::Jpeg
        );
        assert_eq!(ImageFormat::guess_format(b"GIF89a"), ImageFormat::Unknown);
        assert_eq!(ImageFormat::guess_format(&[]), ImageFormat::Unknown);
    }
}
