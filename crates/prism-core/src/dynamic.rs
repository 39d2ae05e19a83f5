/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The dynamically typed image.
//!
//! Format-agnostic decoders do not know the pixel type of an image
//! until its headers have been parsed, so they return
//! [`DynamicImage`], a tagged union over the concrete
//! [`Image`](crate::image::Image) instantiations.
//!
//! [`FromDynamic`] lets callers collapse the union back into a
//! statically requested pixel type; the request succeeds only along
//! lossless [`Promote`] edges.
use crate::colorspace::ColorSpace;
use crate::image::Image;
use crate::pixel::{Pixel, Promote, RGB8, RGBA8, RGBF, Y8, YA8, YCbCr8, YF};

/// An image whose pixel type was chosen at runtime.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum DynamicImage {
    Luma8(Image<Y8>),
    LumaF32(Image<YF>),
    LumaA8(Image<YA8>),
    Rgb8(Image<RGB8>),
    RgbF32(Image<RGBF>),
    Rgba8(Image<RGBA8>),
    YCbCr8(Image<YCbCr8>)
}

impl DynamicImage {
    pub fn width(&self) -> usize {
        match self {
            Self::Luma8(image) => image.width(),
            Self::LumaF32(image) => image.width(),
            Self::LumaA8(image) => image.width(),
            Self::Rgb8(image) => image.width(),
            Self::RgbF32(image) => image.width(),
            Self::Rgba8(image) => image.width(),
            Self::YCbCr8(image) => image.width()
        }
    }

    pub fn height(&self) -> usize {
        match self {
            Self::Luma8(image) => image.height(),
            Self::LumaF32(image) => image.height(),
            Self::LumaA8(image) => image.height(),
            Self::Rgb8(image) => image.height(),
            Self::RgbF32(image) => image.height(),
            Self::Rgba8(image) => image.height(),
            Self::YCbCr8(image) => image.height()
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    /// The colorspace of the pixel type stored in this image.
    pub fn colorspace(&self) -> ColorSpace {
        match self {
            Self::Luma8(_) | Self::LumaF32(_) => ColorSpace::Luma,
            Self::LumaA8(_) => ColorSpace::LumaA,
            Self::Rgb8(_) | Self::RgbF32(_) => ColorSpace::RGB,
            Self::Rgba8(_) => ColorSpace::RGBA,
            Self::YCbCr8(_) => ColorSpace::YCbCr
        }
    }
}

macro_rules! impl_from_image {
    ($pixel:ty, $variant:ident) => {
        impl From<Image<$pixel>> for DynamicImage {
            fn from(image: Image<$pixel>) -> DynamicImage {
                DynamicImage::$variant(image)
            }
        }
    };
}

impl_from_image!(Y8, Luma8);
impl_from_image!(YF, LumaF32);
impl_from_image!(YA8, LumaA8);
impl_from_image!(RGB8, Rgb8);
impl_from_image!(RGBF, RgbF32);
impl_from_image!(RGBA8, Rgba8);
impl_from_image!(YCbCr8, YCbCr8);

/// Collapse a [`DynamicImage`] into a statically typed image.
///
/// Implementations follow the lossless promotion DAG only; asking for
/// a pixel type the stored image cannot reach without losing
/// information returns `None`.
pub trait FromDynamic: Pixel + Sized {
    fn from_dynamic(image: DynamicImage) -> Option<Image<Self>>;
}

fn promoted<A, B>(image: Image<A>) -> Image<B>
where
    A: Pixel + Promote<B>,
    B: Pixel
{
    image.map_pixels(Promote::promote)
}

impl FromDynamic for Y8 {
    fn from_dynamic(image: DynamicImage) -> Option<Image<Y8>> {
        match image {
            DynamicImage::Luma8(image) => Some(image),
            _ => None
        }
    }
}

impl FromDynamic for YF {
    fn from_dynamic(image: DynamicImage) -> Option<Image<YF>> {
        match image {
            DynamicImage::Luma8(image) => Some(promoted(image)),
            DynamicImage::LumaF32(image) => Some(image),
            _ => None
        }
    }
}

impl FromDynamic for YA8 {
    fn from_dynamic(image: DynamicImage) -> Option<Image<YA8>> {
        match image {
            DynamicImage::Luma8(image) => Some(promoted(image)),
            DynamicImage::LumaA8(image) => Some(image),
            _ => None
        }
    }
}

impl FromDynamic for RGB8 {
    fn from_dynamic(image: DynamicImage) -> Option<Image<RGB8>> {
        match image {
            DynamicImage::Luma8(image) => Some(promoted(image)),
            DynamicImage::LumaA8(image) => Some(promoted(image)),
            DynamicImage::Rgb8(image) => Some(image),
            _ => None
        }
    }
}

impl FromDynamic for RGBF {
    fn from_dynamic(image: DynamicImage) -> Option<Image<RGBF>> {
        match image {
            DynamicImage::Luma8(image) => {
                Some(image.map_pixels(|p| Promote::<RGB8>::promote(p).promote()))
            }
            DynamicImage::LumaA8(image) => {
                Some(image.map_pixels(|p| Promote::<RGB8>::promote(p).promote()))
            }
            DynamicImage::LumaF32(image) => Some(promoted(image)),
            DynamicImage::Rgb8(image) => Some(promoted(image)),
            DynamicImage::RgbF32(image) => Some(image),
            _ => None
        }
    }
}

impl FromDynamic for RGBA8 {
    fn from_dynamic(image: DynamicImage) -> Option<Image<RGBA8>> {
        match image {
            DynamicImage::Luma8(image) => Some(promoted(image)),
            DynamicImage::LumaA8(image) => Some(promoted(image)),
            DynamicImage::Rgb8(image) => Some(promoted(image)),
            DynamicImage::Rgba8(image) => Some(image),
            _ => None
        }
    }
}

impl FromDynamic for YCbCr8 {
    fn from_dynamic(image: DynamicImage) -> Option<Image<YCbCr8>> {
        match image {
            DynamicImage::YCbCr8(image) => Some(image),
            _ => None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::Luma;

    #[test]
    fn promotion_through_dynamic_follows_dag() {
        let grey: Image<Y8> = Image::from_fn(2, 2, |x, _| Luma([x as u8 * 100]));
        let dynamic = DynamicImage::from(grey);

        let rgba = RGBA8::from_dynamic(dynamic.clone()).unwrap();
        assert_eq!(rgba.pixel_at(1, 0).0, [100, 100, 100, 255]);

        // RGB stored images cannot narrow back down to greyscale
        let rgb = RGB8::from_dynamic(dynamic).unwrap();
        assert!(Y8::from_dynamic(DynamicImage::from(rgb)).is_none());
    }

    #[test]
    fn colorspace_tracks_variant() {
        let image: Image<YCbCr8> = Image::new(1, 1);
        assert_eq!(
            DynamicImage::from(image).colorspace(),
            ColorSpace::YCbCr
        );
    }
}
