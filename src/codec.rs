//! Serializes a finished surface as BMP, JPEG or PNG.

use std::io::{Cursor, Write};

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use tracing::debug;

use crate::error::{CodecError, Result};

/// Highest accepted quality value.
pub const MAX_QUALITY: u8 = 100;

/// Output raster format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageFormat {
    Bmp,
    Jpeg,
    #[default]
    Png,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Bmp => "bmp",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }

    /// Whether the quality setting affects this format.
    pub fn is_lossy(&self) -> bool {
        matches!(self, ImageFormat::Jpeg)
    }
}

impl From<ImageFormat> for image::ImageFormat {
    fn from(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Bmp => image::ImageFormat::Bmp,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
        }
    }
}

pub(crate) fn check_quality(quality: u8) -> std::result::Result<(), CodecError> {
    if quality > MAX_QUALITY {
        return Err(CodecError::InvalidQuality(quality));
    }
    Ok(())
}

/// Composites `surface` over opaque white and drops the alpha channel.
fn flatten_on_white(surface: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(surface.width(), surface.height(), |x, y| {
        let Rgba([r, g, b, a]) = *surface.get_pixel(x, y);
        let a = u16::from(a);
        let over_white = |c: u8| ((u16::from(c) * a + 255 * (255 - a) + 127) / 255) as u8;
        Rgb([over_white(r), over_white(g), over_white(b)])
    })
}

/// Encodes `surface` and returns the complete byte stream.
///
/// `quality` only affects [`ImageFormat::Jpeg`]; BMP and PNG are lossless
/// and keep the alpha channel. JPEG carries no alpha channel, so the surface
/// is first composited over opaque white: transparent areas, such as the
/// part of a composited surface not covered by a small background, come out
/// white rather than black.
///
/// # Errors
///
/// Returns a [`CodecError`] if `quality` is above 100 or the codec fails.
pub fn encode_to_vec(surface: &RgbaImage, format: ImageFormat, quality: u8) -> Result<Vec<u8>> {
    check_quality(quality)?;

    let mut buf = Cursor::new(Vec::new());
    let written = match format {
        ImageFormat::Jpeg => {
            let rgb = flatten_on_white(surface);
            // The jpeg encoder accepts 1..=100.
            JpegEncoder::new_with_quality(&mut buf, quality.max(1)).write_image(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                ExtendedColorType::Rgb8,
            )
        }
        ImageFormat::Bmp | ImageFormat::Png => surface.write_to(&mut buf, format.into()),
    };
    written.map_err(CodecError::from)?;

    let bytes = buf.into_inner();
    debug!(?format, quality, len = bytes.len(), "encoded surface");
    Ok(bytes)
}

/// Encodes `surface` and writes the stream to `sink`.
///
/// The stream is fully encoded before anything is written, so `sink` is left
/// untouched when encoding fails. The sink is neither flushed nor closed.
///
/// # Errors
///
/// Returns a [`CodecError`] if encoding fails and
/// [`QrImageError::Io`](crate::QrImageError::Io) if writing to `sink` fails.
pub fn encode<W: Write + ?Sized>(
    surface: &RgbaImage,
    format: ImageFormat,
    quality: u8,
    sink: &mut W,
) -> Result<()> {
    let bytes = encode_to_vec(surface, format, quality)?;
    sink.write_all(&bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QrImageError;

    fn sample() -> RgbaImage {
        RgbaImage::from_fn(16, 8, |x, _| {
            if x < 8 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        })
    }

    #[test]
    fn test_png_is_lossless() {
        let img = sample();
        let bytes = encode_to_vec(&img, ImageFormat::Png, 100).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded, img);
    }

    #[test]
    fn test_bmp_ignores_quality() {
        let img = sample();
        let a = encode_to_vec(&img, ImageFormat::Bmp, 0).unwrap();
        let b = encode_to_vec(&img, ImageFormat::Bmp, 100).unwrap();
        assert!(a.starts_with(b"BM"));
        assert_eq!(a, b);
        let decoded = image::load_from_memory(&a).unwrap().to_rgba8();
        assert_eq!(decoded, img);
    }

    #[test]
    fn test_jpeg_quality_changes_output() {
        let img = RgbaImage::from_fn(64, 64, |x, y| Rgba([(x * 4) as u8, (y * 4) as u8, 128, 255]));
        let low = encode_to_vec(&img, ImageFormat::Jpeg, 10).unwrap();
        let high = encode_to_vec(&img, ImageFormat::Jpeg, 95).unwrap();
        assert!(low.starts_with(&[0xFF, 0xD8]));
        assert!(low.len() < high.len());
        let decoded = image::load_from_memory_with_format(&low, image::ImageFormat::Jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 64));
    }

    #[test]
    fn test_jpeg_quality_zero_is_accepted() {
        let bytes = encode_to_vec(&sample(), ImageFormat::Jpeg, 0).unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn test_invalid_quality_is_rejected_for_every_format() {
        for format in [ImageFormat::Bmp, ImageFormat::Jpeg, ImageFormat::Png] {
            let result = encode_to_vec(&sample(), format, 101);
            assert!(matches!(
                result,
                Err(QrImageError::Codec(CodecError::InvalidQuality(101)))
            ));
        }
    }

    #[test]
    fn test_encode_writes_nothing_on_failure() {
        let mut sink = Vec::new();
        assert!(encode(&sample(), ImageFormat::Png, 200, &mut sink).is_err());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_encode_appends_to_sink() {
        let mut sink = b"prefix".to_vec();
        encode(&sample(), ImageFormat::Png, 100, &mut sink).unwrap();
        assert!(sink.starts_with(b"prefix\x89PNG"));
    }

    #[test]
    fn test_encoded_stream_matches_format() {
        for format in [ImageFormat::Bmp, ImageFormat::Jpeg, ImageFormat::Png] {
            let bytes = encode_to_vec(&sample(), format, 90).unwrap();
            assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::from(format));
        }
    }

    #[test]
    fn test_jpeg_flattens_transparency_to_white() {
        let img = RgbaImage::from_fn(32, 32, |x, _| {
            if x < 16 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        let bytes = encode_to_vec(&img, ImageFormat::Jpeg, 100).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_luma8();
        assert!(decoded.get_pixel(4, 16)[0] > 240);
        assert!(decoded.get_pixel(28, 16)[0] < 15);
    }

    #[test]
    fn test_flatten_on_white_blends_alpha() {
        let img = RgbaImage::from_vec(
            3,
            1,
            vec![10, 20, 30, 255, 0, 0, 0, 0, 0, 0, 0, 128],
        )
        .unwrap();
        let rgb = flatten_on_white(&img);
        assert_eq!(*rgb.get_pixel(0, 0), Rgb([10, 20, 30]));
        assert_eq!(*rgb.get_pixel(1, 0), Rgb([255, 255, 255]));
        assert_eq!(*rgb.get_pixel(2, 0), Rgb([127, 127, 127]));
    }

    #[test]
    fn test_format_mapping() {
        assert_eq!(image::ImageFormat::from(ImageFormat::Bmp), image::ImageFormat::Bmp);
        assert_eq!(image::ImageFormat::from(ImageFormat::Jpeg), image::ImageFormat::Jpeg);
        assert_eq!(image::ImageFormat::from(ImageFormat::Png), image::ImageFormat::Png);
        assert_eq!(ImageFormat::default(), ImageFormat::Png);
        assert_eq!(ImageFormat::Jpeg.extension(), "jpg");
        assert!(ImageFormat::Jpeg.is_lossy());
        assert!(!ImageFormat::Png.is_lossy());
    }
}
