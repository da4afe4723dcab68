//! The public entry point: encodes content, renders it, optionally composites
//! it over a background and writes the encoded image to a sink.

use std::io::{Read, Write};

use image::RgbaImage;
use tracing::debug;

use crate::codec::{self, ImageFormat};
use crate::compose::{self, OverlayPolicy};
use crate::dimension::Dimension;
use crate::error::{QrImageError, Result};
use crate::grid::{self, EccLevel, ModuleGrid, DEFAULT_QUIET_ZONE};
use crate::render;

/// Output configuration fixed when a [`QrImage`] is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputSpec {
    pub format: ImageFormat,
    /// Size of the rendered QR raster in pixels.
    pub size: Dimension,
    /// JPEG quality in `0..=100`. Ignored by lossless formats.
    pub quality: u8,
    pub ecc: EccLevel,
    /// Light margin around the symbol, in modules.
    pub quiet_zone: u32,
    pub overlay: OverlayPolicy,
}

impl Default for OutputSpec {
    fn default() -> Self {
        Self {
            format: ImageFormat::Png,
            size: Dimension::default(),
            quality: codec::MAX_QUALITY,
            ecc: EccLevel::Low,
            quiet_zone: DEFAULT_QUIET_ZONE,
            overlay: OverlayPolicy::Reject,
        }
    }
}

/// A QR image generator for one piece of content.
///
/// Every `generate` call encodes the content again and allocates its own
/// surfaces, so a single instance can be shared between threads and called
/// repeatedly, e.g. with different backgrounds.
///
/// # Example
///
/// ```rust
/// use qrcanvas::{Dimension, ImageFormat, QrImage};
///
/// let qr = QrImage::builder("https://example.com", Dimension::square(300))
///     .format(ImageFormat::Png)
///     .build()
///     .unwrap();
///
/// let mut out = Vec::new();
/// qr.generate(&mut out).unwrap();
/// assert!(out.starts_with(b"\x89PNG"));
/// ```
#[derive(Debug, Clone)]
pub struct QrImage {
    content: String,
    spec: OutputSpec,
}

impl QrImage {
    /// Starts building a generator for `content` rendered at `size`.
    pub fn builder(content: impl Into<String>, size: Dimension) -> QrImageBuilder {
        QrImageBuilder {
            content: content.into(),
            spec: OutputSpec { size, ..OutputSpec::default() },
        }
    }

    /// A PNG generator with the default settings.
    ///
    /// # Errors
    ///
    /// Returns [`QrImageError::InvalidSize`] if `size` is empty.
    pub fn new(content: impl Into<String>, size: Dimension) -> Result<Self> {
        Self::builder(content, size).build()
    }

    /// # Errors
    ///
    /// Returns [`QrImageError::InvalidSize`] if `size` is empty.
    pub fn with_format(content: impl Into<String>, size: Dimension, format: ImageFormat) -> Result<Self> {
        Self::builder(content, size).format(format).build()
    }

    /// # Errors
    ///
    /// Returns [`QrImageError::InvalidSize`] if `size` is empty and a codec
    /// error if `quality` is above 100.
    pub fn with_format_and_quality(
        content: impl Into<String>,
        size: Dimension,
        format: ImageFormat,
        quality: u8,
    ) -> Result<Self> {
        Self::builder(content, size).format(format).quality(quality).build()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn spec(&self) -> &OutputSpec {
        &self.spec
    }

    /// Encodes the content and renders it at the configured size.
    ///
    /// # Errors
    ///
    /// Returns [`QrImageError::ContentEncoding`] if the content cannot be
    /// encoded.
    pub fn render_surface(&self) -> Result<RgbaImage> {
        let grid = ModuleGrid::encode(&self.content, self.spec.ecc, self.spec.quiet_zone)?;
        render::render(&grid, self.spec.size)
    }

    /// Writes the QR image alone to `sink`.
    ///
    /// # Errors
    ///
    /// Fails if the content cannot be encoded, the surface cannot be encoded
    /// in the configured format, or writing to `sink` fails. Nothing is
    /// written on failure.
    pub fn generate<W: Write + ?Sized>(&self, sink: &mut W) -> Result<()> {
        let surface = self.render_surface()?;
        debug!(format = ?self.spec.format, size = %self.spec.size, "generating qr image");
        codec::encode(&surface, self.spec.format, self.spec.quality, sink)
    }

    /// Composites the QR image over a background read from `background`
    /// and writes the result to `sink`.
    ///
    /// The output surface is `background_size`; the QR raster is placed at
    /// `qr_offset`. See [`compose::composite`] for drawing rules.
    ///
    /// # Errors
    ///
    /// In addition to the errors of [`QrImage::generate`], fails with
    /// [`QrImageError::BackgroundDecode`] if the background is not a
    /// decodable image and [`QrImageError::CompositingBounds`] if the QR
    /// raster does not fit and the overlay policy is
    /// [`OverlayPolicy::Reject`].
    pub fn generate_with_background<W, R>(
        &self,
        sink: &mut W,
        background: R,
        background_size: Dimension,
        qr_offset: Dimension,
    ) -> Result<()>
    where
        W: Write + ?Sized,
        R: Read,
    {
        let surface = self.composite_surface(background, background_size, qr_offset)?;
        debug!(
            format = ?self.spec.format,
            size = %background_size,
            offset = %qr_offset,
            "generating composited qr image"
        );
        codec::encode(&surface, self.spec.format, self.spec.quality, sink)
    }

    /// Same as [`QrImage::generate_with_background`] with the background
    /// given as an in-memory buffer.
    ///
    /// # Errors
    ///
    /// See [`QrImage::generate_with_background`].
    pub fn generate_with_background_bytes<W: Write + ?Sized>(
        &self,
        sink: &mut W,
        background: &[u8],
        background_size: Dimension,
        qr_offset: Dimension,
    ) -> Result<()> {
        self.generate_with_background(sink, background, background_size, qr_offset)
    }

    /// Returns the encoded QR image alone.
    ///
    /// # Errors
    ///
    /// See [`QrImage::generate`].
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.generate(&mut out)?;
        Ok(out)
    }

    /// Returns the encoded image composited over `background`.
    ///
    /// # Errors
    ///
    /// See [`QrImage::generate_with_background`].
    pub fn to_bytes_with_background(
        &self,
        background: &[u8],
        background_size: Dimension,
        qr_offset: Dimension,
    ) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.generate_with_background(&mut out, background, background_size, qr_offset)?;
        Ok(out)
    }

    fn composite_surface<R: Read>(
        &self,
        background: R,
        background_size: Dimension,
        qr_offset: Dimension,
    ) -> Result<RgbaImage> {
        if background_size.is_empty() {
            return Err(QrImageError::InvalidSize(background_size));
        }
        let qr = self.render_surface()?;
        let background = compose::decode_background(background)?;
        compose::composite(&qr, &background, background_size, qr_offset, self.spec.overlay)
    }
}

/// Staged constructor for [`QrImage`]. Settings not given keep the
/// [`OutputSpec`] defaults.
#[derive(Debug, Clone)]
pub struct QrImageBuilder {
    content: String,
    spec: OutputSpec,
}

impl QrImageBuilder {
    pub fn format(mut self, format: ImageFormat) -> Self {
        self.spec.format = format;
        self
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.spec.quality = quality;
        self
    }

    pub fn ecc(mut self, ecc: EccLevel) -> Self {
        self.spec.ecc = ecc;
        self
    }

    pub fn quiet_zone(mut self, modules: u32) -> Self {
        self.spec.quiet_zone = modules;
        self
    }

    pub fn overlay_policy(mut self, policy: OverlayPolicy) -> Self {
        self.spec.overlay = policy;
        self
    }

    /// Validates the settings and returns the generator.
    ///
    /// # Errors
    ///
    /// Returns [`QrImageError::InvalidSize`] if the target size is empty, a
    /// codec error if the quality is above 100 and
    /// [`QrImageError::InvalidQuietZone`] if the quiet zone is wider than
    /// [`grid::MAX_QUIET_ZONE`] modules.
    pub fn build(self) -> Result<QrImage> {
        if self.spec.size.is_empty() {
            return Err(QrImageError::InvalidSize(self.spec.size));
        }
        codec::check_quality(self.spec.quality)?;
        grid::check_quiet_zone(self.spec.quiet_zone)?;
        Ok(QrImage { content: self.content, spec: self.spec })
    }
}
