//! Layers a rendered QR raster over a decoded background image.

use std::io::Read;

use image::{imageops, DynamicImage, ImageError, RgbaImage};
use tracing::debug;

use crate::dimension::Dimension;
use crate::error::{QrImageError, Result};

/// What to do when the QR raster at the requested offset does not fit inside
/// the background surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OverlayPolicy {
    /// Fail with [`QrImageError::CompositingBounds`].
    #[default]
    Reject,
    /// Draw the part that fits and drop the rest.
    Clip,
}

/// Reads `source` to the end and decodes it, guessing the format from its
/// content.
///
/// # Errors
///
/// Returns [`QrImageError::BackgroundDecode`] if reading fails or the bytes
/// are not a supported raster format.
pub fn decode_background<R: Read>(mut source: R) -> Result<DynamicImage> {
    let mut bytes = Vec::new();
    source
        .read_to_end(&mut bytes)
        .map_err(|e| QrImageError::BackgroundDecode(ImageError::IoError(e)))?;
    let img = image::load_from_memory(&bytes).map_err(QrImageError::BackgroundDecode)?;
    debug!(len = bytes.len(), width = img.width(), height = img.height(), "decoded background");
    Ok(img)
}

/// Builds a `size` surface holding `background` at the origin with `qr`
/// drawn on top at `offset`.
///
/// The surface starts fully transparent. The background is drawn at its
/// natural size without scaling: a larger image is cropped to `size`, a
/// smaller one leaves the rest transparent. The QR raster is then alpha
/// composited over it, so its opaque pixels always win in the overlap.
///
/// # Errors
///
/// Returns [`QrImageError::InvalidSize`] if `size` is empty, and
/// [`QrImageError::CompositingBounds`] if the QR raster does not fit and
/// `policy` is [`OverlayPolicy::Reject`].
pub fn composite(
    qr: &RgbaImage,
    background: &DynamicImage,
    size: Dimension,
    offset: Dimension,
    policy: OverlayPolicy,
) -> Result<RgbaImage> {
    if size.is_empty() {
        return Err(QrImageError::InvalidSize(size));
    }
    let overlay = Dimension::new(qr.width(), qr.height());
    if policy == OverlayPolicy::Reject && !offset.fits(overlay, size) {
        return Err(QrImageError::CompositingBounds { offset, overlay, background: size });
    }

    let mut surface = RgbaImage::new(size.width, size.height);
    imageops::replace(&mut surface, &background.to_rgba8(), 0, 0);
    imageops::overlay(&mut surface, qr, i64::from(offset.width), i64::from(offset.height));

    debug!(%size, %offset, %overlay, ?policy, "composited qr over background");
    Ok(surface)
}
