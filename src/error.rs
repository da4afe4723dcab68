use thiserror::Error;

use crate::dimension::Dimension;

/// Everything that can go wrong while producing a QR image.
///
/// All errors are returned directly to the caller of a `generate` method.
/// Nothing is retried, and nothing is written to the output sink when an
/// error is returned.
#[derive(Debug, Error)]
pub enum QrImageError {
    /// The QR encoder rejected the content, e.g. it exceeds the capacity of
    /// the largest symbol at the configured error correction level.
    #[error("failed to encode qr content: {0}")]
    ContentEncoding(#[from] qrcode::types::QrError),

    /// The background could not be read or is not a decodable raster.
    #[error("failed to decode background image: {0}")]
    BackgroundDecode(#[source] image::ImageError),

    /// The QR raster placed at `offset` does not fit inside the background.
    #[error("qr raster of {overlay} at offset {offset} exceeds background of {background}")]
    CompositingBounds {
        offset: Dimension,
        overlay: Dimension,
        background: Dimension,
    },

    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A surface with a zero width or height was requested.
    #[error("invalid surface size {0}: width and height must be non-zero")]
    InvalidSize(Dimension),

    /// The quiet zone is wider than [`MAX_QUIET_ZONE`](crate::grid::MAX_QUIET_ZONE).
    #[error("quiet zone of {0} modules exceeds the maximum of 177")]
    InvalidQuietZone(u32),

    #[error("module grid of side {size} cannot hold {modules} modules")]
    InvalidGrid { size: usize, modules: usize },

    /// Writing the encoded stream to the output sink failed.
    #[error("failed to write encoded image: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the raster codec adapter.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("quality must be in 0..=100, got {0}")]
    InvalidQuality(u8),

    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, QrImageError>;
