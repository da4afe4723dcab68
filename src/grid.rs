//! Module grid produced by the QR symbol encoder.
//!
//! The symbol itself is encoded by the [`qrcode`] crate; this module turns its
//! output into a square boolean matrix, padded with a light quiet zone, that
//! the renderer can map onto pixels.

use qrcode::{Color, EcLevel, QrCode};
use tracing::debug;

use crate::error::{QrImageError, Result};

/// Width of the light margin the QR standard requires around a symbol.
pub const DEFAULT_QUIET_ZONE: u32 = 4;

/// Widest accepted quiet zone, the side of the largest (version 40) symbol.
pub const MAX_QUIET_ZONE: u32 = 177;

/// The error correction level.
///
/// Higher levels recover from more damage at the cost of data capacity per
/// symbol size. [`EccLevel::Low`] is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EccLevel {
    /// Recovers about 7% of the symbol.
    #[default]
    Low,
    /// Recovers about 15% of the symbol.
    Medium,
    /// Recovers about 25% of the symbol.
    Quartile,
    /// Recovers about 30% of the symbol.
    High,
}

impl From<EccLevel> for EcLevel {
    fn from(level: EccLevel) -> Self {
        match level {
            EccLevel::Low => EcLevel::L,
            EccLevel::Medium => EcLevel::M,
            EccLevel::Quartile => EcLevel::Q,
            EccLevel::High => EcLevel::H,
        }
    }
}

pub(crate) fn check_quiet_zone(quiet_zone: u32) -> Result<()> {
    if quiet_zone > MAX_QUIET_ZONE {
        return Err(QrImageError::InvalidQuietZone(quiet_zone));
    }
    Ok(())
}

/// An immutable square grid of dark and light modules, row-major.
///
/// # Example
///
/// ```rust
/// use qrcanvas::{EccLevel, ModuleGrid};
///
/// let grid = ModuleGrid::encode("HELLO", EccLevel::Low, 4).unwrap();
/// assert_eq!(grid.symbol_size(), 21);
/// assert_eq!(grid.size(), 29);
/// // The finder pattern starts right after the quiet zone.
/// assert!(grid.is_dark(4, 4));
/// assert!(!grid.is_dark(0, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleGrid {
    size: usize,
    quiet_zone: usize,
    modules: Vec<bool>,
}

impl ModuleGrid {
    /// Encodes `content` as a QR symbol and surrounds it with `quiet_zone`
    /// light modules on every side.
    ///
    /// # Errors
    ///
    /// Returns [`QrImageError::ContentEncoding`] if the encoder rejects the
    /// content, typically because it is too long for the chosen level, and
    /// [`QrImageError::InvalidQuietZone`] if `quiet_zone` is above
    /// [`MAX_QUIET_ZONE`].
    pub fn encode(content: &str, ecc: EccLevel, quiet_zone: u32) -> Result<Self> {
        check_quiet_zone(quiet_zone)?;
        let code = QrCode::with_error_correction_level(content.as_bytes(), ecc.into())?;
        let symbol = code.width();
        let colors = code.to_colors();
        let quiet_zone = quiet_zone as usize;
        let (size, area) = quiet_zone
            .checked_mul(2)
            .and_then(|margin| symbol.checked_add(margin))
            .and_then(|size| size.checked_mul(size).map(|area| (size, area)))
            .ok_or(QrImageError::InvalidGrid { size: symbol, modules: colors.len() })?;

        let mut modules = vec![false; area];
        for (i, color) in colors.iter().enumerate() {
            if *color == Color::Dark {
                let x = i % symbol + quiet_zone;
                let y = i / symbol + quiet_zone;
                modules[y * size + x] = true;
            }
        }

        debug!(symbol, size, ?ecc, "encoded qr symbol");
        Ok(Self { size, quiet_zone, modules })
    }

    /// Builds a grid from row-major modules without a quiet zone.
    ///
    /// # Errors
    ///
    /// Returns [`QrImageError::InvalidGrid`] if `size` is zero or `modules`
    /// does not hold exactly `size * size` entries.
    pub fn from_modules(size: usize, modules: Vec<bool>) -> Result<Self> {
        if size == 0 || size.checked_mul(size) != Some(modules.len()) {
            return Err(QrImageError::InvalidGrid { size, modules: modules.len() });
        }
        Ok(Self { size, quiet_zone: 0, modules })
    }

    /// Side length in modules, quiet zone included.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Side length of the encoded symbol alone.
    pub fn symbol_size(&self) -> usize {
        self.size - 2 * self.quiet_zone
    }

    pub fn quiet_zone(&self) -> usize {
        self.quiet_zone
    }

    /// Returns the module at column `x`, row `y`. Coordinates outside the
    /// grid read as light.
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size && self.modules[y * self.size + x]
    }

    /// Iterates over the coordinates `(x, y)` of every dark module.
    pub fn dark_modules(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.modules
            .iter()
            .enumerate()
            .filter(|(_, dark)| **dark)
            .map(move |(i, _)| (i % self.size, i / self.size))
    }
}
