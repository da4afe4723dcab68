/// A width/height pair measured in pixels.
///
/// Used for the requested output size, the background surface size and the
/// offset at which the QR raster is placed on the background.
///
/// # Example
///
/// ```rust
/// use qrcanvas::Dimension;
///
/// let size = Dimension::new(300, 200);
/// assert_eq!(size.width, 300);
/// assert!(!size.is_empty());
/// assert!(Dimension::new(0, 10).is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimension {
    pub width: u32,
    pub height: u32,
}

impl Dimension {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A dimension with equal width and height.
    pub const fn square(side: u32) -> Self {
        Self::new(side, side)
    }

    /// Returns true if either side is zero. Such a surface cannot be encoded.
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns true if a `extent`-sized rectangle placed at `self` lies
    /// entirely inside `bounds`.
    pub(crate) fn fits(&self, extent: Dimension, bounds: Dimension) -> bool {
        u64::from(self.width) + u64::from(extent.width) <= u64::from(bounds.width)
            && u64::from(self.height) + u64::from(extent.height) <= u64::from(bounds.height)
    }
}

impl From<(u32, u32)> for Dimension {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
