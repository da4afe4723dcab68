//! Rasterizes a module grid onto a pixel surface of arbitrary size.

use image::{Rgba, RgbaImage};
use tracing::{debug, warn};

use crate::dimension::Dimension;
use crate::error::{QrImageError, Result};
use crate::grid::ModuleGrid;

/// Fill of dark modules.
pub const DARK: Rgba<u8> = Rgba([0, 0, 0, 255]);
/// Fill of light modules, and of the whole surface before any module is drawn.
pub const LIGHT: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Renders `grid` onto a freshly allocated `size` surface.
///
/// Horizontal and vertical scale are independent (`size.width / N` and
/// `size.height / N`), so a non-square `size` yields non-square modules.
/// Scanners may struggle with strongly distorted symbols; choosing a sane
/// aspect ratio is up to the caller.
///
/// Each cell's edges are computed from continuous coordinates and floored,
/// so adjacent cells always share an edge and there are no seams when `N`
/// does not divide the target size.
///
/// # Errors
///
/// Returns [`QrImageError::InvalidSize`] if either side of `size` is zero.
///
/// # Example
///
/// ```rust
/// use qrcanvas::{render, Dimension, EccLevel, ModuleGrid};
///
/// let grid = ModuleGrid::encode("HELLO", EccLevel::Low, 4).unwrap();
/// let surface = render(&grid, Dimension::new(300, 200)).unwrap();
/// assert_eq!(surface.dimensions(), (300, 200));
/// ```
pub fn render(grid: &ModuleGrid, size: Dimension) -> Result<RgbaImage> {
    if size.is_empty() {
        return Err(QrImageError::InvalidSize(size));
    }

    let n = grid.size();
    if (size.width as usize) < n || (size.height as usize) < n {
        warn!(modules = n, %size, "target smaller than module grid, some modules collapse");
    }

    let mut img = RgbaImage::from_pixel(size.width, size.height, LIGHT);
    for (col, row) in grid.dark_modules() {
        let (x0, x1) = cell_span(col, n, size.width);
        let (y0, y1) = cell_span(row, n, size.height);
        for y in y0..y1 {
            for x in x0..x1 {
                img.put_pixel(x, y, DARK);
            }
        }
    }

    debug!(modules = n, %size, "rendered module grid");
    Ok(img)
}

/// Pixel range `[start, end)` covered by cell `index` of `n` along an axis of
/// `extent` pixels.
pub(crate) fn cell_span(index: usize, n: usize, extent: u32) -> (u32, u32) {
    (cell_edge(index, n, extent), cell_edge(index + 1, n, extent))
}

fn cell_edge(index: usize, n: usize, extent: u32) -> u32 {
    // index <= n, so the quotient never exceeds extent.
    ((index as u64 * u64::from(extent)) / n as u64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(size: usize) -> ModuleGrid {
        let modules = (0..size * size).map(|i| (i % size + i / size) % 2 == 0).collect();
        ModuleGrid::from_modules(size, modules).unwrap()
    }

    #[test]
    fn test_render_exact_scale() {
        let grid = checker(3);
        let img = render(&grid, Dimension::square(30)).unwrap();
        assert_eq!(img.dimensions(), (30, 30));
        assert_eq!(*img.get_pixel(0, 0), DARK);
        assert_eq!(*img.get_pixel(9, 9), DARK);
        assert_eq!(*img.get_pixel(10, 0), LIGHT);
        assert_eq!(*img.get_pixel(19, 9), LIGHT);
        assert_eq!(*img.get_pixel(20, 0), DARK);
        assert_eq!(*img.get_pixel(15, 15), DARK);
        assert_eq!(*img.get_pixel(29, 29), DARK);
    }

    #[test]
    fn test_render_non_square_target() {
        let grid = checker(2);
        let img = render(&grid, Dimension::new(40, 10)).unwrap();
        assert_eq!(img.dimensions(), (40, 10));
        assert_eq!(*img.get_pixel(19, 4), DARK);
        assert_eq!(*img.get_pixel(20, 4), LIGHT);
        assert_eq!(*img.get_pixel(19, 5), LIGHT);
        assert_eq!(*img.get_pixel(20, 5), DARK);
    }

    #[test]
    fn test_cell_spans_tile_axis_without_gaps() {
        for &(n, extent) in &[(21usize, 100u32), (29, 300), (7, 3), (25, 1001)] {
            let mut next = 0;
            for i in 0..n {
                let (start, end) = cell_span(i, n, extent);
                assert_eq!(start, next);
                assert!(end >= start);
                next = end;
            }
            assert_eq!(next, extent);
        }
    }

    #[test]
    fn test_uneven_scale_has_no_seams() {
        let grid = ModuleGrid::from_modules(3, vec![true; 9]).unwrap();
        let img = render(&grid, Dimension::new(100, 70)).unwrap();
        assert!(img.pixels().all(|p| *p == DARK));
    }

    #[test]
    fn test_light_grid_is_all_light() {
        let grid = ModuleGrid::from_modules(5, vec![false; 25]).unwrap();
        let img = render(&grid, Dimension::new(17, 23)).unwrap();
        assert!(img.pixels().all(|p| *p == LIGHT));
    }

    #[test]
    fn test_render_rejects_empty_size() {
        let grid = checker(3);
        assert!(matches!(
            render(&grid, Dimension::new(0, 10)),
            Err(QrImageError::InvalidSize(_))
        ));
        assert!(matches!(
            render(&grid, Dimension::new(10, 0)),
            Err(QrImageError::InvalidSize(_))
        ));
    }

    #[test]
    fn test_render_is_deterministic() {
        let grid = ModuleGrid::encode("determinism", crate::grid::EccLevel::Low, 4).unwrap();
        let a = render(&grid, Dimension::new(123, 77)).unwrap();
        let b = render(&grid, Dimension::new(123, 77)).unwrap();
        assert_eq!(a, b);
    }
}
