// THEORY:
// The overlay marks the centroid with a full-height vertical line and a
// full-width horizontal line of pure red. The centroid is 1-indexed, so the
// lines land on column `x - 1` and row `y - 1` of the 0-indexed grid.
//
// Both indices are validated before any pixel is written: a rejected centroid
// leaves the grid exactly as it was. Only the color channels are painted; the
// alpha set during analysis is kept.

use crate::core_modules::centroid::Centroid;
use crate::core_modules::error::MarkError;
use crate::core_modules::pixel::Pixel;
use crate::core_modules::pixel_grid::PixelGrid;

/// Color of the crosshair lines.
pub const CROSSHAIR_COLOR: Pixel = Pixel::rgb(255, 0, 0);

/// Draws the crosshair through `centroid`.
pub fn draw_crosshair(grid: &mut PixelGrid, centroid: Centroid) -> Result<(), MarkError> {
    let (column, row) = crosshair_position(grid, centroid)?;

    for y in 0..grid.height() {
        if let Some(pixel) = grid.get_mut(y, column) {
            pixel.paint(CROSSHAIR_COLOR);
        }
    }
    for pixel in grid.row_mut(row) {
        pixel.paint(CROSSHAIR_COLOR);
    }
    Ok(())
}

/// 0-indexed `(column, row)` the crosshair crosses at.
fn crosshair_position(grid: &PixelGrid, centroid: Centroid) -> Result<(u32, u32), MarkError> {
    let out_of_bounds = || MarkError::Bounds {
        x: centroid.x,
        y: centroid.y,
        width: grid.width(),
        height: grid.height(),
    };
    let column = centroid
        .x
        .checked_sub(1)
        .filter(|&c| c < grid.width())
        .ok_or_else(out_of_bounds)?;
    let row = centroid
        .y
        .checked_sub(1)
        .filter(|&r| r < grid.height())
        .ok_or_else(out_of_bounds)?;
    Ok((column, row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::error::ErrorKind;

    const WHITE: Pixel = Pixel::gray(255);

    #[test]
    fn lines_cross_at_the_centroid() {
        let mut grid = PixelGrid::filled(4, 4, WHITE).unwrap();
        draw_crosshair(&mut grid, Centroid { x: 3, y: 3 }).unwrap();

        for row in 0..4 {
            for column in 0..4 {
                let expected = if row == 2 || column == 2 {
                    CROSSHAIR_COLOR
                } else {
                    WHITE
                };
                assert_eq!(grid.get(row, column), Some(&expected), "({row}, {column})");
            }
        }
    }

    #[test]
    fn one_by_one_grid_gets_a_single_red_pixel() {
        let mut grid = PixelGrid::filled(1, 1, Pixel::gray(0)).unwrap();
        draw_crosshair(&mut grid, Centroid::DEGENERATE).unwrap();
        assert_eq!(grid.pixels(), &[CROSSHAIR_COLOR]);
    }

    #[test]
    fn drawing_twice_changes_nothing() {
        let mut once = PixelGrid::filled(6, 5, Pixel::gray(30)).unwrap();
        draw_crosshair(&mut once, Centroid { x: 2, y: 5 }).unwrap();
        let mut twice = once.clone();
        draw_crosshair(&mut twice, Centroid { x: 2, y: 5 }).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn alpha_survives_painting() {
        let mut grid = PixelGrid::filled(2, 2, Pixel::new(9, 9, 9, 100)).unwrap();
        draw_crosshair(&mut grid, Centroid { x: 1, y: 1 }).unwrap();
        assert_eq!(grid.get(0, 0), Some(&Pixel::new(255, 0, 0, 100)));
        assert_eq!(grid.get(1, 1), Some(&Pixel::new(9, 9, 9, 100)));
    }

    #[test]
    fn out_of_range_centroid_is_rejected_untouched() {
        let original = PixelGrid::filled(3, 2, WHITE).unwrap();
        for centroid in [
            Centroid { x: 0, y: 1 },
            Centroid { x: 1, y: 0 },
            Centroid { x: 4, y: 1 },
            Centroid { x: 1, y: 3 },
        ] {
            let mut grid = original.clone();
            let err = draw_crosshair(&mut grid, centroid).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Bounds);
            assert_eq!(grid, original);
        }
    }

    #[test]
    fn empty_grid_cannot_hold_a_crosshair() {
        let mut grid = PixelGrid::new(0, 0, Vec::new()).unwrap();
        assert!(draw_crosshair(&mut grid, Centroid::DEGENERATE).is_err());
    }
}
