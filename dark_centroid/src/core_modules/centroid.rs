// THEORY:
// The centroid is the weighted center of the dark pixels, measured in
// 1-indexed grid coordinates and truncated to whole pixels.
//
// Two passes produce it:
// 1.  **Row pass** (y): rows outer, columns inner. Row `r` adds `(r + 1) * n`
//     to the position sum and `n` to the count, where `n` is its dark count.
// 2.  **Column pass** (x): columns outer, rows inner, weighted by `column + 1`.
//     When analyzing (rather than just locating) this pass also rewrites every
//     pixel's alpha to `NORMALIZED_ALPHA`, so the encoded output carries that
//     constant alpha everywhere.
//
// An axis with no dark pixels resolves to 1.

use crate::core_modules::pixel::{Channel, Pixel};
use crate::core_modules::pixel_grid::PixelGrid;

/// Alpha written to every pixel by [`analyze`].
pub const NORMALIZED_ALPHA: Channel = 100;

/// 1-indexed weighted center of the dark pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Centroid {
    pub x: u32,
    pub y: u32,
}

impl Centroid {
    /// Reported when the grid holds no dark pixel.
    pub const DEGENERATE: Centroid = Centroid { x: 1, y: 1 };
}

impl Default for Centroid {
    fn default() -> Self {
        Self::DEGENERATE
    }
}

/// Running weighted sum along one axis.
#[derive(Debug, Default)]
struct AxisAccumulator {
    position_sum: u64,
    count_sum: u64,
}

impl AxisAccumulator {
    /// Records `dark` pixels found on the line at 0-based `index`.
    fn push(&mut self, index: u32, dark: u64) {
        self.position_sum += (u64::from(index) + 1) * dark;
        self.count_sum += dark;
    }

    fn resolve(&self) -> u32 {
        if self.count_sum == 0 {
            return 1;
        }
        // The quotient is a weighted mean of indices in 1..=u32::MAX.
        (self.position_sum / self.count_sum) as u32
    }
}

/// Computes the centroid and normalizes every pixel's alpha to [`NORMALIZED_ALPHA`]
/// in the same column traversal.
pub fn analyze(grid: &mut PixelGrid) -> Centroid {
    let y = row_pass(grid);
    let x = column_pass(grid, |pixel| {
        pixel.alpha = NORMALIZED_ALPHA;
    });
    Centroid { x, y }
}

/// Computes the centroid without touching the grid.
pub fn locate(grid: &PixelGrid) -> Centroid {
    let y = row_pass(grid);
    let mut x_axis = AxisAccumulator::default();
    for column in 0..grid.width() {
        let dark = grid
            .rows()
            .filter(|row| row[column as usize].is_dark())
            .count();
        x_axis.push(column, dark as u64);
    }
    Centroid {
        x: x_axis.resolve(),
        y,
    }
}

fn row_pass(grid: &PixelGrid) -> u32 {
    let mut y_axis = AxisAccumulator::default();
    for (index, row) in grid.rows().enumerate() {
        let dark = row.iter().filter(|pixel| pixel.is_dark()).count();
        y_axis.push(index as u32, dark as u64);
    }
    y_axis.resolve()
}

/// Column-major scan. `visit` runs on each pixel before it is classified.
fn column_pass(grid: &mut PixelGrid, mut visit: impl FnMut(&mut Pixel)) -> u32 {
    let (width, height) = (grid.width(), grid.height());
    let mut x_axis = AxisAccumulator::default();
    for column in 0..width {
        let mut dark = 0u64;
        for row in 0..height {
            if let Some(pixel) = grid.get_mut(row, column) {
                visit(pixel);
                if pixel.is_dark() {
                    dark += 1;
                }
            }
        }
        x_axis.push(column, dark);
    }
    x_axis.resolve()
}
