// THEORY:
// The `PixelGrid` is the one piece of mutable state that travels through the
// pipeline. It owns a single contiguous, row-major `Vec<Pixel>` so the whole
// image is allocated (and freed) as one unit; there are no per-row buffers to
// track on a failure path.
//
// Invariants:
// 1.  `pixels.len() == width * height`, checked at construction.
// 2.  Row `r` occupies `pixels[r * width .. (r + 1) * width]`.
// 3.  Addressing is `(row, column)`, both 0-indexed.

use crate::core_modules::error::MarkError;
use crate::core_modules::pixel::{Byte, CHANNELS, Pixel};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
}

impl PixelGrid {
    /// Wraps a row-major pixel buffer, rejecting one whose length does not match.
    pub fn new(width: u32, height: u32, pixels: Vec<Pixel>) -> Result<Self, MarkError> {
        if Some(pixels.len()) != pixel_count(width, height) {
            return Err(MarkError::GridSize {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A grid with every pixel set to `pixel`.
    pub fn filled(width: u32, height: u32, pixel: Pixel) -> Result<Self, MarkError> {
        let count = pixel_count(width, height).ok_or_else(|| too_large(width, height))?;
        let mut pixels = reserve_pixels(count)?;
        pixels.resize(count, pixel);
        Self::new(width, height, pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, row: u32, column: u32) -> Option<&Pixel> {
        self.index(row, column).map(|i| &self.pixels[i])
    }

    pub fn get_mut(&mut self, row: u32, column: u32) -> Option<&mut Pixel> {
        self.index(row, column).map(move |i| &mut self.pixels[i])
    }

    /// The pixels of row `row`, left to right.
    ///
    /// Panics if `row >= height`.
    pub fn row(&self, row: u32) -> &[Pixel] {
        let (start, end) = self.row_span(row);
        &self.pixels[start..end]
    }

    /// Mutable access to row `row`. Panics if `row >= height`.
    pub fn row_mut(&mut self, row: u32) -> &mut [Pixel] {
        let (start, end) = self.row_span(row);
        &mut self.pixels[start..end]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Pixel]> {
        // `max(1)` keeps `chunks_exact` happy for zero-width grids, which have no pixels anyway.
        self.pixels.chunks_exact((self.width as usize).max(1))
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.pixels
    }

    /// Flattens the grid into `width * height * 4` bytes, R,G,B,A per pixel.
    pub fn to_rgba_bytes(&self) -> Result<Vec<Byte>, MarkError> {
        let len = self
            .pixels
            .len()
            .checked_mul(CHANNELS)
            .ok_or_else(|| too_large(self.width, self.height))?;
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(len)
            .map_err(|e| MarkError::Allocation(format!("{len} byte RGBA buffer: {e}")))?;
        for pixel in &self.pixels {
            bytes.extend_from_slice(&<[Byte; CHANNELS]>::from(*pixel));
        }
        Ok(bytes)
    }

    fn index(&self, row: u32, column: u32) -> Option<usize> {
        (row < self.height && column < self.width)
            .then(|| row as usize * self.width as usize + column as usize)
    }

    fn row_span(&self, row: u32) -> (usize, usize) {
        assert!(row < self.height, "row {row} out of range for height {}", self.height);
        let start = row as usize * self.width as usize;
        (start, start + self.width as usize)
    }
}

/// Reserves room for `count` pixels up front, turning allocator refusal into an error.
pub(crate) fn reserve_pixels(count: usize) -> Result<Vec<Pixel>, MarkError> {
    let mut pixels = Vec::new();
    pixels
        .try_reserve_exact(count)
        .map_err(|e| MarkError::Allocation(format!("{count} pixel grid: {e}")))?;
    Ok(pixels)
}

pub(crate) fn pixel_count(width: u32, height: u32) -> Option<usize> {
    (width as usize).checked_mul(height as usize)
}

fn too_large(width: u32, height: u32) -> MarkError {
    MarkError::Allocation(format!("{width}x{height} grid exceeds addressable memory"))
}
