// THEORY:
// The encoder is the last stage. It writes the grid as a plain PNG: RGBA,
// 8 bits per channel, non-interlaced, default compression and filtering. The
// in-memory channel order is already R,G,B,A, so rows go to the codec as-is
// (`width * 4` bytes each). Every failure is returned to the caller.
//
// File output goes to a temporary sibling that is renamed over the target only
// once the PNG is complete, so a failed encode never leaves a partial file
// under the output name.

use crate::core_modules::error::MarkError;
use crate::core_modules::pixel_grid::PixelGrid;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageError};
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Writes `grid` to `path` as an RGBA8 PNG, replacing any existing file.
pub fn encode(grid: &PixelGrid, path: &Path) -> Result<(), MarkError> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // Dropped (and deleted) on every early return below.
    let mut staged = NamedTempFile::new_in(directory).map_err(|e| MarkError::io(path, e))?;
    {
        let mut writer = BufWriter::new(staged.as_file_mut());
        write_png(grid, &mut writer, path)?;
        writer.flush().map_err(|e| MarkError::io(path, e))?;
    }
    staged
        .persist(path)
        .map_err(|e| MarkError::io(path, e.error))?;
    debug!(path = %path.display(), width = grid.width(), height = grid.height(), "encoded png");
    Ok(())
}

/// Encodes `grid` into an in-memory PNG.
pub fn encode_to_vec(grid: &PixelGrid) -> Result<Vec<u8>, MarkError> {
    let mut buffer = Vec::new();
    write_png(grid, &mut buffer, Path::new("<memory>"))?;
    Ok(buffer)
}

fn write_png<W: Write>(grid: &PixelGrid, writer: W, target: &Path) -> Result<(), MarkError> {
    let bytes = grid.to_rgba_bytes()?;
    PngEncoder::new(writer)
        .write_image(&bytes, grid.width(), grid.height(), ExtendedColorType::Rgba8)
        .map_err(|e| match e {
            ImageError::IoError(source) => MarkError::io(target, source),
            source => MarkError::Encode {
                path: target.to_path_buf(),
                source,
            },
        })
}
