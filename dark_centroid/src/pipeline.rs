// THEORY:
// The `pipeline` module is the top-level API of the marker. It runs the four
// stages strictly in order, each one consuming what the previous produced:
//
//   decode (file -> PixelGrid) -> analyze (centroid + alpha) -> overlay -> encode
//
// The first failing stage aborts the run and its error is returned unchanged.
// Because encoding is last, a failed decode or overlay never leaves an output
// file behind.

use crate::core_modules::centroid::{self, Centroid};
use crate::core_modules::decoder::{self, DEFAULT_MAX_DECODE_ALLOC, DecodeOptions};
use crate::core_modules::encoder;
use crate::core_modules::error::MarkError;
use crate::core_modules::naming::{DEFAULT_OUTPUT_PREFIX, prefixed_path};
use crate::core_modules::overlay;
use crate::core_modules::pixel_grid::PixelGrid;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Configuration for the MarkPipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Prepended to the input's file name to name the output.
    pub output_prefix: String,
    /// Allocation ceiling for the PNG decoder, in bytes. `None` means unbounded.
    pub max_decode_alloc: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            max_decode_alloc: Some(DEFAULT_MAX_DECODE_ALLOC),
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub input: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub centroid: Centroid,
}

pub struct MarkPipeline {
    config: PipelineConfig,
}

impl MarkPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Where [`run`](Self::run) writes the marked copy of `input`.
    pub fn output_path_for(&self, input: &Path) -> Result<PathBuf, MarkError> {
        prefixed_path(input, &self.config.output_prefix)
    }

    /// Marks `input` and writes the result next to it under the configured prefix.
    pub fn run(&self, input: &Path) -> Result<Report, MarkError> {
        let output = self.output_path_for(input)?;
        self.run_to(input, &output)
    }

    /// Marks `input` and writes the result to `output`.
    pub fn run_to(&self, input: &Path, output: &Path) -> Result<Report, MarkError> {
        // Stage 1: Decode
        let options = DecodeOptions {
            max_alloc: self.config.max_decode_alloc,
        };
        let mut grid = decoder::decode(input, &options)?;

        // Stages 2 and 3: Analyze, then draw
        let centroid = Self::mark_grid(&mut grid)?;

        // Stage 4: Encode
        encoder::encode(&grid, output)?;

        info!(
            input = %input.display(),
            output = %output.display(),
            x = centroid.x,
            y = centroid.y,
            "marked image"
        );
        Ok(Report {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            width: grid.width(),
            height: grid.height(),
            centroid,
        })
    }

    /// Runs the in-memory stages on an already decoded grid: centroid analysis
    /// (which normalizes alpha) followed by the crosshair.
    pub fn mark_grid(grid: &mut PixelGrid) -> Result<Centroid, MarkError> {
        let centroid = centroid::analyze(grid);
        debug!(x = centroid.x, y = centroid.y, "centroid located");
        overlay::draw_crosshair(grid, centroid)?;
        Ok(centroid)
    }
}

impl Default for MarkPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}
