// THEORY:
// This file is the main entry point for the `dark_centroid` library crate.
// It exposes the `MarkPipeline` (decode, analyze, overlay, encode) together with
// its configuration and report types as the high-level interface. The individual
// stages stay reachable through `core_modules` for callers that want to drive
// them one at a time.

pub mod core_modules;
pub mod pipeline;

pub use crate::core_modules::centroid::Centroid;
pub use crate::core_modules::error::{ErrorKind, MarkError};
pub use crate::core_modules::pixel::Pixel;
pub use crate::core_modules::pixel_grid::PixelGrid;
pub use crate::pipeline::{MarkPipeline, PipelineConfig, Report};
