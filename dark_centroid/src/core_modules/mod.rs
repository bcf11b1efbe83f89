pub mod centroid;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod naming;
pub mod overlay;
pub mod pixel;
pub mod pixel_grid;
