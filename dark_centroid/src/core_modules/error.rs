// THEORY:
// Every stage of the marking pipeline reports failure through a single error
// type. Each variant carries the context needed to log it (the file involved,
// the codec's own message) so a caller never has to consult shared state to
// find out what went wrong.

use image::ImageError;
use std::path::PathBuf;

/// The broad category of a [`MarkError`], for callers that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Format,
    Decode,
    Encode,
    Allocation,
    Bounds,
}

/// Errors produced while decoding, analysing, marking or encoding an image.
#[derive(Debug, thiserror::Error)]
pub enum MarkError {
    /// The file could not be opened, read, created or written.
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file does not start with the PNG signature.
    #[error("{} is not a PNG file", path.display())]
    Format { path: PathBuf },

    /// The signature matched but the stream is structurally invalid.
    #[error("malformed PNG data in {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    /// The codec refused to serialize the grid.
    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    /// Memory for the pixel data could not be obtained.
    #[error("cannot allocate pixel memory: {0}")]
    Allocation(String),

    /// The crosshair would land outside the grid.
    #[error("centroid ({x}, {y}) lies outside a {width}x{height} grid")]
    Bounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// A pixel buffer whose length does not match its dimensions.
    #[error("{len} pixels cannot form a {width}x{height} grid")]
    GridSize { width: u32, height: u32, len: usize },
}

impl MarkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MarkError::Io { .. } => ErrorKind::Io,
            MarkError::Format { .. } => ErrorKind::Format,
            MarkError::Decode { .. } => ErrorKind::Decode,
            MarkError::Encode { .. } => ErrorKind::Encode,
            MarkError::Allocation(_) => ErrorKind::Allocation,
            MarkError::Bounds { .. } | MarkError::GridSize { .. } => ErrorKind::Bounds,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MarkError::Io {
            path: path.into(),
            source,
        }
    }
}
