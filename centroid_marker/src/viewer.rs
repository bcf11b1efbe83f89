//! Opens the marked image for the user.

use anyhow::{Context, Result};
use std::path::Path;

/// How the marked file gets shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    /// Leave the file alone.
    Disabled,
    /// The desktop's default handler for PNG files.
    System,
    /// A specific application, e.g. `eog`.
    App(String),
}

impl Viewer {
    pub fn from_args(no_view: bool, app: Option<String>) -> Self {
        match (no_view, app) {
            (true, _) => Viewer::Disabled,
            (false, Some(app)) => Viewer::App(app),
            (false, None) => Viewer::System,
        }
    }

    pub fn launch(&self, path: &Path) -> Result<()> {
        match self {
            Viewer::Disabled => Ok(()),
            Viewer::System => {
                open::that(path).with_context(|| format!("opening {}", path.display()))
            }
            Viewer::App(app) => open::with(path, app)
                .with_context(|| format!("opening {} with {app}", path.display())),
        }
    }
}
