// THEORY:
// Output naming decides where a marked image lands when no explicit target is
// given. The prefix is joined to the input's file name only; the directory is
// left untouched so the result sits beside its source. A path without a file
// name (`/`, `..`) is an invalid-input I/O error rather than a guess.

use crate::core_modules::error::MarkError;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

/// Prefix given to marked output files.
pub const DEFAULT_OUTPUT_PREFIX: &str = "signed";

/// Maps `input` to a sibling file whose name is `prefix` followed by the input's file name,
/// e.g. `shots/target.png` -> `shots/signedtarget.png`.
pub fn prefixed_path(input: &Path, prefix: &str) -> Result<PathBuf, MarkError> {
    let file_name = input.file_name().ok_or_else(|| {
        MarkError::io(
            input,
            io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;

    let mut name = OsString::from(prefix);
    name.push(file_name);
    Ok(input.with_file_name(name))
}

/// [`prefixed_path`] with [`DEFAULT_OUTPUT_PREFIX`].
pub fn signed_path(input: &Path) -> Result<PathBuf, MarkError> {
    prefixed_path(input, DEFAULT_OUTPUT_PREFIX)
}
