//! Supplies the input path when none was given on the command line.

use anyhow::{Result, bail};
use std::ffi::OsStr;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Longest path, in bytes, accepted from the prompt or the command line.
pub const MAX_PATH_LEN: usize = 4096;

/// Prints `Filename:` to `prompt` and reads a single line from `input`.
pub fn pick_from<R: BufRead, W: Write>(mut input: R, mut prompt: W) -> Result<PathBuf> {
    writeln!(prompt, "Filename:")?;
    prompt.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("no file name given");
    }
    let name = line.trim_end_matches(['\r', '\n']);
    validate(OsStr::new(name))?;
    Ok(PathBuf::from(name))
}

/// Checks a caller-supplied path against the length bound and for NUL bytes.
/// Works on the raw platform bytes, so names that are not valid UTF-8 are
/// measured as given.
pub fn validate(name: &OsStr) -> Result<()> {
    let bytes = name.as_encoded_bytes();
    if bytes.is_empty() {
        bail!("no file name given");
    }
    if bytes.contains(&0) {
        bail!("file name contains a NUL byte");
    }
    if bytes.len() > MAX_PATH_LEN {
        bail!("file name is {} bytes long, limit is {MAX_PATH_LEN}", bytes.len());
    }
    Ok(())
}
