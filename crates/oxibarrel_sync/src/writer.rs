use anyhow::{Context, Result};
use log::{debug, trace};
use std::{fs, path::Path};

use oxibarrel_core::first_line;

use crate::types::WriteOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Write,
    /// Compute everything, write nothing
    Check,
}

/// How much of a file is compared before deciding to rewrite it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// Whole content, ignoring surrounding whitespace
    FullContent,
    /// First non-blank line only
    FirstLine,
}

/// Reads a file, treating any failure (typically "does not exist yet") as empty.
pub fn read_or_empty(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            trace!("Treating {} as empty: {}", path.display(), e);
            String::new()
        }
    }
}

pub fn write_if_changed(
    path: &Path,
    new_content: &str,
    old_content: &str,
    granularity: Granularity,
    mode: WriteMode,
) -> Result<WriteOutcome> {
    let changed = match granularity {
        Granularity::FullContent => old_content.trim() != new_content.trim(),
        Granularity::FirstLine => first_line(old_content) != first_line(new_content),
    };

    if !changed {
        trace!("Unchanged: {}", path.display());
        return Ok(WriteOutcome::Unchanged);
    }

    match mode {
        WriteMode::Check => {
            debug!("Stale: {}", path.display());
            Ok(WriteOutcome::Stale)
        }
        WriteMode::Write => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(path, new_content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            debug!("Wrote {}", path.display());
            Ok(WriteOutcome::Written)
        }
    }
}
