use ignore::WalkBuilder;
use log::{debug, trace};
use std::path::{Path, PathBuf};

use crate::{
    error::{BarrelError, Result},
    path::ModulePath,
};

pub struct WalkConfig {
    pub root: PathBuf,
    /// Honour `.gitignore`/`.ignore` files and skip hidden entries
    pub respect_ignore_files: bool,
}

impl WalkConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), respect_ignore_files: false }
    }
}

/// Collects every regular file under `cfg.root`, in walk order.
///
/// A root that is itself a file yields just that file. The result is not
/// sorted; callers pass it through [`crate::sort_paths`] before use.
pub fn collect_files(cfg: &WalkConfig) -> Result<Vec<ModulePath>> {
    let root: &Path = &cfg.root;
    if !root.exists() {
        debug!("Walk root does not exist: {}", root.display());
        return Err(BarrelError::PathNotFound(root.to_path_buf()));
    }

    debug!("Walking directory tree from root: {}", root.display());
    let mut builder = WalkBuilder::new(root);
    if cfg.respect_ignore_files {
        builder.hidden(true).ignore(true).git_ignore(true).require_git(false);
    } else {
        builder.standard_filters(false);
    }

    let mut files: Vec<ModulePath> = Vec::new();
    for res in builder.build() {
        let dent = res?;
        let p = dent.path();
        if !p.is_file() {
            continue;
        }
        trace!("Found file: {}", p.display());
        files.push(ModulePath::from_path(p));
    }

    debug!("Collected {} files under {}", files.len(), root.display());
    Ok(files)
}
